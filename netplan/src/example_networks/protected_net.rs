// NetPlan: Multilayer Network Planning Model
// Copyright (C) 2021  Tibor Schneider
//
// This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation; either version 2 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along
// with this program; if not, write to the Free Software Foundation, Inc.,
// 51 Franklin Street, Fifth Floor, Boston, MA 02110-1301 USA.

//! # Protected Network

use super::ExampleNetwork;
use crate::model::*;

/// # Protected Network
///
/// Four nodes `A`, `B`, `C` and `D` in a WDM layer (the default layer), and an `IP` layer on top.
/// The lightpath demand from `A` to `D` (40 units) is 1+1 protected: the primary route goes over
/// `A -> B -> D`, and the backup route over `A -> C -> D`. The lightpath realizes the IP link from
/// `A` to `D`, which carries an IP demand of 30 units.
///
/// The shared risk group `srg-ab` contains the fiber `A -> B`, and the shared risk group `srg-c`
/// contains the node `C`.
#[derive(Debug)]
pub struct ProtectedNet {}

impl ExampleNetwork for ProtectedNet {
    /// # Variant 0
    /// As described above.
    ///
    /// # Variant 1
    /// Like variant 0, but the shared risk group `srg-ab` is failed.
    fn net(variant: usize) -> NetPlan {
        let mut np = NetPlan::new();
        np.set_name("protected");
        let wdm = np.default_layer();
        np.set_layer_name(wdm, "WDM").unwrap();
        let ip = np.add_layer("IP", "", "Gbps", "Gbps");

        let a = np.add_node("A", (0.0, 0.0));
        let b = np.add_node("B", (1.0, 1.0));
        let c = np.add_node("C", (1.0, -1.0));
        let d = np.add_node("D", (2.0, 0.0));

        let ab = np.add_link(wdm, a, b, 100.0, 120.0, 200000.0).unwrap();
        let bd = np.add_link(wdm, b, d, 100.0, 80.0, 200000.0).unwrap();
        let ac = np.add_link(wdm, a, c, 100.0, 150.0, 200000.0).unwrap();
        let cd = np.add_link(wdm, c, d, 100.0, 90.0, 200000.0).unwrap();

        let lightpath = np.add_demand(wdm, a, d, 40.0).unwrap();
        np.set_demand_recovery_type(lightpath, IntendedRecoveryType::ProtectionNoRevert).unwrap();
        let primary = np.add_route(lightpath, 40.0, 40.0, vec![ab, bd]).unwrap();
        let backup = np.add_route(lightpath, 0.0, 40.0, vec![ac, cd]).unwrap();
        np.add_backup_route(primary, backup).unwrap();

        let ip_link = np.couple_demand_to_new_link(lightpath, ip).unwrap();
        let ip_demand = np.add_demand(ip, a, d, 30.0).unwrap();
        np.add_route(ip_demand, 30.0, 30.0, vec![ip_link]).unwrap();

        let srg_ab = np.add_srg(2000.0, 24.0).unwrap();
        np.add_link_to_srg(srg_ab, ab).unwrap();
        np.set_attribute(srg_ab, "name", "srg-ab").unwrap();
        let srg_c = np.add_srg(10000.0, 4.0).unwrap();
        np.add_node_to_srg(srg_c, c).unwrap();
        np.set_attribute(srg_c, "name", "srg-c").unwrap();

        match variant {
            0 => {}
            1 => np.set_srg_failure_state(srg_ab, false).unwrap(),
            _ => panic!("Invalid variant number"),
        }

        np
    }
}
