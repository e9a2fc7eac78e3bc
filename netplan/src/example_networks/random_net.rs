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

//! # Random Network

use super::ExampleNetwork;
use crate::model::*;
use rand::prelude::*;

/// # Random Network
///
/// Two-layer plan generated from a seeded random number generator. The variant is used as the
/// seed, such that the same variant always yields the same plan.
///
/// The lower layer `WDM` is a bidirectional ring of 5 to 10 nodes with a few random chords. Every
/// lower demand is routed clockwise along the ring, and some of them have a counter-clockwise
/// backup route. Some of the lower demands realize a link of the upper layer `IP`, which carries
/// single-hop demands over these links. Every ring segment forms a shared risk group.
#[derive(Debug)]
pub struct RandomNet {}

impl ExampleNetwork for RandomNet {
    fn net(variant: usize) -> NetPlan {
        let mut rng = StdRng::seed_from_u64(variant as u64);
        let mut np = NetPlan::new();
        np.set_name(format!("random-{}", variant));
        let wdm = np.default_layer();
        np.set_layer_name(wdm, "WDM").unwrap();
        let ip = np.add_layer("IP", "", "Gbps", "Gbps");

        let num_nodes: usize = rng.gen_range(5, 11);
        let nodes: Vec<NodeId> = (0..num_nodes)
            .map(|i| {
                let angle = 2.0 * std::f64::consts::PI * i as f64 / num_nodes as f64;
                np.add_node(format!("n{}", i), (angle.cos(), angle.sin()))
            })
            .collect();

        // ring: cw[i] goes from i to i + 1, ccw[i] from i + 1 to i
        let mut cw = Vec::with_capacity(num_nodes);
        let mut ccw = Vec::with_capacity(num_nodes);
        for i in 0..num_nodes {
            let j = (i + 1) % num_nodes;
            let length = rng.gen_range(10.0, 500.0);
            let (a, b) = np
                .add_link_bidirectional(wdm, nodes[i], nodes[j], 400.0, length, 200000.0)
                .unwrap();
            cw.push(a);
            ccw.push(b);
            let srg =
                np.add_srg(rng.gen_range(1000.0, 10000.0), rng.gen_range(1.0, 48.0)).unwrap();
            np.add_link_to_srg(srg, a).unwrap();
            np.add_link_to_srg(srg, b).unwrap();
        }
        for _ in 0..num_nodes / 3 {
            let a = rng.gen_range(0, num_nodes);
            let b = (a + rng.gen_range(2, num_nodes - 1)) % num_nodes;
            let length = rng.gen_range(10.0, 500.0);
            np.add_link_bidirectional(wdm, nodes[a], nodes[b], 100.0, length, 200000.0).unwrap();
        }

        let mut lightpaths = Vec::new();
        for _ in 0..2 * num_nodes {
            let a = rng.gen_range(0, num_nodes);
            let b = (a + rng.gen_range(1, num_nodes)) % num_nodes;
            let offered = rng.gen_range(1.0, 20.0);
            let d = np.add_demand(wdm, nodes[a], nodes[b], offered).unwrap();
            let primary: Vec<LinkId> =
                (0..(b + num_nodes - a) % num_nodes).map(|k| cw[(a + k) % num_nodes]).collect();
            let primary = np.add_route(d, offered, offered, primary).unwrap();
            if rng.gen_bool(0.3) {
                let backup: Vec<LinkId> = (0..(a + num_nodes - b) % num_nodes)
                    .map(|k| ccw[(a + num_nodes - 1 - k) % num_nodes])
                    .collect();
                let backup = np.add_route(d, 0.0, offered, backup).unwrap();
                np.add_backup_route(primary, backup).unwrap();
                np.set_demand_recovery_type(d, IntendedRecoveryType::ProtectionRevert).unwrap();
            }
            lightpaths.push((d, offered));
        }

        let chosen: Vec<(DemandId, f64)> =
            lightpaths.into_iter().filter(|_| rng.gen_bool(0.5)).collect();
        for (d, capacity) in chosen {
            let link = np.couple_demand_to_new_link(d, ip).unwrap();
            let (a, b) = {
                let l = np.get_link(link).unwrap();
                (l.origin(), l.destination())
            };
            let traffic = capacity * rng.gen_range(0.1, 0.9);
            let ip_demand = np.add_demand(ip, a, b, traffic).unwrap();
            np.add_route(ip_demand, traffic, traffic, vec![link]).unwrap();
        }

        np
    }
}
