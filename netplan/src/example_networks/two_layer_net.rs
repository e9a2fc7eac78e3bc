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

//! # Two-Layer Network

use super::ExampleNetwork;
use crate::model::*;
use maplit::btreeset;

/// # Two-Layer Network
///
/// Three nodes, a lower layer (the default layer, traffic in `Mbps`) and an upper layer
/// `upperLayer` (capacity in `Mbps`). The lower layer contains:
///
/// - links `12`, `23` and `13` (capacity 100, length 100),
/// - demand `d12` (3 units) with route `r12` over link `12`, coupled to the upper link `12`,
/// - demand `d13` (3 units) with two routes `r123a` and `r123b` over `12`, `23`, and the route
///   `segm13` over `13` which is the backup of `r123a`,
/// - demand `scd123` (3 units) with service chain `["type"]`, routed over `12`, the resource
///   `res2` at `node2`, and `23`,
/// - multicast demand `d123` from `node1` to `node2` and `node3`, with the trees `t123` (over `12`
///   and `23`) and `tStar` (over `12` and `13`). The demand is coupled to the upper links
///   `md12` and `md13`.
///
/// The upper layer contains the coupled links, and a multicast demand from `node1` to `node2` and
/// `node3` with a tree over `md12` and `md13`.
///
/// Elements can be found by their names (nodes) or by the `name` attribute (all others).
#[derive(Debug)]
pub struct TwoLayerNet {}

impl ExampleNetwork for TwoLayerNet {
    /// # Variant 0
    /// As described above.
    ///
    /// # Variant 1
    /// Like variant 0, with an additional shared risk group containing link `23`.
    fn net(variant: usize) -> NetPlan {
        let mut np = NetPlan::new();
        np.set_name("two-layer");
        let lower = np.default_layer();
        np.set_layer_name(lower, "lowerLayer").unwrap();
        np.set_layer_demand_traffic_units(lower, "Mbps").unwrap();
        let upper = np.add_layer("upperLayer", "description", "Mbps", "upperTrafficUnits");
        np.add_tag(lower, "t1").unwrap();
        np.add_tag(upper, "t1").unwrap();

        let n1 = np.add_node("node1", (0.0, 0.0));
        let n2 = np.add_node("node2", (0.0, 0.0));
        let n3 = np.add_node("node3", (0.0, 0.0));
        np.set_node_population(n1, 100.0).unwrap();
        np.set_node_site_name(n1, Some("s12".to_string())).unwrap();
        np.set_node_site_name(n2, Some("s12".to_string())).unwrap();
        np.set_node_site_name(n3, Some("s3".to_string())).unwrap();
        np.set_attribute(n1, "att", "1").unwrap();
        np.add_tag(n1, "t1").unwrap();

        let link12 = np.add_link(lower, n1, n2, 100.0, 100.0, 1.0).unwrap();
        let link23 = np.add_link(lower, n2, n3, 100.0, 100.0, 1.0).unwrap();
        let link13 = np.add_link(lower, n1, n3, 100.0, 100.0, 1.0).unwrap();
        np.add_tag(link12, "t1").unwrap();

        let d13 = np.add_demand(lower, n1, n3, 3.0).unwrap();
        np.set_demand_recovery_type(d13, IntendedRecoveryType::None).unwrap();
        np.add_tag(d13, "t1").unwrap();
        np.add_tag(d13, "t2").unwrap();
        let d12 = np.add_demand(lower, n1, n2, 3.0).unwrap();
        np.set_demand_recovery_type(d12, IntendedRecoveryType::ProtectionNoRevert).unwrap();

        let r12 = np.add_route(d12, 1.0, 1.5, vec![link12]).unwrap();
        let r123a = np.add_route(d13, 1.0, 1.5, vec![link12, link23]).unwrap();
        let r123b = np.add_route(d13, 1.0, 1.5, vec![link12, link23]).unwrap();
        np.add_tag(r12, "t1").unwrap();
        np.add_tag(r12, "t3").unwrap();

        let res2 = np.add_resource("type", "res2", n2, 100.0, "Mbps", 10.0).unwrap();
        let res2backup = np.add_resource("type", "res2backup", n2, 100.0, "Mbps", 10.0).unwrap();
        np.add_tag(res2, "t1").unwrap();

        let scd123 = np.add_demand(lower, n1, n3, 3.0).unwrap();
        np.set_demand_service_chain(scd123, vec!["type".to_string()]).unwrap();
        let sc123 = np
            .add_service_chain(
                scd123,
                100.0,
                vec![300.0, 50.0, 302.0],
                vec![link12.into(), res2.into(), link23.into()],
            )
            .unwrap();

        let segm13 = np.add_route(d13, 0.0, 50.0, vec![link13]).unwrap();
        np.add_backup_route(r123a, segm13).unwrap();

        let upper_link12 = np.add_link(upper, n1, n2, 10.0, 100.0, 1.0).unwrap();
        np.couple_link_to_demand(upper_link12, d12).unwrap();

        let d123 = np.add_multicast_demand(lower, n1, btreeset! {n2, n3}, 100.0).unwrap();
        let t123 = np.add_multicast_tree(d123, 10.0, 15.0, btreeset! {link12, link23}).unwrap();
        let t_star = np.add_multicast_tree(d123, 10.0, 15.0, btreeset! {link12, link13}).unwrap();
        np.add_tag(d123, "t1").unwrap();
        np.add_tag(t123, "t1").unwrap();

        let upper_md_link12 = np.add_link(upper, n1, n2, 10.0, 100.0, 1.0).unwrap();
        let upper_md_link13 = np.add_link(upper, n1, n3, 10.0, 100.0, 1.0).unwrap();
        let upper_md123 = np.add_multicast_demand(upper, n1, btreeset! {n2, n3}, 100.0).unwrap();
        let upper_links = btreeset! {upper_md_link12, upper_md_link13};
        let upper_mt123 = np.add_multicast_tree(upper_md123, 10.0, 15.0, upper_links).unwrap();
        np.couple_multicast_demand(d123, btreeset! {upper_md_link12, upper_md_link13}).unwrap();

        let names: Vec<(ElementRef, &str)> = vec![
            (link12.into(), "link12"),
            (link23.into(), "link23"),
            (link13.into(), "link13"),
            (d12.into(), "d12"),
            (d13.into(), "d13"),
            (scd123.into(), "scd123"),
            (r12.into(), "r12"),
            (r123a.into(), "r123a"),
            (r123b.into(), "r123b"),
            (segm13.into(), "segm13"),
            (sc123.into(), "sc123"),
            (res2backup.into(), "res2backup"),
            (d123.into(), "d123"),
            (t123.into(), "t123"),
            (t_star.into(), "tStar"),
            (upper_link12.into(), "upperLink12"),
            (upper_md_link12.into(), "upperMdLink12"),
            (upper_md_link13.into(), "upperMdLink13"),
            (upper_md123.into(), "upperMd123"),
            (upper_mt123.into(), "upperMt123"),
        ];
        for (elem, name) in names {
            np.set_attribute(elem, "name", name).unwrap();
        }

        match variant {
            0 => {}
            1 => {
                let srg = np.add_srg(1000.0, 12.0).unwrap();
                np.add_link_to_srg(srg, link23).unwrap();
                np.set_attribute(srg, "name", "srg23").unwrap();
            }
            _ => panic!("Invalid variant number"),
        }

        np
    }
}

impl TwoLayerNet {
    /// Returns the element carrying the given `name` attribute. Panics if the name is unknown.
    pub fn element(np: &NetPlan, name: &str) -> ElementRef {
        np.get_elements_by_attribute("name", name)
            .into_iter()
            .next()
            .unwrap_or_else(|| panic!("no element named {}", name))
    }

    /// Returns the link with the given name
    pub fn link(np: &NetPlan, name: &str) -> LinkId {
        match Self::element(np, name) {
            ElementRef::Link(l) => l,
            e => panic!("{} is not a link: {:?}", name, e),
        }
    }

    /// Returns the demand with the given name
    pub fn demand(np: &NetPlan, name: &str) -> DemandId {
        match Self::element(np, name) {
            ElementRef::Demand(d) => d,
            e => panic!("{} is not a demand: {:?}", name, e),
        }
    }

    /// Returns the route with the given name
    pub fn route(np: &NetPlan, name: &str) -> RouteId {
        match Self::element(np, name) {
            ElementRef::Route(r) => r,
            e => panic!("{} is not a route: {:?}", name, e),
        }
    }

    /// Returns the multicast demand with the given name
    pub fn multicast_demand(np: &NetPlan, name: &str) -> MulticastDemandId {
        match Self::element(np, name) {
            ElementRef::MulticastDemand(md) => md,
            e => panic!("{} is not a multicast demand: {:?}", name, e),
        }
    }

    /// Returns the multicast tree with the given name
    pub fn tree(np: &NetPlan, name: &str) -> MulticastTreeId {
        match Self::element(np, name) {
            ElementRef::MulticastTree(t) => t,
            e => panic!("{} is not a multicast tree: {:?}", name, e),
        }
    }
}
