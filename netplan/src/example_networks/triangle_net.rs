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

//! # Triangle Network

use super::ExampleNetwork;
use crate::model::{NetPlan, RoutingType};

/// # Triangle
///
/// Three nodes `node1`, `node2` and `node3`, connected by six links (one in each direction) with
/// capacity 100 and length 1, and one demand of 1 unit between every ordered pair of nodes. Every
/// node hosts one resource (`type1`, `type2` and `type3`).
///
/// Links and demands are added in the order `12`, `21`, `13`, `31`, `23`, `32`.
#[derive(Debug)]
pub struct TriangleNet {}

impl ExampleNetwork for TriangleNet {
    /// # Variant 0
    /// Source routing, no routes.
    ///
    /// # Variant 1
    /// Hop-by-hop routing, every demand is forwarded entirely over the direct link.
    ///
    /// # Variant 2
    /// Source routing, every demand is routed over the direct link.
    fn net(variant: usize) -> NetPlan {
        let mut np = NetPlan::new();
        np.set_name("triangle");
        let layer = np.default_layer();

        let n1 = np.add_node("node1", (0.0, 0.0));
        let n2 = np.add_node("node2", (0.0, 0.0));
        let n3 = np.add_node("node3", (0.0, 0.0));

        let pairs = [(n1, n2), (n2, n1), (n1, n3), (n3, n1), (n2, n3), (n3, n2)];
        let links: Vec<_> = pairs
            .iter()
            .map(|(a, b)| np.add_link(layer, *a, *b, 100.0, 1.0, 1.0).unwrap())
            .collect();
        let demands: Vec<_> =
            pairs.iter().map(|(a, b)| np.add_demand(layer, *a, *b, 1.0).unwrap()).collect();

        np.add_resource("type1", "name", n1, 100.0, "units", 1.0).unwrap();
        np.add_resource("type2", "name", n2, 100.0, "units", 1.0).unwrap();
        np.add_resource("type3", "name", n3, 100.0, "units", 1.0).unwrap();

        match variant {
            0 => {}
            1 => {
                np.set_routing_type(layer, RoutingType::HopByHopRouting).unwrap();
                for (d, l) in demands.iter().zip(links.iter()) {
                    np.set_forwarding_rule(*d, *l, 1.0).unwrap();
                }
            }
            2 => {
                for (d, l) in demands.iter().zip(links.iter()) {
                    np.add_route(*d, 1.0, 1.0, vec![*l]).unwrap();
                }
            }
            _ => panic!("Invalid variant number"),
        }

        np
    }
}
