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

//! # Aggregation Network

use super::ExampleNetwork;
use crate::model::*;
use maplit::btreemap;

/// # Aggregation Network
///
/// Six nodes in hop-by-hop routing. The demands `1 -> 3` and `2 -> 3` (10 units each) are folded
/// into the demand `3 -> 4`, whose carried traffic is split between `4 -> 5` (40%) and `4 -> 6`
/// (60%). The folded demands offer no traffic on their own. Every demand forwards all of its
/// traffic over the direct link.
///
/// Demands are added in the order `13`, `23`, `34`, `45`, `46`, and so are the links.
#[derive(Debug)]
pub struct AggregationNet {}

impl ExampleNetwork for AggregationNet {
    /// # Variant 0
    /// As described above.
    ///
    /// # Variant 1
    /// Like variant 0, but the link `3 -> 4` only carries half of the traffic of the demand
    /// `3 -> 4`, the rest is dropped at node `3`.
    fn net(variant: usize) -> NetPlan {
        let mut np = NetPlan::new();
        np.set_name("aggregation");
        let layer = np.default_layer();
        np.set_routing_type(layer, RoutingType::HopByHopRouting).unwrap();

        let n: Vec<NodeId> =
            (1..=6).map(|i| np.add_node(format!("n{}", i), (i as f64, 0.0))).collect();
        let pairs = [(0, 2), (1, 2), (2, 3), (3, 4), (3, 5)];
        let links: Vec<LinkId> = pairs
            .iter()
            .map(|(a, b)| np.add_link(layer, n[*a], n[*b], 100.0, 100.0, 1.0).unwrap())
            .collect();
        let offered = [10.0, 10.0, 0.0, 0.0, 0.0];
        let demands: Vec<DemandId> = pairs
            .iter()
            .zip(offered.iter())
            .map(|((a, b), x)| np.add_demand(layer, n[*a], n[*b], *x).unwrap())
            .collect();

        np.attach_to_aggregated_demands(demands[0], btreemap! {demands[2] => 1.0}).unwrap();
        np.attach_to_aggregated_demands(demands[1], btreemap! {demands[2] => 1.0}).unwrap();
        let split = btreemap! {demands[3] => 0.4, demands[4] => 0.6};
        np.attach_to_aggregated_demands(demands[2], split).unwrap();

        let fraction_34 = match variant {
            0 => 1.0,
            1 => 0.5,
            _ => panic!("Invalid variant number"),
        };

        for (i, (d, l)) in demands.iter().zip(links.iter()).enumerate() {
            let fraction = if i == 2 { fraction_34 } else { 1.0 };
            np.set_forwarding_rule(*d, *l, fraction).unwrap();
        }

        np
    }
}
