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

//! Plans for testing

use crate::model::NetPlan;

mod triangle_net;
pub use triangle_net::TriangleNet;

mod two_layer_net;
pub use two_layer_net::TwoLayerNet;

mod protected_net;
pub use protected_net::ProtectedNet;

mod aggregation_net;
pub use aggregation_net::AggregationNet;

mod random_net;
pub use random_net::RandomNet;

/// Trait for easier access to example plans.
pub trait ExampleNetwork {
    /// Get the plan in the chosen variant.
    fn net(variant: usize) -> NetPlan;
}

/// Returns the plan of the example with the given (lowercase) name, or `None` if the name or the
/// variant is unknown.
pub fn by_name(name: &str, variant: usize) -> Option<NetPlan> {
    let num_variants = match name {
        "triangle" => 3,
        "two-layer" | "protected" | "aggregation" => 2,
        "random" => usize::MAX,
        _ => return None,
    };
    if variant >= num_variants {
        return None;
    }
    match name {
        "triangle" => Some(TriangleNet::net(variant)),
        "two-layer" => Some(TwoLayerNet::net(variant)),
        "protected" => Some(ProtectedNet::net(variant)),
        "aggregation" => Some(AggregationNet::net(variant)),
        _ => Some(RandomNet::net(variant)),
    }
}
