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

#![deny(missing_docs, missing_debug_implementations)]

//! # Multilayer network planning model
//!
//! A [`NetPlan`] holds a set of nodes, shared by all network layers, and per layer the links,
//! unicast demands with their routes (or forwarding rules), and multicast demands with their
//! trees. Resources are hosted at nodes and can be traversed by service chains, and shared risk
//! groups bundle nodes and links that fail together.
//!
//! Layers are stacked by coupling: an upper-layer link can be realized by a lower-layer demand
//! (or one branch of a lower-layer multicast demand), in which case the capacity of the link is
//! the traffic carried by the lower demand. The [`propagation`] queries follow these couplings
//! up and down to find everything affected by a link, a node or a shared risk group.
//!
//! ## Example usage
//!
//! ```rust
//! use netplan::model::{NetPlan, PropagationDirection, PropagationSeed};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut np = NetPlan::new();
//!     let wdm = np.default_layer();
//!     let ip = np.add_layer("IP", "", "Gbps", "Gbps");
//!
//!     let a = np.add_node("A", (0.0, 0.0));
//!     let b = np.add_node("B", (1.0, 0.0));
//!     let c = np.add_node("C", (2.0, 0.0));
//!
//!     // lightpath from A to C over B
//!     let ab = np.add_link(wdm, a, b, 100.0, 10.0, 200000.0)?;
//!     let bc = np.add_link(wdm, b, c, 100.0, 10.0, 200000.0)?;
//!     let lightpath = np.add_demand(wdm, a, c, 40.0)?;
//!     np.add_route(lightpath, 40.0, 40.0, vec![ab, bc])?;
//!
//!     // the IP link from A to C is realized by the lightpath
//!     let ip_link = np.couple_demand_to_new_link(lightpath, ip)?;
//!     assert_eq!(np.get_link_capacity(ip_link)?, 40.0);
//!
//!     let closure = np.get_propagation_closure(
//!         &[PropagationSeed::Link(ab)],
//!         PropagationDirection::Upward,
//!         false,
//!     )?;
//!     assert!(closure.all.contains(&ip_link));
//!
//!     Ok(())
//! }
//! ```

mod cache;
mod config;
mod coupling;
mod demands;
mod elements;
mod forwarding;
mod network;
pub mod persistence;
pub mod printer;
pub mod propagation;
mod registry;
mod routing;
mod traffic;
mod types;

pub use config::NetPlanConfig;
pub use elements::*;
pub use network::NetPlan;
pub use propagation::{
    PropagationClosure, PropagationDirection, PropagationSeed, VerticalTransition,
};
pub use registry::Indexed;
pub use types::*;
