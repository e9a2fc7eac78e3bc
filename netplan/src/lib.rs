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

#![deny(missing_docs)]

//! # NetPlan: Multilayer Network Planning Model
//! This is a library for describing and analyzing multilayer network plans: a set of nodes
//! shared by several network layers, with links, unicast and multicast demands, their routing
//! (source routing or hop-by-hop forwarding rules), resources and service chains, shared risk
//! groups, and the coupling of upper-layer links to lower-layer demands.
//!
//! ## Structure
//!
//! This library is structured in the following way:
//!
//! - **[`Model`](model)**: The plan itself. See the main structure [`NetPlan`](model::NetPlan).
//!   All mutations validate their arguments first, and leave the plan unchanged if they fail.
//!   Derived structures (adjacency, traffic of hop-by-hop layers, coupling back-references) are
//!   kept in caches, which can be checked against the canonical state with
//!   [`check_caches_consistency`](model::NetPlan::check_caches_consistency).
//!
//! - **[`Propagation`](model::propagation)**: Queries which follow the traffic through the layers,
//!   for instance to find all links affected by the failure of a
//!   [shared risk group](model::NetPlan::get_affected_links_all_layers).
//!
//! - **[`Persistence`](model::persistence)**: Store and load plans as JSON.
//!
//! - **[`ExampleNetworks`](example_networks)**: Collection of prepared plans, used for testing
//!   and by the command-line tool. Some of these plans can be scaled to arbitrary size.
//!
//! ## Features
//!
//! - *`strict-caches`*: Check the consistency of all caches after every mutation, also in
//!   release builds. In debug builds, this is enabled by default (see
//!   [`NetPlanConfig`](model::NetPlanConfig)).
//!
//! ## Usage
//!
//! ```
//! use netplan::model::{NetPlan, NetPlanConfig};
//! use netplan::Error;
//! # use netplan::example_networks::*;
//!
//! fn main() -> Result<(), Error> {
//!     // prepare the plan
//!     // let np = ...
//! # let np = TwoLayerNet::net(0);
//!
//!     // store it, and load it again
//!     let json = np.to_json_string()?;
//!     let loaded = NetPlan::from_json_str(&json, NetPlanConfig::default())?;
//!     assert_eq!(np, loaded);
//!
//!     // check which links are affected by the failure of a shared risk group
//!     for srg in loaded.get_srgs().map(|s| s.id()) {
//!         println!("{:?}", loaded.get_affected_links_all_layers(srg)?);
//!     }
//!
//!     Ok(())
//! }
//! ```

// test modules
pub mod example_networks;
mod test;

mod error;
pub mod model;

pub use error::Error;
