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

//! Module containing the configuration of a [`NetPlan`](super::NetPlan)

/// Numeric tolerances and checking behaviour of a plan. The configuration is not part of the
/// persisted state; a loaded plan uses the configuration passed to the loader.
#[derive(Debug, Clone, PartialEq)]
pub struct NetPlanConfig {
    /// Amount by which the outgoing forwarding fractions of a node may exceed 1.
    pub forwarding_rule_tolerance: f64,
    /// Hop-by-hop traffic must drain within `hop_bound_factor * number_of_nodes` hops, otherwise
    /// the forwarding rules contain a loop.
    pub hop_bound_factor: usize,
    /// Run the cache consistency check after every mutation, and panic on a mismatch.
    pub check_caches_after_mutation: bool,
}

impl Default for NetPlanConfig {
    fn default() -> Self {
        Self {
            forwarding_rule_tolerance: 1e-3,
            hop_bound_factor: 2,
            check_caches_after_mutation: cfg!(any(debug_assertions, feature = "strict-caches")),
        }
    }
}

impl NetPlanConfig {
    /// Set the forwarding rule tolerance
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.forwarding_rule_tolerance = tolerance;
        self
    }

    /// Set the hop bound factor
    pub fn hop_bound_factor(mut self, factor: usize) -> Self {
        self.hop_bound_factor = factor;
        self
    }

    /// Enable or disable the consistency check after every mutation
    pub fn check_caches(mut self, check: bool) -> Self {
        self.check_caches_after_mutation = check;
        self
    }

    /// Maximum number of hops for a plan with `num_nodes` nodes.
    pub(crate) fn hop_bound(&self, num_nodes: usize) -> usize {
        self.hop_bound_factor.max(1) * num_nodes.max(1)
    }
}
