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

//! # Inter-layer traffic propagation
//!
//! Given a seed (links, demands, multicast demand egress nodes or nodes), the propagation closure
//! contains every link of any layer which carries traffic of the seed (going down through
//! coupled links into lower layers), or whose traffic traverses the seed (going up from lower
//! layers into coupled links). The closure is computed on the *potential* routing, i.e., failures
//! and the amount of carried traffic are ignored.
//!
//! The algorithm keeps a frontier of `(link, flavour)` pairs, where the flavour tells if the link
//! was reached over primary or backup routing. Links reached from a backup link are backup links
//! themselves. A link which was already visited with the same flavour is not expanded again, such
//! that the computation terminates.

use super::network::NetPlan;
use super::types::*;

use log::{debug, trace};
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Direction in which the propagation follows couplings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropagationDirection {
    /// From upper-layer links into the lower-layer links carrying their traffic
    Downward,
    /// From lower-layer links into the upper-layer links whose traffic they carry
    Upward,
    /// Both directions
    Both,
}

impl PropagationDirection {
    fn downward(self) -> bool {
        matches!(self, Self::Downward | Self::Both)
    }

    fn upward(self) -> bool {
        matches!(self, Self::Upward | Self::Both)
    }
}

/// Starting point of a propagation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropagationSeed {
    /// A single link
    Link(LinkId),
    /// All links the demand potentially carries traffic over
    Demand(DemandId),
    /// All links carrying the traffic of a multicast demand towards one egress node
    MulticastDemandEgress(MulticastDemandId, NodeId),
    /// All links (of every layer) incident to the node
    Node(NodeId),
}

/// Point where the traffic changes the layer, at the end node of a coupled link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VerticalTransition {
    /// Node where the layer changes
    pub node: NodeId,
    /// Layer the traffic leaves
    pub from_layer: LayerId,
    /// Layer the traffic enters
    pub to_layer: LayerId,
    /// Coupled upper-layer link
    pub link: LinkId,
}

/// Result of a propagation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropagationClosure {
    /// Links reached over primary routing
    pub primary: BTreeSet<LinkId>,
    /// Links reached over backup routing
    pub backup: BTreeSet<LinkId>,
    /// Union of `primary` and `backup`
    pub all: BTreeSet<LinkId>,
    /// All layer changes
    pub vertical_transitions: BTreeSet<VerticalTransition>,
    /// Unicast demands whose traffic was followed
    pub crossed_demands: BTreeSet<DemandId>,
    /// Multicast demand and egress pairs whose traffic was followed
    pub crossed_multicast_demands: BTreeSet<(MulticastDemandId, NodeId)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flavour {
    Primary,
    Backup,
}

impl Flavour {
    fn join(self, other: Self) -> Self {
        if self == Self::Backup || other == Self::Backup {
            Self::Backup
        } else {
            Self::Primary
        }
    }
}

struct Frontier {
    closure: PropagationClosure,
    queue: VecDeque<(LinkId, Flavour)>,
}

impl Frontier {
    fn visit(&mut self, link: LinkId, flavour: Flavour) {
        let new = match flavour {
            Flavour::Primary => self.closure.primary.insert(link),
            Flavour::Backup => self.closure.backup.insert(link),
        };
        if new {
            trace!("propagation reached {:?} ({:?})", link, flavour);
            self.queue.push_back((link, flavour));
        }
    }
}

impl NetPlan {
    // ---------------------------------------------------------------------------------------------
    // intra-layer queries
    // ---------------------------------------------------------------------------------------------

    /// Returns the links of the demand's layer the demand potentially carries traffic over,
    /// split into links of primary routing and links of backup routes. In hop-by-hop routing,
    /// these are all links with a positive share of the demand traffic if no failure is present.
    pub fn get_links_this_layer_potentially_carrying_traffic_split(
        &self,
        demand: DemandId,
    ) -> Result<(BTreeSet<LinkId>, BTreeSet<LinkId>), NetPlanError> {
        let d = self.get_demand(demand)?;
        let layer = self.get_layer(d.layer)?;
        let (mut primary, mut backup) = (BTreeSet::new(), BTreeSet::new());
        match layer.routing_type {
            RoutingType::SourceRouting => {
                for r in self.get_demand_routes(demand) {
                    let target = if self.is_backup_route(r) { &mut backup } else { &mut primary };
                    target.extend(self.get_route(r)?.links());
                }
            }
            RoutingType::HopByHopRouting => {
                let flow = self.unit_flow(layer, &layer.forwarding_rules, d, false)?;
                primary.extend(flow.links.into_iter().filter(|(_, f)| *f > 0.0).map(|(l, _)| l));
            }
        }
        Ok((primary, backup))
    }

    /// Returns the links of the demand's layer the demand potentially carries traffic over.
    pub fn get_links_this_layer_potentially_carrying_traffic(
        &self,
        demand: DemandId,
        include_backup: bool,
    ) -> Result<BTreeSet<LinkId>, NetPlanError> {
        let (mut primary, backup) =
            self.get_links_this_layer_potentially_carrying_traffic_split(demand)?;
        if include_backup {
            primary.extend(backup);
        }
        Ok(primary)
    }

    /// Returns the links of the multicast demand's layer carrying its traffic towards the given
    /// egress node, or towards all egress nodes if `egress` is `None`.
    pub fn get_links_this_layer_potentially_carrying_multicast_traffic(
        &self,
        md: MulticastDemandId,
        egress: Option<NodeId>,
    ) -> Result<BTreeSet<LinkId>, NetPlanError> {
        self.get_multicast_demand(md)?;
        let mut links = BTreeSet::new();
        for t in self.get_multicast_demand_trees(md) {
            match egress {
                Some(e) => links.extend(self.get_multicast_tree_path_to_egress(t, e)?),
                None => links.extend(self.get_multicast_tree(t)?.links.iter().copied()),
            }
        }
        Ok(links)
    }

    /// Returns the demands whose traffic potentially traverses the link. A demand is flagged as
    /// backup if it only traverses the link over backup routes.
    fn demands_traversing_link(
        &self,
        link: LinkId,
    ) -> Result<BTreeMap<DemandId, Flavour>, NetPlanError> {
        let layer = self.get_layer(self.get_link(link)?.layer)?;
        let mut result: BTreeMap<DemandId, Flavour> = BTreeMap::new();
        match layer.routing_type {
            RoutingType::SourceRouting => {
                for r in self.get_link_routes(link) {
                    let flavour = if self.is_backup_route(r) {
                        Flavour::Backup
                    } else {
                        Flavour::Primary
                    };
                    let entry = result.entry(self.get_route(r)?.demand).or_insert(flavour);
                    if flavour == Flavour::Primary {
                        *entry = Flavour::Primary;
                    }
                }
            }
            RoutingType::HopByHopRouting => {
                let candidates: BTreeSet<DemandId> = layer
                    .forwarding_rules
                    .keys()
                    .filter(|(_, l)| *l == link)
                    .map(|(d, _)| *d)
                    .collect();
                for d in candidates {
                    let demand = self.get_demand(d)?;
                    let flow = self.unit_flow(layer, &layer.forwarding_rules, demand, false)?;
                    if flow.links.get(&link).map(|f| *f > 0.0).unwrap_or(false) {
                        result.insert(d, Flavour::Primary);
                    }
                }
            }
        }
        Ok(result)
    }

    /// Returns all demands whose traffic potentially traverses the link (over primary or backup
    /// routing).
    pub fn get_demands_potentially_traversing_link(
        &self,
        link: LinkId,
    ) -> Result<BTreeSet<DemandId>, NetPlanError> {
        Ok(self.demands_traversing_link(link)?.into_iter().map(|(d, _)| d).collect())
    }

    /// Returns all (multicast demand, egress node) pairs whose traffic traverses the link.
    pub fn get_multicast_demands_potentially_traversing_link(
        &self,
        link: LinkId,
    ) -> Result<BTreeSet<(MulticastDemandId, NodeId)>, NetPlanError> {
        self.get_link(link)?;
        let mut result = BTreeSet::new();
        for t in self.get_link_multicast_trees(link) {
            let md = self.get_multicast_tree(t)?.demand;
            for egress in self.get_multicast_demand(md)?.egresses.iter() {
                if self.get_multicast_tree_path_to_egress(t, *egress)?.contains(&link) {
                    result.insert((md, *egress));
                }
            }
        }
        Ok(result)
    }

    /// Returns the links of the same layer that carry traffic of any demand (or multicast demand
    /// egress) whose traffic traverses the given link.
    pub fn get_links_this_layer_potentially_carrying_traffic_traversing_this_link(
        &self,
        link: LinkId,
        include_backup: bool,
    ) -> Result<BTreeSet<LinkId>, NetPlanError> {
        let mut links = BTreeSet::new();
        for (d, flavour) in self.demands_traversing_link(link)? {
            if include_backup || flavour == Flavour::Primary {
                links.extend(
                    self.get_links_this_layer_potentially_carrying_traffic(d, include_backup)?,
                );
            }
        }
        for (md, egress) in self.get_multicast_demands_potentially_traversing_link(link)? {
            links.extend(
                self.get_links_this_layer_potentially_carrying_multicast_traffic(md, Some(egress))?,
            );
        }
        Ok(links)
    }

    // ---------------------------------------------------------------------------------------------
    // inter-layer closure
    // ---------------------------------------------------------------------------------------------

    /// Compute the propagation closure of the seeds over all layers. See the
    /// [module documentation](self) for the semantics.
    ///
    /// A demand seed (or a multicast demand egress seed) starts with the links of its own layer
    /// carrying its traffic. When going up, the coupled link of the seed demand is added as well.
    /// From there, every link in the closure is expanded:
    ///
    /// - *downward*: a coupled link adds the links of the lower demand (or of the branch of the
    ///   lower multicast demand towards the link's destination).
    /// - *upward*: every demand and multicast demand branch traversing the link is crossed, not
    ///   only the one of the seed, and its coupled upper link is added.
    ///
    /// Backup routes are only followed if `include_backup` is set. Links reached through a backup
    /// route end up in [`PropagationClosure::backup`].
    pub fn get_propagation_closure(
        &self,
        seeds: &[PropagationSeed],
        direction: PropagationDirection,
        include_backup: bool,
    ) -> Result<PropagationClosure, NetPlanError> {
        let mut f = Frontier { closure: PropagationClosure::default(), queue: VecDeque::new() };

        for seed in seeds {
            match *seed {
                PropagationSeed::Link(l) => {
                    self.get_link(l)?;
                    f.visit(l, Flavour::Primary);
                }
                PropagationSeed::Demand(d) => {
                    self.expand_demand(&mut f, d, Flavour::Primary, include_backup)?;
                    if direction.upward() {
                        if let Some(u) = self.get_demand_coupled_link(d) {
                            f.visit(u, Flavour::Primary);
                            self.record_transitions(&mut f, u)?;
                        }
                    }
                }
                PropagationSeed::MulticastDemandEgress(md, egress) => {
                    self.expand_multicast_demand(&mut f, md, egress, Flavour::Primary)?;
                    if direction.upward() {
                        if let Some(u) = self.get_multicast_demand_coupled_links(md).get(&egress) {
                            f.visit(*u, Flavour::Primary);
                            self.record_transitions(&mut f, *u)?;
                        }
                    }
                }
                PropagationSeed::Node(n) => {
                    self.get_node(n)?;
                    for layer in self.get_layer_ids() {
                        for l in self.get_node_outgoing_links(n, layer) {
                            f.visit(l, Flavour::Primary);
                        }
                        for l in self.get_node_incoming_links(n, layer) {
                            f.visit(l, Flavour::Primary);
                        }
                    }
                }
            }
        }

        while let Some((link, flavour)) = f.queue.pop_front() {
            if direction.downward() {
                match self.get_link(link)?.coupling {
                    Some(LinkCoupling::Demand(d)) => {
                        self.expand_demand(&mut f, d, flavour, include_backup)?;
                        self.record_transitions(&mut f, link)?;
                    }
                    Some(LinkCoupling::MulticastDemand(md)) => {
                        let egress = self.get_link(link)?.destination;
                        self.expand_multicast_demand(&mut f, md, egress, flavour)?;
                        self.record_transitions(&mut f, link)?;
                    }
                    None => {}
                }
            }
            if direction.upward() {
                for (d, demand_flavour) in self.demands_traversing_link(link)? {
                    if demand_flavour == Flavour::Backup && !include_backup {
                        continue;
                    }
                    f.closure.crossed_demands.insert(d);
                    if let Some(u) = self.get_demand_coupled_link(d) {
                        f.visit(u, flavour.join(demand_flavour));
                        self.record_transitions(&mut f, u)?;
                    }
                }
                for (md, egress) in self.get_multicast_demands_potentially_traversing_link(link)? {
                    f.closure.crossed_multicast_demands.insert((md, egress));
                    if let Some(u) = self.get_multicast_demand_coupled_links(md).get(&egress) {
                        f.visit(*u, flavour);
                        self.record_transitions(&mut f, *u)?;
                    }
                }
            }
        }

        let mut closure = f.closure;
        closure.all = closure.primary.union(&closure.backup).copied().collect();
        debug!(
            "Propagation closure: {} primary, {} backup links, {} transitions",
            closure.primary.len(),
            closure.backup.len(),
            closure.vertical_transitions.len()
        );
        Ok(closure)
    }

    fn expand_demand(
        &self,
        f: &mut Frontier,
        demand: DemandId,
        flavour: Flavour,
        include_backup: bool,
    ) -> Result<(), NetPlanError> {
        f.closure.crossed_demands.insert(demand);
        let (primary, backup) =
            self.get_links_this_layer_potentially_carrying_traffic_split(demand)?;
        for l in primary {
            f.visit(l, flavour);
        }
        if include_backup {
            for l in backup {
                f.visit(l, Flavour::Backup);
            }
        }
        Ok(())
    }

    fn expand_multicast_demand(
        &self,
        f: &mut Frontier,
        md: MulticastDemandId,
        egress: NodeId,
        flavour: Flavour,
    ) -> Result<(), NetPlanError> {
        f.closure.crossed_multicast_demands.insert((md, egress));
        let links =
            self.get_links_this_layer_potentially_carrying_multicast_traffic(md, Some(egress))?;
        for l in links {
            f.visit(l, flavour);
        }
        Ok(())
    }

    /// Record the two layer changes of a coupled link: at its origin the traffic goes down into
    /// the lower layer, and at its destination it comes back up.
    fn record_transitions(&self, f: &mut Frontier, link: LinkId) -> Result<(), NetPlanError> {
        let l = self.get_link(link)?;
        let lower = match l.coupling {
            Some(LinkCoupling::Demand(d)) => self.get_element_layer(d)?,
            Some(LinkCoupling::MulticastDemand(md)) => self.get_element_layer(md)?,
            None => return Ok(()),
        };
        f.closure.vertical_transitions.insert(VerticalTransition {
            node: l.origin,
            from_layer: l.layer,
            to_layer: lower,
            link,
        });
        f.closure.vertical_transitions.insert(VerticalTransition {
            node: l.destination,
            from_layer: lower,
            to_layer: l.layer,
            link,
        });
        Ok(())
    }

    /// Returns the propagation closure of a single link.
    pub fn get_links_potentially_carrying_traffic_traversing_this_link(
        &self,
        link: LinkId,
        include_backup: bool,
        direction: PropagationDirection,
    ) -> Result<PropagationClosure, NetPlanError> {
        self.get_propagation_closure(&[PropagationSeed::Link(link)], direction, include_backup)
    }

    /// Returns all links in any layer affected by the failure of the shared risk group: the links
    /// of the group, the links incident to its nodes, and everything coupled to them in both
    /// directions (including backup routing).
    pub fn get_affected_links_all_layers(
        &self,
        srg: SrgId,
    ) -> Result<BTreeSet<LinkId>, NetPlanError> {
        let s = self.get_srg(srg)?;
        let seeds: Vec<PropagationSeed> = s
            .links
            .iter()
            .map(|l| PropagationSeed::Link(*l))
            .chain(s.nodes.iter().map(|n| PropagationSeed::Node(*n)))
            .collect();
        Ok(self.get_propagation_closure(&seeds, PropagationDirection::Both, true)?.all)
    }
}
