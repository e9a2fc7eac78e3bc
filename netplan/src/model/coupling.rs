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

//! # Inter-layer coupling
//!
//! An upper-layer link can be coupled to a lower-layer unicast demand, or (together with one link
//! per egress node) to a lower-layer multicast demand. The capacity of a coupled link is the
//! traffic carried by the lower-layer demand. A link is coupled to at most one demand, and a demand
//! to at most one link. The coupling relation between layers must stay acyclic.

use super::network::NetPlan;
use super::types::*;

use log::debug;
use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graphmap::DiGraphMap;
use std::collections::{BTreeMap, BTreeSet};

/// Default propagation speed of links created by [`NetPlan::couple_demand_to_new_link`], in km/s.
const DEFAULT_PROPAGATION_SPEED: f64 = 200_000.0;

impl NetPlan {
    /// Couple an upper-layer link to a lower-layer demand. From now on, the capacity of the link
    /// is the traffic carried by the demand.
    ///
    /// The link and the demand must be in different layers, none of them may be coupled already,
    /// the link must start at the ingress and end at the egress of the demand, and the link
    /// capacity units of the upper layer must equal the demand traffic units of the lower layer.
    pub fn couple_link_to_demand(
        &mut self,
        link: LinkId,
        demand: DemandId,
    ) -> Result<(), NetPlanError> {
        let l = self.get_link(link)?;
        let d = self.get_demand(demand)?;
        if l.coupling.is_some() {
            return Err(NetPlanError::AlreadyCoupled(link.into()));
        }
        if self.cache.demand_coupled_link.contains_key(&demand) {
            return Err(NetPlanError::AlreadyCoupled(demand.into()));
        }
        if l.origin != d.ingress || l.destination != d.egress {
            return Err(NetPlanError::CouplingEndNodeMismatch(link));
        }
        self.validate_layer_coupling(l.layer, d.layer)?;

        let coupling = LinkCoupling::Demand(demand);
        let l = self.link_mut(link)?;
        l.coupling = Some(coupling);
        let l = l.clone();
        self.cache.add_coupling(&l, coupling);
        debug!("Coupled link {:?} to demand {:?}", link, demand);
        self.after_mutation();
        Ok(())
    }

    /// Couple a lower-layer multicast demand to a set of upper-layer links, one per egress node.
    /// Each link must start at the ingress of the multicast demand, and the destinations of the
    /// links must be exactly the egress nodes. The capacity of each link is the traffic the
    /// multicast demand carries to the destination of the link.
    pub fn couple_multicast_demand(
        &mut self,
        md: MulticastDemandId,
        links: BTreeSet<LinkId>,
    ) -> Result<(), NetPlanError> {
        let m = self.get_multicast_demand(md)?;
        if self.cache.mdemand_coupled_links.contains_key(&md) {
            return Err(NetPlanError::AlreadyCoupled(md.into()));
        }
        let mut upper: Option<LayerId> = None;
        let mut destinations: BTreeSet<NodeId> = BTreeSet::new();
        for link in links.iter() {
            let l = self.get_link(*link)?;
            if l.coupling.is_some() {
                return Err(NetPlanError::AlreadyCoupled((*link).into()));
            }
            match upper {
                Some(layer) if layer != l.layer => {
                    return Err(NetPlanError::WrongLayer {
                        element: (*link).into(),
                        expected: layer,
                        found: l.layer,
                    })
                }
                _ => upper = Some(l.layer),
            }
            if l.origin != m.ingress || !destinations.insert(l.destination) {
                return Err(NetPlanError::CouplingEndNodeMismatch(*link));
            }
        }
        let upper = match (upper, links.iter().next()) {
            (Some(upper), _) if destinations == m.egresses => upper,
            (_, Some(first)) => return Err(NetPlanError::CouplingEndNodeMismatch(*first)),
            (_, None) => return Err(NetPlanError::InvalidMulticastTree("no links to couple")),
        };
        self.validate_layer_coupling(upper, m.layer)?;

        let coupling = LinkCoupling::MulticastDemand(md);
        for link in links.iter() {
            let l = self.link_mut(*link)?;
            l.coupling = Some(coupling);
            let l = l.clone();
            self.cache.add_coupling(&l, coupling);
        }
        debug!("Coupled multicast demand {:?} to {} links of layer {:?}", md, links.len(), upper);
        self.after_mutation();
        Ok(())
    }

    /// Create a new link in `upper_layer` between the end nodes of the demand and couple it to the
    /// demand. Returns the new link.
    pub fn couple_demand_to_new_link(
        &mut self,
        demand: DemandId,
        upper_layer: LayerId,
    ) -> Result<LinkId, NetPlanError> {
        let d = self.get_demand(demand)?;
        let (ingress, egress, lower) = (d.ingress, d.egress, d.layer);
        self.get_layer(upper_layer)?;
        if self.cache.demand_coupled_link.contains_key(&demand) {
            return Err(NetPlanError::AlreadyCoupled(demand.into()));
        }
        self.validate_layer_coupling(upper_layer, lower)?;
        let link =
            self.add_link(upper_layer, ingress, egress, 0.0, 0.0, DEFAULT_PROPAGATION_SPEED)?;
        self.couple_link_to_demand(link, demand)?;
        Ok(link)
    }

    /// Check the layers, the units and that the coupling keeps the layer relation acyclic.
    fn validate_layer_coupling(&self, upper: LayerId, lower: LayerId) -> Result<(), NetPlanError> {
        if upper == lower {
            return Err(NetPlanError::CouplingSameLayer(upper));
        }
        let upper_units = &self.get_layer(upper)?.link_capacity_units;
        let lower_units = &self.get_layer(lower)?.demand_traffic_units;
        if upper_units != lower_units {
            return Err(NetPlanError::CouplingUnitsMismatch {
                upper: upper_units.clone(),
                lower: lower_units.clone(),
            });
        }
        let mut graph: DiGraphMap<LayerId, ()> = DiGraphMap::new();
        for (u, l) in self.get_layer_coupling_pairs() {
            graph.add_edge(u, l, ());
        }
        graph.add_edge(upper, lower, ());
        if is_cyclic_directed(&graph) {
            return Err(NetPlanError::CouplingCycle(upper, lower));
        }
        Ok(())
    }

    /// Remove the coupling of a link. If the link is coupled to a multicast demand, all links
    /// coupled to that multicast demand are decoupled. Decoupled links keep their current
    /// capacity as nominal capacity.
    pub fn decouple_link(&mut self, link: LinkId) -> Result<(), NetPlanError> {
        self.decouple_link_internal(link)?;
        self.after_mutation();
        Ok(())
    }

    /// Remove the coupling of a demand
    pub fn decouple_demand(&mut self, demand: DemandId) -> Result<(), NetPlanError> {
        self.get_demand(demand)?;
        match self.cache.demand_coupled_link.get(&demand).copied() {
            Some(link) => self.decouple_link(link),
            None => Err(NetPlanError::NotCoupled(demand.into())),
        }
    }

    /// Remove the coupling of a multicast demand and all its links
    pub fn decouple_multicast_demand(&mut self, md: MulticastDemandId) -> Result<(), NetPlanError> {
        self.get_multicast_demand(md)?;
        match self.cache.mdemand_coupled_links.get(&md).and_then(|m| m.values().next().copied()) {
            Some(link) => self.decouple_link(link),
            None => Err(NetPlanError::NotCoupled(md.into())),
        }
    }

    pub(crate) fn decouple_link_internal(&mut self, link: LinkId) -> Result<(), NetPlanError> {
        let coupling = self.get_link(link)?.coupling.ok_or(NetPlanError::NotCoupled(link.into()))?;
        let links: Vec<LinkId> = match coupling {
            LinkCoupling::Demand(_) => vec![link],
            LinkCoupling::MulticastDemand(md) => self
                .cache
                .mdemand_coupled_links
                .get(&md)
                .map(|m| m.values().copied().collect())
                .unwrap_or_default(),
        };
        let mut capacities = Vec::with_capacity(links.len());
        for l in links.iter() {
            capacities.push(self.get_link_capacity(*l)?);
        }
        for (l, capacity) in links.into_iter().zip(capacities) {
            let x = self.link_mut(l)?;
            x.capacity = capacity;
            x.coupling = None;
            let x = x.clone();
            self.cache.remove_coupling(&x, coupling);
            debug!("Decoupled link {:?} from {:?}", l, coupling);
        }
        Ok(())
    }

    /// Returns the upper-layer link coupled to the demand
    pub fn get_demand_coupled_link(&self, demand: DemandId) -> Option<LinkId> {
        self.cache.demand_coupled_link.get(&demand).copied()
    }

    /// Returns the upper-layer links coupled to the multicast demand, per egress node
    pub fn get_multicast_demand_coupled_links(
        &self,
        md: MulticastDemandId,
    ) -> BTreeMap<NodeId, LinkId> {
        self.cache.mdemand_coupled_links.get(&md).cloned().unwrap_or_default()
    }

    /// Returns the lower-layer element the link is coupled to
    pub fn get_link_coupling(&self, link: LinkId) -> Result<Option<LinkCoupling>, NetPlanError> {
        Ok(self.get_link(link)?.coupling)
    }

    /// Returns all pairs `(upper, lower)` of layers such that a link of `upper` is coupled to a
    /// demand or multicast demand of `lower`.
    pub fn get_layer_coupling_pairs(&self) -> BTreeSet<(LayerId, LayerId)> {
        let mut pairs = BTreeSet::new();
        for layer in self.layers.iter() {
            for link in layer.links.iter() {
                let lower = match link.coupling {
                    Some(LinkCoupling::Demand(d)) => self.get_element_layer(d),
                    Some(LinkCoupling::MulticastDemand(md)) => self.get_element_layer(md),
                    None => continue,
                };
                if let Ok(lower) = lower {
                    pairs.insert((layer.id, lower));
                }
            }
        }
        pairs
    }

    /// Returns all layers ordered from top to bottom: every layer comes before the layers its
    /// links are coupled to.
    pub fn get_layers_top_down(&self) -> Result<Vec<LayerId>, NetPlanError> {
        let mut graph: DiGraphMap<LayerId, ()> = DiGraphMap::new();
        for layer in self.layers.iter() {
            graph.add_node(layer.id);
        }
        for (u, l) in self.get_layer_coupling_pairs() {
            graph.add_edge(u, l, ());
        }
        toposort(&graph, None).map_err(|c| NetPlanError::CouplingCycle(c.node_id(), c.node_id()))
    }
}
