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

//! # Hop-by-hop routing
//!
//! Forwarding rules assign to each (demand, link) pair the fraction of the demand traffic that
//! enters the origin node of the link and leaves over it. The traffic of a demand is obtained by
//! injecting a unit flow at the ingress, pushing it through the fractions hop by hop, and scaling
//! the result with the (effective) offered traffic. Traffic is absorbed at the egress node, and
//! dropped at failed links and nodes, as well as at nodes where the outgoing fractions sum up to
//! less than one.
//!
//! Rules are checked for loops when they are set. The check ignores failures, since a failure can
//! only remove links from the forwarding graph.

use super::cache::LayerTraffic;
use super::elements::*;
use super::network::NetPlan;
use super::types::*;

use log::{debug, warn};
use std::collections::BTreeMap;

/// Result of pushing a unit flow through the forwarding rules of a demand
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct UnitFlow {
    /// Fraction of the offered traffic traversing each link
    pub links: BTreeMap<LinkId, f64>,
    /// Fraction of the offered traffic reaching the egress node
    pub delivered: f64,
}

impl NetPlan {
    /// Replace all forwarding rules of a hop-by-hop layer. Entries with a fraction of zero are
    /// ignored.
    ///
    /// The call fails if a demand or link is not part of the layer, if a fraction is negative, if
    /// the fractions of a demand leaving a node sum up to more than one (plus the configured
    /// tolerance), or if the rules make traffic circulate in a loop.
    pub fn set_forwarding_rules(
        &mut self,
        layer: LayerId,
        rules: BTreeMap<(DemandId, LinkId), f64>,
    ) -> Result<(), NetPlanError> {
        self.require_routing_type(layer, RoutingType::HopByHopRouting)?;
        let rules: BTreeMap<(DemandId, LinkId), f64> =
            rules.into_iter().filter(|(_, f)| *f != 0.0).collect();
        self.validate_forwarding_rules(layer, &rules)?;
        debug!("Set {} forwarding rules in layer {:?}", rules.len(), layer);
        self.layer_mut(layer)?.forwarding_rules = rules;
        self.refresh_layer_traffic(layer)?;
        self.after_mutation();
        Ok(())
    }

    /// Set the forwarding fraction of a single (demand, link) pair. A fraction of zero removes the
    /// rule.
    pub fn set_forwarding_rule(
        &mut self,
        demand: DemandId,
        link: LinkId,
        fraction: f64,
    ) -> Result<(), NetPlanError> {
        let layer = self.get_demand(demand)?.layer;
        let mut rules = self.get_layer(layer)?.forwarding_rules.clone();
        rules.insert((demand, link), fraction);
        self.set_forwarding_rules(layer, rules)
    }

    /// Set the forwarding rules from a dense matrix. `f_de[d][e]` is the fraction of the demand
    /// with index `d` on the link with index `e`.
    pub fn set_forwarding_rules_from_matrix(
        &mut self,
        layer: LayerId,
        f_de: &[Vec<f64>],
    ) -> Result<(), NetPlanError> {
        let l = self.get_layer(layer)?;
        let (demands, links) = (l.demands.len(), l.links.len());
        if f_de.len() != demands || f_de.iter().any(|row| row.len() != links) {
            return Err(NetPlanError::MatrixDimensions { demands, links });
        }
        let mut rules = BTreeMap::new();
        for (d, row) in l.demands.iter().zip(f_de.iter()) {
            for (e, f) in l.links.iter().zip(row.iter()) {
                if *f != 0.0 {
                    rules.insert((d.id, e.id), *f);
                }
            }
        }
        self.set_forwarding_rules(layer, rules)
    }

    /// Returns the forwarding rules of a layer as a dense matrix, indexed by demand index and link
    /// index.
    pub fn get_forwarding_rules_matrix(
        &self,
        layer: LayerId,
    ) -> Result<Vec<Vec<f64>>, NetPlanError> {
        let l = self.get_layer(layer)?;
        let mut f_de = vec![vec![0.0; l.links.len()]; l.demands.len()];
        for ((d, e), f) in l.forwarding_rules.iter() {
            if let (Some(d), Some(e)) = (l.demands.get(d.0), l.links.get(e.0)) {
                f_de[d.index][e.index] = *f;
            }
        }
        Ok(f_de)
    }

    /// Returns the forwarding fraction of a (demand, link) pair, or zero if no rule is set.
    pub fn get_forwarding_rule(&self, demand: DemandId, link: LinkId) -> Result<f64, NetPlanError> {
        let layer = self.get_demand(demand)?.layer;
        Ok(self.get_layer(layer)?.forwarding_rules.get(&(demand, link)).copied().unwrap_or(0.0))
    }

    /// Returns all non-zero forwarding rules of a demand
    pub fn get_demand_forwarding_rules(
        &self,
        demand: DemandId,
    ) -> Result<BTreeMap<LinkId, f64>, NetPlanError> {
        let layer = self.get_demand(demand)?.layer;
        Ok(demand_rules(&self.get_layer(layer)?.forwarding_rules, demand).collect())
    }

    pub(crate) fn validate_forwarding_rules(
        &self,
        layer: LayerId,
        rules: &BTreeMap<(DemandId, LinkId), f64>,
    ) -> Result<(), NetPlanError> {
        let l = self.get_layer(layer)?;
        let mut sums: BTreeMap<(DemandId, NodeId), f64> = BTreeMap::new();
        for ((d, e), f) in rules.iter() {
            let demand_layer = self.get_element_layer(*d)?;
            if demand_layer != layer {
                return Err(NetPlanError::WrongLayer {
                    element: (*d).into(),
                    expected: layer,
                    found: demand_layer,
                });
            }
            let link = self.get_link(*e)?;
            if link.layer != layer {
                return Err(NetPlanError::WrongLayer {
                    element: (*e).into(),
                    expected: layer,
                    found: link.layer,
                });
            }
            if !(*f >= 0.0) {
                return Err(NetPlanError::NegativeForwardingFraction(*d, *e, *f));
            }
            *sums.entry((*d, link.origin)).or_insert(0.0) += *f;
        }
        for ((demand, node), sum) in sums {
            if sum > 1.0 + self.config.forwarding_rule_tolerance {
                return Err(NetPlanError::ForwardingFractionExceeded { demand, node, sum });
            }
        }
        for demand in l.demands.iter() {
            self.unit_flow(l, rules, demand, false)?;
        }
        Ok(())
    }

    fn link_usable_in(&self, link: &Link) -> bool {
        let node_up = |n: NodeId| self.nodes.get(n.0).map(|x| x.is_up).unwrap_or(false);
        link.is_up && node_up(link.origin) && node_up(link.destination)
    }

    /// Push a unit flow from the ingress of the demand through the forwarding rules. If
    /// `respect_failures` is set, traffic entering failed links or nodes is dropped. Fails with
    /// [`NetPlanError::RoutingLoop`] if the flow does not drain within the hop bound.
    pub(crate) fn unit_flow(
        &self,
        layer: &NetworkLayer,
        rules: &BTreeMap<(DemandId, LinkId), f64>,
        demand: &Demand,
        respect_failures: bool,
    ) -> Result<UnitFlow, NetPlanError> {
        let mut out: BTreeMap<NodeId, Vec<(LinkId, NodeId, f64)>> = BTreeMap::new();
        for (l, f) in demand_rules(rules, demand.id) {
            let link = layer.links.get(l.0).ok_or(NetPlanError::ElementNotFound(l.into()))?;
            if respect_failures && !self.link_usable_in(link) {
                continue;
            }
            out.entry(link.origin).or_default().push((l, link.destination, f));
        }

        let mut result = UnitFlow::default();
        let mut current: BTreeMap<NodeId, f64> = BTreeMap::new();
        current.insert(demand.ingress, 1.0);
        for _ in 0..=self.config.hop_bound(self.nodes.len()) {
            if current.is_empty() {
                return Ok(result);
            }
            let mut next: BTreeMap<NodeId, f64> = BTreeMap::new();
            for (node, x) in current {
                if node == demand.egress {
                    result.delivered += x;
                    continue;
                }
                for (l, dst, f) in out.get(&node).into_iter().flatten() {
                    let t = x * f;
                    *result.links.entry(*l).or_insert(0.0) += t;
                    *next.entry(*dst).or_insert(0.0) += t;
                }
            }
            current = next;
        }
        warn!("Traffic of demand {:?} does not drain: forwarding loop", demand.id);
        Err(NetPlanError::RoutingLoop(demand.id))
    }

    /// Compute the hop-by-hop traffic of every demand of the layer from the canonical state.
    /// Demands are evaluated such that senders come before the demands they are aggregated into.
    pub(crate) fn compute_layer_traffic(
        &self,
        layer: &NetworkLayer,
    ) -> Result<LayerTraffic, NetPlanError> {
        let mut senders: BTreeMap<DemandId, Vec<(DemandId, f64)>> = BTreeMap::new();
        for d in layer.demands.iter() {
            for (r, w) in d.aggregated_into.iter() {
                senders.entry(*r).or_default().push((d.id, *w));
            }
        }
        let mut traffic = LayerTraffic::default();
        for id in self.aggregation_order(layer)? {
            let demand = layer.demands.get(id.0).ok_or(NetPlanError::ElementNotFound(id.into()))?;
            let offered = demand.offered_traffic
                + senders
                    .get(&id)
                    .into_iter()
                    .flatten()
                    .map(|(s, w)| w * traffic.carried.get(s).copied().unwrap_or(0.0))
                    .sum::<f64>();
            let flow = self.unit_flow(layer, &layer.forwarding_rules, demand, true)?;
            for (l, f) in flow.links {
                if f * offered != 0.0 {
                    traffic.link_traffic.insert((id, l), f * offered);
                }
            }
            traffic.carried.insert(id, flow.delivered * offered);
        }
        Ok(traffic)
    }

    /// Recompute the hop-by-hop traffic of a layer, or drop it if the layer is in source routing.
    pub(crate) fn refresh_layer_traffic(&mut self, layer: LayerId) -> Result<(), NetPlanError> {
        let l = self.get_layer(layer)?;
        let traffic = match l.routing_type {
            RoutingType::HopByHopRouting => Some(self.compute_layer_traffic(l)?),
            RoutingType::SourceRouting => None,
        };
        match traffic {
            Some(t) => self.cache.hop_by_hop.insert(layer, t),
            None => self.cache.hop_by_hop.remove(&layer),
        };
        Ok(())
    }

    pub(crate) fn refresh_all_traffic(&mut self) -> Result<(), NetPlanError> {
        for layer in self.get_layer_ids() {
            self.refresh_layer_traffic(layer)?;
        }
        Ok(())
    }
}

/// Iterate over the (link, fraction) pairs of a demand.
pub(crate) fn demand_rules(
    rules: &BTreeMap<(DemandId, LinkId), f64>,
    demand: DemandId,
) -> impl Iterator<Item = (LinkId, f64)> + '_ {
    rules.range((demand, LinkId(0))..=(demand, LinkId(u64::MAX))).map(|((_, l), f)| (*l, *f))
}
