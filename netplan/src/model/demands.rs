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

//! Unicast and multicast demands, and the aggregation of demands.

use super::cache::{insert_nested, remove_nested};
use super::elements::*;
use super::network::{get_set, non_negative, NetPlan};
use super::types::*;

use log::debug;
use petgraph::algo::{is_cyclic_directed, toposort};
use petgraph::graphmap::DiGraphMap;
use std::collections::{BTreeMap, BTreeSet};

impl NetPlan {
    // ---------------------------------------------------------------------------------------------
    // unicast demands
    // ---------------------------------------------------------------------------------------------

    /// Add a unicast demand to a layer.
    pub fn add_demand(
        &mut self,
        layer: LayerId,
        ingress: NodeId,
        egress: NodeId,
        offered_traffic: f64,
    ) -> Result<DemandId, NetPlanError> {
        self.get_layer(layer)?;
        self.get_node(ingress)?;
        self.get_node(egress)?;
        if ingress == egress {
            return Err(NetPlanError::SameEndNodes(ingress));
        }
        non_negative("offered traffic", offered_traffic)?;
        let id = DemandId(self.new_id());
        let demand = Demand {
            id,
            index: 0,
            layer,
            ingress,
            egress,
            offered_traffic,
            recovery_type: IntendedRecoveryType::default(),
            service_chain: Vec::new(),
            aggregated_into: BTreeMap::new(),
            meta: Metadata::default(),
        };
        debug!("Add demand {:?} in layer {:?}: {:?} -> {:?}", id, layer, ingress, egress);
        self.cache.add_demand(&demand);
        self.layer_mut(layer)?.demands.insert(demand);
        self.refresh_layer_traffic(layer)?;
        self.after_mutation();
        Ok(id)
    }

    /// Remove a demand, together with its routes and forwarding rules. A coupled upper-layer link
    /// is decoupled (keeping its current capacity), and all aggregation relations of the demand
    /// are dropped.
    pub fn remove_demand(&mut self, demand: DemandId) -> Result<(), NetPlanError> {
        let layer = self.get_demand(demand)?.layer;
        self.remove_demand_internal(demand)?;
        self.refresh_layer_traffic(layer)?;
        debug!("Removed demand {:?}", demand);
        self.after_mutation();
        Ok(())
    }

    pub(crate) fn remove_demand_internal(&mut self, demand: DemandId) -> Result<(), NetPlanError> {
        let layer = self.get_demand(demand)?.layer;
        if let Some(link) = self.cache.demand_coupled_link.get(&demand).copied() {
            self.decouple_link_internal(link)?;
        }
        for r in get_set(&self.cache.demand_routes, &demand) {
            self.remove_route_internal(r)?;
        }
        let senders: Vec<DemandId> = self
            .cache
            .aggregated_from
            .remove(&demand)
            .map(|m| m.into_iter().map(|(s, _)| s).collect())
            .unwrap_or_default();
        for s in senders {
            self.demand_mut(s)?.aggregated_into.remove(&demand);
        }
        let l = self.layer_mut(layer)?;
        l.forwarding_rules.retain(|(d, _), _| *d != demand);
        if let Some(removed) = l.demands.remove(demand.0) {
            self.cache.remove_demand(&removed);
        }
        Ok(())
    }

    /// Returns the demand
    pub fn get_demand(&self, demand: DemandId) -> Result<&Demand, NetPlanError> {
        self.scoped(demand.into(), |l| &l.demands)
    }

    pub(crate) fn demand_mut(&mut self, demand: DemandId) -> Result<&mut Demand, NetPlanError> {
        self.scoped_mut(demand.into(), |l| &mut l.demands)
    }

    /// Returns all demands of a layer, in order
    pub fn get_demands(
        &self,
        layer: LayerId,
    ) -> Result<impl Iterator<Item = &Demand>, NetPlanError> {
        Ok(self.get_layer(layer)?.demands.iter())
    }

    /// Returns the ids of all demands of a layer, in order
    pub fn get_demand_ids(&self, layer: LayerId) -> Result<Vec<DemandId>, NetPlanError> {
        Ok(self.get_demands(layer)?.map(|d| d.id).collect())
    }

    /// Returns the number of demands of a layer
    pub fn get_number_of_demands(&self, layer: LayerId) -> Result<usize, NetPlanError> {
        Ok(self.get_layer(layer)?.demands.len())
    }

    /// Set the own offered traffic of a demand
    pub fn set_demand_offered_traffic(
        &mut self,
        demand: DemandId,
        offered_traffic: f64,
    ) -> Result<(), NetPlanError> {
        non_negative("offered traffic", offered_traffic)?;
        let d = self.demand_mut(demand)?;
        d.offered_traffic = offered_traffic;
        let layer = d.layer;
        self.refresh_layer_traffic(layer)?;
        self.after_mutation();
        Ok(())
    }

    /// Set the intended recovery type of a demand
    pub fn set_demand_recovery_type(
        &mut self,
        demand: DemandId,
        recovery_type: IntendedRecoveryType,
    ) -> Result<(), NetPlanError> {
        self.demand_mut(demand)?.recovery_type = recovery_type;
        self.after_mutation();
        Ok(())
    }

    /// Set the sequence of resource types the traffic of the demand must traverse. All existing
    /// routes of the demand must traverse resources of exactly these types.
    pub fn set_demand_service_chain(
        &mut self,
        demand: DemandId,
        resource_types: Vec<String>,
    ) -> Result<(), NetPlanError> {
        self.get_demand(demand)?;
        for r in get_set(&self.cache.demand_routes, &demand) {
            let found = self.route_resource_types(self.get_route(r)?)?;
            if found != resource_types {
                return Err(NetPlanError::ServiceChainMismatch { expected: resource_types, found });
            }
        }
        self.demand_mut(demand)?.service_chain = resource_types;
        self.after_mutation();
        Ok(())
    }

    // ---------------------------------------------------------------------------------------------
    // aggregation
    // ---------------------------------------------------------------------------------------------

    /// Fold the carried traffic of `sender` into the offered traffic of each receiving demand,
    /// scaled by the given weight. Existing relations towards the same receivers are overwritten.
    ///
    /// Each receiver must be a different demand of the same layer, starting at the egress node of
    /// the sender, and the resulting aggregation graph must stay acyclic.
    pub fn attach_to_aggregated_demands(
        &mut self,
        sender: DemandId,
        receivers: BTreeMap<DemandId, f64>,
    ) -> Result<(), NetPlanError> {
        let s = self.get_demand(sender)?;
        let (layer, egress) = (s.layer, s.egress);
        let mut graph: DiGraphMap<DemandId, ()> = DiGraphMap::new();
        for d in self.get_layer(layer)?.demands.iter() {
            graph.add_node(d.id);
            for r in d.aggregated_into.keys() {
                graph.add_edge(d.id, *r, ());
            }
        }
        for (receiver, weight) in receivers.iter() {
            non_negative("aggregation weight", *weight)?;
            if *receiver == sender {
                return Err(NetPlanError::InvalidAggregation(sender, *receiver, "same demand"));
            }
            let r = self.get_demand(*receiver)?;
            if r.layer != layer {
                return Err(NetPlanError::InvalidAggregation(sender, *receiver, "different layers"));
            }
            if r.ingress != egress {
                return Err(NetPlanError::InvalidAggregation(
                    sender,
                    *receiver,
                    "receiver does not start at the egress of the sender",
                ));
            }
            graph.add_edge(sender, *receiver, ());
            if is_cyclic_directed(&graph) {
                return Err(NetPlanError::AggregationCycle(sender, *receiver));
            }
        }

        for (receiver, weight) in receivers {
            self.demand_mut(sender)?.aggregated_into.insert(receiver, weight);
            insert_nested(&mut self.cache.aggregated_from, receiver, sender, weight);
        }
        debug!(
            "Demand {:?} is now aggregated into {:?}",
            sender,
            self.get_demand(sender)?.aggregated_into
        );
        self.refresh_layer_traffic(layer)?;
        self.after_mutation();
        Ok(())
    }

    /// Remove the aggregation relations from `sender` to the given receivers.
    pub fn detach_from_aggregated_demands(
        &mut self,
        sender: DemandId,
        receivers: impl IntoIterator<Item = DemandId>,
    ) -> Result<(), NetPlanError> {
        let layer = self.get_demand(sender)?.layer;
        for receiver in receivers {
            if self.demand_mut(sender)?.aggregated_into.remove(&receiver).is_some() {
                remove_nested(&mut self.cache.aggregated_from, receiver, &sender);
            }
        }
        self.refresh_layer_traffic(layer)?;
        self.after_mutation();
        Ok(())
    }

    /// Returns the demands aggregated into this demand, together with their weights.
    pub fn get_demand_aggregated_from(&self, demand: DemandId) -> BTreeMap<DemandId, f64> {
        self.cache.aggregated_from.get(&demand).cloned().unwrap_or_default()
    }

    /// Returns the demands of a layer in an order where every sender comes before all demands it
    /// is aggregated into.
    pub(crate) fn aggregation_order(
        &self,
        layer: &NetworkLayer,
    ) -> Result<Vec<DemandId>, NetPlanError> {
        let mut graph: DiGraphMap<DemandId, ()> = DiGraphMap::new();
        for d in layer.demands.iter() {
            graph.add_node(d.id);
            for r in d.aggregated_into.keys() {
                graph.add_edge(d.id, *r, ());
            }
        }
        toposort(&graph, None).map_err(|c| NetPlanError::AggregationCycle(c.node_id(), c.node_id()))
    }

    // ---------------------------------------------------------------------------------------------
    // multicast demands
    // ---------------------------------------------------------------------------------------------

    /// Add a multicast demand from `ingress` to every node in `egresses`.
    pub fn add_multicast_demand(
        &mut self,
        layer: LayerId,
        ingress: NodeId,
        egresses: BTreeSet<NodeId>,
        offered_traffic: f64,
    ) -> Result<MulticastDemandId, NetPlanError> {
        self.get_layer(layer)?;
        self.get_node(ingress)?;
        for e in egresses.iter() {
            self.get_node(*e)?;
        }
        if egresses.contains(&ingress) {
            return Err(NetPlanError::SameEndNodes(ingress));
        }
        if egresses.is_empty() {
            return Err(NetPlanError::InvalidMulticastTree(
                "a multicast demand needs an egress node",
            ));
        }
        non_negative("offered traffic", offered_traffic)?;
        let id = MulticastDemandId(self.new_id());
        let md = MulticastDemand {
            id,
            index: 0,
            layer,
            ingress,
            egresses,
            offered_traffic,
            meta: Metadata::default(),
        };
        debug!(
            "Add multicast demand {:?} in layer {:?}: {:?} -> {:?}",
            id, layer, ingress, md.egresses
        );
        self.cache.add_multicast_demand(&md);
        self.layer_mut(layer)?.multicast_demands.insert(md);
        self.after_mutation();
        Ok(id)
    }

    /// Remove a multicast demand, together with its trees. Coupled upper-layer links are
    /// decoupled.
    pub fn remove_multicast_demand(&mut self, md: MulticastDemandId) -> Result<(), NetPlanError> {
        self.get_multicast_demand(md)?;
        self.remove_multicast_demand_internal(md)?;
        debug!("Removed multicast demand {:?}", md);
        self.after_mutation();
        Ok(())
    }

    pub(crate) fn remove_multicast_demand_internal(
        &mut self,
        md: MulticastDemandId,
    ) -> Result<(), NetPlanError> {
        let layer = self.get_multicast_demand(md)?.layer;
        let coupled =
            self.cache.mdemand_coupled_links.get(&md).and_then(|m| m.values().next().copied());
        if let Some(link) = coupled {
            self.decouple_link_internal(link)?;
        }
        for t in get_set(&self.cache.mdemand_trees, &md) {
            self.remove_multicast_tree_internal(t)?;
        }
        if let Some(removed) = self.layer_mut(layer)?.multicast_demands.remove(md.0) {
            self.cache.remove_multicast_demand(&removed);
        }
        Ok(())
    }

    /// Returns the multicast demand
    pub fn get_multicast_demand(
        &self,
        md: MulticastDemandId,
    ) -> Result<&MulticastDemand, NetPlanError> {
        self.scoped(md.into(), |l| &l.multicast_demands)
    }

    /// Returns all multicast demands of a layer, in order
    pub fn get_multicast_demands(
        &self,
        layer: LayerId,
    ) -> Result<impl Iterator<Item = &MulticastDemand>, NetPlanError> {
        Ok(self.get_layer(layer)?.multicast_demands.iter())
    }

    /// Returns the number of multicast demands of a layer
    pub fn get_number_of_multicast_demands(&self, layer: LayerId) -> Result<usize, NetPlanError> {
        Ok(self.get_layer(layer)?.multicast_demands.len())
    }

    /// Set the offered traffic of a multicast demand
    pub fn set_multicast_demand_offered_traffic(
        &mut self,
        md: MulticastDemandId,
        offered_traffic: f64,
    ) -> Result<(), NetPlanError> {
        non_negative("offered traffic", offered_traffic)?;
        self.scoped_mut(md.into(), |l| &mut l.multicast_demands)?.offered_traffic = offered_traffic;
        self.after_mutation();
        Ok(())
    }
}
