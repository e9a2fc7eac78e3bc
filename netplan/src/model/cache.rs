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

//! # Derived caches
//!
//! All structures in [`Caches`] are a pure function of the canonical state of a
//! [`NetPlan`](super::NetPlan). They are updated incrementally on every mutation, and
//! [`Caches::rebuild`] computes them from scratch. The consistency check compares both.
//!
//! Relation maps never contain empty entries, such that an incrementally maintained cache and a
//! rebuilt one are structurally equal.

use super::elements::*;
use super::network::NetPlan;
use super::registry::Indexed;
use super::types::*;

use log::error;
use std::collections::{BTreeMap, BTreeSet};

/// Location of an element: its reference and, for layer-scoped elements, its layer.
pub(crate) type Location = (ElementRef, Option<LayerId>);

/// Hop-by-hop traffic of a single layer
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct LayerTraffic {
    /// Traffic of each demand on each link. Zero entries are omitted.
    pub link_traffic: BTreeMap<(DemandId, LinkId), f64>,
    /// Traffic of each demand reaching its egress node.
    pub carried: BTreeMap<DemandId, f64>,
}

/// Derived indices of a plan
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Caches {
    pub locator: BTreeMap<u64, Location>,
    pub node_out_links: BTreeMap<(NodeId, LayerId), BTreeSet<LinkId>>,
    pub node_in_links: BTreeMap<(NodeId, LayerId), BTreeSet<LinkId>>,
    pub node_out_demands: BTreeMap<(NodeId, LayerId), BTreeSet<DemandId>>,
    pub node_in_demands: BTreeMap<(NodeId, LayerId), BTreeSet<DemandId>>,
    pub node_out_mdemands: BTreeMap<(NodeId, LayerId), BTreeSet<MulticastDemandId>>,
    pub node_in_mdemands: BTreeMap<(NodeId, LayerId), BTreeSet<MulticastDemandId>>,
    pub node_resources: BTreeMap<NodeId, BTreeSet<ResourceId>>,
    pub node_srgs: BTreeMap<NodeId, BTreeSet<SrgId>>,
    pub link_srgs: BTreeMap<LinkId, BTreeSet<SrgId>>,
    pub demand_routes: BTreeMap<DemandId, BTreeSet<RouteId>>,
    pub link_routes: BTreeMap<LinkId, BTreeSet<RouteId>>,
    /// Capacity occupied in each resource by each traversing route, while the route is up.
    pub resource_occupation: BTreeMap<ResourceId, BTreeMap<RouteId, f64>>,
    /// Backup route -> primary routes it protects
    pub route_backup_of: BTreeMap<RouteId, BTreeSet<RouteId>>,
    pub mdemand_trees: BTreeMap<MulticastDemandId, BTreeSet<MulticastTreeId>>,
    pub link_trees: BTreeMap<LinkId, BTreeSet<MulticastTreeId>>,
    pub demand_coupled_link: BTreeMap<DemandId, LinkId>,
    /// Multicast demand -> egress node -> coupled upper link
    pub mdemand_coupled_links: BTreeMap<MulticastDemandId, BTreeMap<NodeId, LinkId>>,
    /// Receiving demand -> sending demand -> weight
    pub aggregated_from: BTreeMap<DemandId, BTreeMap<DemandId, f64>>,
    pub down_links: BTreeSet<LinkId>,
    pub down_nodes: BTreeSet<NodeId>,
    /// Only present for layers in hop-by-hop routing
    pub hop_by_hop: BTreeMap<LayerId, LayerTraffic>,
}

pub(crate) fn insert_rel<K: Ord, V: Ord>(map: &mut BTreeMap<K, BTreeSet<V>>, key: K, value: V) {
    map.entry(key).or_default().insert(value);
}

pub(crate) fn remove_rel<K: Ord, V: Ord>(map: &mut BTreeMap<K, BTreeSet<V>>, key: K, value: &V) {
    if let Some(set) = map.get_mut(&key) {
        set.remove(value);
        if set.is_empty() {
            map.remove(&key);
        }
    }
}

pub(crate) fn insert_nested<K: Ord, K2: Ord, V>(
    map: &mut BTreeMap<K, BTreeMap<K2, V>>,
    key: K,
    key2: K2,
    value: V,
) {
    map.entry(key).or_default().insert(key2, value);
}

pub(crate) fn remove_nested<K: Ord, K2: Ord, V>(
    map: &mut BTreeMap<K, BTreeMap<K2, V>>,
    key: K,
    key2: &K2,
) -> Option<V> {
    let inner = map.get_mut(&key)?;
    let value = inner.remove(key2);
    if inner.is_empty() {
        map.remove(&key);
    }
    value
}

impl Caches {
    pub fn add_layer(&mut self, layer: &NetworkLayer) {
        self.locator.insert(layer.id.0, (layer.id.into(), None));
    }

    pub fn remove_layer(&mut self, layer: &NetworkLayer) {
        self.locator.remove(&layer.id.0);
        self.hop_by_hop.remove(&layer.id);
    }

    pub fn add_node(&mut self, node: &Node) {
        self.locator.insert(node.id.0, (node.id.into(), None));
        if !node.is_up {
            self.down_nodes.insert(node.id);
        }
    }

    pub fn remove_node(&mut self, node: &Node) {
        self.locator.remove(&node.id.0);
        self.down_nodes.remove(&node.id);
    }

    pub fn add_link(&mut self, link: &Link) {
        self.locator.insert(link.id.0, (link.id.into(), Some(link.layer)));
        insert_rel(&mut self.node_out_links, (link.origin, link.layer), link.id);
        insert_rel(&mut self.node_in_links, (link.destination, link.layer), link.id);
        if !link.is_up {
            self.down_links.insert(link.id);
        }
        if let Some(coupling) = link.coupling {
            self.add_coupling(link, coupling);
        }
    }

    pub fn remove_link(&mut self, link: &Link) {
        self.locator.remove(&link.id.0);
        remove_rel(&mut self.node_out_links, (link.origin, link.layer), &link.id);
        remove_rel(&mut self.node_in_links, (link.destination, link.layer), &link.id);
        self.down_links.remove(&link.id);
        if let Some(coupling) = link.coupling {
            self.remove_coupling(link, coupling);
        }
    }

    pub fn add_coupling(&mut self, link: &Link, coupling: LinkCoupling) {
        match coupling {
            LinkCoupling::Demand(d) => {
                self.demand_coupled_link.insert(d, link.id);
            }
            LinkCoupling::MulticastDemand(md) => {
                insert_nested(&mut self.mdemand_coupled_links, md, link.destination, link.id);
            }
        }
    }

    pub fn remove_coupling(&mut self, link: &Link, coupling: LinkCoupling) {
        match coupling {
            LinkCoupling::Demand(d) => {
                self.demand_coupled_link.remove(&d);
            }
            LinkCoupling::MulticastDemand(md) => {
                remove_nested(&mut self.mdemand_coupled_links, md, &link.destination);
            }
        }
    }

    pub fn add_demand(&mut self, demand: &Demand) {
        self.locator.insert(demand.id.0, (demand.id.into(), Some(demand.layer)));
        insert_rel(&mut self.node_out_demands, (demand.ingress, demand.layer), demand.id);
        insert_rel(&mut self.node_in_demands, (demand.egress, demand.layer), demand.id);
        for (receiver, weight) in demand.aggregated_into.iter() {
            insert_nested(&mut self.aggregated_from, *receiver, demand.id, *weight);
        }
    }

    pub fn remove_demand(&mut self, demand: &Demand) {
        self.locator.remove(&demand.id.0);
        remove_rel(&mut self.node_out_demands, (demand.ingress, demand.layer), &demand.id);
        remove_rel(&mut self.node_in_demands, (demand.egress, demand.layer), &demand.id);
        for receiver in demand.aggregated_into.keys() {
            remove_nested(&mut self.aggregated_from, *receiver, &demand.id);
        }
    }

    pub fn add_multicast_demand(&mut self, md: &MulticastDemand) {
        self.locator.insert(md.id.0, (md.id.into(), Some(md.layer)));
        insert_rel(&mut self.node_out_mdemands, (md.ingress, md.layer), md.id);
        for egress in md.egresses.iter() {
            insert_rel(&mut self.node_in_mdemands, (*egress, md.layer), md.id);
        }
    }

    pub fn remove_multicast_demand(&mut self, md: &MulticastDemand) {
        self.locator.remove(&md.id.0);
        remove_rel(&mut self.node_out_mdemands, (md.ingress, md.layer), &md.id);
        for egress in md.egresses.iter() {
            remove_rel(&mut self.node_in_mdemands, (*egress, md.layer), &md.id);
        }
    }

    pub fn add_route(&mut self, route: &Route) {
        self.locator.insert(route.id.0, (route.id.into(), Some(route.layer)));
        insert_rel(&mut self.demand_routes, route.demand, route.id);
        for (elem, occupied) in route.path.iter().zip(route.occupied.iter()) {
            match elem {
                PathElement::Link(l) => insert_rel(&mut self.link_routes, *l, route.id),
                PathElement::Resource(r) => {
                    *self
                        .resource_occupation
                        .entry(*r)
                        .or_default()
                        .entry(route.id)
                        .or_insert(0.0) += *occupied;
                }
            }
        }
        for backup in route.backup_routes.iter() {
            insert_rel(&mut self.route_backup_of, *backup, route.id);
        }
    }

    pub fn remove_route(&mut self, route: &Route) {
        self.locator.remove(&route.id.0);
        remove_rel(&mut self.demand_routes, route.demand, &route.id);
        for elem in route.path.iter() {
            match elem {
                PathElement::Link(l) => remove_rel(&mut self.link_routes, *l, &route.id),
                PathElement::Resource(r) => {
                    remove_nested(&mut self.resource_occupation, *r, &route.id);
                }
            }
        }
        for backup in route.backup_routes.iter() {
            remove_rel(&mut self.route_backup_of, *backup, &route.id);
        }
    }

    pub fn add_multicast_tree(&mut self, tree: &MulticastTree) {
        self.locator.insert(tree.id.0, (tree.id.into(), Some(tree.layer)));
        insert_rel(&mut self.mdemand_trees, tree.demand, tree.id);
        for link in tree.links.iter() {
            insert_rel(&mut self.link_trees, *link, tree.id);
        }
    }

    pub fn remove_multicast_tree(&mut self, tree: &MulticastTree) {
        self.locator.remove(&tree.id.0);
        remove_rel(&mut self.mdemand_trees, tree.demand, &tree.id);
        for link in tree.links.iter() {
            remove_rel(&mut self.link_trees, *link, &tree.id);
        }
    }

    pub fn add_resource(&mut self, resource: &Resource) {
        self.locator.insert(resource.id.0, (resource.id.into(), None));
        insert_rel(&mut self.node_resources, resource.host, resource.id);
    }

    pub fn remove_resource(&mut self, resource: &Resource) {
        self.locator.remove(&resource.id.0);
        remove_rel(&mut self.node_resources, resource.host, &resource.id);
        self.resource_occupation.remove(&resource.id);
    }

    pub fn add_srg(&mut self, srg: &SharedRiskGroup) {
        self.locator.insert(srg.id.0, (srg.id.into(), None));
        for node in srg.nodes.iter() {
            insert_rel(&mut self.node_srgs, *node, srg.id);
        }
        for link in srg.links.iter() {
            insert_rel(&mut self.link_srgs, *link, srg.id);
        }
    }

    pub fn remove_srg(&mut self, srg: &SharedRiskGroup) {
        self.locator.remove(&srg.id.0);
        for node in srg.nodes.iter() {
            remove_rel(&mut self.node_srgs, *node, &srg.id);
        }
        for link in srg.links.iter() {
            remove_rel(&mut self.link_srgs, *link, &srg.id);
        }
    }

    /// Compute all caches from the canonical state of the plan.
    pub fn rebuild(plan: &NetPlan) -> Result<Self, NetPlanError> {
        let mut c = Self::default();
        for node in plan.nodes.iter() {
            c.add_node(node);
        }
        for resource in plan.resources.iter() {
            c.add_resource(resource);
        }
        for srg in plan.srgs.iter() {
            c.add_srg(srg);
        }
        for layer in plan.layers.iter() {
            c.add_layer(layer);
            layer.links.iter().for_each(|x| c.add_link(x));
            layer.demands.iter().for_each(|x| c.add_demand(x));
            layer.multicast_demands.iter().for_each(|x| c.add_multicast_demand(x));
            layer.routes.iter().for_each(|x| c.add_route(x));
            layer.multicast_trees.iter().for_each(|x| c.add_multicast_tree(x));
            if layer.routing_type == RoutingType::HopByHopRouting {
                c.hop_by_hop.insert(layer.id, plan.compute_layer_traffic(layer)?);
            }
        }
        Ok(c)
    }

    /// Compare two caches, and return a description of the first difference.
    fn diff(&self, other: &Self) -> Option<String> {
        macro_rules! cmp {
            ($($field:ident),*) => {
                $(
                    if self.$field != other.$field {
                        return Some(format!(
                            "cache `{}` differs: live {:?}, expected {:?}",
                            stringify!($field),
                            self.$field,
                            other.$field
                        ));
                    }
                )*
            };
        }
        cmp!(
            locator,
            node_out_links,
            node_in_links,
            node_out_demands,
            node_in_demands,
            node_out_mdemands,
            node_in_mdemands,
            node_resources,
            node_srgs,
            link_srgs,
            demand_routes,
            link_routes,
            resource_occupation,
            route_backup_of,
            mdemand_trees,
            link_trees,
            demand_coupled_link,
            mdemand_coupled_links,
            aggregated_from,
            down_links,
            down_nodes,
            hop_by_hop
        );
        None
    }
}

impl NetPlan {
    /// Recompute every derived structure from the canonical state and compare it with the live
    /// caches. Additionally, check that all indices are contiguous, and that all relations point
    /// to existing elements. Any mismatch returns [`NetPlanError::InternalInconsistency`], after
    /// which the plan must be discarded.
    pub fn check_caches_consistency(&self) -> Result<(), NetPlanError> {
        self.check_canonical_state().map_err(|e| {
            error!("Canonical state of the plan is inconsistent: {}", e);
            NetPlanError::InternalInconsistency(e)
        })?;
        let expected = Caches::rebuild(self)?;
        match self.cache.diff(&expected) {
            None => Ok(()),
            Some(e) => {
                error!("Caches of the plan are inconsistent: {}", e);
                Err(NetPlanError::InternalInconsistency(e))
            }
        }
    }

    /// Run the consistency check if the configuration requests it.
    ///
    /// # Panics
    /// Panics if the caches are inconsistent.
    pub(crate) fn after_mutation(&self) {
        if self.config.check_caches_after_mutation {
            if let Err(e) = self.check_caches_consistency() {
                panic!("{}", e);
            }
        }
    }

    fn check_canonical_state(&self) -> Result<(), String> {
        self.layers.check_contiguity()?;
        self.nodes.check_contiguity()?;
        self.resources.check_contiguity()?;
        self.srgs.check_contiguity()?;
        if self.layers.is_empty() {
            return Err("plan has no layer".to_string());
        }
        if !self.layers.contains(self.default_layer.0) {
            return Err(format!("default layer {:?} does not exist", self.default_layer));
        }
        let node_ok = |n: &NodeId| self.nodes.contains(n.0);
        for r in self.resources.iter() {
            if !node_ok(&r.host) {
                return Err(format!("host of resource {:?} does not exist", r.id));
            }
        }
        for srg in self.srgs.iter() {
            if !srg.nodes.iter().all(node_ok) {
                return Err(format!("srg {:?} contains an unknown node", srg.id));
            }
            if !srg.links.iter().all(|l| self.layers.iter().any(|x| x.links.contains(l.0))) {
                return Err(format!("srg {:?} contains an unknown link", srg.id));
            }
        }
        let find_demand = |d: DemandId| self.layers.iter().find_map(|x| x.demands.get(d.0));
        let find_md = |md: MulticastDemandId| {
            self.layers.iter().find_map(|x| x.multicast_demands.get(md.0))
        };
        for layer in self.layers.iter() {
            layer.links.check_contiguity()?;
            layer.demands.check_contiguity()?;
            layer.multicast_demands.check_contiguity()?;
            layer.routes.check_contiguity()?;
            layer.multicast_trees.check_contiguity()?;
            for link in layer.links.iter() {
                if link.layer != layer.id || !node_ok(&link.origin) || !node_ok(&link.destination) {
                    return Err(format!("link {:?} has an invalid layer or end node", link.id));
                }
                match link.coupling {
                    Some(LinkCoupling::Demand(d)) => match find_demand(d) {
                        Some(demand) if demand.layer != layer.id => {}
                        _ => {
                            return Err(format!(
                                "link {:?} is coupled to an invalid demand",
                                link.id
                            ))
                        }
                    },
                    Some(LinkCoupling::MulticastDemand(md)) => match find_md(md) {
                        Some(m)
                            if m.layer != layer.id && m.egresses.contains(&link.destination) => {}
                        _ => {
                            return Err(format!(
                                "link {:?} is coupled to an invalid multicast demand",
                                link.id
                            ))
                        }
                    },
                    None => {}
                }
            }
            for demand in layer.demands.iter() {
                if demand.layer != layer.id || !node_ok(&demand.ingress) || !node_ok(&demand.egress)
                {
                    return Err(format!("demand {:?} has an invalid layer or end node", demand.id));
                }
                if !demand.aggregated_into.keys().all(|d| layer.demands.contains(d.0)) {
                    return Err(format!(
                        "demand {:?} is aggregated into an unknown demand",
                        demand.id
                    ));
                }
            }
            for route in layer.routes.iter() {
                if !layer.demands.contains(route.demand.0)
                    || route.path.len() != route.occupied.len()
                {
                    return Err(format!("route {:?} is invalid", route.id));
                }
                let elements_ok = route.path.iter().all(|e| match e {
                    PathElement::Link(l) => layer.links.contains(l.0),
                    PathElement::Resource(r) => self.resources.contains(r.0),
                });
                let backups_ok = route.backup_routes.iter().all(|b| match layer.routes.get(b.0) {
                    Some(b) => b.demand == route.demand,
                    None => false,
                });
                if !elements_ok || !backups_ok {
                    return Err(format!("route {:?} references unknown elements", route.id));
                }
            }
            for tree in layer.multicast_trees.iter() {
                if !layer.multicast_demands.contains(tree.demand.0)
                    || !tree.links.iter().all(|l| layer.links.contains(l.0))
                {
                    return Err(format!("multicast tree {:?} is invalid", tree.id));
                }
            }
            if layer.routing_type == RoutingType::SourceRouting
                && !layer.forwarding_rules.is_empty()
            {
                return Err(format!("layer {:?} has forwarding rules in source routing", layer.id));
            }
            if layer.routing_type == RoutingType::HopByHopRouting && !layer.routes.is_empty() {
                return Err(format!("layer {:?} has routes in hop-by-hop routing", layer.id));
            }
            for ((d, l), f) in layer.forwarding_rules.iter() {
                if !layer.demands.contains(d.0) || !layer.links.contains(l.0) || *f <= 0.0 {
                    return Err(format!("invalid forwarding rule ({:?}, {:?})", d, l));
                }
            }
        }
        // every element id is unique and smaller than the id counter
        let mut ids: BTreeSet<u64> = BTreeSet::new();
        let mut push = |id: u64| ids.insert(id) && id < self.next_id;
        let mut unique = true;
        unique &= self.nodes.iter().all(|x| push(x.raw_id()));
        unique &= self.resources.iter().all(|x| push(x.raw_id()));
        unique &= self.srgs.iter().all(|x| push(x.raw_id()));
        for layer in self.layers.iter() {
            unique &= push(layer.raw_id());
            unique &= layer.links.iter().all(|x| push(x.raw_id()));
            unique &= layer.demands.iter().all(|x| push(x.raw_id()));
            unique &= layer.multicast_demands.iter().all(|x| push(x.raw_id()));
            unique &= layer.routes.iter().all(|x| push(x.raw_id()));
            unique &= layer.multicast_trees.iter().all(|x| push(x.raw_id()));
        }
        if !unique {
            return Err("element identifiers are not unique".to_string());
        }
        Ok(())
    }
}
