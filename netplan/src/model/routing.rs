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

//! # Source routing
//!
//! Routes, service chains, backup designations and multicast trees, as well as the routing type
//! of a layer and the translation between the two routing types.

use super::cache::{insert_rel, remove_rel};
use super::elements::*;
use super::network::{get_set, non_negative, NetPlan};
use super::types::*;

use log::{debug, info};
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// Flow values below this threshold are treated as zero during flow decomposition.
const FLOW_EPSILON: f64 = 1e-9;

impl NetPlan {
    // ---------------------------------------------------------------------------------------------
    // routes
    // ---------------------------------------------------------------------------------------------

    /// Add a route over a sequence of links. The route occupies `occupied_capacity` in every link.
    /// The layer of the demand must be in source routing.
    pub fn add_route(
        &mut self,
        demand: DemandId,
        carried_traffic: f64,
        occupied_capacity: f64,
        links: Vec<LinkId>,
    ) -> Result<RouteId, NetPlanError> {
        let occupied = vec![occupied_capacity; links.len()];
        let path = links.into_iter().map(PathElement::Link).collect();
        self.add_service_chain(demand, carried_traffic, occupied, path)
    }

    /// Add a route traversing links and resources. `occupied` holds the capacity occupied in each
    /// traversed element, and must have the same length as `path`. The resource types traversed
    /// must match the service chain of the demand.
    pub fn add_service_chain(
        &mut self,
        demand: DemandId,
        carried_traffic: f64,
        occupied: Vec<f64>,
        path: Vec<PathElement>,
    ) -> Result<RouteId, NetPlanError> {
        let d = self.get_demand(demand)?;
        let layer = d.layer;
        self.require_routing_type(layer, RoutingType::SourceRouting)?;
        non_negative("carried traffic", carried_traffic)?;
        self.validate_occupation(&path, &occupied)?;
        self.validate_path(d, &path)?;

        let id = RouteId(self.new_id());
        let route = Route {
            id,
            index: 0,
            layer,
            demand,
            path,
            carried_traffic,
            occupied,
            backup_routes: Vec::new(),
            meta: Metadata::default(),
        };
        debug!("Add route {:?} for demand {:?}: {:?}", id, demand, route.path);
        self.cache.add_route(&route);
        self.layer_mut(layer)?.routes.insert(route);
        self.after_mutation();
        Ok(id)
    }

    pub(crate) fn require_routing_type(
        &self,
        layer: LayerId,
        required: RoutingType,
    ) -> Result<(), NetPlanError> {
        if self.get_layer(layer)?.routing_type == required {
            Ok(())
        } else {
            Err(NetPlanError::WrongRoutingType { layer, required })
        }
    }

    fn validate_occupation(
        &self,
        path: &[PathElement],
        occupied: &[f64],
    ) -> Result<(), NetPlanError> {
        if path.len() != occupied.len() {
            return Err(NetPlanError::OccupationLengthMismatch {
                expected: path.len(),
                found: occupied.len(),
            });
        }
        occupied.iter().try_for_each(|x| non_negative("occupied capacity", *x))
    }

    /// Check that the path starts at the ingress, is contiguous, ends at the egress, and
    /// traverses the resource types of the service chain.
    fn validate_path(&self, demand: &Demand, path: &[PathElement]) -> Result<(), NetPlanError> {
        if path.is_empty() {
            return Err(NetPlanError::InvalidPath("the path is empty"));
        }
        let mut current = demand.ingress;
        let mut found = Vec::new();
        for elem in path {
            match elem {
                PathElement::Link(l) => {
                    let link = self.get_link(*l)?;
                    if link.layer != demand.layer {
                        return Err(NetPlanError::WrongLayer {
                            element: (*l).into(),
                            expected: demand.layer,
                            found: link.layer,
                        });
                    }
                    if link.origin != current {
                        return Err(NetPlanError::InvalidPath("the links are not contiguous"));
                    }
                    current = link.destination;
                }
                PathElement::Resource(r) => {
                    let resource = self.get_resource(*r)?;
                    if resource.host != current {
                        return Err(NetPlanError::InvalidPath(
                            "resource is not hosted at the current node",
                        ));
                    }
                    found.push(resource.resource_type.clone());
                }
            }
        }
        if current != demand.egress {
            return Err(NetPlanError::InvalidPath("the path does not end at the egress node"));
        }
        if found != demand.service_chain {
            return Err(NetPlanError::ServiceChainMismatch {
                expected: demand.service_chain.clone(),
                found,
            });
        }
        Ok(())
    }

    pub(crate) fn route_resource_types(&self, route: &Route) -> Result<Vec<String>, NetPlanError> {
        route
            .resources()
            .map(|r| self.get_resource(r).map(|x| x.resource_type.clone()))
            .collect()
    }

    /// Remove a route. If the route is a backup of other routes, it is removed from their backup
    /// lists. Backup routes of this route become regular routes.
    pub fn remove_route(&mut self, route: RouteId) -> Result<(), NetPlanError> {
        self.remove_route_internal(route)?;
        debug!("Removed route {:?}", route);
        self.after_mutation();
        Ok(())
    }

    pub(crate) fn remove_route_internal(&mut self, route: RouteId) -> Result<(), NetPlanError> {
        let layer = self.get_route(route)?.layer;
        for primary in get_set(&self.cache.route_backup_of, &route) {
            self.route_mut(primary)?.backup_routes.retain(|b| *b != route);
            remove_rel(&mut self.cache.route_backup_of, route, &primary);
        }
        if let Some(removed) = self.layer_mut(layer)?.routes.remove(route.0) {
            self.cache.remove_route(&removed);
        }
        Ok(())
    }

    /// Returns the route
    pub fn get_route(&self, route: RouteId) -> Result<&Route, NetPlanError> {
        self.scoped(route.into(), |l| &l.routes)
    }

    fn route_mut(&mut self, route: RouteId) -> Result<&mut Route, NetPlanError> {
        self.scoped_mut(route.into(), |l| &mut l.routes)
    }

    /// Apply a modification to a route, and re-register it in the caches.
    fn update_route(
        &mut self,
        route: RouteId,
        f: impl FnOnce(&mut Route),
    ) -> Result<(), NetPlanError> {
        let r = self.route_mut(route)?;
        let old = r.clone();
        f(r);
        let new = r.clone();
        // the locator entry is dropped and inserted again with the same layer
        self.cache.remove_route(&old);
        self.cache.add_route(&new);
        Ok(())
    }

    /// Returns all routes of a layer, in order
    pub fn get_routes(&self, layer: LayerId) -> Result<impl Iterator<Item = &Route>, NetPlanError> {
        Ok(self.get_layer(layer)?.routes.iter())
    }

    /// Returns the ids of all routes of a layer, in order
    pub fn get_route_ids(&self, layer: LayerId) -> Result<Vec<RouteId>, NetPlanError> {
        Ok(self.get_routes(layer)?.map(|r| r.id).collect())
    }

    /// Returns the number of routes of a layer
    pub fn get_number_of_routes(&self, layer: LayerId) -> Result<usize, NetPlanError> {
        Ok(self.get_layer(layer)?.routes.len())
    }

    /// Returns all routes of a demand
    pub fn get_demand_routes(&self, demand: DemandId) -> Vec<RouteId> {
        get_set(&self.cache.demand_routes, &demand)
    }

    /// Returns all routes traversing a link
    pub fn get_link_routes(&self, link: LinkId) -> Vec<RouteId> {
        get_set(&self.cache.link_routes, &link)
    }

    /// Set the carried traffic of a route, and the capacity it occupies in every traversed
    /// element.
    pub fn set_route_carried_traffic(
        &mut self,
        route: RouteId,
        carried_traffic: f64,
        occupied_capacity: f64,
    ) -> Result<(), NetPlanError> {
        non_negative("carried traffic", carried_traffic)?;
        non_negative("occupied capacity", occupied_capacity)?;
        self.update_route(route, |r| {
            r.carried_traffic = carried_traffic;
            r.occupied.iter_mut().for_each(|x| *x = occupied_capacity);
        })?;
        self.after_mutation();
        Ok(())
    }

    /// Set the capacity occupied by the route in each traversed element.
    pub fn set_route_occupied_capacities(
        &mut self,
        route: RouteId,
        occupied: Vec<f64>,
    ) -> Result<(), NetPlanError> {
        self.validate_occupation(&self.get_route(route)?.path, &occupied)?;
        self.update_route(route, |r| r.occupied = occupied)?;
        self.after_mutation();
        Ok(())
    }

    /// Change the path of a route. The new path is validated like in
    /// [`NetPlan::add_service_chain`].
    pub fn set_route_path(
        &mut self,
        route: RouteId,
        path: Vec<PathElement>,
        occupied: Vec<f64>,
    ) -> Result<(), NetPlanError> {
        let demand = self.get_route(route)?.demand;
        self.validate_occupation(&path, &occupied)?;
        self.validate_path(self.get_demand(demand)?, &path)?;
        self.update_route(route, |r| {
            r.path = path;
            r.occupied = occupied;
        })?;
        self.after_mutation();
        Ok(())
    }

    // ---------------------------------------------------------------------------------------------
    // backup routes
    // ---------------------------------------------------------------------------------------------

    /// Designate `backup` as a backup route of `primary`. Both routes must belong to the same
    /// demand. A backup route cannot have backup routes itself, and a route with backup routes
    /// cannot be a backup.
    pub fn add_backup_route(
        &mut self,
        primary: RouteId,
        backup: RouteId,
    ) -> Result<(), NetPlanError> {
        let p = self.get_route(primary)?;
        let b = self.get_route(backup)?;
        let err = |reason| Err(NetPlanError::InvalidBackupRoute(primary, backup, reason));
        if primary == backup {
            return err("a route cannot be its own backup");
        }
        if p.demand != b.demand {
            return err("the routes belong to different demands");
        }
        if !b.backup_routes.is_empty() {
            return err("the backup route has backup routes itself");
        }
        if self.is_backup_route(primary) {
            return err("the primary route is a backup route");
        }
        if p.backup_routes.contains(&backup) {
            return err("the route is already a backup of the primary route");
        }
        self.route_mut(primary)?.backup_routes.push(backup);
        insert_rel(&mut self.cache.route_backup_of, backup, primary);
        debug!("Route {:?} is now a backup of {:?}", backup, primary);
        self.after_mutation();
        Ok(())
    }

    /// Remove the backup designation of `backup` for `primary`. The route itself is kept.
    pub fn remove_backup_route(
        &mut self,
        primary: RouteId,
        backup: RouteId,
    ) -> Result<(), NetPlanError> {
        if !self.get_route(primary)?.backup_routes.contains(&backup) {
            return Err(NetPlanError::InvalidBackupRoute(
                primary,
                backup,
                "not a backup of this route",
            ));
        }
        self.route_mut(primary)?.backup_routes.retain(|b| *b != backup);
        remove_rel(&mut self.cache.route_backup_of, backup, &primary);
        self.after_mutation();
        Ok(())
    }

    /// Returns `true` if the route is designated as a backup of some other route
    pub fn is_backup_route(&self, route: RouteId) -> bool {
        self.cache.route_backup_of.contains_key(&route)
    }

    /// Returns the routes this backup route protects
    pub fn get_route_primaries(&self, route: RouteId) -> Vec<RouteId> {
        get_set(&self.cache.route_backup_of, &route)
    }

    // ---------------------------------------------------------------------------------------------
    // multicast trees
    // ---------------------------------------------------------------------------------------------

    /// Add a multicast tree for a multicast demand. The links must form an arborescence rooted at
    /// the ingress node which reaches every egress node.
    pub fn add_multicast_tree(
        &mut self,
        md: MulticastDemandId,
        carried_traffic: f64,
        occupied_capacity: f64,
        links: BTreeSet<LinkId>,
    ) -> Result<MulticastTreeId, NetPlanError> {
        let m = self.get_multicast_demand(md)?;
        let layer = m.layer;
        non_negative("carried traffic", carried_traffic)?;
        non_negative("occupied capacity", occupied_capacity)?;
        self.validate_tree(m, &links)?;
        let id = MulticastTreeId(self.new_id());
        let tree = MulticastTree {
            id,
            index: 0,
            layer,
            demand: md,
            links,
            carried_traffic,
            occupied_capacity,
            meta: Metadata::default(),
        };
        debug!("Add multicast tree {:?} for {:?}", id, md);
        self.cache.add_multicast_tree(&tree);
        self.layer_mut(layer)?.multicast_trees.insert(tree);
        self.after_mutation();
        Ok(id)
    }

    fn validate_tree(
        &self,
        md: &MulticastDemand,
        links: &BTreeSet<LinkId>,
    ) -> Result<(), NetPlanError> {
        if links.is_empty() {
            return Err(NetPlanError::InvalidMulticastTree("the tree has no links"));
        }
        let mut incoming: BTreeMap<NodeId, LinkId> = BTreeMap::new();
        let mut outgoing: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
        for l in links {
            let link = self.get_link(*l)?;
            if link.layer != md.layer {
                return Err(NetPlanError::WrongLayer {
                    element: (*l).into(),
                    expected: md.layer,
                    found: link.layer,
                });
            }
            if incoming.insert(link.destination, *l).is_some() {
                return Err(NetPlanError::InvalidMulticastTree("a node has two incoming links"));
            }
            outgoing.entry(link.origin).or_default().push(link.destination);
        }
        if incoming.contains_key(&md.ingress) {
            return Err(NetPlanError::InvalidMulticastTree("the ingress node has an incoming link"));
        }
        let mut reached: BTreeSet<NodeId> = BTreeSet::new();
        let mut stack = vec![md.ingress];
        while let Some(n) = stack.pop() {
            if reached.insert(n) {
                stack.extend(outgoing.get(&n).into_iter().flatten().copied());
            }
        }
        if !incoming.keys().all(|n| reached.contains(n)) {
            return Err(NetPlanError::InvalidMulticastTree(
                "a link is not reachable from the ingress",
            ));
        }
        if !md.egresses.iter().all(|n| reached.contains(n)) {
            return Err(NetPlanError::InvalidMulticastTree("an egress node is not reached"));
        }
        Ok(())
    }

    /// Remove a multicast tree
    pub fn remove_multicast_tree(&mut self, tree: MulticastTreeId) -> Result<(), NetPlanError> {
        self.remove_multicast_tree_internal(tree)?;
        debug!("Removed multicast tree {:?}", tree);
        self.after_mutation();
        Ok(())
    }

    pub(crate) fn remove_multicast_tree_internal(
        &mut self,
        tree: MulticastTreeId,
    ) -> Result<(), NetPlanError> {
        let layer = self.get_multicast_tree(tree)?.layer;
        if let Some(removed) = self.layer_mut(layer)?.multicast_trees.remove(tree.0) {
            self.cache.remove_multicast_tree(&removed);
        }
        Ok(())
    }

    /// Returns the multicast tree
    pub fn get_multicast_tree(
        &self,
        tree: MulticastTreeId,
    ) -> Result<&MulticastTree, NetPlanError> {
        self.scoped(tree.into(), |l| &l.multicast_trees)
    }

    /// Returns all multicast trees of a layer, in order
    pub fn get_multicast_trees(
        &self,
        layer: LayerId,
    ) -> Result<impl Iterator<Item = &MulticastTree>, NetPlanError> {
        Ok(self.get_layer(layer)?.multicast_trees.iter())
    }

    /// Returns the number of multicast trees of a layer
    pub fn get_number_of_multicast_trees(&self, layer: LayerId) -> Result<usize, NetPlanError> {
        Ok(self.get_layer(layer)?.multicast_trees.len())
    }

    /// Returns the trees of a multicast demand
    pub fn get_multicast_demand_trees(&self, md: MulticastDemandId) -> Vec<MulticastTreeId> {
        get_set(&self.cache.mdemand_trees, &md)
    }

    /// Returns the multicast trees traversing a link
    pub fn get_link_multicast_trees(&self, link: LinkId) -> Vec<MulticastTreeId> {
        get_set(&self.cache.link_trees, &link)
    }

    /// Set the carried traffic of a tree, and the capacity it occupies in each of its links.
    pub fn set_multicast_tree_carried_traffic(
        &mut self,
        tree: MulticastTreeId,
        carried_traffic: f64,
        occupied_capacity: f64,
    ) -> Result<(), NetPlanError> {
        non_negative("carried traffic", carried_traffic)?;
        non_negative("occupied capacity", occupied_capacity)?;
        let t = self.scoped_mut(tree.into(), |l| &mut l.multicast_trees)?;
        t.carried_traffic = carried_traffic;
        t.occupied_capacity = occupied_capacity;
        self.after_mutation();
        Ok(())
    }

    /// Returns the sequence of links of the tree leading from the ingress to the given egress node.
    pub fn get_multicast_tree_path_to_egress(
        &self,
        tree: MulticastTreeId,
        egress: NodeId,
    ) -> Result<Vec<LinkId>, NetPlanError> {
        let t = self.get_multicast_tree(tree)?;
        let md = self.get_multicast_demand(t.demand)?;
        if !md.egresses.contains(&egress) {
            return Err(NetPlanError::InvalidMulticastTree("the node is not an egress node"));
        }
        let mut incoming: BTreeMap<NodeId, (LinkId, NodeId)> = BTreeMap::new();
        for l in t.links.iter() {
            let link = self.get_link(*l)?;
            incoming.insert(link.destination, (*l, link.origin));
        }
        let mut path = Vec::new();
        let mut current = egress;
        while current != md.ingress {
            match incoming.get(&current) {
                Some((l, origin)) if path.len() < t.links.len() => {
                    path.push(*l);
                    current = *origin;
                }
                _ => {
                    return Err(NetPlanError::InvalidMulticastTree(
                        "an egress node is not reached",
                    ))
                }
            }
        }
        path.reverse();
        Ok(path)
    }

    // ---------------------------------------------------------------------------------------------
    // routing type
    // ---------------------------------------------------------------------------------------------

    /// Change the routing type of a layer. Moving to hop-by-hop routing requires the layer to have
    /// no routes, and moving to source routing requires it to have no forwarding rules. Use
    /// [`NetPlan::convert_routing_type`] to translate the existing routing.
    pub fn set_routing_type(
        &mut self,
        layer: LayerId,
        routing_type: RoutingType,
    ) -> Result<(), NetPlanError> {
        let l = self.get_layer(layer)?;
        if l.routing_type == routing_type {
            return Ok(());
        }
        match routing_type {
            RoutingType::HopByHopRouting if !l.routes.is_empty() => {
                return Err(NetPlanError::RoutingTypeConflict {
                    layer,
                    reason: "the layer has routes",
                })
            }
            RoutingType::SourceRouting if !l.forwarding_rules.is_empty() => {
                return Err(NetPlanError::RoutingTypeConflict {
                    layer,
                    reason: "the layer has forwarding rules",
                })
            }
            _ => {}
        }
        self.layer_mut(layer)?.routing_type = routing_type;
        self.refresh_layer_traffic(layer)?;
        info!("Layer {:?} switched to {:?}", layer, routing_type);
        self.after_mutation();
        Ok(())
    }

    /// Change the routing type of a layer, translating the routing state.
    ///
    /// - *Source routing to hop-by-hop*: the primary routes of each demand are replaced by
    ///   forwarding rules. The fraction of a link is the share of the demand traffic entering its
    ///   origin node that leaves over the link. Backup routes are dropped. Service chains cannot
    ///   be translated.
    /// - *Hop-by-hop to source routing*: the per-link traffic of each demand (ignoring failures) is
    ///   decomposed into paths, each of which becomes a route.
    pub fn convert_routing_type(
        &mut self,
        layer: LayerId,
        routing_type: RoutingType,
    ) -> Result<(), NetPlanError> {
        if self.get_layer(layer)?.routing_type == routing_type {
            return Ok(());
        }
        match routing_type {
            RoutingType::HopByHopRouting => self.convert_to_hop_by_hop(layer),
            RoutingType::SourceRouting => self.convert_to_source_routing(layer),
        }
    }

    fn convert_to_hop_by_hop(&mut self, layer: LayerId) -> Result<(), NetPlanError> {
        let mut rules: BTreeMap<(DemandId, LinkId), f64> = BTreeMap::new();
        for demand in self.get_layer(layer)?.demands.iter() {
            let routes: Vec<&Route> = self
                .get_demand_routes(demand.id)
                .into_iter()
                .filter(|r| !self.is_backup_route(*r))
                .map(|r| self.get_route(r))
                .collect::<Result<_, _>>()?;
            if routes.iter().any(|r| r.is_service_chain()) {
                return Err(NetPlanError::RoutingConversion(
                    demand.id,
                    "service chains cannot be expressed as forwarding rules",
                ));
            }
            let total: f64 = routes.iter().map(|r| r.carried_traffic).sum();
            let mut link_flow: BTreeMap<LinkId, f64> = BTreeMap::new();
            let mut node_flow: BTreeMap<NodeId, f64> = BTreeMap::new();
            for route in routes {
                let w = if total > 0.0 { route.carried_traffic } else { 1.0 };
                *node_flow.entry(demand.ingress).or_insert(0.0) += w;
                for l in route.links() {
                    *link_flow.entry(l).or_insert(0.0) += w;
                    *node_flow.entry(self.get_link(l)?.destination).or_insert(0.0) += w;
                }
            }
            for (l, flow) in link_flow {
                let origin = self.get_link(l)?.origin;
                let entering = node_flow.get(&origin).copied().unwrap_or(0.0);
                if flow > 0.0 && entering > 0.0 {
                    rules.insert((demand.id, l), (flow / entering).min(1.0));
                }
            }
        }
        self.validate_forwarding_rules(layer, &rules)?;

        for r in self.get_route_ids(layer)? {
            self.remove_route_internal(r)?;
        }
        let l = self.layer_mut(layer)?;
        l.routing_type = RoutingType::HopByHopRouting;
        l.forwarding_rules = rules;
        self.refresh_layer_traffic(layer)?;
        info!("Layer {:?} converted to hop-by-hop routing", layer);
        self.after_mutation();
        Ok(())
    }

    fn convert_to_source_routing(&mut self, layer: LayerId) -> Result<(), NetPlanError> {
        let l = self.get_layer(layer)?;
        let mut new_routes: Vec<(DemandId, f64, Vec<LinkId>)> = Vec::new();
        for demand in l.demands.iter() {
            if demand.is_service_chain() {
                return Err(NetPlanError::RoutingConversion(
                    demand.id,
                    "the demand requires a service chain",
                ));
            }
            let offered = self.get_demand_offered_traffic(demand.id)?;
            let flow = self.unit_flow(l, &l.forwarding_rules, demand, false)?;
            let mut remaining: BTreeMap<LinkId, f64> =
                flow.links.into_iter().filter(|(_, f)| *f > FLOW_EPSILON).collect();
            while let Some(path) = self.find_flow_path(demand.ingress, demand.egress, &remaining)? {
                let bottleneck = path
                    .iter()
                    .map(|x| remaining.get(x).copied().unwrap_or(0.0))
                    .fold(f64::INFINITY, f64::min);
                for x in path.iter() {
                    if let Some(f) = remaining.get_mut(x) {
                        *f -= bottleneck;
                    }
                }
                remaining.retain(|_, f| *f > FLOW_EPSILON);
                new_routes.push((demand.id, bottleneck * offered, path));
            }
        }

        let l = self.layer_mut(layer)?;
        l.forwarding_rules.clear();
        l.routing_type = RoutingType::SourceRouting;
        self.refresh_layer_traffic(layer)?;
        for (demand, carried, links) in new_routes {
            self.add_route(demand, carried, carried, links)?;
        }
        info!("Layer {:?} converted to source routing", layer);
        self.after_mutation();
        Ok(())
    }

    /// Depth-first search for a path from `from` to `to` over links with remaining flow.
    fn find_flow_path(
        &self,
        from: NodeId,
        to: NodeId,
        remaining: &BTreeMap<LinkId, f64>,
    ) -> Result<Option<Vec<LinkId>>, NetPlanError> {
        let mut adjacency: BTreeMap<NodeId, Vec<(LinkId, NodeId)>> = BTreeMap::new();
        for l in remaining.keys() {
            let link = self.get_link(*l)?;
            adjacency.entry(link.origin).or_default().push((*l, link.destination));
        }
        let mut explored: HashSet<NodeId> = HashSet::new();
        let mut path: Vec<LinkId> = Vec::new();
        // stack of (node, position of the next outgoing link to try)
        let mut stack: Vec<(NodeId, usize)> = vec![(from, 0)];
        explored.insert(from);
        while let Some((node, next)) = stack.last_mut() {
            if *node == to {
                return Ok(Some(path));
            }
            let candidates = adjacency.get(node).map(|x| x.as_slice()).unwrap_or(&[]);
            match candidates.get(*next) {
                Some((l, dst)) => {
                    *next += 1;
                    if explored.insert(*dst) {
                        path.push(*l);
                        stack.push((*dst, 0));
                    }
                }
                None => {
                    stack.pop();
                    path.pop();
                }
            }
        }
        Ok(None)
    }
}
