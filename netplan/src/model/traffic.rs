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

//! Traffic and failure queries
//!
//! A route (or multicast tree) is down if any traversed link is down, any end node of a traversed
//! link is down, or the host of a traversed resource is down. Routes and trees which are down
//! carry no traffic and occupy no capacity.

use super::network::{get_set, NetPlan};
use super::types::*;

use std::collections::{BTreeMap, BTreeSet};

impl NetPlan {
    // ---------------------------------------------------------------------------------------------
    // down state
    // ---------------------------------------------------------------------------------------------

    /// Returns `true` if the route traverses a failed link, a link with a failed end node, or a
    /// resource hosted at a failed node.
    pub fn is_route_down(&self, route: RouteId) -> Result<bool, NetPlanError> {
        for elem in self.get_route(route)?.path.iter() {
            let up = match elem {
                PathElement::Link(l) => self.is_link_usable(*l)?,
                PathElement::Resource(r) => {
                    !self.cache.down_nodes.contains(&self.get_resource(*r)?.host)
                }
            };
            if !up {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Returns all routes of a layer which are down
    pub fn get_routes_down(&self, layer: LayerId) -> Result<Vec<RouteId>, NetPlanError> {
        let mut result = Vec::new();
        for r in self.get_route_ids(layer)? {
            if self.is_route_down(r)? {
                result.push(r);
            }
        }
        Ok(result)
    }

    /// Returns `true` if any link of the tree is not usable
    pub fn is_multicast_tree_down(&self, tree: MulticastTreeId) -> Result<bool, NetPlanError> {
        for l in self.get_multicast_tree(tree)?.links.iter() {
            if !self.is_link_usable(*l)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Returns all multicast trees of a layer which are down
    pub fn get_multicast_trees_down(
        &self,
        layer: LayerId,
    ) -> Result<Vec<MulticastTreeId>, NetPlanError> {
        let mut result = Vec::new();
        for t in self.get_multicast_trees(layer)?.map(|t| t.id).collect::<Vec<_>>() {
            if self.is_multicast_tree_down(t)? {
                result.push(t);
            }
        }
        Ok(result)
    }

    fn is_tree_path_up(&self, tree: MulticastTreeId, egress: NodeId) -> Result<bool, NetPlanError> {
        for l in self.get_multicast_tree_path_to_egress(tree, egress)? {
            if !self.is_link_usable(l)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Returns the demands of a layer whose traffic is affected by a failure. In hop-by-hop
    /// routing, these are the demands whose forwarding graph contains a link which is not usable.
    /// In source routing, these are the demands with at least one route down.
    pub fn get_demands_with_down_forwarding_path(
        &self,
        layer: LayerId,
    ) -> Result<Vec<DemandId>, NetPlanError> {
        let mut result = Vec::new();
        for d in self.get_demand_ids(layer)? {
            let affected = match self.get_layer(layer)?.routing_type {
                RoutingType::HopByHopRouting => {
                    let mut down = false;
                    for l in self.get_links_this_layer_potentially_carrying_traffic(d, false)? {
                        down |= !self.is_link_usable(l)?;
                    }
                    down
                }
                RoutingType::SourceRouting => {
                    let mut down = false;
                    for r in self.get_demand_routes(d) {
                        down |= self.is_route_down(r)?;
                    }
                    down
                }
            };
            if affected {
                result.push(d);
            }
        }
        Ok(result)
    }

    // ---------------------------------------------------------------------------------------------
    // routes
    // ---------------------------------------------------------------------------------------------

    /// Returns the traffic actually carried by the route, which is zero if the route is down.
    pub fn get_route_carried_traffic(&self, route: RouteId) -> Result<f64, NetPlanError> {
        if self.is_route_down(route)? {
            Ok(0.0)
        } else {
            Ok(self.get_route(route)?.carried_traffic)
        }
    }

    /// Returns the capacity actually occupied in each traversed element, which is zero if the
    /// route is down.
    pub fn get_route_occupied_capacity(&self, route: RouteId) -> Result<Vec<f64>, NetPlanError> {
        let r = self.get_route(route)?;
        if self.is_route_down(route)? {
            Ok(vec![0.0; r.occupied.len()])
        } else {
            Ok(r.occupied.clone())
        }
    }

    /// Returns the sum of the lengths of all traversed links in km.
    pub fn get_route_length_km(&self, route: RouteId) -> Result<f64, NetPlanError> {
        let mut length = 0.0;
        for l in self.get_route(route)?.links() {
            length += self.get_link(l)?.length_km;
        }
        Ok(length)
    }

    /// Returns the propagation delay of the route in ms, including the processing time of the
    /// traversed resources.
    pub fn get_route_propagation_delay_ms(&self, route: RouteId) -> Result<f64, NetPlanError> {
        let mut delay = 0.0;
        for elem in self.get_route(route)?.path.iter() {
            delay += match elem {
                PathElement::Link(l) => self.get_link(*l)?.propagation_delay_ms(),
                PathElement::Resource(r) => self.get_resource(*r)?.processing_time_ms,
            };
        }
        Ok(delay)
    }

    /// Returns the number of links traversed by the route
    pub fn get_route_number_of_hops(&self, route: RouteId) -> Result<usize, NetPlanError> {
        Ok(self.get_route(route)?.links().count())
    }

    // ---------------------------------------------------------------------------------------------
    // demands
    // ---------------------------------------------------------------------------------------------

    /// Returns the effective offered traffic of a demand: its own offered traffic plus the
    /// weighted carried traffic of all demands aggregated into it.
    pub fn get_demand_offered_traffic(&self, demand: DemandId) -> Result<f64, NetPlanError> {
        let mut offered = self.get_demand(demand)?.offered_traffic;
        if let Some(senders) = self.cache.aggregated_from.get(&demand) {
            for (s, w) in senders.iter() {
                offered += w * self.get_demand_carried_traffic(*s)?;
            }
        }
        Ok(offered)
    }

    /// Returns the traffic of the demand reaching its egress node.
    pub fn get_demand_carried_traffic(&self, demand: DemandId) -> Result<f64, NetPlanError> {
        let layer = self.get_demand(demand)?.layer;
        match self.get_layer(layer)?.routing_type {
            RoutingType::SourceRouting => {
                let mut carried = 0.0;
                for r in self.get_demand_routes(demand) {
                    carried += self.get_route_carried_traffic(r)?;
                }
                Ok(carried)
            }
            RoutingType::HopByHopRouting => Ok(self
                .cache
                .hop_by_hop
                .get(&layer)
                .and_then(|t| t.carried.get(&demand))
                .copied()
                .unwrap_or(0.0)),
        }
    }

    /// Returns the offered traffic which is not carried
    pub fn get_demand_blocked_traffic(&self, demand: DemandId) -> Result<f64, NetPlanError> {
        let offered = self.get_demand_offered_traffic(demand)?;
        Ok((offered - self.get_demand_carried_traffic(demand)?).max(0.0))
    }

    /// Returns the traffic of a demand on a link
    pub fn get_demand_link_traffic(
        &self,
        demand: DemandId,
        link: LinkId,
    ) -> Result<f64, NetPlanError> {
        let layer = self.get_demand(demand)?.layer;
        match self.get_layer(layer)?.routing_type {
            RoutingType::SourceRouting => {
                let mut traffic = 0.0;
                for r in self.get_demand_routes(demand) {
                    let hops = self.get_route(r)?.links().filter(|l| *l == link).count();
                    traffic += hops as f64 * self.get_route_carried_traffic(r)?;
                }
                Ok(traffic)
            }
            RoutingType::HopByHopRouting => Ok(self
                .cache
                .hop_by_hop
                .get(&layer)
                .and_then(|t| t.link_traffic.get(&(demand, link)))
                .copied()
                .unwrap_or(0.0)),
        }
    }

    /// Returns the total offered, carried and blocked traffic of all unicast demands of a layer.
    pub fn get_layer_traffic_summary(
        &self,
        layer: LayerId,
    ) -> Result<(f64, f64, f64), NetPlanError> {
        let (mut offered, mut carried, mut blocked) = (0.0, 0.0, 0.0);
        for d in self.get_demand_ids(layer)? {
            offered += self.get_demand_offered_traffic(d)?;
            carried += self.get_demand_carried_traffic(d)?;
            blocked += self.get_demand_blocked_traffic(d)?;
        }
        Ok((offered, carried, blocked))
    }

    // ---------------------------------------------------------------------------------------------
    // multicast demands
    // ---------------------------------------------------------------------------------------------

    /// Returns the sum of the carried traffic of all trees of the demand which are up.
    pub fn get_multicast_demand_carried_traffic(
        &self,
        md: MulticastDemandId,
    ) -> Result<f64, NetPlanError> {
        self.get_multicast_demand(md)?;
        let mut carried = 0.0;
        for t in self.get_multicast_demand_trees(md) {
            if !self.is_multicast_tree_down(t)? {
                carried += self.get_multicast_tree(t)?.carried_traffic;
            }
        }
        Ok(carried)
    }

    /// Returns the traffic the multicast demand carries to one of its egress nodes: the sum of the
    /// carried traffic of all trees whose path to that egress is up.
    pub fn get_multicast_demand_carried_traffic_to_egress(
        &self,
        md: MulticastDemandId,
        egress: NodeId,
    ) -> Result<f64, NetPlanError> {
        self.get_multicast_demand(md)?;
        let mut carried = 0.0;
        for t in self.get_multicast_demand_trees(md) {
            if self.is_tree_path_up(t, egress)? {
                carried += self.get_multicast_tree(t)?.carried_traffic;
            }
        }
        Ok(carried)
    }

    /// Returns the offered traffic of the multicast demand which is not carried
    pub fn get_multicast_demand_blocked_traffic(
        &self,
        md: MulticastDemandId,
    ) -> Result<f64, NetPlanError> {
        let offered = self.get_multicast_demand(md)?.offered_traffic;
        Ok((offered - self.get_multicast_demand_carried_traffic(md)?).max(0.0))
    }

    // ---------------------------------------------------------------------------------------------
    // links
    // ---------------------------------------------------------------------------------------------

    /// Returns the capacity of a link. For a coupled link, this is the traffic carried by the
    /// coupled lower-layer demand (or, for a multicast demand, the traffic it carries to the
    /// destination of the link).
    pub fn get_link_capacity(&self, link: LinkId) -> Result<f64, NetPlanError> {
        let l = self.get_link(link)?;
        match l.coupling {
            None => Ok(l.capacity),
            Some(LinkCoupling::Demand(d)) => self.get_demand_carried_traffic(d),
            Some(LinkCoupling::MulticastDemand(md)) => {
                self.get_multicast_demand_carried_traffic_to_egress(md, l.destination)
            }
        }
    }

    /// Returns the traffic carried by the link, split into traffic of primary routes (including
    /// hop-by-hop traffic and multicast trees) and traffic of backup routes.
    pub fn get_link_carried_traffic_split(&self, link: LinkId) -> Result<(f64, f64), NetPlanError> {
        let layer = self.get_link(link)?.layer;
        let (mut primary, mut backup) = (0.0, 0.0);
        match self.get_layer(layer)?.routing_type {
            RoutingType::SourceRouting => {
                for r in get_set(&self.cache.link_routes, &link) {
                    let hops = self.get_route(r)?.links().filter(|l| *l == link).count();
                    let traffic = hops as f64 * self.get_route_carried_traffic(r)?;
                    if self.is_backup_route(r) {
                        backup += traffic;
                    } else {
                        primary += traffic;
                    }
                }
            }
            RoutingType::HopByHopRouting => {
                if let Some(t) = self.cache.hop_by_hop.get(&layer) {
                    primary += t
                        .link_traffic
                        .iter()
                        .filter(|((_, l), _)| *l == link)
                        .map(|(_, x)| x)
                        .sum::<f64>();
                }
            }
        }
        for t in self.get_link_multicast_trees(link) {
            if !self.is_multicast_tree_down(t)? {
                primary += self.get_multicast_tree(t)?.carried_traffic;
            }
        }
        Ok((primary, backup))
    }

    /// Returns the traffic carried by the link
    pub fn get_link_carried_traffic(&self, link: LinkId) -> Result<f64, NetPlanError> {
        let (primary, backup) = self.get_link_carried_traffic_split(link)?;
        Ok(primary + backup)
    }

    /// Returns the capacity occupied in the link by routes and trees which are up. In hop-by-hop
    /// routing, the occupied capacity of the demands equals their carried traffic.
    pub fn get_link_occupied_capacity(&self, link: LinkId) -> Result<f64, NetPlanError> {
        let layer = self.get_link(link)?.layer;
        let mut occupied = 0.0;
        match self.get_layer(layer)?.routing_type {
            RoutingType::SourceRouting => {
                for r in get_set(&self.cache.link_routes, &link) {
                    let route = self.get_route(r)?;
                    let values = self.get_route_occupied_capacity(r)?;
                    for (elem, x) in route.path.iter().zip(values) {
                        if *elem == PathElement::Link(link) {
                            occupied += x;
                        }
                    }
                }
            }
            RoutingType::HopByHopRouting => {
                if let Some(t) = self.cache.hop_by_hop.get(&layer) {
                    occupied += t
                        .link_traffic
                        .iter()
                        .filter(|((_, l), _)| *l == link)
                        .map(|(_, x)| x)
                        .sum::<f64>();
                }
            }
        }
        for t in self.get_link_multicast_trees(link) {
            if !self.is_multicast_tree_down(t)? {
                occupied += self.get_multicast_tree(t)?.occupied_capacity;
            }
        }
        Ok(occupied)
    }

    /// Returns occupied capacity divided by capacity. A link without capacity has utilization 0
    /// if it is unused, and infinity otherwise.
    pub fn get_link_utilization(&self, link: LinkId) -> Result<f64, NetPlanError> {
        let occupied = self.get_link_occupied_capacity(link)?;
        let capacity = self.get_link_capacity(link)?;
        Ok(if capacity > 0.0 {
            occupied / capacity
        } else if occupied > 0.0 {
            f64::INFINITY
        } else {
            0.0
        })
    }

    /// Returns all links of a layer whose occupied capacity exceeds their capacity
    pub fn get_links_oversubscribed(&self, layer: LayerId) -> Result<Vec<LinkId>, NetPlanError> {
        let mut result = Vec::new();
        for l in self.get_link_ids(layer)? {
            if self.get_link_occupied_capacity(l)? > self.get_link_capacity(l)? + 1e-9 {
                result.push(l);
            }
        }
        Ok(result)
    }

    // ---------------------------------------------------------------------------------------------
    // resources
    // ---------------------------------------------------------------------------------------------

    /// Returns the capacity each traversing route occupies in the resource while the route is up.
    pub fn get_resource_occupation(
        &self,
        resource: ResourceId,
    ) -> Result<BTreeMap<RouteId, f64>, NetPlanError> {
        self.get_resource(resource)?;
        Ok(self.cache.resource_occupation.get(&resource).cloned().unwrap_or_default())
    }

    /// Returns the capacity of the resource occupied by routes which are up
    pub fn get_resource_occupied_capacity(
        &self,
        resource: ResourceId,
    ) -> Result<f64, NetPlanError> {
        let mut occupied = 0.0;
        for (r, x) in self.get_resource_occupation(resource)? {
            if !self.is_route_down(r)? {
                occupied += x;
            }
        }
        Ok(occupied)
    }

    /// Returns all routes traversing the resource
    pub fn get_resource_routes(
        &self,
        resource: ResourceId,
    ) -> Result<BTreeSet<RouteId>, NetPlanError> {
        Ok(self.get_resource_occupation(resource)?.into_iter().map(|(r, _)| r).collect())
    }
}
