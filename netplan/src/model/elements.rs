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

//! # Topology elements
//!
//! This module contains the canonical state of every element of a [`NetPlan`](super::NetPlan).
//! Elements are created and mutated only through the plan, which keeps the derived caches
//! up-to-date. All relations are stored as identifiers, never as references.

use super::persistence::map_as_pairs;
use super::registry::{Indexed, Registry};
use super::types::*;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

macro_rules! impl_indexed {
    ($t:ty) => {
        impl Indexed for $t {
            fn raw_id(&self) -> u64 {
                self.id.0
            }
            fn index(&self) -> usize {
                self.index
            }
            fn set_index(&mut self, index: usize) {
                self.index = index;
            }
        }
    };
}

/// User-defined attributes and tags, present on every element.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub(crate) attributes: BTreeMap<String, String>,
    pub(crate) tags: BTreeSet<String>,
}

impl Metadata {
    /// Returns the value of an attribute
    pub fn attribute(&self, key: impl AsRef<str>) -> Option<&str> {
        self.attributes.get(key.as_ref()).map(|s| s.as_str())
    }

    /// Returns all attributes
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Returns all tags
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Returns true if the tag is set
    pub fn has_tag(&self, tag: impl AsRef<str>) -> bool {
        self.tags.contains(tag.as_ref())
    }
}

/// # Network Layer
///
/// A layer owns all layer-scoped elements (links, demands, routes, multicast demands, multicast
/// trees and forwarding rules). Nodes, resources and shared risk groups are network-wide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkLayer {
    pub(crate) id: LayerId,
    #[serde(skip)]
    pub(crate) index: usize,
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) link_capacity_units: String,
    pub(crate) demand_traffic_units: String,
    pub(crate) routing_type: RoutingType,
    pub(crate) meta: Metadata,
    pub(crate) links: Registry<Link>,
    pub(crate) demands: Registry<Demand>,
    pub(crate) multicast_demands: Registry<MulticastDemand>,
    pub(crate) routes: Registry<Route>,
    pub(crate) multicast_trees: Registry<MulticastTree>,
    /// Non-zero forwarding fractions. Only used if the routing type is hop-by-hop.
    #[serde(with = "map_as_pairs")]
    pub(crate) forwarding_rules: BTreeMap<(DemandId, LinkId), f64>,
}

impl_indexed!(NetworkLayer);

impl NetworkLayer {
    pub(crate) fn new(
        id: LayerId,
        name: String,
        description: String,
        link_capacity_units: String,
        demand_traffic_units: String,
    ) -> Self {
        Self {
            id,
            index: 0,
            name,
            description,
            link_capacity_units,
            demand_traffic_units,
            routing_type: RoutingType::SourceRouting,
            meta: Metadata::default(),
            links: Registry::default(),
            demands: Registry::default(),
            multicast_demands: Registry::default(),
            routes: Registry::default(),
            multicast_trees: Registry::default(),
            forwarding_rules: BTreeMap::new(),
        }
    }

    /// Returns the layer id
    pub fn id(&self) -> LayerId {
        self.id
    }

    /// Returns the position of the layer
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the name of the layer
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the description of the layer
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Units in which link capacities of this layer are measured
    pub fn link_capacity_units(&self) -> &str {
        &self.link_capacity_units
    }

    /// Units in which demand traffic of this layer is measured
    pub fn demand_traffic_units(&self) -> &str {
        &self.demand_traffic_units
    }

    /// Returns the routing type of the layer
    pub fn routing_type(&self) -> RoutingType {
        self.routing_type
    }

    /// Returns attributes and tags
    pub fn meta(&self) -> &Metadata {
        &self.meta
    }

    /// Returns all non-zero forwarding rules of the layer
    pub fn forwarding_rules(&self) -> &BTreeMap<(DemandId, LinkId), f64> {
        &self.forwarding_rules
    }
}

/// # Node
/// A node exists in every layer at once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub(crate) id: NodeId,
    #[serde(skip)]
    pub(crate) index: usize,
    pub(crate) name: String,
    pub(crate) xy: (f64, f64),
    pub(crate) population: f64,
    pub(crate) site_name: Option<String>,
    pub(crate) is_up: bool,
    pub(crate) meta: Metadata,
}

impl_indexed!(Node);

impl Node {
    /// Returns the node id
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the current index of the node
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the name of the node
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the position as `(x, y)`
    pub fn xy(&self) -> (f64, f64) {
        self.xy
    }

    /// Returns the population of the node
    pub fn population(&self) -> f64 {
        self.population
    }

    /// Returns the site name, if any
    pub fn site_name(&self) -> Option<&str> {
        self.site_name.as_deref()
    }

    /// Returns false if the node has failed
    pub fn is_up(&self) -> bool {
        self.is_up
    }

    /// Returns attributes and tags
    pub fn meta(&self) -> &Metadata {
        &self.meta
    }
}

/// # Link
/// Unidirectional link of a layer. If the link is coupled, its capacity is derived from the
/// traffic carried by the lower-layer demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub(crate) id: LinkId,
    #[serde(skip)]
    pub(crate) index: usize,
    pub(crate) layer: LayerId,
    pub(crate) origin: NodeId,
    pub(crate) destination: NodeId,
    pub(crate) capacity: f64,
    pub(crate) length_km: f64,
    pub(crate) propagation_speed_km_per_sec: f64,
    pub(crate) is_up: bool,
    pub(crate) coupling: Option<LinkCoupling>,
    pub(crate) meta: Metadata,
}

impl_indexed!(Link);

impl Link {
    /// Returns the link id
    pub fn id(&self) -> LinkId {
        self.id
    }

    /// Returns the index of the link inside its layer
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the layer of the link
    pub fn layer(&self) -> LayerId {
        self.layer
    }

    /// Returns the origin node
    pub fn origin(&self) -> NodeId {
        self.origin
    }

    /// Returns the destination node
    pub fn destination(&self) -> NodeId {
        self.destination
    }

    /// Returns the nominal capacity. This value is ignored while the link is coupled, see
    /// [`NetPlan::get_link_capacity`](super::NetPlan::get_link_capacity).
    pub fn nominal_capacity(&self) -> f64 {
        self.capacity
    }

    /// Returns the length in km
    pub fn length_km(&self) -> f64 {
        self.length_km
    }

    /// Returns the propagation speed in km/s
    pub fn propagation_speed_km_per_sec(&self) -> f64 {
        self.propagation_speed_km_per_sec
    }

    /// Propagation delay in milliseconds
    pub fn propagation_delay_ms(&self) -> f64 {
        if self.propagation_speed_km_per_sec <= 0.0 {
            f64::INFINITY
        } else {
            1000.0 * self.length_km / self.propagation_speed_km_per_sec
        }
    }

    /// Returns false if the link has failed. A link that is up may still be unusable when one of
    /// its end nodes is down.
    pub fn is_up(&self) -> bool {
        self.is_up
    }

    /// Returns the lower-layer element this link is coupled to.
    pub fn coupling(&self) -> Option<LinkCoupling> {
        self.coupling
    }

    /// Returns attributes and tags
    pub fn meta(&self) -> &Metadata {
        &self.meta
    }
}

/// # Unicast Demand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Demand {
    pub(crate) id: DemandId,
    #[serde(skip)]
    pub(crate) index: usize,
    pub(crate) layer: LayerId,
    pub(crate) ingress: NodeId,
    pub(crate) egress: NodeId,
    pub(crate) offered_traffic: f64,
    pub(crate) recovery_type: IntendedRecoveryType,
    pub(crate) service_chain: Vec<String>,
    /// Demands this demand is aggregated into, with the weight of the folded traffic.
    #[serde(with = "map_as_pairs")]
    pub(crate) aggregated_into: BTreeMap<DemandId, f64>,
    pub(crate) meta: Metadata,
}

impl_indexed!(Demand);

impl Demand {
    /// Returns the demand id
    pub fn id(&self) -> DemandId {
        self.id
    }

    /// Returns the index of the demand inside its layer
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the layer of the demand
    pub fn layer(&self) -> LayerId {
        self.layer
    }

    /// Returns the ingress node
    pub fn ingress(&self) -> NodeId {
        self.ingress
    }

    /// Returns the egress node
    pub fn egress(&self) -> NodeId {
        self.egress
    }

    /// Returns the own offered traffic, without the traffic aggregated into it.
    pub fn offered_traffic(&self) -> f64 {
        self.offered_traffic
    }

    /// Returns the intended recovery type
    pub fn recovery_type(&self) -> IntendedRecoveryType {
        self.recovery_type
    }

    /// Returns the ordered sequence of resource types the traffic must traverse.
    pub fn service_chain(&self) -> &[String] {
        &self.service_chain
    }

    /// Returns true if the demand requests a service chain.
    pub fn is_service_chain(&self) -> bool {
        !self.service_chain.is_empty()
    }

    /// Returns the demands this demand is aggregated into, together with the weights.
    pub fn aggregated_into(&self) -> &BTreeMap<DemandId, f64> {
        &self.aggregated_into
    }

    /// Returns attributes and tags
    pub fn meta(&self) -> &Metadata {
        &self.meta
    }
}

/// # Route
/// Explicit path of a demand in a source-routed layer. The path may traverse resources, which
/// makes the route a service chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub(crate) id: RouteId,
    #[serde(skip)]
    pub(crate) index: usize,
    pub(crate) layer: LayerId,
    pub(crate) demand: DemandId,
    pub(crate) path: Vec<PathElement>,
    pub(crate) carried_traffic: f64,
    pub(crate) occupied: Vec<f64>,
    pub(crate) backup_routes: Vec<RouteId>,
    pub(crate) meta: Metadata,
}

impl_indexed!(Route);

impl Route {
    /// Returns the route id
    pub fn id(&self) -> RouteId {
        self.id
    }

    /// Returns the index of the route inside its layer
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the layer of the route
    pub fn layer(&self) -> LayerId {
        self.layer
    }

    /// Returns the demand carried by this route
    pub fn demand(&self) -> DemandId {
        self.demand
    }

    /// Returns the sequence of traversed links and resources
    pub fn path(&self) -> &[PathElement] {
        &self.path
    }

    /// Returns the traversed links in order, skipping resources
    pub fn links(&self) -> impl Iterator<Item = LinkId> + '_ {
        self.path.iter().filter_map(|e| match e {
            PathElement::Link(l) => Some(*l),
            PathElement::Resource(_) => None,
        })
    }

    /// Returns the traversed resources in order
    pub fn resources(&self) -> impl Iterator<Item = ResourceId> + '_ {
        self.path.iter().filter_map(|e| match e {
            PathElement::Resource(r) => Some(*r),
            PathElement::Link(_) => None,
        })
    }

    /// Returns true if the route traverses at least one resource
    pub fn is_service_chain(&self) -> bool {
        self.resources().next().is_some()
    }

    /// Returns the traffic carried while the route is not failed
    pub fn carried_traffic_if_up(&self) -> f64 {
        self.carried_traffic
    }

    /// Returns the capacity occupied in each traversed element while the route is not failed
    pub fn occupied_capacity_if_up(&self) -> &[f64] {
        &self.occupied
    }

    /// Returns the routes that are designated as backup of this route
    pub fn backup_routes(&self) -> &[RouteId] {
        &self.backup_routes
    }

    /// Returns attributes and tags
    pub fn meta(&self) -> &Metadata {
        &self.meta
    }
}

/// # Multicast Demand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MulticastDemand {
    pub(crate) id: MulticastDemandId,
    #[serde(skip)]
    pub(crate) index: usize,
    pub(crate) layer: LayerId,
    pub(crate) ingress: NodeId,
    pub(crate) egresses: BTreeSet<NodeId>,
    pub(crate) offered_traffic: f64,
    pub(crate) meta: Metadata,
}

impl_indexed!(MulticastDemand);

impl MulticastDemand {
    /// Returns the multicast demand id
    pub fn id(&self) -> MulticastDemandId {
        self.id
    }

    /// Returns the index inside the layer
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the layer of the multicast demand
    pub fn layer(&self) -> LayerId {
        self.layer
    }

    /// Returns the ingress node
    pub fn ingress(&self) -> NodeId {
        self.ingress
    }

    /// Returns the set of egress nodes
    pub fn egresses(&self) -> &BTreeSet<NodeId> {
        &self.egresses
    }

    /// Returns the offered traffic
    pub fn offered_traffic(&self) -> f64 {
        self.offered_traffic
    }

    /// Returns attributes and tags
    pub fn meta(&self) -> &Metadata {
        &self.meta
    }
}

/// # Multicast Tree
/// Arborescence rooted at the ingress of the multicast demand, reaching every egress node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MulticastTree {
    pub(crate) id: MulticastTreeId,
    #[serde(skip)]
    pub(crate) index: usize,
    pub(crate) layer: LayerId,
    pub(crate) demand: MulticastDemandId,
    pub(crate) links: BTreeSet<LinkId>,
    pub(crate) carried_traffic: f64,
    pub(crate) occupied_capacity: f64,
    pub(crate) meta: Metadata,
}

impl_indexed!(MulticastTree);

impl MulticastTree {
    /// Returns the tree id
    pub fn id(&self) -> MulticastTreeId {
        self.id
    }

    /// Returns the index inside the layer
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the layer of the tree
    pub fn layer(&self) -> LayerId {
        self.layer
    }

    /// Returns the multicast demand realized by this tree
    pub fn demand(&self) -> MulticastDemandId {
        self.demand
    }

    /// Returns the set of links of the tree
    pub fn links(&self) -> &BTreeSet<LinkId> {
        &self.links
    }

    /// Returns the traffic carried while the tree is not failed
    pub fn carried_traffic_if_up(&self) -> f64 {
        self.carried_traffic
    }

    /// Returns the capacity occupied in each link while the tree is not failed
    pub fn occupied_capacity_if_up(&self) -> f64 {
        self.occupied_capacity
    }

    /// Returns attributes and tags
    pub fn meta(&self) -> &Metadata {
        &self.meta
    }
}

/// # Resource
/// Network-wide resource (e.g., a virtual network function) hosted at a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub(crate) id: ResourceId,
    #[serde(skip)]
    pub(crate) index: usize,
    pub(crate) resource_type: String,
    pub(crate) name: String,
    pub(crate) host: NodeId,
    pub(crate) capacity: f64,
    pub(crate) capacity_units: String,
    pub(crate) processing_time_ms: f64,
    pub(crate) meta: Metadata,
}

impl_indexed!(Resource);

impl Resource {
    /// Returns the resource id
    pub fn id(&self) -> ResourceId {
        self.id
    }

    /// Returns the current index of the resource
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the type of the resource
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Returns the name of the resource
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the hosting node
    pub fn host(&self) -> NodeId {
        self.host
    }

    /// Returns the capacity
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    /// Returns the capacity units
    pub fn capacity_units(&self) -> &str {
        &self.capacity_units
    }

    /// Returns the processing time in milliseconds, added to the delay of traversing routes
    pub fn processing_time_ms(&self) -> f64 {
        self.processing_time_ms
    }

    /// Returns attributes and tags
    pub fn meta(&self) -> &Metadata {
        &self.meta
    }
}

/// # Shared Risk Group
/// Set of nodes and links that fail together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedRiskGroup {
    pub(crate) id: SrgId,
    #[serde(skip)]
    pub(crate) index: usize,
    pub(crate) nodes: BTreeSet<NodeId>,
    pub(crate) links: BTreeSet<LinkId>,
    pub(crate) mean_time_to_fail_hours: f64,
    pub(crate) mean_time_to_repair_hours: f64,
    pub(crate) meta: Metadata,
}

impl_indexed!(SharedRiskGroup);

impl SharedRiskGroup {
    /// Returns the srg id
    pub fn id(&self) -> SrgId {
        self.id
    }

    /// Returns the current index of the srg
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the nodes of the srg
    pub fn nodes(&self) -> &BTreeSet<NodeId> {
        &self.nodes
    }

    /// Returns the links of the srg (possibly of different layers)
    pub fn links(&self) -> &BTreeSet<LinkId> {
        &self.links
    }

    /// Mean time to fail in hours
    pub fn mean_time_to_fail_hours(&self) -> f64 {
        self.mean_time_to_fail_hours
    }

    /// Mean time to repair in hours
    pub fn mean_time_to_repair_hours(&self) -> f64 {
        self.mean_time_to_repair_hours
    }

    /// Fraction of time the srg is not failed, `MTTF / (MTTF + MTTR)`
    pub fn availability(&self) -> f64 {
        let total = self.mean_time_to_fail_hours + self.mean_time_to_repair_hours;
        if total <= 0.0 {
            1.0
        } else {
            self.mean_time_to_fail_hours / total
        }
    }

    /// Returns attributes and tags
    pub fn meta(&self) -> &Metadata {
        &self.meta
    }
}

/// # Network Element (tagged union)
/// Borrowed view of any element of the plan, obtained by
/// [`NetPlan::get_element`](super::NetPlan::get_element).
#[derive(Debug, Clone, Copy)]
pub enum NetworkElement<'a> {
    /// Network layer
    Layer(&'a NetworkLayer),
    /// Node
    Node(&'a Node),
    /// Link
    Link(&'a Link),
    /// Unicast demand
    Demand(&'a Demand),
    /// Route or service chain
    Route(&'a Route),
    /// Multicast demand
    MulticastDemand(&'a MulticastDemand),
    /// Multicast tree
    MulticastTree(&'a MulticastTree),
    /// Resource
    Resource(&'a Resource),
    /// Shared risk group
    Srg(&'a SharedRiskGroup),
}

impl<'a> NetworkElement<'a> {
    /// Returns the reference (identifier) of the element
    pub fn element_ref(&self) -> ElementRef {
        match self {
            Self::Layer(x) => x.id.into(),
            Self::Node(x) => x.id.into(),
            Self::Link(x) => x.id.into(),
            Self::Demand(x) => x.id.into(),
            Self::Route(x) => x.id.into(),
            Self::MulticastDemand(x) => x.id.into(),
            Self::MulticastTree(x) => x.id.into(),
            Self::Resource(x) => x.id.into(),
            Self::Srg(x) => x.id.into(),
        }
    }

    /// Returns the index of the element inside its collection
    pub fn index(&self) -> usize {
        match self {
            Self::Layer(x) => x.index,
            Self::Node(x) => x.index,
            Self::Link(x) => x.index,
            Self::Demand(x) => x.index,
            Self::Route(x) => x.index,
            Self::MulticastDemand(x) => x.index,
            Self::MulticastTree(x) => x.index,
            Self::Resource(x) => x.index,
            Self::Srg(x) => x.index,
        }
    }

    /// Returns the attributes and tags of the element
    pub fn meta(&self) -> &'a Metadata {
        match self {
            Self::Layer(x) => &x.meta,
            Self::Node(x) => &x.meta,
            Self::Link(x) => &x.meta,
            Self::Demand(x) => &x.meta,
            Self::Route(x) => &x.meta,
            Self::MulticastDemand(x) => &x.meta,
            Self::MulticastTree(x) => &x.meta,
            Self::Resource(x) => &x.meta,
            Self::Srg(x) => &x.meta,
        }
    }

    /// Returns the layer of the element, or `None` for network-wide elements.
    pub fn layer(&self) -> Option<LayerId> {
        match self {
            Self::Layer(x) => Some(x.id),
            Self::Link(x) => Some(x.layer),
            Self::Demand(x) => Some(x.layer),
            Self::Route(x) => Some(x.layer),
            Self::MulticastDemand(x) => Some(x.layer),
            Self::MulticastTree(x) => Some(x.layer),
            Self::Node(_) | Self::Resource(_) | Self::Srg(_) => None,
        }
    }
}
