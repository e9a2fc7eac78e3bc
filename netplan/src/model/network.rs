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

//! # Top-level plan
//!
//! This module contains [`NetPlan`], the aggregate holding all layers, nodes, resources and
//! shared risk groups, together with the layer, node, link, resource and srg operations.

use super::cache::{insert_rel, remove_rel, Caches};
use super::config::NetPlanConfig;
use super::elements::*;
use super::registry::{Indexed, Registry};
use super::types::*;

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// # Multilayer network plan
///
/// A plan consists of an ordered list of [`NetworkLayer`]s, each with its own links, demands,
/// routes, multicast demands, multicast trees and forwarding rules. [`Node`]s, [`Resource`]s and
/// [`SharedRiskGroup`]s are network-wide. Upper-layer links can be coupled to lower-layer demands
/// (see [`NetPlan::couple_link_to_demand`]), in which case the capacity of the link is the traffic
/// carried by the demand.
///
/// All elements are referred to by their typed identifier. Identifiers are never reused, and stay
/// the same across [`NetPlan::copy`] and save/load. Every element additionally has a dense index
/// inside its collection, which changes when an element before it is removed.
///
/// Every mutation is validated before anything is changed. If a mutation fails, the plan is left
/// unmodified.
///
/// ```rust
/// use netplan::model::{NetPlan, NetPlanError};
///
/// fn main() -> Result<(), NetPlanError> {
///     let mut np = NetPlan::new();
///     let layer = np.default_layer();
///     let n1 = np.add_node("n1", (0.0, 0.0));
///     let n2 = np.add_node("n2", (1.0, 0.0));
///     let link = np.add_link(layer, n1, n2, 100.0, 10.0, 200000.0)?;
///     let demand = np.add_demand(layer, n1, n2, 10.0)?;
///     np.add_route(demand, 10.0, 10.0, vec![link])?;
///     assert_eq!(np.get_link_carried_traffic(link)?, 10.0);
///     assert_eq!(np.get_link_utilization(link)?, 0.1);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetPlan {
    pub(crate) name: String,
    pub(crate) description: String,
    pub(crate) meta: Metadata,
    pub(crate) next_id: u64,
    pub(crate) layers: Registry<NetworkLayer>,
    pub(crate) default_layer: LayerId,
    pub(crate) nodes: Registry<Node>,
    pub(crate) resources: Registry<Resource>,
    pub(crate) srgs: Registry<SharedRiskGroup>,
    #[serde(skip)]
    pub(crate) config: NetPlanConfig,
    #[serde(skip)]
    pub(crate) cache: Caches,
}

impl Default for NetPlan {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for NetPlan {
    /// Two plans are equal if their canonical state is equal. The caches are derived, and the
    /// configuration is not part of the plan.
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.description == other.description
            && self.meta == other.meta
            && self.next_id == other.next_id
            && self.default_layer == other.default_layer
            && self.layers == other.layers
            && self.nodes == other.nodes
            && self.resources == other.resources
            && self.srgs == other.srgs
    }
}

pub(crate) fn non_negative(what: &'static str, value: f64) -> Result<(), NetPlanError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(NetPlanError::NegativeValue { what, value })
    }
}

impl NetPlan {
    /// Create an empty plan with the default configuration. The plan contains one layer, which is
    /// the default layer.
    pub fn new() -> Self {
        Self::with_config(NetPlanConfig::default())
    }

    /// Create an empty plan with the given configuration.
    pub fn with_config(config: NetPlanConfig) -> Self {
        let mut np = Self {
            name: String::new(),
            description: String::new(),
            meta: Metadata::default(),
            next_id: 0,
            layers: Registry::default(),
            default_layer: LayerId(0),
            nodes: Registry::default(),
            resources: Registry::default(),
            srgs: Registry::default(),
            config,
            cache: Caches::default(),
        };
        np.default_layer = np.add_layer("Layer 0", "", "Gbps", "Gbps");
        np
    }

    /// Returns a deep copy of the plan. The copy keeps all identifiers and indices, and shares no
    /// state with the original.
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Returns the configuration
    pub fn config(&self) -> &NetPlanConfig {
        &self.config
    }

    /// Replace the configuration. The tolerance is only applied to forwarding rules set
    /// afterwards.
    pub fn set_config(&mut self, config: NetPlanConfig) {
        self.config = config;
    }

    /// Returns the name of the plan
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set the name of the plan
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.after_mutation();
    }

    /// Returns the description of the plan
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Set the description of the plan
    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.after_mutation();
    }

    /// Returns the attributes and tags of the plan itself
    pub fn meta(&self) -> &Metadata {
        &self.meta
    }

    pub(crate) fn new_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    // ---------------------------------------------------------------------------------------------
    // element lookup
    // ---------------------------------------------------------------------------------------------

    /// Returns the reference of the element with the given raw identifier.
    pub fn get_element_ref(&self, raw_id: u64) -> Result<ElementRef, NetPlanError> {
        self.cache
            .locator
            .get(&raw_id)
            .map(|(e, _)| *e)
            .ok_or(NetPlanError::UnknownIdentifier(raw_id))
    }

    /// Returns the layer of a layer-scoped element (link, demand, route, multicast demand or
    /// multicast tree), or the layer itself.
    pub fn get_element_layer(
        &self,
        element: impl Into<ElementRef>,
    ) -> Result<LayerId, NetPlanError> {
        let element = element.into();
        match self.cache.locator.get(&element.raw()) {
            Some((found, Some(layer))) if *found == element => Ok(*layer),
            Some((ElementRef::Layer(l), None)) if ElementRef::Layer(*l) == element => Ok(*l),
            _ => Err(NetPlanError::ElementNotFound(element)),
        }
    }

    pub(crate) fn scoped<T: Indexed>(
        &self,
        element: ElementRef,
        registry: fn(&NetworkLayer) -> &Registry<T>,
    ) -> Result<&T, NetPlanError> {
        let layer = self.get_element_layer(element)?;
        self.layers
            .get(layer.0)
            .and_then(|l| registry(l).get(element.raw()))
            .ok_or(NetPlanError::ElementNotFound(element))
    }

    pub(crate) fn scoped_mut<T: Indexed>(
        &mut self,
        element: ElementRef,
        registry: fn(&mut NetworkLayer) -> &mut Registry<T>,
    ) -> Result<&mut T, NetPlanError> {
        let layer = self.get_element_layer(element)?;
        self.layers
            .get_mut(layer.0)
            .and_then(|l| registry(l).get_mut(element.raw()))
            .ok_or(NetPlanError::ElementNotFound(element))
    }

    /// Returns a borrowed view of any element
    pub fn get_element(
        &self,
        element: impl Into<ElementRef>,
    ) -> Result<NetworkElement<'_>, NetPlanError> {
        Ok(match element.into() {
            ElementRef::Layer(x) => NetworkElement::Layer(self.get_layer(x)?),
            ElementRef::Node(x) => NetworkElement::Node(self.get_node(x)?),
            ElementRef::Link(x) => NetworkElement::Link(self.get_link(x)?),
            ElementRef::Demand(x) => NetworkElement::Demand(self.get_demand(x)?),
            ElementRef::Route(x) => NetworkElement::Route(self.get_route(x)?),
            ElementRef::MulticastDemand(x) => {
                NetworkElement::MulticastDemand(self.get_multicast_demand(x)?)
            }
            ElementRef::MulticastTree(x) => {
                NetworkElement::MulticastTree(self.get_multicast_tree(x)?)
            }
            ElementRef::Resource(x) => NetworkElement::Resource(self.get_resource(x)?),
            ElementRef::Srg(x) => NetworkElement::Srg(self.get_srg(x)?),
        })
    }

    // ---------------------------------------------------------------------------------------------
    // attributes and tags
    // ---------------------------------------------------------------------------------------------

    fn meta_mut(&mut self, element: ElementRef) -> Result<&mut Metadata, NetPlanError> {
        let not_found = NetPlanError::ElementNotFound(element);
        Ok(match element {
            ElementRef::Layer(x) => &mut self.layers.get_mut(x.0).ok_or(not_found)?.meta,
            ElementRef::Node(x) => &mut self.nodes.get_mut(x.0).ok_or(not_found)?.meta,
            ElementRef::Resource(x) => &mut self.resources.get_mut(x.0).ok_or(not_found)?.meta,
            ElementRef::Srg(x) => &mut self.srgs.get_mut(x.0).ok_or(not_found)?.meta,
            ElementRef::Link(_) => &mut self.scoped_mut(element, |l| &mut l.links)?.meta,
            ElementRef::Demand(_) => &mut self.scoped_mut(element, |l| &mut l.demands)?.meta,
            ElementRef::Route(_) => &mut self.scoped_mut(element, |l| &mut l.routes)?.meta,
            ElementRef::MulticastDemand(_) => {
                &mut self.scoped_mut(element, |l| &mut l.multicast_demands)?.meta
            }
            ElementRef::MulticastTree(_) => {
                &mut self.scoped_mut(element, |l| &mut l.multicast_trees)?.meta
            }
        })
    }

    /// Set an attribute of an element, returning the previous value.
    pub fn set_attribute(
        &mut self,
        element: impl Into<ElementRef>,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Option<String>, NetPlanError> {
        let previous = self.meta_mut(element.into())?.attributes.insert(key.into(), value.into());
        self.after_mutation();
        Ok(previous)
    }

    /// Remove an attribute of an element, returning the previous value.
    pub fn remove_attribute(
        &mut self,
        element: impl Into<ElementRef>,
        key: impl AsRef<str>,
    ) -> Result<Option<String>, NetPlanError> {
        let previous = self.meta_mut(element.into())?.attributes.remove(key.as_ref());
        self.after_mutation();
        Ok(previous)
    }

    /// Add a tag to an element. Returns `false` if the tag was already present.
    pub fn add_tag(
        &mut self,
        element: impl Into<ElementRef>,
        tag: impl Into<String>,
    ) -> Result<bool, NetPlanError> {
        let added = self.meta_mut(element.into())?.tags.insert(tag.into());
        self.after_mutation();
        Ok(added)
    }

    /// Remove a tag from an element. Returns `false` if the tag was not present.
    pub fn remove_tag(
        &mut self,
        element: impl Into<ElementRef>,
        tag: impl AsRef<str>,
    ) -> Result<bool, NetPlanError> {
        let removed = self.meta_mut(element.into())?.tags.remove(tag.as_ref());
        self.after_mutation();
        Ok(removed)
    }

    /// Set an attribute of the plan itself
    pub fn set_plan_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.meta.attributes.insert(key.into(), value.into());
        self.after_mutation();
    }

    /// Returns all elements carrying the tag
    pub fn get_tagged_elements(&self, tag: impl AsRef<str>) -> Vec<ElementRef> {
        self.cache
            .locator
            .values()
            .map(|(e, _)| *e)
            .filter(|e| {
                self.get_element(*e).map(|x| x.meta().has_tag(tag.as_ref())).unwrap_or(false)
            })
            .collect()
    }

    /// Returns all elements whose attribute `key` has the given value
    pub fn get_elements_by_attribute(
        &self,
        key: impl AsRef<str>,
        value: impl AsRef<str>,
    ) -> Vec<ElementRef> {
        self.cache
            .locator
            .values()
            .map(|(e, _)| *e)
            .filter(|e| {
                self.get_element(*e)
                    .map(|x| x.meta().attribute(key.as_ref()) == Some(value.as_ref()))
                    .unwrap_or(false)
            })
            .collect()
    }

    // ---------------------------------------------------------------------------------------------
    // layers
    // ---------------------------------------------------------------------------------------------

    /// Add a new layer in source routing, returning its id.
    pub fn add_layer(
        &mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        link_capacity_units: impl Into<String>,
        demand_traffic_units: impl Into<String>,
    ) -> LayerId {
        let id = LayerId(self.new_id());
        let layer = NetworkLayer::new(
            id,
            name.into(),
            description.into(),
            link_capacity_units.into(),
            demand_traffic_units.into(),
        );
        debug!("Add layer {:?} ({})", id, layer.name);
        self.cache.add_layer(&layer);
        self.layers.insert(layer);
        self.after_mutation();
        id
    }

    /// Remove a layer and all its elements. Upper-layer links coupled to demands of this layer are
    /// decoupled. The last layer cannot be removed. If the default layer is removed, the first
    /// remaining layer becomes the default layer.
    pub fn remove_network_layer(&mut self, layer: LayerId) -> Result<(), NetPlanError> {
        let l = self.get_layer(layer)?;
        if self.layers.len() == 1 {
            return Err(NetPlanError::LastLayer);
        }
        let demands: Vec<DemandId> = l.demands.iter().map(|x| x.id).collect();
        let mdemands: Vec<MulticastDemandId> = l.multicast_demands.iter().map(|x| x.id).collect();
        let links: Vec<LinkId> = l.links.iter().map(|x| x.id).collect();

        // demands take their routes and trees with them
        for d in demands {
            self.remove_demand_internal(d)?;
        }
        for md in mdemands {
            self.remove_multicast_demand_internal(md)?;
        }
        for link in links {
            self.remove_link_internal(link)?;
        }
        if let Some(removed) = self.layers.remove(layer.0) {
            self.cache.remove_layer(&removed);
        }
        if self.default_layer == layer {
            if let Some(first) = self.layers.by_index(0) {
                self.default_layer = first.id;
            }
        }
        debug!("Removed layer {:?}", layer);
        self.after_mutation();
        Ok(())
    }

    /// Returns the layer
    pub fn get_layer(&self, layer: LayerId) -> Result<&NetworkLayer, NetPlanError> {
        self.layers.get(layer.0).ok_or(NetPlanError::ElementNotFound(layer.into()))
    }

    pub(crate) fn layer_mut(&mut self, layer: LayerId) -> Result<&mut NetworkLayer, NetPlanError> {
        self.layers.get_mut(layer.0).ok_or(NetPlanError::ElementNotFound(layer.into()))
    }

    /// Returns the first layer with the given name
    pub fn get_layer_by_name(&self, name: impl AsRef<str>) -> Result<LayerId, NetPlanError> {
        self.layers
            .iter()
            .find(|l| l.name == name.as_ref())
            .map(|l| l.id)
            .ok_or_else(|| NetPlanError::LayerNameNotFound(name.as_ref().to_string()))
    }

    /// Returns the layer at the given index
    pub fn get_layer_by_index(&self, index: usize) -> Option<&NetworkLayer> {
        self.layers.by_index(index)
    }

    /// Returns all layers in order
    pub fn get_layers(&self) -> impl Iterator<Item = &NetworkLayer> {
        self.layers.iter()
    }

    /// Returns the ids of all layers in order
    pub fn get_layer_ids(&self) -> Vec<LayerId> {
        self.layers.iter().map(|l| l.id).collect()
    }

    /// Returns the number of layers
    pub fn get_number_of_layers(&self) -> usize {
        self.layers.len()
    }

    /// Returns the default layer
    pub fn default_layer(&self) -> LayerId {
        self.default_layer
    }

    /// Change the default layer
    pub fn set_default_layer(&mut self, layer: LayerId) -> Result<(), NetPlanError> {
        self.get_layer(layer)?;
        self.default_layer = layer;
        self.after_mutation();
        Ok(())
    }

    /// Rename a layer
    pub fn set_layer_name(
        &mut self,
        layer: LayerId,
        name: impl Into<String>,
    ) -> Result<(), NetPlanError> {
        self.layer_mut(layer)?.name = name.into();
        self.after_mutation();
        Ok(())
    }

    /// Change the description of a layer
    pub fn set_layer_description(
        &mut self,
        layer: LayerId,
        description: impl Into<String>,
    ) -> Result<(), NetPlanError> {
        self.layer_mut(layer)?.description = description.into();
        self.after_mutation();
        Ok(())
    }

    /// Change the link capacity units of a layer. Fails if a link of the layer is coupled to a
    /// demand whose traffic units differ from the new units.
    pub fn set_layer_link_capacity_units(
        &mut self,
        layer: LayerId,
        units: impl Into<String>,
    ) -> Result<(), NetPlanError> {
        let units = units.into();
        self.get_layer(layer)?;
        for (upper, lower) in self.get_layer_coupling_pairs() {
            let lower_units = &self.get_layer(lower)?.demand_traffic_units;
            if upper == layer && *lower_units != units {
                return Err(NetPlanError::CouplingUnitsMismatch {
                    upper: units,
                    lower: lower_units.clone(),
                });
            }
        }
        self.layer_mut(layer)?.link_capacity_units = units;
        self.after_mutation();
        Ok(())
    }

    /// Change the demand traffic units of a layer. Fails if a demand of the layer is coupled to
    /// a link whose capacity units differ from the new units.
    pub fn set_layer_demand_traffic_units(
        &mut self,
        layer: LayerId,
        units: impl Into<String>,
    ) -> Result<(), NetPlanError> {
        let units = units.into();
        self.get_layer(layer)?;
        for (upper, lower) in self.get_layer_coupling_pairs() {
            let upper_units = &self.get_layer(upper)?.link_capacity_units;
            if lower == layer && *upper_units != units {
                return Err(NetPlanError::CouplingUnitsMismatch {
                    upper: upper_units.clone(),
                    lower: units,
                });
            }
        }
        self.layer_mut(layer)?.demand_traffic_units = units;
        self.after_mutation();
        Ok(())
    }

    // ---------------------------------------------------------------------------------------------
    // nodes
    // ---------------------------------------------------------------------------------------------

    /// Add a new node, which is up, and return its id.
    pub fn add_node(&mut self, name: impl Into<String>, xy: (f64, f64)) -> NodeId {
        let id = NodeId(self.new_id());
        let node = Node {
            id,
            index: 0,
            name: name.into(),
            xy,
            population: 0.0,
            site_name: None,
            is_up: true,
            meta: Metadata::default(),
        };
        debug!("Add node {:?} ({})", id, node.name);
        self.cache.add_node(&node);
        self.nodes.insert(node);
        self.after_mutation();
        id
    }

    /// Remove a node. All links, demands and multicast demands (in any layer) starting or ending
    /// at the node are removed, as well as all resources hosted by it.
    pub fn remove_node(&mut self, node: NodeId) -> Result<(), NetPlanError> {
        self.get_node(node)?;
        let mut links: BTreeSet<LinkId> = BTreeSet::new();
        let mut demands: BTreeSet<DemandId> = BTreeSet::new();
        let mut mdemands: BTreeSet<MulticastDemandId> = BTreeSet::new();
        for layer in self.get_layer_ids() {
            links.extend(self.get_node_outgoing_links(node, layer));
            links.extend(self.get_node_incoming_links(node, layer));
            demands.extend(self.get_node_outgoing_demands(node, layer));
            demands.extend(self.get_node_incoming_demands(node, layer));
            mdemands.extend(self.get_node_outgoing_multicast_demands(node, layer));
            mdemands.extend(self.get_node_incoming_multicast_demands(node, layer));
        }
        for d in demands {
            self.remove_demand_internal(d)?;
        }
        for md in mdemands {
            self.remove_multicast_demand_internal(md)?;
        }
        for l in links {
            self.remove_link_internal(l)?;
        }
        for r in self.get_node_resources(node) {
            self.remove_resource_internal(r)?;
        }
        for s in self.get_node_srgs(node) {
            if let Some(srg) = self.srgs.get_mut(s.0) {
                srg.nodes.remove(&node);
            }
            remove_rel(&mut self.cache.node_srgs, node, &s);
        }
        if let Some(removed) = self.nodes.remove(node.0) {
            self.cache.remove_node(&removed);
        }
        self.refresh_all_traffic()?;
        debug!("Removed node {:?}", node);
        self.after_mutation();
        Ok(())
    }

    /// Returns the node
    pub fn get_node(&self, node: NodeId) -> Result<&Node, NetPlanError> {
        self.nodes.get(node.0).ok_or(NetPlanError::ElementNotFound(node.into()))
    }

    fn node_mut(&mut self, node: NodeId) -> Result<&mut Node, NetPlanError> {
        self.nodes.get_mut(node.0).ok_or(NetPlanError::ElementNotFound(node.into()))
    }

    /// Returns the first node with the given name
    pub fn get_node_by_name(&self, name: impl AsRef<str>) -> Option<NodeId> {
        self.nodes.iter().find(|n| n.name == name.as_ref()).map(|n| n.id)
    }

    /// Returns the node at the given index
    pub fn get_node_by_index(&self, index: usize) -> Option<&Node> {
        self.nodes.by_index(index)
    }

    /// Returns all nodes in order
    pub fn get_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Returns the ids of all nodes in order
    pub fn get_node_ids(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|n| n.id).collect()
    }

    /// Returns the number of nodes
    pub fn get_number_of_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Rename a node
    pub fn set_node_name(
        &mut self,
        node: NodeId,
        name: impl Into<String>,
    ) -> Result<(), NetPlanError> {
        self.node_mut(node)?.name = name.into();
        self.after_mutation();
        Ok(())
    }

    /// Move a node
    pub fn set_node_xy(&mut self, node: NodeId, xy: (f64, f64)) -> Result<(), NetPlanError> {
        self.node_mut(node)?.xy = xy;
        self.after_mutation();
        Ok(())
    }

    /// Set the population of a node
    pub fn set_node_population(
        &mut self,
        node: NodeId,
        population: f64,
    ) -> Result<(), NetPlanError> {
        non_negative("population", population)?;
        self.node_mut(node)?.population = population;
        self.after_mutation();
        Ok(())
    }

    /// Set or clear the site of a node
    pub fn set_node_site_name(
        &mut self,
        node: NodeId,
        site: Option<String>,
    ) -> Result<(), NetPlanError> {
        self.node_mut(node)?.site_name = site;
        self.after_mutation();
        Ok(())
    }

    /// Returns the outgoing links of a node in a layer
    pub fn get_node_outgoing_links(&self, node: NodeId, layer: LayerId) -> Vec<LinkId> {
        get_set(&self.cache.node_out_links, &(node, layer))
    }

    /// Returns the incoming links of a node in a layer
    pub fn get_node_incoming_links(&self, node: NodeId, layer: LayerId) -> Vec<LinkId> {
        get_set(&self.cache.node_in_links, &(node, layer))
    }

    /// Returns the demands of a layer with the node as ingress
    pub fn get_node_outgoing_demands(&self, node: NodeId, layer: LayerId) -> Vec<DemandId> {
        get_set(&self.cache.node_out_demands, &(node, layer))
    }

    /// Returns the demands of a layer with the node as egress
    pub fn get_node_incoming_demands(&self, node: NodeId, layer: LayerId) -> Vec<DemandId> {
        get_set(&self.cache.node_in_demands, &(node, layer))
    }

    /// Returns the multicast demands of a layer with the node as ingress
    pub fn get_node_outgoing_multicast_demands(
        &self,
        node: NodeId,
        layer: LayerId,
    ) -> Vec<MulticastDemandId> {
        get_set(&self.cache.node_out_mdemands, &(node, layer))
    }

    /// Returns the multicast demands of a layer with the node as one of the egress nodes
    pub fn get_node_incoming_multicast_demands(
        &self,
        node: NodeId,
        layer: LayerId,
    ) -> Vec<MulticastDemandId> {
        get_set(&self.cache.node_in_mdemands, &(node, layer))
    }

    /// Returns all links of a layer from `origin` to `destination`
    pub fn get_node_pair_links(
        &self,
        origin: NodeId,
        destination: NodeId,
        layer: LayerId,
    ) -> Vec<LinkId> {
        self.get_node_outgoing_links(origin, layer)
            .into_iter()
            .filter(|l| self.get_link(*l).map(|x| x.destination == destination).unwrap_or(false))
            .collect()
    }

    /// Returns the resources hosted by a node
    pub fn get_node_resources(&self, node: NodeId) -> Vec<ResourceId> {
        get_set(&self.cache.node_resources, &node)
    }

    /// Returns the shared risk groups containing the node
    pub fn get_node_srgs(&self, node: NodeId) -> Vec<SrgId> {
        get_set(&self.cache.node_srgs, &node)
    }

    // ---------------------------------------------------------------------------------------------
    // links
    // ---------------------------------------------------------------------------------------------

    /// Add a new link to a layer. The link is up and not coupled.
    pub fn add_link(
        &mut self,
        layer: LayerId,
        origin: NodeId,
        destination: NodeId,
        capacity: f64,
        length_km: f64,
        propagation_speed_km_per_sec: f64,
    ) -> Result<LinkId, NetPlanError> {
        self.get_layer(layer)?;
        self.get_node(origin)?;
        self.get_node(destination)?;
        if origin == destination {
            return Err(NetPlanError::SameEndNodes(origin));
        }
        non_negative("link capacity", capacity)?;
        non_negative("link length", length_km)?;
        non_negative("propagation speed", propagation_speed_km_per_sec)?;
        let id = LinkId(self.new_id());
        let link = Link {
            id,
            index: 0,
            layer,
            origin,
            destination,
            capacity,
            length_km,
            propagation_speed_km_per_sec,
            is_up: true,
            coupling: None,
            meta: Metadata::default(),
        };
        debug!("Add link {:?} in layer {:?}: {:?} -> {:?}", id, layer, origin, destination);
        self.cache.add_link(&link);
        self.layer_mut(layer)?.links.insert(link);
        self.after_mutation();
        Ok(id)
    }

    /// Add two links with the same properties, one in each direction.
    pub fn add_link_bidirectional(
        &mut self,
        layer: LayerId,
        a: NodeId,
        b: NodeId,
        capacity: f64,
        length_km: f64,
        propagation_speed_km_per_sec: f64,
    ) -> Result<(LinkId, LinkId), NetPlanError> {
        let ab = self.add_link(layer, a, b, capacity, length_km, propagation_speed_km_per_sec)?;
        let ba = self.add_link(layer, b, a, capacity, length_km, propagation_speed_km_per_sec)?;
        Ok((ab, ba))
    }

    /// Remove a link. Routes and multicast trees traversing the link are removed, and so are the
    /// forwarding rules of the link. If the link is coupled, it is decoupled first.
    pub fn remove_link(&mut self, link: LinkId) -> Result<(), NetPlanError> {
        let layer = self.get_link(link)?.layer;
        self.remove_link_internal(link)?;
        self.refresh_layer_traffic(layer)?;
        debug!("Removed link {:?}", link);
        self.after_mutation();
        Ok(())
    }

    pub(crate) fn remove_link_internal(&mut self, link: LinkId) -> Result<(), NetPlanError> {
        let l = self.get_link(link)?;
        let layer = l.layer;
        let coupled = l.coupling.is_some();
        for r in get_set(&self.cache.link_routes, &link) {
            self.remove_route_internal(r)?;
        }
        for t in get_set(&self.cache.link_trees, &link) {
            self.remove_multicast_tree_internal(t)?;
        }
        if coupled {
            self.decouple_link_internal(link)?;
        }
        for s in get_set(&self.cache.link_srgs, &link) {
            if let Some(srg) = self.srgs.get_mut(s.0) {
                srg.links.remove(&link);
            }
            remove_rel(&mut self.cache.link_srgs, link, &s);
        }
        let l = self.layer_mut(layer)?;
        l.forwarding_rules.retain(|(_, x), _| *x != link);
        if let Some(removed) = l.links.remove(link.0) {
            self.cache.remove_link(&removed);
        }
        Ok(())
    }

    /// Returns the link
    pub fn get_link(&self, link: LinkId) -> Result<&Link, NetPlanError> {
        self.scoped(link.into(), |l| &l.links)
    }

    pub(crate) fn link_mut(&mut self, link: LinkId) -> Result<&mut Link, NetPlanError> {
        self.scoped_mut(link.into(), |l| &mut l.links)
    }

    /// Returns all links of a layer, in order
    pub fn get_links(&self, layer: LayerId) -> Result<impl Iterator<Item = &Link>, NetPlanError> {
        Ok(self.get_layer(layer)?.links.iter())
    }

    /// Returns the ids of all links of a layer, in order
    pub fn get_link_ids(&self, layer: LayerId) -> Result<Vec<LinkId>, NetPlanError> {
        Ok(self.get_links(layer)?.map(|l| l.id).collect())
    }

    /// Returns the number of links of a layer
    pub fn get_number_of_links(&self, layer: LayerId) -> Result<usize, NetPlanError> {
        Ok(self.get_layer(layer)?.links.len())
    }

    /// Set the nominal capacity of a link. Coupled links derive their capacity from the lower
    /// layer and cannot be changed.
    pub fn set_link_capacity(&mut self, link: LinkId, capacity: f64) -> Result<(), NetPlanError> {
        non_negative("link capacity", capacity)?;
        if self.get_link(link)?.coupling.is_some() {
            return Err(NetPlanError::AlreadyCoupled(link.into()));
        }
        self.link_mut(link)?.capacity = capacity;
        self.after_mutation();
        Ok(())
    }

    /// Set the length of a link in km
    pub fn set_link_length(&mut self, link: LinkId, length_km: f64) -> Result<(), NetPlanError> {
        non_negative("link length", length_km)?;
        self.link_mut(link)?.length_km = length_km;
        self.after_mutation();
        Ok(())
    }

    /// Set the propagation speed of a link in km/s
    pub fn set_link_propagation_speed(
        &mut self,
        link: LinkId,
        speed: f64,
    ) -> Result<(), NetPlanError> {
        non_negative("propagation speed", speed)?;
        self.link_mut(link)?.propagation_speed_km_per_sec = speed;
        self.after_mutation();
        Ok(())
    }

    /// Returns the shared risk groups containing the link
    pub fn get_link_srgs(&self, link: LinkId) -> Vec<SrgId> {
        get_set(&self.cache.link_srgs, &link)
    }

    // ---------------------------------------------------------------------------------------------
    // failure state
    // ---------------------------------------------------------------------------------------------

    /// Bring a link up or down. Routes and trees over a down link carry no traffic, and hop-by-hop
    /// traffic reaching the link is dropped.
    pub fn set_link_failure_state(
        &mut self,
        link: LinkId,
        is_up: bool,
    ) -> Result<(), NetPlanError> {
        let l = self.link_mut(link)?;
        l.is_up = is_up;
        let layer = l.layer;
        if is_up {
            self.cache.down_links.remove(&link);
        } else {
            self.cache.down_links.insert(link);
        }
        self.refresh_layer_traffic(layer)?;
        debug!("Link {:?} is now {}", link, if is_up { "up" } else { "down" });
        self.after_mutation();
        Ok(())
    }

    /// Bring a node up or down. A down node makes all its links unusable in every layer.
    pub fn set_node_failure_state(
        &mut self,
        node: NodeId,
        is_up: bool,
    ) -> Result<(), NetPlanError> {
        self.node_mut(node)?.is_up = is_up;
        if is_up {
            self.cache.down_nodes.remove(&node);
        } else {
            self.cache.down_nodes.insert(node);
        }
        self.refresh_all_traffic()?;
        debug!("Node {:?} is now {}", node, if is_up { "up" } else { "down" });
        self.after_mutation();
        Ok(())
    }

    /// Bring all nodes and links of a shared risk group up or down.
    pub fn set_srg_failure_state(&mut self, srg: SrgId, is_up: bool) -> Result<(), NetPlanError> {
        let s = self.get_srg(srg)?;
        let nodes: Vec<NodeId> = s.nodes.iter().copied().collect();
        let links: Vec<LinkId> = s.links.iter().copied().collect();
        for n in nodes {
            self.node_mut(n)?.is_up = is_up;
            if is_up {
                self.cache.down_nodes.remove(&n);
            } else {
                self.cache.down_nodes.insert(n);
            }
        }
        for l in links {
            self.link_mut(l)?.is_up = is_up;
            if is_up {
                self.cache.down_links.remove(&l);
            } else {
                self.cache.down_links.insert(l);
            }
        }
        self.refresh_all_traffic()?;
        debug!("Srg {:?} is now {}", srg, if is_up { "up" } else { "down" });
        self.after_mutation();
        Ok(())
    }

    /// Returns all nodes which are down
    pub fn get_nodes_down(&self) -> Vec<NodeId> {
        self.cache.down_nodes.iter().copied().collect()
    }

    /// Returns all links of a layer which are down
    pub fn get_links_down(&self, layer: LayerId) -> Vec<LinkId> {
        self.cache
            .down_links
            .iter()
            .copied()
            .filter(|l| self.get_link(*l).map(|x| x.layer == layer).unwrap_or(false))
            .collect()
    }

    /// Returns `true` if the link is up and both its end nodes are up.
    pub fn is_link_usable(&self, link: LinkId) -> Result<bool, NetPlanError> {
        let l = self.get_link(link)?;
        Ok(l.is_up
            && !self.cache.down_nodes.contains(&l.origin)
            && !self.cache.down_nodes.contains(&l.destination))
    }

    // ---------------------------------------------------------------------------------------------
    // resources
    // ---------------------------------------------------------------------------------------------

    /// Add a resource hosted at a node.
    pub fn add_resource(
        &mut self,
        resource_type: impl Into<String>,
        name: impl Into<String>,
        host: NodeId,
        capacity: f64,
        capacity_units: impl Into<String>,
        processing_time_ms: f64,
    ) -> Result<ResourceId, NetPlanError> {
        self.get_node(host)?;
        non_negative("resource capacity", capacity)?;
        non_negative("processing time", processing_time_ms)?;
        let id = ResourceId(self.new_id());
        let resource = Resource {
            id,
            index: 0,
            resource_type: resource_type.into(),
            name: name.into(),
            host,
            capacity,
            capacity_units: capacity_units.into(),
            processing_time_ms,
            meta: Metadata::default(),
        };
        debug!("Add resource {:?} of type {} at {:?}", id, resource.resource_type, host);
        self.cache.add_resource(&resource);
        self.resources.insert(resource);
        self.after_mutation();
        Ok(id)
    }

    /// Remove a resource, together with all service chains traversing it.
    pub fn remove_resource(&mut self, resource: ResourceId) -> Result<(), NetPlanError> {
        self.get_resource(resource)?;
        self.remove_resource_internal(resource)?;
        debug!("Removed resource {:?}", resource);
        self.after_mutation();
        Ok(())
    }

    fn remove_resource_internal(&mut self, resource: ResourceId) -> Result<(), NetPlanError> {
        let routes: Vec<RouteId> = self
            .cache
            .resource_occupation
            .get(&resource)
            .map(|m| m.keys().copied().collect())
            .unwrap_or_default();
        for r in routes {
            self.remove_route_internal(r)?;
        }
        if let Some(removed) = self.resources.remove(resource.0) {
            self.cache.remove_resource(&removed);
        }
        Ok(())
    }

    /// Returns the resource
    pub fn get_resource(&self, resource: ResourceId) -> Result<&Resource, NetPlanError> {
        self.resources.get(resource.0).ok_or(NetPlanError::ElementNotFound(resource.into()))
    }

    /// Returns all resources in order
    pub fn get_resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    /// Returns all resources of the given type
    pub fn get_resources_of_type(&self, resource_type: impl AsRef<str>) -> Vec<ResourceId> {
        self.resources
            .iter()
            .filter(|r| r.resource_type == resource_type.as_ref())
            .map(|r| r.id)
            .collect()
    }

    /// Returns the number of resources
    pub fn get_number_of_resources(&self) -> usize {
        self.resources.len()
    }

    /// Set the capacity of a resource
    pub fn set_resource_capacity(
        &mut self,
        resource: ResourceId,
        capacity: f64,
    ) -> Result<(), NetPlanError> {
        non_negative("resource capacity", capacity)?;
        self.resources
            .get_mut(resource.0)
            .ok_or(NetPlanError::ElementNotFound(resource.into()))?
            .capacity = capacity;
        self.after_mutation();
        Ok(())
    }

    // ---------------------------------------------------------------------------------------------
    // shared risk groups
    // ---------------------------------------------------------------------------------------------

    /// Add an empty shared risk group.
    pub fn add_srg(
        &mut self,
        mean_time_to_fail_hours: f64,
        mean_time_to_repair_hours: f64,
    ) -> Result<SrgId, NetPlanError> {
        non_negative("mean time to fail", mean_time_to_fail_hours)?;
        non_negative("mean time to repair", mean_time_to_repair_hours)?;
        let id = SrgId(self.new_id());
        let srg = SharedRiskGroup {
            id,
            index: 0,
            nodes: BTreeSet::new(),
            links: BTreeSet::new(),
            mean_time_to_fail_hours,
            mean_time_to_repair_hours,
            meta: Metadata::default(),
        };
        debug!("Add srg {:?}", id);
        self.cache.add_srg(&srg);
        self.srgs.insert(srg);
        self.after_mutation();
        Ok(id)
    }

    /// Remove a shared risk group. Its nodes and links are not affected.
    pub fn remove_srg(&mut self, srg: SrgId) -> Result<(), NetPlanError> {
        let removed = self.srgs.remove(srg.0).ok_or(NetPlanError::ElementNotFound(srg.into()))?;
        self.cache.remove_srg(&removed);
        self.after_mutation();
        Ok(())
    }

    fn srg_mut(&mut self, srg: SrgId) -> Result<&mut SharedRiskGroup, NetPlanError> {
        self.srgs.get_mut(srg.0).ok_or(NetPlanError::ElementNotFound(srg.into()))
    }

    /// Add a node to a shared risk group
    pub fn add_node_to_srg(&mut self, srg: SrgId, node: NodeId) -> Result<(), NetPlanError> {
        self.get_node(node)?;
        self.srg_mut(srg)?.nodes.insert(node);
        insert_rel(&mut self.cache.node_srgs, node, srg);
        self.after_mutation();
        Ok(())
    }

    /// Add a link (of any layer) to a shared risk group
    pub fn add_link_to_srg(&mut self, srg: SrgId, link: LinkId) -> Result<(), NetPlanError> {
        self.get_link(link)?;
        self.srg_mut(srg)?.links.insert(link);
        insert_rel(&mut self.cache.link_srgs, link, srg);
        self.after_mutation();
        Ok(())
    }

    /// Remove a node from a shared risk group
    pub fn remove_node_from_srg(&mut self, srg: SrgId, node: NodeId) -> Result<(), NetPlanError> {
        self.srg_mut(srg)?.nodes.remove(&node);
        remove_rel(&mut self.cache.node_srgs, node, &srg);
        self.after_mutation();
        Ok(())
    }

    /// Remove a link from a shared risk group
    pub fn remove_link_from_srg(&mut self, srg: SrgId, link: LinkId) -> Result<(), NetPlanError> {
        self.srg_mut(srg)?.links.remove(&link);
        remove_rel(&mut self.cache.link_srgs, link, &srg);
        self.after_mutation();
        Ok(())
    }

    /// Set the mean time to fail and the mean time to repair of a shared risk group
    pub fn set_srg_failure_rates(
        &mut self,
        srg: SrgId,
        mean_time_to_fail_hours: f64,
        mean_time_to_repair_hours: f64,
    ) -> Result<(), NetPlanError> {
        non_negative("mean time to fail", mean_time_to_fail_hours)?;
        non_negative("mean time to repair", mean_time_to_repair_hours)?;
        let s = self.srg_mut(srg)?;
        s.mean_time_to_fail_hours = mean_time_to_fail_hours;
        s.mean_time_to_repair_hours = mean_time_to_repair_hours;
        self.after_mutation();
        Ok(())
    }

    /// Returns the shared risk group
    pub fn get_srg(&self, srg: SrgId) -> Result<&SharedRiskGroup, NetPlanError> {
        self.srgs.get(srg.0).ok_or(NetPlanError::ElementNotFound(srg.into()))
    }

    /// Returns all shared risk groups in order
    pub fn get_srgs(&self) -> impl Iterator<Item = &SharedRiskGroup> {
        self.srgs.iter()
    }

    /// Returns the number of shared risk groups
    pub fn get_number_of_srgs(&self) -> usize {
        self.srgs.len()
    }
}

pub(crate) fn get_set<K: Ord, V: Ord + Copy>(
    map: &std::collections::BTreeMap<K, BTreeSet<V>>,
    key: &K,
) -> Vec<V> {
    map.get(key).map(|s| s.iter().copied().collect()).unwrap_or_default()
}
