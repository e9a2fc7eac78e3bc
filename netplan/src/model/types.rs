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

//! Module containing all type definitions

use serde::{Deserialize, Serialize};
use thiserror::Error;

macro_rules! element_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy, Serialize, Deserialize,
        )]
        pub struct $name(pub u64);

        impl $name {
            /// Returns the raw identifier, unique among all elements of the plan.
            pub fn raw(&self) -> u64 {
                self.0
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> u64 {
                id.0
            }
        }
    };
}

element_id!(
    /// Network layer identification
    LayerId
);
element_id!(
    /// Node identification. Nodes exist in every layer.
    NodeId
);
element_id!(
    /// Link identification
    LinkId
);
element_id!(
    /// Unicast demand identification
    DemandId
);
element_id!(
    /// Route (or service chain) identification
    RouteId
);
element_id!(
    /// Multicast demand identification
    MulticastDemandId
);
element_id!(
    /// Multicast tree identification
    MulticastTreeId
);
element_id!(
    /// Resource identification
    ResourceId
);
element_id!(
    /// Shared risk group identification
    SrgId
);

/// # Element reference
/// Closed set of all element kinds of a [`NetPlan`](crate::model::NetPlan). Any element of the plan
/// can be referred to by an `ElementRef`, for instance to set attributes and tags.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
pub enum ElementRef {
    /// Network layer
    Layer(LayerId),
    /// Node
    Node(NodeId),
    /// Link
    Link(LinkId),
    /// Unicast demand
    Demand(DemandId),
    /// Route or service chain
    Route(RouteId),
    /// Multicast demand
    MulticastDemand(MulticastDemandId),
    /// Multicast tree
    MulticastTree(MulticastTreeId),
    /// Resource
    Resource(ResourceId),
    /// Shared risk group
    Srg(SrgId),
}

impl ElementRef {
    /// Returns the raw identifier of the referenced element
    pub fn raw(&self) -> u64 {
        match self {
            Self::Layer(x) => x.0,
            Self::Node(x) => x.0,
            Self::Link(x) => x.0,
            Self::Demand(x) => x.0,
            Self::Route(x) => x.0,
            Self::MulticastDemand(x) => x.0,
            Self::MulticastTree(x) => x.0,
            Self::Resource(x) => x.0,
            Self::Srg(x) => x.0,
        }
    }

    /// Returns a lowercase name of the element kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Layer(_) => "layer",
            Self::Node(_) => "node",
            Self::Link(_) => "link",
            Self::Demand(_) => "demand",
            Self::Route(_) => "route",
            Self::MulticastDemand(_) => "multicast demand",
            Self::MulticastTree(_) => "multicast tree",
            Self::Resource(_) => "resource",
            Self::Srg(_) => "srg",
        }
    }
}

impl From<LayerId> for ElementRef {
    fn from(x: LayerId) -> Self {
        Self::Layer(x)
    }
}

impl From<NodeId> for ElementRef {
    fn from(x: NodeId) -> Self {
        Self::Node(x)
    }
}

impl From<LinkId> for ElementRef {
    fn from(x: LinkId) -> Self {
        Self::Link(x)
    }
}

impl From<DemandId> for ElementRef {
    fn from(x: DemandId) -> Self {
        Self::Demand(x)
    }
}

impl From<RouteId> for ElementRef {
    fn from(x: RouteId) -> Self {
        Self::Route(x)
    }
}

impl From<MulticastDemandId> for ElementRef {
    fn from(x: MulticastDemandId) -> Self {
        Self::MulticastDemand(x)
    }
}

impl From<MulticastTreeId> for ElementRef {
    fn from(x: MulticastTreeId) -> Self {
        Self::MulticastTree(x)
    }
}

impl From<ResourceId> for ElementRef {
    fn from(x: ResourceId) -> Self {
        Self::Resource(x)
    }
}

impl From<SrgId> for ElementRef {
    fn from(x: SrgId) -> Self {
        Self::Srg(x)
    }
}

/// Element traversed by a route. A route that traverses at least one resource is called a
/// *service chain*.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
pub enum PathElement {
    /// Link of the route's layer
    Link(LinkId),
    /// Resource, hosted at the node where the route currently is
    Resource(ResourceId),
}

impl From<LinkId> for PathElement {
    fn from(x: LinkId) -> Self {
        Self::Link(x)
    }
}

impl From<ResourceId> for PathElement {
    fn from(x: ResourceId) -> Self {
        Self::Resource(x)
    }
}

/// Routing paradigm of a layer
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
pub enum RoutingType {
    /// Traffic is carried by explicit route objects
    SourceRouting,
    /// Traffic is carried according to per-demand forwarding fractions evaluated at each node
    HopByHopRouting,
}

impl Default for RoutingType {
    fn default() -> Self {
        Self::SourceRouting
    }
}

/// Recovery scheme a demand is expected to use. This is a tag only, the model does not enforce
/// it.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
pub enum IntendedRecoveryType {
    /// Nothing specified
    NotSpecified,
    /// No recovery
    None,
    /// Protection (1+1 or 1:1), traffic is not moved back after repair
    ProtectionNoRevert,
    /// Protection, traffic is moved back to the primary route after repair
    ProtectionRevert,
    /// Restoration: backup paths are computed after the failure
    Restoration,
    /// Unknown scheme
    Unknown,
}

impl Default for IntendedRecoveryType {
    fn default() -> Self {
        Self::NotSpecified
    }
}

/// Lower-layer element a link is coupled to.
#[derive(PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Clone, Copy, Serialize, Deserialize)]
pub enum LinkCoupling {
    /// The link capacity is the carried traffic of this unicast demand
    Demand(DemandId),
    /// The link capacity is the traffic the multicast demand carries to the link's destination
    MulticastDemand(MulticastDemandId),
}

/// Model Errors
#[derive(Error, Debug, PartialEq)]
pub enum NetPlanError {
    /// The element does not exist in the plan
    #[error("Element was not found in the plan: {0:?}")]
    ElementNotFound(ElementRef),
    /// No element with the raw identifier exists
    #[error("No element with identifier {0}")]
    UnknownIdentifier(u64),
    /// The layer name is not known
    #[error("Layer name was not found: {0}")]
    LayerNameNotFound(String),
    /// An element does not belong to the expected layer
    #[error("{element:?} belongs to layer {found:?}, but layer {expected:?} was expected")]
    WrongLayer {
        /// The offending element
        element: ElementRef,
        /// The layer required by the operation
        expected: LayerId,
        /// The layer of the element
        found: LayerId,
    },
    /// Origin and destination of a link or demand are identical
    #[error("End nodes must be different, but both are {0:?}")]
    SameEndNodes(NodeId),
    /// A value that must be non-negative is negative
    #[error("Invalid value for {what}: {value}")]
    NegativeValue {
        /// The name of the value
        what: &'static str,
        /// The value which was given
        value: f64,
    },
    /// The sequence of traversed elements does not form a valid path for the demand
    #[error("Invalid path: {0}")]
    InvalidPath(&'static str),
    /// The resource types traversed do not match the service chain of the demand
    #[error("Service chain mismatch: expected {expected:?}, found {found:?}")]
    ServiceChainMismatch {
        /// Sequence of resource types requested by the demand
        expected: Vec<String>,
        /// Sequence of resource types traversed by the route
        found: Vec<String>,
    },
    /// The number of occupied capacities does not match the path length
    #[error("Expected {expected} occupied capacities, found {found}")]
    OccupationLengthMismatch {
        /// Number of traversed elements
        expected: usize,
        /// Number of values provided
        found: usize,
    },
    /// The link set is not an arborescence rooted at the ingress reaching all egress nodes
    #[error("Invalid multicast tree: {0}")]
    InvalidMulticastTree(&'static str),
    /// The operation needs the layer to be in a specific routing type
    #[error("Layer {layer:?} must be in {required:?} for this operation")]
    WrongRoutingType {
        /// The layer
        layer: LayerId,
        /// The routing type required by the operation
        required: RoutingType,
    },
    /// The routing type cannot be changed while incompatible elements exist
    #[error("Cannot change the routing type of layer {layer:?}: {reason}")]
    RoutingTypeConflict {
        /// The layer
        layer: LayerId,
        /// What prevents the transition
        reason: &'static str,
    },
    /// The routing state cannot be translated to the other routing type
    #[error("Cannot convert the routing of demand {0:?}: {1}")]
    RoutingConversion(DemandId, &'static str),
    /// The element is already coupled
    #[error("{0:?} is already coupled")]
    AlreadyCoupled(ElementRef),
    /// The element is not coupled
    #[error("{0:?} is not coupled")]
    NotCoupled(ElementRef),
    /// Link and demand are in the same layer
    #[error("Cannot couple elements of the same layer {0:?}")]
    CouplingSameLayer(LayerId),
    /// The end nodes of the link do not match the end nodes of the demand
    #[error("End nodes of {0:?} do not match the coupled demand")]
    CouplingEndNodeMismatch(LinkId),
    /// The capacity units of the upper layer differ from the traffic units of the lower layer
    #[error("Link capacity units {upper:?} do not match demand traffic units {lower:?}")]
    CouplingUnitsMismatch {
        /// Link capacity units of the upper layer
        upper: String,
        /// Demand traffic units of the lower layer
        lower: String,
    },
    /// The coupling would create a cycle among the layers
    #[error("Coupling layer {0:?} onto layer {1:?} creates a cycle")]
    CouplingCycle(LayerId, LayerId),
    /// Two demands cannot be connected by an aggregation relation
    #[error("Demand {0:?} cannot be aggregated into {1:?}: {2}")]
    InvalidAggregation(DemandId, DemandId, &'static str),
    /// The aggregation relation would create a cycle
    #[error("Aggregating {0:?} into {1:?} creates a cycle")]
    AggregationCycle(DemandId, DemandId),
    /// Invalid primary/backup relation
    #[error("{1:?} cannot be a backup of {0:?}: {2}")]
    InvalidBackupRoute(RouteId, RouteId, &'static str),
    /// The last remaining layer cannot be removed
    #[error("The last network layer cannot be removed")]
    LastLayer,
    /// A forwarding fraction is negative
    #[error("Negative forwarding fraction {2} for {0:?} on {1:?}")]
    NegativeForwardingFraction(DemandId, LinkId, f64),
    /// The outgoing forwarding fractions of a node exceed 1
    #[error("Forwarding fractions of {demand:?} leaving {node:?} sum up to {sum}")]
    ForwardingFractionExceeded {
        /// The demand
        demand: DemandId,
        /// The node where the fractions are summed up
        node: NodeId,
        /// The sum of all fractions
        sum: f64,
    },
    /// The forwarding matrix has the wrong dimensions
    #[error("Forwarding matrix must be {demands} x {links}")]
    MatrixDimensions {
        /// Number of demands in the layer
        demands: usize,
        /// Number of links in the layer
        links: usize,
    },
    /// Traffic did not drain within the allowed number of hops
    #[error("Forwarding loop for demand {0:?}")]
    RoutingLoop(DemandId),
    /// Caches do not match the canonical state. The instance must be discarded.
    #[error("Internal inconsistency: {0}")]
    InternalInconsistency(String),
}
