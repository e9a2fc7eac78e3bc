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

//! # Helper (printer) functions for the plan
//! Module containing helper functions to get formatted strings of elements, with all node and
//! layer names inserted.

use super::network::NetPlan;
use super::propagation::PropagationClosure;
use super::types::*;

use itertools::Itertools;

fn node_name(np: &NetPlan, node: NodeId) -> Result<&str, NetPlanError> {
    Ok(np.get_node(node)?.name())
}

/// Returns a formatted string of the layer, including its routing type and units.
pub fn layer(np: &NetPlan, layer: LayerId) -> Result<String, NetPlanError> {
    let l = np.get_layer(layer)?;
    Ok(format!(
        concat!(
            "{name} ({routing:?}, capacity in {lcu}, traffic in {dtu}): ",
            "{links} links, {demands} demands, {mds} multicast demands"
        ),
        name = l.name(),
        routing = l.routing_type(),
        lcu = l.link_capacity_units(),
        dtu = l.demand_traffic_units(),
        links = l.links.len(),
        demands = l.demands.len(),
        mds = l.multicast_demands.len(),
    ))
}

/// Returns a formatted string of the link, as `origin -> destination`, followed by the
/// occupation and the capacity. Coupled and failed links are marked.
pub fn link(np: &NetPlan, link: LinkId) -> Result<String, NetPlanError> {
    let l = np.get_link(link)?;
    let mut result = format!(
        "{} -> {} [{:.3}/{:.3}]",
        node_name(np, l.origin())?,
        node_name(np, l.destination())?,
        np.get_link_occupied_capacity(link)?,
        np.get_link_capacity(link)?
    );
    match l.coupling() {
        Some(LinkCoupling::Demand(d)) => result.push_str(&format!(" coupled to {:?}", d)),
        Some(LinkCoupling::MulticastDemand(md)) => {
            result.push_str(&format!(" coupled to {:?}", md))
        }
        None => {}
    }
    if !np.is_link_usable(link)? {
        result.push_str(" DOWN");
    }
    Ok(result)
}

/// Returns a formatted string of the demand, with its offered and carried traffic.
pub fn demand(np: &NetPlan, demand: DemandId) -> Result<String, NetPlanError> {
    let d = np.get_demand(demand)?;
    Ok(format!(
        "{} => {}: offered {:.3}, carried {:.3}",
        node_name(np, d.ingress())?,
        node_name(np, d.egress())?,
        np.get_demand_offered_traffic(demand)?,
        np.get_demand_carried_traffic(demand)?
    ))
}

/// Returns the route as a sequence of node and resource names.
pub fn route(np: &NetPlan, route: RouteId) -> Result<String, NetPlanError> {
    let r = np.get_route(route)?;
    let d = np.get_demand(r.demand())?;
    let mut hops = vec![node_name(np, d.ingress())?.to_string()];
    for elem in r.path() {
        match elem {
            PathElement::Link(l) => {
                hops.push(node_name(np, np.get_link(*l)?.destination())?.to_string())
            }
            PathElement::Resource(res) => hops.push(format!("[{}]", np.get_resource(*res)?.name())),
        }
    }
    let mut result =
        format!("{} ({:.3})", hops.iter().join(" -> "), np.get_route_carried_traffic(route)?);
    if np.is_route_down(route)? {
        result.push_str(" DOWN");
    }
    Ok(result)
}

/// Returns one line per link of the closure, grouped by layer. Backup links are prefixed with `b`.
pub fn closure(np: &NetPlan, closure: &PropagationClosure) -> Result<Vec<String>, NetPlanError> {
    let mut result = Vec::new();
    for layer_id in np.get_layer_ids() {
        let links: Vec<LinkId> = closure
            .all
            .iter()
            .copied()
            .filter(|l| np.get_link(*l).map(|x| x.layer() == layer_id).unwrap_or(false))
            .collect();
        if links.is_empty() {
            continue;
        }
        result.push(format!("{}:", np.get_layer(layer_id)?.name()));
        for l in links {
            let prefix = if closure.primary.contains(&l) { "  " } else { "b " };
            result.push(format!("{}{}", prefix, self::link(np, l)?));
        }
    }
    for t in closure.vertical_transitions.iter() {
        result.push(format!(
            "at {}: {} -> {}",
            node_name(np, t.node)?,
            np.get_layer(t.from_layer)?.name(),
            np.get_layer(t.to_layer)?.name()
        ));
    }
    if !closure.crossed_demands.is_empty() {
        result.push(format!(
            "crossed demands: {}",
            closure.crossed_demands.iter().map(|d| d.0).join(", ")
        ));
    }
    Ok(result)
}

/// Returns one line per layer, with the total offered, carried and blocked traffic, and the
/// number of oversubscribed and failed links.
pub fn summary(np: &NetPlan) -> Result<Vec<String>, NetPlanError> {
    let mut result = vec![format!(
        "{}: {} layers, {} nodes ({} down), {} resources, {} SRGs",
        if np.name().is_empty() { "<unnamed>" } else { np.name() },
        np.get_number_of_layers(),
        np.get_number_of_nodes(),
        np.get_nodes_down().len(),
        np.get_number_of_resources(),
        np.get_number_of_srgs()
    )];
    for layer_id in np.get_layers_top_down()? {
        let (offered, carried, blocked) = np.get_layer_traffic_summary(layer_id)?;
        result.push(format!(
            "  {}: offered {:.3}, carried {:.3}, blocked {:.3}, {} oversubscribed, {} down",
            self::layer(np, layer_id)?,
            offered,
            carried,
            blocked,
            np.get_links_oversubscribed(layer_id)?.len(),
            np.get_links_down(layer_id).len()
        ));
    }
    Ok(result)
}
