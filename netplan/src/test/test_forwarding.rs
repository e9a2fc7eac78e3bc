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

//! Test hop-by-hop forwarding and the aggregation of demands.

use crate::example_networks::*;
use crate::model::*;
use assert_approx_eq::assert_approx_eq;
use lazy_static::lazy_static;
use maplit::{btreemap, btreeset};

lazy_static! {
    static ref L0: LayerId = LayerId(0);
    static ref N1: NodeId = NodeId(1);
    static ref N2: NodeId = NodeId(2);
    static ref N3: NodeId = NodeId(3);
    static ref E12: LinkId = LinkId(4);
    static ref E21: LinkId = LinkId(5);
    static ref E13: LinkId = LinkId(6);
    static ref E31: LinkId = LinkId(7);
    static ref E23: LinkId = LinkId(8);
    static ref E32: LinkId = LinkId(9);
    static ref D12: DemandId = DemandId(10);
    static ref D21: DemandId = DemandId(11);
    static ref D13: DemandId = DemandId(12);
    static ref D31: DemandId = DemandId(13);
    static ref D23: DemandId = DemandId(14);
    static ref D32: DemandId = DemandId(15);
}

fn direct_rules() -> std::collections::BTreeMap<(DemandId, LinkId), f64> {
    btreemap! {
        (*D12, *E12) => 1.0,
        (*D21, *E21) => 1.0,
        (*D13, *E13) => 1.0,
        (*D31, *E31) => 1.0,
        (*D23, *E23) => 1.0,
        (*D32, *E32) => 1.0,
    }
}

#[test]
fn test_triangle_direct_forwarding() {
    let mut np = TriangleNet::net(0);
    assert_eq!(np.get_node_by_name("node1"), Some(*N1));
    assert_eq!(np.get_node_pair_links(*N3, *N2, *L0), vec![*E32]);
    assert_eq!(np.get_demand(*D32).unwrap().ingress(), *N3);

    np.set_routing_type(*L0, RoutingType::HopByHopRouting).unwrap();
    np.set_forwarding_rules(*L0, direct_rules()).unwrap();

    assert_eq!(
        np.get_links_this_layer_potentially_carrying_traffic(*D12, false),
        Ok(btreeset! {*E12})
    );
    assert_eq!(
        np.get_links_this_layer_potentially_carrying_traffic(*D12, true),
        Ok(btreeset! {*E12})
    );
    for d in np.get_demand_ids(*L0).unwrap() {
        assert_approx_eq!(np.get_demand_carried_traffic(d).unwrap(), 1.0);
        assert_approx_eq!(np.get_demand_blocked_traffic(d).unwrap(), 0.0);
    }
    assert_approx_eq!(np.get_link_carried_traffic(*E12).unwrap(), 1.0);
    assert_approx_eq!(np.get_link_utilization(*E12).unwrap(), 0.01);
    assert_eq!(np.get_forwarding_rule(*D12, *E12), Ok(1.0));
    assert_eq!(np.get_forwarding_rule(*D12, *E13), Ok(0.0));
    assert_eq!(np.get_demand_forwarding_rules(*D13), Ok(btreemap! {*E13 => 1.0}));
    np.check_caches_consistency().unwrap();

    // the example variant yields the same plan
    assert_eq!(np, TriangleNet::net(1));
}

#[test]
fn test_fraction_sum_is_bounded() {
    let mut np = TriangleNet::net(1);
    let before = np.copy();

    assert_eq!(
        np.set_forwarding_rule(*D12, *E13, 0.5),
        Err(NetPlanError::ForwardingFractionExceeded { demand: *D12, node: *N1, sum: 1.5 })
    );
    assert_eq!(
        np.set_forwarding_rule(*D12, *E13, -0.5),
        Err(NetPlanError::NegativeForwardingFraction(*D12, *E13, -0.5))
    );
    assert_eq!(np, before);

    // within the tolerance
    let mut rules = direct_rules();
    rules.insert((*D12, *E12), 0.9995);
    rules.insert((*D12, *E13), 0.0009);
    np.set_forwarding_rules(*L0, rules.clone()).unwrap();

    // without tolerance
    let mut strict = TriangleNet::net(1);
    strict.set_config(NetPlanConfig::default().tolerance(0.0));
    match strict.set_forwarding_rules(*L0, rules) {
        Err(NetPlanError::ForwardingFractionExceeded { demand, node, .. }) => {
            assert_eq!(demand, *D12);
            assert_eq!(node, *N1);
        }
        r => panic!("Unexpected result: {:?}", r),
    }
}

#[test]
fn test_split_traffic() {
    let mut np = TriangleNet::net(1);
    let mut rules = direct_rules();
    rules.insert((*D13, *E13), 0.5);
    rules.insert((*D13, *E12), 0.5);
    rules.insert((*D13, *E23), 1.0);
    np.set_forwarding_rules(*L0, rules).unwrap();

    assert_approx_eq!(np.get_demand_link_traffic(*D13, *E13).unwrap(), 0.5);
    assert_approx_eq!(np.get_demand_link_traffic(*D13, *E12).unwrap(), 0.5);
    assert_approx_eq!(np.get_demand_link_traffic(*D13, *E23).unwrap(), 0.5);
    assert_approx_eq!(np.get_demand_carried_traffic(*D13).unwrap(), 1.0);
    assert_approx_eq!(np.get_link_carried_traffic(*E12).unwrap(), 1.5);
    assert_approx_eq!(np.get_link_carried_traffic(*E23).unwrap(), 1.5);
    assert_eq!(
        np.get_links_this_layer_potentially_carrying_traffic(*D13, false),
        Ok(btreeset! {*E12, *E13, *E23})
    );

    // traffic of demands traversing e23
    assert_eq!(np.get_demands_potentially_traversing_link(*E23), Ok(btreeset! {*D13, *D23}));
    assert_eq!(
        np.get_links_this_layer_potentially_carrying_traffic_traversing_this_link(*E23, false),
        Ok(btreeset! {*E12, *E13, *E23})
    );
}

#[test]
fn test_traffic_is_dropped() {
    let mut np = TriangleNet::net(1);
    np.set_forwarding_rule(*D13, *E13, 0.0).unwrap();
    np.set_forwarding_rule(*D13, *E12, 0.5).unwrap();

    // the traffic reaches node 2, where no rule exists
    assert_approx_eq!(np.get_demand_carried_traffic(*D13).unwrap(), 0.0);
    assert_approx_eq!(np.get_demand_blocked_traffic(*D13).unwrap(), 1.0);
    assert_approx_eq!(np.get_demand_link_traffic(*D13, *E12).unwrap(), 0.5);
    assert_eq!(np.get_forwarding_rule(*D13, *E13), Ok(0.0));
}

#[test]
fn test_routing_loop() {
    let mut np = TriangleNet::net(1);
    let before = np.copy();

    let mut rules = direct_rules();
    rules.remove(&(*D12, *E12));
    rules.insert((*D12, *E13), 1.0);
    rules.insert((*D12, *E31), 1.0);
    assert_eq!(np.set_forwarding_rules(*L0, rules), Err(NetPlanError::RoutingLoop(*D12)));

    // a loop which only catches part of the traffic does not drain either
    let mut rules = direct_rules();
    rules.insert((*D12, *E12), 0.5);
    rules.insert((*D12, *E13), 0.5);
    rules.insert((*D12, *E31), 1.0);
    assert_eq!(np.set_forwarding_rules(*L0, rules), Err(NetPlanError::RoutingLoop(*D12)));

    assert_eq!(np, before);
}

#[test]
fn test_failures_drop_traffic() {
    let mut np = TriangleNet::net(1);
    np.set_link_failure_state(*E12, false).unwrap();
    assert_approx_eq!(np.get_demand_carried_traffic(*D12).unwrap(), 0.0);
    assert_approx_eq!(np.get_link_carried_traffic(*E12).unwrap(), 0.0);
    assert_eq!(np.get_demands_with_down_forwarding_path(*L0), Ok(vec![*D12]));
    // failures do not change the potential routing
    assert_eq!(
        np.get_links_this_layer_potentially_carrying_traffic(*D12, false),
        Ok(btreeset! {*E12})
    );

    np.set_node_failure_state(*N3, false).unwrap();
    assert_eq!(
        np.get_demands_with_down_forwarding_path(*L0),
        Ok(vec![*D12, *D13, *D31, *D23, *D32])
    );
    assert_approx_eq!(np.get_demand_carried_traffic(*D21).unwrap(), 1.0);

    np.set_link_failure_state(*E12, true).unwrap();
    np.set_node_failure_state(*N3, true).unwrap();
    assert_approx_eq!(np.get_demand_carried_traffic(*D12).unwrap(), 1.0);
    assert_eq!(np.get_demands_with_down_forwarding_path(*L0), Ok(vec![]));
    np.check_caches_consistency().unwrap();
}

#[test]
fn test_forwarding_matrix() {
    let mut np = TriangleNet::net(1);
    let f_de = np.get_forwarding_rules_matrix(*L0).unwrap();
    for (d, row) in f_de.iter().enumerate() {
        for (e, f) in row.iter().enumerate() {
            assert_eq!(*f, if d == e { 1.0 } else { 0.0 });
        }
    }

    assert_eq!(
        np.set_forwarding_rules_from_matrix(*L0, &[vec![1.0; 6]]),
        Err(NetPlanError::MatrixDimensions { demands: 6, links: 6 })
    );

    let mut f_de = f_de;
    f_de[0][0] = 0.0;
    f_de[0][2] = 1.0;
    np.set_forwarding_rules_from_matrix(*L0, &f_de).unwrap();
    assert_eq!(np.get_forwarding_rules_matrix(*L0), Ok(f_de));
    assert_eq!(np.get_demand_forwarding_rules(*D12), Ok(btreemap! {*E13 => 1.0}));
    // the traffic is stuck at node 3
    assert_approx_eq!(np.get_demand_carried_traffic(*D12).unwrap(), 0.0);
}

#[test]
fn test_operations_require_routing_type() {
    let mut np = TriangleNet::net(0);
    assert_eq!(
        np.set_forwarding_rules(*L0, direct_rules()),
        Err(NetPlanError::WrongRoutingType { layer: *L0, required: RoutingType::HopByHopRouting })
    );

    let mut np = TriangleNet::net(1);
    assert_eq!(
        np.add_route(*D12, 1.0, 1.0, vec![*E12]),
        Err(NetPlanError::WrongRoutingType { layer: *L0, required: RoutingType::SourceRouting })
    );
    assert_eq!(
        np.set_routing_type(*L0, RoutingType::SourceRouting),
        Err(NetPlanError::RoutingTypeConflict {
            layer: *L0,
            reason: "the layer has forwarding rules",
        })
    );

    // removing a link removes its rules
    np.remove_link(*E12).unwrap();
    assert_eq!(np.get_demand_forwarding_rules(*D12), Ok(btreemap! {}));
    assert_approx_eq!(np.get_demand_carried_traffic(*D12).unwrap(), 0.0);
    np.check_caches_consistency().unwrap();
}

#[test]
fn test_aggregated_demands() {
    let np = AggregationNet::net(0);
    let layer = np.default_layer();
    let d = np.get_demand_ids(layer).unwrap();
    let (da13, da23, da34, da45, da46) = (d[0], d[1], d[2], d[3], d[4]);

    assert_eq!(np.get_demand_aggregated_from(da34), btreemap! {da13 => 1.0, da23 => 1.0});
    assert_approx_eq!(np.get_demand_offered_traffic(da34).unwrap(), 20.0);
    assert_approx_eq!(np.get_demand_carried_traffic(da34).unwrap(), 20.0);
    assert_approx_eq!(np.get_demand_offered_traffic(da45).unwrap(), 8.0);
    assert_approx_eq!(np.get_demand_offered_traffic(da46).unwrap(), 12.0);
    assert_approx_eq!(np.get_demand_carried_traffic(da46).unwrap(), 12.0);
    let (offered, carried, blocked) = np.get_layer_traffic_summary(layer).unwrap();
    assert_approx_eq!(offered, 60.0);
    assert_approx_eq!(carried, 60.0);
    assert_approx_eq!(blocked, 0.0);

    // only half of the folded traffic reaches node 4
    let mut np = AggregationNet::net(1);
    assert_approx_eq!(np.get_demand_carried_traffic(da34).unwrap(), 10.0);
    assert_approx_eq!(np.get_demand_blocked_traffic(da34).unwrap(), 10.0);
    assert_approx_eq!(np.get_demand_offered_traffic(da45).unwrap(), 4.0);
    assert_approx_eq!(np.get_demand_offered_traffic(da46).unwrap(), 6.0);

    np.detach_from_aggregated_demands(da13, vec![da34]).unwrap();
    assert_approx_eq!(np.get_demand_offered_traffic(da34).unwrap(), 10.0);
    assert_approx_eq!(np.get_demand_offered_traffic(da46).unwrap(), 3.0);

    // removing a demand removes its aggregation
    np.remove_demand(da34).unwrap();
    assert_eq!(np.get_demand(da23).unwrap().aggregated_into(), &btreemap! {});
    assert_approx_eq!(np.get_demand_offered_traffic(da45).unwrap(), 0.0);
    np.check_caches_consistency().unwrap();
}

#[test]
fn test_aggregation_is_acyclic() {
    let mut np = TriangleNet::net(2);
    np.attach_to_aggregated_demands(*D12, btreemap! {*D23 => 1.0}).unwrap();
    assert_approx_eq!(np.get_demand_offered_traffic(*D23).unwrap(), 2.0);

    np.attach_to_aggregated_demands(*D12, btreemap! {*D21 => 0.5}).unwrap();
    let before = np.copy();
    assert_eq!(
        np.attach_to_aggregated_demands(*D21, btreemap! {*D12 => 1.0}),
        Err(NetPlanError::AggregationCycle(*D21, *D12))
    );
    assert_eq!(
        np.attach_to_aggregated_demands(*D12, btreemap! {*D31 => 1.0}),
        Err(NetPlanError::InvalidAggregation(
            *D12,
            *D31,
            "receiver does not start at the egress of the sender",
        ))
    );
    assert_eq!(np, before);
}
