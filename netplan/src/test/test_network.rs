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

//! Test the basic functionality of the plan: elements, indices, adjacency and metadata.

use crate::model::*;
use lazy_static::lazy_static;
use maplit::btreeset;

lazy_static! {
    static ref L0: LayerId = LayerId(0);
    static ref N1: NodeId = NodeId(1);
    static ref N2: NodeId = NodeId(2);
    static ref N3: NodeId = NodeId(3);
    static ref L12: LinkId = LinkId(4);
    static ref L23: LinkId = LinkId(5);
    static ref L13: LinkId = LinkId(6);
    static ref D13: DemandId = DemandId(7);
}

/// # Test plan
///
/// ```text
/// N1 ---> N2 ---> N3
///  '-------------^
/// ```
///
/// One demand from N1 to N3 with 10 units, no routes.
fn get_test_plan() -> NetPlan {
    let mut np = NetPlan::new();
    assert_eq!(np.default_layer(), *L0);

    assert_eq!(*N1, np.add_node("N1", (0.0, 0.0)));
    assert_eq!(*N2, np.add_node("N2", (1.0, 0.0)));
    assert_eq!(*N3, np.add_node("N3", (2.0, 0.0)));

    assert_eq!(Ok(*L12), np.add_link(*L0, *N1, *N2, 100.0, 10.0, 200000.0));
    assert_eq!(Ok(*L23), np.add_link(*L0, *N2, *N3, 100.0, 10.0, 200000.0));
    assert_eq!(Ok(*L13), np.add_link(*L0, *N1, *N3, 100.0, 30.0, 200000.0));

    assert_eq!(Ok(*D13), np.add_demand(*L0, *N1, *N3, 10.0));

    np
}

#[test]
fn test_identifiers_and_indices() {
    let np = get_test_plan();
    assert_eq!(np.get_number_of_nodes(), 3);
    assert_eq!(np.get_number_of_links(*L0), Ok(3));
    assert_eq!(np.get_number_of_demands(*L0), Ok(1));

    assert_eq!(np.get_node(*N2).unwrap().index(), 1);
    assert_eq!(np.get_link(*L13).unwrap().index(), 2);
    assert_eq!(np.get_node_by_index(2).map(|n| n.id()), Some(*N3));
    assert_eq!(np.get_node_by_name("N2"), Some(*N2));
    assert_eq!(np.get_node_by_name("N4"), None);

    assert_eq!(np.get_element_ref(4), Ok(ElementRef::Link(*L12)));
    assert_eq!(np.get_element_ref(7), Ok(ElementRef::Demand(*D13)));
    assert_eq!(np.get_element_ref(99), Err(NetPlanError::UnknownIdentifier(99)));
    assert_eq!(np.get_element_layer(*L23), Ok(*L0));
    assert_eq!(np.get_element(*N1).unwrap().element_ref(), ElementRef::Node(*N1));

    // ids of the wrong kind are not found
    assert_eq!(
        np.get_link(LinkId(N1.0)).map(|l| l.id()),
        Err(NetPlanError::ElementNotFound(ElementRef::Link(LinkId(1))))
    );
}

#[test]
fn test_remove_node_renumbers() {
    let mut np = get_test_plan();
    np.remove_node(*N1).unwrap();

    assert_eq!(np.get_number_of_nodes(), 2);
    assert_eq!(np.get_node(*N2).unwrap().index(), 0);
    assert_eq!(np.get_node(*N3).unwrap().index(), 1);

    // links and demands of the node are removed
    assert_eq!(np.get_link_ids(*L0), Ok(vec![*L23]));
    assert_eq!(np.get_link(*L23).unwrap().index(), 0);
    assert_eq!(np.get_number_of_demands(*L0), Ok(0));
    assert_eq!(
        np.get_link(*L12).map(|l| l.id()),
        Err(NetPlanError::ElementNotFound(ElementRef::Link(*L12)))
    );
    assert_eq!(np.get_element_ref(D13.0), Err(NetPlanError::UnknownIdentifier(D13.0)));

    np.check_caches_consistency().unwrap();
}

#[test]
fn test_identifiers_are_not_reused() {
    let mut np = get_test_plan();
    np.remove_link(*L13).unwrap();
    let link = np.add_link(*L0, *N1, *N3, 100.0, 30.0, 200000.0).unwrap();
    assert_eq!(link, LinkId(8));
    assert_eq!(np.get_link(link).unwrap().index(), 2);
}

#[test]
fn test_invalid_arguments() {
    let mut np = get_test_plan();
    let before = np.copy();

    assert_eq!(
        np.add_link(*L0, *N1, *N1, 100.0, 10.0, 200000.0),
        Err(NetPlanError::SameEndNodes(*N1))
    );
    assert_eq!(
        np.add_link(*L0, *N1, *N2, -1.0, 10.0, 200000.0),
        Err(NetPlanError::NegativeValue { what: "link capacity", value: -1.0 })
    );
    assert_eq!(
        np.add_demand(*L0, *N1, NodeId(100), 1.0),
        Err(NetPlanError::ElementNotFound(ElementRef::Node(NodeId(100))))
    );
    assert_eq!(
        np.add_demand(LayerId(100), *N1, *N2, 1.0),
        Err(NetPlanError::ElementNotFound(ElementRef::Layer(LayerId(100))))
    );
    assert_eq!(
        np.set_demand_offered_traffic(*D13, -3.0),
        Err(NetPlanError::NegativeValue { what: "offered traffic", value: -3.0 })
    );
    assert!(np.remove_link(LinkId(100)).is_err());

    // nothing has changed, and no identifier was consumed
    assert_eq!(np, before);
    assert_eq!(np.add_node("N4", (0.0, 0.0)), NodeId(8));
}

#[test]
fn test_adjacency() {
    let np = get_test_plan();
    assert_eq!(np.get_node_outgoing_links(*N1, *L0), vec![*L12, *L13]);
    assert_eq!(np.get_node_incoming_links(*N3, *L0), vec![*L23, *L13]);
    assert_eq!(np.get_node_incoming_links(*N1, *L0), vec![]);
    assert_eq!(np.get_node_pair_links(*N1, *N2, *L0), vec![*L12]);
    assert_eq!(np.get_node_pair_links(*N2, *N1, *L0), vec![]);
    assert_eq!(np.get_node_outgoing_demands(*N1, *L0), vec![*D13]);
    assert_eq!(np.get_node_incoming_demands(*N3, *L0), vec![*D13]);
}

#[test]
fn test_layers() {
    let mut np = get_test_plan();
    let upper = np.add_layer("upper", "", "Gbps", "Gbps");
    assert_eq!(upper, LayerId(8));
    assert_eq!(np.get_number_of_layers(), 2);
    assert_eq!(np.get_layer_by_name("upper"), Ok(upper));
    assert_eq!(np.get_layer_by_name("x"), Err(NetPlanError::LayerNameNotFound("x".to_string())));
    assert_eq!(np.get_layer(upper).unwrap().index(), 1);

    // nodes are shared, links are not
    let link = np.add_link(upper, *N1, *N3, 10.0, 1.0, 200000.0).unwrap();
    assert_eq!(np.get_node_outgoing_links(*N1, upper), vec![link]);
    assert_eq!(np.get_node_outgoing_links(*N1, *L0), vec![*L12, *L13]);

    // removing the default layer falls back to the first remaining layer
    np.remove_network_layer(*L0).unwrap();
    assert_eq!(np.default_layer(), upper);
    assert_eq!(np.get_layer(upper).unwrap().index(), 0);
    assert_eq!(np.get_number_of_nodes(), 3);
    assert_eq!(np.get_element_ref(L12.0), Err(NetPlanError::UnknownIdentifier(L12.0)));

    assert_eq!(np.remove_network_layer(upper), Err(NetPlanError::LastLayer));
    np.check_caches_consistency().unwrap();
}

#[test]
fn test_attributes_and_tags() {
    let mut np = get_test_plan();
    assert_eq!(np.set_attribute(*L12, "color", "red"), Ok(None));
    assert_eq!(np.set_attribute(*L12, "color", "blue"), Ok(Some("red".to_string())));
    assert_eq!(np.get_link(*L12).unwrap().meta().attribute("color"), Some("blue"));

    assert_eq!(np.add_tag(*N1, "core"), Ok(true));
    assert_eq!(np.add_tag(*L12, "core"), Ok(true));
    assert_eq!(np.add_tag(*L12, "core"), Ok(false));
    assert_eq!(np.add_tag(*L0, "core"), Ok(true));
    assert_eq!(
        np.get_tagged_elements("core"),
        vec![ElementRef::Layer(*L0), ElementRef::Node(*N1), ElementRef::Link(*L12)]
    );
    assert_eq!(np.get_elements_by_attribute("color", "blue"), vec![ElementRef::Link(*L12)]);

    assert_eq!(np.remove_tag(*L12, "core"), Ok(true));
    assert_eq!(np.remove_attribute(*L12, "color"), Ok(Some("blue".to_string())));
    assert_eq!(np.get_tagged_elements("core").len(), 2);

    np.set_plan_attribute("author", "me");
    assert_eq!(np.meta().attribute("author"), Some("me"));

    assert_eq!(
        np.add_tag(LinkId(100), "x"),
        Err(NetPlanError::ElementNotFound(ElementRef::Link(LinkId(100))))
    );
}

#[test]
fn test_copy_is_independent() {
    let np = get_test_plan();
    let mut copy = np.copy();
    assert_eq!(np, copy);
    copy.check_caches_consistency().unwrap();

    copy.add_node("N4", (3.0, 0.0));
    copy.remove_link(*L12).unwrap();
    copy.set_demand_offered_traffic(*D13, 1.0).unwrap();

    assert_ne!(np, copy);
    assert_eq!(np.get_number_of_nodes(), 3);
    assert_eq!(np.get_number_of_links(*L0), Ok(3));
    assert_eq!(np.get_demand(*D13).unwrap().offered_traffic(), 10.0);
    np.check_caches_consistency().unwrap();
    copy.check_caches_consistency().unwrap();
}

#[test]
fn test_shared_risk_groups() {
    let mut np = get_test_plan();
    let srg = np.add_srg(1000.0, 10.0).unwrap();
    np.add_link_to_srg(srg, *L12).unwrap();
    np.add_link_to_srg(srg, *L23).unwrap();
    np.add_node_to_srg(srg, *N3).unwrap();

    assert_eq!(np.get_link_srgs(*L12), vec![srg]);
    assert_eq!(np.get_node_srgs(*N3), vec![srg]);
    assert!((np.get_srg(srg).unwrap().availability() - 1000.0 / 1010.0).abs() < 1e-12);

    // removing a link removes it from the group
    np.remove_link(*L12).unwrap();
    assert_eq!(np.get_srg(srg).unwrap().links().len(), 1);

    np.set_srg_failure_state(srg, false).unwrap();
    assert_eq!(np.get_links_down(*L0), vec![*L23]);
    assert_eq!(np.get_nodes_down(), vec![*N3]);
    assert_eq!(np.is_link_usable(*L13), Ok(false));

    np.set_srg_failure_state(srg, true).unwrap();
    assert_eq!(np.get_links_down(*L0), vec![]);
    assert_eq!(np.is_link_usable(*L13), Ok(true));

    np.remove_srg(srg).unwrap();
    assert_eq!(np.get_node_srgs(*N3), vec![]);
    assert_eq!(np.get_number_of_srgs(), 0);
    np.check_caches_consistency().unwrap();
}

#[test]
fn test_link_properties() {
    let mut np = get_test_plan();
    let l = np.get_link(*L13).unwrap();
    assert_eq!(l.origin(), *N1);
    assert_eq!(l.destination(), *N3);
    assert!((l.propagation_delay_ms() - 0.15).abs() < 1e-12);

    np.set_link_propagation_speed(*L13, 0.0).unwrap();
    assert_eq!(np.get_link(*L13).unwrap().propagation_delay_ms(), f64::INFINITY);

    np.set_link_capacity(*L13, 42.0).unwrap();
    assert_eq!(np.get_link_capacity(*L13), Ok(42.0));
    assert!(np.set_link_length(*L13, -1.0).is_err());
}

#[test]
fn test_setters_with_cache_checking() {
    let mut np = NetPlan::with_config(NetPlanConfig::default().check_caches(true));
    let layer = np.default_layer();
    let a = np.add_node("a", (0.0, 0.0));
    let b = np.add_node("b", (1.0, 0.0));
    let ab = np.add_link(layer, a, b, 100.0, 10.0, 200000.0).unwrap();
    let d = np.add_demand(layer, a, b, 10.0).unwrap();
    let md = np.add_multicast_demand(layer, a, btreeset! {b}, 5.0).unwrap();
    let res = np.add_resource("fw", "fw1", a, 10.0, "Gbps", 1.0).unwrap();
    let srg = np.add_srg(100.0, 2.0).unwrap();

    np.set_name("plan");
    np.set_plan_attribute("owner", "ops");
    np.set_layer_name(layer, "WDM").unwrap();
    np.set_layer_description(layer, "optical").unwrap();
    np.set_node_name(a, "A").unwrap();
    np.set_node_xy(a, (3.0, 4.0)).unwrap();
    np.set_node_population(a, 7.0).unwrap();
    np.set_node_site_name(a, Some("site".to_string())).unwrap();
    np.set_link_capacity(ab, 50.0).unwrap();
    np.set_link_length(ab, 20.0).unwrap();
    np.set_link_propagation_speed(ab, 100000.0).unwrap();
    np.set_resource_capacity(res, 20.0).unwrap();
    np.set_srg_failure_rates(srg, 200.0, 4.0).unwrap();
    np.set_demand_recovery_type(d, IntendedRecoveryType::ProtectionRevert).unwrap();
    np.set_multicast_demand_offered_traffic(md, 8.0).unwrap();
    assert_eq!(np.set_attribute(ab, "name", "ab"), Ok(None));
    assert_eq!(np.add_tag(ab, "core"), Ok(true));

    assert_eq!(np.get_layer(layer).unwrap().name(), "WDM");
    assert_eq!(np.get_node_by_name("A"), Some(a));
    assert_eq!(np.get_link_capacity(ab), Ok(50.0));
    assert_eq!(np.get_multicast_demand(md).unwrap().offered_traffic(), 8.0);
    np.check_caches_consistency().unwrap();

    // failed setters change nothing
    let before = np.copy();
    assert!(np.set_link_length(ab, -1.0).is_err());
    assert!(np.set_multicast_demand_offered_traffic(md, -1.0).is_err());
    assert!(np.set_node_population(NodeId(99), 1.0).is_err());
    assert_eq!(np, before);
}
