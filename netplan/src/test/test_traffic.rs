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

//! Test the traffic, occupation and failure queries on multilayer plans.

use crate::example_networks::*;
use crate::model::*;
use assert_approx_eq::assert_approx_eq;
use maplit::btreemap;

#[test]
fn test_two_layer_traffic() {
    let np = TwoLayerNet::net(0);
    let lower = np.get_layer_by_name("lowerLayer").unwrap();
    let upper = np.get_layer_by_name("upperLayer").unwrap();
    let link = |name| TwoLayerNet::link(&np, name);
    let demand = |name| TwoLayerNet::demand(&np, name);

    assert_approx_eq!(np.get_demand_carried_traffic(demand("d12")).unwrap(), 1.0);
    assert_approx_eq!(np.get_demand_carried_traffic(demand("d13")).unwrap(), 2.0);
    assert_approx_eq!(np.get_demand_blocked_traffic(demand("d13")).unwrap(), 1.0);
    assert_approx_eq!(np.get_demand_carried_traffic(demand("scd123")).unwrap(), 100.0);
    assert_approx_eq!(np.get_demand_blocked_traffic(demand("scd123")).unwrap(), 0.0);

    assert_approx_eq!(np.get_link_carried_traffic(link("link12")).unwrap(), 123.0);
    assert_approx_eq!(np.get_link_occupied_capacity(link("link12")).unwrap(), 334.5);
    assert_approx_eq!(np.get_link_carried_traffic(link("link23")).unwrap(), 112.0);
    assert_approx_eq!(np.get_link_occupied_capacity(link("link23")).unwrap(), 320.0);
    assert_eq!(np.get_link_carried_traffic_split(link("link13")), Ok((10.0, 0.0)));
    assert_approx_eq!(np.get_link_occupied_capacity(link("link13")).unwrap(), 65.0);
    assert_approx_eq!(np.get_link_utilization(link("link13")).unwrap(), 0.65);
    assert_eq!(np.get_links_oversubscribed(lower), Ok(vec![link("link12"), link("link23")]));

    let res2 = np.get_resources_of_type("type")[0];
    let sc123 = TwoLayerNet::route(&np, "sc123");
    assert_eq!(np.get_resource_occupation(res2), Ok(btreemap! {sc123 => 50.0}));
    assert_approx_eq!(np.get_resource_occupied_capacity(res2).unwrap(), 50.0);
    assert_approx_eq!(np.get_route_propagation_delay_ms(sc123).unwrap(), 200010.0);

    // multicast traffic
    let d123 = TwoLayerNet::multicast_demand(&np, "d123");
    let n2 = np.get_node_by_name("node2").unwrap();
    let n3 = np.get_node_by_name("node3").unwrap();
    assert_approx_eq!(np.get_multicast_demand_carried_traffic(d123).unwrap(), 20.0);
    assert_approx_eq!(np.get_multicast_demand_blocked_traffic(d123).unwrap(), 80.0);
    assert_approx_eq!(np.get_multicast_demand_carried_traffic_to_egress(d123, n3).unwrap(), 20.0);
    assert_eq!(
        np.get_multicast_tree_path_to_egress(TwoLayerNet::tree(&np, "t123"), n3),
        Ok(vec![link("link12"), link("link23")])
    );
    assert_eq!(
        np.get_multicast_tree_path_to_egress(
            TwoLayerNet::tree(&np, "t123"),
            np.get_node_by_name("node1").unwrap(),
        ),
        Err(NetPlanError::InvalidMulticastTree("the node is not an egress node"))
    );

    // coupled capacities
    assert_approx_eq!(np.get_link_capacity(link("upperLink12")).unwrap(), 1.0);
    assert_approx_eq!(np.get_link_capacity(link("upperMdLink12")).unwrap(), 20.0);
    assert_approx_eq!(np.get_link_capacity(link("upperMdLink13")).unwrap(), 20.0);
    assert_approx_eq!(np.get_link_occupied_capacity(link("upperMdLink13")).unwrap(), 15.0);
    assert_eq!(np.get_links_oversubscribed(upper), Ok(vec![]));
    assert_eq!(
        np.get_multicast_demand_coupled_links(d123),
        btreemap! {n2 => link("upperMdLink12"), n3 => link("upperMdLink13")}
    );

    let (offered, carried, blocked) = np.get_layer_traffic_summary(lower).unwrap();
    assert_approx_eq!(offered, 9.0);
    assert_approx_eq!(carried, 103.0);
    assert_approx_eq!(blocked, 3.0);
}

#[test]
fn test_two_layer_failure() {
    let mut np = TwoLayerNet::net(1);
    let lower = np.get_layer_by_name("lowerLayer").unwrap();
    let link = |np: &NetPlan, name| TwoLayerNet::link(np, name);
    let route = |np: &NetPlan, name| TwoLayerNet::route(np, name);
    let srg = np.get_srgs().next().unwrap().id();
    assert_eq!(np.get_link_srgs(link(&np, "link23")), vec![srg]);

    np.set_srg_failure_state(srg, false).unwrap();
    assert_eq!(np.get_links_down(lower), vec![link(&np, "link23")]);
    assert_eq!(np.is_link_usable(link(&np, "link23")), Ok(false));
    assert_eq!(
        np.get_routes_down(lower),
        Ok(vec![route(&np, "r123a"), route(&np, "r123b"), route(&np, "sc123")])
    );
    assert_eq!(np.get_multicast_trees_down(lower), Ok(vec![TwoLayerNet::tree(&np, "t123")]));
    assert_eq!(
        np.get_demands_with_down_forwarding_path(lower),
        Ok(vec![TwoLayerNet::demand(&np, "d13"), TwoLayerNet::demand(&np, "scd123")])
    );

    let d13 = TwoLayerNet::demand(&np, "d13");
    assert_approx_eq!(np.get_demand_carried_traffic(d13).unwrap(), 0.0);
    assert_approx_eq!(np.get_demand_blocked_traffic(d13).unwrap(), 3.0);
    let res2 = np.get_resources_of_type("type")[0];
    assert_approx_eq!(np.get_resource_occupied_capacity(res2).unwrap(), 0.0);
    assert_approx_eq!(np.get_link_carried_traffic(link(&np, "link12")).unwrap(), 11.0);

    // tStar still reaches node 3, and both trees still reach node 2
    let d123 = TwoLayerNet::multicast_demand(&np, "d123");
    assert_approx_eq!(np.get_multicast_demand_carried_traffic(d123).unwrap(), 10.0);
    assert_approx_eq!(np.get_link_capacity(link(&np, "upperMdLink13")).unwrap(), 10.0);
    assert_approx_eq!(np.get_link_capacity(link(&np, "upperMdLink12")).unwrap(), 20.0);

    // upper layer links never go down on their own
    let upper = np.get_layer_by_name("upperLayer").unwrap();
    assert_eq!(np.get_links_down(upper), vec![]);

    np.set_srg_failure_state(srg, true).unwrap();
    assert_eq!(np.get_routes_down(lower), Ok(vec![]));
    assert_eq!(np, {
        let mut x = TwoLayerNet::net(1);
        x.set_srg_failure_state(srg, true).unwrap();
        x
    });
    np.check_caches_consistency().unwrap();
}

#[test]
fn test_protected_lightpath() {
    let np = ProtectedNet::net(0);
    let wdm = np.get_layer_by_name("WDM").unwrap();
    let ip = np.get_layer_by_name("IP").unwrap();
    let lightpath = np.get_demand_ids(wdm).unwrap()[0];
    let ip_link = np.get_demand_coupled_link(lightpath).unwrap();
    let primary = np.get_demand_routes(lightpath)[0];

    assert_eq!(np.get_link(ip_link).unwrap().layer(), ip);
    assert_eq!(np.get_link_coupling(ip_link), Ok(Some(LinkCoupling::Demand(lightpath))));
    assert_approx_eq!(np.get_link_capacity(ip_link).unwrap(), 40.0);
    assert_approx_eq!(np.get_link_utilization(ip_link).unwrap(), 0.75);
    assert_approx_eq!(np.get_route_length_km(primary).unwrap(), 200.0);
    assert_approx_eq!(np.get_route_propagation_delay_ms(primary).unwrap(), 1.0);
    assert_eq!(
        np.get_demand(lightpath).unwrap().recovery_type(),
        IntendedRecoveryType::ProtectionNoRevert
    );

    let srg_ab = np.get_srgs().next().unwrap();
    assert_approx_eq!(srg_ab.availability(), 2000.0 / 2024.0);
}

#[test]
fn test_protected_lightpath_failure() {
    let np = ProtectedNet::net(1);
    let wdm = np.get_layer_by_name("WDM").unwrap();
    let ip = np.get_layer_by_name("IP").unwrap();
    let lightpath = np.get_demand_ids(wdm).unwrap()[0];
    let ip_link = np.get_demand_coupled_link(lightpath).unwrap();
    let primary = np.get_demand_routes(lightpath)[0];

    assert_eq!(np.get_routes_down(wdm), Ok(vec![primary]));
    assert_approx_eq!(np.get_demand_carried_traffic(lightpath).unwrap(), 0.0);
    assert_approx_eq!(np.get_link_capacity(ip_link).unwrap(), 0.0);
    assert!(np.get_link(ip_link).unwrap().is_up());
    assert_eq!(np.get_links_oversubscribed(ip), Ok(vec![ip_link]));
    assert!(np.get_link_utilization(ip_link).unwrap().is_infinite());

    // the ip route itself is not down
    let ip_demand = np.get_demand_ids(ip).unwrap()[0];
    assert_approx_eq!(np.get_demand_carried_traffic(ip_demand).unwrap(), 30.0);
}
