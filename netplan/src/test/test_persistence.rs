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

//! Test storing and loading plans.

use crate::example_networks::*;
use crate::model::*;
use crate::Error;

#[test]
fn test_round_trip_examples() {
    for name in &["triangle", "two-layer", "protected", "aggregation", "random"] {
        for variant in 0..2 {
            let np = by_name(name, variant).unwrap();
            let s = np.to_json_string().unwrap();
            let loaded = NetPlan::from_json_str(&s, NetPlanConfig::default()).unwrap();
            assert_eq!(loaded, np, "{} variant {} differs after loading", name, variant);
            loaded.check_caches_consistency().unwrap();
        }
    }
}

#[test]
fn test_loaded_plan_behaves_the_same() {
    let np = TwoLayerNet::net(1);
    let json = np.to_json_string().unwrap();
    let mut loaded = NetPlan::from_json_str(&json, NetPlanConfig::default()).unwrap();

    // identifiers, indices and derived values are preserved
    let link23 = TwoLayerNet::link(&loaded, "link23");
    assert_eq!(link23, TwoLayerNet::link(&np, "link23"));
    assert_eq!(loaded.get_link(link23).unwrap().index(), 1);
    let upper = loaded.get_layer_by_name("upperLayer").unwrap();
    let md13 = TwoLayerNet::link(&loaded, "upperMdLink13");
    assert_eq!(loaded.get_link_capacity(md13), np.get_link_capacity(md13));
    assert_eq!(loaded.get_tagged_elements("t1"), np.get_tagged_elements("t1"));
    assert_eq!(loaded.get_layers_top_down(), Ok(vec![upper, loaded.default_layer()]));

    // new elements continue with the next identifier
    let n = loaded.add_node("node4", (0.0, 0.0));
    let mut np = np;
    assert_eq!(np.add_node("node4", (0.0, 0.0)), n);

    let srg = loaded.get_srgs().next().unwrap().id();
    loaded.set_srg_failure_state(srg, false).unwrap();
    let json = loaded.to_json_string().unwrap();
    let reloaded = NetPlan::from_json_str(&json, NetPlanConfig::default()).unwrap();
    assert_eq!(reloaded.get_links_down(reloaded.default_layer()), vec![link23]);
    assert_eq!(reloaded.get_link_capacity(md13), Ok(10.0));
}

#[test]
fn test_hop_by_hop_round_trip() {
    let np = AggregationNet::net(1);
    let json = np.to_json_string().unwrap();
    let loaded = NetPlan::from_json_str(&json, NetPlanConfig::default()).unwrap();
    let layer = loaded.default_layer();
    assert_eq!(loaded.get_forwarding_rules_matrix(layer), np.get_forwarding_rules_matrix(layer));
    for d in loaded.get_demand_ids(layer).unwrap() {
        assert_eq!(loaded.get_demand_carried_traffic(d), np.get_demand_carried_traffic(d));
        assert_eq!(loaded.get_demand_aggregated_from(d), np.get_demand_aggregated_from(d));
    }
}

#[test]
fn test_file_round_trip() {
    let np = ProtectedNet::net(1);
    let path = std::env::temp_dir().join(format!("netplan-test-{}.json", std::process::id()));
    np.save_to_file(&path).unwrap();
    let config = NetPlanConfig::default().check_caches(true);
    let loaded = NetPlan::load_from_file(&path, config).unwrap();
    std::fs::remove_file(&path).unwrap();
    assert_eq!(loaded, np);
    assert!(loaded.config().check_caches_after_mutation);

    match NetPlan::load_from_file(&path, NetPlanConfig::default()) {
        Err(Error::Io(_)) => {}
        r => panic!("Unexpected result: {:?}", r.map(|_| ())),
    }
}

#[test]
fn test_invalid_input() {
    match NetPlan::from_json_str("{\"name\": ", NetPlanConfig::default()) {
        Err(Error::Serialization(_)) => {}
        r => panic!("Unexpected result: {:?}", r.map(|_| ())),
    }

    // identifiers must stay below the counter
    let np = TriangleNet::net(2);
    let mut value: serde_json::Value = serde_json::from_str(&np.to_json_string().unwrap()).unwrap();
    value["next_id"] = serde_json::json!(3);
    match NetPlan::from_json_str(&value.to_string(), NetPlanConfig::default()) {
        Err(Error::NetPlanError(NetPlanError::InternalInconsistency(_))) => {}
        r => panic!("Unexpected result: {:?}", r.map(|_| ())),
    }

    // the default layer must exist
    let mut value: serde_json::Value = serde_json::from_str(&np.to_json_string().unwrap()).unwrap();
    value["default_layer"] = serde_json::json!(1);
    match NetPlan::from_json_str(&value.to_string(), NetPlanConfig::default()) {
        Err(Error::NetPlanError(NetPlanError::InternalInconsistency(_))) => {}
        r => panic!("Unexpected result: {:?}", r.map(|_| ())),
    }
}
