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

//! Apply random sequences of operations and check that the derived caches never diverge from the
//! canonical state, and that failed operations leave the plan unchanged.

use crate::example_networks::*;
use crate::model::*;
use maplit::btreemap;
use rand::prelude::*;

/// Apply one random operation. Many operations are expected to fail.
fn random_step(np: &mut NetPlan, rng: &mut StdRng) -> Result<(), NetPlanError> {
    let layers = np.get_layer_ids();
    let layer = *layers.choose(rng).unwrap();
    let other_layer = layers.iter().copied().filter(|l| *l != layer).choose(rng);
    let nodes = np.get_node_ids();
    let links = np.get_link_ids(layer)?;
    let demands = np.get_demand_ids(layer)?;
    let routes = np.get_route_ids(layer)?;
    let srgs: Vec<SrgId> = np.get_srgs().map(|s| s.id()).collect();

    let node = nodes.choose(rng).copied();
    let other_node = nodes.choose(rng).copied();
    let link = links.choose(rng).copied();
    let demand = demands.choose(rng).copied();
    let other_demand = demands.choose(rng).copied();
    let route = routes.choose(rng).copied();
    let other_route = routes.choose(rng).copied();

    match rng.gen_range(0, 20) {
        0 => {
            np.add_node("new", (rng.gen(), rng.gen()));
            Ok(())
        }
        1 => match node {
            Some(n) => np.remove_node(n),
            None => Ok(()),
        },
        2 => match (node, other_node) {
            (Some(a), Some(b)) => {
                let capacity = rng.gen_range(-10.0, 100.0);
                np.add_link(layer, a, b, capacity, 1.0, 1.0).map(|_| ())
            }
            _ => Ok(()),
        },
        3 => match link {
            Some(l) => np.remove_link(l),
            None => Ok(()),
        },
        4 => match (node, other_node) {
            (Some(a), Some(b)) => np.add_demand(layer, a, b, rng.gen_range(-1.0, 20.0)).map(|_| ()),
            _ => Ok(()),
        },
        5 => match demand {
            Some(d) => np.remove_demand(d),
            None => Ok(()),
        },
        6 => match (demand, link) {
            (Some(d), Some(l)) => {
                let (ingress, egress) = {
                    let x = np.get_demand(d)?;
                    (x.ingress(), x.egress())
                };
                let path = np.get_node_pair_links(ingress, egress, layer);
                let path = path.first().copied().unwrap_or(l);
                let (carried, occupied) = (rng.gen_range(0.0, 10.0), rng.gen_range(0.0, 10.0));
                np.add_route(d, carried, occupied, vec![path]).map(|_| ())
            }
            _ => Ok(()),
        },
        7 => match link {
            Some(l) => np.set_link_failure_state(l, rng.gen_bool(0.5)),
            None => Ok(()),
        },
        8 => match node {
            Some(n) => np.set_node_failure_state(n, rng.gen_bool(0.5)),
            None => Ok(()),
        },
        9 => match srgs.choose(rng) {
            Some(s) => np.set_srg_failure_state(*s, rng.gen_bool(0.5)),
            None => Ok(()),
        },
        10 => match (demand, other_layer) {
            (Some(d), Some(upper)) => np.couple_demand_to_new_link(d, upper).map(|_| ()),
            _ => Ok(()),
        },
        11 => match link {
            Some(l) => np.decouple_link(l),
            None => Ok(()),
        },
        12 => match demand {
            Some(d) => np.set_demand_offered_traffic(d, rng.gen_range(-5.0, 20.0)),
            None => Ok(()),
        },
        13 => match route {
            Some(r) => np.remove_route(r),
            None => Ok(()),
        },
        14 => match (route, other_route) {
            (Some(p), Some(b)) => np.add_backup_route(p, b),
            _ => Ok(()),
        },
        15 => match (demand, other_demand) {
            (Some(s), Some(r)) => np.attach_to_aggregated_demands(
                s,
                btreemap! {r => rng.gen_range(0.0, 1.0)},
            ),
            _ => Ok(()),
        },
        16 => match route {
            Some(r) => np.set_route_carried_traffic(
                r,
                rng.gen_range(-1.0, 10.0),
                rng.gen_range(0.0, 10.0),
            ),
            None => Ok(()),
        },
        17 => {
            let target = match np.get_layer(layer)?.routing_type() {
                RoutingType::SourceRouting => RoutingType::HopByHopRouting,
                RoutingType::HopByHopRouting => RoutingType::SourceRouting,
            };
            np.convert_routing_type(layer, target)
        }
        18 => match (demand, link) {
            (Some(d), Some(l)) => np.set_forwarding_rule(d, l, rng.gen_range(0.0, 1.0)),
            _ => Ok(()),
        },
        _ => {
            if rng.gen_bool(0.1) {
                np.remove_network_layer(layer)
            } else {
                Ok(())
            }
        }
    }
}

#[test]
fn test_random_operations_keep_caches_consistent() {
    for seed in 0..8 {
        let mut np = RandomNet::net(seed);
        np.set_config(NetPlanConfig::default().check_caches(true));
        let mut rng = StdRng::seed_from_u64(1000 + seed as u64);
        let mut failed = 0;
        for _ in 0..300 {
            let before = np.copy();
            if random_step(&mut np, &mut rng).is_err() {
                failed += 1;
                assert_eq!(np, before);
            }
            np.check_caches_consistency().unwrap();
        }
        assert!(failed > 0);
    }
}

#[test]
fn test_random_operations_survive_persistence() {
    let mut np = RandomNet::net(42);
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..100 {
        let _ = random_step(&mut np, &mut rng);
    }
    let loaded =
        NetPlan::from_json_str(&np.to_json_string().unwrap(), NetPlanConfig::default()).unwrap();
    assert_eq!(loaded, np);
}

#[test]
fn test_copy_is_deep() {
    let np = RandomNet::net(7);
    let mut copy = np.copy();
    let mut rng = StdRng::seed_from_u64(7);
    let mut changed = false;
    for _ in 0..50 {
        changed |= random_step(&mut copy, &mut rng).is_ok();
    }
    assert!(changed);
    assert_eq!(np, RandomNet::net(7));
    np.check_caches_consistency().unwrap();
    copy.check_caches_consistency().unwrap();
}
