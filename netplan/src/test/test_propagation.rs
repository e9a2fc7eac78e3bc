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

//! Test the propagation of traffic across layers.

use crate::example_networks::*;
use crate::model::*;
use maplit::btreeset;

/// Returns the links ab, bd, ac, cd and the ip link of the protected network
fn protected_links(np: &NetPlan) -> (LinkId, LinkId, LinkId, LinkId, LinkId) {
    let wdm = np.get_layer_by_name("WDM").unwrap();
    let l = np.get_link_ids(wdm).unwrap();
    let lightpath = np.get_demand_ids(wdm).unwrap()[0];
    (l[0], l[1], l[2], l[3], np.get_demand_coupled_link(lightpath).unwrap())
}

#[test]
fn test_downward_with_backup() {
    let np = ProtectedNet::net(0);
    let (ab, bd, ac, cd, ip_link) = protected_links(&np);

    let c = np
        .get_links_potentially_carrying_traffic_traversing_this_link(
            ip_link,
            true,
            PropagationDirection::Downward,
        )
        .unwrap();
    assert_eq!(c.primary, btreeset! {ip_link, ab, bd});
    assert_eq!(c.backup, btreeset! {ac, cd});
    assert_eq!(c.all, btreeset! {ip_link, ab, bd, ac, cd});
    assert!(c.primary.is_disjoint(&c.backup));

    let a = np.get_node_by_name("A").unwrap();
    let d = np.get_node_by_name("D").unwrap();
    let wdm = np.get_layer_by_name("WDM").unwrap();
    let ip = np.get_layer_by_name("IP").unwrap();
    assert_eq!(
        c.vertical_transitions,
        btreeset! {
            VerticalTransition { node: a, from_layer: ip, to_layer: wdm, link: ip_link },
            VerticalTransition { node: d, from_layer: wdm, to_layer: ip, link: ip_link },
        }
    );

    let c = np
        .get_links_potentially_carrying_traffic_traversing_this_link(
            ip_link,
            false,
            PropagationDirection::Downward,
        )
        .unwrap();
    assert_eq!(c.all, btreeset! {ip_link, ab, bd});
    assert_eq!(c.backup, btreeset! {});
}

#[test]
fn test_upward() {
    let np = ProtectedNet::net(0);
    let (ab, _, ac, _, ip_link) = protected_links(&np);

    let c = np
        .get_links_potentially_carrying_traffic_traversing_this_link(
            ab,
            false,
            PropagationDirection::Upward,
        )
        .unwrap();
    assert_eq!(c.all, btreeset! {ab, ip_link});
    assert_eq!(c.vertical_transitions.len(), 2);

    // the lightpath only uses ac as backup
    let c = np
        .get_links_potentially_carrying_traffic_traversing_this_link(
            ac,
            false,
            PropagationDirection::Upward,
        )
        .unwrap();
    assert_eq!(c.all, btreeset! {ac});
    assert_eq!(c.crossed_demands, btreeset! {});

    let c = np
        .get_links_potentially_carrying_traffic_traversing_this_link(
            ac,
            true,
            PropagationDirection::Upward,
        )
        .unwrap();
    assert_eq!(c.primary, btreeset! {ac});
    assert_eq!(c.backup, btreeset! {ip_link});
}

#[test]
fn test_upward_multicast() {
    let np = TwoLayerNet::net(0);
    let link = |name| TwoLayerNet::link(&np, name);
    let demand = |name| TwoLayerNet::demand(&np, name);
    let d123 = TwoLayerNet::multicast_demand(&np, "d123");
    let n2 = np.get_node_by_name("node2").unwrap();
    let n3 = np.get_node_by_name("node3").unwrap();

    assert_eq!(
        np.get_multicast_demands_potentially_traversing_link(link("link23")),
        Ok(btreeset! {(d123, n3)})
    );
    assert_eq!(
        np.get_demands_potentially_traversing_link(link("link12")),
        Ok(btreeset! {demand("d13"), demand("d12"), demand("scd123")})
    );

    let c = np
        .get_links_potentially_carrying_traffic_traversing_this_link(
            link("link12"),
            false,
            PropagationDirection::Upward,
        )
        .unwrap();
    assert_eq!(
        c.all,
        btreeset! {
            link("link12"),
            link("upperLink12"),
            link("upperMdLink12"),
            link("upperMdLink13"),
        }
    );
    assert_eq!(c.crossed_demands, btreeset! {demand("d13"), demand("d12"), demand("scd123")});
    // the upper multicast demand is routed over both coupled links
    let upper_md = TwoLayerNet::multicast_demand(&np, "upperMd123");
    assert_eq!(
        c.crossed_multicast_demands,
        btreeset! {(d123, n2), (d123, n3), (upper_md, n2), (upper_md, n3)}
    );

    let c = np
        .get_links_potentially_carrying_traffic_traversing_this_link(
            link("link23"),
            false,
            PropagationDirection::Upward,
        )
        .unwrap();
    assert_eq!(c.all, btreeset! {link("link23"), link("upperMdLink13")});
    assert!(!c.all.contains(&link("upperLink12")));

    // segm13 is a backup route, but tStar reaches node 3 over link13
    let c = np
        .get_links_potentially_carrying_traffic_traversing_this_link(
            link("link13"),
            false,
            PropagationDirection::Upward,
        )
        .unwrap();
    assert_eq!(c.all, btreeset! {link("link13"), link("upperMdLink13")});
    assert!(!c.crossed_demands.contains(&demand("d13")));
    let c = np
        .get_links_potentially_carrying_traffic_traversing_this_link(
            link("link13"),
            true,
            PropagationDirection::Upward,
        )
        .unwrap();
    assert!(c.crossed_demands.contains(&demand("d13")));
}

#[test]
fn test_downward_multicast() {
    let np = TwoLayerNet::net(0);
    let link = |name| TwoLayerNet::link(&np, name);
    let d123 = TwoLayerNet::multicast_demand(&np, "d123");
    let n2 = np.get_node_by_name("node2").unwrap();

    let c = np
        .get_links_potentially_carrying_traffic_traversing_this_link(
            link("upperMdLink13"),
            false,
            PropagationDirection::Downward,
        )
        .unwrap();
    assert_eq!(
        c.all,
        btreeset! {link("upperMdLink13"), link("link12"), link("link23"), link("link13")}
    );

    let c = np
        .get_propagation_closure(
            &[PropagationSeed::MulticastDemandEgress(d123, n2)],
            PropagationDirection::Downward,
            false,
        )
        .unwrap();
    assert_eq!(c.all, btreeset! {link("link12")});
    // going up from link12 also reaches the upper links of all other demands crossing link12
    let c = np
        .get_propagation_closure(
            &[PropagationSeed::MulticastDemandEgress(d123, n2)],
            PropagationDirection::Upward,
            false,
        )
        .unwrap();
    assert_eq!(
        c.all,
        btreeset! {
            link("link12"),
            link("upperLink12"),
            link("upperMdLink12"),
            link("upperMdLink13"),
        }
    );
    assert_eq!(
        c.crossed_demands,
        btreeset! {
            TwoLayerNet::demand(&np, "d12"),
            TwoLayerNet::demand(&np, "d13"),
            TwoLayerNet::demand(&np, "scd123"),
        }
    );
    assert_eq!(
        np.get_links_this_layer_potentially_carrying_multicast_traffic(d123, None),
        Ok(btreeset! {link("link12"), link("link23"), link("link13")})
    );
}

#[test]
fn test_demand_and_node_seeds() {
    let np = ProtectedNet::net(0);
    let (ab, bd, ac, cd, ip_link) = protected_links(&np);
    let wdm = np.get_layer_by_name("WDM").unwrap();
    let lightpath = np.get_demand_ids(wdm).unwrap()[0];

    let c = np
        .get_propagation_closure(
            &[PropagationSeed::Demand(lightpath)],
            PropagationDirection::Downward,
            false,
        )
        .unwrap();
    assert_eq!(c.all, btreeset! {ab, bd});
    let c = np
        .get_propagation_closure(
            &[PropagationSeed::Demand(lightpath)],
            PropagationDirection::Upward,
            true,
        )
        .unwrap();
    assert_eq!(c.all, btreeset! {ab, bd, ac, cd, ip_link});
    assert_eq!(
        np.get_links_this_layer_potentially_carrying_traffic_split(lightpath),
        Ok((btreeset! {ab, bd}, btreeset! {ac, cd}))
    );

    let b = np.get_node_by_name("B").unwrap();
    let c = np
        .get_propagation_closure(&[PropagationSeed::Node(b)], PropagationDirection::Downward, true)
        .unwrap();
    assert_eq!(c.all, btreeset! {ab, bd});

    assert_eq!(
        np.get_propagation_closure(
            &[PropagationSeed::Link(LinkId(99))],
            PropagationDirection::Both,
            true,
        ),
        Err(NetPlanError::ElementNotFound(LinkId(99).into()))
    );
}

#[test]
fn test_affected_links() {
    let np = ProtectedNet::net(0);
    let (ab, bd, ac, cd, ip_link) = protected_links(&np);
    let srgs: Vec<SrgId> = np.get_srgs().map(|s| s.id()).collect();

    assert_eq!(np.get_affected_links_all_layers(srgs[0]), Ok(btreeset! {ab, bd, ac, cd, ip_link}));
    assert_eq!(np.get_affected_links_all_layers(srgs[1]), Ok(btreeset! {ab, bd, ac, cd, ip_link}));

    // failures do not change the result
    let failed = ProtectedNet::net(1);
    assert_eq!(
        failed.get_affected_links_all_layers(srgs[0]),
        np.get_affected_links_all_layers(srgs[0])
    );
}

#[test]
fn test_closure_is_idempotent() {
    for np in vec![TwoLayerNet::net(0), ProtectedNet::net(0), RandomNet::net(3)] {
        let links: Vec<LinkId> = np
            .get_layer_ids()
            .into_iter()
            .flat_map(|layer| np.get_link_ids(layer).unwrap())
            .collect();
        for l in links {
            let seed = PropagationSeed::Link(l);
            let c = np.get_propagation_closure(&[seed], PropagationDirection::Both, true).unwrap();
            assert!(c.all.contains(&l));
            let seeds: Vec<PropagationSeed> =
                c.all.iter().map(|x| PropagationSeed::Link(*x)).collect();
            let again =
                np.get_propagation_closure(&seeds, PropagationDirection::Both, true).unwrap();
            assert_eq!(again.all, c.all);
        }
    }
}

#[test]
fn test_print_closure() {
    let np = ProtectedNet::net(0);
    let (_, _, _, _, ip_link) = protected_links(&np);
    let c = np
        .get_links_potentially_carrying_traffic_traversing_this_link(
            ip_link,
            true,
            PropagationDirection::Downward,
        )
        .unwrap();
    let lines = printer::closure(&np, &c).unwrap();
    assert_eq!(lines[0], "WDM:");
    assert!(lines.contains(&"  A -> B [40.000/100.000]".to_string()));
    assert!(lines.contains(&"b A -> C [40.000/100.000]".to_string()));
    assert!(lines.contains(&"IP:".to_string()));
    assert!(lines.contains(&"at A: IP -> WDM".to_string()));
    assert!(lines.contains(&"at D: WDM -> IP".to_string()));
}
