use crate::admission::{SearchStrategy, SlaOrder};
use crate::error::{EmbedError, ScenarioError, SubstrateError};
use crate::service::TopologyMode;
use crate::sla::{SCHEMA_VERSION, ScenarioSpec, SlaId};

#[test]
fn grid_scenario_with_defaults() {
    let raw = r#"
{
    "schema_version": 1,
    "meta": { "name": "small" },
    "substrate": { "kind": "grid", "width": 3, "height": 2 },
    "slas": [
        { "id": 1, "start": [ { "node": "n0_0", "bandwidth": 10 } ], "delay": 100 },
        {
            "id": 2,
            "start": [ { "node": "n2_1", "bandwidth": 5 }, { "node": "n1_1", "bandwidth": 5 } ],
            "cdn": [ "n0_1" ],
            "delay": 80,
            "max_cdn_to_use": 1,
            "lifetime": 3
        }
    ]
}
    "#;
    let spec = ScenarioSpec::parse(raw).expect("parse scenario");
    assert_eq!(spec.schema_version, SCHEMA_VERSION);
    let scenario = spec.into_scenario().expect("build scenario");

    assert_eq!(scenario.substrate.nodes().len(), 6);
    assert_eq!(scenario.admission.order, SlaOrder::Lifo);
    assert_eq!(scenario.admission.strategy, SearchStrategy::Relax);
    assert_eq!(scenario.topology.cache_cpu, 105.0);

    assert_eq!(scenario.slas.len(), 2);
    let second = &scenario.slas[1];
    assert_eq!(second.id(), SlaId(2));
    assert_eq!(second.start().len(), 2);
    assert_eq!(second.cdn(), &[scenario.substrate.node_by_name("n0_1").unwrap()]);
    assert_eq!(second.max_cdn_to_use(), 1);
    assert_eq!(second.lifetime(), Some(3));
    assert_eq!(second.total_bandwidth(), 10.0);
    assert_eq!(scenario.slas[0].max_cdn_to_use(), 0);
}

#[test]
fn explicit_substrate_and_admission_overrides() {
    let raw = r#"
{
    "schema_version": 1,
    "substrate": {
        "kind": "explicit",
        "cpu_cost": 2.0,
        "nodes": [ { "name": "a", "cpu": 200 }, { "name": "b", "cpu": 300 } ],
        "links": [
            { "from": "a", "to": "b", "bandwidth": 100, "delay": 2 },
            { "from": "b", "to": "a", "bandwidth": 7, "bidirectional": false }
        ]
    },
    "admission": { "order": "fifo", "strategy": "exhaustive", "rejected_threshold": 4, "use_hints": true },
    "topology": { "cache_cpu": 50 },
    "slas": []
}
    "#;
    let scenario = ScenarioSpec::parse(raw)
        .and_then(ScenarioSpec::into_scenario)
        .expect("scenario");

    let su = &scenario.substrate;
    assert_eq!(su.links().len(), 3);
    assert_eq!(su.cpu_cost, 2.0);
    assert_eq!(su.net_cost, 1.0);
    assert_eq!(su.hops(su.node_by_name("a").unwrap(), su.node_by_name("b").unwrap()), Some(1));

    assert_eq!(scenario.admission.order, SlaOrder::Fifo);
    assert_eq!(scenario.admission.strategy, SearchStrategy::Exhaustive);
    assert_eq!(scenario.admission.rejected_threshold, 4);
    assert!(scenario.admission.use_hints);
    assert_eq!(scenario.admission.initial_gateways, 1);
    assert_eq!(scenario.topology.cache_cpu, 50.0);
    assert_eq!(scenario.topology.cache_ratio, 0.35);
}

#[test]
fn invalid_scenarios_are_reported() {
    let wrong_version = r#"{ "schema_version": 9, "substrate": { "kind": "grid", "width": 1, "height": 1 } }"#;
    assert!(matches!(
        ScenarioSpec::parse(wrong_version),
        Err(ScenarioError::SchemaVersion(9))
    ));

    assert!(matches!(ScenarioSpec::parse("{"), Err(ScenarioError::Json(_))));

    let unknown_node = r#"
{
    "schema_version": 1,
    "substrate": { "kind": "grid", "width": 2, "height": 2 },
    "slas": [ { "id": 1, "start": [ { "node": "zz", "bandwidth": 1 } ], "delay": 1 } ]
}
    "#;
    let err = ScenarioSpec::parse(unknown_node)
        .and_then(ScenarioSpec::into_scenario)
        .expect_err("unknown node");
    assert!(matches!(err, ScenarioError::Invalid(_)));

    let duplicate = r#"
{
    "schema_version": 1,
    "substrate": { "kind": "grid", "width": 2, "height": 2 },
    "slas": [
        { "id": 1, "start": [ { "node": "n0_0", "bandwidth": 1 } ], "delay": 1 },
        { "id": 1, "start": [ { "node": "n1_0", "bandwidth": 1 } ], "delay": 1 }
    ]
}
    "#;
    assert!(matches!(
        ScenarioSpec::parse(duplicate).and_then(ScenarioSpec::into_scenario),
        Err(ScenarioError::Invalid(_))
    ));

    let no_starts = r#"
{
    "schema_version": 1,
    "substrate": { "kind": "grid", "width": 2, "height": 2 },
    "slas": [ { "id": 5, "start": [], "delay": 1 } ]
}
    "#;
    assert!(matches!(
        ScenarioSpec::parse(no_starts).and_then(ScenarioSpec::into_scenario),
        Err(ScenarioError::Sla(EmbedError::NoStartAnchors { sla: SlaId(5) }))
    ));
}

#[test]
fn empty_grid_and_zero_lifetime_are_rejected() {
    let empty = r#"{ "schema_version": 1, "substrate": { "kind": "grid", "width": 0, "height": 3 } }"#;
    assert!(matches!(
        ScenarioSpec::parse(empty).and_then(ScenarioSpec::into_scenario),
        Err(ScenarioError::Substrate(SubstrateError::EmptyGrid { width: 0, height: 3 }))
    ));

    let zero_lifetime = r#"
{
    "schema_version": 1,
    "substrate": { "kind": "grid", "width": 2, "height": 2 },
    "slas": [ { "id": 4, "start": [ { "node": "n0_0", "bandwidth": 1 } ], "delay": 1, "lifetime": 0 } ]
}
    "#;
    assert!(matches!(
        ScenarioSpec::parse(zero_lifetime).and_then(ScenarioSpec::into_scenario),
        Err(ScenarioError::Sla(EmbedError::ZeroLifetime { sla: SlaId(4) }))
    ));
}

#[test]
fn bandwidth_desc_order_and_full_topology_parse() {
    let raw = r#"
{
    "schema_version": 1,
    "substrate": { "kind": "grid", "width": 1, "height": 1 },
    "admission": { "order": "bandwidth_desc" },
    "topology": { "mode": "full" }
}
    "#;
    let scenario = ScenarioSpec::parse(raw)
        .and_then(ScenarioSpec::into_scenario)
        .expect("scenario");
    assert_eq!(scenario.admission.order, SlaOrder::BandwidthDesc);
    assert_eq!(scenario.topology.mode, TopologyMode::Full);
}
