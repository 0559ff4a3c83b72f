use std::collections::BTreeMap;

use super::support::{grid, sla};
use crate::error::LedgerError;
use crate::heuristic::HopClusterer;
use crate::service::{ServiceTopology, TopologyBuilder, TopologyParams};
use crate::sla::SlaId;
use crate::solver::{Deadline, GreedySolver, Mapping, Solver};
use crate::substrate::{GridTopology, ResourceLedger, Substrate};

fn embed(su: &Substrate, g: &GridTopology) -> (ServiceTopology, Mapping) {
    let s = sla(
        7,
        &[(g.at(0, 0), 100.0), (g.at(3, 3), 200.0)],
        &[],
        1_000.0,
    );
    let clusterer = HopClusterer;
    let cap = TopologyParams::default().gateway_capacity();
    let builder = TopologyBuilder::new(TopologyParams::default(), &clusterer, &cap);
    let topo = builder.build(&s, 2, 1, su, None).expect("build");
    let mapping = GreedySolver
        .solve(&topo, su, Deadline::none())
        .into_mapping()
        .expect("feasible");
    (topo, mapping)
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-6
}

#[test]
fn consume_then_release_restores_capacity() {
    let (mut su, g) = grid(4, 4);
    let before = su.snapshot();
    let (topo, mapping) = embed(&su, &g);

    su.consume(&topo, &mapping).expect("consume");
    let during = su.snapshot();
    assert!(close(during.used_cpu(), topo.total_cpu()));
    assert!(during.used_bandwidth() > 0.0);
    assert_eq!(during.active_services, vec![SlaId(7)]);

    su.release(SlaId(7)).expect("release");
    let after = su.snapshot();
    for (a, b) in after.nodes.iter().zip(&before.nodes) {
        assert!(close(a.used_cpu, b.used_cpu), "node {}", a.name);
    }
    for (a, b) in after.links.iter().zip(&before.links) {
        assert!(close(a.used_bandwidth, b.used_bandwidth));
    }
    assert!(after.active_services.is_empty());
}

#[test]
fn consume_twice_double_books() {
    let (mut su, g) = grid(4, 4);
    let (topo, mapping) = embed(&su, &g);

    su.consume(&topo, &mapping).expect("first consume");
    let once = su.snapshot().used_cpu();
    su.consume(&topo, &mapping).expect("second consume");
    assert!(close(su.snapshot().used_cpu(), 2.0 * once));

    su.release(SlaId(7)).expect("release both");
    assert!(close(su.snapshot().used_cpu(), 0.0));
    assert!(close(su.snapshot().used_bandwidth(), 0.0));
}

#[test]
fn release_of_unknown_service_fails() {
    let (mut su, _) = grid(2, 2);
    assert!(matches!(
        su.release(SlaId(42)),
        Err(LedgerError::UnknownService(SlaId(42)))
    ));
}

#[test]
fn incomplete_mapping_is_rejected_without_side_effects() {
    let (mut su, g) = grid(4, 4);
    let (topo, _) = embed(&su, &g);
    let empty = Mapping::new(BTreeMap::new(), Vec::new(), 0.0);

    assert!(matches!(
        su.consume(&topo, &empty),
        Err(LedgerError::UnmappedNode(_))
    ));
    assert_eq!(su.snapshot().used_cpu(), 0.0);
    assert!(su.active_services().is_empty());
}
