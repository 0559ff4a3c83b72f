use super::support::{ScriptedSolver, grid, sla};
use crate::admission::{
    AdmissionConfig, AdmissionDriver, AdmissionReport, Decision, EmbeddingSearch, SlaOrder,
};
use crate::heuristic::HopClusterer;
use crate::service::{HintOutcome, TopologyBuilder, TopologyParams, VNodeId};
use crate::sla::{Sla, SlaId};
use crate::solver::{GreedySolver, Solver};
use crate::substrate::{Substrate, SubstrateNodeId};

fn run(
    solver: &dyn Solver,
    config: AdmissionConfig,
    slas: Vec<Sla>,
    substrate: &mut Substrate,
) -> AdmissionReport {
    let clusterer = HopClusterer;
    let cap = TopologyParams::default().gateway_capacity();
    let builder = TopologyBuilder::new(TopologyParams::default(), &clusterer, &cap);
    let search = EmbeddingSearch::new(builder, solver, &config);
    AdmissionDriver::new(config, search)
        .run(slas, substrate)
        .expect("run admission")
}

/// 只有一个节点的底层网络：CPU 只够放下一个 cache
fn single_node() -> Substrate {
    let mut su = Substrate::new(1.0, 1.0);
    su.add_node("solo", 150.0);
    su.rebuild_routes();
    su
}

fn solo_sla(id: u64) -> Sla {
    sla(id, &[(SubstrateNodeId(0), 10.0)], &[], 50.0)
}

fn order_of(report: &AdmissionReport) -> Vec<u64> {
    report
        .timeline
        .iter()
        .filter_map(|item| item.sla.map(|s| s.0))
        .collect()
}

#[test]
fn stops_after_rejected_threshold() {
    let (mut su, g) = grid(3, 3);
    let slas = (1..=5)
        .map(|id| sla(id, &[(g.at(0, 0), 1.0), (g.at(2, 2), 1.0)], &[], 1_000.0))
        .collect();
    let config = AdmissionConfig {
        rejected_threshold: 3,
        ..AdmissionConfig::default()
    };
    let solver = ScriptedSolver::rejecting();

    let report = run(&solver, config, slas, &mut su);
    assert_eq!(report.rejected, 3);
    assert_eq!(report.accepted, 0);
    assert_eq!(report.timeline.len(), 4);
    assert_eq!(report.trace(), "XXX");
    assert_eq!(report.acceptance_rate(), 0.0);
    assert!(su.active_services().is_empty());
}

#[test]
fn timeline_opens_with_initial_item() {
    let mut su = single_node();
    let solver = ScriptedSolver::rejecting();
    let report = run(&solver, AdmissionConfig::default(), Vec::new(), &mut su);

    assert_eq!(report.timeline.len(), 1);
    let first = &report.timeline[0];
    assert_eq!(first.decision, Decision::Initial);
    assert_eq!(first.step, 0);
    assert!(first.sla.is_none());
    assert_eq!(report.trace(), "");
}

#[test]
fn lifo_by_default_fifo_on_request() {
    let slas = || (1..=3).map(solo_sla).collect::<Vec<_>>();
    let solver = ScriptedSolver::rejecting();

    let mut su = single_node();
    let lifo = run(&solver, AdmissionConfig::default(), slas(), &mut su);
    assert_eq!(order_of(&lifo), vec![3, 2, 1]);

    let mut su = single_node();
    let config = AdmissionConfig {
        order: SlaOrder::Fifo,
        ..AdmissionConfig::default()
    };
    let fifo = run(&solver, config, slas(), &mut su);
    assert_eq!(order_of(&fifo), vec![1, 2, 3]);
}

#[test]
fn iteration_threshold_limits_processed_slas() {
    let mut su = single_node();
    let solver = ScriptedSolver::rejecting();
    let config = AdmissionConfig {
        iteration_threshold: 2,
        ..AdmissionConfig::default()
    };
    let report = run(&solver, config, (1..=5).map(solo_sla).collect(), &mut su);
    assert_eq!(report.timeline.len(), 3);
}

#[test]
fn acceptance_consumes_capacity_and_records_running_rate() {
    let mut su = single_node();
    let config = AdmissionConfig {
        order: SlaOrder::Fifo,
        ..AdmissionConfig::default()
    };
    let report = run(&GreedySolver, config, vec![solo_sla(1), solo_sla(2)], &mut su);

    assert_eq!(report.trace(), "OX");
    let rates: Vec<f64> = report.timeline.iter().map(|i| i.acceptance_rate).collect();
    assert_eq!(rates, vec![0.0, 1.0, 0.5]);

    let accepted = &report.timeline[1];
    assert_eq!(accepted.decision, Decision::Accepted);
    assert!(accepted.mapping.is_some());
    assert!(accepted.substrate.used_cpu() >= 105.0);
    assert_eq!(accepted.substrate.active_services, vec![SlaId(1)]);

    let rejected = &report.timeline[2];
    assert_eq!(rejected.decision, Decision::Rejected);
    assert!(rejected.mapping.is_none());
    assert!(rejected.service.is_some());
    assert_eq!(rejected.substrate.used_cpu(), accepted.substrate.used_cpu());

    assert_eq!(su.active_services(), vec![SlaId(1)]);
}

#[test]
fn expired_services_are_released_before_the_next_sla() {
    let mut su = single_node();
    let config = AdmissionConfig {
        order: SlaOrder::Fifo,
        ..AdmissionConfig::default()
    };
    let slas = vec![solo_sla(1).with_lifetime(1).expect("lifetime"), solo_sla(2)];
    let report = run(&GreedySolver, config, slas, &mut su);

    assert_eq!(report.trace(), "OO");
    assert_eq!(report.timeline[2].released, vec![SlaId(1)]);
    assert_eq!(su.active_services(), vec![SlaId(2)]);
    // 只剩 SLA 2 的一个 cache
    let used = su.nodes()[0].used_cpu;
    assert!(used >= 105.0 && used < 2.0 * 105.0, "used cpu {used}");
}

#[test]
fn bandwidth_desc_processes_largest_demand_first() {
    let slas = vec![
        sla(1, &[(SubstrateNodeId(0), 5.0)], &[], 50.0),
        sla(2, &[(SubstrateNodeId(0), 30.0)], &[], 50.0),
        sla(3, &[(SubstrateNodeId(0), 5.0)], &[], 50.0),
        sla(4, &[(SubstrateNodeId(0), 12.0)], &[], 50.0),
    ];
    let mut su = single_node();
    let config = AdmissionConfig {
        order: SlaOrder::BandwidthDesc,
        ..AdmissionConfig::default()
    };
    let report = run(&ScriptedSolver::rejecting(), config, slas, &mut su);
    // 相同带宽保持到达顺序
    assert_eq!(order_of(&report), vec![2, 4, 1, 3]);
}

#[test]
fn hinted_cdn_edge_is_booked_then_released() {
    let (mut su, g) = grid(5, 5);
    let config = AdmissionConfig {
        order: SlaOrder::Fifo,
        initial_caches: 0,
        relax_caches: false,
        use_hints: true,
        ..AdmissionConfig::default()
    };
    let first = sla(1, &[(g.at(0, 0), 10.0), (g.at(4, 4), 10.0)], &[g.at(0, 1)], 1_000.0)
        .with_lifetime(1)
        .expect("lifetime");
    let second = sla(2, &[(g.at(2, 2), 1.0)], &[], 1_000.0);

    let report = run(&GreedySolver, config, vec![first, second], &mut su);
    assert_eq!(report.trace(), "OO");

    // (1,0) 无提示，(2,0) 沿用其 Gateway 放置并连到 CDN，链路用量更小而胜出
    let accepted = &report.timeline[1];
    let service = accepted.service.as_ref().expect("service");
    assert_eq!(service.hint, HintOutcome::Applied { edges: 1 });
    let mapping = accepted.mapping.as_ref().expect("mapping");
    assert!(mapping.edge_path(VNodeId::Gateway(1), VNodeId::Cdn(1)).is_some());
    let booked = accepted.substrate.used_bandwidth();
    assert!((booked - 10.0).abs() < 1e-9, "booked {booked}");

    let next = &report.timeline[2];
    assert_eq!(next.released, vec![SlaId(1)]);
    assert!(next.substrate.used_bandwidth().abs() < 1e-9);
    assert_eq!(su.active_services(), vec![SlaId(2)]);
}
