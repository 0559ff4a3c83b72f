//! 贪心求解器
//!
//! 进程内的确定性放置：Start/Cdn 固定在锚点上，Root 放在第一个 start 锚点；
//! 依次为每个 Gateway、Cache 选择剩余 CPU 足够且代价最低的底层节点；
//! 每条虚拟边走剩余带宽足够的最短跳数路径；最后检查时延路由与 CDN 数量上限。

use std::collections::{BTreeMap, BTreeSet, HashMap};

use tracing::{debug, trace};

use super::mapping::{EdgePlacement, Mapping};
use super::{Deadline, SolveOutcome, Solver, Violation};
use crate::service::{ServiceTopology, VNode, VNodeId};
use crate::substrate::{LinkId, Substrate, SubstrateNodeId};

#[derive(Debug, Default, Clone, Copy)]
pub struct GreedySolver;

/// 本次求解内已经计入的占用（叠加在底层网络当前占用之上）
#[derive(Default)]
struct Pending {
    cpu: HashMap<SubstrateNodeId, f64>,
    bandwidth: HashMap<LinkId, f64>,
}

impl GreedySolver {
    fn place_node(
        topo: &ServiceTopology,
        substrate: &Substrate,
        vnode: VNodeId,
        cpu: f64,
        placed: &BTreeMap<VNodeId, SubstrateNodeId>,
        pending: &Pending,
    ) -> Option<SubstrateNodeId> {
        // 已放置的邻居及其边带宽
        let mut peers: Vec<(SubstrateNodeId, f64)> = Vec::new();
        for parent in topo.parents(vnode) {
            if let (Some(&at), Some(edge)) = (placed.get(&parent), topo.edge(parent, vnode)) {
                peers.push((at, edge.bandwidth));
            }
        }
        for child in topo.children(vnode) {
            if let (Some(&at), Some(edge)) = (placed.get(&child), topo.edge(vnode, child)) {
                peers.push((at, edge.bandwidth));
            }
        }

        let mut best: Option<(f64, SubstrateNodeId)> = None;
        for node in substrate.nodes() {
            let taken = pending.cpu.get(&node.id).copied().unwrap_or(0.0);
            if node.residual_cpu() - taken < cpu {
                continue;
            }
            let mut net = 0.0;
            let mut reachable = true;
            for &(at, bw) in &peers {
                match substrate.hops(node.id, at) {
                    Some(h) => net += bw * f64::from(h),
                    None => {
                        reachable = false;
                        break;
                    }
                }
            }
            if !reachable {
                continue;
            }
            let cost = substrate.cpu_cost * cpu + substrate.net_cost * net;
            if best.is_none_or(|(b, _)| cost < b) {
                best = Some((cost, node.id));
            }
        }
        best.map(|(_, id)| id)
    }
}

impl Solver for GreedySolver {
    #[tracing::instrument(skip(self, topo, substrate, deadline), fields(sla = %topo.sla_id, shape = %topo.shape))]
    fn solve(&self, topo: &ServiceTopology, substrate: &Substrate, deadline: Deadline) -> SolveOutcome {
        let mut placed: BTreeMap<VNodeId, SubstrateNodeId> = BTreeMap::new();
        let mut pending = Pending::default();
        let mut violations = Vec::new();

        for (id, node) in topo.nodes() {
            if let Some(anchor) = node.anchor() {
                placed.insert(id, anchor);
            }
        }
        if let Some(first) = topo.starts().next().and_then(|s| placed.get(&s).copied()) {
            placed.insert(VNodeId::Root, first);
        }

        let movable: Vec<(VNodeId, f64)> = topo
            .nodes()
            .filter(|(_, n)| matches!(n, VNode::Gateway { .. } | VNode::Cache { .. }))
            .map(|(id, n)| (id, n.cpu()))
            .collect();

        for (vnode, cpu) in movable {
            if deadline.expired() {
                debug!(%vnode, "⏱️  放置阶段超时");
                return SolveOutcome::TimedOut;
            }
            match Self::place_node(topo, substrate, vnode, cpu, &placed, &pending) {
                Some(at) => {
                    trace!(%vnode, node = ?at, cpu, "放置虚拟节点");
                    *pending.cpu.entry(at).or_default() += cpu;
                    placed.insert(vnode, at);
                }
                None => violations.push(Violation::NodeCpu { vnode, cpu }),
            }
        }
        if !violations.is_empty() {
            return SolveOutcome::Infeasible { violations };
        }

        let mut edges = Vec::new();
        let mut link_volume = 0.0;
        for (from, to, edge) in topo.edges() {
            if deadline.expired() {
                debug!(%from, %to, "⏱️  选路阶段超时");
                return SolveOutcome::TimedOut;
            }
            let (Some(&a), Some(&b)) = (placed.get(&from), placed.get(&to)) else {
                continue;
            };
            let need = edge.bandwidth;
            let path = substrate.shortest_path_where(a, b, |id, link| {
                let taken = pending.bandwidth.get(&id).copied().unwrap_or(0.0);
                link.residual_bandwidth() - taken >= need
            });
            match path {
                Some(path) => {
                    if need > 0.0 {
                        for id in substrate.path_links(&path).unwrap_or_default() {
                            *pending.bandwidth.entry(id).or_default() += need;
                        }
                        link_volume += need * (path.len() - 1) as f64;
                    }
                    edges.push(EdgePlacement { from, to, path });
                }
                None if need <= 0.0 => {}
                None => violations.push(Violation::EdgeBandwidth {
                    from,
                    to,
                    bandwidth: need,
                }),
            }
        }

        let delay_of = |from: VNodeId, to: VNodeId| -> f64 {
            edges
                .iter()
                .find(|e| e.from == from && e.to == to)
                .and_then(|e| substrate.path_delay(&e.path))
                .unwrap_or(f64::INFINITY)
        };
        for route in topo.routes() {
            let delay: f64 = route.segments().map(|(f, t)| delay_of(f, t)).sum();
            if delay > route.delay {
                violations.push(Violation::Delay {
                    route: route.key.clone(),
                    delay,
                    bound: route.delay,
                });
            }
        }

        let cdns_used: BTreeSet<VNodeId> = edges
            .iter()
            .filter(|e| matches!(e.to, VNodeId::Cdn(_)))
            .map(|e| e.to)
            .collect();
        if cdns_used.len() > topo.max_cdn_to_use {
            violations.push(Violation::CdnCap {
                used: cdns_used.len(),
                max: topo.max_cdn_to_use,
            });
        }

        if !violations.is_empty() {
            debug!(count = violations.len(), "求解不可行");
            return SolveOutcome::Infeasible { violations };
        }

        let objective = substrate.cpu_cost * topo.total_cpu() + substrate.net_cost * link_volume;
        debug!(objective, "求解成功");
        SolveOutcome::Feasible(Mapping::new(placed, edges, objective))
    }
}
