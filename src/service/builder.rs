//! 拓扑合成
//!
//! 给定 SLA 与形状 (gateway 数, cache 数)，构建虚拟服务拓扑：
//!
//! 1. 创建 Root、Gateway、Cache、Cdn 与 Start 节点，Root→Start 边不受时延约束；
//! 2. 两次聚类：start 锚点 -> Gateway 归属，以及每个 start 对 Cache 的投票；
//! 3. 每个 Gateway 汇总成员的投票，得票最多的 Cache 胜出（平局取最先出现者）；
//! 4. 自 Start 层起按广度优先传播带宽；
//! 5. Gateway 的 CPU 由容量计算得出；
//! 6. 为每个连通的 (Start, Cache) 对生成时延路由；
//! 7. 若给出提示映射，补上 Gateway→Cdn 边。
//!
//! `TopologyMode::Full` 跳过第 2、3 步与提示：每个 Start 连向全部 Gateway，
//! 每个 Gateway 连向全部 Cache 与全部 CDN 锚点，具体选择交给求解器。

use std::collections::{BTreeMap, HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::hint::{HintOutcome, HintSkip};
use super::node::{VNode, VNodeId};
use super::route::DelayRoute;
use super::shape::Shape;
use super::topology::{ServiceTopology, VEdge};
use crate::error::EmbedError;
use crate::heuristic::{CapacityCalculator, LinearCapacity, NodeClusterer, check_assignment};
use crate::sla::Sla;
use crate::solver::Mapping;
use crate::substrate::{Substrate, SubstrateNodeId};

/// 虚拟层之间的连边方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopologyMode {
    /// 聚类 + 投票
    #[default]
    Heuristic,
    /// 相邻层之间全连接
    Full,
}

/// 拓扑合成参数
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyParams {
    pub mode: TopologyMode,
    /// 每个 Cache 实例的固定 CPU
    pub cache_cpu: f64,
    /// 流向 Cache 的流量份额
    pub cache_ratio: f64,
    /// 流向 CDN 锚点的流量份额
    pub cdn_ratio: f64,
    /// 内置线性容量模型的常数项
    pub gateway_cpu_base: f64,
    /// 内置线性容量模型的每单位带宽 CPU
    pub gateway_cpu_per_unit: f64,
}

impl Default for TopologyParams {
    fn default() -> Self {
        Self {
            mode: TopologyMode::Heuristic,
            cache_cpu: 105.0,
            cache_ratio: 0.35,
            cdn_ratio: 0.65,
            gateway_cpu_base: 0.0,
            gateway_cpu_per_unit: 1e-8,
        }
    }
}

impl TopologyParams {
    /// 由参数得到的内置 Gateway 容量模型
    pub fn gateway_capacity(&self) -> LinearCapacity {
        LinearCapacity::new(self.gateway_cpu_base, self.gateway_cpu_per_unit)
    }
}

/// 拓扑合成器
pub struct TopologyBuilder<'a> {
    params: TopologyParams,
    clusterer: &'a dyn NodeClusterer,
    capacity: &'a dyn CapacityCalculator,
}

impl<'a> TopologyBuilder<'a> {
    pub fn new(
        params: TopologyParams,
        clusterer: &'a dyn NodeClusterer,
        capacity: &'a dyn CapacityCalculator,
    ) -> Self {
        Self {
            params,
            clusterer,
            capacity,
        }
    }

    /// 构建拓扑。请求的数量会被夹紧，调用方不能依赖它们被原样采用。
    #[tracing::instrument(skip(self, sla, substrate, hint), fields(sla = %sla.id(), mode = ?self.params.mode, hinted = hint.is_some()))]
    pub fn build(
        &self,
        sla: &Sla,
        gateways: usize,
        caches: usize,
        substrate: &Substrate,
        hint: Option<&Mapping>,
    ) -> Result<ServiceTopology, EmbedError> {
        sla.check_anchors(substrate)?;

        let shape = Shape::new(gateways, caches).clamped(sla.start().len());
        debug!(requested = %Shape::new(gateways, caches), %shape, "🧩 合成服务拓扑");

        let mut topo =
            ServiceTopology::empty(sla.id(), shape, sla.delay(), sla.max_cdn_to_use());
        self.add_nodes(&mut topo, sla, shape);

        match self.params.mode {
            TopologyMode::Heuristic => {
                let anchors: Vec<SubstrateNodeId> = sla.start().iter().map(|s| s.node).collect();
                let membership = self.connect_gateways(&mut topo, &anchors, shape, substrate)?;
                self.connect_caches(&mut topo, &anchors, &membership, shape, substrate)?;
            }
            TopologyMode::Full => connect_full(&mut topo),
        }

        propagate_bandwidth(&mut topo);
        self.assign_gateway_cpu(&mut topo)?;
        build_delay_routes(&mut topo);

        let outcome = match hint {
            None => HintOutcome::NotRequested,
            Some(_) if self.params.mode == TopologyMode::Full => HintOutcome::Skipped {
                reason: HintSkip::FullMesh,
            },
            Some(h) => match apply_hint(&mut topo, h, substrate) {
                Ok(edges) => {
                    debug!(edges, "提示映射已应用");
                    HintOutcome::Applied { edges }
                }
                Err(reason) => {
                    warn!(%reason, "⚠️  提示映射被跳过");
                    HintOutcome::Skipped { reason }
                }
            },
        };
        topo.hint = outcome;

        debug!(
            nodes = topo.nodes.len(),
            edges = topo.edges.len(),
            routes = topo.routes.len(),
            "拓扑合成完成"
        );
        Ok(topo)
    }

    fn add_nodes(&self, topo: &mut ServiceTopology, sla: &Sla, shape: Shape) {
        topo.add_node(VNodeId::Root, VNode::Root);

        for i in 1..=shape.gateways {
            topo.add_node(
                VNodeId::Gateway(i),
                VNode::Gateway {
                    bandwidth: 0.0,
                    cpu: 0.0,
                },
            );
        }

        for i in 1..=shape.caches {
            topo.add_node(
                VNodeId::Cache(i),
                VNode::Cache {
                    bandwidth: 0.0,
                    cpu: self.params.cache_cpu,
                    ratio: self.params.cache_ratio,
                    delay: sla.delay(),
                },
            );
        }

        for (i, &anchor) in sla.cdn().iter().enumerate() {
            topo.add_node(
                VNodeId::Cdn(i + 1),
                VNode::Cdn {
                    anchor,
                    bandwidth: 0.0,
                    ratio: self.params.cdn_ratio,
                },
            );
        }

        for (i, start) in sla.start().iter().enumerate() {
            let id = VNodeId::Start(i + 1);
            topo.add_node(
                id,
                VNode::Start {
                    anchor: start.node,
                    demand: start.bandwidth,
                },
            );
            topo.add_edge(VNodeId::Root, id, VEdge::unconstrained());
        }
    }

    /// Start→Gateway：按 gateway 数聚类。返回每个 start（按顺序）所属的 Gateway 序号。
    fn connect_gateways(
        &self,
        topo: &mut ServiceTopology,
        anchors: &[SubstrateNodeId],
        shape: Shape,
        substrate: &Substrate,
    ) -> Result<Vec<usize>, EmbedError> {
        let membership = self.clusterer.cluster(anchors, shape.gateways, substrate)?;
        check_assignment(&membership, anchors.len(), shape.gateways)?;

        for (i, &gw) in membership.iter().enumerate() {
            topo.add_edge(VNodeId::Start(i + 1), VNodeId::Gateway(gw), VEdge::demand(0.0));
        }
        trace!(?membership, "Start→Gateway 归属");
        Ok(membership)
    }

    /// Gateway→Cache：每个 start 投票给一个 Cache，票数转交给它的 Gateway。
    fn connect_caches(
        &self,
        topo: &mut ServiceTopology,
        anchors: &[SubstrateNodeId],
        membership: &[usize],
        shape: Shape,
        substrate: &Substrate,
    ) -> Result<(), EmbedError> {
        if shape.caches == 0 {
            return Ok(());
        }
        let votes = self.clusterer.cluster(anchors, shape.caches, substrate)?;
        check_assignment(&votes, anchors.len(), shape.caches)?;

        let tally = tally_votes(membership, &votes);
        for (gw, counts) in &tally {
            if let Some(cache) = pick_winner(counts) {
                trace!(gateway = gw, cache, ?counts, "Cache 投票结果");
                topo.add_edge(VNodeId::Gateway(*gw), VNodeId::Cache(cache), VEdge::demand(0.0));
            }
        }
        Ok(())
    }

    fn assign_gateway_cpu(&self, topo: &mut ServiceTopology) -> Result<(), EmbedError> {
        let gateways: Vec<VNodeId> = topo.gateways().collect();
        for id in gateways {
            let Some(VNode::Gateway { bandwidth, cpu }) = topo.node_mut(id) else {
                continue;
            };
            let value = self.capacity.capacity_for(*bandwidth);
            if value < 0.0 || value.is_nan() {
                return Err(EmbedError::NegativeCapacity {
                    node: id,
                    bandwidth: *bandwidth,
                    value,
                });
            }
            *cpu = value;
        }
        Ok(())
    }
}

/// 全连接：Start→每个 Gateway，Gateway→每个 Cache 与每个 CDN 锚点。
fn connect_full(topo: &mut ServiceTopology) {
    let starts: Vec<VNodeId> = topo.starts().collect();
    let gateways: Vec<VNodeId> = topo.gateways().collect();
    let sinks: Vec<VNodeId> = topo.caches().chain(topo.cdns()).collect();

    for &start in &starts {
        for &gateway in &gateways {
            topo.add_edge(start, gateway, VEdge::demand(0.0));
        }
    }
    for &gateway in &gateways {
        for &sink in &sinks {
            topo.add_edge(gateway, sink, VEdge::demand(0.0));
        }
    }
}

/// 汇总投票：Gateway 序号 -> [(Cache 序号, 票数)]，Cache 按首次出现的顺序排列。
pub(crate) fn tally_votes(membership: &[usize], votes: &[usize]) -> BTreeMap<usize, Vec<(usize, usize)>> {
    let mut tally: BTreeMap<usize, Vec<(usize, usize)>> = BTreeMap::new();
    for (&gw, &cache) in membership.iter().zip(votes) {
        let counts = tally.entry(gw).or_default();
        match counts.iter_mut().find(|(c, _)| *c == cache) {
            Some((_, n)) => *n += 1,
            None => counts.push((cache, 1)),
        }
    }
    tally
}

/// 得票最多者胜出；平局取最先出现的 Cache。
pub(crate) fn pick_winner(counts: &[(usize, usize)]) -> Option<usize> {
    let mut best: Option<(usize, usize)> = None;
    for &(cache, n) in counts {
        if best.is_none_or(|(_, b)| n > b) {
            best = Some((cache, n));
        }
    }
    best.map(|(cache, _)| cache)
}

/// 自 Start 层向下按广度优先传播带宽。
///
/// 节点在所有入边贡献到齐之后才向外分发一次：每条出边承载
/// `B / C * ratio(child)`，并累加进子节点带宽。Root 不参与传播。
pub(crate) fn propagate_bandwidth(topo: &mut ServiceTopology) {
    let mut pending: HashMap<VNodeId, usize> = HashMap::new();
    for (from, to, _) in topo.edges() {
        if from != VNodeId::Root {
            *pending.entry(to).or_default() += 1;
        }
    }

    let mut queue: VecDeque<VNodeId> = topo
        .nodes
        .keys()
        .copied()
        .filter(|id| *id != VNodeId::Root && !pending.contains_key(id))
        .collect();

    while let Some(node) = queue.pop_front() {
        let bandwidth = topo.node(node).map(VNode::bandwidth).unwrap_or(0.0);
        let children: Vec<VNodeId> = topo.children(node).collect();
        let fanout = children.len() as f64;

        for child in children {
            let ratio = topo.node(child).map(VNode::ratio).unwrap_or(1.0);
            let amount = bandwidth / fanout * ratio;
            if let Some(edge) = topo.edge_mut(node, child) {
                edge.bandwidth = amount;
            }
            if let Some(n) = topo.node_mut(child) {
                n.add_bandwidth(amount);
            }
            trace!(from = %node, to = %child, amount, "传播带宽");

            if let Some(left) = pending.get_mut(&child) {
                *left -= 1;
                if *left == 0 {
                    queue.push_back(child);
                }
            }
        }
    }
}

/// 为每个 (Start, Cache) 对计算按跳数的最短路径；不连通的对被静默跳过。
pub(crate) fn build_delay_routes(topo: &mut ServiceTopology) {
    let caches: Vec<VNodeId> = topo.caches().collect();
    let starts: Vec<VNodeId> = topo.starts().collect();
    let mut routes = Vec::new();
    for &cache in &caches {
        for &start in &starts {
            if let Some(path) = topo.shortest_path(start, cache) {
                routes.push(DelayRoute::new(path, topo.delay));
            }
        }
    }
    topo.routes = routes;
}

/// 由提示映射推导 Gateway→Cdn 边。
///
/// 每个在提示中被放置过的 Gateway 连向提示已使用的 CDN 锚点；提示中没有
/// 这样的边时，取离其放置位置（底层跳数）最近的 CDN 锚点。先完成全部校验再修改拓扑，
/// 任一失败即整体跳过。
fn apply_hint(
    topo: &mut ServiceTopology,
    hint: &Mapping,
    substrate: &Substrate,
) -> Result<usize, HintSkip> {
    let placements: Vec<(VNodeId, SubstrateNodeId)> = hint.gateway_placements().collect();
    if placements.is_empty() {
        return Err(HintSkip::NoGateways);
    }

    let cdns: Vec<(VNodeId, SubstrateNodeId)> = topo
        .cdns()
        .filter_map(|id| topo.node(id).and_then(VNode::anchor).map(|a| (id, a)))
        .collect();
    if cdns.is_empty() {
        return Err(HintSkip::NoCdnAnchors);
    }

    let mut planned = Vec::with_capacity(placements.len());
    for (gateway, placed) in placements {
        if topo.node(gateway).is_none() {
            return Err(HintSkip::StaleGateway { gateway });
        }
        if substrate.node(placed).is_none() {
            return Err(HintSkip::UnknownSubstrateNode {
                gateway,
                node: placed,
            });
        }

        let previous = hint
            .edges
            .iter()
            .find(|e| e.from == gateway && matches!(e.to, VNodeId::Cdn(_)))
            .map(|e| e.to);

        let cdn = match previous {
            Some(cdn) if topo.node(cdn).is_some() => cdn,
            Some(cdn) => return Err(HintSkip::UnknownCdn { gateway, cdn }),
            None => nearest_cdn(&cdns, placed, substrate)
                .ok_or(HintSkip::Unreachable { gateway })?,
        };
        planned.push((gateway, cdn));
    }

    for &(gateway, cdn) in &planned {
        let bandwidth = topo.node(gateway).map(VNode::bandwidth).unwrap_or(0.0);
        topo.add_edge(gateway, cdn, VEdge::demand(bandwidth));
    }
    Ok(planned.len())
}

fn nearest_cdn(
    cdns: &[(VNodeId, SubstrateNodeId)],
    from: SubstrateNodeId,
    substrate: &Substrate,
) -> Option<VNodeId> {
    let mut best: Option<(u32, VNodeId)> = None;
    for &(id, anchor) in cdns {
        let Some(h) = substrate.hops(from, anchor) else {
            continue;
        };
        if best.is_none_or(|(b, _)| h < b) {
            best = Some((h, id));
        }
    }
    best.map(|(_, id)| id)
}
