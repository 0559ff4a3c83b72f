//! 虚拟服务拓扑
//!
//! 每个 (SLA, gateway 数, cache 数) 三元组构建一次的有向虚拟图。
//! 从 Root 到各 Start 是一棵树；Start→Gateway 与 Gateway→{Cache, Cdn}
//! 构成二分的需求路由层。

use std::collections::{BTreeMap, VecDeque};

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

use super::hint::HintOutcome;
use super::node::{VNode, VNodeId};
use super::route::DelayRoute;
use super::shape::Shape;
use crate::sla::SlaId;

/// 虚拟边
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VEdge {
    /// 该边上流动的需求带宽
    pub bandwidth: f64,
    /// Root→Start 边的时延占位：不受约束，永远不与真实时延上限比较
    pub unconstrained_delay: bool,
}

impl VEdge {
    pub(crate) fn demand(bandwidth: f64) -> Self {
        Self {
            bandwidth,
            unconstrained_delay: false,
        }
    }

    pub(crate) fn unconstrained() -> Self {
        Self {
            bandwidth: 0.0,
            unconstrained_delay: true,
        }
    }
}

/// 虚拟服务拓扑
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceTopology {
    pub sla_id: SlaId,
    /// 夹紧后的实际形状
    pub shape: Shape,
    pub delay: f64,
    pub max_cdn_to_use: usize,
    pub(crate) nodes: BTreeMap<VNodeId, VNode>,
    #[serde(serialize_with = "serialize_edges")]
    pub(crate) edges: BTreeMap<(VNodeId, VNodeId), VEdge>,
    pub(crate) routes: Vec<DelayRoute>,
    pub hint: HintOutcome,
}

fn serialize_edges<S: Serializer>(
    edges: &BTreeMap<(VNodeId, VNodeId), VEdge>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    #[derive(Serialize)]
    struct Row<'a> {
        from: VNodeId,
        to: VNodeId,
        #[serde(flatten)]
        edge: &'a VEdge,
    }

    let mut seq = serializer.serialize_seq(Some(edges.len()))?;
    for ((from, to), edge) in edges {
        seq.serialize_element(&Row {
            from: *from,
            to: *to,
            edge,
        })?;
    }
    seq.end()
}

impl ServiceTopology {
    pub(crate) fn empty(sla_id: SlaId, shape: Shape, delay: f64, max_cdn_to_use: usize) -> Self {
        Self {
            sla_id,
            shape,
            delay,
            max_cdn_to_use,
            nodes: BTreeMap::new(),
            edges: BTreeMap::new(),
            routes: Vec::new(),
            hint: HintOutcome::NotRequested,
        }
    }

    pub(crate) fn add_node(&mut self, id: VNodeId, node: VNode) {
        self.nodes.insert(id, node);
    }

    pub(crate) fn add_edge(&mut self, from: VNodeId, to: VNodeId, edge: VEdge) {
        self.edges.insert((from, to), edge);
    }

    pub fn node(&self, id: VNodeId) -> Option<&VNode> {
        self.nodes.get(&id)
    }

    pub(crate) fn node_mut(&mut self, id: VNodeId) -> Option<&mut VNode> {
        self.nodes.get_mut(&id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (VNodeId, &VNode)> {
        self.nodes.iter().map(|(id, n)| (*id, n))
    }

    pub fn edge(&self, from: VNodeId, to: VNodeId) -> Option<&VEdge> {
        self.edges.get(&(from, to))
    }

    pub(crate) fn edge_mut(&mut self, from: VNodeId, to: VNodeId) -> Option<&mut VEdge> {
        self.edges.get_mut(&(from, to))
    }

    pub fn edges(&self) -> impl Iterator<Item = (VNodeId, VNodeId, &VEdge)> {
        self.edges.iter().map(|((f, t), e)| (*f, *t, e))
    }

    pub fn routes(&self) -> &[DelayRoute] {
        &self.routes
    }

    /// `from` 的所有出边终点（有序）
    pub fn children(&self, from: VNodeId) -> impl Iterator<Item = VNodeId> + '_ {
        self.edges
            .range((from, VNodeId::Root)..=(from, VNodeId::MAX))
            .map(|((_, to), _)| *to)
    }

    /// `to` 的所有入边起点
    pub fn parents(&self, to: VNodeId) -> impl Iterator<Item = VNodeId> + '_ {
        self.edges
            .keys()
            .filter(move |(_, t)| *t == to)
            .map(|(f, _)| *f)
    }

    pub fn out_degree(&self, from: VNodeId) -> usize {
        self.children(from).count()
    }

    pub fn gateways(&self) -> impl Iterator<Item = VNodeId> + '_ {
        self.nodes.keys().copied().filter(|id| matches!(id, VNodeId::Gateway(_)))
    }

    pub fn caches(&self) -> impl Iterator<Item = VNodeId> + '_ {
        self.nodes.keys().copied().filter(|id| matches!(id, VNodeId::Cache(_)))
    }

    pub fn starts(&self) -> impl Iterator<Item = VNodeId> + '_ {
        self.nodes.keys().copied().filter(|id| matches!(id, VNodeId::Start(_)))
    }

    pub fn cdns(&self) -> impl Iterator<Item = VNodeId> + '_ {
        self.nodes.keys().copied().filter(|id| matches!(id, VNodeId::Cdn(_)))
    }

    /// Start 节点当前连接的 Gateway
    pub fn gateway_of(&self, start: VNodeId) -> Option<VNodeId> {
        self.children(start).find(VNodeId::is_gateway)
    }

    /// 按跳数的最短路径（BFS，邻居按出边顺序展开）
    pub fn shortest_path(&self, from: VNodeId, to: VNodeId) -> Option<Vec<VNodeId>> {
        if !self.nodes.contains_key(&from) || !self.nodes.contains_key(&to) {
            return None;
        }
        if from == to {
            return Some(vec![from]);
        }
        let mut prev: BTreeMap<VNodeId, VNodeId> = BTreeMap::new();
        let mut q = VecDeque::from([from]);
        while let Some(v) = q.pop_front() {
            for nb in self.children(v) {
                if nb == from || prev.contains_key(&nb) {
                    continue;
                }
                prev.insert(nb, v);
                if nb == to {
                    let mut path = vec![to];
                    let mut cur = to;
                    while let Some(&p) = prev.get(&cur) {
                        path.push(p);
                        cur = p;
                    }
                    path.reverse();
                    return Some(path);
                }
                q.push_back(nb);
            }
        }
        None
    }

    /// 所有虚拟节点 CPU 之和
    pub fn total_cpu(&self) -> f64 {
        self.nodes.values().map(VNode::cpu).sum()
    }
}
