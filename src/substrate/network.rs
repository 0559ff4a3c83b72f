//! 底层网络
//!
//! 容量图：节点 CPU、链路带宽与时延，以及每个已接纳服务的资源预留记录。

use std::collections::{HashMap, VecDeque};

use serde::Serialize;
use tracing::debug;

use super::id::{LinkId, SubstrateNodeId};
use super::ledger::Reservation;
use super::link::SubstrateLink;
use super::node::SubstrateNode;
use super::routing::RoutingTable;
use crate::sla::SlaId;

/// 底层网络
#[derive(Debug, Clone)]
pub struct Substrate {
    nodes: Vec<SubstrateNode>,
    links: Vec<SubstrateLink>,
    edges: HashMap<(SubstrateNodeId, SubstrateNodeId), LinkId>,
    adj: Vec<Vec<SubstrateNodeId>>,
    rev_adj: Vec<Vec<SubstrateNodeId>>,
    routing: RoutingTable,
    /// 单位 CPU 代价
    pub cpu_cost: f64,
    /// 单位带宽·链路 代价
    pub net_cost: f64,
    pub(super) reservations: HashMap<SlaId, Vec<Reservation>>,
}

impl Default for Substrate {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}

/// 底层网络占用快照（写入结果时间线）
#[derive(Debug, Clone, Serialize)]
pub struct SubstrateSnapshot {
    pub nodes: Vec<SubstrateNode>,
    pub links: Vec<SubstrateLink>,
    pub active_services: Vec<SlaId>,
}

impl SubstrateSnapshot {
    pub fn used_cpu(&self) -> f64 {
        self.nodes.iter().map(|n| n.used_cpu).sum()
    }

    pub fn used_bandwidth(&self) -> f64 {
        self.links.iter().map(|l| l.used_bandwidth).sum()
    }
}

impl Substrate {
    pub fn new(cpu_cost: f64, net_cost: f64) -> Self {
        Self {
            nodes: Vec::new(),
            links: Vec::new(),
            edges: HashMap::new(),
            adj: Vec::new(),
            rev_adj: Vec::new(),
            routing: RoutingTable::new(),
            cpu_cost,
            net_cost,
            reservations: HashMap::new(),
        }
    }

    /// 添加节点
    pub fn add_node(&mut self, name: impl Into<String>, cpu: f64) -> SubstrateNodeId {
        let id = SubstrateNodeId(self.nodes.len());
        self.nodes.push(SubstrateNode::new(id, name, cpu));
        self.adj.push(Vec::new());
        self.rev_adj.push(Vec::new());
        self.routing.mark_dirty();
        id
    }

    /// 连接两个节点（创建单向链路）
    pub fn connect(
        &mut self,
        from: SubstrateNodeId,
        to: SubstrateNodeId,
        delay: f64,
        bandwidth: f64,
    ) -> LinkId {
        let id = LinkId(self.links.len());
        self.links.push(SubstrateLink::new(from, to, delay, bandwidth));
        self.edges.insert((from, to), id);
        self.adj[from.0].push(to);
        self.rev_adj[to.0].push(from);
        self.routing.mark_dirty();
        id
    }

    /// 双向连接（两条对称的单向链路）
    pub fn connect_pair(
        &mut self,
        a: SubstrateNodeId,
        b: SubstrateNodeId,
        delay: f64,
        bandwidth: f64,
    ) -> (LinkId, LinkId) {
        (
            self.connect(a, b, delay, bandwidth),
            self.connect(b, a, delay, bandwidth),
        )
    }

    /// 拓扑变更后重建跳数路由表
    pub fn rebuild_routes(&mut self) {
        self.routing.ensure_built(&self.rev_adj);
        debug!(nodes = self.nodes.len(), links = self.links.len(), "路由表已重建");
    }

    pub fn nodes(&self) -> &[SubstrateNode] {
        &self.nodes
    }

    pub fn links(&self) -> &[SubstrateLink] {
        &self.links
    }

    pub fn node(&self, id: SubstrateNodeId) -> Option<&SubstrateNode> {
        self.nodes.get(id.0)
    }

    pub fn node_by_name(&self, name: &str) -> Option<SubstrateNodeId> {
        self.nodes.iter().find(|n| n.name == name).map(|n| n.id)
    }

    pub fn link_between(&self, from: SubstrateNodeId, to: SubstrateNodeId) -> Option<LinkId> {
        self.edges.get(&(from, to)).copied()
    }

    /// 最短跳数；路由表过期时退化为一次单源 BFS。
    pub fn hops(&self, from: SubstrateNodeId, to: SubstrateNodeId) -> Option<u32> {
        if !self.routing.is_dirty() {
            return self.routing.hops(from, to);
        }
        self.shortest_path_where(from, to, |_, _| true)
            .map(|p| (p.len() - 1) as u32)
    }

    /// 在满足 `usable` 的链路子图上按跳数求最短路径（含首尾节点）。
    ///
    /// 邻居按连接顺序展开，结果对相同输入是确定的。
    pub fn shortest_path_where<F>(
        &self,
        from: SubstrateNodeId,
        to: SubstrateNodeId,
        usable: F,
    ) -> Option<Vec<SubstrateNodeId>>
    where
        F: Fn(LinkId, &SubstrateLink) -> bool,
    {
        if from.0 >= self.nodes.len() || to.0 >= self.nodes.len() {
            return None;
        }
        if from == to {
            return Some(vec![from]);
        }

        let mut prev: Vec<Option<SubstrateNodeId>> = vec![None; self.nodes.len()];
        let mut seen = vec![false; self.nodes.len()];
        let mut q = VecDeque::new();
        seen[from.0] = true;
        q.push_back(from);

        while let Some(v) = q.pop_front() {
            for &nb in &self.adj[v.0] {
                if seen[nb.0] {
                    continue;
                }
                let Some(link_id) = self.link_between(v, nb) else {
                    continue;
                };
                if !usable(link_id, &self.links[link_id.0]) {
                    continue;
                }
                seen[nb.0] = true;
                prev[nb.0] = Some(v);
                if nb == to {
                    let mut path = vec![to];
                    let mut cur = to;
                    while let Some(p) = prev[cur.0] {
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

    /// 把节点序列转换为链路序列；任意一跳不存在则返回 None。
    pub fn path_links(&self, path: &[SubstrateNodeId]) -> Option<Vec<LinkId>> {
        path.windows(2)
            .map(|w| self.link_between(w[0], w[1]))
            .collect()
    }

    /// 路径累计时延
    pub fn path_delay(&self, path: &[SubstrateNodeId]) -> Option<f64> {
        let links = self.path_links(path)?;
        Some(links.iter().map(|l| self.links[l.0].delay).sum())
    }

    pub(super) fn node_mut(&mut self, id: SubstrateNodeId) -> Option<&mut SubstrateNode> {
        self.nodes.get_mut(id.0)
    }

    pub(super) fn link_mut(&mut self, id: LinkId) -> Option<&mut SubstrateLink> {
        self.links.get_mut(id.0)
    }

    /// 当前持有预留的服务（按 SLA id 排序）
    pub fn active_services(&self) -> Vec<SlaId> {
        let mut ids: Vec<SlaId> = self.reservations.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn snapshot(&self) -> SubstrateSnapshot {
        SubstrateSnapshot {
            nodes: self.nodes.clone(),
            links: self.links.clone(),
            active_services: self.active_services(),
        }
    }
}
