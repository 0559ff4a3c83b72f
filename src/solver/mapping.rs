//! 映射：求解器的输出
//!
//! 每个虚拟节点放到一个底层节点、每条虚拟边放到一条底层路径，外加一个标量目标值
//! （越小越好）。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::service::VNodeId;
use crate::substrate::SubstrateNodeId;

/// 一条虚拟边的底层路径
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgePlacement {
    pub from: VNodeId,
    pub to: VNodeId,
    /// 底层节点序列（含首尾）；首尾相同表示同节点放置，不占用链路
    pub path: Vec<SubstrateNodeId>,
}

/// 求解器给出的映射
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mapping {
    pub nodes: BTreeMap<VNodeId, SubstrateNodeId>,
    pub edges: Vec<EdgePlacement>,
    pub objective: f64,
}

impl Mapping {
    pub fn new(
        nodes: BTreeMap<VNodeId, SubstrateNodeId>,
        edges: Vec<EdgePlacement>,
        objective: f64,
    ) -> Self {
        Self {
            nodes,
            edges,
            objective,
        }
    }

    pub fn node(&self, id: VNodeId) -> Option<SubstrateNodeId> {
        self.nodes.get(&id).copied()
    }

    pub fn edge_path(&self, from: VNodeId, to: VNodeId) -> Option<&[SubstrateNodeId]> {
        self.edges
            .iter()
            .find(|e| e.from == from && e.to == to)
            .map(|e| e.path.as_slice())
    }

    /// Gateway 的放置（按 Gateway 序号）
    pub fn gateway_placements(&self) -> impl Iterator<Item = (VNodeId, SubstrateNodeId)> + '_ {
        self.nodes
            .iter()
            .filter(|(id, _)| id.is_gateway())
            .map(|(id, node)| (*id, *node))
    }
}
