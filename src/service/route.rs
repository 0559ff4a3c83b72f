//! 时延路由
//!
//! 每个连通的 (Start, Cache) 对对应一条路由：以节点序列为键，值为 SLA 时延上限，
//! 并附带组成该路径的边段。

use serde::Serialize;

use super::node::VNodeId;

/// 一条受时延约束的虚拟路径
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DelayRoute {
    /// 节点名以 `_` 连接，例如 `S1_VHG1_VCDN1`
    pub key: String,
    pub path: Vec<VNodeId>,
    pub delay: f64,
}

impl DelayRoute {
    pub fn new(path: Vec<VNodeId>, delay: f64) -> Self {
        Self {
            key: route_key(&path),
            path,
            delay,
        }
    }

    /// 组成路径的有序边段
    pub fn segments(&self) -> impl Iterator<Item = (VNodeId, VNodeId)> + '_ {
        self.path.windows(2).map(|w| (w[0], w[1]))
    }
}

/// 节点序列的路由键
pub fn route_key(path: &[VNodeId]) -> String {
    path.iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join("_")
}
