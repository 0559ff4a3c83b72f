//! 底层网络节点
//!
//! 节点携带 CPU 容量与当前占用。

use serde::Serialize;

use super::id::SubstrateNodeId;

/// 底层网络节点
#[derive(Debug, Clone, Serialize)]
pub struct SubstrateNode {
    pub id: SubstrateNodeId,
    pub name: String,
    pub cpu: f64,
    pub used_cpu: f64,
}

impl SubstrateNode {
    /// 创建新节点（无占用）
    pub fn new(id: SubstrateNodeId, name: impl Into<String>, cpu: f64) -> Self {
        Self {
            id,
            name: name.into(),
            cpu,
            used_cpu: 0.0,
        }
    }

    /// 剩余 CPU
    pub fn residual_cpu(&self) -> f64 {
        (self.cpu - self.used_cpu).max(0.0)
    }
}
