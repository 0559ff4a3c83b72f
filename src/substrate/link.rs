//! 链路类型
//!
//! 定义底层网络的单向链路：带宽容量、当前占用与传播时延。

use serde::Serialize;

use super::id::SubstrateNodeId;

/// 底层网络链路（单向）
#[derive(Debug, Clone, Serialize)]
pub struct SubstrateLink {
    pub from: SubstrateNodeId,
    pub to: SubstrateNodeId,
    /// 传播时延（与 SLA 时延上限同一单位）
    pub delay: f64,
    pub bandwidth: f64,
    pub used_bandwidth: f64,
}

impl SubstrateLink {
    /// 创建新链路
    pub fn new(from: SubstrateNodeId, to: SubstrateNodeId, delay: f64, bandwidth: f64) -> Self {
        Self {
            from,
            to,
            delay,
            bandwidth,
            used_bandwidth: 0.0,
        }
    }

    /// 剩余带宽
    pub fn residual_bandwidth(&self) -> f64 {
        (self.bandwidth - self.used_bandwidth).max(0.0)
    }
}
