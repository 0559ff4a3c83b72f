//! 提示映射（hint mapping）的解释结果
//!
//! 先前的映射可用来稳定重新求解时的拓扑：为提示中出现过的每个 Gateway
//! 连一条到其 CDN 锚点的边。解释失败时整个步骤跳过，原因显式保留在拓扑上。

use serde::Serialize;

use super::node::VNodeId;
use crate::substrate::SubstrateNodeId;

/// 提示映射的处理结果
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HintOutcome {
    NotRequested,
    Applied { edges: usize },
    Skipped { reason: HintSkip },
}

/// 提示被跳过的原因
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HintSkip {
    #[error("hint places no gateway")]
    NoGateways,
    #[error("hint gateway {gateway} is not part of the current topology")]
    StaleGateway { gateway: VNodeId },
    #[error("hint places {gateway} on unknown substrate node {node:?}")]
    UnknownSubstrateNode {
        gateway: VNodeId,
        node: SubstrateNodeId,
    },
    #[error("SLA has no CDN anchors")]
    NoCdnAnchors,
    #[error("hint routes {gateway} to {cdn}, which is not a CDN anchor of this SLA")]
    UnknownCdn { gateway: VNodeId, cdn: VNodeId },
    #[error("no CDN anchor is reachable from {gateway}")]
    Unreachable { gateway: VNodeId },
    #[error("full-mesh topology already connects every gateway to every CDN anchor")]
    FullMesh,
}
