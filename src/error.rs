//! 错误类型
//!
//! 拓扑合成与接纳流程中的契约违例、资源账本错误以及场景加载错误。
//! 求解不可行、松弛耗尽都不是错误，见 `admission`。

use thiserror::Error;

use crate::service::VNodeId;
use crate::sla::SlaId;
use crate::substrate::{LinkId, SubstrateNodeId};

/// 拓扑合成阶段的契约违例（致命，不做恢复）
#[derive(Debug, Error)]
pub enum EmbedError {
    #[error("SLA {sla} has no start anchors")]
    NoStartAnchors { sla: SlaId },

    #[error("SLA {sla} demands negative bandwidth {value}")]
    NegativeBandwidth { sla: SlaId, value: f64 },

    #[error("SLA {sla} has negative delay bound {value}")]
    NegativeDelay { sla: SlaId, value: f64 },

    #[error("SLA {sla} has a zero lifetime")]
    ZeroLifetime { sla: SlaId },

    #[error("SLA {sla} references unknown substrate node {node:?}")]
    UnknownAnchor { sla: SlaId, node: SubstrateNodeId },

    #[error("clusterer returned {got} assignments for {expected} anchors")]
    ClusterCount { expected: usize, got: usize },

    #[error("clusterer assigned cluster {cluster} outside [1, {k}]")]
    ClusterOutOfRange { cluster: usize, k: usize },

    #[error("capacity calculator returned {value} for {node} (bandwidth {bandwidth})")]
    NegativeCapacity {
        node: VNodeId,
        bandwidth: f64,
        value: f64,
    },
}

/// 底层网络构建错误
#[derive(Debug, Error)]
pub enum SubstrateError {
    #[error("grid {width}x{height} has no nodes")]
    EmptyGrid { width: usize, height: usize },
}

/// 资源账本错误
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("service {0} holds no reservation")]
    UnknownService(SlaId),

    #[error("virtual node {0} has no placement in the mapping")]
    UnmappedNode(VNodeId),

    #[error("virtual edge {0}->{1} has no substrate path in the mapping")]
    UnmappedEdge(VNodeId, VNodeId),

    #[error("mapping references unknown substrate node {0:?}")]
    UnknownNode(SubstrateNodeId),

    #[error("mapping path for {from}->{to} is not a substrate path")]
    BrokenPath { from: VNodeId, to: VNodeId },

    #[error("mapping references unknown substrate link {0:?}")]
    UnknownLink(LinkId),
}

/// 场景文件加载错误
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse scenario JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported scenario schema_version {0}")]
    SchemaVersion(u32),

    #[error("invalid scenario: {0}")]
    Invalid(String),

    #[error(transparent)]
    Substrate(#[from] SubstrateError),

    #[error(transparent)]
    Sla(#[from] EmbedError),
}

/// 接纳驱动向调用方上抛的错误
#[derive(Debug, Error)]
pub enum AdmissionError {
    #[error(transparent)]
    Embed(#[from] EmbedError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),
}
