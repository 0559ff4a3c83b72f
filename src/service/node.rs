//! 虚拟节点
//!
//! 节点种类是封闭的枚举，每种只携带自己相关的属性：
//! Gateway（VHG）带宽 + CPU，Cache（VCDN）带宽 + CPU + 比例 + 时延，
//! Start 需求 + 锚点，Cdn 锚点 + 比例。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::substrate::SubstrateNodeId;

/// 虚拟节点标识符。
///
/// 文本形式与求解器交换文件一致：`S0`（根）、`S1..`、`VHG1..`、`VCDN1..`、`CDN1..`，
/// 序号从 1 开始。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VNodeId {
    Root,
    Start(usize),
    Gateway(usize),
    Cache(usize),
    Cdn(usize),
}

impl VNodeId {
    /// 排序意义上的最大值，用于按起点范围查询出边
    pub(crate) const MAX: VNodeId = VNodeId::Cdn(usize::MAX);

    pub fn is_gateway(&self) -> bool {
        matches!(self, VNodeId::Gateway(_))
    }
}

impl fmt::Display for VNodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VNodeId::Root => write!(f, "S0"),
            VNodeId::Start(i) => write!(f, "S{i}"),
            VNodeId::Gateway(i) => write!(f, "VHG{i}"),
            VNodeId::Cache(i) => write!(f, "VCDN{i}"),
            VNodeId::Cdn(i) => write!(f, "CDN{i}"),
        }
    }
}

/// 虚拟节点名解析失败
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid virtual node name '{0}'")]
pub struct ParseVNodeIdError(pub String);

impl FromStr for VNodeId {
    type Err = ParseVNodeIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseVNodeIdError(s.to_string());
        // 前缀顺序有讲究：VCDN 要先于 CDN 匹配。
        let (ctor, digits): (fn(usize) -> VNodeId, &str) = if let Some(d) = s.strip_prefix("VHG") {
            (VNodeId::Gateway, d)
        } else if let Some(d) = s.strip_prefix("VCDN") {
            (VNodeId::Cache, d)
        } else if let Some(d) = s.strip_prefix("CDN") {
            (VNodeId::Cdn, d)
        } else if let Some(d) = s.strip_prefix('S') {
            (VNodeId::Start, d)
        } else {
            return Err(err());
        };
        let index: usize = digits.parse().map_err(|_| err())?;
        match (ctor(index), index) {
            (VNodeId::Start(_), 0) => Ok(VNodeId::Root),
            (_, 0) => Err(err()),
            (id, _) => Ok(id),
        }
    }
}

impl Serialize for VNodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for VNodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// 虚拟节点及其属性
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VNode {
    Root,
    Start {
        anchor: SubstrateNodeId,
        demand: f64,
    },
    Gateway {
        bandwidth: f64,
        cpu: f64,
    },
    Cache {
        bandwidth: f64,
        cpu: f64,
        ratio: f64,
        delay: f64,
    },
    Cdn {
        anchor: SubstrateNodeId,
        bandwidth: f64,
        ratio: f64,
    },
}

impl VNode {
    /// 节点承载的带宽（Start 即需求带宽，Root 为 0）
    pub fn bandwidth(&self) -> f64 {
        match self {
            VNode::Root => 0.0,
            VNode::Start { demand, .. } => *demand,
            VNode::Gateway { bandwidth, .. }
            | VNode::Cache { bandwidth, .. }
            | VNode::Cdn { bandwidth, .. } => *bandwidth,
        }
    }

    /// 节点需要的 CPU 容量
    pub fn cpu(&self) -> f64 {
        match self {
            VNode::Gateway { cpu, .. } | VNode::Cache { cpu, .. } => *cpu,
            VNode::Root | VNode::Start { .. } | VNode::Cdn { .. } => 0.0,
        }
    }

    /// 流入该节点时乘上的比例；没有配置比例的种类为 1.0
    pub fn ratio(&self) -> f64 {
        match self {
            VNode::Cache { ratio, .. } | VNode::Cdn { ratio, .. } => *ratio,
            _ => 1.0,
        }
    }

    /// 被固定放置的底层节点（Start / Cdn）
    pub fn anchor(&self) -> Option<SubstrateNodeId> {
        match self {
            VNode::Start { anchor, .. } | VNode::Cdn { anchor, .. } => Some(*anchor),
            _ => None,
        }
    }

    pub(crate) fn add_bandwidth(&mut self, amount: f64) {
        match self {
            VNode::Gateway { bandwidth, .. }
            | VNode::Cache { bandwidth, .. }
            | VNode::Cdn { bandwidth, .. } => *bandwidth += amount,
            VNode::Start { demand, .. } => *demand += amount,
            VNode::Root => {}
        }
    }
}
