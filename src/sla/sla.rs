//! SLA 请求
//!
//! 一次服务请求：有序的 start 锚点（各自带需求带宽）、有序的 CDN 锚点、
//! 时延上限与唯一标识。创建后不可变。

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EmbedError;
use crate::substrate::{Substrate, SubstrateNodeId};

/// SLA 唯一标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlaId(pub u64);

impl fmt::Display for SlaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sla{}", self.0)
    }
}

/// start 锚点：流量起点及其需求带宽
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StartAnchor {
    pub node: SubstrateNodeId,
    pub bandwidth: f64,
}

/// 一次服务请求
#[derive(Debug, Clone, Serialize)]
pub struct Sla {
    id: SlaId,
    start: Vec<StartAnchor>,
    cdn: Vec<SubstrateNodeId>,
    delay: f64,
    max_cdn_to_use: usize,
    lifetime: Option<u64>,
}

impl Sla {
    /// 校验并创建 SLA。
    ///
    /// 至少一个 start 锚点；带宽与时延非负。`max_cdn_to_use` 默认取 CDN 锚点数。
    pub fn new(
        id: SlaId,
        start: Vec<StartAnchor>,
        cdn: Vec<SubstrateNodeId>,
        delay: f64,
    ) -> Result<Self, EmbedError> {
        if start.is_empty() {
            return Err(EmbedError::NoStartAnchors { sla: id });
        }
        if let Some(bad) = start.iter().find(|s| s.bandwidth < 0.0 || s.bandwidth.is_nan()) {
            return Err(EmbedError::NegativeBandwidth {
                sla: id,
                value: bad.bandwidth,
            });
        }
        if delay < 0.0 || delay.is_nan() {
            return Err(EmbedError::NegativeDelay { sla: id, value: delay });
        }
        let max_cdn_to_use = cdn.len();
        Ok(Self {
            id,
            start,
            cdn,
            delay,
            max_cdn_to_use,
            lifetime: None,
        })
    }

    /// 限制可使用的 CDN 锚点数量
    pub fn with_max_cdn_to_use(mut self, max: usize) -> Self {
        self.max_cdn_to_use = max;
        self
    }

    /// 接纳后保持的步数（至少 1）；到期后由接纳驱动释放资源
    pub fn with_lifetime(mut self, steps: u64) -> Result<Self, EmbedError> {
        if steps == 0 {
            return Err(EmbedError::ZeroLifetime { sla: self.id });
        }
        self.lifetime = Some(steps);
        Ok(self)
    }

    /// 确认所有锚点都存在于给定底层网络中
    pub fn check_anchors(&self, substrate: &Substrate) -> Result<(), EmbedError> {
        let anchors = self.start.iter().map(|s| s.node).chain(self.cdn.iter().copied());
        for node in anchors {
            if substrate.node(node).is_none() {
                return Err(EmbedError::UnknownAnchor { sla: self.id, node });
            }
        }
        Ok(())
    }

    pub fn id(&self) -> SlaId {
        self.id
    }

    pub fn start(&self) -> &[StartAnchor] {
        &self.start
    }

    pub fn cdn(&self) -> &[SubstrateNodeId] {
        &self.cdn
    }

    pub fn delay(&self) -> f64 {
        self.delay
    }

    pub fn max_cdn_to_use(&self) -> usize {
        self.max_cdn_to_use
    }

    pub fn lifetime(&self) -> Option<u64> {
        self.lifetime
    }

    /// 所有 start 锚点的需求带宽之和
    pub fn total_bandwidth(&self) -> f64 {
        self.start.iter().map(|s| s.bandwidth).sum()
    }
}
