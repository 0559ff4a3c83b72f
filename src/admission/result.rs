//! 审计时间线
//!
//! 每个接纳步骤一条记录，只追加。

use serde::Serialize;

use super::search::Attempt;
use crate::service::ServiceTopology;
use crate::sla::SlaId;
use crate::solver::Mapping;
use crate::substrate::SubstrateSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// 时间线起点：处理任何 SLA 之前的底层网络
    Initial,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultItem {
    pub step: usize,
    pub sla: Option<SlaId>,
    pub decision: Decision,
    pub substrate: SubstrateSnapshot,
    pub accepted: usize,
    pub rejected: usize,
    /// 记录时刻的滚动接纳率
    pub acceptance_rate: f64,
    pub service: Option<ServiceTopology>,
    pub mapping: Option<Mapping>,
    /// 本步开始前因到期而释放的服务
    pub released: Vec<SlaId>,
    pub attempts: Vec<Attempt>,
}

/// `accepted / (accepted + rejected)`；尚无决策时为 0
pub fn acceptance_rate(accepted: usize, rejected: usize) -> f64 {
    let total = accepted + rejected;
    if total == 0 {
        0.0
    } else {
        accepted as f64 / total as f64
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AdmissionReport {
    pub timeline: Vec<ResultItem>,
    pub accepted: usize,
    pub rejected: usize,
}

impl AdmissionReport {
    pub(crate) fn new(initial: SubstrateSnapshot) -> Self {
        Self {
            timeline: vec![ResultItem {
                step: 0,
                sla: None,
                decision: Decision::Initial,
                substrate: initial,
                accepted: 0,
                rejected: 0,
                acceptance_rate: 0.0,
                service: None,
                mapping: None,
                released: Vec::new(),
                attempts: Vec::new(),
            }],
            accepted: 0,
            rejected: 0,
        }
    }

    pub fn acceptance_rate(&self) -> f64 {
        acceptance_rate(self.accepted, self.rejected)
    }

    /// 每个决策一个字符：接纳 `O`，拒绝 `X`
    pub fn trace(&self) -> String {
        self.timeline
            .iter()
            .filter_map(|item| match item.decision {
                Decision::Accepted => Some('O'),
                Decision::Rejected => Some('X'),
                Decision::Initial => None,
            })
            .collect()
    }
}
