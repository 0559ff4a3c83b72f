//! 接纳驱动
//!
//! 逐个处理待处理 SLA：搜索嵌入、接纳时扣除资源、每一步追加一条审计记录。
//! 底层网络只在这里被修改，且只发生在决策之后。

use std::collections::VecDeque;

use tracing::{debug, info};

use super::config::{AdmissionConfig, SlaOrder};
use super::result::{AdmissionReport, Decision, ResultItem, acceptance_rate};
use super::search::EmbeddingSearch;
use crate::error::AdmissionError;
use crate::sla::{Sla, SlaId};
use crate::substrate::{ResourceLedger, Substrate};

/// 已接纳且带有生命周期的服务
#[derive(Debug, Clone, Copy)]
struct Lease {
    sla: SlaId,
    expires_at: usize,
}

pub struct AdmissionDriver<'a> {
    config: AdmissionConfig,
    search: EmbeddingSearch<'a>,
}

impl<'a> AdmissionDriver<'a> {
    pub fn new(config: AdmissionConfig, search: EmbeddingSearch<'a>) -> Self {
        Self { config, search }
    }

    /// 按配置顺序处理 `slas`，返回完整时间线。
    ///
    /// 拒绝不是错误；只有契约违例（`EmbedError`）与账本错误会提前返回。
    #[tracing::instrument(skip(self, slas, substrate), fields(slas = slas.len(), order = ?self.config.order))]
    pub fn run(&self, slas: Vec<Sla>, substrate: &mut Substrate) -> Result<AdmissionReport, AdmissionError> {
        let mut pending = queue(slas, self.config.order);
        let mut report = AdmissionReport::new(substrate.snapshot());
        let mut leases: Vec<Lease> = Vec::new();
        let mut processed = 0usize;

        info!(pending = pending.len(), "▶️  开始接纳");

        while self.config.should_continue(processed, report.rejected) {
            let next = match self.config.order {
                SlaOrder::Lifo => pending.pop_back(),
                SlaOrder::Fifo | SlaOrder::BandwidthDesc => pending.pop_front(),
            };
            let Some(sla) = next else {
                break;
            };
            processed += 1;
            let step = processed;

            let released = release_expired(&mut leases, step, substrate)?;
            let outcome = self.search.embed(&sla, substrate)?;

            let item = match outcome.best {
                Some(best) => {
                    substrate.consume(&best.topology, &best.mapping)?;
                    report.accepted += 1;
                    if let Some(lifetime) = sla.lifetime() {
                        leases.push(Lease {
                            sla: sla.id(),
                            expires_at: step.saturating_add(lifetime as usize),
                        });
                    }
                    info!(
                        step,
                        sla = %sla.id(),
                        shape = %best.shape,
                        objective = best.mapping.objective,
                        "✅ 接纳"
                    );
                    ResultItem {
                        step,
                        sla: Some(sla.id()),
                        decision: Decision::Accepted,
                        substrate: substrate.snapshot(),
                        accepted: report.accepted,
                        rejected: report.rejected,
                        acceptance_rate: acceptance_rate(report.accepted, report.rejected),
                        service: Some(best.topology),
                        mapping: Some(best.mapping),
                        released,
                        attempts: outcome.attempts,
                    }
                }
                None => {
                    report.rejected += 1;
                    info!(step, sla = %sla.id(), tried = outcome.attempts.len(), "❌ 拒绝");
                    ResultItem {
                        step,
                        sla: Some(sla.id()),
                        decision: Decision::Rejected,
                        substrate: substrate.snapshot(),
                        accepted: report.accepted,
                        rejected: report.rejected,
                        acceptance_rate: acceptance_rate(report.accepted, report.rejected),
                        service: outcome.last_topology,
                        mapping: None,
                        released,
                        attempts: outcome.attempts,
                    }
                }
            };
            report.timeline.push(item);
        }

        info!(
            processed,
            accepted = report.accepted,
            rejected = report.rejected,
            remaining = pending.len(),
            rate = report.acceptance_rate(),
            "🏁 接纳结束"
        );
        Ok(report)
    }
}

/// 按出队顺序整理待处理列表
fn queue(mut slas: Vec<Sla>, order: SlaOrder) -> VecDeque<Sla> {
    if order == SlaOrder::BandwidthDesc {
        // 稳定排序，相同带宽保持到达顺序
        slas.sort_by(|a, b| b.total_bandwidth().total_cmp(&a.total_bandwidth()));
    }
    slas.into()
}

/// 释放在 `step` 之前到期的服务，返回被释放的 SLA（按接纳先后）
fn release_expired(
    leases: &mut Vec<Lease>,
    step: usize,
    substrate: &mut Substrate,
) -> Result<Vec<SlaId>, AdmissionError> {
    let mut released = Vec::new();
    let mut kept = Vec::with_capacity(leases.len());
    for lease in leases.drain(..) {
        if step >= lease.expires_at {
            substrate.release(lease.sla)?;
            debug!(sla = %lease.sla, step, "📬 服务到期，归还资源");
            released.push(lease.sla);
        } else {
            kept.push(lease);
        }
    }
    *leases = kept;
    Ok(released)
}
