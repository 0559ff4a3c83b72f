//! 单个 SLA 的嵌入搜索
//!
//! 依次为每个形状合成拓扑并求解，收集可行候选，结束后选出目标值最小者
//! （平局取最早尝试的形状，即更小的拓扑）。不可行或超时只意味着该形状没有候选。

use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::{debug, info, warn};

use super::config::{AdmissionConfig, SearchStrategy};
use super::relax::{RelaxPolicy, exhaustive_shapes};
use crate::error::EmbedError;
use crate::service::{ServiceTopology, Shape, TopologyBuilder};
use crate::sla::Sla;
use crate::solver::{Deadline, Mapping, SolveOutcome, Solver};
use crate::substrate::Substrate;

/// 一次形状尝试的结果（写入审计时间线）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum AttemptOutcome {
    Feasible { objective: f64 },
    Infeasible { violations: usize },
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attempt {
    pub shape: Shape,
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
}

/// 可行候选
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub shape: Shape,
    pub topology: ServiceTopology,
    pub mapping: Mapping,
}

/// 搜索结果
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    pub attempts: Vec<Attempt>,
    pub best: Option<Candidate>,
    /// 最后一次尝试的拓扑（拒绝时写入审计记录）
    pub last_topology: Option<ServiceTopology>,
}

impl SearchOutcome {
    pub fn is_accepted(&self) -> bool {
        self.best.is_some()
    }
}

/// 选出目标值最小的候选；平局保留先出现者。
pub fn select_best(candidates: Vec<Candidate>) -> Option<Candidate> {
    let mut best: Option<Candidate> = None;
    for cand in candidates {
        let better = best
            .as_ref()
            .is_none_or(|b| cand.mapping.objective < b.mapping.objective);
        if better {
            best = Some(cand);
        }
    }
    best
}

pub struct EmbeddingSearch<'a> {
    builder: TopologyBuilder<'a>,
    solver: &'a dyn Solver,
    policy: RelaxPolicy,
    initial: Shape,
    strategy: SearchStrategy,
    use_hints: bool,
    solve_budget: Option<Duration>,
}

impl<'a> EmbeddingSearch<'a> {
    pub fn new(builder: TopologyBuilder<'a>, solver: &'a dyn Solver, config: &AdmissionConfig) -> Self {
        Self {
            builder,
            solver,
            policy: config.relax_policy(),
            initial: config.initial_shape(),
            strategy: config.strategy,
            use_hints: config.use_hints,
            solve_budget: config.solve_budget(),
        }
    }

    /// 要尝试的形状序列
    pub fn shapes(&self, starts: usize) -> Vec<Shape> {
        match self.strategy {
            SearchStrategy::Relax => self.policy.walk(self.initial, starts),
            SearchStrategy::Exhaustive => exhaustive_shapes(starts),
        }
    }

    #[tracing::instrument(skip(self, sla, substrate), fields(sla = %sla.id(), starts = sla.start().len()))]
    pub fn embed(&self, sla: &Sla, substrate: &Substrate) -> Result<SearchOutcome, EmbedError> {
        let mut outcome = SearchOutcome::default();
        let mut candidates: Vec<Candidate> = Vec::new();
        let mut hint: Option<Mapping> = None;

        for requested in self.shapes(sla.start().len()) {
            let hint_ref = if self.use_hints { hint.as_ref() } else { None };
            let topology = self.builder.build(
                sla,
                requested.gateways,
                requested.caches,
                substrate,
                hint_ref,
            )?;
            let shape = topology.shape;

            let result = self.solve_bounded(&topology, substrate);
            let attempt = match result {
                SolveOutcome::Feasible(mapping) => {
                    debug!(%shape, objective = mapping.objective, "✅ 形状可行");
                    let objective = mapping.objective;
                    hint = Some(mapping.clone());
                    candidates.push(Candidate {
                        shape,
                        topology: topology.clone(),
                        mapping,
                    });
                    AttemptOutcome::Feasible { objective }
                }
                SolveOutcome::Infeasible { violations } => {
                    debug!(%shape, violations = violations.len(), "❌ 形状不可行");
                    AttemptOutcome::Infeasible {
                        violations: violations.len(),
                    }
                }
                SolveOutcome::TimedOut => {
                    warn!(%shape, "⏱️  求解超时，按不可行处理");
                    AttemptOutcome::TimedOut
                }
            };
            outcome.attempts.push(Attempt { shape, outcome: attempt });
            outcome.last_topology = Some(topology);
        }

        outcome.best = select_best(candidates);
        match &outcome.best {
            Some(best) => info!(
                shape = %best.shape,
                objective = best.mapping.objective,
                tried = outcome.attempts.len(),
                "🏆 选出最优形状"
            ),
            None => info!(tried = outcome.attempts.len(), "没有可行形状"),
        }
        Ok(outcome)
    }

    /// 带预算的求解：求解器自身报告超时，或实际耗时超出预算，都视为超时。
    fn solve_bounded(&self, topology: &ServiceTopology, substrate: &Substrate) -> SolveOutcome {
        let started = Instant::now();
        let result = self
            .solver
            .solve(topology, substrate, Deadline::from_budget(self.solve_budget));
        match self.solve_budget {
            Some(budget) if started.elapsed() > budget => SolveOutcome::TimedOut,
            _ => result,
        }
    }
}
