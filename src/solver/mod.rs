//! 放置求解
//!
//! 求解器把虚拟拓扑放到底层网络上：成功时给出映射（含目标值），
//! 否则报告不可行或超时。调用边界带有协作式截止时间，超时一律按不可行处理。

mod exchange;
mod greedy;
mod mapping;

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::service::{ServiceTopology, VNodeId};
use crate::substrate::Substrate;

pub use exchange::SolverExchange;
pub use greedy::GreedySolver;
pub use mapping::{EdgePlacement, Mapping};

/// 外部求解能力
pub trait Solver {
    fn solve(&self, topo: &ServiceTopology, substrate: &Substrate, deadline: Deadline) -> SolveOutcome;
}

/// 求解结果
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    Feasible(Mapping),
    Infeasible { violations: Vec<Violation> },
    TimedOut,
}

impl SolveOutcome {
    pub fn into_mapping(self) -> Option<Mapping> {
        match self {
            SolveOutcome::Feasible(m) => Some(m),
            _ => None,
        }
    }
}

/// 被违反的约束（仅供诊断，核心流程不据此行动）
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    NodeCpu { vnode: VNodeId, cpu: f64 },
    EdgeBandwidth { from: VNodeId, to: VNodeId, bandwidth: f64 },
    Delay { route: String, delay: f64, bound: f64 },
    CdnCap { used: usize, max: usize },
}

/// 求解截止时间
#[derive(Debug, Clone, Copy, Default)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// 不设截止
    pub fn none() -> Self {
        Self(None)
    }

    pub fn after(budget: Duration) -> Self {
        Self(Some(Instant::now() + budget))
    }

    pub fn from_budget(budget: Option<Duration>) -> Self {
        budget.map(Self::after).unwrap_or_default()
    }

    pub fn expired(&self) -> bool {
        self.0.is_some_and(|at| Instant::now() >= at)
    }
}
