//! 接纳配置
//!
//! 所有字段都有默认值，场景文件中可以只写需要覆盖的部分。

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::relax::RelaxPolicy;
use crate::service::Shape;

/// 待处理 SLA 的出队顺序
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaOrder {
    /// 从待处理列表末尾弹出
    #[default]
    Lifo,
    /// 按到达顺序
    Fifo,
    /// 总带宽大者优先；相同带宽保持到达顺序
    BandwidthDesc,
}

/// 每个 SLA 尝试形状的方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// 从初始形状出发逐步松弛
    #[default]
    Relax,
    /// 遍历所有 `g in 1..=|start|`、`c in 0..=g`
    Exhaustive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdmissionConfig {
    pub initial_gateways: usize,
    pub initial_caches: usize,
    pub relax_gateways: bool,
    pub relax_caches: bool,
    /// 累计拒绝数达到该值后停止；0 表示不启用
    pub rejected_threshold: usize,
    /// 已处理 SLA 数达到该值后停止；0 表示不启用
    pub iteration_threshold: usize,
    pub order: SlaOrder,
    pub strategy: SearchStrategy,
    /// 用同一 SLA 上一个可行映射作为下一个形状的提示
    pub use_hints: bool,
    /// 单次求解的时间预算（毫秒）
    pub solve_budget_ms: Option<u64>,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            initial_gateways: 1,
            initial_caches: 1,
            relax_gateways: true,
            relax_caches: true,
            rejected_threshold: 0,
            iteration_threshold: 0,
            order: SlaOrder::Lifo,
            strategy: SearchStrategy::Relax,
            use_hints: false,
            solve_budget_ms: None,
        }
    }
}

impl AdmissionConfig {
    pub fn initial_shape(&self) -> Shape {
        Shape::new(self.initial_gateways, self.initial_caches)
    }

    pub fn relax_policy(&self) -> RelaxPolicy {
        RelaxPolicy {
            grow_gateways: self.relax_gateways,
            grow_caches: self.relax_caches,
        }
    }

    pub fn solve_budget(&self) -> Option<Duration> {
        self.solve_budget_ms.map(Duration::from_millis)
    }

    /// 根据两个阈值判断是否继续处理下一个 SLA
    pub fn should_continue(&self, processed: usize, rejected: usize) -> bool {
        if self.rejected_threshold == 0 && self.iteration_threshold == 0 {
            return true;
        }
        let by_rejections = self.rejected_threshold > 0 && rejected < self.rejected_threshold;
        let by_iterations = self.iteration_threshold > 0 && processed < self.iteration_threshold;
        by_rejections || by_iterations
    }
}
