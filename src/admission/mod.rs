//! SLA 接纳
//!
//! 形状松弛、单个 SLA 的嵌入搜索、接纳驱动与审计时间线。

// 子模块声明
mod config;
mod driver;
mod relax;
mod result;
mod search;

// 重新导出公共接口
pub use config::{AdmissionConfig, SearchStrategy, SlaOrder};
pub use driver::AdmissionDriver;
pub use relax::{RelaxPolicy, exhaustive_shapes};
pub use result::{AdmissionReport, Decision, ResultItem, acceptance_rate};
pub use search::{Attempt, AttemptOutcome, Candidate, EmbeddingSearch, SearchOutcome, select_best};
