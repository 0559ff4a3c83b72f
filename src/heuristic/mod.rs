//! 拓扑合成用到的外部能力
//!
//! 聚类与容量计算只以接口形式被合成算法依赖；这里同时提供确定性的内置实现。

mod capacity;
mod cluster;

pub use capacity::{CapacityCalculator, LinearCapacity};
pub use cluster::{HopClusterer, NodeClusterer};
pub(crate) use cluster::check_assignment;
