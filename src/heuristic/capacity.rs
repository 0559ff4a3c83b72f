//! 容量计算：聚合带宽 -> 所需计算容量
//!
//! 设计上假设单调，但不强制。

/// 外部容量计算能力
pub trait CapacityCalculator {
    fn capacity_for(&self, bandwidth: f64) -> f64;
}

impl<F> CapacityCalculator for F
where
    F: Fn(f64) -> f64,
{
    fn capacity_for(&self, bandwidth: f64) -> f64 {
        self(bandwidth)
    }
}

/// 线性容量模型：`base + per_unit * bandwidth`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearCapacity {
    pub base: f64,
    pub per_unit: f64,
}

impl LinearCapacity {
    pub fn new(base: f64, per_unit: f64) -> Self {
        Self { base, per_unit }
    }
}

impl CapacityCalculator for LinearCapacity {
    fn capacity_for(&self, bandwidth: f64) -> f64 {
        self.base + self.per_unit * bandwidth
    }
}
