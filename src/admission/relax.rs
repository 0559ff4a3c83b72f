//! 形状松弛
//!
//! 先增加 gateway 数（允许时可同时增加 cache 数），gateway 到顶后再单独增加 cache 数。
//! 每一步至少严格增大一维，最多 `|start|` 步终止。

use crate::service::Shape;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelaxPolicy {
    pub grow_gateways: bool,
    pub grow_caches: bool,
}

impl RelaxPolicy {
    /// 下一个形状；None 表示两个维度都无法再增长。
    pub fn next(&self, shape: Shape, starts: usize) -> Option<Shape> {
        if self.grow_gateways && shape.gateways < starts {
            let gateways = shape.gateways + 1;
            let caches = if self.grow_caches && shape.caches < gateways {
                shape.caches + 1
            } else {
                shape.caches
            };
            return Some(Shape::new(gateways, caches));
        }
        if self.grow_caches && shape.caches < shape.gateways.min(starts) {
            return Some(Shape::new(shape.gateways, shape.caches + 1));
        }
        None
    }

    /// 从 `initial`（先夹紧）开始的完整形状序列
    pub fn walk(&self, initial: Shape, starts: usize) -> Vec<Shape> {
        let mut shape = initial.clamped(starts);
        let mut out = vec![shape];
        while let Some(next) = self.next(shape, starts) {
            out.push(next);
            shape = next;
        }
        out
    }
}

/// 穷举形状：`g in 1..=starts`，`c in 0..=g`
pub fn exhaustive_shapes(starts: usize) -> Vec<Shape> {
    (1..=starts.max(1))
        .flat_map(|g| (0..=g).map(move |c| Shape::new(g, c)))
        .collect()
}
