//! 拓扑形状：(gateway 数, cache 数)

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Shape {
    pub gateways: usize,
    pub caches: usize,
}

impl Shape {
    pub fn new(gateways: usize, caches: usize) -> Self {
        Self { gateways, caches }
    }

    /// 按 start 锚点数夹紧：`gateways = clamp(gateways, 1, starts)`，`caches <= gateways`。
    pub fn clamped(self, starts: usize) -> Self {
        let gateways = self.gateways.max(1).min(starts.max(1));
        let caches = self.caches.min(gateways);
        Self { gateways, caches }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.gateways, self.caches)
    }
}
