//! 最短跳数表
//!
//! 为每个 (from, dst) 预计算最短跳数。聚类（按跳数衡量锚点间距离）与
//! 贪心求解器（放置代价估计）都依赖它；具体选路由求解器按剩余带宽另行完成。

use std::collections::{HashMap, VecDeque};

use super::id::SubstrateNodeId;

#[derive(Debug, Default, Clone)]
pub struct RoutingTable {
    dirty: bool,
    /// (from, dst) -> 最短跳数
    hops: HashMap<(SubstrateNodeId, SubstrateNodeId), u32>,
}

impl RoutingTable {
    pub fn new() -> Self {
        Self {
            dirty: true,
            hops: HashMap::new(),
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// 确保跳数表基于当前拓扑是最新的。
    ///
    /// `rev_adj[to]` 为所有能一跳到达 `to` 的前驱节点。
    pub fn ensure_built(&mut self, rev_adj: &[Vec<SubstrateNodeId>]) {
        if !self.dirty {
            return;
        }

        let n = rev_adj.len();
        self.hops.clear();

        // 对每个 dst 在反向图上做 BFS
        let mut dist: Vec<u32> = vec![u32::MAX; n];
        let mut q: VecDeque<SubstrateNodeId> = VecDeque::new();

        for dst_idx in 0..n {
            dist.fill(u32::MAX);
            q.clear();

            let dst = SubstrateNodeId(dst_idx);
            dist[dst_idx] = 0;
            q.push_back(dst);

            while let Some(v) = q.pop_front() {
                let dv = dist[v.0];
                for &pred in &rev_adj[v.0] {
                    if dist[pred.0] == u32::MAX {
                        dist[pred.0] = dv.saturating_add(1);
                        q.push_back(pred);
                    }
                }
            }

            for (from_idx, &df) in dist.iter().enumerate() {
                if df != u32::MAX {
                    self.hops.insert((SubstrateNodeId(from_idx), dst), df);
                }
            }
        }

        self.dirty = false;
    }

    /// 获取 (from, dst) 的最短跳数；不可达返回 None。
    pub fn hops(&self, from: SubstrateNodeId, dst: SubstrateNodeId) -> Option<u32> {
        self.hops.get(&(from, dst)).copied()
    }
}
