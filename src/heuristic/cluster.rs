//! 锚点聚类：把一组需求锚点划分成 k 组
//!
//! 返回与输入顺序对齐的簇编号（取值 `[1, k]`）。对相同输入必须确定，
//! 拓扑合成的可复现性依赖于此。

use tracing::trace;

use crate::error::EmbedError;
use crate::substrate::{Substrate, SubstrateNodeId};

/// 外部聚类能力
pub trait NodeClusterer {
    fn cluster(
        &self,
        anchors: &[SubstrateNodeId],
        k: usize,
        substrate: &Substrate,
    ) -> Result<Vec<usize>, EmbedError>;
}

/// 按底层跳数聚类。
///
/// 种子按最远点策略选取（第一个锚点为首个种子，平局取靠前者），
/// 其余锚点归入最近的种子，平局归入编号更小的簇。不可达视为无穷远。
#[derive(Debug, Default, Clone, Copy)]
pub struct HopClusterer;

impl HopClusterer {
    fn distance(substrate: &Substrate, a: SubstrateNodeId, b: SubstrateNodeId) -> u64 {
        substrate.hops(a, b).map(u64::from).unwrap_or(u64::MAX)
    }
}

impl NodeClusterer for HopClusterer {
    fn cluster(
        &self,
        anchors: &[SubstrateNodeId],
        k: usize,
        substrate: &Substrate,
    ) -> Result<Vec<usize>, EmbedError> {
        if anchors.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        let k = k.min(anchors.len());

        // 种子是锚点下标
        let mut seeds: Vec<usize> = vec![0];
        while seeds.len() < k {
            let mut best: Option<(usize, u64)> = None;
            for (idx, &node) in anchors.iter().enumerate() {
                if seeds.contains(&idx) {
                    continue;
                }
                let nearest = seeds
                    .iter()
                    .map(|&s| Self::distance(substrate, anchors[s], node))
                    .min()
                    .unwrap_or(u64::MAX);
                if best.is_none_or(|(_, d)| nearest > d) {
                    best = Some((idx, nearest));
                }
            }
            match best {
                Some((idx, _)) => seeds.push(idx),
                None => break,
            }
        }

        let assignment = anchors
            .iter()
            .enumerate()
            .map(|(idx, &node)| {
                if let Some(pos) = seeds.iter().position(|&s| s == idx) {
                    return pos + 1;
                }
                let mut best_cluster = 1;
                let mut best_dist = u64::MAX;
                for (pos, &s) in seeds.iter().enumerate() {
                    let d = Self::distance(substrate, anchors[s], node);
                    if d < best_dist {
                        best_dist = d;
                        best_cluster = pos + 1;
                    }
                }
                best_cluster
            })
            .collect::<Vec<_>>();

        trace!(k, ?assignment, "锚点聚类完成");
        Ok(assignment)
    }
}

/// 校验聚类结果满足契约：长度与输入一致，编号落在 `[1, k]`。
pub(crate) fn check_assignment(
    assignment: &[usize],
    expected: usize,
    k: usize,
) -> Result<(), EmbedError> {
    if assignment.len() != expected {
        return Err(EmbedError::ClusterCount {
            expected,
            got: assignment.len(),
        });
    }
    if let Some(&cluster) = assignment.iter().find(|&&c| c == 0 || c > k) {
        return Err(EmbedError::ClusterOutOfRange { cluster, k });
    }
    Ok(())
}
