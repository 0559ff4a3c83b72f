use std::cell::RefCell;
use std::collections::BTreeMap;

use crate::error::EmbedError;
use crate::heuristic::NodeClusterer;
use crate::service::{ServiceTopology, Shape};
use crate::sla::{Sla, SlaId, StartAnchor};
use crate::solver::{Deadline, Mapping, SolveOutcome, Solver};
use crate::substrate::{GridOpts, GridTopology, Substrate, SubstrateNodeId, build_grid};

pub fn grid(width: usize, height: usize) -> (Substrate, GridTopology) {
    build_grid(&GridOpts {
        width,
        height,
        ..GridOpts::default()
    })
    .expect("grid")
}

pub fn sla(id: u64, starts: &[(SubstrateNodeId, f64)], cdn: &[SubstrateNodeId], delay: f64) -> Sla {
    let start = starts
        .iter()
        .map(|&(node, bandwidth)| StartAnchor { node, bandwidth })
        .collect();
    Sla::new(SlaId(id), start, cdn.to_vec(), delay).expect("valid sla")
}

/// 按预先给定的结果聚类：`k -> assignment`；未给出的 k 全部归入簇 1
pub struct FixedClusterer {
    pub by_k: BTreeMap<usize, Vec<usize>>,
    pub calls: RefCell<Vec<usize>>,
}

impl FixedClusterer {
    pub fn new(by_k: &[(usize, Vec<usize>)]) -> Self {
        Self {
            by_k: by_k.iter().cloned().collect(),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl NodeClusterer for FixedClusterer {
    fn cluster(
        &self,
        anchors: &[SubstrateNodeId],
        k: usize,
        _substrate: &Substrate,
    ) -> Result<Vec<usize>, EmbedError> {
        self.calls.borrow_mut().push(k);
        Ok(self
            .by_k
            .get(&k)
            .cloned()
            .unwrap_or_else(|| vec![1; anchors.len()]))
    }
}

/// 按形状返回预设目标值；没有预设的形状视为不可行
pub struct ScriptedSolver {
    pub objectives: BTreeMap<Shape, f64>,
    pub seen: RefCell<Vec<(Shape, bool)>>,
}

impl ScriptedSolver {
    pub fn new(objectives: &[(Shape, f64)]) -> Self {
        Self {
            objectives: objectives.iter().copied().collect(),
            seen: RefCell::new(Vec::new()),
        }
    }

    pub fn rejecting() -> Self {
        Self::new(&[])
    }
}

impl Solver for ScriptedSolver {
    fn solve(&self, topo: &ServiceTopology, _substrate: &Substrate, _deadline: Deadline) -> SolveOutcome {
        let hinted = !matches!(topo.hint, crate::service::HintOutcome::NotRequested);
        self.seen.borrow_mut().push((topo.shape, hinted));
        match self.objectives.get(&topo.shape) {
            Some(&objective) => {
                let nodes = topo
                    .nodes()
                    .filter_map(|(id, n)| n.anchor().map(|a| (id, a)))
                    .collect();
                SolveOutcome::Feasible(Mapping::new(nodes, Vec::new(), objective))
            }
            None => SolveOutcome::Infeasible {
                violations: Vec::new(),
            },
        }
    }
}
