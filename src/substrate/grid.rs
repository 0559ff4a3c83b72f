//! 网格底层网络构建

use super::id::SubstrateNodeId;
use crate::error::SubstrateError;
use super::network::Substrate;

/// 网格配置选项
#[derive(Debug, Clone)]
pub struct GridOpts {
    pub width: usize,
    pub height: usize,
    pub cpu: f64,
    pub bandwidth: f64,
    pub delay: f64,
    pub cpu_cost: f64,
    pub net_cost: f64,
}

impl Default for GridOpts {
    fn default() -> Self {
        Self {
            width: 5,
            height: 5,
            cpu: 1_000.0,
            bandwidth: 1e9,
            delay: 10.0,
            cpu_cost: 2_000.0,
            net_cost: 20_000.0 / 1e9,
        }
    }
}

/// 网格拓扑的节点索引
#[derive(Debug, Clone)]
pub struct GridTopology {
    pub width: usize,
    pub height: usize,
    pub nodes: Vec<SubstrateNodeId>,
}

impl GridTopology {
    pub fn at(&self, x: usize, y: usize) -> SubstrateNodeId {
        self.nodes[y * self.width + x]
    }
}

/// 构建 `width × height` 网格：节点命名为 `n{x}_{y}`，相邻节点双向连接。
pub fn build_grid(opts: &GridOpts) -> Result<(Substrate, GridTopology), SubstrateError> {
    if opts.width == 0 || opts.height == 0 {
        return Err(SubstrateError::EmptyGrid {
            width: opts.width,
            height: opts.height,
        });
    }

    let mut su = Substrate::new(opts.cpu_cost, opts.net_cost);
    let mut nodes = Vec::with_capacity(opts.width * opts.height);
    for y in 0..opts.height {
        for x in 0..opts.width {
            nodes.push(su.add_node(format!("n{x}_{y}"), opts.cpu));
        }
    }

    let idx = |x: usize, y: usize| nodes[y * opts.width + x];
    for y in 0..opts.height {
        for x in 0..opts.width {
            if x + 1 < opts.width {
                su.connect_pair(idx(x, y), idx(x + 1, y), opts.delay, opts.bandwidth);
            }
            if y + 1 < opts.height {
                su.connect_pair(idx(x, y), idx(x, y + 1), opts.delay, opts.bandwidth);
            }
        }
    }
    su.rebuild_routes();

    let topo = GridTopology {
        width: opts.width,
        height: opts.height,
        nodes,
    };
    Ok((su, topo))
}
