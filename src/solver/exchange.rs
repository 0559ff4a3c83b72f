//! 求解器交换文件
//!
//! 面向外部求解器的空白分隔记录：节点容量、边带宽、时延路径与路由分段、
//! 锚点固定、CDN 上限，以及底层网络的剩余容量。进程内求解不需要它们，
//! 这里用于导出与排查。

use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::Path;

use tracing::info;

use crate::service::{ServiceTopology, VNode};
use crate::substrate::{Substrate, SubstrateNodeId};

pub struct SolverExchange<'a> {
    topo: &'a ServiceTopology,
    substrate: &'a Substrate,
}

impl<'a> SolverExchange<'a> {
    pub fn new(topo: &'a ServiceTopology, substrate: &'a Substrate) -> Self {
        Self { topo, substrate }
    }

    fn node_name(&self, id: SubstrateNodeId) -> String {
        self.substrate
            .node(id)
            .map(|n| n.name.clone())
            .unwrap_or_else(|| format!("#{}", id.0))
    }

    /// `<nodeId> <cpu>`
    pub fn service_nodes(&self) -> String {
        let mut out = String::new();
        for (id, node) in self.topo.nodes() {
            let _ = writeln!(out, "{id} {:e}", node.cpu());
        }
        out
    }

    /// `<from> <to> <bandwidth>`
    pub fn service_edges(&self) -> String {
        let mut out = String::new();
        for (from, to, edge) in self.topo.edges() {
            let _ = writeln!(out, "{from} {to} {:e}", edge.bandwidth);
        }
        out
    }

    /// `<routeKey> <delayBound>`
    pub fn delay_paths(&self) -> String {
        let mut out = String::new();
        for route in self.topo.routes() {
            let _ = writeln!(out, "{} {:e}", route.key, route.delay);
        }
        out
    }

    /// `<routeKey> <from> <to>`，每个分段一行
    pub fn delay_routes(&self) -> String {
        let mut out = String::new();
        for route in self.topo.routes() {
            for (from, to) in route.segments() {
                let _ = writeln!(out, "{} {from} {to}", route.key);
            }
        }
        out
    }

    /// Start 节点的固定位置：`<nodeId> <substrateNode>`
    pub fn starters(&self) -> String {
        let mut out = String::new();
        for (id, node) in self.topo.nodes() {
            if let VNode::Start { anchor, .. } = node {
                let _ = writeln!(out, "{id} {}", self.node_name(*anchor));
            }
        }
        out
    }

    /// CDN 锚点的固定位置：`<nodeId> <substrateNode>`
    pub fn cdn_anchors(&self) -> String {
        let mut out = String::new();
        for (id, node) in self.topo.nodes() {
            if let VNode::Cdn { anchor, .. } = node {
                let _ = writeln!(out, "{id} {}", self.node_name(*anchor));
            }
        }
        out
    }

    pub fn cdn_max(&self) -> String {
        format!("{}", self.topo.max_cdn_to_use)
    }

    /// 底层节点剩余 CPU：`<node> <cpu>`
    pub fn substrate_nodes(&self) -> String {
        let mut out = String::new();
        for node in self.substrate.nodes() {
            let _ = writeln!(out, "{} {:e}", node.name, node.residual_cpu());
        }
        out
    }

    /// 底层链路剩余带宽与时延：`<from> <to> <bandwidth> <delay>`
    pub fn substrate_edges(&self) -> String {
        let mut out = String::new();
        for link in self.substrate.links() {
            let _ = writeln!(
                out,
                "{} {} {:e} {:e}",
                self.node_name(link.from),
                self.node_name(link.to),
                link.residual_bandwidth(),
                link.delay
            );
        }
        out
    }

    /// 把全部记录写入目录（覆盖已有文件）
    pub fn write_to(&self, dir: &Path) -> io::Result<()> {
        fs::create_dir_all(dir)?;
        let files = [
            ("service.nodes.data", self.service_nodes()),
            ("service.edges.data", self.service_edges()),
            ("service.path.delay.data", self.delay_paths()),
            ("service.path.data", self.delay_routes()),
            ("starters.nodes.data", self.starters()),
            ("CDN.nodes.data", self.cdn_anchors()),
            ("cdnmax.data", self.cdn_max()),
            ("substrate.nodes.data", self.substrate_nodes()),
            ("substrate.edges.data", self.substrate_edges()),
        ];
        for (name, contents) in files {
            fs::write(dir.join(name), contents)?;
        }
        info!(dir = %dir.display(), sla = %self.topo.sla_id, "📝 已写出求解器交换文件");
        Ok(())
    }
}
