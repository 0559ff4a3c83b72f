//! 场景文件
//!
//! JSON 描述的一次仿真输入：底层网络、接纳配置、拓扑参数与按到达顺序排列的 SLA。

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::sla::{Sla, SlaId, StartAnchor};
use crate::admission::AdmissionConfig;
use crate::error::ScenarioError;
use crate::service::TopologyParams;
use crate::substrate::{GridOpts, Substrate, SubstrateNodeId, build_grid};

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub schema_version: u32,
    #[serde(default)]
    pub meta: Option<ScenarioMeta>,
    pub substrate: SubstrateSpec,
    #[serde(default)]
    pub admission: AdmissionConfig,
    #[serde(default)]
    pub topology: TopologyParams,
    #[serde(default)]
    pub slas: Vec<SlaSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioMeta {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubstrateSpec {
    Grid {
        width: usize,
        height: usize,
        #[serde(default)]
        cpu: Option<f64>,
        #[serde(default)]
        bandwidth: Option<f64>,
        #[serde(default)]
        delay: Option<f64>,
        #[serde(default)]
        cpu_cost: Option<f64>,
        #[serde(default)]
        net_cost: Option<f64>,
    },
    Explicit {
        #[serde(default)]
        cpu_cost: Option<f64>,
        #[serde(default)]
        net_cost: Option<f64>,
        nodes: Vec<NodeSpec>,
        #[serde(default)]
        links: Vec<LinkSpec>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    pub cpu: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkSpec {
    pub from: String,
    pub to: String,
    pub bandwidth: f64,
    #[serde(default)]
    pub delay: f64,
    /// 默认创建两条对称的单向链路
    #[serde(default = "default_true")]
    pub bidirectional: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartSpec {
    pub node: String,
    pub bandwidth: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlaSpec {
    pub id: u64,
    pub start: Vec<StartSpec>,
    #[serde(default)]
    pub cdn: Vec<String>,
    pub delay: f64,
    #[serde(default)]
    pub max_cdn_to_use: Option<usize>,
    #[serde(default)]
    pub lifetime: Option<u64>,
}

/// 解析完成、可直接运行的场景
#[derive(Debug, Clone)]
pub struct Scenario {
    pub substrate: Substrate,
    pub slas: Vec<Sla>,
    pub admission: AdmissionConfig,
    pub topology: TopologyParams,
}

impl ScenarioSpec {
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let raw = fs::read_to_string(path)?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self, ScenarioError> {
        let spec: ScenarioSpec = serde_json::from_str(raw)?;
        if spec.schema_version != SCHEMA_VERSION {
            return Err(ScenarioError::SchemaVersion(spec.schema_version));
        }
        Ok(spec)
    }

    pub fn build_substrate(&self) -> Result<Substrate, ScenarioError> {
        match &self.substrate {
            SubstrateSpec::Grid {
                width,
                height,
                cpu,
                bandwidth,
                delay,
                cpu_cost,
                net_cost,
            } => {
                let defaults = GridOpts::default();
                let opts = GridOpts {
                    width: *width,
                    height: *height,
                    cpu: cpu.unwrap_or(defaults.cpu),
                    bandwidth: bandwidth.unwrap_or(defaults.bandwidth),
                    delay: delay.unwrap_or(defaults.delay),
                    cpu_cost: cpu_cost.unwrap_or(defaults.cpu_cost),
                    net_cost: net_cost.unwrap_or(defaults.net_cost),
                };
                if opts.cpu < 0.0 || opts.bandwidth < 0.0 || opts.delay < 0.0 {
                    return Err(ScenarioError::Invalid("grid capacities must be non-negative".into()));
                }
                Ok(build_grid(&opts)?.0)
            }
            SubstrateSpec::Explicit {
                cpu_cost,
                net_cost,
                nodes,
                links,
            } => {
                let mut su = Substrate::new(cpu_cost.unwrap_or(1.0), net_cost.unwrap_or(1.0));
                let mut seen = HashSet::new();
                for node in nodes {
                    if !seen.insert(node.name.as_str()) {
                        return Err(ScenarioError::Invalid(format!("duplicate node '{}'", node.name)));
                    }
                    if node.cpu < 0.0 {
                        return Err(ScenarioError::Invalid(format!(
                            "node '{}' has negative cpu {}",
                            node.name, node.cpu
                        )));
                    }
                    su.add_node(node.name.clone(), node.cpu);
                }
                for link in links {
                    let from = lookup(&su, &link.from)?;
                    let to = lookup(&su, &link.to)?;
                    if link.bandwidth < 0.0 || link.delay < 0.0 {
                        return Err(ScenarioError::Invalid(format!(
                            "link {}->{} has negative capacity",
                            link.from, link.to
                        )));
                    }
                    if link.bidirectional {
                        su.connect_pair(from, to, link.delay, link.bandwidth);
                    } else {
                        su.connect(from, to, link.delay, link.bandwidth);
                    }
                }
                su.rebuild_routes();
                Ok(su)
            }
        }
    }

    pub fn build_slas(&self, substrate: &Substrate) -> Result<Vec<Sla>, ScenarioError> {
        let mut ids = HashSet::new();
        let mut out = Vec::with_capacity(self.slas.len());
        for spec in &self.slas {
            if !ids.insert(spec.id) {
                return Err(ScenarioError::Invalid(format!("duplicate SLA id {}", spec.id)));
            }
            let start = spec
                .start
                .iter()
                .map(|s| {
                    Ok(StartAnchor {
                        node: lookup(substrate, &s.node)?,
                        bandwidth: s.bandwidth,
                    })
                })
                .collect::<Result<Vec<_>, ScenarioError>>()?;
            let cdn = spec
                .cdn
                .iter()
                .map(|name| lookup(substrate, name))
                .collect::<Result<Vec<_>, ScenarioError>>()?;

            let mut sla = Sla::new(SlaId(spec.id), start, cdn, spec.delay)?;
            if let Some(max) = spec.max_cdn_to_use {
                sla = sla.with_max_cdn_to_use(max);
            }
            if let Some(steps) = spec.lifetime {
                sla = sla.with_lifetime(steps)?;
            }
            out.push(sla);
        }
        Ok(out)
    }

    pub fn into_scenario(self) -> Result<Scenario, ScenarioError> {
        let substrate = self.build_substrate()?;
        let slas = self.build_slas(&substrate)?;
        let name = self.meta.as_ref().and_then(|m| m.name.as_deref()).unwrap_or("unnamed");
        info!(
            scenario = name,
            nodes = substrate.nodes().len(),
            links = substrate.links().len(),
            slas = slas.len(),
            "📦 场景加载完成"
        );
        Ok(Scenario {
            substrate,
            slas,
            admission: self.admission,
            topology: self.topology,
        })
    }
}

fn lookup(substrate: &Substrate, name: &str) -> Result<SubstrateNodeId, ScenarioError> {
    substrate
        .node_by_name(name)
        .ok_or_else(|| ScenarioError::Invalid(format!("unknown substrate node '{name}'")))
}
