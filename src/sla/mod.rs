//! SLA 请求与场景输入

mod scenario;
#[allow(clippy::module_inception)]
mod sla;

pub use scenario::{
    LinkSpec, NodeSpec, SCHEMA_VERSION, Scenario, ScenarioMeta, ScenarioSpec, SlaSpec, StartSpec,
    SubstrateSpec,
};
pub use sla::{Sla, SlaId, StartAnchor};
