//! 虚拟服务拓扑
//!
//! 节点/边/时延路由的数据模型，以及由 SLA 合成拓扑的启发式算法。

mod builder;
mod hint;
mod node;
mod route;
mod shape;
mod topology;

pub use builder::{TopologyBuilder, TopologyMode, TopologyParams};
#[cfg(test)]
pub(crate) use builder::{pick_winner, tally_votes};
pub use hint::{HintOutcome, HintSkip};
pub use node::{ParseVNodeIdError, VNode, VNodeId};
pub use route::{DelayRoute, route_key};
pub use shape::Shape;
pub use topology::{ServiceTopology, VEdge};
