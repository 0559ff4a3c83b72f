//! 底层网络模块
//!
//! 容量图（节点 CPU、链路带宽与时延）、跳数路由表、网格构建以及资源账本。

// 子模块声明
mod grid;
mod id;
mod ledger;
mod link;
mod network;
mod node;
mod routing;

// 重新导出公共接口
pub use grid::{GridOpts, GridTopology, build_grid};
pub use id::{LinkId, SubstrateNodeId};
pub use ledger::{Reservation, ResourceLedger};
pub use link::SubstrateLink;
pub use network::{Substrate, SubstrateSnapshot};
pub use node::SubstrateNode;
pub use routing::RoutingTable;
