//! 标识符类型
//!
//! 定义底层网络节点和链路的唯一标识符。

use serde::{Deserialize, Serialize};

/// 底层网络节点标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubstrateNodeId(pub usize);

/// 底层网络链路标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(pub usize);
