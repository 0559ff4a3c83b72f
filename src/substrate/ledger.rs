//! 资源账本
//!
//! 接纳时按映射扣除节点 CPU 与链路带宽，移除/到期时原样归还。
//! `consume` 不是幂等的：对同一服务调用两次会重复占用，调用方负责每次接纳只调用一次。

use tracing::{debug, info};

use super::id::{LinkId, SubstrateNodeId};
use super::network::Substrate;
use crate::error::LedgerError;
use crate::service::ServiceTopology;
use crate::sla::SlaId;
use crate::solver::Mapping;

/// 资源账本接口
pub trait ResourceLedger {
    fn consume(&mut self, service: &ServiceTopology, mapping: &Mapping) -> Result<(), LedgerError>;
    fn release(&mut self, service: SlaId) -> Result<(), LedgerError>;
}

/// 一次 `consume` 的预留记录
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reservation {
    pub cpu: Vec<(SubstrateNodeId, f64)>,
    pub bandwidth: Vec<(LinkId, f64)>,
}

impl Substrate {
    /// 根据拓扑需求与映射计算预留；映射不完整或引用了不存在的元素时报错。
    fn plan_reservation(
        &self,
        service: &ServiceTopology,
        mapping: &Mapping,
    ) -> Result<Reservation, LedgerError> {
        let mut reservation = Reservation::default();

        for (id, node) in service.nodes() {
            let cpu = node.cpu();
            if cpu <= 0.0 {
                continue;
            }
            let at = mapping.node(id).ok_or(LedgerError::UnmappedNode(id))?;
            if self.node(at).is_none() {
                return Err(LedgerError::UnknownNode(at));
            }
            reservation.cpu.push((at, cpu));
        }

        for (from, to, edge) in service.edges() {
            if edge.bandwidth <= 0.0 {
                continue;
            }
            let path = mapping
                .edge_path(from, to)
                .ok_or(LedgerError::UnmappedEdge(from, to))?;
            let links = self
                .path_links(path)
                .ok_or(LedgerError::BrokenPath { from, to })?;
            for link in links {
                reservation.bandwidth.push((link, edge.bandwidth));
            }
        }

        Ok(reservation)
    }

    fn apply(&mut self, reservation: &Reservation, sign: f64) -> Result<(), LedgerError> {
        for &(node, cpu) in &reservation.cpu {
            let n = self.node_mut(node).ok_or(LedgerError::UnknownNode(node))?;
            n.used_cpu += sign * cpu;
        }
        for &(link, bw) in &reservation.bandwidth {
            let l = self.link_mut(link).ok_or(LedgerError::UnknownLink(link))?;
            l.used_bandwidth += sign * bw;
        }
        Ok(())
    }
}

impl ResourceLedger for Substrate {
    #[tracing::instrument(skip(self, service, mapping), fields(sla = %service.sla_id))]
    fn consume(&mut self, service: &ServiceTopology, mapping: &Mapping) -> Result<(), LedgerError> {
        let reservation = self.plan_reservation(service, mapping)?;
        self.apply(&reservation, 1.0)?;
        debug!(
            cpu_items = reservation.cpu.len(),
            link_items = reservation.bandwidth.len(),
            "扣除资源"
        );
        self.reservations
            .entry(service.sla_id)
            .or_default()
            .push(reservation);
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    fn release(&mut self, service: SlaId) -> Result<(), LedgerError> {
        let reservations = self
            .reservations
            .remove(&service)
            .ok_or(LedgerError::UnknownService(service))?;
        for reservation in &reservations {
            self.apply(reservation, -1.0)?;
        }
        info!(count = reservations.len(), "♻️  释放服务资源");
        Ok(())
    }
}
