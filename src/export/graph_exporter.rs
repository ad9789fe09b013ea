// ==========================================
// 柜内接线导入系统 - 图数据导出接口
// ==========================================
// 职责: 汇总设备/类型/连接的最终结果，交给图数据加载方
// 节点: 设备、端子、类型；边: 设备-端子、内部连接、外部接线
// ==========================================

use crate::domain::{DeviceRecord, ExternalWire, TypeRecord};
use crate::export::error::ExportResult;
use crate::repository::{DeviceStore, RepositoryResult, TypeStore, WireRepository};
use serde::{Deserialize, Serialize};

/// 导出快照（一次性从各仓储读出）
#[derive(Debug, Clone, Default)]
pub struct GraphSnapshot {
    pub devices: Vec<DeviceRecord>,
    pub types: Vec<TypeRecord>,
    pub wires: Vec<ExternalWire>,
}

impl GraphSnapshot {
    /// 从设备库、类型库与接线仓储读取快照
    pub fn collect<D, T>(
        device_store: &D,
        type_store: &T,
        wire_repo: &WireRepository,
    ) -> RepositoryResult<Self>
    where
        D: DeviceStore + ?Sized,
        T: TypeStore + ?Sized,
    {
        Ok(Self {
            devices: device_store.list()?,
            types: type_store.list()?,
            wires: wire_repo.list()?,
        })
    }
}

/// 导出结果统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportSummary {
    pub devices: usize,
    pub terminals: usize,
    pub types: usize,
    pub inner_connections: usize,
    pub wires: usize,
}

// ==========================================
// GraphExporter Trait
// ==========================================
pub trait GraphExporter: Send + Sync {
    /// 导出快照
    ///
    /// # 返回
    /// 各类节点/边的写出数量
    fn export(&self, snapshot: &GraphSnapshot) -> ExportResult<ExportSummary>;
}

/// 端子节点标识: <device_key>:<terminal>
pub fn terminal_node_id(device_key: &str, terminal: &str) -> String {
    format!("{}:{}", device_key, terminal)
}
