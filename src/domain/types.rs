// ==========================================
// 柜内接线导入系统 - 领域类型定义
// ==========================================
// 职责: 连接分类、节点角色等枚举
// 序列化格式: snake_case (与规则文件/导出文件一致)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 连接分类 (Connection Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionKind {
    CoilConnection,    // 线圈连接 (A1-A2)
    ContactConnection, // 触点组连接 (13-14 等)
    Unclassified,      // 未分类
}

impl ConnectionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConnectionKind::CoilConnection => "coil_connection",
            ConnectionKind::ContactConnection => "contact_connection",
            ConnectionKind::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for ConnectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ==========================================
// 节点角色 (Vertex Role)
// ==========================================
// 判定顺序: PLC(设备名以 A 开头) > 柜内(位置前缀匹配) > 现场
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VertexRole {
    Plc,   // PLC 模块
    Panel, // 柜内设备
    Field, // 现场设备
}

impl VertexRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            VertexRole::Plc => "plc",
            VertexRole::Panel => "panel",
            VertexRole::Field => "field",
        }
    }

    /// 从数据库文本还原（未知值按现场设备处理）
    pub fn from_db_str(raw: &str) -> Self {
        match raw.trim() {
            "plc" => VertexRole::Plc,
            "panel" => VertexRole::Panel,
            _ => VertexRole::Field,
        }
    }
}

impl fmt::Display for VertexRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
