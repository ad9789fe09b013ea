// ==========================================
// 柜内接线导入系统 - 设备领域模型
// ==========================================
// DeviceIdentifier: 一次解析产出的不可变标签结构
// DeviceRecord: 一个物理设备实例（端子集合跨行累积）
// ==========================================

use crate::domain::connection::Connection;
use crate::domain::types::VertexRole;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

// ==========================================
// DeviceIdentifier - 设备标签解析结果
// ==========================================
// 格式: =FUNCTION+LOCATION-DEVICE:TERMINAL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceIdentifier {
    pub raw: String,      // 原始标签
    pub function: String, // = 与 + 之间
    pub location: String, // + 与 - 之间
    pub device: String,   // - 与 : 之间
    pub terminal: String, // : 之后（缺省 "1"）
}

impl DeviceIdentifier {
    /// 设备外部标识（不含端子）
    ///
    /// - 功能或位置非空: `=F+L-D`
    /// - 否则: 裸设备名
    pub fn device_key(&self) -> String {
        if self.function.is_empty() && self.location.is_empty() {
            self.device.clone()
        } else {
            format!("={}+{}-{}", self.function, self.location, self.device)
        }
    }

    /// 设备段是否为空（无法作为接线端点）
    pub fn has_device(&self) -> bool {
        !self.device.is_empty()
    }
}

// ==========================================
// DeviceRecord - 设备实例
// ==========================================
// 红线: 端子数 < 2 的设备不参与类型分配，并从设备库删除
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub device_key: String,
    pub project_number: String,
    pub function: String,
    pub location: String,
    pub device: String,
    pub role: VertexRole,
    pub terminals: BTreeSet<String>,
    pub type_label: Option<String>,
    pub inner_connections: Vec<Connection>,
}

impl DeviceRecord {
    /// 首次观测到设备时创建记录
    pub fn from_identifier(id: &DeviceIdentifier, project_number: &str, role: VertexRole) -> Self {
        Self {
            device_key: id.device_key(),
            project_number: project_number.to_string(),
            function: id.function.clone(),
            location: id.location.clone(),
            device: id.device.clone(),
            role,
            terminals: BTreeSet::new(),
            type_label: None,
            inner_connections: Vec::new(),
        }
    }

    /// 记录一次端子观测
    ///
    /// # 返回
    /// - true: 新端子
    /// - false: 已存在或为空
    pub fn observe_terminal(&mut self, terminal: &str) -> bool {
        if terminal.is_empty() {
            return false;
        }
        self.terminals.insert(terminal.to_string())
    }

    /// 合并设备库中已存的端子
    pub fn merge_terminals<'a, I>(&mut self, terminals: I) -> usize
    where
        I: IntoIterator<Item = &'a String>,
    {
        let before = self.terminals.len();
        for t in terminals {
            if !t.is_empty() {
                self.terminals.insert(t.clone());
            }
        }
        self.terminals.len() - before
    }

    /// 是否满足最小端子数
    pub fn meets_terminal_minimum(&self, min_terminal_count: usize) -> bool {
        self.terminals.len() >= min_terminal_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identifier(function: &str, location: &str, device: &str, terminal: &str) -> DeviceIdentifier {
        DeviceIdentifier {
            raw: String::new(),
            function: function.to_string(),
            location: location.to_string(),
            device: device.to_string(),
            terminal: terminal.to_string(),
        }
    }

    #[test]
    fn test_device_key_full_and_bare() {
        assert_eq!(identifier("K1", "PANEL", "X1", "13").device_key(), "=K1+PANEL-X1");
        assert_eq!(identifier("", "", "X1", "1").device_key(), "X1");
        assert_eq!(identifier("", "K1.2", "Q1", "1").device_key(), "=+K1.2-Q1");
    }

    #[test]
    fn test_observe_terminal_accumulates() {
        let id = identifier("F", "L", "K5", "A1");
        let mut record = DeviceRecord::from_identifier(&id, "P001", VertexRole::Panel);

        assert!(record.observe_terminal("A1"));
        assert!(!record.observe_terminal("A1"));
        assert!(!record.observe_terminal(""));
        assert!(record.observe_terminal("A2"));

        assert_eq!(record.terminals.len(), 2);
        assert!(record.meets_terminal_minimum(2));
        assert!(!record.meets_terminal_minimum(3));
    }

    #[test]
    fn test_merge_terminals_counts_new_only() {
        let id = identifier("F", "L", "K5", "13");
        let mut record = DeviceRecord::from_identifier(&id, "P001", VertexRole::Panel);
        record.observe_terminal("13");

        let stored = vec!["13".to_string(), "14".to_string()];
        assert_eq!(record.merge_terminals(&stored), 1);
        assert_eq!(record.terminals.len(), 2);
    }
}
