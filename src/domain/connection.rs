// ==========================================
// 柜内接线导入系统 - 连接与规则模型
// ==========================================
// Connection: 设备/类型内部推断连接（无序端子对，规范序存储）
// RuleTemplate / RuleCatalog: 连接规则目录
// ExternalWire: 跨设备接线（导出行直接产生）
// ==========================================

use crate::domain::terminal::ordered_pair;
use crate::domain::types::ConnectionKind;
use serde::{Deserialize, Serialize};

// ==========================================
// Connection - 内部连接
// ==========================================
// 不变量: terminal_a 按端子自然序不大于 terminal_b
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    pub terminal_a: String,
    pub terminal_b: String,
    pub classification: ConnectionKind,
    pub description: String,
}

impl Connection {
    /// 创建连接（端子对自动规范化，(A,B) 与 (B,A) 结果相同）
    pub fn new(a: &str, b: &str, classification: ConnectionKind, description: &str) -> Self {
        let (first, second) = ordered_pair(a, b);
        Self {
            terminal_a: first.to_string(),
            terminal_b: second.to_string(),
            classification,
            description: description.to_string(),
        }
    }
}

// ==========================================
// RuleTemplate - 连接规则模板
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTemplate {
    pub terminal_a: String,
    pub terminal_b: String,
    pub classification: ConnectionKind,
    pub description: String,
}

impl RuleTemplate {
    pub fn new(a: &str, b: &str, classification: ConnectionKind, description: &str) -> Self {
        Self {
            terminal_a: a.to_string(),
            terminal_b: b.to_string(),
            classification,
            description: description.to_string(),
        }
    }

    /// 自连接规则（两端相同）不产生连接
    pub fn is_self_pair(&self) -> bool {
        self.terminal_a == self.terminal_b
    }

    pub fn to_connection(&self) -> Connection {
        Connection::new(
            &self.terminal_a,
            &self.terminal_b,
            self.classification,
            &self.description,
        )
    }
}

// ==========================================
// RuleCatalog - 有序规则目录
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleCatalog {
    pub rules: Vec<RuleTemplate>,
}

impl RuleCatalog {
    pub fn new(rules: Vec<RuleTemplate>) -> Self {
        Self { rules }
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RuleTemplate> {
        self.rules.iter()
    }
}

// ==========================================
// ExternalWire - 跨设备接线
// ==========================================
// 红线: PE / N 端子不产生跨设备接线
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalWire {
    pub row_number: usize,
    pub wire_number: Option<String>,
    pub source_tag: String,
    pub target_tag: String,
    pub source_device_key: String,
    pub source_terminal: String,
    pub target_device_key: String,
    pub target_terminal: String,
}
