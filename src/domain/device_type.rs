// ==========================================
// 柜内接线导入系统 - 设备类型模型
// ==========================================
// 红线: fingerprint ↔ type_label 为双射
// 标签按 TYPE<序号> 顺序生成，序号永不复用
// ==========================================

use crate::domain::connection::Connection;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 类型标签前缀
pub const TYPE_LABEL_PREFIX: &str = "TYPE";

// ==========================================
// TypeRecord - 设备类型（规范电气外形）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeRecord {
    pub type_label: String,
    pub fingerprint: String,
    pub terminal_count: usize,
    pub inner_connections: Vec<Connection>,
    pub created_at: DateTime<Utc>,
}

/// 生成类型标签 `TYPE<n>`
pub fn format_type_label(suffix: u64) -> String {
    format!("{}{}", TYPE_LABEL_PREFIX, suffix)
}

/// 解析 `TYPE<digits>` 标签的数字后缀，其他格式返回 None
pub fn parse_type_label_suffix(label: &str) -> Option<u64> {
    let digits = label.strip_prefix(TYPE_LABEL_PREFIX)?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u64>().ok()
}
