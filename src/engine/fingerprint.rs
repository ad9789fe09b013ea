// ==========================================
// 柜内接线导入系统 - 端子集合规范化（类型指纹）
// ==========================================
// 算法: 去重（大小写敏感） → 自然序排序 → JSON 字符串数组
// 红线: 同一集合的任意排列/重复输入必须得到逐字节相同的指纹
// 空集合: "[]"
// ==========================================

use crate::domain::sort_terminals;

/// 空集合指纹
pub const EMPTY_FINGERPRINT: &str = "[]";

/// 计算端子集合的规范指纹
pub fn canonicalize<I, S>(terminals: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut ordered: Vec<String> = terminals
        .into_iter()
        .map(|t| t.as_ref().to_string())
        .collect();
    sort_terminals(&mut ordered);

    if ordered.is_empty() {
        return EMPTY_FINGERPRINT.to_string();
    }

    // Vec<String> 的 JSON 序列化不会失败
    serde_json::to_string(&ordered).unwrap_or_else(|_| EMPTY_FINGERPRINT.to_string())
}

/// 从指纹还原端子列表（已按自然序排列）
pub fn decode(fingerprint: &str) -> Result<Vec<String>, serde_json::Error> {
    serde_json::from_str(fingerprint)
}
