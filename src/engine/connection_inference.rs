// ==========================================
// 柜内接线导入系统 - 内部连接推断引擎
// ==========================================
// 输入: 端子集合 + 规则目录
// 输出: 命中规则的内部连接
//
// 红线:
//   - 两端都在端子集合内才输出（目录里有也不行）
//   - 自连接规则不输出
//   - 同一端子对命中多条不同规则时逐条输出
//   - 完全相同的 (端子对, 分类, 描述) 只输出一次
// 顺序: 按规范端子对自然序，其次按规则在目录中的位置
// ==========================================

use crate::domain::{compare_terminals, Connection, RuleCatalog};
use std::collections::{BTreeSet, HashSet};
use tracing::trace;

/// 推断端子集合的内部连接
///
/// # 参数
/// - terminals: 设备/类型的端子集合（可含重复，大小写敏感）
/// - rules: 规则目录
///
/// # 返回
/// 按规范端子对排序的连接序列，同一输入多次调用结果完全一致
pub fn infer<I, S>(terminals: I, rules: &RuleCatalog) -> Vec<Connection>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let present: BTreeSet<String> = terminals
        .into_iter()
        .map(|t| t.as_ref().to_string())
        .collect();

    if present.len() < 2 || rules.is_empty() {
        return Vec::new();
    }

    // 逐条规则判断两端是否都在集合内，等价于「每个端子对 × 每条规则」
    let mut matched: Vec<(usize, Connection)> = rules
        .iter()
        .enumerate()
        .filter(|(_, rule)| !rule.is_self_pair())
        .filter(|(_, rule)| {
            present.contains(&rule.terminal_a) && present.contains(&rule.terminal_b)
        })
        .map(|(idx, rule)| (idx, rule.to_connection()))
        .collect();

    matched.sort_by(|(li, l), (ri, r)| {
        compare_terminals(&l.terminal_a, &r.terminal_a)
            .then_with(|| compare_terminals(&l.terminal_b, &r.terminal_b))
            .then_with(|| li.cmp(ri))
    });

    let mut seen: HashSet<Connection> = HashSet::new();
    let connections: Vec<Connection> = matched
        .into_iter()
        .filter_map(|(_, conn)| {
            if seen.insert(conn.clone()) {
                Some(conn)
            } else {
                None
            }
        })
        .collect();

    trace!(
        terminal_count = present.len(),
        connection_count = connections.len(),
        "内部连接推断完成"
    );
    connections
}
