// ==========================================
// 柜内接线导入系统 - 规则目录自举
// ==========================================
// 无规则目录时，从已知类型的端子集合推导初版目录:
//   - {A1, A2} 同时出现            → 线圈连接
//   - 两个双字符端子首字符为同一数字 → 触点组<数字>连接
//   - 其余端子对不提出（保守策略，不标记为未分类）
// 各类型的候选对合并后按端子对去重
// 产出供人工审阅后写入规则文件，不在每次导入中执行
// ==========================================

use crate::domain::{compare_terminals, ordered_pair, ConnectionKind, RuleCatalog, RuleTemplate};
use crate::engine::pair_classifier::{contact_group_description, COIL_DESCRIPTION};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::info;

fn is_contact_candidate(terminal: &str) -> Option<char> {
    let mut chars = terminal.chars();
    let first = chars.next()?;
    let _second = chars.next()?;
    if chars.next().is_some() || !first.is_ascii_digit() {
        return None;
    }
    Some(first)
}

fn propose_for_type(terminals: &BTreeSet<String>, out: &mut Vec<RuleTemplate>) {
    if terminals.contains("A1") && terminals.contains("A2") {
        out.push(RuleTemplate::new(
            "A1",
            "A2",
            ConnectionKind::CoilConnection,
            COIL_DESCRIPTION,
        ));
    }

    let contacts: Vec<(&str, char)> = terminals
        .iter()
        .filter_map(|t| is_contact_candidate(t).map(|d| (t.as_str(), d)))
        .collect();

    for (i, (a, da)) in contacts.iter().enumerate() {
        for (b, db) in contacts.iter().skip(i + 1) {
            if da == db {
                let (first, second) = ordered_pair(a, b);
                out.push(RuleTemplate::new(
                    first,
                    second,
                    ConnectionKind::ContactConnection,
                    &contact_group_description(&da.to_string()),
                ));
            }
        }
    }
}

/// 从「类型标签 → 端子集合」推导规则目录
///
/// # 返回
/// 按端子对自然序排列、按端子对去重的规则目录
pub fn bootstrap(type_terminal_sets: &BTreeMap<String, BTreeSet<String>>) -> RuleCatalog {
    let mut proposed: Vec<RuleTemplate> = Vec::new();
    for terminals in type_terminal_sets.values() {
        propose_for_type(terminals, &mut proposed);
    }

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut rules: Vec<RuleTemplate> = proposed
        .into_iter()
        .filter(|r| seen.insert((r.terminal_a.clone(), r.terminal_b.clone())))
        .collect();

    rules.sort_by(|l, r| {
        compare_terminals(&l.terminal_a, &r.terminal_a)
            .then_with(|| compare_terminals(&l.terminal_b, &r.terminal_b))
    });

    info!(
        type_count = type_terminal_sets.len(),
        rule_count = rules.len(),
        "规则目录自举完成"
    );
    RuleCatalog::new(rules)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_bootstrap_coil_and_contacts() {
        let mut types = BTreeMap::new();
        types.insert("TYPE1".to_string(), set(&["A1", "A2", "13", "14", "21", "22"]));

        let catalog = bootstrap(&types);
        let summary: Vec<(&str, &str, ConnectionKind, &str)> = catalog
            .iter()
            .map(|r| {
                (
                    r.terminal_a.as_str(),
                    r.terminal_b.as_str(),
                    r.classification,
                    r.description.as_str(),
                )
            })
            .collect();

        assert_eq!(
            summary,
            vec![
                ("13", "14", ConnectionKind::ContactConnection, "contact group 1 connection"),
                ("21", "22", ConnectionKind::ContactConnection, "contact group 2 connection"),
                ("A1", "A2", ConnectionKind::CoilConnection, "coil connection"),
            ]
        );
    }

    #[test]
    fn test_bootstrap_dedups_across_types() {
        let mut types = BTreeMap::new();
        types.insert("TYPE1".to_string(), set(&["A1", "A2", "13", "14"]));
        types.insert("TYPE2".to_string(), set(&["A1", "A2", "13", "14", "PE"]));

        let catalog = bootstrap(&types);
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_bootstrap_is_conservative() {
        let mut types = BTreeMap::new();
        // 单字符、三字符、首字符非数字均不提出
        types.insert("TYPE1".to_string(), set(&["1", "2", "131", "132", "L1", "L2", "A1"]));

        assert!(bootstrap(&types).is_empty());
    }

    #[test]
    fn test_bootstrap_group_of_three_yields_all_pairs() {
        let mut types = BTreeMap::new();
        types.insert("TYPE1".to_string(), set(&["11", "12", "14"]));

        let catalog = bootstrap(&types);
        let pairs: Vec<(&str, &str)> = catalog
            .iter()
            .map(|r| (r.terminal_a.as_str(), r.terminal_b.as_str()))
            .collect();
        assert_eq!(pairs, vec![("11", "12"), ("11", "14"), ("12", "14")]);
    }

    #[test]
    fn test_bootstrap_empty_input() {
        assert!(bootstrap(&BTreeMap::new()).is_empty());
    }
}
