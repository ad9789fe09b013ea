// ==========================================
// 柜内接线导入系统 - 端子对分类规则
// ==========================================
// 有序匹配，首条命中即返回:
//   1. 任一端为 A1/A2            → 线圈连接
//   2. 任一端首字符为数字         → 触点组<该数字>连接
//   3. 任一端首字符为 L / T       → 触点组 L / T 连接
//   4. 其他                      → 未分类
// 用途: 旧版规则文件只给端子对，不带分类
// ==========================================

use crate::domain::ConnectionKind;

/// 线圈连接描述
pub const COIL_DESCRIPTION: &str = "coil connection";

/// 未分类连接描述
pub const UNCLASSIFIED_DESCRIPTION: &str = "unclassified connection";

const COIL_TERMINALS: [&str; 2] = ["A1", "A2"];

/// 触点组描述: `contact group <g> connection`
pub fn contact_group_description(group: &str) -> String {
    format!("contact group {} connection", group)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PairPattern {
    Coil,
    DigitGroup(char),
    PowerGroup(char),
    Other,
}

fn leading_char(terminal: &str) -> Option<char> {
    terminal.chars().next()
}

fn match_pattern(a: &str, b: &str) -> PairPattern {
    if COIL_TERMINALS.contains(&a) || COIL_TERMINALS.contains(&b) {
        return PairPattern::Coil;
    }

    if let Some(d) = [a, b]
        .iter()
        .filter_map(|t| leading_char(t))
        .find(|c| c.is_ascii_digit())
    {
        return PairPattern::DigitGroup(d);
    }

    if let Some(p) = [a, b]
        .iter()
        .filter_map(|t| leading_char(t))
        .find(|c| *c == 'L' || *c == 'T')
    {
        return PairPattern::PowerGroup(p);
    }

    PairPattern::Other
}

/// 为无分类的端子对给出分类与描述
pub fn classify_pair(a: &str, b: &str) -> (ConnectionKind, String) {
    match match_pattern(a, b) {
        PairPattern::Coil => (ConnectionKind::CoilConnection, COIL_DESCRIPTION.to_string()),
        PairPattern::DigitGroup(g) | PairPattern::PowerGroup(g) => (
            ConnectionKind::ContactConnection,
            contact_group_description(&g.to_string()),
        ),
        PairPattern::Other => (
            ConnectionKind::Unclassified,
            UNCLASSIFIED_DESCRIPTION.to_string(),
        ),
    }
}
