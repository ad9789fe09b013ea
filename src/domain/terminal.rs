// ==========================================
// 柜内接线导入系统 - 端子排序
// ==========================================
// 自然序（数字感知）:
//   端子名拆成「数字段 / 非数字段」交替序列
//   数字段按数值比较，数值相同时短者在前（"1" < "01"）
//   非数字段按字节比较
//   仍相同则按原始字节序兜底，保证全序
// 例: "2" < "10" < "A1" < "A2" < "A10"
//
// 注意: 该顺序是持久化指纹的一部分，修改会使已存类型标签全部失效
// ==========================================

use std::cmp::Ordering;

#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    Digits(&'a str),
    Text(&'a str),
}

fn segments(s: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_digits: Option<bool> = None;

    for (idx, ch) in s.char_indices() {
        let is_digit = ch.is_ascii_digit();
        match in_digits {
            Some(prev) if prev != is_digit => {
                out.push(make_segment(&s[start..idx], prev));
                start = idx;
            }
            _ => {}
        }
        in_digits = Some(is_digit);
    }

    if let Some(prev) = in_digits {
        out.push(make_segment(&s[start..], prev));
    }
    out
}

fn make_segment(part: &str, digits: bool) -> Segment<'_> {
    if digits {
        Segment::Digits(part)
    } else {
        Segment::Text(part)
    }
}

fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a_trim = a.trim_start_matches('0');
    let b_trim = b.trim_start_matches('0');

    // 去掉前导零后先比位数，再逐位比较，避免大数溢出
    a_trim
        .len()
        .cmp(&b_trim.len())
        .then_with(|| a_trim.cmp(b_trim))
        .then_with(|| a.len().cmp(&b.len()))
}

/// 按自然序比较两个端子名
pub fn compare_terminals(a: &str, b: &str) -> Ordering {
    let left = segments(a);
    let right = segments(b);

    for (l, r) in left.iter().zip(right.iter()) {
        let ord = match (l, r) {
            (Segment::Digits(x), Segment::Digits(y)) => compare_digit_runs(x, y),
            (Segment::Text(x), Segment::Text(y)) => x.as_bytes().cmp(y.as_bytes()),
            // 数字段排在文本段之前
            (Segment::Digits(_), Segment::Text(_)) => Ordering::Less,
            (Segment::Text(_), Segment::Digits(_)) => Ordering::Greater,
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    left.len()
        .cmp(&right.len())
        .then_with(|| a.as_bytes().cmp(b.as_bytes()))
}

/// 就地按自然序排序并去重（大小写敏感）
pub fn sort_terminals(terminals: &mut Vec<String>) {
    terminals.sort_by(|a, b| compare_terminals(a, b));
    terminals.dedup();
}

/// 返回按自然序排列的 (小, 大) 端子对
pub fn ordered_pair<'a>(a: &'a str, b: &'a str) -> (&'a str, &'a str) {
    if compare_terminals(a, b) == Ordering::Greater {
        (b, a)
    } else {
        (a, b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_runs_compare_by_value() {
        assert_eq!(compare_terminals("2", "10"), Ordering::Less);
        assert_eq!(compare_terminals("A2", "A10"), Ordering::Less);
        assert_eq!(compare_terminals("14", "13"), Ordering::Greater);
    }

    #[test]
    fn test_digits_before_letters() {
        assert_eq!(compare_terminals("13", "A1"), Ordering::Less);
        assert_eq!(compare_terminals("PE", "1"), Ordering::Greater);
    }

    #[test]
    fn test_leading_zero_is_total_order() {
        assert_eq!(compare_terminals("1", "01"), Ordering::Less);
        assert_eq!(compare_terminals("01", "1"), Ordering::Greater);
        assert_eq!(compare_terminals("01", "01"), Ordering::Equal);
    }

    #[test]
    fn test_case_sensitive_distinct() {
        assert_ne!(compare_terminals("a1", "A1"), Ordering::Equal);
        assert_eq!(compare_terminals("a1", "A1"), compare_terminals("a1", "A1"));
    }

    #[test]
    fn test_sort_terminals_dedups() {
        let mut terms = vec![
            "A2".to_string(),
            "14".to_string(),
            "A1".to_string(),
            "13".to_string(),
            "14".to_string(),
            "A10".to_string(),
        ];
        sort_terminals(&mut terms);
        assert_eq!(terms, vec!["13", "14", "A1", "A2", "A10"]);
    }

    #[test]
    fn test_ordered_pair() {
        assert_eq!(ordered_pair("A2", "A1"), ("A1", "A2"));
        assert_eq!(ordered_pair("13", "14"), ("13", "14"));
    }

    #[test]
    fn test_empty_and_mixed_terminals() {
        assert_eq!(compare_terminals("", "1"), Ordering::Less);
        assert_eq!(compare_terminals("X1.2", "X1.10"), Ordering::Less);
    }
}
