// ==========================================
// 柜内接线导入系统 - 保护/中性端子过滤
// ==========================================
// PE（含 PE 子串）与 N（完全相等）不参与跨设备接线
// 比较前统一转大写
// 内部连接推断不使用此过滤
// ==========================================

/// 是否为保护地/中性端子
pub fn is_protective_terminal(terminal: &str) -> bool {
    let upper = terminal.trim().to_uppercase();
    upper.contains("PE") || upper == "N"
}

/// 两端是否都可参与跨设备接线
pub fn is_cross_device_eligible(source_terminal: &str, target_terminal: &str) -> bool {
    !is_protective_terminal(source_terminal) && !is_protective_terminal(target_terminal)
}
