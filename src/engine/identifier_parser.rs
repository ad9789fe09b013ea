// ==========================================
// 柜内接线导入系统 - 设备标签解析器
// ==========================================
// 格式: =FUNCTION+LOCATION-DEVICE:TERMINAL
// 导出数据混有多种历史写法，所有分隔符均为尽力而为:
//   - 无任何分隔符: 整串视为裸设备名
//   - 无 '+': 功能/位置为空，剩余部分（去掉前导 '='）为设备
//   - 有 '+' 无 '-': 位置为空，'+' 之后为设备
//   - 无 ':': 端子缺省为 "1"
// 红线: 永不报错，无法识别的字段返回空串
// ==========================================

use crate::domain::DeviceIdentifier;
use tracing::debug;

/// 缺省端子号（标签不含 ':' 时）
pub const DEFAULT_TERMINAL: &str = "1";

const DELIMITERS: [char; 4] = ['=', '+', '-', ':'];

/// 解析一条设备标签
pub fn parse(raw: &str) -> DeviceIdentifier {
    let text = raw.trim();

    if !text.contains(DELIMITERS) {
        return DeviceIdentifier {
            raw: raw.to_string(),
            function: String::new(),
            location: String::new(),
            device: text.to_string(),
            terminal: DEFAULT_TERMINAL.to_string(),
        };
    }

    let function_start = text.find('=').map(|pos| pos + 1).unwrap_or(0);
    let body = &text[function_start..];

    let (function, location, device_part) = match body.find('+') {
        Some(plus) => {
            let function = &body[..plus];
            let rest = &body[plus + 1..];
            match rest.find('-') {
                Some(dash) => (function, &rest[..dash], &rest[dash + 1..]),
                None => {
                    debug!(tag = %raw, "标签缺少 '-'，位置段置空");
                    (function, "", rest)
                }
            }
        }
        None => {
            debug!(tag = %raw, "标签缺少 '+'，功能/位置段置空");
            // 孤立的前导 '=' / '-' 不属于设备名
            let isolated = body.trim_start_matches('=');
            let isolated = isolated.strip_prefix('-').unwrap_or(isolated);
            ("", "", isolated)
        }
    };

    let (device, terminal) = match device_part.find(':') {
        Some(colon) => (&device_part[..colon], device_part[colon + 1..].trim()),
        None => (device_part, DEFAULT_TERMINAL),
    };

    DeviceIdentifier {
        raw: raw.to_string(),
        function: function.trim().to_string(),
        location: location.trim().to_string(),
        device: device.trim().to_string(),
        terminal: terminal.to_string(),
    }
}
