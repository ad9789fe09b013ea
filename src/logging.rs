// ==========================================
// 柜内接线导入系统 - 日志系统初始化
// ==========================================
// 使用 tracing 和 tracing-subscriber
// 过滤器优先取 PANEL_WIRING_LOG，其次 RUST_LOG
// ==========================================

use tracing_subscriber::{fmt, EnvFilter};

/// 专用日志过滤环境变量
pub const LOG_ENV: &str = "PANEL_WIRING_LOG";

/// 默认过滤器: 导入流程 info，阶段耗时 info，慢 SQL 只留告警
pub const DEFAULT_FILTER: &str = "info,panel_wiring=info,perf=info,slow_sql=warn";

/// 从环境变量取值中选出生效的过滤器串，空值视为未设置
fn filter_directives(own: Option<String>, rust_log: Option<String>) -> String {
    own.into_iter()
        .chain(rust_log)
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_FILTER.to_string())
}

/// 初始化日志系统
///
/// # 环境变量
/// - PANEL_WIRING_LOG: 本系统专用过滤器
///   例如: PANEL_WIRING_LOG=panel_wiring::importer=debug,slow_sql=warn
/// - RUST_LOG: 未设置 PANEL_WIRING_LOG 时使用
///
/// 过滤器串非法时退回 DEFAULT_FILTER
///
/// # 示例
/// ```no_run
/// use panel_wiring::logging;
/// logging::init();
/// ```
pub fn init() {
    let directives = filter_directives(
        std::env::var(LOG_ENV).ok(),
        std::env::var("RUST_LOG").ok(),
    );
    let filter = EnvFilter::try_new(&directives)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// 初始化测试环境的日志系统
///
/// debug 级别，输出交给测试框架捕获；重复调用无副作用
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug,slow_sql=warn"))
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_own_variable_wins_over_rust_log() {
        let chosen = filter_directives(
            Some("panel_wiring::importer=debug".to_string()),
            Some("warn".to_string()),
        );
        assert_eq!(chosen, "panel_wiring::importer=debug");
    }

    #[test]
    fn test_blank_values_fall_back_to_default() {
        assert_eq!(filter_directives(Some("  ".to_string()), None), DEFAULT_FILTER);
        assert_eq!(filter_directives(None, Some("trace".to_string())), "trace");
        assert_eq!(filter_directives(None, None), DEFAULT_FILTER);
        assert!(EnvFilter::try_new(DEFAULT_FILTER).is_ok());
    }
}
