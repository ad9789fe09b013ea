// ==========================================
// 柜内接线导入系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为（外键、busy_timeout）
// - 建表幂等，重复调用 init_schema 不破坏已有数据
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{info, warn};

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 2;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要"每个连接"单独开启
/// - busy_timeout 需要"每个连接"单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let mut conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    crate::perf::install_sqlite_tracing(&mut conn);
    Ok(conn)
}

/// 打开连接、建表，并包装为各仓储共享的句柄
pub fn open_shared_connection(db_path: &str) -> rusqlite::Result<Arc<Mutex<Connection>>> {
    let conn = open_sqlite_connection(db_path)?;
    init_schema(&conn)?;
    Ok(Arc::new(Mutex::new(conn)))
}

/// 初始化数据库 schema（幂等）
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS device_type (
            type_label TEXT PRIMARY KEY,
            fingerprint TEXT NOT NULL UNIQUE,
            terminal_count INTEGER NOT NULL,
            inner_list TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL
        );

        -- 标签序号高水位，单行表；类型删除后序号也不回退
        CREATE TABLE IF NOT EXISTS type_label_sequence (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            high_water INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS panel_device (
            device_key TEXT PRIMARY KEY,
            project_number TEXT NOT NULL,
            function TEXT NOT NULL DEFAULT '',
            location TEXT NOT NULL DEFAULT '',
            device TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'field',
            terminal_list TEXT NOT NULL DEFAULT '[]',
            type_label TEXT REFERENCES device_type(type_label) ON DELETE SET NULL,
            inner_list TEXT NOT NULL DEFAULT '[]',
            updated_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_panel_device_type ON panel_device(type_label);

        CREATE TABLE IF NOT EXISTS import_batch (
            batch_id TEXT PRIMARY KEY,
            project_number TEXT NOT NULL,
            file_path TEXT,
            started_at TEXT NOT NULL,
            finished_at TEXT,
            report_json TEXT
        );

        CREATE TABLE IF NOT EXISTS wire_connection (
            wire_id INTEGER PRIMARY KEY AUTOINCREMENT,
            source_tag TEXT NOT NULL,
            target_tag TEXT NOT NULL,
            source_device_key TEXT NOT NULL,
            source_terminal TEXT NOT NULL,
            target_device_key TEXT NOT NULL,
            target_terminal TEXT NOT NULL,
            wire_number TEXT,
            row_number INTEGER NOT NULL DEFAULT 0,
            batch_id TEXT REFERENCES import_batch(batch_id) ON DELETE SET NULL,
            UNIQUE(source_tag, target_tag)
        );
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// 校验 schema_version，不一致时只告警
pub fn check_schema_version(conn: &Connection) -> rusqlite::Result<()> {
    match read_schema_version(conn)? {
        Some(v) if v == CURRENT_SCHEMA_VERSION => {
            info!(schema_version = v, "数据库 schema 版本匹配");
        }
        Some(v) => {
            warn!(
                schema_version = v,
                expected = CURRENT_SCHEMA_VERSION,
                "数据库 schema 版本不匹配"
            );
        }
        None => warn!("数据库缺少 schema_version 表"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        assert_eq!(read_schema_version(&conn).unwrap(), Some(CURRENT_SCHEMA_VERSION));
    }

    #[test]
    fn test_schema_version_absent_on_empty_db() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(read_schema_version(&conn).unwrap(), None);
    }
}
