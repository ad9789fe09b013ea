// ==========================================
// 柜内接线导入系统 - 跨设备接线仓储
// ==========================================
// 表: wire_connection
// (source_tag, target_tag) 唯一，重复导入同一接线不产生新行
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::ExternalWire;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub struct WireRepository {
    conn: Arc<Mutex<Connection>>,
}

impl WireRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 批量写入接线（INSERT OR IGNORE，单事务）
    ///
    /// # 返回
    /// - Ok(usize): 实际新增的行数
    pub fn insert_batch(&self, wires: &[ExternalWire], batch_id: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT OR IGNORE INTO wire_connection (
                    source_tag, target_tag,
                    source_device_key, source_terminal,
                    target_device_key, target_terminal,
                    wire_number, row_number, batch_id
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )?;
            for wire in wires {
                inserted += stmt.execute(params![
                    wire.source_tag,
                    wire.target_tag,
                    wire.source_device_key,
                    wire.source_terminal,
                    wire.target_device_key,
                    wire.target_terminal,
                    wire.wire_number,
                    wire.row_number as i64,
                    batch_id,
                ])?;
            }
        }

        tx.commit()?;
        Ok(inserted)
    }

    /// 全部接线，按写入顺序
    pub fn list(&self) -> RepositoryResult<Vec<ExternalWire>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT row_number, source_tag, target_tag,
                   source_device_key, source_terminal,
                   target_device_key, target_terminal, wire_number
            FROM wire_connection
            ORDER BY wire_id
            "#,
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(ExternalWire {
                row_number: row.get::<_, i64>(0)?.max(0) as usize,
                source_tag: row.get(1)?,
                target_tag: row.get(2)?,
                source_device_key: row.get(3)?,
                source_terminal: row.get(4)?,
                target_device_key: row.get(5)?,
                target_terminal: row.get(6)?,
                wire_number: row.get(7)?,
            })
        })?;

        let mut wires = Vec::new();
        for row in rows {
            wires.push(row?);
        }
        Ok(wires)
    }

    pub fn count(&self) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let n: i64 = conn.query_row("SELECT COUNT(*) FROM wire_connection", [], |row| row.get(0))?;
        Ok(n as usize)
    }
}
