// ==========================================
// 柜内接线导入系统 - 设备仓储
// ==========================================
// 表: panel_device
// 端子集合与内部连接以 JSON 文本列存储
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::{Connection as InnerConnection, DeviceRecord, VertexRole};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::stores::DeviceStore;
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    SELECT device_key, project_number, function, location, device,
           role, terminal_list, type_label, inner_list
    FROM panel_device
"#;

// ==========================================
// DeviceRepository - 设备仓储
// ==========================================
/// 设备仓储
/// 职责: 管理 panel_device 表的 CRUD 操作
/// 红线: 不含业务逻辑，只负责数据访问
pub struct DeviceRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DeviceRepository {
    /// 创建新的 DeviceRepository 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn query_devices(
        &self,
        where_clause: &str,
        args: &[&dyn rusqlite::ToSql],
    ) -> RepositoryResult<Vec<DeviceRecord>> {
        let conn = self.get_conn()?;
        let sql = format!("{} {} ORDER BY device_key", SELECT_COLUMNS, where_clause);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(args, map_raw_row)?;

        let mut devices = Vec::new();
        for row in rows {
            devices.push(row?.into_record()?);
        }
        Ok(devices)
    }
}

fn write_device(conn: &Connection, record: &DeviceRecord) -> RepositoryResult<()> {
    let terminal_list = to_json("terminal_list", &record.terminals)?;
    let inner_list = to_json("inner_list", &record.inner_connections)?;

    conn.execute(
        r#"
        INSERT OR REPLACE INTO panel_device (
            device_key, project_number, function, location, device,
            role, terminal_list, type_label, inner_list, updated_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
        "#,
        params![
            record.device_key,
            record.project_number,
            record.function,
            record.location,
            record.device,
            record.role.as_str(),
            terminal_list,
            record.type_label,
            inner_list,
            Utc::now().to_rfc3339(),
        ],
    )?;
    Ok(())
}

impl DeviceStore for DeviceRepository {
    fn get(&self, device_key: &str) -> RepositoryResult<Option<DeviceRecord>> {
        let mut found = self.query_devices("WHERE device_key = ?1", &[&device_key])?;
        Ok(found.pop())
    }

    fn upsert(&self, record: &DeviceRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        write_device(&conn, record)
    }

    fn delete(&self, device_key: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM panel_device WHERE device_key = ?1",
            params![device_key],
        )?;
        Ok(affected > 0)
    }

    fn list(&self) -> RepositoryResult<Vec<DeviceRecord>> {
        self.query_devices("", &[])
    }

    fn list_by_type(&self, type_label: &str) -> RepositoryResult<Vec<DeviceRecord>> {
        self.query_devices("WHERE type_label = ?1", &[&type_label])
    }

    /// 批量 upsert（单事务，失败整体回滚）
    fn upsert_many(&self, records: &[DeviceRecord]) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        for record in records {
            write_device(&tx, record)?;
        }
        tx.commit()?;
        Ok(records.len())
    }
}

// ==========================================
// 行映射
// ==========================================
struct RawDeviceRow {
    device_key: String,
    project_number: String,
    function: String,
    location: String,
    device: String,
    role: String,
    terminal_list: String,
    type_label: Option<String>,
    inner_list: String,
}

fn map_raw_row(row: &Row<'_>) -> rusqlite::Result<RawDeviceRow> {
    Ok(RawDeviceRow {
        device_key: row.get(0)?,
        project_number: row.get(1)?,
        function: row.get(2)?,
        location: row.get(3)?,
        device: row.get(4)?,
        role: row.get(5)?,
        terminal_list: row.get(6)?,
        type_label: row.get(7)?,
        inner_list: row.get(8)?,
    })
}

impl RawDeviceRow {
    fn into_record(self) -> RepositoryResult<DeviceRecord> {
        let terminals: BTreeSet<String> = from_json("terminal_list", &self.terminal_list)?;
        let inner_connections: Vec<InnerConnection> = from_json("inner_list", &self.inner_list)?;
        Ok(DeviceRecord {
            device_key: self.device_key,
            project_number: self.project_number,
            function: self.function,
            location: self.location,
            device: self.device,
            role: VertexRole::from_db_str(&self.role),
            terminals,
            type_label: self.type_label,
            inner_connections,
        })
    }
}

pub(crate) fn to_json<T: serde::Serialize + ?Sized>(
    field: &str,
    value: &T,
) -> RepositoryResult<String> {
    serde_json::to_string(value).map_err(|e| RepositoryError::SerializationError {
        field: field.to_string(),
        message: e.to_string(),
    })
}

pub(crate) fn from_json<T: serde::de::DeserializeOwned>(
    field: &str,
    text: &str,
) -> RepositoryResult<T> {
    serde_json::from_str(text).map_err(|e| RepositoryError::SerializationError {
        field: field.to_string(),
        message: e.to_string(),
    })
}
