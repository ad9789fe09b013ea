// ==========================================
// 柜内接线导入系统 - 设备类型仓储
// ==========================================
// 表: device_type + type_label_sequence
// 红线:
//   - fingerprint 列 UNIQUE，冲突映射为 FingerprintConflict
//   - 插入类型与推进高水位在同一事务内完成
//   - max_label_suffix 取高水位与现存标签序号的较大者
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::{parse_type_label_suffix, Connection as InnerConnection, TypeRecord};
use crate::repository::device_repo::{from_json, to_json};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::stores::TypeStore;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::sync::{Arc, Mutex};
use tracing::debug;

// ==========================================
// DeviceTypeRepository - 设备类型仓储
// ==========================================
pub struct DeviceTypeRepository {
    conn: Arc<Mutex<Connection>>,
}

impl DeviceTypeRepository {
    /// 创建新的 DeviceTypeRepository 实例
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

    /// 删除类型（高水位不回退）
    pub fn delete(&self, type_label: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "DELETE FROM device_type WHERE type_label = ?1",
            params![type_label],
        )?;
        Ok(affected > 0)
    }
}

/// 将唯一约束冲突细化为指纹冲突或标签冲突
fn classify_insert_error(err: rusqlite::Error, record: &TypeRecord) -> RepositoryError {
    if let rusqlite::Error::SqliteFailure(_, Some(msg)) = &err {
        if msg.contains("UNIQUE") && msg.contains("fingerprint") {
            return RepositoryError::FingerprintConflict {
                fingerprint: record.fingerprint.clone(),
            };
        }
        if msg.contains("UNIQUE") && msg.contains("type_label") {
            return RepositoryError::LabelConflict {
                type_label: record.type_label.clone(),
            };
        }
    }
    err.into()
}

impl TypeStore for DeviceTypeRepository {
    fn find_by_fingerprint(&self, fingerprint: &str) -> RepositoryResult<Option<String>> {
        let conn = self.get_conn()?;
        let label = conn
            .query_row(
                "SELECT type_label FROM device_type WHERE fingerprint = ?1",
                params![fingerprint],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(label)
    }

    fn find_by_label(&self, type_label: &str) -> RepositoryResult<Option<TypeRecord>> {
        let conn = self.get_conn()?;
        let raw = conn
            .query_row(
                r#"
                SELECT type_label, fingerprint, terminal_count, inner_list, created_at
                FROM device_type WHERE type_label = ?1
                "#,
                params![type_label],
                map_raw_row,
            )
            .optional()?;
        raw.map(RawTypeRow::into_record).transpose()
    }

    fn create(&self, record: &TypeRecord) -> RepositoryResult<String> {
        let inner_list = to_json("inner_list", &record.inner_connections)?;
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;

        tx.execute(
            r#"
            INSERT INTO device_type (type_label, fingerprint, terminal_count, inner_list, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                record.type_label,
                record.fingerprint,
                record.terminal_count as i64,
                inner_list,
                record.created_at.to_rfc3339(),
            ],
        )
        .map_err(|e| classify_insert_error(e, record))?;

        if let Some(suffix) = parse_type_label_suffix(&record.type_label) {
            tx.execute(
                r#"
                INSERT INTO type_label_sequence (id, high_water) VALUES (1, ?1)
                ON CONFLICT(id) DO UPDATE SET high_water = MAX(high_water, excluded.high_water)
                "#,
                params![suffix as i64],
            )?;
        }

        tx.commit()?;
        debug!(type_label = %record.type_label, fingerprint = %record.fingerprint, "类型已创建");
        Ok(record.type_label.clone())
    }

    fn max_label_suffix(&self) -> RepositoryResult<u64> {
        let conn = self.get_conn()?;

        let high_water: Option<i64> = conn
            .query_row(
                "SELECT high_water FROM type_label_sequence WHERE id = 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        let mut stmt = conn.prepare("SELECT type_label FROM device_type")?;
        let labels = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut max_suffix = high_water.unwrap_or(0).max(0) as u64;
        for label in labels {
            if let Some(suffix) = parse_type_label_suffix(&label?) {
                max_suffix = max_suffix.max(suffix);
            }
        }
        Ok(max_suffix)
    }

    fn update_inner_connections(
        &self,
        type_label: &str,
        connections: &[InnerConnection],
    ) -> RepositoryResult<()> {
        let inner_list = to_json("inner_list", connections)?;
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE device_type SET inner_list = ?1 WHERE type_label = ?2",
            params![inner_list, type_label],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "DeviceType".to_string(),
                id: type_label.to_string(),
            });
        }
        Ok(())
    }

    fn list(&self) -> RepositoryResult<Vec<TypeRecord>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT type_label, fingerprint, terminal_count, inner_list, created_at
            FROM device_type
            "#,
        )?;
        let rows = stmt.query_map([], map_raw_row)?;

        let mut types = Vec::new();
        for row in rows {
            types.push(row?.into_record()?);
        }
        types.sort_by(|a, b| {
            parse_type_label_suffix(&a.type_label)
                .cmp(&parse_type_label_suffix(&b.type_label))
                .then_with(|| a.type_label.cmp(&b.type_label))
        });
        Ok(types)
    }
}

// ==========================================
// 行映射
// ==========================================
struct RawTypeRow {
    type_label: String,
    fingerprint: String,
    terminal_count: i64,
    inner_list: String,
    created_at: String,
}

fn map_raw_row(row: &Row<'_>) -> rusqlite::Result<RawTypeRow> {
    Ok(RawTypeRow {
        type_label: row.get(0)?,
        fingerprint: row.get(1)?,
        terminal_count: row.get(2)?,
        inner_list: row.get(3)?,
        created_at: row.get(4)?,
    })
}

impl RawTypeRow {
    fn into_record(self) -> RepositoryResult<TypeRecord> {
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| RepositoryError::SerializationError {
                field: "created_at".to_string(),
                message: e.to_string(),
            })?;
        Ok(TypeRecord {
            inner_connections: from_json("inner_list", &self.inner_list)?,
            type_label: self.type_label,
            fingerprint: self.fingerprint,
            terminal_count: self.terminal_count.max(0) as usize,
            created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, init_schema};

    fn setup() -> DeviceTypeRepository {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        DeviceTypeRepository::from_connection(Arc::new(Mutex::new(conn)))
    }

    fn type_record(label: &str, fingerprint: &str) -> TypeRecord {
        TypeRecord {
            type_label: label.to_string(),
            fingerprint: fingerprint.to_string(),
            terminal_count: 2,
            inner_connections: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_create_and_find() {
        let repo = setup();
        repo.create(&type_record("TYPE1", r#"["A1","A2"]"#)).unwrap();

        assert_eq!(
            repo.find_by_fingerprint(r#"["A1","A2"]"#).unwrap(),
            Some("TYPE1".to_string())
        );
        assert_eq!(repo.find_by_fingerprint(r#"["13","14"]"#).unwrap(), None);
        assert_eq!(repo.find_by_label("TYPE1").unwrap().unwrap().terminal_count, 2);
    }

    #[test]
    fn test_duplicate_fingerprint_is_fingerprint_conflict() {
        let repo = setup();
        repo.create(&type_record("TYPE1", r#"["A1","A2"]"#)).unwrap();

        let err = repo.create(&type_record("TYPE2", r#"["A1","A2"]"#)).unwrap_err();
        assert!(matches!(err, RepositoryError::FingerprintConflict { .. }));
    }

    #[test]
    fn test_duplicate_label_is_label_conflict() {
        let repo = setup();
        repo.create(&type_record("TYPE1", r#"["A1","A2"]"#)).unwrap();

        let err = repo.create(&type_record("TYPE1", r#"["13","14"]"#)).unwrap_err();
        assert!(matches!(err, RepositoryError::LabelConflict { .. }));
    }

    #[test]
    fn test_max_label_suffix_survives_deletion() {
        let repo = setup();
        assert_eq!(repo.max_label_suffix().unwrap(), 0);

        repo.create(&type_record("TYPE3", r#"["1","2"]"#)).unwrap();
        repo.create(&type_record("TYPE7", r#"["3","4"]"#)).unwrap();
        assert!(repo.delete("TYPE7").unwrap());

        assert_eq!(repo.max_label_suffix().unwrap(), 7);
    }

    #[test]
    fn test_max_label_suffix_ignores_foreign_labels() {
        let repo = setup();
        repo.create(&type_record("RELAY9", r#"["1","2"]"#)).unwrap();
        repo.create(&type_record("TYPE2", r#"["3","4"]"#)).unwrap();
        assert_eq!(repo.max_label_suffix().unwrap(), 2);
    }

    #[test]
    fn test_update_inner_connections_and_list_order() {
        let repo = setup();
        repo.create(&type_record("TYPE10", r#"["5","6"]"#)).unwrap();
        repo.create(&type_record("TYPE2", r#"["3","4"]"#)).unwrap();

        let conns = vec![InnerConnection::new(
            "3",
            "4",
            crate::domain::ConnectionKind::ContactConnection,
            "contact group 3 connection",
        )];
        repo.update_inner_connections("TYPE2", &conns).unwrap();

        let labels: Vec<String> = repo.list().unwrap().into_iter().map(|t| t.type_label).collect();
        assert_eq!(labels, vec!["TYPE2", "TYPE10"]);
        assert_eq!(repo.find_by_label("TYPE2").unwrap().unwrap().inner_connections, conns);

        assert!(matches!(
            repo.update_inner_connections("TYPE99", &conns),
            Err(RepositoryError::NotFound { .. })
        ));
    }
}
