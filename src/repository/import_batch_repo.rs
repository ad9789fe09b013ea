// ==========================================
// 柜内接线导入系统 - 导入批次仓储
// ==========================================
// 表: import_batch
// 批次开始时插入，结束时回填 finished_at 与报告 JSON
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::{ImportBatch, ImportReport};
use crate::repository::device_repo::to_json;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::sync::{Arc, Mutex};

pub struct ImportBatchRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ImportBatchRepository {
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

    /// 登记批次开始
    pub fn start(&self, batch: &ImportBatch) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO import_batch (batch_id, project_number, file_path, started_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                batch.batch_id,
                batch.project_number,
                batch.file_path,
                batch.started_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// 回填批次结果
    pub fn finish(&self, batch_id: &str, report: &ImportReport) -> RepositoryResult<()> {
        let report_json = to_json("report_json", report)?;
        let conn = self.get_conn()?;
        let affected = conn.execute(
            "UPDATE import_batch SET finished_at = ?1, report_json = ?2 WHERE batch_id = ?3",
            params![Utc::now().to_rfc3339(), report_json, batch_id],
        )?;
        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "ImportBatch".to_string(),
                id: batch_id.to_string(),
            });
        }
        Ok(())
    }

    pub fn find_by_id(&self, batch_id: &str) -> RepositoryResult<Option<ImportBatch>> {
        let conn = self.get_conn()?;
        let row = conn
            .query_row(
                r#"
                SELECT batch_id, project_number, file_path, started_at, finished_at, report_json
                FROM import_batch WHERE batch_id = ?1
                "#,
                params![batch_id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, Option<String>>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, Option<String>>(4)?,
                        row.get::<_, Option<String>>(5)?,
                    ))
                },
            )
            .optional()?;

        Ok(row.map(
            |(batch_id, project_number, file_path, started_at, finished_at, report_json)| {
                ImportBatch {
                    batch_id,
                    project_number,
                    file_path,
                    started_at: parse_timestamp(&started_at).unwrap_or_else(Utc::now),
                    finished_at: finished_at.as_deref().and_then(parse_timestamp),
                    report_json,
                }
            },
        ))
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
