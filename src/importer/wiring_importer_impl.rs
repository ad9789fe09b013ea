// ==========================================
// 柜内接线导入系统 - 接线导入器实现
// ==========================================
// 职责: 整合导入流程，从文件到设备库/类型库
// 流程: 解析 → 累积 → 合并已存端子 → 剔除 → 指纹/类型 → 规则目录 → 推断 → 落库
// 红线:
//   - 单行格式问题只计数，不终止批次
//   - 只有存储层失败才向调用方报错
//   - 内部连接每次重新推断并整体覆盖
// ==========================================

use crate::config::{ConfigManager, ImportConfig};
use crate::db::open_shared_connection;
use crate::domain::{
    Connection as InnerConnection, DeviceRecord, ImportBatch, ImportReport, RuleCatalog,
};
use crate::engine::{bootstrap, canonicalize, fingerprint, infer, RuleCatalogError, TypeRegistry};
use crate::importer::device_collector::DeviceCollector;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::wiring_importer_trait::{FileParser, RawRecord, WiringImporter};
use crate::perf::PerfGuard;
use crate::repository::{
    DeviceRepository, DeviceStore, DeviceTypeRepository, ImportBatchRepository, TypeStore,
    WireRepository,
};
use chrono::Utc;
use rusqlite::Connection;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

/// 导入器运行参数
#[derive(Debug, Clone)]
pub struct ImporterSettings {
    pub project_number: String,
    pub rules_path: PathBuf,
    pub import: ImportConfig,
}

impl ImporterSettings {
    pub fn from_config(manager: &ConfigManager) -> Self {
        let cfg = manager.config();
        Self {
            project_number: cfg.files.project_number.clone(),
            rules_path: manager.resolve_path(&cfg.files.rules_path),
            import: cfg.import.clone(),
        }
    }
}

// ==========================================
// WiringImporterImpl - 接线导入器实现
// ==========================================
pub struct WiringImporterImpl<D, T>
where
    D: DeviceStore,
    T: TypeStore,
{
    // 数据访问层
    device_store: D,
    registry: TypeRegistry<T>,
    wire_repo: WireRepository,
    batch_repo: ImportBatchRepository,

    // 导入组件
    file_parser: Box<dyn FileParser>,
    settings: ImporterSettings,
}

impl WiringImporterImpl<DeviceRepository, DeviceTypeRepository> {
    /// 基于共享 SQLite 连接组装导入器
    pub fn from_connection(
        conn: Arc<Mutex<Connection>>,
        settings: ImporterSettings,
    ) -> ImportResult<Self> {
        Self::new(
            DeviceRepository::from_connection(Arc::clone(&conn)),
            DeviceTypeRepository::from_connection(Arc::clone(&conn)),
            WireRepository::from_connection(Arc::clone(&conn)),
            ImportBatchRepository::from_connection(conn),
            settings,
        )
    }

    /// 打开数据库（必要时建表）并组装导入器
    pub fn open(db_path: &str, settings: ImporterSettings) -> ImportResult<Self> {
        let conn = open_shared_connection(db_path)?;
        Self::from_connection(conn, settings)
    }
}

impl<D, T> WiringImporterImpl<D, T>
where
    D: DeviceStore,
    T: TypeStore,
{
    /// 创建导入器（类型注册表在此从类型库播种）
    pub fn new(
        device_store: D,
        type_store: T,
        wire_repo: WireRepository,
        batch_repo: ImportBatchRepository,
        settings: ImporterSettings,
    ) -> ImportResult<Self> {
        let file_parser = Box::new(UniversalFileParser::new(settings.import.skip_leading_rows));
        Ok(Self {
            device_store,
            registry: TypeRegistry::new(type_store)?,
            wire_repo,
            batch_repo,
            file_parser,
            settings,
        })
    }

    pub fn device_store(&self) -> &D {
        &self.device_store
    }

    pub fn type_store(&self) -> &T {
        self.registry.store()
    }

    pub fn wire_repo(&self) -> &WireRepository {
        &self.wire_repo
    }

    pub fn batch_repo(&self) -> &ImportBatchRepository {
        &self.batch_repo
    }

    pub fn settings(&self) -> &ImporterSettings {
        &self.settings
    }

    fn check_columns(&self, rows: &[RawRecord]) -> ImportResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        for column in [&self.settings.import.source_column, &self.settings.import.target_column] {
            if !rows.iter().any(|r| r.get(column).is_some()) {
                return Err(ImportError::MissingColumn(column.clone()));
            }
        }
        Ok(())
    }

    /// 合并设备库中已存端子，剔除端子不足的设备
    ///
    /// # 返回
    /// 被剔除的设备数
    fn merge_and_filter(
        &self,
        devices: &mut BTreeMap<String, DeviceRecord>,
    ) -> ImportResult<usize> {
        for (key, record) in devices.iter_mut() {
            if let Some(stored) = self.device_store.get(key)? {
                let added = record.merge_terminals(&stored.terminals);
                if added > 0 {
                    debug!(device_key = %key, added, "合并已存端子");
                }
            }
        }

        let min = self.settings.import.min_terminal_count;
        let excluded: Vec<String> = devices
            .iter()
            .filter(|(_, r)| !r.meets_terminal_minimum(min))
            .map(|(k, _)| k.clone())
            .collect();

        for key in &excluded {
            devices.remove(key);
            if self.device_store.delete(key)? {
                debug!(device_key = %key, "端子不足，已从设备库删除");
            }
        }
        Ok(excluded.len())
    }

    /// 读取规则目录；缺失时自举并保存，返回 None 表示本次跳过推断
    fn load_or_bootstrap_catalog(&self) -> ImportResult<Option<RuleCatalog>> {
        match RuleCatalog::load(&self.settings.rules_path) {
            Ok(catalog) => Ok(Some(catalog)),
            Err(RuleCatalogError::Missing(path)) => {
                warn!(path = %path, "规则目录不存在，自举初版目录，本次跳过内部连接推断");
                self.bootstrap_rules()?;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// 从类型库全部类型自举规则目录并保存
    pub fn bootstrap_rules(&self) -> ImportResult<RuleCatalog> {
        let _perf = PerfGuard::new("rules.bootstrap");

        let mut type_terminal_sets: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for record in self.type_store().list()? {
            match fingerprint::decode(&record.fingerprint) {
                Ok(terminals) => {
                    type_terminal_sets.insert(record.type_label, terminals.into_iter().collect());
                }
                Err(e) => {
                    warn!(type_label = %record.type_label, error = %e, "类型指纹无法解码，跳过");
                }
            }
        }

        let catalog = bootstrap(&type_terminal_sets);
        catalog.save(&self.settings.rules_path)?;
        Ok(catalog)
    }

    /// 按当前规则目录重新推断全部类型与设备的内部连接
    ///
    /// # 返回
    /// - Ok(usize): 推断出的连接总数（按类型计）
    /// - Err(RuleCatalogMissing): 规则目录不存在
    pub fn reapply_rules(&self) -> ImportResult<usize> {
        let _perf = PerfGuard::new("rules.reapply");
        let catalog = RuleCatalog::load(&self.settings.rules_path)?;

        let mut total = 0;
        for record in self.type_store().list()? {
            let terminals = match fingerprint::decode(&record.fingerprint) {
                Ok(t) => t,
                Err(e) => {
                    warn!(type_label = %record.type_label, error = %e, "类型指纹无法解码，跳过");
                    continue;
                }
            };

            let connections = infer(&terminals, &catalog);
            total += connections.len();
            self.type_store()
                .update_inner_connections(&record.type_label, &connections)?;

            self.sync_type_devices(&record.type_label, &connections)?;
        }

        info!(connection_count = total, "内部连接已按规则目录重新推断");
        Ok(total)
    }

    /// 让该类型下所有已存设备的内部连接与类型保持一致
    ///
    /// # 返回
    /// 实际改写的设备数
    fn sync_type_devices(
        &self,
        type_label: &str,
        connections: &[InnerConnection],
    ) -> ImportResult<usize> {
        let stale: Vec<DeviceRecord> = self
            .device_store
            .list_by_type(type_label)?
            .into_iter()
            .filter(|d| d.inner_connections.as_slice() != connections)
            .map(|mut d| {
                d.inner_connections = connections.to_vec();
                d
            })
            .collect();

        if stale.is_empty() {
            return Ok(0);
        }
        debug!(type_label, count = stale.len(), "改写同类型设备的内部连接");
        Ok(self.device_store.upsert_many(&stale)?)
    }

    /// 同步执行的导入主体
    fn run_import(&self, path: &Path, batch_id: &str) -> ImportResult<ImportReport> {
        let start_time = Instant::now();
        let file_path_str = path.display().to_string();
        let mut report = ImportReport {
            batch_id: batch_id.to_string(),
            file_path: file_path_str.clone(),
            ..Default::default()
        };

        // === 步骤 1: 解析文件 ===
        let rows = {
            let perf = PerfGuard::new("import.parse");
            let rows = self.file_parser.parse_to_raw_records(path).map_err(|e| {
                error!(error = %e, "文件解析失败");
                e
            })?;
            report.phases.push(perf.finish());
            rows
        };
        self.check_columns(&rows)?;
        info!(total_rows = rows.len(), "文件解析完成");

        self.batch_repo.start(&ImportBatch {
            batch_id: batch_id.to_string(),
            project_number: self.settings.project_number.clone(),
            file_path: Some(file_path_str),
            started_at: Utc::now(),
            finished_at: None,
            report_json: None,
        })?;

        // === 步骤 2: 标签解析与端子累积 ===
        let (mut devices, wires, stats) = {
            let perf = PerfGuard::new("import.collect");
            let mut collector = DeviceCollector::new(&self.settings.project_number, &self.settings.import);
            collector.observe_rows(&rows);
            let collected = collector.finish();
            report.phases.push(perf.finish());
            collected
        };
        report.total_rows = stats.total_rows;
        report.rows_without_tags = stats.rows_without_tags;
        report.wires_skipped_protective = stats.wires_skipped_protective;
        report.devices_seen = devices.len();

        // === 步骤 3: 合并已存端子 + 剔除端子不足的设备 ===
        report.devices_excluded = self.merge_and_filter(&mut devices)?;

        // === 步骤 4: 指纹计算与类型注册 ===
        let mut type_terminals: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        {
            let perf = PerfGuard::new("import.resolve_types");
            for (key, record) in devices.iter_mut() {
                let fp = canonicalize(&record.terminals);
                let resolution = self.registry.resolve(&fp, record.terminals.len())?;
                if resolution.created {
                    report.types_created += 1;
                } else {
                    report.types_reused += 1;
                }
                debug!(device_key = %key, type_label = %resolution.type_label, "设备类型已确定");
                type_terminals
                    .entry(resolution.type_label.clone())
                    .or_insert_with(|| record.terminals.clone());
                record.type_label = Some(resolution.type_label);
            }
            report.phases.push(perf.finish());
        }

        // === 步骤 5: 规则目录 ===
        let catalog = self.load_or_bootstrap_catalog()?;
        report.rules_bootstrapped = catalog.is_none();

        // === 步骤 6: 内部连接推断（按类型） ===
        let mut type_connections: BTreeMap<String, Vec<InnerConnection>> = BTreeMap::new();
        {
            let perf = PerfGuard::new("import.infer");
            for (label, terminals) in &type_terminals {
                let connections = match &catalog {
                    Some(catalog) => {
                        let inferred = infer(terminals, catalog);
                        self.type_store()
                            .update_inner_connections(label, &inferred)?;
                        report.connections_inferred += inferred.len();
                        inferred
                    }
                    // 未推断时沿用类型库中已有的连接
                    None => self
                        .type_store()
                        .find_by_label(label)?
                        .map(|t| t.inner_connections)
                        .unwrap_or_default(),
                };
                type_connections.insert(label.clone(), connections);
            }
            report.phases.push(perf.finish());
        }

        // === 步骤 7: 落库 ===
        {
            let perf = PerfGuard::new("import.persist");
            let records: Vec<DeviceRecord> = devices
                .into_values()
                .map(|mut record| {
                    if let Some(conns) = record
                        .type_label
                        .as_ref()
                        .and_then(|label| type_connections.get(label))
                    {
                        record.inner_connections = conns.clone();
                    }
                    record
                })
                .collect();
            self.device_store.upsert_many(&records)?;
            // 早先导入的同类型设备也随类型更新
            for (label, conns) in &type_connections {
                self.sync_type_devices(label, conns)?;
            }
            report.wires_recorded = self.wire_repo.insert_batch(&wires, batch_id)?;
            report.phases.push(perf.finish());
        }

        report.elapsed_ms = start_time.elapsed().as_millis() as u64;
        self.batch_repo.finish(batch_id, &report)?;

        info!(
            total_rows = report.total_rows,
            devices_seen = report.devices_seen,
            devices_excluded = report.devices_excluded,
            types_created = report.types_created,
            types_reused = report.types_reused,
            connections_inferred = report.connections_inferred,
            wires_recorded = report.wires_recorded,
            wires_skipped_protective = report.wires_skipped_protective,
            rules_bootstrapped = report.rules_bootstrapped,
            elapsed_ms = report.elapsed_ms,
            "接线导入完成"
        );
        Ok(report)
    }
}

#[async_trait::async_trait]
impl<D, T> WiringImporter for WiringImporterImpl<D, T>
where
    D: DeviceStore,
    T: TypeStore,
{
    #[instrument(skip(self, file_path), fields(batch_id))]
    async fn import_file<P: AsRef<Path> + Send>(&self, file_path: P) -> ImportResult<ImportReport> {
        let batch_id = Uuid::new_v4().to_string();
        tracing::Span::current().record("batch_id", batch_id.as_str());

        let path = file_path.as_ref();
        info!(batch_id = %batch_id, file_path = %path.display(), "开始导入接线数据");

        self.run_import(path, &batch_id)
    }

    async fn batch_import<P: AsRef<Path> + Send + Sync>(
        &self,
        file_paths: Vec<P>,
    ) -> ImportResult<Vec<Result<ImportReport, String>>> {
        use futures::future::join_all;

        info!(count = file_paths.len(), "开始批量导入文件");

        // 为每个文件创建导入任务
        let import_tasks = file_paths.into_iter().map(|path| {
            let path_str = path.as_ref().display().to_string();
            async move {
                match self.import_file(path).await {
                    Ok(report) => {
                        info!(file = %path_str, devices = report.devices_seen, "文件导入成功");
                        Ok(report)
                    }
                    Err(e) => {
                        error!(file = %path_str, error = %e, "文件导入失败");
                        Err(format!("文件 {} 导入失败: {}", path_str, e))
                    }
                }
            }
        });

        // 导入主体无挂起点，各任务依次完成
        let results = join_all(import_tasks).await;

        info!(
            total = results.len(),
            success = results.iter().filter(|r| r.is_ok()).count(),
            failed = results.iter().filter(|r| r.is_err()).count(),
            "批量导入完成"
        );

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{configure_sqlite_connection, init_schema};
    use std::io::Write;
    use tempfile::{tempdir, Builder, TempDir};

    fn importer(dir: &TempDir) -> WiringImporterImpl<DeviceRepository, DeviceTypeRepository> {
        let conn = Connection::open_in_memory().unwrap();
        configure_sqlite_connection(&conn).unwrap();
        init_schema(&conn).unwrap();
        let settings = ImporterSettings {
            project_number: "P001".to_string(),
            rules_path: dir.path().join("rules.json"),
            import: ImportConfig::default(),
        };
        WiringImporterImpl::from_connection(Arc::new(Mutex::new(conn)), settings).unwrap()
    }

    fn csv_in(dir: &TempDir, lines: &[&str]) -> PathBuf {
        let mut file = Builder::new().suffix(".csv").tempfile_in(dir.path()).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        let (_, path) = file.keep().unwrap();
        path
    }

    #[tokio::test]
    async fn test_missing_column_is_reported() {
        let dir = tempdir().unwrap();
        let imp = importer(&dir);
        let path = csv_in(&dir, &["from,to", "=F+L-K1:1,=F+L-K2:1"]);

        let err = imp.import_file(&path).await.unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn(c) if c == "source"));
    }

    #[tokio::test]
    async fn test_first_run_bootstraps_then_reapply_infers() {
        let dir = tempdir().unwrap();
        let imp = importer(&dir);
        let path = csv_in(
            &dir,
            &[
                "source,target",
                "=F+K1.2-K5:A1,=F+K1.2-X1:1",
                "=F+K1.2-K5:A2,=F+K1.2-X1:2",
            ],
        );

        let report = imp.import_file(&path).await.unwrap();
        assert!(report.rules_bootstrapped);
        assert_eq!(report.connections_inferred, 0);
        assert!(imp.settings().rules_path.exists());

        let total = imp.reapply_rules().unwrap();
        assert_eq!(total, 1);
        let k5 = imp.device_store().get("=F+K1.2-K5").unwrap().unwrap();
        assert_eq!(k5.inner_connections.len(), 1);
    }
}
