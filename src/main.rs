// ==========================================
// 柜内接线导入系统 - 命令行入口
// ==========================================
// 用法:
//   panel-wiring import [config.json]           导入 files.csv_path
//   panel-wiring bootstrap-rules [config.json]  从类型库自举规则目录
//   panel-wiring reinfer [config.json]          按规则目录重新推断内部连接
//   panel-wiring export [config.json]           导出图数据 CSV 到 files.export_dir
// ==========================================

use anyhow::{bail, Context};
use panel_wiring::config::{default_db_path, ConfigManager, DB_PATH_ENV, DEFAULT_CONFIG_FILE};
use panel_wiring::db::{check_schema_version, open_shared_connection};
use panel_wiring::export::{CsvGraphExporter, GraphExporter, GraphSnapshot};
use panel_wiring::importer::{ImporterSettings, WiringImporter, WiringImporterImpl};
use panel_wiring::logging;

const USAGE: &str = "用法: panel-wiring <import|bootstrap-rules|reinfer|export> [config.json]";

/// 数据库路径: 环境变量 / 配置文件 > 用户数据目录
fn resolve_db_path(manager: &ConfigManager) -> String {
    let env_set = std::env::var(DB_PATH_ENV)
        .map(|v| !v.trim().is_empty())
        .unwrap_or(false);
    if manager.source().is_none() && !env_set {
        return default_db_path();
    }
    manager
        .resolve_path(&manager.db_path())
        .to_string_lossy()
        .to_string()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let command = match args.next() {
        Some(c) => c,
        None => bail!(USAGE),
    };
    let config_path = args.next().unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());

    tracing::info!("==================================================");
    tracing::info!("{} v{}", panel_wiring::APP_NAME, panel_wiring::VERSION);
    tracing::info!("==================================================");

    let manager = ConfigManager::load_or_default(&config_path)
        .with_context(|| format!("配置加载失败: {}", config_path))?;
    let db_path = resolve_db_path(&manager);
    tracing::info!(db_path = %db_path, "使用数据库");

    let conn = open_shared_connection(&db_path)
        .with_context(|| format!("数据库打开失败: {}", db_path))?;
    {
        let guard = conn
            .lock()
            .map_err(|e| anyhow::anyhow!("数据库锁获取失败: {}", e))?;
        check_schema_version(&guard)?;
    }

    let importer = WiringImporterImpl::from_connection(conn, ImporterSettings::from_config(&manager))?;

    match command.as_str() {
        "import" => {
            let csv_path = manager.resolve_path(&manager.config().files.csv_path);
            let report = importer.import_file(&csv_path).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        "bootstrap-rules" => {
            let catalog = importer.bootstrap_rules()?;
            println!(
                "规则目录已写入 {} ({} 条规则)",
                importer.settings().rules_path.display(),
                catalog.len()
            );
        }
        "reinfer" => {
            let total = importer.reapply_rules()?;
            println!("内部连接已重新推断: {} 条", total);
        }
        "export" => {
            let export_dir = manager.resolve_path(&manager.config().files.export_dir);
            let snapshot = GraphSnapshot::collect(
                importer.device_store(),
                importer.type_store(),
                importer.wire_repo(),
            )?;
            let summary = CsvGraphExporter::new(&export_dir).export(&snapshot)?;
            println!(
                "已导出到 {}: {}",
                export_dir.display(),
                serde_json::to_string(&summary)?
            );
        }
        other => bail!("未知命令: {}\n{}", other, USAGE),
    }

    Ok(())
}
