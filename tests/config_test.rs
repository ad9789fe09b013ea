// ==========================================
// 配置加载测试
// ==========================================

use panel_wiring::config::{ConfigError, ConfigManager};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_partial_config_uses_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(
        &path,
        r#"{ "files": { "project_number": "P042", "csv_path": "in/wiring.csv" },
             "import": { "skip_leading_rows": 2 } }"#,
    )
    .unwrap();

    let manager = ConfigManager::load(&path).unwrap();
    let cfg = manager.config();
    assert_eq!(cfg.files.project_number, "P042");
    assert_eq!(cfg.files.rules_path, "rules_type_conn.json");
    assert_eq!(cfg.import.skip_leading_rows, 2);
    assert_eq!(cfg.import.min_terminal_count, 2);
    assert_eq!(cfg.import.source_column, "source");

    // 相对路径按配置文件目录解析
    assert_eq!(
        manager.resolve_path(&cfg.files.csv_path),
        dir.path().join("in/wiring.csv")
    );
}

#[test]
fn test_invalid_values_are_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{ "import": { "min_terminal_count": 1 } }"#).unwrap();

    let err = ConfigManager::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == "import.min_terminal_count"));
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.json");

    assert!(matches!(ConfigManager::load(&path), Err(ConfigError::NotFound(_))));
    let manager = ConfigManager::load_or_default(&path).unwrap();
    assert!(manager.source().is_none());
    assert_eq!(manager.config().files.export_dir, "export");
}
