// ==========================================
// 柜内接线导入系统 - 配置管理器
// ==========================================
// 存储: config.json（所有字段可缺省）
// 职责: 配置加载、校验、缺省值
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use crate::engine::DEFAULT_PANEL_LOCATION_PREFIX;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// 缺省配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "config.json";

/// 数据库路径环境变量（优先于配置文件）
pub const DB_PATH_ENV: &str = "PANEL_WIRING_DB_PATH";

// ==========================================
// 配置结构
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "panel_wiring.db".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    pub csv_path: String,
    pub project_number: String,
    pub rules_path: String,
    pub export_dir: String,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            csv_path: "data/wiring.csv".to_string(),
            project_number: "P000".to_string(),
            rules_path: "rules_type_conn.json".to_string(),
            export_dir: "export".to_string(),
        }
    }
}

/// 导入参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub source_column: String,
    pub target_column: String,
    pub wire_number_column: String,
    pub skip_leading_rows: usize,   // 表头前的说明行数
    pub min_terminal_count: usize,  // 参与类型分配的最少端子数
    pub panel_location_prefix: String,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            source_column: "source".to_string(),
            target_column: "target".to_string(),
            wire_number_column: "Consecutive number".to_string(),
            skip_leading_rows: 0,
            min_terminal_count: 2,
            panel_location_prefix: DEFAULT_PANEL_LOCATION_PREFIX.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub files: FilesConfig,
    pub import: ImportConfig,
}

impl AppConfig {
    /// 校验配置取值
    pub fn validate(&self) -> ConfigResult<()> {
        let required = [
            ("import.source_column", &self.import.source_column),
            ("import.target_column", &self.import.target_column),
            ("files.project_number", &self.files.project_number),
            ("files.rules_path", &self.files.rules_path),
            ("database.path", &self.database.path),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: "不能为空".to_string(),
                });
            }
        }

        if self.import.min_terminal_count < 2 {
            return Err(ConfigError::InvalidValue {
                key: "import.min_terminal_count".to_string(),
                message: format!("至少为 2，实际 {}", self.import.min_terminal_count),
            });
        }
        Ok(())
    }
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config: AppConfig,
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// 从配置文件加载并校验
    ///
    /// # 参数
    /// - path: config.json 路径
    ///
    /// # 返回
    /// - Err(NotFound): 文件不存在
    /// - Err(Parse): JSON 格式错误
    /// - Err(InvalidValue): 取值不合法
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }

        let text = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let config = Self::parse(&text)?;

        info!(path = %path.display(), project = %config.files.project_number, "配置已加载");
        Ok(Self {
            config,
            source: Some(path.to_path_buf()),
        })
    }

    /// 文件存在则加载，否则使用缺省配置
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        match Self::load(path) {
            Err(ConfigError::NotFound(missing)) => {
                info!(path = %missing, "配置文件不存在，使用缺省配置");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// 从 JSON 文本解析并校验
    pub fn parse(text: &str) -> ConfigResult<AppConfig> {
        let config: AppConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn import_config(&self) -> &ImportConfig {
        &self.config.import
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// 数据库路径: 环境变量 > 配置文件
    pub fn db_path(&self) -> String {
        if let Ok(path) = std::env::var(DB_PATH_ENV) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
        self.config.database.path.clone()
    }

    /// 相对路径按配置文件所在目录解析
    pub fn resolve_path(&self, raw: &str) -> PathBuf {
        let candidate = PathBuf::from(raw);
        if candidate.is_absolute() {
            return candidate;
        }
        match self.source.as_ref().and_then(|p| p.parent()) {
            Some(dir) if !dir.as_os_str().is_empty() => dir.join(candidate),
            _ => candidate,
        }
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            source: None,
        }
    }
}

/// 用户数据目录下的缺省数据库路径
///
/// # 返回
/// - 能取到用户数据目录: <data_dir>/panel-wiring/panel_wiring.db
/// - 否则: ./panel_wiring.db
pub fn default_db_path() -> String {
    let mut path = PathBuf::from("./panel_wiring.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("panel-wiring");
        // 目录创建失败时退回当前目录
        if fs::create_dir_all(&dir).is_ok() {
            path = dir.join("panel_wiring.db");
        }
    }
    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.import.source_column, "source");
        assert_eq!(cfg.import.wire_number_column, "Consecutive number");
        assert_eq!(cfg.import.min_terminal_count, 2);
        assert_eq!(cfg.import.panel_location_prefix, "K1.");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let cfg = ConfigManager::parse(
            r#"{"files": {"project_number": "P042"}, "import": {"skip_leading_rows": 2}}"#,
        )
        .unwrap();
        assert_eq!(cfg.files.project_number, "P042");
        assert_eq!(cfg.files.rules_path, "rules_type_conn.json");
        assert_eq!(cfg.import.skip_leading_rows, 2);
        assert_eq!(cfg.import.target_column, "target");
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let err = ConfigManager::parse(r#"{"import": {"min_terminal_count": 1}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        let err = ConfigManager::parse(r#"{"import": {"source_column": " "}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));

        assert!(matches!(
            ConfigManager::parse("{oops"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_resolves_relative_paths() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"files": {{"csv_path": "wiring.csv"}}}}"#).unwrap();

        let manager = ConfigManager::load(file.path()).unwrap();
        let resolved = manager.resolve_path(&manager.config().files.csv_path);
        assert_eq!(resolved.parent(), file.path().parent());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            ConfigManager::load("/nonexistent/config.json"),
            Err(ConfigError::NotFound(_))
        ));
        assert!(ConfigManager::load_or_default("/nonexistent/config.json").is_ok());
    }
}
