// ==========================================
// 柜内接线导入系统 - 配置层
// ==========================================
// 职责: 数据库路径、输入文件、列名与导入参数
// 存储: config.json
// ==========================================

pub mod config_manager;
pub mod error;

// 重导出核心配置管理器
pub use config_manager::{
    default_db_path, AppConfig, ConfigManager, DatabaseConfig, FilesConfig, ImportConfig,
    DB_PATH_ENV, DEFAULT_CONFIG_FILE,
};
pub use error::{ConfigError, ConfigResult};
