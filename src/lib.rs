// ==========================================
// 柜内接线导入系统 - 核心库
// ==========================================
// 输入: CAD 接线导出 (=功能+位置-设备:端子)
// 输出: 设备库、类型库、内部连接、外部接线、图数据文件
// 技术栈: Rust + SQLite
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 解析/指纹/类型/规则/推断
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 导出层 - 图数据
pub mod export;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 性能埋点（SQL 追踪/阶段耗时）
pub mod perf;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{ConnectionKind, VertexRole};

// 领域实体
pub use domain::{
    Connection, DeviceIdentifier, DeviceRecord, ExternalWire, ImportReport, RuleCatalog,
    RuleTemplate, TypeRecord,
};

// 引擎
pub use engine::{TypeRegistry, VertexClassifier};

// 导入 / 导出
pub use export::{CsvGraphExporter, GraphExporter};
pub use importer::{WiringImporter, WiringImporterImpl};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "柜内接线导入系统";

// 数据库版本
pub const DB_VERSION: &str = "v2";
