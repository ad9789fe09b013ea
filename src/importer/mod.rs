// ==========================================
// 柜内接线导入系统 - 导入层
// ==========================================
// 职责: 接线导出文件 → 设备库 / 类型库 / 外部接线
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod device_collector;
pub mod error;
pub mod file_parser;
pub mod wiring_importer_impl;
pub mod wiring_importer_trait;

// 重导出核心类型
pub use device_collector::{CollectStats, DeviceCollector};
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use wiring_importer_impl::{ImporterSettings, WiringImporterImpl};

// 重导出 Trait 接口
pub use wiring_importer_trait::{FileParser, RawRecord, WiringImporter};
