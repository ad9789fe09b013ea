// ==========================================
// 柜内接线导入系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型与端子排序
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod connection;
pub mod device;
pub mod device_type;
pub mod import;
pub mod terminal;
pub mod types;

// 重导出核心类型
pub use connection::{Connection, ExternalWire, RuleCatalog, RuleTemplate};
pub use device::{DeviceIdentifier, DeviceRecord};
pub use device_type::{format_type_label, parse_type_label_suffix, TypeRecord, TYPE_LABEL_PREFIX};
pub use import::{ImportBatch, ImportReport, PhaseTiming};
pub use terminal::{compare_terminals, ordered_pair, sort_terminals};
pub use types::{ConnectionKind, VertexRole};
