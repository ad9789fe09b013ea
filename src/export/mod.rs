// ==========================================
// 柜内接线导入系统 - 导出层
// ==========================================
// 职责: 设备/端子/类型/连接 → 图数据加载文件
// ==========================================

pub mod csv_exporter;
pub mod error;
pub mod graph_exporter;

pub use csv_exporter::CsvGraphExporter;
pub use error::{ExportError, ExportResult};
pub use graph_exporter::{terminal_node_id, ExportSummary, GraphExporter, GraphSnapshot};
