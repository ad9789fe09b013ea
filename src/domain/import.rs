// ==========================================
// 柜内接线导入系统 - 导入批次与报告
// ==========================================
// 对齐: import_batch 表
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ==========================================
// ImportBatch - 导入批次
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportBatch {
    pub batch_id: String,                   // 批次 ID（UUID）
    pub project_number: String,             // 项目编号
    pub file_path: Option<String>,          // 源文件路径
    pub started_at: DateTime<Utc>,          // 开始时间
    pub finished_at: Option<DateTime<Utc>>, // 结束时间
    pub report_json: Option<String>,        // ImportReport JSON
}

// ==========================================
// ImportReport - 导入汇总
// ==========================================
// 单行格式错误不终止批次，只体现在计数里
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub batch_id: String,
    pub file_path: String,
    pub total_rows: usize,               // 数据行数
    pub rows_without_tags: usize,        // source/target 均为空的行
    pub devices_seen: usize,             // 观测到的设备数
    pub devices_excluded: usize,         // 端子不足被剔除的设备数
    pub types_created: usize,            // 新建类型数
    pub types_reused: usize,             // 复用已有类型的设备数
    pub connections_inferred: usize,     // 推断出的内部连接数（按类型计）
    pub wires_recorded: usize,           // 写入的跨设备接线数
    pub wires_skipped_protective: usize, // 因 PE/N 跳过的接线数
    pub rules_bootstrapped: bool,        // 本次是否因缺少规则目录而自举
    pub elapsed_ms: u64,
    #[serde(default)]
    pub phases: Vec<PhaseTiming>,        // 各阶段耗时，按执行顺序
}

// ==========================================
// PhaseTiming - 导入阶段耗时
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseTiming {
    pub phase: String,   // 例如 import.parse
    pub elapsed_ms: u64,
    pub sql_count: u64,  // 未开启 SQL 统计时为 0
}
