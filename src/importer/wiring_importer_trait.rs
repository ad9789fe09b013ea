// ==========================================
// 柜内接线导入系统 - 导入 Trait
// ==========================================
// 职责: 定义导入接口（不包含实现）
// ==========================================

use crate::domain::ImportReport;
use crate::importer::error::ImportResult;
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;

// ==========================================
// RawRecord - 一行原始数据
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub row_number: usize,               // 文件物理行号（从 1 开始）
    pub fields: HashMap<String, String>, // 表头 → 单元格文本（已 trim）
}

impl RawRecord {
    /// 读取列值，缺列返回 None
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// 读取非空列值
    pub fn non_empty(&self, column: &str) -> Option<&str> {
        self.get(column).filter(|v| !v.is_empty())
    }
}

// ==========================================
// WiringImporter Trait
// ==========================================
// 用途: 接线导入主接口
// 实现者: WiringImporterImpl
#[async_trait]
pub trait WiringImporter: Send + Sync {
    /// 导入一个接线导出文件
    ///
    /// # 参数
    /// - file_path: CSV / Excel 文件路径
    ///
    /// # 返回
    /// - Ok(ImportReport): 导入汇总（单行格式问题只计数，不报错）
    /// - Err: 文件读取错误、存储错误
    ///
    /// # 导入流程
    /// 1. 文件读取与解析
    /// 2. 标签解析、设备端子累积、跨设备接线收集
    /// 3. 合并设备库中已存端子，剔除端子不足的设备
    /// 4. 指纹计算与类型注册
    /// 5. 规则目录加载（缺失则自举并跳过推断）
    /// 6. 内部连接推断
    /// 7. 落库 + 批次报告
    async fn import_file<P: AsRef<Path> + Send>(&self, file_path: P) -> ImportResult<ImportReport>;

    /// 批量导入多个文件
    ///
    /// # 说明
    /// - 导入主体为同步执行，文件按输入顺序依次处理，结果顺序与输入一致
    /// - 每个文件的导入是独立的，某个文件失败不影响其他文件
    /// - 多线程共用同一导入器时，类型注册在注册表互斥锁内完成，指纹 ↔ 标签双射不受影响
    async fn batch_import<P: AsRef<Path> + Send + Sync>(
        &self,
        file_paths: Vec<P>,
    ) -> ImportResult<Vec<Result<ImportReport, String>>>;
}

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（Row Source）
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始记录
    ///
    /// # 返回
    /// - Ok(Vec<RawRecord>): 按文件顺序的非空数据行
    /// - Err: 文件不存在、格式不支持、解析失败
    fn parse_to_raw_records(&self, file_path: &Path) -> ImportResult<Vec<RawRecord>>;
}
