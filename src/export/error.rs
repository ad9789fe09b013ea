// ==========================================
// 柜内接线导入系统 - 导出层错误类型
// ==========================================

use crate::repository::RepositoryError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("导出目录不可用 ({path}): {message}")]
    OutputDir { path: String, message: String },

    #[error("导出文件写入失败 ({path}): {message}")]
    Write { path: String, message: String },

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result 类型别名
pub type ExportResult<T> = Result<T, ExportError>;
