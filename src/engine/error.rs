// ==========================================
// 柜内接线导入系统 - 引擎层错误类型
// ==========================================
// 解析/规范化/推断均不报错，只有规则目录读写可能失败
// ==========================================

use thiserror::Error;

/// 规则目录读写错误
#[derive(Error, Debug)]
pub enum RuleCatalogError {
    #[error("规则目录不存在: {0}")]
    Missing(String),

    #[error("规则目录读写失败 ({path}): {message}")]
    Io { path: String, message: String },

    #[error("规则目录格式错误 ({path}): {message}")]
    Parse { path: String, message: String },
}

/// Result 类型别名
pub type RuleCatalogResult<T> = Result<T, RuleCatalogError>;
