// ==========================================
// 柜内接线导入系统 - 类型注册表
// ==========================================
// 职责: 指纹 → 类型标签（双射）
//   - 已知指纹: 直接返回已有标签，不修改任何数据
//   - 新指纹: 分配 TYPE<n> 并持久化
// 并发:
//   - 进程内: 「查询 → 创建」整体在注册表互斥锁内执行
//   - 进程间: 依赖类型库的唯一约束
//       指纹冲突 → 重新查询并返回胜出方的标签
//       标签冲突 → 按类型库最大序号重新播种后重试
// 标签序号单调递增、永不复用（启动时从类型库播种）
// ==========================================

use crate::domain::{format_type_label, Connection, TypeRecord};
use crate::repository::{RepositoryError, RepositoryResult, TypeStore};
use chrono::Utc;
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// 标签冲突时的最大重试次数
const MAX_LABEL_ATTEMPTS: usize = 8;

// ==========================================
// TypeLabelAllocator - 标签序号分配器
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeLabelAllocator {
    next_suffix: u64,
}

impl TypeLabelAllocator {
    /// 从已发放的最大序号播种（0 表示尚无标签）
    pub fn seeded(max_suffix: u64) -> Self {
        Self {
            next_suffix: max_suffix.saturating_add(1),
        }
    }

    /// 下一个待发放的序号（不消耗）
    pub fn peek(&self) -> u64 {
        self.next_suffix
    }

    /// 发放下一个标签
    pub fn next_label(&mut self) -> String {
        let label = format_type_label(self.next_suffix);
        self.next_suffix = self.next_suffix.saturating_add(1);
        label
    }

    /// 确保后续序号大于 suffix
    pub fn advance_past(&mut self, suffix: u64) {
        if suffix >= self.next_suffix {
            self.next_suffix = suffix.saturating_add(1);
        }
    }
}

/// 一次 resolve 的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeResolution {
    pub type_label: String,
    pub created: bool,
}

// ==========================================
// TypeRegistry
// ==========================================
pub struct TypeRegistry<S: TypeStore> {
    store: S,
    allocator: Mutex<TypeLabelAllocator>,
}

impl<S: TypeStore> TypeRegistry<S> {
    /// 创建注册表，从类型库播种标签序号
    pub fn new(store: S) -> RepositoryResult<Self> {
        let max_suffix = store.max_label_suffix()?;
        info!(max_suffix, "类型注册表已播种");
        Ok(Self {
            store,
            allocator: Mutex::new(TypeLabelAllocator::seeded(max_suffix)),
        })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 将指纹解析为类型标签（无则创建）
    ///
    /// # 参数
    /// - fingerprint: 规范指纹
    /// - terminal_count: 端子数（仅新建时写入类型记录）
    pub fn resolve(&self, fingerprint: &str, terminal_count: usize) -> RepositoryResult<TypeResolution> {
        let mut allocator = self
            .allocator
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;

        if let Some(type_label) = self.store.find_by_fingerprint(fingerprint)? {
            return Ok(TypeResolution {
                type_label,
                created: false,
            });
        }

        for attempt in 1..=MAX_LABEL_ATTEMPTS {
            let record = TypeRecord {
                type_label: allocator.next_label(),
                fingerprint: fingerprint.to_string(),
                terminal_count,
                inner_connections: Vec::<Connection>::new(),
                created_at: Utc::now(),
            };

            match self.store.create(&record) {
                Ok(type_label) => {
                    debug!(type_label = %type_label, fingerprint, "新类型已注册");
                    return Ok(TypeResolution {
                        type_label,
                        created: true,
                    });
                }
                Err(RepositoryError::FingerprintConflict { .. }) => {
                    // 其他调用方先注册了同一指纹，以胜出方为准
                    warn!(fingerprint, "类型指纹并发冲突，改用已注册标签");
                    return match self.store.find_by_fingerprint(fingerprint)? {
                        Some(type_label) => Ok(TypeResolution {
                            type_label,
                            created: false,
                        }),
                        None => Err(RepositoryError::InternalError(format!(
                            "指纹冲突后重查为空: {}",
                            fingerprint
                        ))),
                    };
                }
                Err(RepositoryError::LabelConflict { type_label }) => {
                    let max_suffix = self.store.max_label_suffix()?;
                    warn!(
                        type_label = %type_label,
                        max_suffix,
                        attempt,
                        "类型标签已被占用，重新播种"
                    );
                    allocator.advance_past(max_suffix);
                }
                Err(e) => return Err(e),
            }
        }

        Err(RepositoryError::InternalError(format!(
            "类型标签分配重试耗尽: fingerprint={}",
            fingerprint
        )))
    }
}
