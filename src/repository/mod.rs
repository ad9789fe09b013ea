// ==========================================
// 柜内接线导入系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod device_repo;
pub mod device_type_repo;
pub mod error;
pub mod import_batch_repo;
pub mod stores;
pub mod wire_repo;

// 重导出核心仓储
pub use device_repo::DeviceRepository;
pub use device_type_repo::DeviceTypeRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use import_batch_repo::ImportBatchRepository;
pub use stores::{DeviceStore, TypeStore};
pub use wire_repo::WireRepository;
