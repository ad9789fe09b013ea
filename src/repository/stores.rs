// ==========================================
// 柜内接线导入系统 - 设备库 / 类型库接口
// ==========================================
// 红线: 接口不含业务规则，只做数据存取
// 实现者: DeviceRepository / DeviceTypeRepository（rusqlite）
// ==========================================

use crate::domain::{Connection, DeviceRecord, TypeRecord};
use crate::repository::error::RepositoryResult;
use std::sync::Arc;

// ==========================================
// DeviceStore - 设备库
// ==========================================
pub trait DeviceStore: Send + Sync {
    /// 按设备标识查询
    fn get(&self, device_key: &str) -> RepositoryResult<Option<DeviceRecord>>;

    /// 插入或整体替换设备记录
    fn upsert(&self, record: &DeviceRecord) -> RepositoryResult<()>;

    /// 删除设备
    ///
    /// # 返回
    /// - true: 已删除
    /// - false: 设备不存在
    fn delete(&self, device_key: &str) -> RepositoryResult<bool>;

    /// 全部设备，按 device_key 排序
    fn list(&self) -> RepositoryResult<Vec<DeviceRecord>>;

    /// 指定类型下的设备
    fn list_by_type(&self, type_label: &str) -> RepositoryResult<Vec<DeviceRecord>>;

    /// 批量 upsert，缺省逐条写入
    fn upsert_many(&self, records: &[DeviceRecord]) -> RepositoryResult<usize> {
        for record in records {
            self.upsert(record)?;
        }
        Ok(records.len())
    }
}

// ==========================================
// TypeStore - 类型库
// ==========================================
pub trait TypeStore: Send + Sync {
    /// 按指纹查询类型标签
    fn find_by_fingerprint(&self, fingerprint: &str) -> RepositoryResult<Option<String>>;

    /// 按标签查询完整类型记录
    fn find_by_label(&self, type_label: &str) -> RepositoryResult<Option<TypeRecord>>;

    /// 创建类型记录
    ///
    /// # 返回
    /// - Ok(type_label)
    /// - Err(FingerprintConflict): 指纹已被其他调用方注册
    /// - Err(LabelConflict): 标签已被占用
    fn create(&self, record: &TypeRecord) -> RepositoryResult<String>;

    /// 已发放的最大标签序号（无则为 0）
    fn max_label_suffix(&self) -> RepositoryResult<u64>;

    /// 整体替换类型的内部连接
    fn update_inner_connections(
        &self,
        type_label: &str,
        connections: &[Connection],
    ) -> RepositoryResult<()>;

    /// 全部类型，按标签序号排序
    fn list(&self) -> RepositoryResult<Vec<TypeRecord>>;
}

// ==========================================
// Arc 共享: 多个导入任务共用同一仓储实例
// ==========================================
impl<T: DeviceStore + ?Sized> DeviceStore for Arc<T> {
    fn get(&self, device_key: &str) -> RepositoryResult<Option<DeviceRecord>> {
        (**self).get(device_key)
    }

    fn upsert(&self, record: &DeviceRecord) -> RepositoryResult<()> {
        (**self).upsert(record)
    }

    fn delete(&self, device_key: &str) -> RepositoryResult<bool> {
        (**self).delete(device_key)
    }

    fn list(&self) -> RepositoryResult<Vec<DeviceRecord>> {
        (**self).list()
    }

    fn list_by_type(&self, type_label: &str) -> RepositoryResult<Vec<DeviceRecord>> {
        (**self).list_by_type(type_label)
    }

    fn upsert_many(&self, records: &[DeviceRecord]) -> RepositoryResult<usize> {
        (**self).upsert_many(records)
    }
}

impl<T: TypeStore + ?Sized> TypeStore for Arc<T> {
    fn find_by_fingerprint(&self, fingerprint: &str) -> RepositoryResult<Option<String>> {
        (**self).find_by_fingerprint(fingerprint)
    }

    fn find_by_label(&self, type_label: &str) -> RepositoryResult<Option<TypeRecord>> {
        (**self).find_by_label(type_label)
    }

    fn create(&self, record: &TypeRecord) -> RepositoryResult<String> {
        (**self).create(record)
    }

    fn max_label_suffix(&self) -> RepositoryResult<u64> {
        (**self).max_label_suffix()
    }

    fn update_inner_connections(
        &self,
        type_label: &str,
        connections: &[Connection],
    ) -> RepositoryResult<()> {
        (**self).update_inner_connections(type_label, connections)
    }

    fn list(&self) -> RepositoryResult<Vec<TypeRecord>> {
        (**self).list()
    }
}
