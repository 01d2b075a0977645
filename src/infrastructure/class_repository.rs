//! 课程仓库 - 基础设施层
//!
//! 课程的权威存储，其他模块持有的都是快照。

use futures::future::{BoxFuture, FutureExt};
use std::collections::BTreeMap;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::RepositoryError;
use crate::models::{ClassId, ClassPatch, ClassRecord};

/// 课程持久化接口
///
/// 实现方以 `Network`、`Validation` 或 `NotFound` 报告失败，自身不做重试。
pub trait ClassRepository: Send + Sync {
    fn get(&self, id: ClassId) -> BoxFuture<'_, Result<ClassRecord, RepositoryError>>;

    /// 保存新记录并返回分配的 ID
    fn create(&self, record: ClassRecord) -> BoxFuture<'_, Result<ClassId, RepositoryError>>;

    fn update(&self, id: ClassId, patch: ClassPatch) -> BoxFuture<'_, Result<(), RepositoryError>>;

    fn delete(&self, id: ClassId) -> BoxFuture<'_, Result<(), RepositoryError>>;

    /// 修改私有课程的密码
    fn update_password(
        &self,
        id: ClassId,
        new_password: String,
    ) -> BoxFuture<'_, Result<(), RepositoryError>>;
}

/// 进程内仓库
///
/// 供二进制程序（由课程文件初始化）和测试使用。
#[derive(Debug, Default)]
pub struct InMemoryClassRepository {
    records: RwLock<BTreeMap<ClassId, ClassRecord>>,
}

impl InMemoryClassRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 用已有记录初始化；id 为 0 或重复的记录分配下一个空闲 ID
    pub fn with_records(records: impl IntoIterator<Item = ClassRecord>) -> Self {
        let mut map = BTreeMap::new();
        for mut record in records {
            if record.id == 0 || map.contains_key(&record.id) {
                record.id = next_id(&map);
            }
            map.insert(record.id, record);
        }
        Self {
            records: RwLock::new(map),
        }
    }

    /// 当前已保存的 ID（升序）
    pub async fn ids(&self) -> Vec<ClassId> {
        self.records.read().await.keys().copied().collect()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

fn next_id(map: &BTreeMap<ClassId, ClassRecord>) -> ClassId {
    map.keys().next_back().map_or(1, |last| last + 1)
}

impl ClassRepository for InMemoryClassRepository {
    fn get(&self, id: ClassId) -> BoxFuture<'_, Result<ClassRecord, RepositoryError>> {
        async move {
            self.records
                .read()
                .await
                .get(&id)
                .cloned()
                .ok_or(RepositoryError::NotFound(id))
        }
        .boxed()
    }

    fn create(&self, mut record: ClassRecord) -> BoxFuture<'_, Result<ClassId, RepositoryError>> {
        async move {
            record.validate()?;
            let mut records = self.records.write().await;
            let id = next_id(&records);
            record.id = id;
            info!("✓ 创建课程 {} \"{}\"", id, record.title);
            records.insert(id, record);
            Ok(id)
        }
        .boxed()
    }

    fn update(&self, id: ClassId, patch: ClassPatch) -> BoxFuture<'_, Result<(), RepositoryError>> {
        async move {
            let mut records = self.records.write().await;
            let current = records.get(&id).ok_or(RepositoryError::NotFound(id))?;

            let mut updated = current.clone();
            patch.apply_to(&mut updated);
            updated.id = id;
            updated.validate()?;

            debug!("更新课程 {}", id);
            records.insert(id, updated);
            Ok(())
        }
        .boxed()
    }

    fn delete(&self, id: ClassId) -> BoxFuture<'_, Result<(), RepositoryError>> {
        async move {
            self.records
                .write()
                .await
                .remove(&id)
                .map(|_| info!("删除课程 {}", id))
                .ok_or(RepositoryError::NotFound(id))
        }
        .boxed()
    }

    fn update_password(
        &self,
        id: ClassId,
        new_password: String,
    ) -> BoxFuture<'_, Result<(), RepositoryError>> {
        async move {
            if new_password.trim().is_empty() {
                return Err(RepositoryError::Validation(
                    "密码不能为空".to_string(),
                ));
            }
            let mut records = self.records.write().await;
            let record = records.get_mut(&id).ok_or(RepositoryError::NotFound(id))?;
            record.visibility.password = Some(new_password);
            info!("课程 {} 的密码已修改", id);
            Ok(())
        }
        .boxed()
    }
}
