//! 远程存储抽象
//!
//! 远程存储按集合提供两类能力：
//! - 订阅：立即推送当前完整快照，之后每次变更再推送一次完整快照
//! - 写入：按（集合, 键）创建、合并更新、删除
//!
//! 传输与持久化由具体实现负责，同步层只依赖本 trait。

use std::sync::Arc;

use futures_util::stream::BoxStream;
use serde_json::Value;
use tracing::warn;

use crate::config::AppConfig;
use crate::errors::{ClassHubError, Result};
use crate::models::{CollectionKind, Snapshot};
use crate::utils::RawFields;

pub mod memory;
pub mod register;

pub use memory::MemoryRemoteStore;

/// 单个集合的快照推送流
pub type SnapshotStream = BoxStream<'static, Result<Arc<Snapshot>>>;

#[async_trait::async_trait]
pub trait RemoteStore: Send + Sync {
    /// 订阅某个集合
    async fn subscribe(&self, kind: CollectionKind) -> Result<SnapshotStream>;
    /// 为新记录分配键（同步返回，写入完成前即可引用）
    fn allocate_key(&self, kind: CollectionKind) -> String;
    // 整体写入一条记录
    async fn set_value(&self, kind: CollectionKind, key: &str, fields: RawFields) -> Result<()>;
    // 合并更新记录的顶层字段
    async fn update_values(&self, kind: CollectionKind, key: &str, fields: RawFields)
    -> Result<()>;
    // 删除一条记录
    async fn remove_value(&self, kind: CollectionKind, key: &str) -> Result<()>;
    // 单次读取 users/<id> 节点
    async fn fetch_user(&self, user_id: &str) -> Result<Option<Value>>;
}

/// 默认存储插件
pub const DEFAULT_STORE_PLUGIN: &str = "memory";

/// 根据配置创建远程存储，配置的插件不可用时回退到内存存储
pub async fn create_store(config: &AppConfig) -> Result<Arc<dyn RemoteStore>> {
    register::register_builtin_plugins();
    let backend = config.store.backend.as_str();

    warn!("Attempting to create {} store backend", backend);

    if let Some(constructor) = register::get_remote_store_plugin(backend) {
        match constructor(config.clone()).await {
            Ok(store) => {
                warn!("Successfully created {} store backend", backend);
                return Ok(Arc::from(store));
            }
            Err(e) => {
                warn!("Failed to create {} store: {}", backend, e);
            }
        }
    } else {
        warn!("Store backend '{}' not found in registry", backend);
    }

    if backend != DEFAULT_STORE_PLUGIN {
        warn!("Falling back to default memory store");
        if let Some(fallback_constructor) = register::get_remote_store_plugin(DEFAULT_STORE_PLUGIN)
        {
            match fallback_constructor(config.clone()).await {
                Ok(store) => {
                    warn!("Successfully created fallback memory store backend");
                    return Ok(Arc::from(store));
                }
                Err(fallback_e) => {
                    warn!("Failed to create fallback memory store: {}", fallback_e);
                }
            }
        }
    }

    Err(ClassHubError::store_plugin_not_found(format!(
        "No store backend available (tried: {backend})"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_backend_falls_back_to_memory() {
        let mut config = AppConfig::load().unwrap();
        config.store.backend = "firebase".to_string();
        config.store.seed_file = String::new();
        let store = create_store(&config).await.unwrap();
        assert!(!store.allocate_key(CollectionKind::Classes).is_empty());
    }

    #[tokio::test]
    async fn test_memory_backend_with_missing_seed_file_fails() {
        let mut config = AppConfig::load().unwrap();
        config.store.backend = DEFAULT_STORE_PLUGIN.to_string();
        config.store.seed_file = "/nonexistent/classhub-seed.json".to_string();
        let err = create_store(&config).await.err().unwrap();
        assert_eq!(err.code(), "E003");
    }
}
