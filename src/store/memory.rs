//! 内存远程存储
//!
//! 用于本地运行与测试：每个集合按键有序保存原始记录，
//! 每次变更后向订阅者广播完整快照。支持从 JSON 文档加载初始数据，
//! 并提供写入失败与推送错误的注入。

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use dashmap::DashMap;
use futures_util::StreamExt;
use futures_util::stream;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::errors::{ClassHubError, Result};
use crate::models::{CollectionKind, Snapshot};
use crate::store::{RemoteStore, SnapshotStream};
use crate::utils::RawFields;

/// 用户节点在种子文档中的名称
const USERS_NODE: &str = "users";

type Delivery = Result<Arc<Snapshot>>;

struct MemoryCollection {
    records: BTreeMap<String, Value>,
    tx: broadcast::Sender<Delivery>,
}

impl MemoryCollection {
    fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self {
            records: BTreeMap::new(),
            tx,
        }
    }

    fn snapshot(&self) -> Arc<Snapshot> {
        Arc::new(
            self.records
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
        )
    }

    fn publish(&self) {
        // 没有订阅者时发送失败是正常情况
        let _ = self.tx.send(Ok(self.snapshot()));
    }
}

pub struct MemoryRemoteStore {
    collections: DashMap<CollectionKind, MemoryCollection>,
    users: DashMap<String, Value>,
    write_failure: Mutex<Option<String>>,
}

impl MemoryRemoteStore {
    pub fn new(capacity: usize) -> Self {
        let collections = DashMap::new();
        for kind in CollectionKind::ALL {
            collections.insert(kind, MemoryCollection::new(capacity));
        }
        Self {
            collections,
            users: DashMap::new(),
            write_failure: Mutex::new(None),
        }
    }

    /// 按配置创建，配置了种子文件时加载初始数据
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let store = Self::new(config.sync.channel_capacity);
        if let Some(path) = config.seed_file() {
            let content = std::fs::read_to_string(path)?;
            let document: Value = serde_json::from_str(&content)?;
            store.seed(&document)?;
            info!("Memory store seeded from {}", path);
        }
        Ok(store)
    }

    /// 加载形如 `{ "<collection>": { "<key>": { ... } } }` 的文档
    pub fn seed(&self, document: &Value) -> Result<()> {
        let nodes = document
            .as_object()
            .ok_or_else(|| ClassHubError::validation("Seed document must be an object"))?;

        for (node, children) in nodes {
            let Some(children) = children.as_object() else {
                warn!("Seed node '{}' is not an object, skipped", node);
                continue;
            };

            if node == USERS_NODE {
                for (id, value) in children {
                    self.users.insert(id.clone(), value.clone());
                }
                continue;
            }

            let Ok(kind) = node.parse::<CollectionKind>() else {
                warn!("Unknown seed node '{}', skipped", node);
                continue;
            };
            if let Some(mut collection) = self.collections.get_mut(&kind) {
                for (key, value) in children {
                    collection.records.insert(key.clone(), value.clone());
                }
                collection.publish();
            }
        }
        Ok(())
    }

    /// 写入 users/<id> 节点
    pub fn put_user(&self, user_id: impl Into<String>, value: Value) {
        self.users.insert(user_id.into(), value);
    }

    /// 让后续写入全部失败（`None` 恢复正常）
    pub fn fail_writes(&self, message: Option<&str>) {
        let mut guard = self
            .write_failure
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *guard = message.map(str::to_string);
    }

    /// 向某个集合的订阅者推送一次错误
    pub fn inject_delivery_error(&self, kind: CollectionKind, message: &str) {
        if let Some(collection) = self.collections.get(&kind) {
            let _ = collection.tx.send(Err(ClassHubError::subscription(message)));
        }
    }

    /// 集合当前记录数
    pub fn record_count(&self, kind: CollectionKind) -> usize {
        self.collections
            .get(&kind)
            .map(|c| c.records.len())
            .unwrap_or(0)
    }

    fn check_writable(&self) -> Result<()> {
        let guard = self
            .write_failure
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match guard.as_ref() {
            Some(message) => Err(ClassHubError::write(message.clone())),
            None => Ok(()),
        }
    }

    fn mutate<F>(&self, kind: CollectionKind, f: F) -> Result<()>
    where
        F: FnOnce(&mut BTreeMap<String, Value>) -> bool,
    {
        self.check_writable()?;
        let mut collection = self
            .collections
            .get_mut(&kind)
            .ok_or_else(|| ClassHubError::not_found(format!("Unknown collection: {kind}")))?;
        // 持有分片锁时广播，保证推送顺序与变更顺序一致
        if f(&mut collection.records) {
            collection.publish();
        }
        Ok(())
    }
}

impl Default for MemoryRemoteStore {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl RemoteStore for MemoryRemoteStore {
    async fn subscribe(&self, kind: CollectionKind) -> Result<SnapshotStream> {
        let (initial, rx) = {
            let collection = self.collections.get(&kind).ok_or_else(|| {
                ClassHubError::store_connection(format!("Unknown collection: {kind}"))
            })?;
            (collection.snapshot(), collection.tx.subscribe())
        };

        let updates = stream::unfold(rx, move |mut rx| async move {
            loop {
                match rx.recv().await {
                    Ok(delivery) => return Some((delivery, rx)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        // 每次推送都是完整快照，跳过旧快照不影响结果
                        debug!(%kind, skipped, "Subscriber lagged, continuing with newer snapshot");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        });

        Ok(stream::once(async move { Ok(initial) }).chain(updates).boxed())
    }

    fn allocate_key(&self, _kind: CollectionKind) -> String {
        uuid::Uuid::now_v7().to_string()
    }

    async fn set_value(&self, kind: CollectionKind, key: &str, fields: RawFields) -> Result<()> {
        self.mutate(kind, |records| {
            records.insert(key.to_string(), Value::Object(fields));
            true
        })
    }

    async fn update_values(
        &self,
        kind: CollectionKind,
        key: &str,
        fields: RawFields,
    ) -> Result<()> {
        self.mutate(kind, |records| {
            let entry = records
                .entry(key.to_string())
                .or_insert_with(|| Value::Object(RawFields::new()));
            match entry.as_object_mut() {
                Some(existing) => existing.extend(fields),
                None => *entry = Value::Object(fields),
            }
            true
        })
    }

    async fn remove_value(&self, kind: CollectionKind, key: &str) -> Result<()> {
        self.mutate(kind, |records| records.remove(key).is_some())
    }

    async fn fetch_user(&self, user_id: &str) -> Result<Option<Value>> {
        Ok(self.users.get(user_id).map(|v| v.value().clone()))
    }
}
