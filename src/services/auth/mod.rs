//! 认证协作方
//!
//! 提供当前登录用户 ID，以及从用户 ID 到联系方式（邮箱）的异步查询。
//! 成功的查询结果通过 moka 缓存；查询失败只记录日志并返回 `None`，不写入缓存。

use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use tracing::{debug, warn};

use crate::config::LookupConfig;
use crate::errors::Result;
use crate::models::users::entities::UserRecord;
use crate::store::RemoteStore;
use crate::utils::normalize_id;

#[async_trait]
pub trait AuthService: Send + Sync {
    /// 当前登录用户，未登录为 `None`
    fn current_user_id(&self) -> Option<String>;

    /// 查询用户的联系方式
    async fn lookup_contact(&self, user_id: &str) -> Option<String>;
}

pub struct StoreAuthService {
    store: Arc<dyn RemoteStore>,
    session: RwLock<Option<String>>,
    contacts: Cache<String, Option<String>>,
}

impl StoreAuthService {
    pub fn new(store: Arc<dyn RemoteStore>, config: &LookupConfig) -> Self {
        let contacts = Cache::builder()
            .max_capacity(config.max_capacity)
            .time_to_live(Duration::from_secs(config.ttl_secs))
            .build();
        debug!(
            "Contact lookup cache initialized with max capacity: {}",
            config.max_capacity
        );
        Self {
            store,
            session: RwLock::new(None),
            contacts,
        }
    }

    pub fn sign_in(&self, user_id: &str) {
        let mut session = self
            .session
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *session = normalize_id(Some(user_id)).map(str::to_string);
    }

    pub fn sign_out(&self) {
        let mut session = self
            .session
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *session = None;
    }

    async fn fetch_contact(&self, user_id: &str) -> Result<Option<String>> {
        let value = self.store.fetch_user(user_id).await?;
        Ok(value
            .and_then(|value| UserRecord::from_raw(user_id, &value))
            .and_then(|user| user.email))
    }
}

#[async_trait]
impl AuthService for StoreAuthService {
    fn current_user_id(&self) -> Option<String> {
        self.session
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    async fn lookup_contact(&self, user_id: &str) -> Option<String> {
        let user_id = normalize_id(Some(user_id))?;
        if let Some(cached) = self.contacts.get(user_id).await {
            debug!(user_id, "Contact lookup served from cache");
            return cached;
        }
        match self.fetch_contact(user_id).await {
            Ok(contact) => {
                // 用户不存在或没有邮箱同样缓存
                self.contacts
                    .insert(user_id.to_string(), contact.clone())
                    .await;
                contact
            }
            Err(e) => {
                warn!(user_id, "Failed to look up user contact: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ClassHubError;
    use crate::models::CollectionKind;
    use crate::store::{MemoryRemoteStore, RemoteStore, SnapshotStream};
    use crate::utils::RawFields;
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicBool, Ordering};

    /// 第一次读取用户失败，之后委托给内存存储
    struct FlakyUserStore {
        inner: MemoryRemoteStore,
        failed_once: AtomicBool,
    }

    #[async_trait]
    impl RemoteStore for FlakyUserStore {
        async fn subscribe(&self, kind: CollectionKind) -> Result<SnapshotStream> {
            self.inner.subscribe(kind).await
        }

        fn allocate_key(&self, kind: CollectionKind) -> String {
            self.inner.allocate_key(kind)
        }

        async fn set_value(&self, kind: CollectionKind, key: &str, fields: RawFields) -> Result<()> {
            self.inner.set_value(kind, key, fields).await
        }

        async fn update_values(
            &self,
            kind: CollectionKind,
            key: &str,
            fields: RawFields,
        ) -> Result<()> {
            self.inner.update_values(kind, key, fields).await
        }

        async fn remove_value(&self, kind: CollectionKind, key: &str) -> Result<()> {
            self.inner.remove_value(kind, key).await
        }

        async fn fetch_user(&self, user_id: &str) -> Result<Option<Value>> {
            if !self.failed_once.swap(true, Ordering::SeqCst) {
                return Err(ClassHubError::store_connection("users node unavailable"));
            }
            self.inner.fetch_user(user_id).await
        }
    }

    fn lookup_config() -> LookupConfig {
        LookupConfig {
            max_capacity: 16,
            ttl_secs: 60,
        }
    }

    #[test]
    fn test_session() {
        let auth = StoreAuthService::new(Arc::new(MemoryRemoteStore::default()), &lookup_config());
        assert!(auth.current_user_id().is_none());
        auth.sign_in(" u1 ");
        assert_eq!(auth.current_user_id().as_deref(), Some("u1"));
        auth.sign_out();
        assert!(auth.current_user_id().is_none());
    }

    #[tokio::test]
    async fn test_lookup_contact_is_cached() {
        let store = Arc::new(MemoryRemoteStore::default());
        store.put_user("u1", json!({ "userEmail": "u1@example.com" }));
        let auth = StoreAuthService::new(store.clone(), &lookup_config());

        assert_eq!(auth.lookup_contact("u1").await.as_deref(), Some("u1@example.com"));
        store.put_user("u1", json!({ "userEmail": "changed@example.com" }));
        assert_eq!(auth.lookup_contact("u1 ").await.as_deref(), Some("u1@example.com"));
        assert!(auth.lookup_contact("missing").await.is_none());
        assert!(auth.lookup_contact("").await.is_none());
    }

    #[tokio::test]
    async fn test_failed_lookup_is_not_cached() {
        let inner = MemoryRemoteStore::default();
        inner.put_user("u1", json!({ "userEmail": "u1@example.com" }));
        let store = Arc::new(FlakyUserStore {
            inner,
            failed_once: AtomicBool::new(false),
        });
        let auth = StoreAuthService::new(store, &lookup_config());

        assert!(auth.lookup_contact("u1").await.is_none());
        assert_eq!(auth.lookup_contact("u1").await.as_deref(), Some("u1@example.com"));
    }
}
