use crate::config::AppConfig;
use crate::errors::Result;
use crate::store::RemoteStore;
use once_cell::sync::Lazy;
use std::{
    collections::HashMap,
    future::Future,
    pin::Pin,
    sync::{Arc, Once, RwLock},
};

pub type BoxedRemoteStoreFuture =
    Pin<Box<dyn Future<Output = Result<Box<dyn RemoteStore>>> + Send>>;
pub type RemoteStoreConstructor = Arc<dyn Fn(AppConfig) -> BoxedRemoteStoreFuture + Send + Sync>;

static REMOTE_STORE_REGISTRY: Lazy<RwLock<HashMap<String, RemoteStoreConstructor>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

static BUILTIN_PLUGINS: Once = Once::new();

pub fn register_remote_store_plugin<S: Into<String>>(
    name: S,
    constructor: RemoteStoreConstructor,
) {
    let name = name.into();
    let mut registry = REMOTE_STORE_REGISTRY
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    registry.insert(name, constructor);
}

pub fn get_remote_store_plugin(name: &str) -> Option<RemoteStoreConstructor> {
    REMOTE_STORE_REGISTRY
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .get(name)
        .cloned()
}

/// 注册内置插件（可重复调用）
pub fn register_builtin_plugins() {
    BUILTIN_PLUGINS.call_once(|| {
        register_remote_store_plugin(
            super::DEFAULT_STORE_PLUGIN,
            Arc::new(|config: AppConfig| -> BoxedRemoteStoreFuture {
                Box::pin(async move {
                    let store = super::MemoryRemoteStore::from_config(&config)?;
                    Ok(Box::new(store) as Box<dyn RemoteStore>)
                })
            }),
        );
    });
}

pub fn debug_remote_store_registry() {
    let registry = REMOTE_STORE_REGISTRY
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if registry.is_empty() {
        tracing::debug!("No remote store plugins registered.");
    } else {
        tracing::debug!("Registered remote store plugins:");
        for key in registry.keys() {
            tracing::debug!(" - {}", key);
        }
    }
}
