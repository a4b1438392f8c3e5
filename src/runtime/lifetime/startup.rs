use std::sync::Arc;

use chrono::{FixedOffset, Utc, Weekday};
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::errors::Result;
use crate::queries::QueryContext;
use crate::services::{AuthService, DashboardSummary, StoreAuthService, WriteGateway};
use crate::store::{RemoteStore, create_store};
use crate::sync::{ErrorSink, MirrorView, Mirrors, SubscriptionManager, TracingErrorSink};

/// 同步层的显式上下文
///
/// 持有存储、镜像、订阅、写入网关与认证服务。镜像只通过只读访问器暴露，
/// 替换入口仅对订阅管理器可见。
pub struct SyncContext {
    store: Arc<dyn RemoteStore>,
    mirrors: Mirrors,
    subscriptions: SubscriptionManager,
    gateway: WriteGateway,
    auth: Arc<StoreAuthService>,
    calendar_offset: FixedOffset,
    week_start: Weekday,
}

impl SyncContext {
    pub fn store(&self) -> &Arc<dyn RemoteStore> {
        &self.store
    }

    pub fn mirrors(&self) -> &Mirrors {
        &self.mirrors
    }

    /// 所有镜像的当前内容
    pub fn view(&self) -> MirrorView {
        self.mirrors.view()
    }

    pub fn subscriptions(&self) -> &SubscriptionManager {
        &self.subscriptions
    }

    pub fn gateway(&self) -> &WriteGateway {
        &self.gateway
    }

    pub fn auth(&self) -> &Arc<StoreAuthService> {
        &self.auth
    }

    /// 以当前登录用户与当前时间构造查询上下文
    pub fn query_context(&self) -> QueryContext {
        let now = Utc::now().with_timezone(&self.calendar_offset);
        QueryContext::new(
            self.auth.current_user_id().as_deref(),
            now,
            self.week_start,
        )
    }

    pub fn dashboard(&self) -> DashboardSummary {
        DashboardSummary::build(&self.view(), &self.query_context())
    }
}

/// 按配置创建存储，日志作为可观测性接收端
pub async fn prepare_sync_startup(config: &AppConfig) -> Result<SyncContext> {
    if cfg!(debug_assertions) {
        crate::store::register::register_builtin_plugins();
        crate::store::register::debug_remote_store_registry();
        debug!("Debug mode: Remote store registry is enabled");
    }

    let store = create_store(config).await?;
    warn!("Remote store backend initialized");

    prepare_sync_startup_with(config, store, Arc::new(TracingErrorSink)).await
}

/// 使用给定的存储与接收端启动同步层
pub async fn prepare_sync_startup_with(
    config: &AppConfig,
    store: Arc<dyn RemoteStore>,
    sink: Arc<dyn ErrorSink>,
) -> Result<SyncContext> {
    let mirrors = Mirrors::new();
    let subscriptions =
        SubscriptionManager::start(Arc::clone(&store), &mirrors, Arc::clone(&sink)).await?;
    warn!(
        "Subscriptions established for {} collections",
        subscriptions.active_kinds().len()
    );

    let gateway = WriteGateway::new(Arc::clone(&store), sink);
    let auth = Arc::new(StoreAuthService::new(Arc::clone(&store), &config.lookup));
    if let Some(user) = config.current_user() {
        auth.sign_in(user);
        debug!("Signed in as configured user {}", user);
    }

    Ok(SyncContext {
        store,
        mirrors,
        subscriptions,
        gateway,
        auth,
        calendar_offset: config.calendar_offset(),
        week_start: config.sync.week_start.weekday(),
    })
}
