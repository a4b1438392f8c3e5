use tokio::signal;
use tracing::{error, warn};

use super::startup::SyncContext;
use crate::errors::Result;

pub async fn listen_for_shutdown() {
    // 等待 Ctrl+C 信号
    wait_for_signal(signal::ctrl_c()).await;
}

/// 信号到达后返回；无法监听信号时永久等待，不触发关闭
async fn wait_for_signal<F>(signal: F)
where
    F: Future<Output = std::io::Result<()>>,
{
    if let Err(e) = signal.await {
        error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    warn!("Shutdown signal received, initiating graceful shutdown...");
}

/// 取消全部订阅；返回后镜像不再变化
pub async fn teardown(context: &SyncContext) -> Result<()> {
    context.subscriptions().shutdown().await?;
    warn!("Graceful shutdown: all subscriptions cancelled");
    Ok(())
}
