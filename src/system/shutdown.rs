use std::time::Duration;

use tokio::signal;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{error, info, warn};

/// 后台任务停止超时时间（秒）
const SHUTDOWN_TIMEOUT_SECS: u64 = 10;

/// 等待 Ctrl+C 信号
pub async fn wait_for_signal() {
    match signal::ctrl_c().await {
        Ok(()) => {
            info!("Shutdown signal received, stopping background tasks...");
        }
        Err(e) => {
            warn!(
                "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
                e
            );
        }
    }
}

/// 通知后台任务停止并等待其退出
pub async fn stop_background_task(shutdown_tx: &watch::Sender<bool>, handle: JoinHandle<()>) {
    if shutdown_tx.send(true).is_err() {
        warn!("Background task already gone before shutdown");
    }

    match timeout(Duration::from_secs(SHUTDOWN_TIMEOUT_SECS), handle).await {
        Ok(Ok(())) => info!("Background tasks stopped"),
        Ok(Err(e)) => error!("Background task failed: {}", e),
        Err(_) => error!(
            "Background tasks did not stop within {} seconds, abandoning",
            SHUTDOWN_TIMEOUT_SECS
        ),
    }
}
