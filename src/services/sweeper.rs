//! 过期链接清理任务
//!
//! 定期从注册表中移除过期链接，解除用户的反向引用并通知链接所有者。
//! 单条通知失败只记录日志，不影响本轮其余记录，也不会立即重试。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::services::notification::Notifier;
use crate::storage::{LinkRegistry, ShortLink, UserRegistry};

/// 单轮清理报告
#[derive(Debug, Default, Clone)]
pub struct SweepReport {
    /// 被移除的链接
    pub removed: Vec<ShortLink>,
    /// 通知失败的数量
    pub notify_failures: usize,
}

/// 周期定时器；错过的 tick 顺延，不连续补跑
fn ticker(period: Duration) -> Interval {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

pub struct EvictionSweeper {
    links: Arc<LinkRegistry>,
    users: Arc<UserRegistry>,
    notifier: Arc<Notifier>,
    /// 清理周期
    interval: Duration,
    /// 统计日志周期
    stats_interval: Duration,
}

impl EvictionSweeper {
    pub fn new(
        links: Arc<LinkRegistry>,
        users: Arc<UserRegistry>,
        notifier: Arc<Notifier>,
        interval: Duration,
        stats_interval: Duration,
    ) -> Self {
        Self {
            links,
            users,
            notifier,
            interval,
            stats_interval,
        }
    }

    /// 执行一轮清理
    pub fn run_once(&self) -> SweepReport {
        let removed = self.links.sweep_expired();
        let mut report = SweepReport {
            removed: Vec::with_capacity(removed.len()),
            notify_failures: 0,
        };

        for link in removed {
            self.users.remove_link(link.owner_id, &link.short_code);

            if let Err(e) = self.notifier.link_expired(&link) {
                warn!(
                    "Sweeper: failed to notify owner {} about '{}': {}",
                    link.owner_id, link.short_code, e
                );
                report.notify_failures += 1;
            }
            report.removed.push(link);
        }

        if !report.removed.is_empty() {
            info!(
                "Sweeper: removed {} expired links ({} notification failures)",
                report.removed.len(),
                report.notify_failures
            );
        }
        report
    }

    /// 输出注册表统计
    pub fn log_statistics(&self) {
        let stats = self.links.stats();
        info!(
            "Registry stats: {} links ({} active, {} expired, {} over limit), {} users",
            stats.total,
            stats.active,
            stats.expired,
            stats.limit_exceeded,
            self.users.len()
        );
    }

    /// 启动后台清理任务
    ///
    /// 首次清理在一个周期之后进行；收到 shutdown 信号后退出。
    /// 清理本身是同步的，进行中的一轮总会完整执行。
    pub fn spawn(self: Arc<Self>, mut shutdown_rx: watch::Receiver<bool>) -> JoinHandle<()> {
        info!(
            "Sweeper started (interval: {:?}, stats interval: {:?})",
            self.interval, self.stats_interval
        );

        tokio::spawn(async move {
            let mut sweep_ticker = ticker(self.interval);
            let mut stats_ticker = ticker(self.stats_interval);
            // 跳过立即触发的第一次 tick
            sweep_ticker.tick().await;

            loop {
                tokio::select! {
                    _ = sweep_ticker.tick() => {
                        debug!("Sweeper: tick");
                        self.run_once();
                    }
                    _ = stats_ticker.tick() => {
                        self.log_statistics();
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            info!("Sweeper stopped");
        })
    }
}
