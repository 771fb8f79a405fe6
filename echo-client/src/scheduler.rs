//! Periodic sync task.
//!
//! Fires a sync cycle every period. The first cycle runs one full period
//! after the task starts; ticks that land while a cycle is still running are
//! dropped rather than queued.

use crate::bot::{BotError, EchoBot};
use crate::platform::{Downloader, Platform};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

/// Spawn the background sync task.
///
/// The bot should already be initialized. Returns a handle that can be used
/// to abort the task.
pub fn spawn_echo_task<R, W, D>(
    bot: Arc<EchoBot<R, W, D>>,
    period: Duration,
) -> tokio::task::JoinHandle<()>
where
    R: Platform + 'static,
    W: Platform + 'static,
    D: Downloader + 'static,
{
    let period = period.max(Duration::from_millis(1));

    tokio::spawn(async move {
        tracing::info!("Sync task started (interval: {:?})", period);

        let mut timer = interval_at(Instant::now() + period, period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            timer.tick().await;

            match bot.run_cycle().await {
                Ok(report) => {
                    if report.considered > 0 {
                        tracing::debug!(
                            "Sync: {} considered, {} failed",
                            report.considered,
                            report.failed()
                        );
                    }
                }
                Err(BotError::CycleInProgress) => {
                    tracing::debug!("Sync: previous cycle still running, tick skipped");
                }
                Err(BotError::Fetch(e)) => {
                    tracing::warn!("Sync: source timeline unavailable: {}", e);
                }
                Err(e) => {
                    tracing::error!("Sync error: {}", e);
                }
            }
        }
    })
}
