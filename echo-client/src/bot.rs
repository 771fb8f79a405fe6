//! EchoBot - the sync coordinator.
//!
//! This module provides [`EchoBot`], which mirrors one source account onto
//! the destination account one cycle at a time.
//!
//! # Architecture
//!
//! EchoBot uses the pure lifecycle machine and batch rules from echo-core and
//! performs the actual I/O through the [`Platform`] and [`Downloader`] traits.
//!
//! ```text
//! Scheduler → EchoBot → reader (source timeline)
//!                ↓    → writer (destination posts, uploads)
//!          echo-core  → downloader (attachments)
//! ```
//!
//! # Example
//!
//! ```ignore
//! let bot = EchoBot::new(BotConfig::new("someone"), reader, writer, downloader);
//! bot.initialize().await?;
//! let report = bot.run_cycle().await?;
//! println!("echoed {}", report.echoed());
//! ```

use chrono::{DateTime, Utc};
use echo_core::{
    classify, prepare_batch, Action, BotState, Event, SkipTickReason, SyncState, WatermarkTracker,
};
use echo_types::{AccountRef, ListOptions, MAX_PAGE_SIZE};
use std::sync::{Mutex as StdMutex, PoisonError};
use thiserror::Error;
use tokio::sync::Mutex;

use crate::platform::{Downloader, Platform, PlatformError};
use crate::replay::{Outcome, ReplayExecutor, ReplayOutcome};

/// Coordinator errors.
#[derive(Debug, Error)]
pub enum BotError {
    /// The destination timeline could not be read at startup.
    #[error("initialization failed")]
    Initialization(#[source] PlatformError),

    /// The source timeline could not be read; the cycle did nothing.
    #[error("failed to fetch source timeline")]
    Fetch(#[source] PlatformError),

    /// The bot is not initialized, or initialization failed.
    #[error("bot is not initialized")]
    NotReady,

    /// Another cycle is still running.
    #[error("a sync cycle is already in progress")]
    CycleInProgress,
}

/// Configuration for EchoBot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotConfig {
    /// Account whose timeline is mirrored.
    pub source: AccountRef,
    /// Items requested per cycle.
    pub page_size: u32,
}

impl BotConfig {
    /// Mirror the account with the given handle.
    pub fn new(handle: &str) -> Self {
        Self {
            source: AccountRef::user(handle),
            page_size: MAX_PAGE_SIZE,
        }
    }

    /// Set the number of items requested per cycle (clamped to the API limit).
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }
}

/// Summary of one completed sync cycle.
#[derive(Debug)]
pub struct CycleReport {
    /// When the cycle started.
    pub started_at: DateTime<Utc>,
    /// Items returned by the source timeline.
    pub fetched: usize,
    /// Items newer than the watermark, after de-duplication.
    pub considered: usize,
    /// Watermark at the start of the cycle.
    pub watermark_before: DateTime<Utc>,
    /// Watermark after the cycle.
    pub watermark_after: DateTime<Utc>,
    /// One outcome per considered item, in replay order.
    pub outcomes: Vec<ReplayOutcome>,
}

impl CycleReport {
    /// Number of items published as new posts.
    pub fn echoed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Echoed(_)))
    }

    /// Number of items shared as reposts.
    pub fn reposted(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Reposted(_)))
    }

    /// Number of items deliberately not replayed.
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped(_)))
    }

    /// Number of items whose replay failed.
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.outcome)).count()
    }
}

/// The sync coordinator.
///
/// Reads the source timeline with `reader`, publishes with `writer` and
/// fetches attachments with `downloader`. The watermark and thread map live
/// here for the lifetime of the process.
pub struct EchoBot<R, W, D> {
    config: BotConfig,
    reader: R,
    writer: W,
    downloader: D,
    lifecycle: StdMutex<BotState>,
    sync: Mutex<Option<SyncState>>,
}

/// Feeds the lifecycle machine the same way for every caller.
///
/// The lock is never held across an await point.
fn transition(lifecycle: &StdMutex<BotState>, event: Event) -> Vec<Action> {
    let mut state = lifecycle.lock().unwrap_or_else(PoisonError::into_inner);
    let (new_state, actions) = state.clone().on_event(event);
    *state = new_state;
    actions
}

/// Ends the running cycle when dropped, including when the cycle future is
/// cancelled part way through.
struct CycleGuard<'a> {
    lifecycle: &'a StdMutex<BotState>,
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        transition(self.lifecycle, Event::CycleFinished);
    }
}

impl<R, W, D> EchoBot<R, W, D>
where
    R: Platform,
    W: Platform,
    D: Downloader,
{
    /// Create a new, uninitialized bot.
    pub fn new(config: BotConfig, reader: R, writer: W, downloader: D) -> Self {
        Self {
            config,
            reader,
            writer,
            downloader,
            lifecycle: StdMutex::new(BotState::new()),
            sync: Mutex::new(None),
        }
    }

    /// The bot's configuration.
    pub fn config(&self) -> &BotConfig {
        &self.config
    }

    /// Establish the watermark from the destination account's latest post.
    ///
    /// A destination that has never posted starts at the current time, so
    /// existing source history is not replayed. Calling this again after a
    /// successful initialization returns the current watermark.
    pub async fn initialize(&self) -> Result<DateTime<Utc>, BotError> {
        let actions = transition(&self.lifecycle, Event::InitRequested);

        if !actions.contains(&Action::FetchLatestOwnPost) {
            return match self.sync.lock().await.as_ref() {
                Some(state) => Ok(state.watermark.current()),
                None => Err(BotError::NotReady),
            };
        }

        let latest = self
            .writer
            .list_recent_items(&AccountRef::Own, ListOptions::latest())
            .await;

        match latest {
            Ok(items) => {
                let watermark = items
                    .iter()
                    .map(|item| item.created_at)
                    .max()
                    .map(WatermarkTracker::new)
                    .unwrap_or_else(WatermarkTracker::starting_now);
                let mark = watermark.current();
                *self.sync.lock().await = Some(SyncState::new(watermark));
                transition(&self.lifecycle, Event::InitSucceeded);
                tracing::info!(source = %self.config.source, watermark = %mark, "Initialized");
                Ok(mark)
            }
            Err(e) => {
                transition(
                    &self.lifecycle,
                    Event::InitFailed {
                        error: e.to_string(),
                    },
                );
                tracing::error!(error = %e, "Failed to read destination timeline");
                Err(BotError::Initialization(e))
            }
        }
    }

    /// Run one fetch, classify, reorder and replay cycle.
    ///
    /// Refused with [`BotError::CycleInProgress`] while another cycle runs.
    /// A failed fetch leaves all state untouched. Per-item failures are
    /// recorded in the report and do not stop the batch. Items already
    /// replayed by an earlier cycle are skipped. Dropping the returned
    /// future mid-cycle ends the cycle without advancing the watermark.
    pub async fn run_cycle(&self) -> Result<CycleReport, BotError> {
        let started_at = Utc::now();

        for action in transition(&self.lifecycle, Event::TickFired { at: started_at }) {
            if let Action::SkipTick { reason } = action {
                return Err(match reason {
                    SkipTickReason::CycleInProgress => BotError::CycleInProgress,
                    SkipTickReason::NotReady => BotError::NotReady,
                });
            }
        }

        let _finished = CycleGuard {
            lifecycle: &self.lifecycle,
        };
        self.cycle(started_at).await
    }

    async fn cycle(&self, started_at: DateTime<Utc>) -> Result<CycleReport, BotError> {
        let items = self
            .reader
            .list_recent_items(
                &self.config.source,
                ListOptions::window(self.config.page_size),
            )
            .await
            .map_err(BotError::Fetch)?;
        let fetched = items.len();

        let mut guard = self.sync.lock().await;
        let state = guard.as_mut().ok_or(BotError::NotReady)?;
        let watermark_before = state.watermark.current();

        let batch = prepare_batch(items, &state.watermark);
        tracing::debug!(fetched, considered = batch.len(), "Prepared batch");

        let executor = ReplayExecutor::new(&self.writer, &self.downloader);
        let mut outcomes = Vec::with_capacity(batch.len());
        for item in &batch {
            let action = classify(item, &state.threads);
            outcomes.push(executor.execute(item, action, &mut state.threads).await);
        }

        state.watermark.advance(started_at);

        let report = CycleReport {
            started_at,
            fetched,
            considered: batch.len(),
            watermark_before,
            watermark_after: state.watermark.current(),
            outcomes,
        };

        tracing::info!(
            fetched,
            considered = report.considered,
            echoed = report.echoed(),
            reposted = report.reposted(),
            skipped = report.skipped(),
            failed = report.failed(),
            "Sync cycle finished"
        );

        Ok(report)
    }

    /// Snapshot of the watermark and thread map, `None` before initialization.
    pub async fn state(&self) -> Option<SyncState> {
        self.sync.lock().await.clone()
    }

    /// Current lifecycle state.
    pub fn lifecycle(&self) -> BotState {
        self.lifecycle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}
