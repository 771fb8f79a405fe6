//! Bot lifecycle state machine for tweet-echo.
//!
//! This module provides a pure, side-effect-free state machine for the
//! coordinator's lifecycle. The state machine takes events as input and
//! produces a new state plus a list of actions to execute.
//!
//! The actual I/O (reading timelines, posting) is performed by echo-client,
//! not by this module. This enables instant unit testing without network mocks.
//!
//! The machine is what keeps sync cycles non-reentrant: a tick that arrives
//! while a cycle is running is refused instead of racing on the watermark
//! and thread map.

use chrono::{DateTime, Utc};

/// Coordinator lifecycle - NO I/O, just state transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BotState {
    /// Watermark not established yet.
    Uninitialized,
    /// Fetching the destination account's latest post.
    Initializing,
    /// Initialized and idle between cycles.
    Ready,
    /// A sync cycle is running.
    Syncing {
        /// When the running cycle started.
        started_at: DateTime<Utc>,
    },
    /// Initialization failed; the bot must not run cycles.
    Failed {
        /// Error message describing the failure.
        error: String,
    },
}

impl BotState {
    /// Create a new state machine in the Uninitialized state.
    pub fn new() -> Self {
        Self::Uninitialized
    }

    /// Process an event and return the new state plus actions to execute.
    ///
    /// This is a pure function - no side effects. The caller (echo-client)
    /// is responsible for executing the returned actions.
    pub fn on_event(self, event: Event) -> (Self, Vec<Action>) {
        match (self, event) {
            // From Uninitialized
            (Self::Uninitialized, Event::InitRequested) => {
                (Self::Initializing, vec![Action::FetchLatestOwnPost])
            }

            // From Initializing
            (Self::Initializing, Event::InitSucceeded) => (Self::Ready, vec![]),
            (Self::Initializing, Event::InitFailed { error }) => {
                (Self::Failed { error }, vec![])
            }

            // From Ready
            (Self::Ready, Event::TickFired { at }) => (
                Self::Syncing { started_at: at },
                vec![Action::StartCycle { started_at: at }],
            ),

            // From Syncing
            (state @ Self::Syncing { .. }, Event::TickFired { .. }) => (
                state,
                vec![Action::SkipTick {
                    reason: SkipTickReason::CycleInProgress,
                }],
            ),
            (Self::Syncing { .. }, Event::CycleFinished) => (Self::Ready, vec![]),

            // Ticks before (or after failed) initialization
            (state, Event::TickFired { .. }) => (
                state,
                vec![Action::SkipTick {
                    reason: SkipTickReason::NotReady,
                }],
            ),

            // Invalid transitions - stay in current state
            (state, _) => (state, vec![]),
        }
    }

    /// Check if the bot can accept a sync cycle.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Check if a sync cycle is running.
    pub fn is_syncing(&self) -> bool {
        matches!(self, Self::Syncing { .. })
    }
}

impl Default for BotState {
    fn default() -> Self {
        Self::new()
    }
}

/// Events that can occur in the bot lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Startup requested the watermark to be established.
    InitRequested,
    /// The watermark was established.
    InitSucceeded,
    /// The destination timeline could not be read.
    InitFailed {
        /// Error message describing the failure.
        error: String,
    },
    /// The scheduler asked for a sync cycle.
    TickFired {
        /// When the tick fired; becomes the cycle start time.
        at: DateTime<Utc>,
    },
    /// The running cycle ended, successfully or not.
    CycleFinished,
}

/// Actions to be executed by the echo-client coordinator.
///
/// These are instructions, not side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Read the destination account's most recent post.
    FetchLatestOwnPost,
    /// Run a fetch-classify-reorder-replay cycle.
    StartCycle {
        /// Cycle start time; the watermark advances to it on completion.
        started_at: DateTime<Utc>,
    },
    /// Do not run a cycle for this tick.
    SkipTick {
        /// Why the tick is skipped.
        reason: SkipTickReason,
    },
}

/// Why a scheduler tick did not start a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipTickReason {
    /// The previous cycle has not finished.
    CycleInProgress,
    /// Initialization has not succeeded.
    NotReady,
}
