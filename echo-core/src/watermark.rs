//! Watermark tracking for tweet-echo.
//!
//! The watermark is the timestamp boundary below which every source item is
//! considered already processed. It provides:
//! - Admission of items created strictly after the watermark
//! - Monotonic advancement (never moves backwards, even if the clock does)
//!
//! The coordinator advances the watermark to the *start* of each completed
//! cycle rather than to the newest replayed item.

use chrono::{DateTime, Utc};

/// Tracks the "last synchronized time" boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatermarkTracker {
    mark: DateTime<Utc>,
}

impl WatermarkTracker {
    /// Create a tracker at the given boundary.
    ///
    /// Use the creation time of the destination account's latest post, or
    /// the current time when the destination has never posted.
    pub fn new(mark: DateTime<Utc>) -> Self {
        Self { mark }
    }

    /// Create a tracker at the current time, so no existing history is replayed.
    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    /// The current boundary.
    pub fn current(&self) -> DateTime<Utc> {
        self.mark
    }

    /// Whether an item created at `created_at` is new (strictly after the boundary).
    pub fn admits(&self, created_at: DateTime<Utc>) -> bool {
        created_at > self.mark
    }

    /// Move the boundary forward to `to`.
    ///
    /// Returns `false` and leaves the boundary untouched if `to` is not later
    /// than the current boundary.
    pub fn advance(&mut self, to: DateTime<Utc>) -> bool {
        if to > self.mark {
            self.mark = to;
            true
        } else {
            false
        }
    }
}
