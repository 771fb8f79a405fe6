//! # echo-core
//!
//! Pure logic for tweet-echo (no I/O, instant tests).
//!
//! This crate implements the ordering, classification and state-tracking
//! rules of the echo bot without any network access, enabling fast unit tests.
//!
//! ## Design Philosophy
//!
//! All modules in this crate are **pure** - they take input and produce output
//! without side effects. This enables:
//! - Instant unit tests (no mocks, no async)
//! - Deterministic behavior (same input → same output)
//! - Easy reasoning about state transitions
//!
//! The actual I/O (timeline reads, posting, media transfer) is performed by
//! `echo-client`, which interprets the actions and decisions produced here.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod batch;
pub mod classify;
pub mod reorder;
pub mod state;
pub mod thread_map;
pub mod watermark;

pub use batch::{prepare_batch, SyncState};
pub use classify::{classify, clean_text, ReplayAction, SkipReason};
pub use reorder::causal_order;
pub use state::{Action, BotState, Event, SkipTickReason};
pub use thread_map::ThreadMap;
pub use watermark::WatermarkTracker;
