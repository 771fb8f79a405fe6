//! # echo-client
//!
//! Sync coordinator and platform clients for tweet-echo.
//!
//! This is the I/O half of the bot: it reads the source timeline, replays new
//! items on the destination account and remembers the resulting post IDs.
//!
//! ## Features
//!
//! - **Platform Abstraction**: Pluggable capability surface (HTTP, mock, dry-run)
//! - **Causal Replay**: Replies are replayed after their parents and threaded
//!   onto the matching destination posts
//! - **Media Relay**: Photos are re-hosted concurrently and attached in order
//! - **Pure Core**: Uses echo-core for side-effect-free ordering and state logic
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use echo_client::{spawn_echo_task, BotConfig, EchoBot, TwitterClient, TwitterConfig};
//!
//! let writer = TwitterClient::new(TwitterConfig::new("access-token"))?;
//! let bot = Arc::new(EchoBot::new(
//!     BotConfig::new("account_to_echo"),
//!     writer.clone(),
//!     writer.clone(),
//!     writer,
//! ));
//!
//! bot.initialize().await?;
//! let task = spawn_echo_task(bot, std::time::Duration::from_secs(60));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bot;
pub mod media;
pub mod platform;
pub mod replay;
pub mod scheduler;

pub use bot::{BotConfig, BotError, CycleReport, EchoBot};
pub use media::{MediaRelay, RelayError};
pub use platform::{
    CreatedPost, Downloader, DryRun, MockPlatform, Platform, PlatformError, TwitterClient,
    TwitterConfig,
};
pub use replay::{Outcome, ReplayError, ReplayExecutor, ReplayOutcome};
pub use scheduler::spawn_echo_task;
