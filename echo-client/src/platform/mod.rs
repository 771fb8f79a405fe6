//! Platform abstraction for tweet-echo.
//!
//! This module provides the capability surface the bot consumes: listing
//! timelines, creating posts, reposting, uploading and downloading media.
//! The coordinator never talks HTTP directly.
//!
//! # Design
//!
//! The traits are async and stateless from the caller's point of view:
//! - `list_recent_items()` reads a timeline page, newest first
//! - `create_post()` publishes text with media and an optional reply reference
//! - `repost()` shares an existing post as-is
//! - `upload_media()` re-hosts binary content and returns a handle
//! - `download_bytes()` fetches a remote attachment
//!
//! Every call may fail or time out; nothing is retried automatically.
//!
//! # Example
//!
//! ```ignore
//! let platform = MockPlatform::new();
//! platform.set_timeline(AccountRef::user("someone"), items);
//! let page = platform.list_recent_items(&AccountRef::user("someone"), ListOptions::window(200)).await?;
//! ```

mod dry_run;
mod mock;
mod twitter;

pub use dry_run::DryRun;
pub use mock::{CreatedPost, MockPlatform};
pub use twitter::{TwitterClient, TwitterConfig, DEFAULT_API_URL, DEFAULT_UPLOAD_URL};

use async_trait::async_trait;
use echo_types::{AccountRef, ListOptions, MediaHandle, NewPost, PostId, TimelineItem};
use thiserror::Error;

/// Platform errors.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The request could not be sent or the connection broke.
    #[error("request failed: {0}")]
    Request(String),

    /// The request timed out.
    #[error("request timed out")]
    Timeout,

    /// The platform answered with an error status.
    #[error("platform returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or error description.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("invalid response: {0}")]
    Decode(String),

    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),
}

/// Capability surface of a social platform account.
///
/// Implementations handle the underlying mechanism (HTTP API, mock, dry-run).
#[async_trait]
pub trait Platform: Send + Sync {
    /// List the most recent items of `account`, newest first.
    async fn list_recent_items(
        &self,
        account: &AccountRef,
        options: ListOptions,
    ) -> Result<Vec<TimelineItem>, PlatformError>;

    /// Publish a new post and return its ID.
    async fn create_post(&self, post: NewPost) -> Result<PostId, PlatformError>;

    /// Share the post `id` as-is and return the ID of the share.
    async fn repost(&self, id: &PostId) -> Result<PostId, PlatformError>;

    /// Upload binary media and return a handle usable in [`NewPost::media`].
    async fn upload_media(&self, bytes: &[u8]) -> Result<MediaHandle, PlatformError>;
}

/// Fetches remote attachments.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Download the content at `url`.
    async fn download_bytes(&self, url: &str) -> Result<Vec<u8>, PlatformError>;
}
