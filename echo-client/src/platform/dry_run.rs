//! Dry-run wrapper: reads are real, writes are only logged.

use super::{Downloader, Platform, PlatformError};
use async_trait::async_trait;
use echo_types::{AccountRef, ListOptions, MediaHandle, NewPost, PostId, TimelineItem};
use std::sync::atomic::{AtomicU64, Ordering};

/// Wraps a platform so that nothing is published.
///
/// Timeline reads and downloads pass through to the inner platform. Posts,
/// reposts and uploads are logged and answered with synthetic `dry-run-N`
/// IDs so a cycle can still thread replies onto them.
#[derive(Debug)]
pub struct DryRun<P> {
    inner: P,
    next_id: AtomicU64,
}

impl<P> DryRun<P> {
    /// Wrap `inner`.
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            next_id: AtomicU64::new(0),
        }
    }

    /// The wrapped platform.
    pub fn inner(&self) -> &P {
        &self.inner
    }

    fn synthetic_id(&self) -> String {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        format!("dry-run-{}", n)
    }
}

#[async_trait]
impl<P: Platform> Platform for DryRun<P> {
    async fn list_recent_items(
        &self,
        account: &AccountRef,
        options: ListOptions,
    ) -> Result<Vec<TimelineItem>, PlatformError> {
        self.inner.list_recent_items(account, options).await
    }

    async fn create_post(&self, post: NewPost) -> Result<PostId, PlatformError> {
        let id = PostId::new(self.synthetic_id());
        tracing::info!(
            %id,
            text = %post.text,
            media = post.media.len(),
            reply_to = ?post.reply_to,
            "dry run: would create post"
        );
        Ok(id)
    }

    async fn repost(&self, id: &PostId) -> Result<PostId, PlatformError> {
        tracing::info!(original = %id, "dry run: would repost");
        Ok(PostId::new(self.synthetic_id()))
    }

    async fn upload_media(&self, bytes: &[u8]) -> Result<MediaHandle, PlatformError> {
        let handle = MediaHandle::new(self.synthetic_id());
        tracing::info!(%handle, size = bytes.len(), "dry run: would upload media");
        Ok(handle)
    }
}

#[async_trait]
impl<P: Downloader> Downloader for DryRun<P> {
    async fn download_bytes(&self, url: &str) -> Result<Vec<u8>, PlatformError> {
        self.inner.download_bytes(url).await
    }
}
