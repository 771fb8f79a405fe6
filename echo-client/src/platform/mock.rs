//! Mock platform for testing.
//!
//! Allows programming timelines and attachment bytes, forcing failures, and
//! capturing every write for verification.

use super::{Downloader, Platform, PlatformError};
use async_trait::async_trait;
use echo_types::{AccountRef, ListOptions, MediaHandle, NewPost, PostId, TimelineItem};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// A post captured by [`MockPlatform::create_post`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedPost {
    /// ID the mock assigned.
    pub id: PostId,
    /// What was posted.
    pub post: NewPost,
}

/// Mock platform for testing.
///
/// Clones share state, so a test can keep one handle while the coordinator
/// owns another. Uploads are answered with `media:<bytes as text>` so tests
/// can see which download produced which handle.
#[derive(Debug, Default)]
pub struct MockPlatform {
    inner: Arc<Mutex<MockPlatformInner>>,
}

#[derive(Debug, Default)]
struct MockPlatformInner {
    timelines: HashMap<AccountRef, Vec<TimelineItem>>,
    list_requests: Vec<(AccountRef, ListOptions)>,
    list_delay: Option<Duration>,
    posts: Vec<CreatedPost>,
    reposts: Vec<PostId>,
    uploads: Vec<Vec<u8>>,
    media: HashMap<String, Vec<u8>>,
    download_delays: HashMap<String, Duration>,
    failing_downloads: HashSet<String>,
    fail_next_list: Option<String>,
    fail_next_post: Option<String>,
    fail_next_repost: Option<String>,
    fail_next_upload: Option<String>,
    next_id: u64,
}

impl MockPlatformInner {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

impl MockPlatform {
    /// Create a new mock platform with empty timelines.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the items `account`'s timeline returns, newest first.
    pub fn set_timeline(&self, account: AccountRef, items: Vec<TimelineItem>) {
        let mut inner = self.inner.lock().unwrap();
        inner.timelines.insert(account, items);
    }

    /// Serve `bytes` for downloads of `url`.
    pub fn add_media(&self, url: &str, bytes: &[u8]) {
        let mut inner = self.inner.lock().unwrap();
        inner.media.insert(url.to_string(), bytes.to_vec());
    }

    /// Delay every download of `url`.
    pub fn delay_download(&self, url: &str, delay: Duration) {
        let mut inner = self.inner.lock().unwrap();
        inner.download_delays.insert(url.to_string(), delay);
    }

    /// Delay every timeline listing.
    pub fn delay_list(&self, delay: Duration) {
        let mut inner = self.inner.lock().unwrap();
        inner.list_delay = Some(delay);
    }

    /// Make every download of `url` fail.
    pub fn fail_download(&self, url: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.failing_downloads.insert(url.to_string());
    }

    /// Cause the next list_recent_items() to fail with the given error.
    pub fn fail_next_list(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_list = Some(error.to_string());
    }

    /// Cause the next create_post() to fail with the given error.
    pub fn fail_next_post(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_post = Some(error.to_string());
    }

    /// Cause the next repost() to fail with the given error.
    pub fn fail_next_repost(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_repost = Some(error.to_string());
    }

    /// Cause the next upload_media() to fail with the given error.
    pub fn fail_next_upload(&self, error: &str) {
        let mut inner = self.inner.lock().unwrap();
        inner.fail_next_upload = Some(error.to_string());
    }

    /// Every timeline request made so far.
    pub fn list_requests(&self) -> Vec<(AccountRef, ListOptions)> {
        let inner = self.inner.lock().unwrap();
        inner.list_requests.clone()
    }

    /// Every post created so far.
    pub fn posts(&self) -> Vec<CreatedPost> {
        let inner = self.inner.lock().unwrap();
        inner.posts.clone()
    }

    /// IDs of every post reposted so far.
    pub fn reposts(&self) -> Vec<PostId> {
        let inner = self.inner.lock().unwrap();
        inner.reposts.clone()
    }

    /// Bytes of every upload so far, in completion order.
    pub fn uploads(&self) -> Vec<Vec<u8>> {
        let inner = self.inner.lock().unwrap();
        inner.uploads.clone()
    }

    /// Number of destination-side writes (posts, reposts, uploads).
    pub fn write_count(&self) -> usize {
        let inner = self.inner.lock().unwrap();
        inner.posts.len() + inner.reposts.len() + inner.uploads.len()
    }

    /// Clear all state (timelines, captures, forced failures).
    pub fn reset(&self) {
        let mut inner = self.inner.lock().unwrap();
        *inner = MockPlatformInner::default();
    }
}

impl Clone for MockPlatform {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

#[async_trait]
impl Platform for MockPlatform {
    async fn list_recent_items(
        &self,
        account: &AccountRef,
        options: ListOptions,
    ) -> Result<Vec<TimelineItem>, PlatformError> {
        let delay = {
            let mut inner = self.inner.lock().unwrap();
            inner.list_requests.push((account.clone(), options));

            // Check for forced failure
            if let Some(error) = inner.fail_next_list.take() {
                return Err(PlatformError::Request(error));
            }
            inner.list_delay
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let inner = self.inner.lock().unwrap();
        Ok(inner
            .timelines
            .get(account)
            .map(|items| {
                items
                    .iter()
                    .filter(|i| options.include_reposts || !i.is_repost())
                    .filter(|i| options.include_replies || !i.is_reply())
                    .take(options.limit as usize)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn create_post(&self, post: NewPost) -> Result<PostId, PlatformError> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(error) = inner.fail_next_post.take() {
            return Err(PlatformError::Api {
                status: 403,
                message: error,
            });
        }

        let id = PostId::new(format!("post-{}", inner.next_id()));
        inner.posts.push(CreatedPost {
            id: id.clone(),
            post,
        });
        Ok(id)
    }

    async fn repost(&self, id: &PostId) -> Result<PostId, PlatformError> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(error) = inner.fail_next_repost.take() {
            return Err(PlatformError::Api {
                status: 403,
                message: error,
            });
        }

        inner.reposts.push(id.clone());
        Ok(PostId::new(format!("repost-{}", inner.next_id())))
    }

    async fn upload_media(&self, bytes: &[u8]) -> Result<MediaHandle, PlatformError> {
        let mut inner = self.inner.lock().unwrap();

        if let Some(error) = inner.fail_next_upload.take() {
            return Err(PlatformError::Request(error));
        }

        inner.uploads.push(bytes.to_vec());
        Ok(MediaHandle::new(format!(
            "media:{}",
            String::from_utf8_lossy(bytes)
        )))
    }
}

#[async_trait]
impl Downloader for MockPlatform {
    async fn download_bytes(&self, url: &str) -> Result<Vec<u8>, PlatformError> {
        let delay = {
            let inner = self.inner.lock().unwrap();
            if inner.failing_downloads.contains(url) {
                return Err(PlatformError::Request(format!("download of {} failed", url)));
            }
            inner.download_delays.get(url).copied()
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let inner = self.inner.lock().unwrap();
        inner
            .media
            .get(url)
            .cloned()
            .ok_or_else(|| PlatformError::NotFound(url.to_string()))
    }
}
