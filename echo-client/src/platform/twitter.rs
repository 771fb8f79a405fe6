//! HTTP client for the v1.1 timeline and media endpoints.

use super::{Downloader, Platform, PlatformError};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use echo_types::{
    AccountRef, ListOptions, MediaHandle, NewPost, PostId, Status, TimelineItem, UploadedMedia,
};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;

/// Default REST API root.
pub const DEFAULT_API_URL: &str = "https://api.twitter.com/1.1";

/// Default media upload API root.
pub const DEFAULT_UPLOAD_URL: &str = "https://upload.twitter.com/1.1";

const USER_AGENT: &str = concat!("tweet-echo/", env!("CARGO_PKG_VERSION"));

/// Connection settings for one account.
#[derive(Clone)]
pub struct TwitterConfig {
    /// REST API root, without trailing slash.
    pub api_url: String,
    /// Media upload API root, without trailing slash.
    pub upload_url: String,
    /// Bearer token of the account.
    pub access_token: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl TwitterConfig {
    /// Settings for the public API with the given bearer token.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            upload_url: DEFAULT_UPLOAD_URL.to_string(),
            access_token: access_token.into(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Override the REST API root.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the upload API root.
    pub fn with_upload_url(mut self, url: impl Into<String>) -> Self {
        self.upload_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for TwitterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TwitterConfig")
            .field("api_url", &self.api_url)
            .field("upload_url", &self.upload_url)
            .field("access_token", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// A [`Platform`] backed by the HTTP API.
#[derive(Clone, Debug)]
pub struct TwitterClient {
    config: TwitterConfig,
    http: reqwest::Client,
}

impl TwitterClient {
    /// Build a client. Fails only if the TLS backend cannot be initialised.
    pub fn new(config: TwitterConfig) -> Result<Self, PlatformError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(map_reqwest)?;
        Ok(Self { config, http })
    }

    /// The settings this client was built with.
    pub fn config(&self) -> &TwitterConfig {
        &self.config
    }

    fn api(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_url, path)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, PlatformError> {
        let response = request
            .bearer_auth(&self.config.access_token)
            .send()
            .await
            .map_err(map_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PlatformError::Api {
                status: status.as_u16(),
                message,
            });
        }

        response.json().await.map_err(map_reqwest)
    }
}

fn map_reqwest(err: reqwest::Error) -> PlatformError {
    if err.is_timeout() {
        PlatformError::Timeout
    } else if err.is_decode() {
        PlatformError::Decode(err.to_string())
    } else {
        PlatformError::Request(err.to_string())
    }
}

/// Query parameters of a timeline request.
fn timeline_query(account: &AccountRef, options: ListOptions) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("count", options.limit.to_string()),
        ("include_rts", options.include_reposts.to_string()),
        ("exclude_replies", (!options.include_replies).to_string()),
        ("tweet_mode", "extended".to_string()),
    ];
    if let AccountRef::User(handle) = account {
        query.push(("screen_name", handle.clone()));
    }
    query
}

/// Form fields of a status update.
fn update_form(post: &NewPost) -> Vec<(&'static str, String)> {
    let mut form = vec![("status", post.text.clone())];
    if !post.media.is_empty() {
        let ids: Vec<&str> = post.media.iter().map(MediaHandle::as_str).collect();
        form.push(("media_ids", ids.join(",")));
    }
    if let Some(parent) = &post.reply_to {
        form.push(("in_reply_to_status_id", parent.to_string()));
        form.push(("auto_populate_reply_metadata", "true".to_string()));
    }
    form
}

/// Convert a timeline page, dropping statuses that cannot be represented.
fn into_items(statuses: Vec<Status>) -> Vec<TimelineItem> {
    statuses
        .into_iter()
        .filter_map(|status| {
            let id = status.id_str.clone();
            match TimelineItem::try_from(status) {
                Ok(item) => Some(item),
                Err(e) => {
                    tracing::warn!(%id, error = %e, "Skipping undecodable status");
                    None
                }
            }
        })
        .collect()
}

#[async_trait]
impl Platform for TwitterClient {
    async fn list_recent_items(
        &self,
        account: &AccountRef,
        options: ListOptions,
    ) -> Result<Vec<TimelineItem>, PlatformError> {
        let request = self
            .http
            .get(self.api("statuses/user_timeline.json"))
            .query(&timeline_query(account, options));
        let statuses: Vec<Status> = self.send(request).await?;
        tracing::debug!(%account, count = statuses.len(), "Fetched timeline page");
        Ok(into_items(statuses))
    }

    async fn create_post(&self, post: NewPost) -> Result<PostId, PlatformError> {
        let request = self
            .http
            .post(self.api("statuses/update.json"))
            .form(&update_form(&post));
        let status: Status = self.send(request).await?;
        Ok(PostId::new(status.id_str))
    }

    async fn repost(&self, id: &PostId) -> Result<PostId, PlatformError> {
        let request = self
            .http
            .post(self.api(&format!("statuses/retweet/{}.json", id)));
        let status: Status = self.send(request).await?;
        Ok(PostId::new(status.id_str))
    }

    async fn upload_media(&self, bytes: &[u8]) -> Result<MediaHandle, PlatformError> {
        let url = format!("{}/media/upload.json", self.config.upload_url);
        let request = self
            .http
            .post(url)
            .form(&[("media_data", BASE64.encode(bytes))]);
        let uploaded: UploadedMedia = self.send(request).await?;
        Ok(MediaHandle::new(uploaded.media_id_string))
    }
}

#[async_trait]
impl Downloader for TwitterClient {
    async fn download_bytes(&self, url: &str) -> Result<Vec<u8>, PlatformError> {
        let response = self.http.get(url).send().await.map_err(map_reqwest)?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PlatformError::NotFound(url.to_string()));
        }
        if !status.is_success() {
            return Err(PlatformError::Api {
                status: status.as_u16(),
                message: format!("download of {} failed", url),
            });
        }

        let bytes = response.bytes().await.map_err(map_reqwest)?;
        Ok(bytes.to_vec())
    }
}
