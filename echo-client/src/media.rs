//! Attachment re-hosting.
//!
//! Each attachment is downloaded from the source and uploaded to the
//! destination. All attachments of one post are relayed concurrently, and the
//! resulting handles keep the order of the source attachments regardless of
//! which transfer finishes first.

use crate::platform::{Downloader, Platform, PlatformError};
use echo_types::{MediaHandle, MediaRef};
use futures_util::future::try_join_all;
use thiserror::Error;

/// Errors relaying a single attachment.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Fetching the attachment failed.
    #[error("failed to download {url}")]
    Download {
        /// Attachment location.
        url: String,
        /// Underlying failure.
        #[source]
        source: PlatformError,
    },

    /// Re-hosting the attachment failed.
    #[error("failed to upload {url}")]
    Upload {
        /// Attachment location.
        url: String,
        /// Underlying failure.
        #[source]
        source: PlatformError,
    },
}

/// Moves attachments from the source to the destination account.
pub struct MediaRelay<'a, W: ?Sized, D: ?Sized> {
    uploader: &'a W,
    downloader: &'a D,
}

impl<'a, W, D> MediaRelay<'a, W, D>
where
    W: Platform + ?Sized,
    D: Downloader + ?Sized,
{
    /// Relay with the given destination and attachment fetcher.
    pub fn new(uploader: &'a W, downloader: &'a D) -> Self {
        Self {
            uploader,
            downloader,
        }
    }

    /// Download one attachment and upload it.
    pub async fn relay(&self, media: &MediaRef) -> Result<MediaHandle, RelayError> {
        let bytes = self
            .downloader
            .download_bytes(&media.url)
            .await
            .map_err(|source| RelayError::Download {
                url: media.url.clone(),
                source,
            })?;

        let handle = self
            .uploader
            .upload_media(&bytes)
            .await
            .map_err(|source| RelayError::Upload {
                url: media.url.clone(),
                source,
            })?;

        tracing::debug!(url = %media.url, %handle, size = bytes.len(), "Relayed attachment");
        Ok(handle)
    }

    /// Relay every attachment concurrently.
    ///
    /// Handles are returned in the order of `media`. The first failure
    /// aborts the whole set; nothing is posted with a partial set.
    pub async fn relay_all(&self, media: &[MediaRef]) -> Result<Vec<MediaHandle>, RelayError> {
        try_join_all(media.iter().map(|m| self.relay(m))).await
    }
}
