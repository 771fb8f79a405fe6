//! Timeline API wire format.
//!
//! The timeline endpoints return v1.1-style status objects. Only the fields
//! the bot needs are modelled; everything else is ignored by serde.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{MediaKind, MediaRef, PostId, TimelineItem, WireError};

/// `strftime` format of a status' `created_at`, e.g. `Wed Oct 10 20:19:24 +0000 2018`.
pub const TIMESTAMP_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

/// A status object as returned by the timeline and update endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct Status {
    /// Status ID in string form (the numeric `id` overflows f64).
    pub id_str: String,
    /// Creation time in [`TIMESTAMP_FORMAT`].
    pub created_at: String,
    /// Untruncated text (present with `tweet_mode=extended`).
    #[serde(default)]
    pub full_text: Option<String>,
    /// Legacy, possibly truncated text.
    #[serde(default)]
    pub text: Option<String>,
    /// ID of the status this one replies to.
    #[serde(default)]
    pub in_reply_to_status_id_str: Option<String>,
    /// The shared status, when this one is a retweet.
    #[serde(default)]
    pub retweeted_status: Option<Box<Status>>,
    /// Entities; lists the first attachment only.
    #[serde(default)]
    pub entities: Option<StatusEntities>,
    /// Extended entities; lists every attachment.
    #[serde(default)]
    pub extended_entities: Option<StatusEntities>,
}

/// The `entities` / `extended_entities` object of a status.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusEntities {
    /// Attached media.
    #[serde(default)]
    pub media: Vec<StatusMedia>,
}

/// A media entity of a status.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusMedia {
    /// The shortened link inserted into the status text.
    #[serde(default)]
    pub url: Option<String>,
    /// HTTPS download location.
    #[serde(default)]
    pub media_url_https: Option<String>,
    /// HTTP download location (older payloads).
    #[serde(default)]
    pub media_url: Option<String>,
    /// `photo`, `video` or `animated_gif`.
    #[serde(rename = "type")]
    pub kind: MediaKind,
}

/// Response of the media upload endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedMedia {
    /// Handle to reference the upload from a new status.
    pub media_id_string: String,
}

impl Status {
    /// Parse `created_at` into UTC.
    pub fn created_at(&self) -> Result<DateTime<Utc>, WireError> {
        DateTime::parse_from_str(&self.created_at, TIMESTAMP_FORMAT)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|source| WireError::InvalidTimestamp {
                value: self.created_at.clone(),
                source,
            })
    }

    /// Attached media, preferring the complete `extended_entities` list.
    fn media_refs(&self) -> Vec<MediaRef> {
        let entities = self
            .extended_entities
            .as_ref()
            .filter(|e| !e.media.is_empty())
            .or(self.entities.as_ref());

        entities
            .map(|e| {
                e.media
                    .iter()
                    .filter_map(|m| {
                        let url = m.media_url_https.as_ref().or(m.media_url.as_ref())?;
                        Some(MediaRef {
                            url: url.clone(),
                            link: m.url.clone(),
                            kind: m.kind,
                        })
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl TryFrom<Status> for TimelineItem {
    type Error = WireError;

    fn try_from(status: Status) -> Result<Self, Self::Error> {
        if status.id_str.is_empty() {
            return Err(WireError::MissingId);
        }
        let created_at = status.created_at()?;
        let media = status.media_refs();
        let text = status
            .full_text
            .as_deref()
            .or(status.text.as_deref())
            .map(unescape)
            .ok_or_else(|| WireError::MissingText {
                id: status.id_str.clone(),
            })?;
        let reposted = status
            .retweeted_status
            .map(|inner| TimelineItem::try_from(*inner).map(Box::new))
            .transpose()?;

        Ok(TimelineItem {
            id: PostId::new(status.id_str),
            created_at,
            reply_to: status
                .in_reply_to_status_id_str
                .filter(|id| !id.is_empty())
                .map(PostId::new),
            reposted,
            text,
            media,
        })
    }
}

/// Undo the HTML escaping the timeline applies to status text.
fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}
