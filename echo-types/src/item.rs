//! Timeline items and capability-surface arguments.
//!
//! A [`TimelineItem`] is immutable once fetched. Items are created per fetch
//! cycle and discarded after it; only their IDs outlive the cycle (in the
//! thread map).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{MediaHandle, PostId};

/// Largest page the timeline endpoint serves in one request.
pub const MAX_PAGE_SIZE: u32 = 200;

/// A post fetched from a timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimelineItem {
    /// Unique per source account.
    pub id: PostId,
    /// When the post was created.
    pub created_at: DateTime<Utc>,
    /// The post this one replies to, if it is a reply.
    pub reply_to: Option<PostId>,
    /// The third-party post this one shares as-is, if it is a repost.
    pub reposted: Option<Box<TimelineItem>>,
    /// Post text, unescaped.
    pub text: String,
    /// Attachments in display order.
    pub media: Vec<MediaRef>,
}

impl TimelineItem {
    /// Create a plain post with no reply, repost or media.
    pub fn new(id: impl Into<PostId>, created_at: DateTime<Utc>, text: &str) -> Self {
        Self {
            id: id.into(),
            created_at,
            reply_to: None,
            reposted: None,
            text: text.to_string(),
            media: Vec::new(),
        }
    }

    /// Mark this item as a reply to `parent`.
    pub fn replying_to(mut self, parent: impl Into<PostId>) -> Self {
        self.reply_to = Some(parent.into());
        self
    }

    /// Mark this item as a repost of `original`.
    pub fn reposting(mut self, original: TimelineItem) -> Self {
        self.reposted = Some(Box::new(original));
        self
    }

    /// Append an attachment.
    pub fn with_media(mut self, media: MediaRef) -> Self {
        self.media.push(media);
        self
    }

    /// Whether this item replies to another post.
    pub fn is_reply(&self) -> bool {
        self.reply_to.is_some()
    }

    /// Whether this item is a pure repost.
    pub fn is_repost(&self) -> bool {
        self.reposted.is_some()
    }
}

/// Kind of a media attachment. Only photos are relayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    /// Still image.
    Photo,
    /// Video clip.
    Video,
    /// Looping GIF (delivered as video).
    AnimatedGif,
    /// Anything the timeline API adds later.
    #[serde(other)]
    Other,
}

/// A remote attachment on a [`TimelineItem`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    /// Where the binary content can be downloaded.
    pub url: String,
    /// Shortened link the platform inserts into the post text for this attachment.
    pub link: Option<String>,
    /// Attachment kind.
    pub kind: MediaKind,
}

impl MediaRef {
    /// A photo attachment without an in-text link.
    pub fn photo(url: &str) -> Self {
        Self {
            url: url.to_string(),
            link: None,
            kind: MediaKind::Photo,
        }
    }

    /// Set the in-text link token.
    pub fn with_link(mut self, link: &str) -> Self {
        self.link = Some(link.to_string());
        self
    }

    /// Whether this attachment is a photo.
    pub fn is_photo(&self) -> bool {
        self.kind == MediaKind::Photo
    }
}

/// Options for listing a timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListOptions {
    /// Maximum number of items to return.
    pub limit: u32,
    /// Include reposts of other accounts' posts.
    pub include_reposts: bool,
    /// Include replies.
    pub include_replies: bool,
}

impl ListOptions {
    /// The single most recent item, reposts included.
    pub fn latest() -> Self {
        Self {
            limit: 1,
            include_reposts: true,
            include_replies: true,
        }
    }

    /// A full recent window of up to `limit` items (capped at [`MAX_PAGE_SIZE`]).
    ///
    /// Replies are included so reply chains can be resolved within the batch.
    pub fn window(limit: u32) -> Self {
        Self {
            limit: limit.clamp(1, MAX_PAGE_SIZE),
            include_reposts: true,
            include_replies: true,
        }
    }
}

/// Arguments to the create-post operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPost {
    /// Post text.
    pub text: String,
    /// Uploaded media in attachment order.
    pub media: Vec<MediaHandle>,
    /// Destination post to reply to.
    pub reply_to: Option<PostId>,
}
