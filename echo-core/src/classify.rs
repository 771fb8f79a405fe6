//! Item classification.
//!
//! [`classify`] is a pure function of one fetched item and the current
//! thread map. It decides how the item is replayed on the destination
//! account; it never performs the replay itself.

use std::fmt;

use echo_types::{MediaRef, PostId, TimelineItem};

use crate::ThreadMap;

/// How a single item is replayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayAction {
    /// Do not replay.
    Skip(SkipReason),
    /// Share the original third-party post as-is.
    Repost {
        /// ID of the shared post.
        original: PostId,
    },
    /// Publish the content as a new destination post.
    Echo {
        /// Text with attachment links removed.
        text: String,
        /// Photos to re-host, in attachment order.
        media: Vec<MediaRef>,
        /// Destination post to reply to.
        reply_to: Option<PostId>,
    },
}

impl ReplayAction {
    /// Short name of the action for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Skip(_) => "skip",
            Self::Repost { .. } => "repost",
            Self::Echo { .. } => "echo",
        }
    }
}

/// Why an item is not replayed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A reply whose parent was never echoed, so it cannot be threaded.
    UnthreadableReply {
        /// Source ID of the missing parent.
        parent: PostId,
    },
    /// Nothing left to publish once attachment links and non-photo media are dropped.
    NothingToEcho,
    /// Already echoed or reposted in an earlier cycle.
    AlreadyReplayed,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnthreadableReply { parent } => {
                write!(f, "unthreadable reply (parent {} not echoed)", parent)
            }
            Self::NothingToEcho => f.write_str("nothing to echo"),
            Self::AlreadyReplayed => f.write_str("already replayed"),
        }
    }
}

/// Decide how `item` is replayed given what has been echoed so far.
pub fn classify(item: &TimelineItem, threads: &ThreadMap) -> ReplayAction {
    if threads.is_replayed(&item.id) {
        return ReplayAction::Skip(SkipReason::AlreadyReplayed);
    }

    let reply_to = match &item.reply_to {
        Some(parent) => match threads.destination_of(parent) {
            Some(destination) => Some(destination.clone()),
            None => {
                return ReplayAction::Skip(SkipReason::UnthreadableReply {
                    parent: parent.clone(),
                })
            }
        },
        None => None,
    };

    if reply_to.is_none() {
        if let Some(original) = &item.reposted {
            return ReplayAction::Repost {
                original: original.id.clone(),
            };
        }
    }

    let text = clean_text(&item.text, &item.media);
    let media: Vec<MediaRef> = item.media.iter().filter(|m| m.is_photo()).cloned().collect();
    if text.is_empty() && media.is_empty() {
        return ReplayAction::Skip(SkipReason::NothingToEcho);
    }

    ReplayAction::Echo {
        text,
        media,
        reply_to,
    }
}

/// Strip the in-text links of attached media.
///
/// The destination post re-attaches media natively, so the links would
/// otherwise appear twice. Only whole whitespace-delimited tokens are removed,
/// together with the whitespace that follows them.
pub fn clean_text(text: &str, media: &[MediaRef]) -> String {
    let links: Vec<&str> = media
        .iter()
        .filter_map(|m| m.link.as_deref())
        .filter(|link| !link.is_empty())
        .collect();

    let cleaned: String = text
        .split_inclusive(char::is_whitespace)
        .filter(|piece| !links.contains(&piece.trim_end()))
        .collect();
    cleaned.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use echo_types::MediaKind;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn threads_with(source: &str, destination: &str) -> ThreadMap {
        let mut threads = ThreadMap::new();
        threads.record(PostId::new(source), PostId::new(destination));
        threads
    }

    // ===========================================
    // Classification Tests
    // ===========================================

    #[test]
    fn plain_post_is_echoed_without_reply() {
        let item = TimelineItem::new("1", at(0), "hello world");
        let action = classify(&item, &ThreadMap::new());

        assert_eq!(
            action,
            ReplayAction::Echo {
                text: "hello world".into(),
                media: vec![],
                reply_to: None,
            }
        );
    }

    #[test]
    fn unknown_reply_is_skipped() {
        let item = TimelineItem::new("2", at(0), "@someone agreed").replying_to("untracked");
        let action = classify(&item, &ThreadMap::new());

        assert_eq!(
            action,
            ReplayAction::Skip(SkipReason::UnthreadableReply {
                parent: PostId::new("untracked"),
            })
        );
    }

    #[test]
    fn tracked_reply_is_echoed_with_destination_parent() {
        let item = TimelineItem::new("2", at(0), "part two").replying_to("1");
        let action = classify(&item, &threads_with("1", "dest-1"));

        assert!(matches!(
            action,
            ReplayAction::Echo { reply_to: Some(ref parent), .. } if parent.as_str() == "dest-1"
        ));
    }

    #[test]
    fn repost_shares_the_original() {
        let original = TimelineItem::new("99", at(0), "someone else's words");
        let item = TimelineItem::new("3", at(1), "RT @other: someone else's words")
            .reposting(original);

        assert_eq!(
            classify(&item, &ThreadMap::new()),
            ReplayAction::Repost {
                original: PostId::new("99"),
            }
        );
    }

    #[test]
    fn reply_check_takes_precedence_over_repost() {
        let original = TimelineItem::new("99", at(0), "words");
        let item = TimelineItem::new("3", at(1), "RT")
            .replying_to("missing")
            .reposting(original);

        assert!(matches!(
            classify(&item, &ThreadMap::new()),
            ReplayAction::Skip(SkipReason::UnthreadableReply { .. })
        ));
    }

    #[test]
    fn echoed_item_is_not_replayed_again() {
        let item = TimelineItem::new("1", at(0), "hello");
        let action = classify(&item, &threads_with("1", "dest-1"));

        assert_eq!(action, ReplayAction::Skip(SkipReason::AlreadyReplayed));
    }

    #[test]
    fn reposted_item_is_not_replayed_again() {
        let original = TimelineItem::new("99", at(0), "words");
        let item = TimelineItem::new("3", at(1), "RT").reposting(original);
        let mut threads = ThreadMap::new();
        threads.record_repost(PostId::new("3"));

        assert_eq!(
            classify(&item, &threads),
            ReplayAction::Skip(SkipReason::AlreadyReplayed)
        );
    }

    #[test]
    fn only_photos_are_relayed() {
        let item = TimelineItem::new("4", at(0), "look https://t.co/p https://t.co/v")
            .with_media(MediaRef::photo("https://pbs/p.jpg").with_link("https://t.co/p"))
            .with_media(MediaRef {
                url: "https://video/v.mp4".into(),
                link: Some("https://t.co/v".into()),
                kind: MediaKind::Video,
            });

        match classify(&item, &ThreadMap::new()) {
            ReplayAction::Echo { text, media, .. } => {
                assert_eq!(text, "look");
                assert_eq!(media.len(), 1);
                assert_eq!(media[0].url, "https://pbs/p.jpg");
            }
            other => panic!("Expected Echo, got {:?}", other),
        }
    }

    #[test]
    fn link_only_video_post_has_nothing_to_echo() {
        let item = TimelineItem::new("5", at(0), "https://t.co/v").with_media(MediaRef {
            url: "https://video/v.mp4".into(),
            link: Some("https://t.co/v".into()),
            kind: MediaKind::Video,
        });

        assert_eq!(
            classify(&item, &ThreadMap::new()),
            ReplayAction::Skip(SkipReason::NothingToEcho)
        );
    }

    #[test]
    fn photo_only_post_is_echoed_with_empty_text() {
        let item = TimelineItem::new("6", at(0), "https://t.co/p")
            .with_media(MediaRef::photo("https://pbs/p.jpg").with_link("https://t.co/p"));

        assert!(matches!(
            classify(&item, &ThreadMap::new()),
            ReplayAction::Echo { ref text, ref media, .. } if text.is_empty() && media.len() == 1
        ));
    }

    // ===========================================
    // Text Cleaning Tests
    // ===========================================

    #[test]
    fn clean_text_strips_every_media_link() {
        let media = vec![
            MediaRef::photo("https://pbs/1.jpg").with_link("https://t.co/aaa"),
            MediaRef::photo("https://pbs/2.jpg").with_link("https://t.co/aaa"),
        ];
        assert_eq!(clean_text("sunset https://t.co/aaa", &media), "sunset");
    }

    #[test]
    fn clean_text_keeps_unrelated_links() {
        let media = vec![MediaRef::photo("https://pbs/1.jpg").with_link("https://t.co/img")];
        assert_eq!(
            clean_text("read https://t.co/article https://t.co/img", &media),
            "read https://t.co/article"
        );
    }

    #[test]
    fn clean_text_leaves_longer_urls_sharing_a_prefix() {
        let media = vec![MediaRef::photo("https://pbs/1.jpg").with_link("https://t.co/ab")];
        assert_eq!(
            clean_text("see https://t.co/abc and https://t.co/ab", &media),
            "see https://t.co/abc and"
        );
    }

    #[test]
    fn clean_text_removes_link_between_words() {
        let media = vec![MediaRef::photo("https://pbs/1.jpg").with_link("https://t.co/ab")];
        assert_eq!(
            clean_text("before https://t.co/ab after", &media),
            "before after"
        );
    }

    #[test]
    fn clean_text_without_media_only_trims() {
        assert_eq!(clean_text("  spaced out  ", &[]), "spaced out");
    }

    #[test]
    fn action_names() {
        assert_eq!(ReplayAction::Skip(SkipReason::NothingToEcho).name(), "skip");
        assert_eq!(
            ReplayAction::Repost {
                original: PostId::new("1")
            }
            .name(),
            "repost"
        );
    }

    #[test]
    fn skip_reason_display_names_parent() {
        let reason = SkipReason::UnthreadableReply {
            parent: PostId::new("42"),
        };
        assert_eq!(reason.to_string(), "unthreadable reply (parent 42 not echoed)");
    }
}
