//! Execution of classified items against the destination account.

use crate::media::{MediaRelay, RelayError};
use crate::platform::{Downloader, Platform, PlatformError};
use echo_core::{ReplayAction, SkipReason, ThreadMap};
use echo_types::{MediaRef, NewPost, PostId, TimelineItem};
use thiserror::Error;

/// Errors replaying a single item.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// An attachment could not be relayed.
    #[error(transparent)]
    Media(#[from] RelayError),

    /// Publishing the echo failed.
    #[error("failed to create post")]
    Post(#[source] PlatformError),

    /// Sharing the original failed.
    #[error("failed to repost")]
    Repost(#[source] PlatformError),
}

/// Result of replaying one item.
#[derive(Debug)]
pub enum Outcome {
    /// Published as a new post with this destination ID.
    Echoed(PostId),
    /// Shared; the share has this destination ID.
    Reposted(PostId),
    /// Deliberately not replayed.
    Skipped(SkipReason),
    /// Replay was attempted and failed.
    Failed(ReplayError),
}

/// Per-item record of a cycle.
#[derive(Debug)]
pub struct ReplayOutcome {
    /// Source item this outcome belongs to.
    pub source_id: PostId,
    /// Name of the classified action (`echo`, `repost` or `skip`).
    pub action: &'static str,
    /// What happened.
    pub outcome: Outcome,
}

impl ReplayOutcome {
    /// Whether the item was replayed.
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Echoed(_) | Outcome::Reposted(_))
    }

    /// Whether replay was attempted and failed.
    pub fn is_failure(&self) -> bool {
        matches!(self.outcome, Outcome::Failed(_))
    }
}

/// Carries out [`ReplayAction`]s on the destination account.
pub struct ReplayExecutor<'a, W: ?Sized, D: ?Sized> {
    writer: &'a W,
    downloader: &'a D,
}

impl<'a, W, D> ReplayExecutor<'a, W, D>
where
    W: Platform + ?Sized,
    D: Downloader + ?Sized,
{
    /// Executor writing to `writer`, fetching attachments with `downloader`.
    pub fn new(writer: &'a W, downloader: &'a D) -> Self {
        Self { writer, downloader }
    }

    /// Replay `item` as decided by `action`.
    ///
    /// A successful echo is recorded in `threads` so later replies can be
    /// threaded onto it; a successful repost is recorded so it is not shared
    /// again. Failures are returned in the outcome, never raised.
    pub async fn execute(
        &self,
        item: &TimelineItem,
        action: ReplayAction,
        threads: &mut ThreadMap,
    ) -> ReplayOutcome {
        let name = action.name();
        let outcome = match action {
            ReplayAction::Skip(reason) => {
                if reason == SkipReason::NothingToEcho {
                    tracing::warn!(
                        source = %item.id,
                        %reason,
                        "Dropping item with no publishable content"
                    );
                } else {
                    tracing::debug!(source = %item.id, %reason, "Skipping item");
                }
                Outcome::Skipped(reason)
            }
            ReplayAction::Repost { original } => match self.writer.repost(&original).await {
                Ok(share) => {
                    threads.record_repost(item.id.clone());
                    tracing::info!(source = %item.id, %original, destination = %share, "Reposted");
                    Outcome::Reposted(share)
                }
                Err(e) => Outcome::Failed(ReplayError::Repost(e)),
            },
            ReplayAction::Echo {
                text,
                media,
                reply_to,
            } => match self.echo(text, &media, reply_to).await {
                Ok(destination) => {
                    threads.record(item.id.clone(), destination.clone());
                    tracing::info!(source = %item.id, %destination, "Echoed");
                    Outcome::Echoed(destination)
                }
                Err(e) => Outcome::Failed(e),
            },
        };

        if let Outcome::Failed(e) = &outcome {
            tracing::warn!(source = %item.id, action = name, error = %e, "Failed to replay item");
        }

        ReplayOutcome {
            source_id: item.id.clone(),
            action: name,
            outcome,
        }
    }

    async fn echo(
        &self,
        text: String,
        media: &[MediaRef],
        reply_to: Option<PostId>,
    ) -> Result<PostId, ReplayError> {
        let handles = MediaRelay::new(self.writer, self.downloader)
            .relay_all(media)
            .await?;

        self.writer
            .create_post(NewPost {
                text,
                media: handles,
                reply_to,
            })
            .await
            .map_err(ReplayError::Post)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MockPlatform;
    use chrono::{DateTime, TimeZone, Utc};
    use echo_core::classify;
    use echo_types::MediaHandle;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    // ===========================================
    // Echo
    // ===========================================

    #[tokio::test]
    async fn echo_records_thread_mapping() {
        let dest = MockPlatform::new();
        let source = MockPlatform::new();
        let mut threads = ThreadMap::new();
        let item = TimelineItem::new("A", at(1), "hello");

        let action = classify(&item, &threads);
        let outcome = ReplayExecutor::new(&dest, &source)
            .execute(&item, action, &mut threads)
            .await;

        assert!(outcome.is_success());
        assert_eq!(outcome.action, "echo");
        assert_eq!(dest.posts()[0].post.text, "hello");
        assert_eq!(
            threads.destination_of(&PostId::new("A")),
            Some(&dest.posts()[0].id)
        );
    }

    #[tokio::test]
    async fn echo_threads_reply_and_attaches_media() {
        let dest = MockPlatform::new();
        let source = MockPlatform::new();
        source.add_media("https://pbs/p.jpg", b"p");
        let mut threads = ThreadMap::new();
        threads.record(PostId::new("A"), PostId::new("A-prime"));
        let item = TimelineItem::new("B", at(2), "reply https://t.co/x")
            .replying_to("A")
            .with_media(MediaRef::photo("https://pbs/p.jpg").with_link("https://t.co/x"));

        let action = classify(&item, &threads);
        ReplayExecutor::new(&dest, &source)
            .execute(&item, action, &mut threads)
            .await;

        let post = &dest.posts()[0].post;
        assert_eq!(post.text, "reply");
        assert_eq!(post.reply_to, Some(PostId::new("A-prime")));
        assert_eq!(post.media, vec![MediaHandle::new("media:p")]);
    }

    #[tokio::test]
    async fn media_failure_publishes_nothing() {
        let dest = MockPlatform::new();
        let source = MockPlatform::new();
        let mut threads = ThreadMap::new();
        let item = TimelineItem::new("A", at(1), "pic")
            .with_media(MediaRef::photo("https://pbs/missing.jpg"));

        let action = classify(&item, &threads);
        let outcome = ReplayExecutor::new(&dest, &source)
            .execute(&item, action, &mut threads)
            .await;

        assert!(matches!(outcome.outcome, Outcome::Failed(ReplayError::Media(_))));
        assert!(dest.posts().is_empty());
        assert!(threads.is_empty());
    }

    #[tokio::test]
    async fn post_failure_leaves_no_mapping() {
        let dest = MockPlatform::new();
        let source = MockPlatform::new();
        dest.fail_next_post("duplicate");
        let mut threads = ThreadMap::new();
        let item = TimelineItem::new("A", at(1), "hello");

        let action = classify(&item, &threads);
        let outcome = ReplayExecutor::new(&dest, &source)
            .execute(&item, action, &mut threads)
            .await;

        assert!(outcome.is_failure());
        assert!(threads.is_empty());
    }

    // ===========================================
    // Repost and Skip
    // ===========================================

    #[tokio::test]
    async fn repost_is_remembered_but_not_threadable() {
        let dest = MockPlatform::new();
        let source = MockPlatform::new();
        let mut threads = ThreadMap::new();
        let original = TimelineItem::new("O", at(0), "theirs");
        let item = TimelineItem::new("R", at(1), "RT theirs").reposting(original);

        let action = classify(&item, &threads);
        let outcome = ReplayExecutor::new(&dest, &source)
            .execute(&item, action, &mut threads)
            .await;

        assert!(matches!(outcome.outcome, Outcome::Reposted(_)));
        assert_eq!(dest.reposts(), vec![PostId::new("O")]);
        assert!(dest.posts().is_empty());
        assert!(threads.destination_of(&PostId::new("R")).is_none());
        assert!(threads.is_replayed(&PostId::new("R")));
    }

    #[tokio::test]
    async fn repost_failure_is_reported() {
        let dest = MockPlatform::new();
        let source = MockPlatform::new();
        dest.fail_next_repost("already retweeted");
        let mut threads = ThreadMap::new();

        let outcome = ReplayExecutor::new(&dest, &source)
            .execute(
                &TimelineItem::new("R", at(1), "RT"),
                ReplayAction::Repost {
                    original: PostId::new("O"),
                },
                &mut threads,
            )
            .await;

        assert!(matches!(outcome.outcome, Outcome::Failed(ReplayError::Repost(_))));
        assert!(!threads.is_replayed(&PostId::new("R")));
    }

    #[tokio::test]
    async fn skip_makes_no_calls() {
        let dest = MockPlatform::new();
        let source = MockPlatform::new();
        let mut threads = ThreadMap::new();
        let item = TimelineItem::new("C", at(3), "orphan").replying_to("X");

        let action = classify(&item, &threads);
        let outcome = ReplayExecutor::new(&dest, &source)
            .execute(&item, action, &mut threads)
            .await;

        assert_eq!(outcome.action, "skip");
        assert!(matches!(
            outcome.outcome,
            Outcome::Skipped(SkipReason::UnthreadableReply { .. })
        ));
        assert_eq!(dest.write_count(), 0);
    }

    #[tokio::test]
    async fn empty_item_is_dropped_without_calls() {
        let dest = MockPlatform::new();
        let source = MockPlatform::new();
        let mut threads = ThreadMap::new();
        let item = TimelineItem::new("E", at(4), "   ");

        let action = classify(&item, &threads);
        let outcome = ReplayExecutor::new(&dest, &source)
            .execute(&item, action, &mut threads)
            .await;

        assert!(matches!(
            outcome.outcome,
            Outcome::Skipped(SkipReason::NothingToEcho)
        ));
        assert_eq!(dest.write_count(), 0);
        assert!(!threads.is_replayed(&PostId::new("E")));
    }
}
