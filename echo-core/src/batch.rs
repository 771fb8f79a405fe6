//! Per-cycle batch preparation and the state carried between cycles.

use std::collections::HashSet;

use echo_types::TimelineItem;

use crate::{causal_order, ThreadMap, WatermarkTracker};

/// State that persists across sync cycles for the lifetime of the process.
///
/// Owned by the coordinator; nothing else writes to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncState {
    /// Boundary below which source items are already processed.
    pub watermark: WatermarkTracker,
    /// Source → destination IDs of echoed posts.
    pub threads: ThreadMap,
}

impl SyncState {
    /// Fresh state at the given watermark with an empty thread map.
    pub fn new(watermark: WatermarkTracker) -> Self {
        Self {
            watermark,
            threads: ThreadMap::new(),
        }
    }
}

/// Turn a raw fetched page into the ordered list of items to replay.
///
/// Keeps only items created after the watermark, drops repeated IDs, sorts
/// chronologically (stable, so equal timestamps keep fetch order) and then
/// applies [`causal_order`].
pub fn prepare_batch(items: Vec<TimelineItem>, watermark: &WatermarkTracker) -> Vec<TimelineItem> {
    let mut seen = HashSet::new();
    let mut fresh: Vec<TimelineItem> = items
        .into_iter()
        .filter(|item| watermark.admits(item.created_at))
        .filter(|item| seen.insert(item.id.clone()))
        .collect();

    fresh.sort_by_key(|item| item.created_at);
    causal_order(fresh)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn ids(items: &[TimelineItem]) -> Vec<&str> {
        items.iter().map(|i| i.id.as_str()).collect()
    }

    #[test]
    fn new_state_has_empty_thread_map() {
        let state = SyncState::new(WatermarkTracker::new(at(0)));
        assert!(state.threads.is_empty());
        assert_eq!(state.watermark.current(), at(0));
    }

    #[test]
    fn items_at_or_before_watermark_are_excluded() {
        let watermark = WatermarkTracker::new(at(10));
        let page = vec![
            TimelineItem::new("old", at(5), "old"),
            TimelineItem::new("edge", at(10), "edge"),
            TimelineItem::new("new", at(11), "new"),
        ];

        assert_eq!(ids(&prepare_batch(page, &watermark)), vec!["new"]);
    }

    #[test]
    fn newest_first_page_is_sorted_chronologically() {
        let watermark = WatermarkTracker::new(at(0));
        let page = vec![
            TimelineItem::new("c", at(3), "c"),
            TimelineItem::new("b", at(2), "b"),
            TimelineItem::new("a", at(1), "a"),
        ];

        assert_eq!(ids(&prepare_batch(page, &watermark)), vec!["a", "b", "c"]);
    }

    #[test]
    fn replies_follow_parents_after_sorting() {
        let watermark = WatermarkTracker::new(at(0));
        // B replies to A yet is timestamped earlier
        let page = vec![
            TimelineItem::new("A", at(2), "A"),
            TimelineItem::new("B", at(1), "B").replying_to("A"),
        ];

        assert_eq!(ids(&prepare_batch(page, &watermark)), vec!["A", "B"]);
    }

    #[test]
    fn repeated_ids_are_replayed_once() {
        let watermark = WatermarkTracker::new(at(0));
        let page = vec![
            TimelineItem::new("a", at(1), "a"),
            TimelineItem::new("a", at(1), "a"),
        ];

        assert_eq!(ids(&prepare_batch(page, &watermark)), vec!["a"]);
    }

    #[test]
    fn empty_page_yields_empty_batch() {
        let watermark = WatermarkTracker::new(at(0));
        assert!(prepare_batch(Vec::new(), &watermark).is_empty());
    }
}
