//! Causal reordering of a fetched batch.
//!
//! Timestamps alone do not guarantee that a reply is replayed after the post
//! it answers. [`causal_order`] takes a chronologically sorted batch and
//! produces a processing order where every reply comes strictly after its
//! parent whenever both are in the batch.
//!
//! Parents are located through an ID → position index built once per batch.
//! A parent that already precedes its reply is left where it is; a parent
//! that appears later is pulled forward to sit immediately before the first
//! reply that needs it, together with its own out-of-order ancestors.

use std::collections::{HashMap, HashSet};

use echo_types::{PostId, TimelineItem};

/// Reorder `items` so that parents precede their replies, transitively.
///
/// The relative order of items without an in-batch dependency is preserved.
/// Replies whose parent is not in the batch stay where they are; they are
/// resolved later through the thread map or skipped. Malformed reply cycles
/// cannot stall the reorder: each item is placed exactly once.
pub fn causal_order(items: Vec<TimelineItem>) -> Vec<TimelineItem> {
    let order = placement_order(&items);
    debug_assert_eq!(order.len(), items.len());

    let mut slots: Vec<Option<TimelineItem>> = items.into_iter().map(Some).collect();
    order
        .into_iter()
        .filter_map(|index| slots[index].take())
        .collect()
}

/// Compute the new position of every item as indices into `items`.
fn placement_order(items: &[TimelineItem]) -> Vec<usize> {
    let mut index: HashMap<&PostId, usize> = HashMap::with_capacity(items.len());
    for (position, item) in items.iter().enumerate() {
        index.entry(&item.id).or_insert(position);
    }

    let mut placed = vec![false; items.len()];
    let mut order = Vec::with_capacity(items.len());

    for start in 0..items.len() {
        // Walk up the chain of not-yet-placed in-batch ancestors.
        let mut chain = Vec::new();
        let mut on_chain = HashSet::new();
        let mut current = start;
        while !placed[current] && on_chain.insert(current) {
            chain.push(current);
            match items[current]
                .reply_to
                .as_ref()
                .and_then(|parent| index.get(parent))
            {
                Some(&parent) => current = parent,
                None => break,
            }
        }

        // Oldest ancestor first, the item itself last.
        for &position in chain.iter().rev() {
            placed[position] = true;
            order.push(position);
        }
    }

    order
}
