//! Source-to-destination post ID memory.
//!
//! The thread map translates a source reply-to reference into the matching
//! destination post, so reply chains can be rebuilt on the destination
//! account. It also remembers which source posts were reposted, so an item
//! fetched again in a later cycle is never replayed twice. Entries are only
//! ever added for the lifetime of the process.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use echo_types::PostId;

/// Mapping from source post ID to destination post ID.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThreadMap {
    entries: HashMap<PostId, PostId>,
    reposted: HashSet<PostId>,
}

impl ThreadMap {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember that `source` was echoed as `destination`.
    ///
    /// The first mapping for a source ID wins; returns `false` if one already
    /// existed.
    pub fn record(&mut self, source: PostId, destination: PostId) -> bool {
        match self.entries.entry(source) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(destination);
                true
            }
        }
    }

    /// Remember that `source` was replayed as a repost.
    ///
    /// Reposts are not threadable, so this never makes `source` resolvable
    /// through [`destination_of`](Self::destination_of).
    pub fn record_repost(&mut self, source: PostId) -> bool {
        self.reposted.insert(source)
    }

    /// Whether `source` was already echoed or reposted.
    pub fn is_replayed(&self, source: &PostId) -> bool {
        self.entries.contains_key(source) || self.reposted.contains(source)
    }

    /// Destination post for a source post, if it was echoed.
    pub fn destination_of(&self, source: &PostId) -> Option<&PostId> {
        self.entries.get(source)
    }

    /// Number of echoed posts.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been echoed yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
