//! # Synthesis Cache
//!
//! Remembers when a simulated tracking history was first synthesised so
//! later lookups extend the same history instead of restarting it.
//!
//! Only the anchor instant is stored; the whole history is re-derived from
//! `(seed, anchor)` on every read. Uses [`DashMap`] so concurrent lookups
//! for the same tracking number agree on one anchor.

use crate::domain::value_objects::TrackingNumber;
use crate::domain::value_objects::timestamp::Timestamp;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

#[derive(Debug, Clone, Copy)]
struct AnchorEntry {
    anchor: Timestamp,
    expires_at: Timestamp,
}

/// In-memory anchor store keyed by tracking number.
#[derive(Debug)]
pub struct InMemorySynthesisCache {
    anchors: DashMap<String, AnchorEntry>,
    ttl_secs: i64,
}

impl InMemorySynthesisCache {
    /// Creates a cache whose entries expire `ttl_secs` after insertion.
    #[must_use]
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            anchors: DashMap::new(),
            ttl_secs: i64::try_from(ttl_secs).unwrap_or(i64::MAX),
        }
    }

    /// Returns the anchor for a tracking number, inserting `now` if there is
    /// no live entry.
    ///
    /// Insert-if-absent is atomic per key: of two concurrent first lookups,
    /// exactly one anchor wins and both callers see it. The result never
    /// lies in the future relative to `now`.
    pub fn anchor_for(&self, tracking_number: &TrackingNumber, now: Timestamp) -> Timestamp {
        let fresh = AnchorEntry {
            anchor: now,
            expires_at: now.add_secs(self.ttl_secs),
        };
        let anchor = match self.anchors.entry(tracking_number.as_str().to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().expires_at.is_after(&now) {
                    occupied.get().anchor
                } else {
                    occupied.insert(fresh);
                    now
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(fresh);
                now
            }
        };
        if anchor.is_after(&now) { now } else { anchor }
    }

    /// Returns the live anchor for a tracking number without inserting.
    #[must_use]
    pub fn get(&self, tracking_number: &TrackingNumber, now: Timestamp) -> Option<Timestamp> {
        self.anchors
            .get(tracking_number.as_str())
            .filter(|entry| entry.expires_at.is_after(&now))
            .map(|entry| entry.anchor)
    }

    /// Drops expired entries and returns how many were removed.
    pub fn purge_expired(&self, now: Timestamp) -> usize {
        let before = self.anchors.len();
        self.anchors.retain(|_, entry| entry.expires_at.is_after(&now));
        before.saturating_sub(self.anchors.len())
    }

    /// Returns the number of stored entries, expired ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.anchors.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.anchors.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn number(raw: &str) -> TrackingNumber {
        TrackingNumber::parse(raw).unwrap()
    }

    fn at(secs: i64) -> Timestamp {
        Timestamp::from_secs(secs).unwrap()
    }

    #[test]
    fn first_lookup_anchors_at_now() {
        let cache = InMemorySynthesisCache::new(3600);
        assert_eq!(cache.anchor_for(&number("ABC"), at(1_000)), at(1_000));
        assert_eq!(cache.anchor_for(&number("ABC"), at(2_000)), at(1_000));
        assert_eq!(cache.get(&number("ABC"), at(2_000)), Some(at(1_000)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn expired_entry_is_replaced() {
        let cache = InMemorySynthesisCache::new(100);
        cache.anchor_for(&number("ABC"), at(1_000));
        assert_eq!(cache.get(&number("ABC"), at(1_100)), None);
        assert_eq!(cache.anchor_for(&number("ABC"), at(1_100)), at(1_100));
    }

    #[test]
    fn anchor_never_in_the_future() {
        let cache = InMemorySynthesisCache::new(3600);
        cache.anchor_for(&number("ABC"), at(5_000));
        // Clock stepped backwards.
        assert_eq!(cache.anchor_for(&number("ABC"), at(4_000)), at(4_000));
    }

    #[test]
    fn purge_removes_only_expired() {
        let cache = InMemorySynthesisCache::new(100);
        cache.anchor_for(&number("OLD"), at(1_000));
        cache.anchor_for(&number("NEW"), at(1_090));
        assert_eq!(cache.purge_expired(at(1_150)), 1);
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&number("NEW"), at(1_150)).is_some());
    }

    #[tokio::test]
    async fn concurrent_first_lookups_agree() {
        let cache = Arc::new(InMemorySynthesisCache::new(3600));
        let mut handles = Vec::new();
        for i in 0..16 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                cache.anchor_for(&number("RACE"), at(1_000 + i))
            }));
        }
        let mut anchors = Vec::new();
        for handle in handles {
            anchors.push(handle.await.unwrap());
        }
        // Every caller sees the winning anchor, clamped to its own now.
        let winner = cache.get(&number("RACE"), at(1_000)).unwrap();
        for anchor in anchors {
            assert!(anchor <= winner);
        }
        assert_eq!(cache.len(), 1);
    }
}
