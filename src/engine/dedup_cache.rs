//! Suppression of repeat notifications for the same (subscriber, aircraft).
//!
//! Timestamps are epoch milliseconds. The cache is plain data with no
//! internal locking; the orchestrator owns it behind a mutex and holds the
//! lock for a whole cycle.

use std::collections::HashMap;

use crate::models::SightingKey;

/// Last-notified timestamps keyed by [`SightingKey`].
#[derive(Debug, Default)]
pub struct DedupCache {
    entries: HashMap<SightingKey, i64>,
}

impl DedupCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// True if `key` was never notified or its last notification is older
    /// than `now_ms - expiry_ms`.
    pub fn should_notify(&self, key: &SightingKey, now_ms: i64, expiry_ms: i64) -> bool {
        match self.entries.get(key) {
            None => true,
            Some(&last) => last < now_ms.saturating_sub(expiry_ms),
        }
    }

    /// Stores `now_ms` as the last notification time for `key`.
    pub fn record_notified(&mut self, key: SightingKey, now_ms: i64) {
        self.entries.insert(key, now_ms);
    }

    /// Removes entries older than `now_ms - 2 * expiry_ms` and returns how
    /// many were removed.
    pub fn evict_expired(&mut self, now_ms: i64, expiry_ms: i64) -> usize {
        let cutoff = now_ms.saturating_sub(expiry_ms.saturating_mul(2));
        let before = self.entries.len();
        self.entries.retain(|_, &mut last| last >= cutoff);
        before - self.entries.len()
    }

    /// Last notification time for `key`, if tracked.
    pub fn last_notified(&self, key: &SightingKey) -> Option<i64> {
        self.entries.get(key).copied()
    }

    /// Number of tracked pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
