//! Keyed TTL cache backing analytics deduplication.
//!
//! An explicit, instance-owned cache rather than module-level mutable
//! state, so a fake clock can drive it in tests. Callers pass the
//! current time into every operation; the cache never reads a clock
//! itself.

use std::collections::HashMap;
use std::hash::Hash;

use chrono::Duration;

use crate::domain::foundation::Timestamp;

/// Remembers when each key last fired and suppresses re-fires inside
/// the window.
#[derive(Debug, Clone)]
pub struct TtlCache<K> {
    entries: HashMap<K, Timestamp>,
    window: Duration,
}

impl<K: Eq + Hash + Clone> TtlCache<K> {
    /// Creates a cache with the given suppression window.
    pub fn new(window_secs: u64) -> Self {
        Self {
            entries: HashMap::new(),
            window: Duration::seconds(window_secs as i64),
        }
    }

    /// Records a firing for `key` unless an identical firing landed
    /// within the window. Returns true when the caller should proceed.
    pub fn check_and_insert(&mut self, key: K, now: Timestamp) -> bool {
        if let Some(last) = self.entries.get(&key) {
            if now.duration_since(last) < self.window {
                return false;
            }
        }
        self.entries.insert(key, now);
        self.prune(now);
        true
    }

    /// Drops entries older than the window to keep the map bounded.
    fn prune(&mut self, now: Timestamp) {
        let window = self.window;
        self.entries.retain(|_, last| now.duration_since(last) < window);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> Timestamp {
        Timestamp::from_unix_millis(secs * 1_000)
    }

    #[test]
    fn first_firing_passes() {
        let mut cache: TtlCache<&str> = TtlCache::new(5);
        assert!(cache.check_and_insert("k", at(0)));
    }

    #[test]
    fn identical_key_within_window_is_suppressed() {
        let mut cache: TtlCache<&str> = TtlCache::new(5);
        assert!(cache.check_and_insert("k", at(0)));
        assert!(!cache.check_and_insert("k", at(2)));
        assert!(!cache.check_and_insert("k", at(4)));
    }

    #[test]
    fn key_fires_again_after_window_elapses() {
        let mut cache: TtlCache<&str> = TtlCache::new(5);
        assert!(cache.check_and_insert("k", at(0)));
        assert!(cache.check_and_insert("k", at(5)));
    }

    #[test]
    fn distinct_keys_do_not_interfere() {
        let mut cache: TtlCache<&str> = TtlCache::new(5);
        assert!(cache.check_and_insert("a", at(0)));
        assert!(cache.check_and_insert("b", at(0)));
    }

    #[test]
    fn expired_entries_are_pruned() {
        let mut cache: TtlCache<&str> = TtlCache::new(5);
        cache.check_and_insert("a", at(0));
        cache.check_and_insert("b", at(10));
        assert_eq!(cache.len(), 1);
    }
}
