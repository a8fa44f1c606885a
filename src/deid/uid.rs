//! Session-scoped mapping of original to anonymized UIDs

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use tracing::debug;

/// Root for UUID-derived UIDs
pub const UID_ROOT: &str = "2.25.";

/// Stable order-dependent hash over the UID characters
#[must_use]
pub fn uid_hash(uid: &str) -> u32 {
    uid.bytes()
        .fold(0u32, |hash, b| hash.wrapping_mul(31).wrapping_add(u32::from(b)))
}

/// Build an anonymized UID from the original and a six digit suffix
#[must_use]
pub fn derive_uid(original: &str, suffix: u32) -> String {
    // A zero component would print as "0" followed by the suffix, which is a
    // leading zero
    let hash = uid_hash(original).max(1);
    format!("{UID_ROOT}{hash}{suffix:06}")
}

/// Thread-safe original→anonymized UID map. The first value stored for a
/// UID is kept for the lifetime of the cache.
#[derive(Debug, Default)]
pub struct UidMappingCache {
    map: Mutex<HashMap<String, String>>,
}

impl UidMappingCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // Inserts are single calls, a panic elsewhere cannot leave the map
        // half-updated
        self.map
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Cached value for `uid`, creating it with `generate` on first sight
    pub fn get_or_insert_with(&self, uid: &str, generate: impl FnOnce() -> String) -> String {
        let mut map = self.lock();
        map.entry(uid.to_string())
            .or_insert_with(|| {
                let anonymized = generate();
                debug!(original = uid, anonymized = %anonymized, "New UID mapping");
                anonymized
            })
            .clone()
    }

    #[must_use]
    pub fn get(&self, uid: &str) -> Option<String> {
        self.lock().get(uid).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Forget every mapping
    pub fn clear(&self) {
        self.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_uid_shape() {
        let uid = derive_uid("1.2.840.113619.2.55.3", 123);
        assert!(uid.starts_with("2.25."));
        assert!(uid.ends_with("000123"));
        assert!(uid.len() <= 64);
        assert!(uid[5..].bytes().all(|b| b.is_ascii_digit()));
        assert!(!uid[5..].starts_with('0'));
        assert_eq!(derive_uid("", 100_000), "2.25.1100000");
    }

    #[test]
    fn hash_is_order_dependent() {
        assert_eq!(uid_hash("1.2.3"), uid_hash("1.2.3"));
        assert_ne!(uid_hash("1.2.3"), uid_hash("3.2.1"));
    }

    #[test]
    fn first_writer_wins() {
        let cache = UidMappingCache::new();
        let first = cache.get_or_insert_with("1.2.3", || "2.25.1".to_string());
        let second = cache.get_or_insert_with("1.2.3", || "2.25.2".to_string());
        assert_eq!(first, "2.25.1");
        assert_eq!(second, "2.25.1");
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.get("1.2.3"), None);
    }
}
