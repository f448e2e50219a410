//! In-memory store with an optional size quota.

use std::collections::BTreeMap;
use std::sync::RwLock;

use super::{KeyValueStore, StoreError, WriteBatch, apply_to_map, check_quota, used_bytes};

/// Byte quota browsers typically grant a single origin's local storage.
pub const BROWSER_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// A process-local store backed by a sorted map.
///
/// With a quota set, any batch that would grow the total size of keys and
/// values past the limit is rejected as a whole. Batches that do not grow the
/// store are always accepted.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryStore {
    /// Create an unbounded store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that holds at most `bytes` of keys and values.
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: RwLock::default(),
            quota: Some(bytes),
        }
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().map_or(0, |m| m.len())
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let entries = self.entries.read().map_err(|_| StoreError::Poisoned)?;
        Ok(entries.keys().cloned().collect())
    }

    fn apply(&self, batch: WriteBatch) -> Result<(), StoreError> {
        if batch.is_empty() {
            return Ok(());
        }

        let mut entries = self.entries.write().map_err(|_| StoreError::Poisoned)?;
        let mut next = entries.clone();
        apply_to_map(&mut next, batch);
        check_quota(self.quota, used_bytes(&entries), used_bytes(&next))?;

        *entries = next;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryStore::new();
        store.set("user_a@b.com", "{}").unwrap();
        assert_eq!(store.get("user_a@b.com").unwrap().as_deref(), Some("{}"));

        store.remove("user_a@b.com").unwrap();
        assert_eq!(store.get("user_a@b.com").unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove_missing_key_is_ok() {
        let store = MemoryStore::new();
        assert!(store.remove("nothing").is_ok());
    }

    #[test]
    fn test_keys_are_sorted_and_prefix_filtered() {
        let store = MemoryStore::new();
        store
            .apply(
                WriteBatch::new()
                    .set("user_b@x.io", "1")
                    .set("school_a@x.io", "2")
                    .set("user_a@x.io", "3"),
            )
            .unwrap();

        assert_eq!(
            store.keys_with_prefix("user_").unwrap(),
            vec!["user_a@x.io".to_owned(), "user_b@x.io".to_owned()]
        );
        assert_eq!(store.keys().unwrap().len(), 3);
    }

    #[test]
    fn test_quota_rejects_whole_batch() {
        let store = MemoryStore::with_quota(10);
        store.set("a", "1234").unwrap();

        let err = store
            .apply(WriteBatch::new().set("b", "1").set("c", "123456789"))
            .unwrap_err();

        assert!(matches!(err, StoreError::QuotaExceeded { limit: 10, .. }));
        assert_eq!(store.get("b").unwrap(), None);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_over_quota_store_can_still_remove() {
        let store = MemoryStore::with_quota(8);
        store
            .entries
            .write()
            .unwrap()
            .insert("user_a@b.com".to_owned(), "{}".to_owned());

        assert!(store.set("b", "1").is_err());
        store
            .apply(WriteBatch::new().remove("user_a@b.com").remove("missing"))
            .unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_quota_allows_shrinking_writes() {
        let store = MemoryStore::with_quota(8);
        store.set("a", "1234567").unwrap();
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
    }
}
