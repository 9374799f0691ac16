//! In-memory key-value store.

use std::collections::HashMap;

use tracing::warn;

use super::KeyValueStore;
use crate::error::{Error, Result};

/// `HashMap`-backed store for tests and throwaway sessions.
///
/// An optional quota caps the total size of keys plus values in bytes, the
/// way a browser caps local storage. A write that would exceed it fails and
/// leaves the previous value in place.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: HashMap<String, String>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    /// Create an empty store without a quota.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that refuses writes beyond `quota_bytes`.
    #[must_use]
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            slots: HashMap::new(),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Bytes currently used by keys and values.
    #[must_use]
    pub fn used_bytes(&self) -> usize {
        self.slots.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    /// Number of slots holding a value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check whether no slot holds a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if let Some(quota) = self.quota_bytes {
            let current = self.slots.get(key).map_or(0, |v| key.len() + v.len());
            let needed = self.used_bytes() - current + key.len() + value.len();
            if needed > quota {
                warn!(
                    "Refusing write to '{}': {} bytes needed, quota is {}",
                    key, needed, quota
                );
                return Err(Error::storage(
                    key,
                    format!("quota exceeded ({needed} > {quota} bytes)"),
                ));
            }
        }
        self.slots.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.slots.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let mut keys: Vec<String> = self.slots.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_absent_key() {
        let store = MemoryStore::new();
        assert_eq!(store.get("missing").unwrap(), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_set_and_get() {
        let mut store = MemoryStore::new();
        store.set("a", "1").unwrap();
        store.set("a", "2").unwrap();

        assert_eq!(store.get("a").unwrap().as_deref(), Some("2"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove() {
        let mut store = MemoryStore::new();
        store.set("a", "1").unwrap();
        store.remove("a").unwrap();
        store.remove("a").unwrap();

        assert_eq!(store.get("a").unwrap(), None);
    }

    #[test]
    fn test_used_bytes() {
        let mut store = MemoryStore::new();
        store.set("ab", "cde").unwrap();
        assert_eq!(store.used_bytes(), 5);
    }

    #[test]
    fn test_quota_rejects_oversized_write() {
        let mut store = MemoryStore::with_quota(10);
        store.set("k", "12345").unwrap();

        let err = store.set("k", "1234567890").unwrap_err();
        assert!(err.is_storage_error());
        assert!(err.to_string().contains("quota exceeded"));
        assert_eq!(store.get("k").unwrap().as_deref(), Some("12345"));
    }

    #[test]
    fn test_quota_counts_replacement_not_sum() {
        let mut store = MemoryStore::with_quota(10);
        store.set("k", "123456789").unwrap();
        store.set("k", "987654321").unwrap();
        assert_eq!(store.used_bytes(), 10);
    }

    #[test]
    fn test_keys_sorted() {
        let mut store = MemoryStore::new();
        store.set("workers", "[]").unwrap();
        store.set("products", "[]").unwrap();
        assert_eq!(store.keys().unwrap(), vec!["products", "workers"]);
    }
}
