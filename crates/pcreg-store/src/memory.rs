//! In-memory key/value substrate for development and testing.
//!
//! Clones share the same entries, so a test can hand one handle to the state
//! store and keep another to inspect what was written. An optional byte quota
//! mimics the few-megabyte limit of browser-style local storage.

use pcreg_core::error::{PcregError, Result};
use pcreg_core::ports::KeyValueStore;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-memory implementation of KeyValueStore
#[derive(Debug, Clone, Default)]
pub struct MemoryKvStore {
    entries: Arc<RwLock<HashMap<String, String>>>,
    writes: Arc<RwLock<Vec<String>>>,
    quota: Option<usize>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that refuses writes once the stored values would exceed `bytes`
    pub fn with_quota(bytes: usize) -> Self {
        Self { quota: Some(bytes), ..Self::default() }
    }

    /// Keys of every successful `set`, oldest first
    pub fn write_log(&self) -> Vec<String> {
        self.writes.read().map(|w| w.clone()).unwrap_or_default()
    }

    /// Number of successful writes to `key`
    pub fn write_count(&self, key: &str) -> usize {
        self.write_log().iter().filter(|k| k.as_str() == key).count()
    }

    /// Total size of the stored values in bytes
    pub fn used_bytes(&self) -> usize {
        self.entries
            .read()
            .map(|entries| entries.values().map(String::len).sum())
            .unwrap_or(0)
    }

    fn poisoned(key: &str) -> PcregError {
        PcregError::Storage {
            key: key.to_string(),
            reason: "in-memory store lock poisoned".to_string(),
        }
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().map_err(|_| Self::poisoned(key))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| Self::poisoned(key))?;

        if let Some(limit) = self.quota {
            let others: usize = entries
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(_, v)| v.len())
                .sum();
            let needed = others + value.len();
            if needed > limit {
                return Err(PcregError::QuotaExceeded { key: key.to_string(), needed, limit });
            }
        }

        entries.insert(key.to_string(), value.to_string());
        self.writes.write().map_err(|_| Self::poisoned(key))?.push(key.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries.write().map_err(|_| Self::poisoned(key))?.remove(key);
        Ok(())
    }
}
