//! Cache Store Module
//!
//! A named, optionally bounded collection of serialized responses that
//! preserves insertion order.

use std::collections::HashMap;

use tracing::warn;

use crate::cache::{CacheEntry, CacheStats, InsertionOrder};
use crate::error::{CacheError, Result};

// == Cache Store ==
/// Named response store with insertion-order tracking.
///
/// Entries are kept serialized, the way an on-device store holds them; a
/// payload that no longer decodes reads as corrupt.
#[derive(Debug)]
pub struct CacheStore {
    /// Store name, including the generation tag
    name: String,
    /// Soft item cap enforced by the eviction engine, None = unbounded
    max_items: Option<usize>,
    /// Optional byte quota across all payloads
    quota_bytes: Option<usize>,
    /// Serialized entries by key
    entries: HashMap<String, Vec<u8>>,
    /// First-insertion order
    order: InsertionOrder,
    /// Bytes currently held
    used_bytes: usize,
    /// Performance statistics
    stats: CacheStats,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store.
    ///
    /// # Arguments
    /// * `name` - Store name including its generation tag
    /// * `max_items` - Item cap, or None for an unbounded store
    pub fn new(name: impl Into<String>, max_items: Option<usize>) -> Self {
        Self {
            name: name.into(),
            max_items,
            quota_bytes: None,
            entries: HashMap::new(),
            order: InsertionOrder::new(),
            used_bytes: 0,
            stats: CacheStats::new(),
        }
    }

    /// Sets a byte quota; writes that would exceed it fail.
    pub fn with_quota(mut self, quota_bytes: Option<usize>) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    // == Put ==
    /// Inserts or replaces the entry stored under `entry.key`.
    ///
    /// New keys are appended to the end of insertion order; a replaced key
    /// keeps its position. A failed write leaves the store untouched.
    pub fn put(&mut self, entry: &CacheEntry) -> Result<()> {
        let payload = match serde_json::to_vec(entry) {
            Ok(payload) => payload,
            Err(e) => {
                self.stats.record_write_failure();
                return Err(e.into());
            }
        };

        let replaced = self.entries.get(&entry.key).map_or(0, Vec::len);
        if let Some(quota) = self.quota_bytes {
            let available = quota.saturating_sub(self.used_bytes - replaced);
            if payload.len() > available {
                self.stats.record_write_failure();
                return Err(CacheError::QuotaExceeded {
                    store: self.name.clone(),
                    needed: payload.len(),
                    available,
                });
            }
        }

        self.used_bytes = self.used_bytes - replaced + payload.len();
        if self.entries.insert(entry.key.clone(), payload).is_none() {
            self.order.push_newest(entry.key.as_str());
        }
        self.stats.set_total_entries(self.entries.len());

        Ok(())
    }

    // == Get ==
    /// Returns the entry stored under `key`, with no side effects.
    ///
    /// A payload that fails to decode yields `CacheError::Corrupt`.
    pub fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        let Some(payload) = self.entries.get(key) else {
            return Ok(None);
        };

        serde_json::from_slice::<CacheEntry>(payload)
            .map(Some)
            .map_err(|e| CacheError::Corrupt(format!("{} in '{}': {}", key, self.name, e)))
    }

    // == Peek ==
    /// Reads an entry for request handling without touching statistics.
    ///
    /// Corrupt entries are logged and reported as missing.
    pub fn peek(&self, key: &str) -> Option<CacheEntry> {
        match self.get(key) {
            Ok(found) => found,
            Err(e) => {
                warn!(store = %self.name, error = %e, "Discarding unreadable cache entry");
                None
            }
        }
    }

    // == Lookup ==
    /// Reads an entry for request handling, recording a hit or miss.
    pub fn lookup(&mut self, key: &str) -> Option<CacheEntry> {
        let found = self.peek(key);
        self.record_lookup(found.is_some());
        found
    }

    /// Charges one lookup outcome to this store's statistics.
    pub fn record_lookup(&mut self, hit: bool) {
        if hit {
            self.stats.record_hit();
        } else {
            self.stats.record_miss();
        }
    }

    // == Keys ==
    /// All keys from oldest to newest insertion.
    pub fn keys(&self) -> Vec<String> {
        self.order.keys()
    }

    // == Delete ==
    /// Removes an entry; no-op if absent. Returns true when something was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        match self.entries.remove(key) {
            Some(payload) => {
                self.used_bytes -= payload.len();
                self.order.remove(key);
                self.stats.set_total_entries(self.entries.len());
                true
            }
            None => false,
        }
    }

    // == Evict ==
    /// Removes the earliest-inserted entry on behalf of the eviction engine.
    ///
    /// Returns the evicted key.
    pub fn evict_oldest(&mut self) -> Option<String> {
        let key = self.order.pop_oldest()?;
        if let Some(payload) = self.entries.remove(&key) {
            self.used_bytes -= payload.len();
        }
        self.stats.set_total_entries(self.entries.len());
        self.stats.record_eviction();
        Some(key)
    }

    // == Accessors ==
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn max_items(&self) -> Option<usize> {
        self.max_items
    }

    pub fn used_bytes(&self) -> usize {
        self.used_bytes
    }

    /// Returns current store statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stores raw bytes under a key, bypassing encoding.
    #[cfg(test)]
    pub(crate) fn put_raw(&mut self, key: &str, payload: Vec<u8>) {
        self.used_bytes += payload.len();
        if self.entries.insert(key.to_string(), payload).is_none() {
            self.order.push_newest(key);
        }
    }
}
