use std::collections::HashMap;

use crate::clock::{Clock, ManualClock};
use crate::error::{StoreError, StoreResult};
use crate::KvStore;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: u64,
}

/// In-memory [`KvStore`] whose entries expire against a [`Clock`].
///
/// Stands in for the cookie jar in native tests. `with_capacity` and
/// `reject_writes` emulate a full or disabled jar.
#[derive(Debug, Clone)]
pub struct MemoryStore<C: Clock = ManualClock> {
    clock: C,
    entries: HashMap<String, Entry>,
    capacity: Option<usize>,
    reject_writes: bool,
    writes: usize,
}

impl<C: Clock> MemoryStore<C> {
    /// Creates an unbounded store reading time from `clock`.
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            entries: HashMap::new(),
            capacity: None,
            reject_writes: false,
            writes: 0,
        }
    }

    /// Limits the number of live entries.
    pub fn with_capacity(mut self, entries: usize) -> Self {
        self.capacity = Some(entries);
        self
    }

    /// Makes every subsequent write fail as if storage were disabled.
    pub fn reject_writes(&mut self, reject: bool) {
        self.reject_writes = reject;
    }

    /// Number of successful writes, including deletions.
    pub fn write_count(&self) -> usize {
        self.writes
    }

    /// Number of entries that have not yet expired.
    pub fn live_len(&self) -> usize {
        let now = self.clock.now_epoch_seconds();
        self.entries.values().filter(|e| e.expires_at > now).count()
    }

    fn purge_expired(&mut self) {
        let now = self.clock.now_epoch_seconds();
        self.entries.retain(|_, e| e.expires_at > now);
    }
}

impl<C: Clock> KvStore for MemoryStore<C> {
    fn get(&self, key: &str) -> Option<String> {
        let now = self.clock.now_epoch_seconds();
        self.entries
            .get(key)
            .filter(|e| e.expires_at > now)
            .map(|e| e.value.clone())
    }

    fn set(&mut self, key: &str, value: &str, ttl_seconds: u64) -> StoreResult<()> {
        if self.reject_writes {
            return Err(StoreError::rejected("memory store is read-only"));
        }

        self.purge_expired();
        if ttl_seconds == 0 {
            self.entries.remove(key);
            self.writes += 1;
            return Ok(());
        }

        if let Some(capacity) = self.capacity {
            if !self.entries.contains_key(key) && self.entries.len() >= capacity {
                return Err(StoreError::CapacityExceeded {
                    key: key.to_owned(),
                    len: value.len(),
                });
            }
        }

        let expires_at = self.clock.now_epoch_seconds().saturating_add(ttl_seconds);
        self.entries.insert(
            key.to_owned(),
            Entry {
                value: value.to_owned(),
                expires_at,
            },
        );
        self.writes += 1;
        Ok(())
    }
}
