#![deny(missing_docs)]
//! Persistent key-value state for the alert overlay.
//!
//! Browser cookies are the only storage medium the overlay uses. This crate
//! wraps that medium behind the [`KvStore`] trait so the engine can run
//! against real cookies in the browser and against [`MemoryStore`] (driven by
//! a [`ManualClock`]) in native tests. [`PersistentState`] layers the typed
//! poll/alert/collapse fields on top of any store.

/// Time sources used for poll cadence and TTL expiry.
pub mod clock;
/// Cookie header encoding and `document.cookie` lookup.
pub mod cookie;
/// Store error types.
pub mod error;
/// Cookie names and lifetimes shared by every store user.
pub mod keys;
/// In-memory store with clock-driven expiry.
pub mod memory;
/// Typed accessors for the overlay's persisted fields.
pub mod persistent;

pub use crate::clock::{Clock, ManualClock};
pub use crate::cookie::{CookieJar, CookieStore};
pub use crate::error::{StoreError, StoreResult};
pub use crate::memory::MemoryStore;
pub use crate::persistent::PersistentState;

/// String key-value storage with per-key expiry.
///
/// Absent and expired keys are indistinguishable to callers.
pub trait KvStore {
    /// Returns the live value stored under `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key` for `ttl_seconds`. A TTL of zero deletes.
    fn set(&mut self, key: &str, value: &str, ttl_seconds: u64) -> StoreResult<()>;
}

impl<T: KvStore + ?Sized> KvStore for Box<T> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str, ttl_seconds: u64) -> StoreResult<()> {
        (**self).set(key, value, ttl_seconds)
    }
}
