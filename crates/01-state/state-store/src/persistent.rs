use crate::keys::{ACTIVE_ALERT, COLLAPSED, LAST_POLL, STATE_TTL_SECONDS};
use crate::KvStore;

/// Typed view over the overlay's cookies.
///
/// Writes never fail from the caller's point of view: a rejected write is
/// logged and the field simply reads back as it did before. A lost
/// `lastPoll` therefore degrades to polling on every page load.
#[derive(Debug, Clone)]
pub struct PersistentState<S> {
    store: S,
}

impl<S: KvStore> PersistentState<S> {
    /// Wraps a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Borrows the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutably borrows the underlying store.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Epoch seconds of the last completed probe, if still remembered.
    pub fn last_poll(&self) -> Option<u64> {
        self.store.get(LAST_POLL)?.trim().parse().ok()
    }

    /// Seconds elapsed since the last probe.
    ///
    /// Never-polled and future timestamps both report `u64::MAX` so the
    /// cadence gate always lets the next probe through.
    pub fn seconds_since_last_poll(&self, now: u64) -> u64 {
        match self.last_poll() {
            Some(last) if last <= now => now - last,
            _ => u64::MAX,
        }
    }

    /// Records a completed probe at `now`.
    pub fn record_poll(&mut self, now: u64) {
        self.write(LAST_POLL, &now.to_string());
    }

    /// Whether the last probe saw an active alert.
    pub fn active_alert(&self) -> bool {
        self.read_flag(ACTIVE_ALERT)
    }

    /// Persists the alert flag.
    pub fn set_active_alert(&mut self, active: bool) {
        self.write(ACTIVE_ALERT, bool_str(active));
    }

    /// Whether the popup is collapsed. Only meaningful while an alert is active.
    pub fn collapsed(&self) -> bool {
        self.active_alert() && self.read_flag(COLLAPSED)
    }

    /// Persists the collapse preference.
    pub fn set_collapsed(&mut self, collapsed: bool) {
        self.write(COLLAPSED, bool_str(collapsed));
    }

    fn read_flag(&self, key: &str) -> bool {
        self.store.get(key).as_deref() == Some("true")
    }

    fn write(&mut self, key: &str, value: &str) {
        if let Err(err) = self.store.set(key, value, STATE_TTL_SECONDS) {
            log::warn!("AmberLoader: could not persist {key}: {err}");
        }
    }
}

fn bool_str(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::memory::MemoryStore;

    fn state_at(now: u64) -> (ManualClock, PersistentState<MemoryStore>) {
        let clock = ManualClock::at(now);
        (clock.clone(), PersistentState::new(MemoryStore::new(clock)))
    }

    #[test]
    fn never_polled_is_always_due() {
        let (_, state) = state_at(5_000);
        assert_eq!(state.last_poll(), None);
        assert_eq!(state.seconds_since_last_poll(5_000), u64::MAX);
    }

    #[test]
    fn poll_timestamp_round_trips_and_expires_after_an_hour() {
        let (clock, mut state) = state_at(10_000);
        state.record_poll(10_000);
        assert_eq!(state.seconds_since_last_poll(10_042), 42);

        clock.advance(STATE_TTL_SECONDS);
        assert_eq!(state.last_poll(), None);
    }

    #[test]
    fn future_poll_timestamp_counts_as_due() {
        let (_, mut state) = state_at(100);
        state.record_poll(500);
        assert_eq!(state.seconds_since_last_poll(100), u64::MAX);
    }

    #[test]
    fn stale_collapse_never_outlives_the_alert() {
        let (_, mut state) = state_at(0);
        state.set_active_alert(true);
        state.set_collapsed(true);
        assert!(state.collapsed());

        state.set_active_alert(false);
        assert!(!state.collapsed());
    }

    #[test]
    fn garbage_values_read_as_unset() {
        let (_, mut state) = state_at(0);
        state.store_mut().set(LAST_POLL, "soon", 60).unwrap();
        state.store_mut().set(ACTIVE_ALERT, "yes", 60).unwrap();
        assert_eq!(state.last_poll(), None);
        assert!(!state.active_alert());
    }

    #[test]
    fn failed_writes_degrade_to_always_poll() {
        let (_, mut state) = state_at(1_000);
        state.store_mut().reject_writes(true);
        state.record_poll(1_000);
        state.set_active_alert(true);
        assert_eq!(state.seconds_since_last_poll(1_001), u64::MAX);
        assert!(!state.active_alert());
    }
}
