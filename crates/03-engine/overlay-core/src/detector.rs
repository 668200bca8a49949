//! Alert presence detection.
//!
//! The poster host exposes no CORS-readable status endpoint, so presence is
//! inferred from whether the smallest poster asset can be fetched at all. The
//! [`Probe`] seam hides how that fetch happens: an image element in the
//! browser, a scripted outcome in tests.

use std::rc::Rc;

use futures::future::LocalBoxFuture;
use state_store::{KvStore, PersistentState};
use url::Url;

/// Result of one liveness probe.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The asset loaded: an alert is active.
    Present,
    /// The asset failed to load: no alert.
    Absent,
    /// No answer in time; the previous verdict stands.
    TimedOut,
}

impl ProbeOutcome {
    /// Alert flag implied by this outcome, `None` when inconclusive.
    pub fn alert_active(self) -> Option<bool> {
        match self {
            ProbeOutcome::Present => Some(true),
            ProbeOutcome::Absent => Some(false),
            ProbeOutcome::TimedOut => None,
        }
    }
}

/// Single-shot asynchronous existence check for a remote asset.
pub trait Probe {
    /// Resolves once the asset at `url` has loaded, failed, or timed out.
    fn probe(&self, url: &Url) -> LocalBoxFuture<'_, ProbeOutcome>;
}

impl<P: Probe + ?Sized> Probe for Rc<P> {
    fn probe(&self, url: &Url) -> LocalBoxFuture<'_, ProbeOutcome> {
        (**self).probe(url)
    }
}

impl<P: Probe + ?Sized> Probe for Box<P> {
    fn probe(&self, url: &Url) -> LocalBoxFuture<'_, ProbeOutcome> {
        (**self).probe(url)
    }
}

/// Persists a probe outcome.
///
/// The poll timestamp is written whatever the outcome; the alert flag only
/// when the outcome is conclusive.
pub fn record_outcome<S: KvStore>(
    state: &mut PersistentState<S>,
    outcome: ProbeOutcome,
    now: u64,
) {
    if let Some(active) = outcome.alert_active() {
        state.set_active_alert(active);
    }
    state.record_poll(now);
}
