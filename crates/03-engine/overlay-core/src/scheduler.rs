//! Composition root: poll cadence, detection, reconciliation.

use std::cell::RefCell;

use overlay_config::Config;
use poster_catalog::{Catalog, READ_MORE_URL};
use state_store::{Clock, KvStore, PersistentState};
use url::Url;

use crate::detector::{record_outcome, Probe, ProbeOutcome};
use crate::presentation::{
    Effect, Offset, PresentationEvent, PresentationMachine, PresentationReducer,
    PresentationState,
};
use crate::surface::{BannerSpec, PopupSpec, Surface};

/// Interaction delivered by the rendering layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UiEvent {
    BannerClicked,
    CloseClicked,
    Resized,
}

/// What one scheduling pass did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PassReport {
    /// Probe outcome, `None` when the cadence gate (or an in-flight probe) skipped it.
    pub probed: Option<ProbeOutcome>,
    /// Presentation state after reconciling.
    pub state: PresentationState,
}

/// The widget for one page load.
pub struct Overlay<S, F, C> {
    config: Config,
    catalog: Catalog,
    persisted: PersistentState<S>,
    surface: F,
    clock: C,
    machine: PresentationMachine,
    probe_in_flight: bool,
    // Last conclusive probe of this page load. Cookies may silently refuse
    // writes, so this wins over the persisted flag.
    verdict: Option<bool>,
}

impl<S, F, C> Overlay<S, F, C>
where
    S: KvStore,
    F: Surface,
    C: Clock,
{
    /// Assembles an overlay. Nothing is read or rendered until the first pass.
    pub fn new(config: Config, catalog: Catalog, store: S, surface: F, clock: C) -> Self {
        let machine = PresentationMachine::new(config.auto_close_on_load);
        Self {
            config,
            catalog,
            persisted: PersistentState::new(store),
            surface,
            clock,
            machine,
            probe_in_flight: false,
            verdict: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn state(&self) -> PresentationState {
        self.machine.state()
    }

    pub fn persisted(&self) -> &PersistentState<S> {
        &self.persisted
    }

    pub fn persisted_mut(&mut self) -> &mut PersistentState<S> {
        &mut self.persisted
    }

    pub fn surface(&self) -> &F {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut F {
        &mut self.surface
    }

    pub fn probe_in_flight(&self) -> bool {
        self.probe_in_flight
    }

    /// Whether the cadence allows a probe right now.
    pub fn poll_due(&self) -> bool {
        let now = self.clock.now_epoch_seconds();
        let elapsed = self.persisted.seconds_since_last_poll(now);
        !self.probe_in_flight && elapsed >= u64::from(self.config.poll_interval_seconds)
    }

    /// Claims the probe slot if one is due and returns the asset to probe.
    pub fn begin_probe(&mut self) -> Option<Url> {
        if !self.poll_due() {
            return None;
        }
        self.probe_in_flight = true;
        let now = self.clock.now_epoch_seconds();
        Some(self.catalog.probe_url(self.config.test_mode, now))
    }

    /// Records a probe outcome and drives the matching transition.
    pub fn finish_probe(&mut self, outcome: ProbeOutcome) {
        self.probe_in_flight = false;
        let now = self.clock.now_epoch_seconds();
        record_outcome(&mut self.persisted, outcome, now);
        if let Some(active) = outcome.alert_active() {
            self.verdict = Some(active);
        }
        log::info!("AmberLoader: probe finished: {outcome:?}");

        match outcome {
            ProbeOutcome::Present => self.reconcile(),
            ProbeOutcome::Absent => self.dispatch(PresentationEvent::AlertCancelled),
            ProbeOutcome::TimedOut => {}
        }
    }

    /// Whether an alert is active, as far as this page load knows.
    pub fn alert_active(&self) -> bool {
        self.verdict.unwrap_or_else(|| self.persisted.active_alert())
    }

    /// Brings the DOM in line with the alert verdict and persisted preferences.
    pub fn reconcile(&mut self) {
        let active = self.alert_active();
        let event = PresentationEvent::Reconcile {
            active,
            collapsed: active && self.persisted.collapsed(),
            popup_mounted: self.surface.has_popup(),
        };
        self.dispatch(event);
    }

    /// Feeds a visitor interaction into the state machine.
    pub fn handle(&mut self, event: UiEvent) {
        let popup_mounted = self.surface.has_popup();
        let event = match event {
            UiEvent::BannerClicked => PresentationEvent::BannerClicked { popup_mounted },
            UiEvent::CloseClicked => PresentationEvent::CloseClicked,
            UiEvent::Resized => PresentationEvent::Resized { popup_mounted },
        };
        self.dispatch(event);
    }

    fn dispatch(&mut self, event: PresentationEvent) {
        let before = self.machine.state();
        let effects = self.machine.reduce(event);
        if before != self.machine.state() {
            log::debug!(
                "AmberLoader: {before:?} -> {:?} on {event:?}",
                self.machine.state()
            );
        }
        for effect in effects {
            self.apply(effect);
        }
    }

    fn apply(&mut self, effect: Effect) {
        match effect {
            Effect::MountBanner => {
                let spec = self.banner_spec();
                if let Err(err) = self.surface.mount_banner(&spec) {
                    log::error!("AmberLoader: banner not rendered: {err}");
                }
            }
            Effect::MountPopup => {
                let spec = self.popup_spec();
                if let Err(err) = self.surface.mount_popup(&spec) {
                    log::error!("AmberLoader: popup not rendered: {err}");
                }
            }
            Effect::UnmountPopup => self.surface.unmount_popup(),
            Effect::TearDown => self.surface.unmount_all(),
            Effect::PersistActive(active) => self.persisted.set_active_alert(active),
            Effect::PersistCollapsed(collapsed) => self.persisted.set_collapsed(collapsed),
            Effect::ShiftContent(Offset::BannerHeight) => {
                let height = self.surface.banner_height();
                self.surface.shift_content(height);
            }
            Effect::ShiftContent(Offset::Zero) => self.surface.shift_content(0),
            Effect::RefreshPoster => {
                let url = self.poster_url();
                if let Err(err) = self.surface.set_poster(&url) {
                    log::warn!("AmberLoader: poster not refreshed: {err}");
                }
            }
        }
    }

    fn poster_url(&self) -> String {
        self.catalog
            .poster_url(self.surface.viewport(), self.config.test_mode)
            .into()
    }

    fn banner_spec(&self) -> BannerSpec {
        BannerSpec {
            text: self.config.banner_text.clone(),
            test_badge: self.config.show_test_badge(),
        }
    }

    fn popup_spec(&self) -> PopupSpec {
        PopupSpec {
            poster_url: self.poster_url(),
            link_url: (!self.config.suppress_link).then(|| READ_MORE_URL.to_owned()),
            footer: !self.config.suppress_footer,
            test_badge: self.config.show_test_badge(),
        }
    }
}

/// Poster catalog for `config`.
///
/// A configured poster base is resolved against `page` so hosts can use a
/// relative path. An unusable base falls back to the Dutch hosts.
pub fn catalog_for(config: &Config, page: Option<&Url>) -> Catalog {
    let Some(base) = config.poster_base.as_deref() else {
        return Catalog::standard();
    };
    let resolved = match page {
        Some(page) => page.join(base).map(String::from),
        None => Ok(base.to_owned()),
    };
    match resolved
        .map_err(|err| err.to_string())
        .and_then(|url| Catalog::hosted_at(&url).map_err(|err| err.to_string()))
    {
        Ok(catalog) => catalog,
        Err(err) => {
            log::warn!("AmberLoader: ignoring poster base {base:?}: {err}");
            Catalog::standard()
        }
    }
}

/// Runs one scheduling pass: probe if due, then always reconcile.
///
/// No borrow of `overlay` is held across the probe, so UI events may be
/// handled while it is pending.
pub async fn run_pass<S, F, C, P>(overlay: &RefCell<Overlay<S, F, C>>, probe: &P) -> PassReport
where
    S: KvStore,
    F: Surface,
    C: Clock,
    P: Probe + ?Sized,
{
    let request = overlay.borrow_mut().begin_probe();
    let probed = match request {
        Some(url) => {
            log::debug!("AmberLoader: probing {url}");
            let outcome = probe.probe(&url).await;
            overlay.borrow_mut().finish_probe(outcome);
            Some(outcome)
        }
        None => {
            log::debug!("AmberLoader: probe skipped by cadence");
            None
        }
    };

    let mut overlay = overlay.borrow_mut();
    overlay.reconcile();
    PassReport {
        probed,
        state: overlay.state(),
    }
}
