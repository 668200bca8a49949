//! Pure presentation state machine.
//!
//! The machine never touches the DOM or cookies itself. Each event reduces to
//! an ordered list of [`Effect`]s that the overlay applies to its
//! [`Surface`](crate::surface::Surface) and persisted state, which keeps the
//! collapse/expand/cancel logic testable without a rendering surface.

use smallvec::{smallvec, SmallVec};

/// Visible state of the overlay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PresentationState {
    /// No alert, no DOM.
    #[default]
    Idle,
    /// Alert active, only the slim banner is shown.
    CollapsedBanner,
    /// Alert active, banner plus full popup.
    ExpandedPopup,
}

impl PresentationState {
    /// Whether any overlay DOM should exist.
    pub fn is_active(self) -> bool {
        !matches!(self, PresentationState::Idle)
    }
}

/// Inputs to the state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PresentationEvent {
    /// Bring the UI in line with persisted state.
    Reconcile {
        active: bool,
        collapsed: bool,
        popup_mounted: bool,
    },
    /// The visitor clicked the slim banner.
    BannerClicked { popup_mounted: bool },
    /// The visitor clicked the popup's close control.
    CloseClicked,
    /// The window was resized.
    Resized { popup_mounted: bool },
    /// The detector reported that no alert is active.
    AlertCancelled,
}

/// Layout offset to apply after DOM changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Offset {
    /// The banner's rendered height, measured after mounting.
    BannerHeight,
    /// Restore host content to where it was.
    Zero,
}

/// Side effects requested by a transition, applied in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Effect {
    MountBanner,
    MountPopup,
    UnmountPopup,
    TearDown,
    PersistActive(bool),
    PersistCollapsed(bool),
    ShiftContent(Offset),
    /// Re-select the poster for the current viewport.
    RefreshPoster,
}

/// Effects of one transition.
pub type Effects = SmallVec<[Effect; 8]>;

/// Trait for reducing presentation events into effects.
pub trait PresentationReducer {
    /// Reduces an event into zero or more effects, updating internal state.
    fn reduce(&mut self, event: PresentationEvent) -> Effects;
}

/// Collapse/expand/cancel state machine for one page load.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PresentationMachine {
    state: PresentationState,
    auto_close: bool,
}

impl PresentationMachine {
    /// Starts idle; the first reconcile derives the real state from cookies.
    pub fn new(auto_close_on_load: bool) -> Self {
        Self {
            state: PresentationState::Idle,
            auto_close: auto_close_on_load,
        }
    }

    /// Current state.
    pub fn state(&self) -> PresentationState {
        self.state
    }

    fn open(&mut self, from_banner_click: bool, popup_mounted: bool) -> Effects {
        let mut effects = Effects::new();
        if !from_banner_click {
            effects.push(Effect::MountBanner);
        }
        if !popup_mounted {
            effects.push(Effect::MountPopup);
        }
        effects.push(Effect::ShiftContent(Offset::BannerHeight));
        // Auto-close re-collapses on the next load whatever happens now.
        if self.auto_close {
            effects.push(Effect::PersistCollapsed(true));
        } else if from_banner_click {
            effects.push(Effect::PersistCollapsed(false));
        }
        self.state = PresentationState::ExpandedPopup;
        effects
    }

    fn cancel(&mut self) -> Effects {
        self.state = PresentationState::Idle;
        smallvec![
            Effect::TearDown,
            Effect::PersistActive(false),
            Effect::PersistCollapsed(false),
            Effect::ShiftContent(Offset::Zero),
        ]
    }
}

impl PresentationReducer for PresentationMachine {
    fn reduce(&mut self, event: PresentationEvent) -> Effects {
        use PresentationState::*;

        match (self.state, event) {
            (
                Idle,
                PresentationEvent::Reconcile {
                    active: true,
                    collapsed: true,
                    ..
                },
            ) => {
                self.state = CollapsedBanner;
                smallvec![
                    Effect::MountBanner,
                    Effect::ShiftContent(Offset::BannerHeight)
                ]
            }
            (
                Idle,
                PresentationEvent::Reconcile {
                    active: true,
                    popup_mounted,
                    ..
                },
            ) => self.open(false, popup_mounted),
            (Idle, PresentationEvent::Reconcile { active: false, .. }) => Effects::new(),
            (_, PresentationEvent::Reconcile { active: false, .. }) => self.cancel(),
            (
                ExpandedPopup,
                PresentationEvent::Reconcile {
                    popup_mounted: false,
                    ..
                },
            ) => {
                smallvec![
                    Effect::MountPopup,
                    Effect::ShiftContent(Offset::BannerHeight)
                ]
            }
            // Already rendered for this alert.
            (_, PresentationEvent::Reconcile { .. }) => Effects::new(),

            (CollapsedBanner, PresentationEvent::BannerClicked { popup_mounted }) => {
                self.open(true, popup_mounted)
            }
            (_, PresentationEvent::BannerClicked { .. }) => Effects::new(),

            (ExpandedPopup, PresentationEvent::CloseClicked) => {
                self.state = CollapsedBanner;
                smallvec![
                    Effect::UnmountPopup,
                    Effect::PersistCollapsed(true),
                    Effect::ShiftContent(Offset::BannerHeight),
                ]
            }
            (_, PresentationEvent::CloseClicked) => Effects::new(),

            (Idle, PresentationEvent::Resized { .. }) => Effects::new(),
            (_, PresentationEvent::Resized { popup_mounted }) => {
                let mut effects = Effects::new();
                if popup_mounted {
                    effects.push(Effect::RefreshPoster);
                }
                effects.push(Effect::ShiftContent(Offset::BannerHeight));
                effects
            }

            // No session to tear down; only stale preferences are cleared.
            (Idle, PresentationEvent::AlertCancelled) => smallvec![
                Effect::PersistActive(false),
                Effect::PersistCollapsed(false)
            ],
            (_, PresentationEvent::AlertCancelled) => self.cancel(),
        }
    }
}
