//! Alert polling and presentation engine.
//!
//! This crate holds everything about the overlay that does not need a
//! browser: the layout shifter's transform composition, the presentation
//! state machine, probe bookkeeping, and the scheduler that ties them
//! together. The wasm frontend plugs in a real [`Surface`] and [`Probe`];
//! tests plug in the fakes from [`testing`].

/// Liveness probe seam and outcome bookkeeping.
pub mod detector;
/// Alert feed records (JSON endpoint shape).
pub mod feed;
/// Host content shifting below the banner.
pub mod layout;
/// Collapse/expand/cancel state machine.
pub mod presentation;
/// Netherlands-only visitor gate.
pub mod region;
/// Poll cadence and the per-page-load composition root.
pub mod scheduler;
/// DOM seam and stable element identifiers.
pub mod surface;
/// Fakes for native tests.
pub mod testing;

pub use crate::detector::{record_outcome, Probe, ProbeOutcome};
pub use crate::layout::{compose_transform, shift_children, ShiftTarget, ORIGINAL_TRANSFORM_ATTR};
pub use crate::presentation::{
    Effect, Effects, Offset, PresentationEvent, PresentationMachine, PresentationReducer,
    PresentationState,
};
pub use crate::scheduler::{catalog_for, run_pass, Overlay, PassReport, UiEvent};
pub use crate::surface::{ids, BannerSpec, PopupSpec, Surface, SurfaceError};

pub use overlay_config::{Config, LogLevel};
pub use poster_catalog::{Catalog, ImageSize, Viewport};
pub use state_store::{Clock, KvStore, ManualClock, MemoryStore, PersistentState};
