//! In-memory collaborators for driving an [`Overlay`](crate::Overlay) without a browser.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future::LocalBoxFuture;
use futures::FutureExt;
use poster_catalog::Viewport;
use url::Url;

use crate::detector::{Probe, ProbeOutcome};
use crate::surface::{BannerSpec, PopupSpec, Surface, SurfaceError};

/// Surface that records what would have been rendered.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    pub viewport: Viewport,
    /// Height the banner reports once mounted.
    pub banner_px: u32,
    pub banner: Option<BannerSpec>,
    pub popup: Option<PopupSpec>,
    /// Every offset handed to the layout shifter, in order.
    pub shifts: Vec<u32>,
    pub banner_mounts: usize,
    pub popup_mounts: usize,
    /// When set, every mount fails as if the document were gone.
    pub detached: bool,
}

impl RecordingSurface {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            banner_px: 48,
            banner: None,
            popup: None,
            shifts: Vec::new(),
            banner_mounts: 0,
            popup_mounts: 0,
            detached: false,
        }
    }

    /// Last offset applied, if any.
    pub fn last_shift(&self) -> Option<u32> {
        self.shifts.last().copied()
    }
}

impl Default for RecordingSurface {
    fn default() -> Self {
        Self::new(Viewport::new(1920, 1080))
    }
}

impl Surface for RecordingSurface {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn mount_banner(&mut self, spec: &BannerSpec) -> Result<(), SurfaceError> {
        if self.detached {
            return Err(SurfaceError::NoDocument);
        }
        self.banner = Some(spec.clone());
        self.banner_mounts += 1;
        Ok(())
    }

    fn mount_popup(&mut self, spec: &PopupSpec) -> Result<(), SurfaceError> {
        if self.detached {
            return Err(SurfaceError::NoDocument);
        }
        self.popup = Some(spec.clone());
        self.popup_mounts += 1;
        Ok(())
    }

    fn has_popup(&self) -> bool {
        self.popup.is_some()
    }

    fn set_poster(&mut self, url: &str) -> Result<(), SurfaceError> {
        match self.popup.as_mut() {
            Some(popup) => {
                popup.poster_url = url.to_owned();
                Ok(())
            }
            None => Err(SurfaceError::Build {
                element: "poster",
                reason: "no popup".into(),
            }),
        }
    }

    fn unmount_popup(&mut self) {
        self.popup = None;
    }

    fn unmount_all(&mut self) {
        self.popup = None;
        self.banner = None;
    }

    fn banner_height(&self) -> u32 {
        if self.banner.is_some() {
            self.banner_px
        } else {
            0
        }
    }

    fn shift_content(&mut self, offset: u32) {
        self.shifts.push(offset);
    }
}

/// Probe that replays queued outcomes and records what it was asked.
///
/// An exhausted script answers [`ProbeOutcome::Absent`].
#[derive(Debug, Default)]
pub struct ScriptedProbe {
    outcomes: RefCell<VecDeque<ProbeOutcome>>,
    requests: RefCell<Vec<Url>>,
    yield_first: Cell<bool>,
}

impl ScriptedProbe {
    pub fn new(outcomes: impl IntoIterator<Item = ProbeOutcome>) -> Self {
        Self {
            outcomes: RefCell::new(outcomes.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Makes each probe suspend once before resolving.
    pub fn suspending(self) -> Self {
        self.yield_first.set(true);
        self
    }

    /// URLs probed so far.
    pub fn requests(&self) -> Vec<Url> {
        self.requests.borrow().clone()
    }
}

impl Probe for ScriptedProbe {
    fn probe(&self, url: &Url) -> LocalBoxFuture<'_, ProbeOutcome> {
        self.requests.borrow_mut().push(url.clone());
        let outcome = self
            .outcomes
            .borrow_mut()
            .pop_front()
            .unwrap_or(ProbeOutcome::Absent);
        let suspend = self.yield_first.get();
        async move {
            if suspend {
                YieldOnce::default().await;
            }
            outcome
        }
        .boxed_local()
    }
}

/// Returns `Pending` exactly once, waking itself.
#[derive(Debug, Default)]
struct YieldOnce {
    yielded: bool,
}

impl Future for YieldOnce {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            Poll::Ready(())
        } else {
            self.yielded = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }
}
