//! Alert probe backed by an off-screen `<img>` load.

use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;
use futures::future::{select, Either, LocalBoxFuture};
use futures::{pin_mut, FutureExt};
use gloo_timers::future::TimeoutFuture;
use overlay_core::{Probe, ProbeOutcome};
use url::Url;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlImageElement;

/// How long a probe may stay unanswered.
pub const PROBE_TIMEOUT_MS: u32 = 15_000;

type Settle = Rc<RefCell<Option<oneshot::Sender<ProbeOutcome>>>>;

/// Probes an asset by letting the browser load it as an image.
///
/// A cross-origin image load needs no CORS headers, which is why presence is
/// checked this way rather than with `fetch`.
#[derive(Debug, Clone, Copy)]
pub struct ImageProbe {
    timeout_ms: u32,
}

impl ImageProbe {
    pub fn new() -> Self {
        Self::with_timeout(PROBE_TIMEOUT_MS)
    }

    pub fn with_timeout(timeout_ms: u32) -> Self {
        Self { timeout_ms }
    }
}

impl Default for ImageProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl Probe for ImageProbe {
    fn probe(&self, url: &Url) -> LocalBoxFuture<'_, ProbeOutcome> {
        let url = url.to_string();
        let timeout_ms = self.timeout_ms;
        async move {
            match load_image(&url, timeout_ms).await {
                Ok(outcome) => outcome,
                Err(err) => {
                    log::error!("AmberLoader: probe could not start: {err:?}");
                    ProbeOutcome::Absent
                }
            }
        }
        .boxed_local()
    }
}

async fn load_image(url: &str, timeout_ms: u32) -> Result<ProbeOutcome, JsValue> {
    let image = HtmlImageElement::new()?;
    let (sender, receiver) = oneshot::channel::<ProbeOutcome>();
    let sender: Settle = Rc::new(RefCell::new(Some(sender)));

    let on_load = settle_with(&sender, ProbeOutcome::Present);
    let on_error = settle_with(&sender, ProbeOutcome::Absent);
    image.set_onload(Some(on_load.as_ref().unchecked_ref()));
    image.set_onerror(Some(on_error.as_ref().unchecked_ref()));
    image.set_src(url);

    let timeout = TimeoutFuture::new(timeout_ms);
    pin_mut!(timeout);
    let outcome = match select(receiver, timeout).await {
        Either::Left((Ok(outcome), _)) => outcome,
        Either::Left((Err(_), _)) => ProbeOutcome::Absent,
        Either::Right(((), _)) => ProbeOutcome::TimedOut,
    };

    // Detach before dropping the closures so a late event cannot call into freed memory.
    image.set_onload(None);
    image.set_onerror(None);
    image.remove_attribute("src")?;
    drop((on_load, on_error));
    Ok(outcome)
}

fn settle_with(sender: &Settle, outcome: ProbeOutcome) -> Closure<dyn FnMut()> {
    let sender = sender.clone();
    Closure::wrap(Box::new(move || {
        if let Some(sender) = sender.borrow_mut().take() {
            let _ = sender.send(outcome);
        }
    }) as Box<dyn FnMut()>)
}
