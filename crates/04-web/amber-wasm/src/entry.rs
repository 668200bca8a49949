//! wasm-bindgen exports a host page calls to start the overlay (wasm32 only).

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::{Array, Object, Reflect};
use overlay_core::region::likely_in_netherlands;
use overlay_core::{catalog_for, run_pass, Config, LogLevel, Overlay, UiEvent};
use state_store::CookieStore;
use url::Url;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, Window};

use crate::clock::JsClock;
use crate::cookies::DocumentCookies;
use crate::dom::DomSurface;
use crate::logger;
use crate::probe::ImageProbe;

type WebOverlay = Overlay<CookieStore<DocumentCookies>, DomSurface, JsClock>;

/// The running overlay of this page.
struct Widget {
    overlay: Rc<RefCell<WebOverlay>>,
    probe: Rc<ImageProbe>,
    // Kept alive for as long as the page.
    _listeners: Vec<Closure<dyn FnMut(Event)>>,
}

thread_local! {
    static CTX: RefCell<Option<Widget>> = RefCell::new(None);
    static IN_EXPORT: Cell<bool> = Cell::new(false);
}

fn with_guard<F, R>(f: F) -> Result<R, JsValue>
where
    F: FnOnce() -> Result<R, JsValue>,
{
    IN_EXPORT.with(|g| {
        if g.get() {
            return Err(JsValue::from_str("reentrant export call"));
        }
        g.set(true);
        let r = f();
        g.set(false);
        r
    })
}

/// Starts the overlay from a plain object of configuration attributes,
/// e.g. `{ testmode: "true", polldelay: "600" }`.
#[wasm_bindgen]
pub fn amberloader_start(attributes: &JsValue) -> Result<(), JsValue> {
    let pairs = object_pairs(attributes)?;
    start(pairs)
}

/// Starts the overlay from the `data-*` attributes of an element, typically
/// the `<script>` tag that loaded the bundle.
#[wasm_bindgen]
pub fn amberloader_start_from_element(element: &Element) -> Result<(), JsValue> {
    let pairs = element
        .get_attribute_names()
        .iter()
        .filter_map(|name| name.as_string())
        .filter_map(|name| {
            let value = element.get_attribute(&name)?;
            Some((name, value))
        })
        .collect();
    start(pairs)
}

/// Presentation state of the running overlay, or `"stopped"`.
#[wasm_bindgen]
pub fn amberloader_state() -> String {
    CTX.with(|c| match c.borrow().as_ref() {
        Some(widget) => match widget.overlay.try_borrow() {
            Ok(overlay) => format!("{:?}", overlay.state()),
            Err(_) => "busy".to_owned(),
        },
        None => "stopped".to_owned(),
    })
}

fn start(pairs: Vec<(String, String)>) -> Result<(), JsValue> {
    with_guard(|| {
        let config = configure(pairs);
        log::debug!("AmberLoader: effective config {}", config.to_json());

        if !config.enabled {
            log::info!("AmberLoader: disabled by configuration");
            return Ok(());
        }
        if CTX.with(|c| c.borrow().is_some()) {
            log::warn!("AmberLoader: already started");
            return Ok(());
        }

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        if config.netherlands_only && !visitor_in_netherlands(&window) {
            log::info!("AmberLoader: visitor outside the Netherlands, staying idle");
            return Ok(());
        }

        let widget = Widget::new(window, config)?;
        CTX.with(|c| *c.borrow_mut() = Some(widget));
        log::info!("AmberLoader: started");
        Ok(())
    })
}

/// Parses the host's attributes and applies the configured console level.
pub(crate) fn configure(pairs: Vec<(String, String)>) -> Config {
    // Attribute warnings are emitted before the configured level is known.
    logger::install(LogLevel::default().level_filter());
    let config = Config::from_attributes(pairs);
    logger::install(config.log_level.level_filter());
    config
}

impl Widget {
    fn new(window: Window, config: Config) -> Result<Self, JsValue> {
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let cookies = DocumentCookies::current()
            .ok_or_else(|| JsValue::from_str("document.cookie unavailable"))?;
        let surface = DomSurface::new(window.clone(), Rc::new(dispatch))
            .map_err(|err| JsValue::from_str(&err.to_string()))?;
        let page = document.url().ok().and_then(|url| Url::parse(&url).ok());
        let catalog = catalog_for(&config, page.as_ref());
        let overlay = Overlay::new(
            config,
            catalog,
            CookieStore::new(cookies),
            surface,
            JsClock,
        );

        let mut listeners = Vec::new();

        let on_resize = listener(|| dispatch(UiEvent::Resized));
        window.add_event_listener_with_callback("resize", on_resize.as_ref().unchecked_ref())?;
        listeners.push(on_resize);

        let ready_state = Reflect::get(&document, &"readyState".into())?.as_string();
        if ready_state.as_deref() == Some("loading") {
            let on_ready = listener(schedule_pass);
            document.add_event_listener_with_callback(
                "DOMContentLoaded",
                on_ready.as_ref().unchecked_ref(),
            )?;
            listeners.push(on_ready);
        } else {
            // Deferred so the widget is registered before the pass looks it up.
            wasm_bindgen_futures::spawn_local(async { schedule_pass() });
        }

        Ok(Self {
            overlay: Rc::new(RefCell::new(overlay)),
            probe: Rc::new(ImageProbe::new()),
            _listeners: listeners,
        })
    }
}

fn listener(f: impl Fn() + 'static) -> Closure<dyn FnMut(Event)> {
    Closure::wrap(Box::new(move |_: Event| f()) as Box<dyn FnMut(Event)>)
}

/// Runs one probe-and-render pass in the background.
fn schedule_pass() {
    let Some((overlay, probe)) = CTX.with(|c| {
        c.borrow()
            .as_ref()
            .map(|w| (w.overlay.clone(), w.probe.clone()))
    }) else {
        return;
    };
    wasm_bindgen_futures::spawn_local(async move {
        let report = run_pass(&overlay, &*probe).await;
        log::info!(
            "AmberLoader: pass done (probed: {:?}, state: {:?})",
            report.probed,
            report.state
        );
    });
}

/// Hands a UI event to the overlay once the current DOM callback has returned.
fn dispatch(event: UiEvent) {
    wasm_bindgen_futures::spawn_local(async move {
        let Some(overlay) = CTX.with(|c| c.borrow().as_ref().map(|w| w.overlay.clone())) else {
            return;
        };
        match overlay.try_borrow_mut() {
            Ok(mut overlay) => overlay.handle(event),
            Err(_) => log::warn!("AmberLoader: dropped {event:?} while busy"),
        };
    });
}

fn object_pairs(attributes: &JsValue) -> Result<Vec<(String, String)>, JsValue> {
    if attributes.is_undefined() || attributes.is_null() {
        return Ok(Vec::new());
    }
    let object = attributes
        .dyn_ref::<Object>()
        .ok_or_else(|| JsValue::from_str("attributes must be an object"))?;

    let mut pairs = Vec::new();
    for entry in Object::entries(object).iter() {
        let entry: Array = entry.unchecked_into();
        let Some(key) = entry.get(0).as_string() else {
            continue;
        };
        let value = entry.get(1);
        let value = if let Some(s) = value.as_string() {
            s
        } else if let Some(b) = value.as_bool() {
            b.to_string()
        } else if let Some(n) = value.as_f64() {
            n.to_string()
        } else {
            continue;
        };
        pairs.push((key, value));
    }
    Ok(pairs)
}

fn visitor_in_netherlands(window: &Window) -> bool {
    let formatter = js_sys::Intl::DateTimeFormat::new(&Array::new(), &Object::new());
    let time_zone = Reflect::get(&formatter.resolved_options(), &"timeZone".into())
        .ok()
        .and_then(|tz| tz.as_string());
    let languages: Vec<String> = window
        .navigator()
        .languages()
        .iter()
        .filter_map(|lang| lang.as_string())
        .collect();
    likely_in_netherlands(time_zone.as_deref(), languages.iter().map(String::as_str))
}
