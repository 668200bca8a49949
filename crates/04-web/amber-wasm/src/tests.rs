//! Browser-side smoke tests for the DOM, cookie and probe bindings.

use std::rc::Rc;

use overlay_core::{
    ids, BannerSpec, PopupSpec, Probe, ProbeOutcome, Surface, UiEvent, ORIGINAL_TRANSFORM_ATTR,
};
use state_store::{CookieStore, KvStore};
use url::Url;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

use crate::cookies::DocumentCookies;
use crate::dom::DomSurface;
use crate::entry::configure;
use crate::logger;
use crate::probe::ImageProbe;

macro_rules! ensure {
    ($cond:expr, $($arg:tt)*) => {
        if !$cond {
            return Err(JsValue::from_str(&format!($($arg)*)));
        }
    };
}

fn document() -> Result<Document, JsValue> {
    web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))
}

fn surface() -> Result<DomSurface, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    DomSurface::new(window, Rc::new(|_: UiEvent| {}))
        .map_err(|err| JsValue::from_str(&err.to_string()))
}

#[wasm_bindgen]
pub fn wasm_smoke_test() -> Result<(), JsValue> {
    let config = overlay_core::Config::from_attributes([("data-polldelay", "5")]);
    ensure!(
        config.poll_interval_seconds == 30,
        "poll interval not clamped: {}",
        config.poll_interval_seconds
    );
    Ok(())
}

#[wasm_bindgen]
pub fn wasm_attribute_warnings_reach_the_console() -> Result<(), JsValue> {
    let before = logger::lines_written();
    let config = configure(vec![
        ("data-polldelay".into(), "soon".into()),
        ("data-loglevel".into(), "silent".into()),
    ]);
    ensure!(
        logger::lines_written() > before,
        "invalid attribute was not reported"
    );
    ensure!(
        log::max_level() == log::LevelFilter::Off,
        "configured level not applied: {}",
        log::max_level()
    );

    ensure!(
        config.poll_interval_seconds == 300,
        "invalid interval kept: {}",
        config.poll_interval_seconds
    );

    configure(Vec::new());
    ensure!(
        log::max_level() == log::LevelFilter::Warn,
        "default level not restored: {}",
        log::max_level()
    );
    Ok(())
}

#[wasm_bindgen]
pub fn wasm_cookie_round_trip() -> Result<(), JsValue> {
    let jar = DocumentCookies::current().ok_or_else(|| JsValue::from_str("no cookie jar"))?;
    let mut store = CookieStore::new(jar);
    let key = "AmberLoader_smoke";

    store
        .set(key, "a value; with=separators", 60)
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    let read = store.get(key);
    ensure!(
        read.as_deref() == Some("a value; with=separators"),
        "cookie read back {:?}",
        read
    );

    store
        .set(key, "", 0)
        .map_err(|err| JsValue::from_str(&err.to_string()))?;
    ensure!(store.get(key).is_none(), "cookie survived deletion");
    Ok(())
}

#[wasm_bindgen]
pub fn wasm_layout_shift_round_trip() -> Result<(), JsValue> {
    let document = document()?;
    let body = document.body().ok_or_else(|| JsValue::from_str("no body"))?;
    let host: HtmlElement = document.create_element("div")?.dyn_into()?;
    host.style().set_property("transform", "rotate(10deg)")?;
    body.append_child(&host)?;

    let mut surface = surface()?;
    surface.shift_content(40);
    let shifted = host.style().get_property_value("transform")?;
    ensure!(
        shifted.contains("translateY(40px)"),
        "host not shifted: {}",
        shifted
    );
    ensure!(
        host.has_attribute(ORIGINAL_TRANSFORM_ATTR),
        "original transform not captured"
    );

    surface.shift_content(40);
    let again = host.style().get_property_value("transform")?;
    ensure!(again == shifted, "repeated shift compounded: {}", again);

    surface.shift_content(0);
    let restored = host.style().get_property_value("transform")?;
    ensure!(
        !restored.contains("translateY"),
        "offset left behind: {}",
        restored
    );

    host.remove();
    Ok(())
}

#[wasm_bindgen]
pub fn wasm_surface_dom_contract() -> Result<(), JsValue> {
    let document = document()?;
    let mut surface = surface()?;
    let fail = |err: overlay_core::SurfaceError| JsValue::from_str(&err.to_string());

    surface
        .mount_banner(&BannerSpec {
            text: "banner".into(),
            test_badge: true,
        })
        .map_err(fail)?;
    surface
        .mount_popup(&PopupSpec {
            poster_url: "https://example.invalid/480x320.png".into(),
            link_url: Some("https://example.invalid/".into()),
            footer: true,
            test_badge: false,
        })
        .map_err(fail)?;

    for selector in [
        format!("#{}.{}", ids::CONTAINER_ID, ids::CONTAINER_CLASS),
        format!("#{}.{}", ids::BANNER_ID, ids::BANNER_CLASS),
        format!("#{}.{}", ids::POPUP_ID, ids::POPUP_CLASS),
        format!("#{}.{}", ids::CLOSE_ID, ids::CLOSE_CLASS),
        format!("a.{} img.{}", ids::LINK_CLASS, ids::IMAGE_CLASS),
        format!(".{}", ids::FOOTER_CLASS),
        format!("#{} .{}", ids::BANNER_ID, ids::TEST_BADGE_CLASS),
    ] {
        ensure!(
            document.query_selector(&selector)?.is_some(),
            "missing {}",
            selector
        );
    }
    ensure!(surface.has_popup(), "popup not reported");

    surface.unmount_popup();
    ensure!(!surface.has_popup(), "popup survived unmount");
    ensure!(
        document.get_element_by_id(ids::BANNER_ID).is_some(),
        "banner removed with popup"
    );

    surface.unmount_all();
    ensure!(
        document.get_element_by_id(ids::CONTAINER_ID).is_none(),
        "container survived teardown"
    );
    // Removing what is already gone is a no-op.
    surface.unmount_all();
    Ok(())
}

#[wasm_bindgen]
pub async fn wasm_probe_missing_asset() -> Result<(), JsValue> {
    let page = Url::parse(&document()?.url()?).map_err(|err| JsValue::from_str(&err.to_string()))?;
    let missing = page
        .join("/missing/amberloader-probe.png")
        .map_err(|err| JsValue::from_str(&err.to_string()))?;

    let outcome = ImageProbe::with_timeout(5_000).probe(&missing).await;
    ensure!(
        outcome == ProbeOutcome::Absent,
        "probe of missing asset gave {:?}",
        outcome
    );
    Ok(())
}
