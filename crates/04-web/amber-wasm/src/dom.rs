//! The overlay's DOM subtree and host content shifting.

use std::rc::Rc;

use overlay_core::surface::{FOOTER_TEXT, POSTER_ALT, TEST_BADGE_TEXT};
use overlay_core::{
    ids, shift_children, BannerSpec, PopupSpec, ShiftTarget, Surface, SurfaceError, UiEvent,
    Viewport, ORIGINAL_TRANSFORM_ATTR,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlAnchorElement, HtmlElement, HtmlImageElement, Window};

type Listener = Closure<dyn FnMut(Event)>;

/// [`Surface`] rendering into the live document.
///
/// Clicks are reported through `on_event`; the surface never touches overlay
/// state itself.
pub struct DomSurface {
    window: Window,
    document: Document,
    on_event: Rc<dyn Fn(UiEvent)>,
    banner_click: Option<Listener>,
    close_click: Option<Listener>,
}

impl DomSurface {
    pub fn new(window: Window, on_event: Rc<dyn Fn(UiEvent)>) -> Result<Self, SurfaceError> {
        let document = window.document().ok_or(SurfaceError::NoDocument)?;
        Ok(Self {
            window,
            document,
            on_event,
            banner_click: None,
            close_click: None,
        })
    }

    fn create(&self, tag: &'static str) -> Result<Element, SurfaceError> {
        self.document
            .create_element(tag)
            .map_err(|err| build_error(tag, err))
    }

    fn create_with(
        &self,
        tag: &'static str,
        id: Option<&str>,
        class: &str,
    ) -> Result<Element, SurfaceError> {
        let element = self.create(tag)?;
        if let Some(id) = id {
            element.set_id(id);
        }
        element.set_class_name(class);
        Ok(element)
    }

    fn container(&self) -> Result<Element, SurfaceError> {
        if let Some(existing) = self.document.get_element_by_id(ids::CONTAINER_ID) {
            return Ok(existing);
        }
        let body = self.document.body().ok_or(SurfaceError::NoDocument)?;
        let container = self.create_with("div", Some(ids::CONTAINER_ID), ids::CONTAINER_CLASS)?;
        body.prepend_with_node_1(&container)
            .map_err(|err| build_error("container", err))?;
        Ok(container)
    }

    fn test_badge(&self) -> Result<Element, SurfaceError> {
        let badge = self.create_with("span", None, ids::TEST_BADGE_CLASS)?;
        badge.set_text_content(Some(TEST_BADGE_TEXT));
        Ok(badge)
    }

    fn listen(&self, element: &Element, event: UiEvent) -> Result<Listener, SurfaceError> {
        let on_event = self.on_event.clone();
        let listener = Closure::wrap(Box::new(move |_: Event| on_event(event)) as Box<dyn FnMut(Event)>);
        element
            .add_event_listener_with_callback("click", listener.as_ref().unchecked_ref())
            .map_err(|err| build_error("click listener", err))?;
        Ok(listener)
    }

    fn remove(&self, id: &str) {
        if let Some(element) = self.document.get_element_by_id(id) {
            element.remove();
        }
    }

    fn poster(&self, spec: &PopupSpec) -> Result<Element, SurfaceError> {
        let image = self
            .create_with("img", None, ids::IMAGE_CLASS)?
            .dyn_into::<HtmlImageElement>()
            .map_err(|_| build_error("img", JsValue::from_str("not an image element")))?;
        image.set_src(&spec.poster_url);
        image.set_alt(POSTER_ALT);

        let Some(href) = spec.link_url.as_deref() else {
            return Ok(image.into());
        };
        let link = self
            .create_with("a", None, ids::LINK_CLASS)?
            .dyn_into::<HtmlAnchorElement>()
            .map_err(|_| build_error("a", JsValue::from_str("not an anchor element")))?;
        link.set_href(href);
        link.set_target("_blank");
        link.set_rel("noopener");
        append(&link, &image)?;
        Ok(link.into())
    }

    fn body_children(&self) -> Vec<BodyChild<'_>> {
        let Some(body) = self.document.body() else {
            return Vec::new();
        };
        let children = body.children();
        (0..children.length())
            .filter_map(|i| children.item(i))
            .map(|element| BodyChild {
                element,
                window: &self.window,
            })
            .collect()
    }
}

impl Surface for DomSurface {
    fn viewport(&self) -> Viewport {
        let dimension = |value: Result<JsValue, JsValue>| {
            value
                .ok()
                .and_then(|v| v.as_f64())
                .filter(|v| v.is_finite() && *v > 0.0)
                .map_or(0, |v| v as u32)
        };
        Viewport::new(
            dimension(self.window.inner_width()),
            dimension(self.window.inner_height()),
        )
    }

    fn mount_banner(&mut self, spec: &BannerSpec) -> Result<(), SurfaceError> {
        let container = self.container()?;
        self.remove(ids::BANNER_ID);
        self.banner_click = None;

        let banner = self.create_with("div", Some(ids::BANNER_ID), ids::BANNER_CLASS)?;
        banner.set_text_content(Some(&spec.text));
        if spec.test_badge {
            append(&banner, &self.test_badge()?)?;
        }
        self.banner_click = Some(self.listen(&banner, UiEvent::BannerClicked)?);

        // The banner always sits above the popup.
        container
            .prepend_with_node_1(&banner)
            .map_err(|err| build_error("banner", err))
    }

    fn mount_popup(&mut self, spec: &PopupSpec) -> Result<(), SurfaceError> {
        let container = self.container()?;
        self.remove(ids::POPUP_ID);
        self.close_click = None;

        let popup = self.create_with("div", Some(ids::POPUP_ID), ids::POPUP_CLASS)?;
        if spec.test_badge {
            append(&popup, &self.test_badge()?)?;
        }

        let close = self.create_with("button", Some(ids::CLOSE_ID), ids::CLOSE_CLASS)?;
        close
            .set_attribute("type", "button")
            .map_err(|err| build_error("button", err))?;
        close
            .set_attribute("aria-label", "Sluiten")
            .map_err(|err| build_error("button", err))?;
        close.set_text_content(Some("\u{2715}"));
        self.close_click = Some(self.listen(&close, UiEvent::CloseClicked)?);
        append(&popup, &close)?;

        append(&popup, &self.poster(spec)?)?;

        if spec.footer {
            let footer = self.create_with("div", None, ids::FOOTER_CLASS)?;
            footer.set_text_content(Some(FOOTER_TEXT));
            append(&popup, &footer)?;
        }

        append(&container, &popup)
    }

    fn has_popup(&self) -> bool {
        self.document.get_element_by_id(ids::POPUP_ID).is_some()
    }

    fn set_poster(&mut self, url: &str) -> Result<(), SurfaceError> {
        let selector = format!("#{} img.{}", ids::POPUP_ID, ids::IMAGE_CLASS);
        let image = self
            .document
            .query_selector(&selector)
            .map_err(|err| build_error("poster", err))?
            .and_then(|el| el.dyn_into::<HtmlImageElement>().ok())
            .ok_or_else(|| build_error("poster", JsValue::from_str("poster image missing")))?;
        if image.src() != url {
            image.set_src(url);
        }
        Ok(())
    }

    fn unmount_popup(&mut self) {
        self.remove(ids::POPUP_ID);
        self.close_click = None;
    }

    fn unmount_all(&mut self) {
        self.remove(ids::CONTAINER_ID);
        self.banner_click = None;
        self.close_click = None;
    }

    fn banner_height(&self) -> u32 {
        self.document
            .get_element_by_id(ids::BANNER_ID)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            .map_or(0, |el| el.offset_height().max(0) as u32)
    }

    fn shift_content(&mut self, offset: u32) {
        let shifted = shift_children(self.body_children(), offset);
        log::debug!("AmberLoader: shifted {shifted} elements by {offset}px");
    }
}

/// A direct child of `<body>`.
struct BodyChild<'a> {
    element: Element,
    window: &'a Window,
}

impl ShiftTarget for BodyChild<'_> {
    fn is_owned(&self) -> bool {
        self.element.id() == ids::CONTAINER_ID
    }

    fn captured_transform(&self) -> Option<String> {
        self.element.get_attribute(ORIGINAL_TRANSFORM_ATTR)
    }

    fn capture_transform(&mut self, original: &str) {
        if let Err(err) = self.element.set_attribute(ORIGINAL_TRANSFORM_ATTR, original) {
            log::warn!("AmberLoader: could not mark element: {err:?}");
        }
    }

    fn computed_transform(&self) -> Option<String> {
        self.window
            .get_computed_style(&self.element)
            .ok()
            .flatten()
            .and_then(|style| style.get_property_value("transform").ok())
    }

    fn set_transform(&mut self, transform: &str) {
        let Some(element) = self.element.dyn_ref::<HtmlElement>() else {
            return;
        };
        if let Err(err) = element.style().set_property("transform", transform) {
            log::warn!("AmberLoader: could not shift element: {err:?}");
        }
    }
}

fn append(parent: &Element, child: &Element) -> Result<(), SurfaceError> {
    parent
        .append_child(child)
        .map(|_| ())
        .map_err(|err| build_error("child", err))
}

fn build_error(element: &'static str, err: JsValue) -> SurfaceError {
    SurfaceError::Build {
        element,
        reason: format!("{err:?}"),
    }
}
