//! Browser build of the AmberLoader overlay.
//!
//! This crate is the single WASM artifact a host page loads. It binds the
//! target-independent engine in `overlay-core` to the real browser:
//! - `document.cookie` as the state store
//! - an `<img>` load as the alert probe
//! - the live DOM as the rendering surface
//! - `console` as the log sink
//!
//! Everything here is wasm32-only; on other targets the crate is empty.

#![allow(missing_docs)]

#[cfg(target_arch = "wasm32")]
mod clock;
#[cfg(target_arch = "wasm32")]
mod cookies;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod entry;
#[cfg(target_arch = "wasm32")]
mod logger;
#[cfg(target_arch = "wasm32")]
mod probe;

// Browser smoke tests, driven from the dev server page.
#[cfg(target_arch = "wasm32")]
pub mod tests;

#[cfg(target_arch = "wasm32")]
pub use clock::JsClock;
#[cfg(target_arch = "wasm32")]
pub use cookies::DocumentCookies;
#[cfg(target_arch = "wasm32")]
pub use dom::DomSurface;
#[cfg(target_arch = "wasm32")]
pub use entry::{amberloader_start, amberloader_start_from_element, amberloader_state};
#[cfg(target_arch = "wasm32")]
pub use probe::ImageProbe;
