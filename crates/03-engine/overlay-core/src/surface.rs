//! Rendering seam between the presentation state machine and the DOM.

use poster_catalog::Viewport;
use thiserror::Error;

/// Stable element identifiers and class names targeted by host stylesheets.
pub mod ids {
    /// Root container holding banner and popup.
    pub const CONTAINER_ID: &str = "amberloader-container";
    /// Container class.
    pub const CONTAINER_CLASS: &str = "amberloader-container";
    /// Slim banner.
    pub const BANNER_ID: &str = "amberloader-banner";
    /// Banner class.
    pub const BANNER_CLASS: &str = "amberloader-collapsed";
    /// Expanded poster popup.
    pub const POPUP_ID: &str = "amberloader-popup";
    /// Popup class.
    pub const POPUP_CLASS: &str = "amberloader-popup";
    /// Popup close control.
    pub const CLOSE_ID: &str = "amberloader-closebtn";
    /// Close control class.
    pub const CLOSE_CLASS: &str = "amberloader-closebtn";
    /// Poster image.
    pub const IMAGE_CLASS: &str = "amberloader-image";
    /// Link wrapped around the poster.
    pub const LINK_CLASS: &str = "amberloader-readmore";
    /// Footer credit under the poster.
    pub const FOOTER_CLASS: &str = "amberloader-footer";
    /// Test-mode badge.
    pub const TEST_BADGE_CLASS: &str = "amberloader-testbadge";
}

/// Footer credit copy.
pub const FOOTER_TEXT: &str = "Amber Alert Nederland";
/// Badge copy shown in test mode.
pub const TEST_BADGE_TEXT: &str = "TEST";
/// Alt text for the poster.
pub const POSTER_ALT: &str = "Amber Alert poster";

/// DOM failures. Always absorbed by the overlay.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    #[error("document unavailable")]
    NoDocument,

    #[error("failed to build {element}: {reason}")]
    Build { element: &'static str, reason: String },
}

/// Everything needed to draw the slim banner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BannerSpec {
    pub text: String,
    pub test_badge: bool,
}

/// Everything needed to draw the expanded popup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupSpec {
    pub poster_url: String,
    /// `None` renders the poster without a link.
    pub link_url: Option<String>,
    pub footer: bool,
    pub test_badge: bool,
}

/// Owner of the overlay's DOM subtree.
///
/// Implementations must make every call safe when the targeted element is
/// already gone; removal of missing elements is a no-op.
pub trait Surface {
    /// Current inner window size.
    fn viewport(&self) -> Viewport;

    /// Creates the container (if missing) and the banner.
    fn mount_banner(&mut self, spec: &BannerSpec) -> Result<(), SurfaceError>;

    /// Creates the popup inside the container.
    fn mount_popup(&mut self, spec: &PopupSpec) -> Result<(), SurfaceError>;

    /// Whether a popup element currently exists.
    fn has_popup(&self) -> bool;

    /// Swaps the poster image of an existing popup.
    fn set_poster(&mut self, url: &str) -> Result<(), SurfaceError>;

    /// Removes the popup, keeping the banner.
    fn unmount_popup(&mut self);

    /// Removes every element the overlay created.
    fn unmount_all(&mut self);

    /// Rendered banner height in pixels, zero without a banner.
    fn banner_height(&self) -> u32;

    /// Pushes host content down by `offset` pixels.
    fn shift_content(&mut self, offset: u32);
}
