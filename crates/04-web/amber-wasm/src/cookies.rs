use state_store::{CookieJar, StoreError, StoreResult};
use wasm_bindgen::JsCast;
use web_sys::HtmlDocument;

/// `document.cookie` of the current page.
#[derive(Debug, Clone)]
pub struct DocumentCookies {
    document: HtmlDocument,
}

impl DocumentCookies {
    pub fn new(document: HtmlDocument) -> Self {
        Self { document }
    }

    /// Jar of the global document, if there is one.
    pub fn current() -> Option<Self> {
        let document = web_sys::window()?.document()?;
        document.dyn_into::<HtmlDocument>().ok().map(Self::new)
    }
}

impl CookieJar for DocumentCookies {
    fn read_all(&self) -> String {
        // Sandboxed frames throw on access; treat as empty.
        self.document.cookie().unwrap_or_default()
    }

    fn write(&mut self, assignment: &str) -> StoreResult<()> {
        self.document
            .set_cookie(assignment)
            .map_err(|err| StoreError::rejected(format!("{err:?}")))
    }
}
