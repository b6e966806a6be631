use crate::error::BrowserError;
use serde_json::Value;
use std::time::Duration;

/// Script that jumps to the bottom of the page to trigger lazy feed loading
pub const SCROLL_TO_BOTTOM_JS: &str = "window.scrollTo(0, document.body.scrollHeight); document.body.scrollHeight";

/// A network response handed to a listener after its filter accepted it
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedResponse {
    pub url: String,
    pub status: u16,
    pub body: String,
}

/// Decides from URL and status whether a response body should be fetched
pub type ResponseFilter = Box<dyn Fn(&str, u16) -> bool + Send + Sync>;

/// Receives the bodies of accepted responses. May be called from the driver's event thread.
pub type ResponseHandler = Box<dyn Fn(CapturedResponse) + Send + Sync>;

/// Capabilities the scrape orchestrators need from a browser page.
///
/// [`BrowserSession`](crate::BrowserSession) implements this on top of Chrome; tests substitute
/// a fake that replays canned HTML and responses.
pub trait BrowserDriver {
    /// Load `url`, failing with [`BrowserError::Timeout`] once `timeout` elapses
    fn navigate(&self, url: &str, timeout: Duration) -> Result<(), BrowserError>;

    /// Block until an element matching `selector` is rendered and visible
    fn wait_for_visible(&self, selector: &str, timeout: Duration) -> Result<(), BrowserError>;

    /// Full rendered HTML of the current document
    fn html(&self) -> Result<String, BrowserError>;

    /// Call `handler` for every response that `filter` accepts. Register before navigating.
    fn on_response(&self, filter: ResponseFilter, handler: ResponseHandler) -> Result<(), BrowserError>;

    /// Let every request continue unmodified
    fn install_passthrough_routing(&self) -> Result<(), BrowserError>;

    fn evaluate(&self, script: &str) -> Result<Value, BrowserError>;

    fn scroll_to_bottom(&self) -> Result<(), BrowserError> {
        self.evaluate(SCROLL_TO_BOTTOM_JS).map(|_| ())
    }

    /// Settle delay between page actions
    fn wait(&self, duration: Duration) {
        std::thread::sleep(duration);
    }

    /// Release every resource held by the session. Idempotent.
    fn close(&self) -> Result<(), BrowserError>;
}

/// Creates one isolated browser session per scrape invocation
pub trait SessionLauncher {
    type Session: BrowserDriver;

    fn launch(&self) -> Result<Self::Session, BrowserError>;
}

/// Closes the wrapped session when dropped, on every exit path
pub(crate) struct SessionGuard<S: BrowserDriver> {
    session: S,
}

impl<S: BrowserDriver> SessionGuard<S> {
    pub(crate) fn new(session: S) -> Self {
        Self { session }
    }
}

impl<S: BrowserDriver> std::ops::Deref for SessionGuard<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.session
    }
}

impl<S: BrowserDriver> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        if let Err(e) = self.session.close() {
            log::warn!("Ignoring failure while closing browser session: {}", e);
        }
    }
}
