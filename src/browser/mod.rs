//! Browser session management
//!
//! - [`BrowserDriver`]: the capabilities the scrapers consume from a page
//! - [`BrowserSession`]: the Chrome implementation, built on `headless_chrome`
//! - [`LaunchOptions`] / [`ConnectionOptions`]: how a session gets its browser

pub mod config;
pub mod driver;
pub mod session;

pub use config::{BrowserSource, ConnectionOptions, LaunchOptions, USER_AGENTS};
pub(crate) use driver::SessionGuard;
pub use driver::{BrowserDriver, CapturedResponse, ResponseFilter, ResponseHandler, SessionLauncher};
pub use session::BrowserSession;
