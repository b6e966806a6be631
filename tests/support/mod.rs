//! Scripted browser used by the orchestrator integration tests.
//!
//! A [`FakeLauncher`] hands out [`FakeDriver`]s that serve canned HTML and replay canned
//! network responses to registered listeners while "navigating". Counters shared with the
//! launcher let tests check how sessions were used.

#![allow(dead_code)]

use serde_json::Value;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use threads_scraper::browser::{CapturedResponse, ResponseFilter, ResponseHandler};
use threads_scraper::{BrowserDriver, BrowserError, SessionLauncher};

/// Which driver call should fail, and how
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Failure {
    NavigateTimeout,
    NavigateError,
    WaitTimeout,
    HtmlError,
    Launch,
}

#[derive(Debug, Default)]
pub struct Counters {
    pub launches: AtomicUsize,
    pub closes: AtomicUsize,
    pub scrolls: AtomicUsize,
    pub waits: AtomicUsize,
    pub navigations: Mutex<Vec<String>>,
}

impl Counters {
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn scrolls(&self) -> usize {
        self.scrolls.load(Ordering::SeqCst)
    }

    pub fn navigations(&self) -> Vec<String> {
        self.navigations.lock().unwrap().clone()
    }
}

#[derive(Clone, Default)]
pub struct FakeLauncher {
    pub html: String,
    pub responses: Vec<CapturedResponse>,
    pub failure: Option<Failure>,
    /// Panic inside `html()` instead of returning
    pub panic_on_html: bool,
    pub counters: Arc<Counters>,
}

impl FakeLauncher {
    pub fn with_html(html: impl Into<String>) -> Self {
        Self { html: html.into(), ..Default::default() }
    }

    pub fn response(mut self, url: &str, status: u16, body: impl Into<String>) -> Self {
        self.responses.push(CapturedResponse { url: url.to_string(), status, body: body.into() });
        self
    }

    pub fn json_response(self, url: &str, body: &Value) -> Self {
        self.response(url, 200, body.to_string())
    }

    pub fn failing(mut self, failure: Failure) -> Self {
        self.failure = Some(failure);
        self
    }

    pub fn panicking(mut self) -> Self {
        self.panic_on_html = true;
        self
    }
}

impl SessionLauncher for FakeLauncher {
    type Session = FakeDriver;

    fn launch(&self) -> Result<FakeDriver, BrowserError> {
        self.counters.launches.fetch_add(1, Ordering::SeqCst);
        if self.failure == Some(Failure::Launch) {
            return Err(BrowserError::LaunchFailed("no chrome here".to_string()));
        }

        Ok(FakeDriver { script: self.clone(), listeners: Mutex::new(Vec::new()) })
    }
}

pub struct FakeDriver {
    script: FakeLauncher,
    listeners: Mutex<Vec<(ResponseFilter, ResponseHandler)>>,
}

impl FakeDriver {
    fn fails_with(&self, failure: Failure) -> bool {
        self.script.failure == Some(failure)
    }
}

impl BrowserDriver for FakeDriver {
    fn navigate(&self, url: &str, _timeout: Duration) -> Result<(), BrowserError> {
        self.script.counters.navigations.lock().unwrap().push(url.to_string());

        if self.fails_with(Failure::NavigateTimeout) {
            return Err(BrowserError::Timeout(format!("Navigation to {} timed out", url)));
        }
        if self.fails_with(Failure::NavigateError) {
            return Err(BrowserError::NavigationFailed("net::ERR_NAME_NOT_RESOLVED".to_string()));
        }

        let listeners = self.listeners.lock().unwrap();
        for response in &self.script.responses {
            for (filter, handler) in listeners.iter() {
                if filter(&response.url, response.status) {
                    handler(response.clone());
                }
            }
        }
        Ok(())
    }

    fn wait_for_visible(&self, selector: &str, _timeout: Duration) -> Result<(), BrowserError> {
        if self.fails_with(Failure::WaitTimeout) {
            return Err(BrowserError::Timeout(format!("Element {} never became visible", selector)));
        }
        Ok(())
    }

    fn html(&self) -> Result<String, BrowserError> {
        if self.script.panic_on_html {
            panic!("renderer crashed");
        }
        if self.fails_with(Failure::HtmlError) {
            return Err(BrowserError::ContentUnavailable("target closed".to_string()));
        }
        Ok(self.script.html.clone())
    }

    fn on_response(&self, filter: ResponseFilter, handler: ResponseHandler) -> Result<(), BrowserError> {
        self.listeners.lock().unwrap().push((filter, handler));
        Ok(())
    }

    fn install_passthrough_routing(&self) -> Result<(), BrowserError> {
        Ok(())
    }

    fn evaluate(&self, _script: &str) -> Result<Value, BrowserError> {
        Ok(Value::Null)
    }

    fn scroll_to_bottom(&self) -> Result<(), BrowserError> {
        self.script.counters.scrolls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn wait(&self, _duration: Duration) {
        self.script.counters.waits.fetch_add(1, Ordering::SeqCst);
    }

    fn close(&self) -> Result<(), BrowserError> {
        self.script.counters.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Wrap a JSON payload the way the site embeds hydration data
pub fn hidden_block(payload: &Value) -> String {
    format!(
        r#"<script type="application/json" data-sjs>{{"require":[["ScheduledServerJS","handle",null,[{}]]]}}</script>"#,
        payload
    )
}

pub fn page(blocks: &[String]) -> String {
    format!("<html><head></head><body><div data-pressable-container=\"true\"></div>{}</body></html>", blocks.concat())
}
