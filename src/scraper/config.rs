use crate::extract::HiddenDataMarkers;
use std::time::Duration;

/// Navigation and wait budget used when a request sets none
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Settings shared by both scrape modes
#[derive(Debug, Clone)]
pub struct ScraperConfig {
    /// Default budget for navigation and for the content-loaded wait
    pub timeout: Duration,

    /// Element whose visibility signals that the post has rendered
    pub content_selector: String,

    pub hidden_data: HiddenDataMarkers,

    pub capture: CaptureConfig,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            content_selector: "[data-pressable-container=true]".to_string(),
            hidden_data: HiddenDataMarkers::default(),
            capture: CaptureConfig::default(),
        }
    }
}

impl ScraperConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn content_selector(mut self, selector: impl Into<String>) -> Self {
        self.content_selector = selector.into();
        self
    }

    pub fn hidden_data(mut self, markers: HiddenDataMarkers) -> Self {
        self.hidden_data = markers;
        self
    }

    pub fn capture(mut self, capture: CaptureConfig) -> Self {
        self.capture = capture;
        self
    }
}

/// Profile mode's network capture and scroll loop.
///
/// The feed never signals that it has finished loading, so the loop settles for
/// fixed delays and always stops after `scroll_iterations` rounds.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// A response is captured when its URL contains any of these
    pub api_markers: Vec<String>,

    /// Pause after navigation before the first scroll
    pub initial_settle: Duration,

    pub scroll_iterations: usize,

    /// Pause after each scroll
    pub scroll_settle: Duration,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            api_markers: vec!["/graphql".to_string(), "/api/".to_string()],
            initial_settle: Duration::from_millis(3_000),
            scroll_iterations: 5,
            scroll_settle: Duration::from_millis(2_000),
        }
    }
}

impl CaptureConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api_markers<I, S>(mut self, markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.api_markers = markers.into_iter().map(Into::into).collect();
        self
    }

    pub fn initial_settle(mut self, delay: Duration) -> Self {
        self.initial_settle = delay;
        self
    }

    pub fn scroll_iterations(mut self, iterations: usize) -> Self {
        self.scroll_iterations = iterations;
        self
    }

    pub fn scroll_settle(mut self, delay: Duration) -> Self {
        self.scroll_settle = delay;
        self
    }

    /// Whether a response with this URL and status should be captured
    pub fn accepts(&self, url: &str, status: u16) -> bool {
        status == 200 && self.api_markers.iter().any(|marker| url.contains(marker.as_str()))
    }
}
