use crate::browser::BrowserSource;
use crate::scraper::ScraperConfig;
use rmcp::{
    ServerHandler,
    handler::server::router::tool::ToolRouter,
    model::{ServerCapabilities, ServerInfo},
    tool_handler,
};

/// MCP server exposing the post and profile scrapers as tools.
///
/// Holds no browser of its own: every tool call launches (or connects to) a fresh session
/// from `source` and releases it before answering.
#[derive(Clone)]
pub struct ThreadsServer {
    pub(crate) source: BrowserSource,
    pub(crate) config: ScraperConfig,
    /// Keep error `details` in tool results. Off by default so internals stay private.
    pub(crate) expose_details: bool,
    pub(crate) tool_router: ToolRouter<Self>,
}

impl ThreadsServer {
    /// Server that launches a local headless Chrome with default settings
    pub fn new() -> Self {
        Self::with_source(BrowserSource::default())
    }

    pub fn with_source(source: impl Into<BrowserSource>) -> Self {
        Self {
            source: source.into(),
            config: ScraperConfig::default(),
            expose_details: false,
            tool_router: Self::tool_router(),
        }
    }

    pub fn with_config(mut self, config: ScraperConfig) -> Self {
        self.config = config;
        self
    }

    pub fn expose_details(mut self, expose: bool) -> Self {
        self.expose_details = expose;
        self
    }
}

impl Default for ThreadsServer {
    fn default() -> Self {
        Self::new()
    }
}

#[tool_handler]
impl ServerHandler for ThreadsServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Scrapes public Threads content. Use threads_scrape_post for a single post and its \
                 replies, threads_scrape_profile for a profile's most recent posts. Results are JSON \
                 envelopes with `success` and either `data` or `error`."
                    .to_string(),
            ),
            ..Default::default()
        }
    }
}
