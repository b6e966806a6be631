//! MCP (Model Context Protocol) tools for scraping Threads
//!
//! Scrapes are blocking, so each tool call runs its [`Scraper`] on tokio's blocking pool.

pub mod handler;
pub use handler::ThreadsServer;

use crate::model::ScrapeResult;
use crate::scraper::{ScrapeRequest, Scraper};
use rmcp::{
    ErrorData as McpError,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Content},
    tool, tool_router,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Post scrape parameters
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ScrapePostParams {
    /// Post URL, e.g. https://www.threads.net/@user/post/ABC123 or https://www.threads.net/t/ABC123
    pub url: String,
    /// Return replies alongside the post (default: true)
    #[serde(default)]
    pub include_replies: Option<bool>,
    /// Keep at most this many replies
    #[serde(default)]
    pub max_replies: Option<u64>,
    /// Navigation timeout in milliseconds, at most 60000 (default: 30000)
    #[serde(default)]
    pub timeout: Option<u64>,
}

/// Profile scrape parameters
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ScrapeProfileParams {
    /// Profile URL, e.g. https://www.threads.net/@user
    pub url: String,
    /// Keep at most this many posts, most recent first
    #[serde(default)]
    pub post_count: Option<u64>,
    /// Navigation timeout in milliseconds, at most 60000 (default: 30000)
    #[serde(default)]
    pub timeout: Option<u64>,
}

impl From<ScrapePostParams> for ScrapeRequest {
    fn from(params: ScrapePostParams) -> Self {
        ScrapeRequest {
            include_replies: params.include_replies,
            max_replies: params.max_replies,
            timeout: params.timeout,
            ..ScrapeRequest::post(params.url)
        }
    }
}

impl From<ScrapeProfileParams> for ScrapeRequest {
    fn from(params: ScrapeProfileParams) -> Self {
        ScrapeRequest { post_count: params.post_count, timeout: params.timeout, ..ScrapeRequest::profile(params.url) }
    }
}

/// Convert a result envelope to an MCP tool result; failures are tool errors, not protocol errors
fn convert_result(result: ScrapeResult, expose_details: bool) -> Result<CallToolResult, McpError> {
    let result = if expose_details { result } else { result.redacted() };
    let text = serde_json::to_string_pretty(&result)
        .map_err(|e| McpError::internal_error(format!("Failed to serialize result: {}", e), None))?;

    if result.is_success() {
        Ok(CallToolResult::success(vec![Content::text(text)]))
    } else {
        Ok(CallToolResult::error(vec![Content::text(text)]))
    }
}

impl ThreadsServer {
    async fn run_request(&self, request: ScrapeRequest) -> Result<CallToolResult, McpError> {
        let scraper = Scraper::new(self.source.clone()).with_config(self.config.clone());

        let result = tokio::task::spawn_blocking(move || scraper.execute(&request))
            .await
            .map_err(|e| McpError::internal_error(format!("Scrape task failed: {}", e), None))?;

        convert_result(result, self.expose_details)
    }
}

#[tool_router]
impl ThreadsServer {
    /// Scrape a post and its replies
    #[tool(description = "Scrape a public Threads post and its replies")]
    async fn threads_scrape_post(&self, params: Parameters<ScrapePostParams>) -> Result<CallToolResult, McpError> {
        self.run_request(params.0.into()).await
    }

    /// Scrape a profile feed
    #[tool(description = "Scrape the most recent posts of a public Threads profile")]
    async fn threads_scrape_profile(
        &self,
        params: Parameters<ScrapeProfileParams>,
    ) -> Result<CallToolResult, McpError> {
        self.run_request(params.0.into()).await
    }
}
