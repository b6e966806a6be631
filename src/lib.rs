//! # threads-scraper
//!
//! Scrapes public Threads posts and profiles with a real Chrome instance driven over the
//! Chrome DevTools Protocol (CDP).
//!
//! ## Features
//!
//! - **Post mode**: one post and its replies, read from the JSON the page embeds for hydration
//! - **Profile mode**: a profile's recent posts, captured from the site's own API traffic while
//!   the feed is scrolled
//! - **Uniform results**: every call returns a [`ScrapeResult`] envelope with a stable error code
//! - **MCP Server**: both modes exposed as Model Context Protocol tools
//!
//! ## Running
//!
//! ```bash
//! # One-off scrape, JSON on stdout
//! cargo run --bin threads-scraper -- post https://www.threads.net/@user/post/ABC123
//!
//! # MCP server over stdio
//! cargo run --features mcp-server --bin mcp-server
//! ```
//!
//! ## Library Usage
//!
//! ```rust,no_run
//! use threads_scraper::{LaunchOptions, Scraper, ThreadOptions};
//!
//! let scraper = Scraper::new(LaunchOptions::default());
//! let result = scraper.scrape_thread(
//!     "https://www.threads.net/@user/post/ABC123",
//!     &ThreadOptions::new().max_replies(10),
//! );
//!
//! match result.data() {
//!     Some(data) => println!("{} replies to {}", data.metadata.reply_count, data.thread.id),
//!     None => eprintln!("{:?}", result.error()),
//! }
//! ```
//!
//! Requests arriving as JSON go through [`ScrapeRequest`], which validates them before
//! dispatching to the right mode:
//!
//! ```rust,no_run
//! use threads_scraper::{LaunchOptions, ScrapeRequest, Scraper};
//! use serde_json::json;
//!
//! # fn main() -> threads_scraper::Result<()> {
//! let request = ScrapeRequest::from_json(json!({
//!     "url": "https://www.threads.net/@user",
//!     "mode": "profile",
//!     "postCount": 5
//! }))?;
//!
//! let result = Scraper::new(LaunchOptions::default()).execute(&request);
//! println!("{}", serde_json::to_string_pretty(&result).unwrap_or_default());
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`browser`]: the [`BrowserDriver`] seam and its Chrome implementation
//! - [`extract`]: hidden-data extraction, nested key search and post detection
//! - [`normalize`]: raw post objects to [`Post`]
//! - [`scraper`]: the two orchestrators, URL rules and the request contract
//! - [`model`]: output types and the result envelope
//! - [`error`]: error taxonomy and result aliases
//! - [`mcp`]: **Model Context Protocol server** (requires `mcp-handler` feature)

pub mod browser;
pub mod error;
pub mod extract;
pub mod model;
pub mod normalize;
pub mod scraper;

#[cfg(feature = "mcp-handler")]
pub mod mcp;

pub use browser::{BrowserDriver, BrowserSession, BrowserSource, ConnectionOptions, LaunchOptions, SessionLauncher};
pub use error::{BrowserError, ErrorInfo, ErrorKind, Result, ScrapeError};
pub use model::{Author, Media, Metadata, Post, ScrapeData, ScrapeResult, Stats};
pub use normalize::normalize_post;
pub use self::scraper::{ProfileOptions, ScrapeMode, ScrapeRequest, Scraper, ScraperConfig, ThreadOptions};

#[cfg(feature = "mcp-handler")]
pub use mcp::ThreadsServer;
#[cfg(feature = "mcp-handler")]
pub use rmcp::ServiceExt;
