//! Scrape orchestration
//!
//! A [`Scraper`] owns a [`SessionLauncher`] and a [`ScraperConfig`]. Every call launches a
//! fresh browser session, drives it through one of two pipelines and always hands back a
//! [`ScrapeResult`]:
//!
//! - post mode ([`Scraper::scrape_thread`]): one page load, the post and its replies are
//!   read from the hidden hydration data
//! - profile mode ([`Scraper::scrape_profile`]): API responses are captured while the feed
//!   is scrolled, then post-like objects are detected, deduplicated and sorted by recency

pub mod config;
pub mod post;
pub mod profile;
pub mod request;
pub mod url;

pub use config::{CaptureConfig, DEFAULT_TIMEOUT, ScraperConfig};
pub use post::ThreadOptions;
pub use profile::ProfileOptions;
pub use request::{MAX_TIMEOUT_MS, ScrapeMode, ScrapeRequest};
pub use self::url::{is_valid_post_url, is_valid_profile_url, normalize_threads_url};

use crate::browser::SessionLauncher;
use crate::error::{Result, ScrapeError};
use crate::model::{Metadata, Post, ScrapeData, ScrapeResult};
use chrono::{SecondsFormat, Utc};
use serde_json::json;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

/// Entry point for both scrape modes
pub struct Scraper<L> {
    launcher: L,
    config: ScraperConfig,
}

impl<L: SessionLauncher> Scraper<L> {
    pub fn new(launcher: L) -> Self {
        Self { launcher, config: ScraperConfig::default() }
    }

    pub fn with_config(mut self, config: ScraperConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Validate an external request and run the pipeline it selects
    pub fn execute(&self, request: &ScrapeRequest) -> ScrapeResult {
        if let Err(e) = request.validate() {
            log::debug!("Rejected scrape request for {}: {}", request.url, e);
            return ScrapeResult::Failure(e.into_info());
        }

        match request.mode {
            ScrapeMode::Post => self.scrape_thread(&request.url, &request.thread_options()),
            ScrapeMode::Profile => self.scrape_profile(&request.url, &request.profile_options()),
        }
    }

    /// Run a pipeline body, turning every error and panic into a failure envelope
    fn run<F>(&self, mode: &str, url: &str, body: F) -> ScrapeResult
    where
        F: FnOnce(Instant) -> Result<ScrapeData>,
    {
        let start = Instant::now();

        let outcome = match panic::catch_unwind(AssertUnwindSafe(|| body(start))) {
            Ok(outcome) => outcome,
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                Err(ScrapeError::internal(message.clone(), Some(json!({ "panic": message }))))
            }
        };

        match outcome {
            Ok(data) => {
                log::info!(
                    "{} scrape of {} finished: {} replies in {}ms",
                    mode,
                    url,
                    data.replies.len(),
                    data.metadata.processing_time
                );
                ScrapeResult::Success(data)
            }
            Err(e) => {
                log::warn!("{} scrape of {} failed with {}: {}", mode, url, e.kind(), e);
                ScrapeResult::Failure(e.into_info())
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "An unknown error occurred".to_string()
    }
}

/// Build the success payload; `reply_count` always reflects the returned replies
pub(crate) fn assemble(thread: Post, replies: Vec<Post>, url: String, start: Instant) -> ScrapeData {
    ScrapeData {
        metadata: Metadata {
            scraped_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            url,
            reply_count: replies.len(),
            processing_time: start.elapsed().as_millis() as u64,
        },
        thread,
        replies,
    }
}
