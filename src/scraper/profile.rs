use crate::browser::{BrowserDriver, CapturedResponse, SessionGuard, SessionLauncher};
use crate::error::{Result, ScrapeError};
use crate::extract::{HiddenDataExtractor, find_post_like_objects, id_string, truthy_field};
use crate::model::{Post, ScrapeData, ScrapeResult};
use crate::normalize::normalize_post;
use crate::scraper::url::{is_valid_profile_url, normalize_threads_url};
use crate::scraper::{Scraper, assemble};
use indexmap::IndexMap;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Raw fields tried, in order, when deduplicating captured posts
const DEDUP_KEYS: [&str; 3] = ["id", "pk", "code"];

/// Options for profile mode
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileOptions {
    /// Keep at most this many posts after sorting by recency
    pub post_count: Option<usize>,

    /// Overrides [`ScraperConfig::timeout`](crate::scraper::ScraperConfig::timeout) for navigation
    pub timeout: Option<Duration>,
}

impl ProfileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post_count(mut self, count: usize) -> Self {
        self.post_count = Some(count);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl<L: SessionLauncher> Scraper<L> {
    /// Scrape the recent posts of a profile.
    ///
    /// API responses are captured while the feed is scrolled; the final HTML's hidden data is
    /// added on top. The most recent post becomes `thread` and every post, `thread` included,
    /// is listed in `replies`.
    pub fn scrape_profile(&self, url: &str, options: &ProfileOptions) -> ScrapeResult {
        self.run("profile", url, |start| self.profile_pipeline(url, options, start))
    }

    fn profile_pipeline(&self, url: &str, options: &ProfileOptions, start: Instant) -> Result<ScrapeData> {
        if !is_valid_profile_url(url) {
            return Err(ScrapeError::InvalidUrl("Invalid Threads profile URL format".to_string()));
        }

        let normalized_url = normalize_threads_url(url)?;
        let timeout = options.timeout.unwrap_or(self.config.timeout);
        let extractor = HiddenDataExtractor::new(&self.config.hidden_data)?;
        let capture = &self.config.capture;
        let captured: Arc<Mutex<Vec<Value>>> = Arc::new(Mutex::new(Vec::new()));

        let html = {
            let session = SessionGuard::new(self.launcher.launch()?);
            session.install_passthrough_routing()?;

            let filter_config = capture.clone();
            let sink = Arc::clone(&captured);
            session.on_response(
                Box::new(move |url: &str, status: u16| filter_config.accepts(url, status)),
                Box::new(move |response: CapturedResponse| match serde_json::from_str::<Value>(&response.body) {
                    Ok(payload) => match sink.lock() {
                        Ok(mut payloads) => payloads.push(payload),
                        Err(_) => log::warn!("Dropping response from {}: capture buffer poisoned", response.url),
                    },
                    Err(e) => log::debug!("Ignoring non-JSON response from {}: {}", response.url, e),
                }),
            )?;

            session.navigate(&normalized_url, timeout)?;
            session.wait(capture.initial_settle);

            for round in 0..capture.scroll_iterations {
                log::debug!("Scrolling {} ({}/{})", normalized_url, round + 1, capture.scroll_iterations);
                session.scroll_to_bottom()?;
                session.wait(capture.scroll_settle);
            }

            session.html()?
        };

        let mut payloads = {
            let mut guard = captured
                .lock()
                .map_err(|_| ScrapeError::internal("Captured response buffer was poisoned", None))?;
            std::mem::take(&mut *guard)
        };
        log::debug!("Captured {} API payloads from {}", payloads.len(), normalized_url);
        payloads.extend(extractor.extract(&html));

        let posts = collect_posts(&payloads, options.post_count);
        let thread = posts.first().cloned().unwrap_or_default();

        Ok(assemble(thread, posts, normalized_url, start))
    }
}

/// Detect, deduplicate, normalize and order the posts found across `payloads`.
///
/// Dedup is keyed on the first raw identifier present and the first occurrence wins. Items
/// that fail normalization are dropped. The sort is stable, so posts sharing a timestamp keep
/// their capture order.
pub(crate) fn collect_posts(payloads: &[Value], post_count: Option<usize>) -> Vec<Post> {
    let mut unique: IndexMap<String, &Value> = IndexMap::new();

    for candidate in payloads.iter().flat_map(find_post_like_objects) {
        let key = dedup_key(candidate);
        unique.entry(key).or_insert(candidate);
    }

    let mut posts: Vec<Post> = unique
        .into_values()
        .filter_map(|raw| match normalize_post(raw) {
            Ok(post) => Some(post),
            Err(e) => {
                log::debug!("Dropping captured item that failed to normalize: {}", e);
                None
            }
        })
        .collect();

    posts.sort_by(|a, b| b.published_at.cmp(&a.published_at));

    if let Some(count) = post_count.filter(|c| *c > 0) {
        posts.truncate(count);
    }

    posts
}

fn dedup_key(candidate: &Value) -> String {
    DEDUP_KEYS
        .iter()
        .find_map(|key| truthy_field(candidate, key).and_then(id_string))
        .unwrap_or_else(|| candidate.to_string())
}
