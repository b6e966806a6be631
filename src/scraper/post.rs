use crate::browser::{BrowserDriver, SessionGuard, SessionLauncher};
use crate::error::{Result, ScrapeError};
use crate::extract::{HiddenDataExtractor, find_nested_key};
use crate::model::{Post, ScrapeData, ScrapeResult};
use crate::normalize::normalize_post;
use crate::scraper::url::{is_valid_post_url, normalize_threads_url};
use crate::scraper::{Scraper, assemble};
use serde_json::Value;
use std::time::{Duration, Instant};

/// Options for post mode
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadOptions {
    /// Return replies alongside the post (default: true)
    pub include_replies: bool,

    /// Keep at most this many replies, in page order. Ignored when replies are excluded.
    pub max_replies: Option<usize>,

    /// Overrides [`ScraperConfig::timeout`](crate::scraper::ScraperConfig::timeout)
    pub timeout: Option<Duration>,
}

impl Default for ThreadOptions {
    fn default() -> Self {
        Self { include_replies: true, max_replies: None, timeout: None }
    }
}

impl ThreadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include_replies(mut self, include: bool) -> Self {
        self.include_replies = include;
        self
    }

    pub fn max_replies(mut self, max: usize) -> Self {
        self.max_replies = Some(max);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Apply the reply filters: exclusion first, then truncation
    fn select_replies(&self, mut replies: Vec<Post>) -> Vec<Post> {
        if !self.include_replies {
            return Vec::new();
        }
        if let Some(max) = self.max_replies.filter(|m| *m > 0) {
            replies.truncate(max);
        }
        replies
    }
}

impl<L: SessionLauncher> Scraper<L> {
    /// Scrape a single post and its replies.
    ///
    /// The first thread item on the page becomes the post; the rest are its replies.
    pub fn scrape_thread(&self, url: &str, options: &ThreadOptions) -> ScrapeResult {
        self.run("post", url, |start| self.thread_pipeline(url, options, start))
    }

    fn thread_pipeline(&self, url: &str, options: &ThreadOptions, start: Instant) -> Result<ScrapeData> {
        if !is_valid_post_url(url) {
            return Err(ScrapeError::InvalidUrl("Invalid Threads URL format".to_string()));
        }

        let normalized_url = normalize_threads_url(url)?;
        let timeout = options.timeout.unwrap_or(self.config.timeout);
        let extractor = HiddenDataExtractor::new(&self.config.hidden_data)?;

        let html = {
            let session = SessionGuard::new(self.launcher.launch()?);
            session.navigate(&normalized_url, timeout)?;
            session.wait_for_visible(&self.config.content_selector, timeout)?;
            session.html()?
        };

        let datasets = extractor.extract(&html);
        if datasets.is_empty() {
            return Err(ScrapeError::DataNotFound(
                "No hidden data found in page. The URL might be invalid or the page structure has changed."
                    .to_string(),
            ));
        }

        let items = collect_thread_items(&datasets, &self.config.hidden_data.items_key);
        if items.is_empty() {
            return Err(ScrapeError::DataNotFound(
                "No thread data found. The post might be private or deleted.".to_string(),
            ));
        }

        let mut posts = items.into_iter().map(normalize_post).collect::<Result<Vec<_>>>()?;
        let thread = posts.remove(0);
        let replies = options.select_replies(posts);

        Ok(assemble(thread, replies, normalized_url, start))
    }
}

/// Concatenate the first `items_key` array of every dataset; datasets without one are skipped
fn collect_thread_items<'a>(datasets: &'a [Value], items_key: &str) -> Vec<&'a Value> {
    let mut items = Vec::new();

    for (index, dataset) in datasets.iter().enumerate() {
        match find_nested_key(dataset, items_key).first().and_then(|found| found.as_array()) {
            Some(found) => items.extend(found),
            None => log::debug!("Hidden dataset {} has no {} array, trying next", index, items_key),
        }
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn post(id: &str) -> Post {
        Post { id: id.to_string(), ..Default::default() }
    }

    #[test]
    fn test_exclusion_wins_over_max_replies() {
        let options = ThreadOptions::new().include_replies(false).max_replies(5);
        assert!(options.select_replies(vec![post("b"), post("c")]).is_empty());
    }

    #[test]
    fn test_max_replies_keeps_order() {
        let options = ThreadOptions::new().max_replies(2);
        let replies = options.select_replies(vec![post("b"), post("c"), post("d")]);
        let ids: Vec<&str> = replies.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "c"]);
    }

    #[test]
    fn test_zero_max_replies_is_no_limit() {
        let options = ThreadOptions { max_replies: Some(0), ..Default::default() };
        assert_eq!(options.select_replies(vec![post("b"), post("c")]).len(), 2);
    }

    #[test]
    fn test_collect_thread_items_across_datasets() {
        let datasets = vec![
            json!({"require": [{"thread_items": [{"post": {"id": "a"}}, {"post": {"id": "b"}}]}]}),
            json!({"require": ["no items here"]}),
            json!({"deep": {"deeper": {"thread_items": [{"post": {"id": "c"}}]}}}),
        ];

        let items = collect_thread_items(&datasets, "thread_items");
        let ids: Vec<&str> = items.iter().filter_map(|i| i["post"]["id"].as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_collect_uses_first_array_only() {
        let datasets = vec![json!({
            "a": {"thread_items": [{"post": {"id": "first"}}]},
            "b": {"thread_items": [{"post": {"id": "second"}}]}
        })];

        let items = collect_thread_items(&datasets, "thread_items");
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["post"]["id"], json!("first"));
    }
}
