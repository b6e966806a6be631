use crate::error::{Result, ScrapeError};
use crate::scraper::{ProfileOptions, ThreadOptions};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;

/// Upper bound a caller may request for the navigation budget
pub const MAX_TIMEOUT_MS: u64 = 60_000;

/// Which pipeline a request runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ScrapeMode {
    /// A single post and its replies, read from the page's hidden data
    #[default]
    Post,
    /// A profile feed, captured from API traffic while scrolling
    Profile,
}

/// Scrape request as accepted from external callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRequest {
    /// Threads post or profile URL
    pub url: String,

    #[serde(default)]
    pub mode: ScrapeMode,

    /// Post mode: return replies (default: true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include_replies: Option<bool>,

    /// Post mode: keep at most this many replies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_replies: Option<u64>,

    /// Profile mode: keep at most this many posts, most recent first
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_count: Option<u64>,

    /// Navigation budget in milliseconds, at most 60000
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl ScrapeRequest {
    pub fn post(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mode: ScrapeMode::Post,
            include_replies: None,
            max_replies: None,
            post_count: None,
            timeout: None,
        }
    }

    pub fn profile(url: impl Into<String>) -> Self {
        Self { mode: ScrapeMode::Profile, ..Self::post(url) }
    }

    pub fn include_replies(mut self, include: bool) -> Self {
        self.include_replies = Some(include);
        self
    }

    pub fn max_replies(mut self, max: u64) -> Self {
        self.max_replies = Some(max);
        self
    }

    pub fn post_count(mut self, count: u64) -> Self {
        self.post_count = Some(count);
        self
    }

    pub fn timeout_ms(mut self, timeout: u64) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Parse a JSON request body, reporting shape errors as `INVALID_REQUEST`
    pub fn from_json(body: Value) -> Result<Self> {
        serde_json::from_value(body).map_err(|e| ScrapeError::InvalidRequest {
            message: "Invalid request parameters".to_string(),
            details: Some(json!([{ "field": null, "message": e.to_string() }])),
        })
    }

    pub fn validate(&self) -> Result<()> {
        let mut issues = Vec::new();

        if url::Url::parse(&self.url).is_err() {
            issues.push(json!({ "field": "url", "message": "Invalid URL format" }));
        }
        if self.max_replies == Some(0) {
            issues.push(json!({ "field": "maxReplies", "message": "Must be a positive number" }));
        }
        if self.post_count == Some(0) {
            issues.push(json!({ "field": "postCount", "message": "Must be a positive integer" }));
        }
        match self.timeout {
            Some(0) => issues.push(json!({ "field": "timeout", "message": "Must be a positive number" })),
            Some(t) if t > MAX_TIMEOUT_MS => {
                issues.push(json!({ "field": "timeout", "message": "Timeout cannot exceed 60 seconds" }))
            }
            _ => {}
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ScrapeError::InvalidRequest {
                message: "Invalid request parameters".to_string(),
                details: Some(Value::Array(issues)),
            })
        }
    }

    pub fn thread_options(&self) -> ThreadOptions {
        ThreadOptions {
            include_replies: self.include_replies.unwrap_or(true),
            max_replies: self.max_replies.map(|m| m as usize),
            timeout: self.timeout.map(Duration::from_millis),
        }
    }

    pub fn profile_options(&self) -> ProfileOptions {
        ProfileOptions {
            post_count: self.post_count.map(|c| c as usize),
            timeout: self.timeout.map(Duration::from_millis),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_from_json_defaults_to_post_mode() {
        let request = ScrapeRequest::from_json(json!({"url": "https://www.threads.net/t/abc"})).unwrap();
        assert_eq!(request.mode, ScrapeMode::Post);
        assert!(request.validate().is_ok());

        let options = request.thread_options();
        assert!(options.include_replies);
        assert_eq!(options.max_replies, None);
        assert_eq!(options.timeout, None);
    }

    #[test]
    fn test_from_json_camel_case_fields() {
        let request = ScrapeRequest::from_json(json!({
            "url": "https://www.threads.net/@user",
            "mode": "profile",
            "postCount": 3,
            "timeout": 15000
        }))
        .unwrap();

        assert_eq!(request.mode, ScrapeMode::Profile);
        let options = request.profile_options();
        assert_eq!(options.post_count, Some(3));
        assert_eq!(options.timeout, Some(Duration::from_secs(15)));
    }

    #[test]
    fn test_from_json_rejects_bad_shape() {
        let err =
            ScrapeRequest::from_json(json!({"url": "https://www.threads.net/t/abc", "mode": "feed"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);

        let err = ScrapeRequest::from_json(json!({"mode": "post"})).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
    }

    #[test]
    fn test_validate_timeout_ceiling() {
        assert!(ScrapeRequest::post("https://www.threads.net/t/abc").timeout_ms(60_000).validate().is_ok());

        let err = ScrapeRequest::post("https://www.threads.net/t/abc").timeout_ms(60_001).validate().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRequest);
        assert_eq!(err.details().unwrap()[0]["field"], json!("timeout"));
    }

    #[test]
    fn test_validate_collects_every_issue() {
        let request = ScrapeRequest::post("not a url").max_replies(0).post_count(0).timeout_ms(0);
        let err = request.validate().unwrap_err();

        assert_eq!(err.to_string(), "Invalid request parameters");
        assert_eq!(err.details().and_then(Value::as_array).map(Vec::len), Some(4));
    }
}
