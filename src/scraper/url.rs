use crate::error::{Result, ScrapeError};
use crate::model::CANONICAL_HOST;
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

const ACCEPTED_HOSTS: &[&str] = &["www.threads.net", "threads.net", "www.threads.com", "threads.com"];

// `/t/CODE` or `/@user/post/CODE`, optional trailing slash
static SHORT_POST_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/t/[A-Za-z0-9_.-]+/?$").expect("valid short post path regex"));
static LONG_POST_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/@[A-Za-z0-9_.-]+/post/[A-Za-z0-9_.-]+/?$").expect("valid long post path regex"));
static PROFILE_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^/@[A-Za-z0-9_.-]+/?$").expect("valid profile path regex"));

fn parse_threads_url(url: &str) -> Option<Url> {
    let parsed = Url::parse(url.trim()).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    let host = parsed.host_str()?;
    ACCEPTED_HOSTS.contains(&host).then_some(parsed)
}

/// Whether `url` points at a single Threads post
pub fn is_valid_post_url(url: &str) -> bool {
    parse_threads_url(url).is_some_and(|u| SHORT_POST_PATH.is_match(u.path()) || LONG_POST_PATH.is_match(u.path()))
}

/// Whether `url` points at a Threads profile
pub fn is_valid_profile_url(url: &str) -> bool {
    parse_threads_url(url).is_some_and(|u| PROFILE_PATH.is_match(u.path()))
}

/// Force the canonical host and drop a trailing slash
pub fn normalize_threads_url(url: &str) -> Result<String> {
    let mut parsed = Url::parse(url.trim()).map_err(|e| ScrapeError::InvalidUrl(format!("Invalid URL: {}", e)))?;

    parsed
        .set_host(Some(CANONICAL_HOST))
        .map_err(|e| ScrapeError::InvalidUrl(format!("Invalid URL host: {}", e)))?;

    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);

    Ok(parsed.to_string())
}
