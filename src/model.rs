use crate::error::ErrorInfo;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// Host every canonical permalink is built on
pub const CANONICAL_HOST: &str = "www.threads.net";

/// Canonical post record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub code: String,
    pub text: Option<String>,
    pub author: Author,
    pub stats: Stats,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media: Option<Media>,
    /// Unix seconds, 0 when unknown
    pub published_at: i64,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub username: String,
    pub user_id: String,
    pub verified: bool,
    pub profile_picture: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub likes: u64,
    pub replies: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub videos: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_audio: Option<bool>,
}

impl Media {
    pub fn is_empty(&self) -> bool {
        self.images.is_none() && self.videos.is_none() && self.has_audio.is_none()
    }
}

/// Build the permalink of a post from its author and short code
pub fn permalink(username: &str, code: &str) -> String {
    format!("https://{}/@{}/post/{}", CANONICAL_HOST, username, code)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// ISO-8601 UTC timestamp of when the scrape finished
    pub scraped_at: String,
    pub url: String,
    pub reply_count: usize,
    /// Wall-clock milliseconds spent in the run
    pub processing_time: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeData {
    pub thread: Post,
    pub replies: Vec<Post>,
    pub metadata: Metadata,
}

/// Outcome of a scrape: exactly one of data or error
#[derive(Debug, Clone, PartialEq)]
pub enum ScrapeResult {
    Success(ScrapeData),
    Failure(ErrorInfo),
}

impl ScrapeResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ScrapeResult::Success(_))
    }

    pub fn data(&self) -> Option<&ScrapeData> {
        match self {
            ScrapeResult::Success(data) => Some(data),
            ScrapeResult::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            ScrapeResult::Success(_) => None,
            ScrapeResult::Failure(error) => Some(error),
        }
    }

    /// Strip error details, leaving successful results untouched
    pub fn redacted(self) -> Self {
        match self {
            ScrapeResult::Failure(error) => ScrapeResult::Failure(error.redacted()),
            success => success,
        }
    }

    pub fn into_result(self) -> std::result::Result<ScrapeData, ErrorInfo> {
        match self {
            ScrapeResult::Success(data) => Ok(data),
            ScrapeResult::Failure(error) => Err(error),
        }
    }
}

// Envelope shape: {"success": true, "data": ...} | {"success": false, "error": ...}
impl Serialize for ScrapeResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ScrapeResult", 2)?;
        match self {
            ScrapeResult::Success(data) => {
                state.serialize_field("success", &true)?;
                state.serialize_field("data", data)?;
            }
            ScrapeResult::Failure(error) => {
                state.serialize_field("success", &false)?;
                state.serialize_field("error", error)?;
            }
        }
        state.end()
    }
}
