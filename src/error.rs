use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Result alias used by the scraping pipeline
pub type Result<T, E = ScrapeError> = std::result::Result<T, E>;

/// Errors raised by a browser driver
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Failed to launch browser: {0}")]
    LaunchFailed(String),

    #[error("Failed to connect to browser: {0}")]
    ConnectionFailed(String),

    #[error("Tab operation failed: {0}")]
    TabOperationFailed(String),

    #[error("Navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Timed out: {0}")]
    Timeout(String),

    #[error("JavaScript evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Failed to read page content: {0}")]
    ContentUnavailable(String),

    #[error("Failed to set up network interception: {0}")]
    InterceptionFailed(String),
}

impl BrowserError {
    /// Whether this failure means a time budget was exceeded
    pub fn is_timeout(&self) -> bool {
        matches!(self, BrowserError::Timeout(_))
    }
}

/// Fixed set of failure kinds reported to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidUrl,
    InvalidRequest,
    DataNotFound,
    ParseError,
    Timeout,
    BrowserError,
    RateLimited,
    InternalError,
}

impl ErrorKind {
    /// Wire name of the kind, e.g. `DATA_NOT_FOUND`
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidUrl => "INVALID_URL",
            ErrorKind::InvalidRequest => "INVALID_REQUEST",
            ErrorKind::DataNotFound => "DATA_NOT_FOUND",
            ErrorKind::ParseError => "PARSE_ERROR",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::BrowserError => "BROWSER_ERROR",
            ErrorKind::RateLimited => "RATE_LIMITED",
            ErrorKind::InternalError => "INTERNAL_ERROR",
        }
    }

    /// HTTP status an HTTP-fronted deployment should answer with
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorKind::InvalidUrl | ErrorKind::InvalidRequest => 400,
            ErrorKind::DataNotFound => 404,
            ErrorKind::Timeout => 504,
            ErrorKind::RateLimited => 429,
            ErrorKind::ParseError | ErrorKind::BrowserError | ErrorKind::InternalError => 500,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain errors of a scrape run. Each variant maps to exactly one [`ErrorKind`].
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("{0}")]
    InvalidUrl(String),

    #[error("{message}")]
    InvalidRequest { message: String, details: Option<Value> },

    #[error("{0}")]
    DataNotFound(String),

    #[error("{message}")]
    Parse { message: String, details: Option<Value> },

    #[error("{0}")]
    Timeout(String),

    #[error("{message}")]
    Browser { message: String, details: Option<Value> },

    #[error("{0}")]
    RateLimited(String),

    #[error("{message}")]
    Internal { message: String, details: Option<Value> },
}

impl ScrapeError {
    pub fn parse(message: impl Into<String>, details: Value) -> Self {
        ScrapeError::Parse { message: message.into(), details: Some(details) }
    }

    pub fn internal(message: impl Into<String>, details: Option<Value>) -> Self {
        ScrapeError::Internal { message: message.into(), details }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ScrapeError::InvalidUrl(_) => ErrorKind::InvalidUrl,
            ScrapeError::InvalidRequest { .. } => ErrorKind::InvalidRequest,
            ScrapeError::DataNotFound(_) => ErrorKind::DataNotFound,
            ScrapeError::Parse { .. } => ErrorKind::ParseError,
            ScrapeError::Timeout(_) => ErrorKind::Timeout,
            ScrapeError::Browser { .. } => ErrorKind::BrowserError,
            ScrapeError::RateLimited(_) => ErrorKind::RateLimited,
            ScrapeError::Internal { .. } => ErrorKind::InternalError,
        }
    }

    pub fn details(&self) -> Option<&Value> {
        match self {
            ScrapeError::InvalidRequest { details, .. }
            | ScrapeError::Parse { details, .. }
            | ScrapeError::Browser { details, .. }
            | ScrapeError::Internal { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    /// Consume the error into the caller-facing error payload
    pub fn into_info(self) -> ErrorInfo {
        let code = self.kind();
        let message = self.to_string();
        let details = match self {
            ScrapeError::InvalidRequest { details, .. }
            | ScrapeError::Parse { details, .. }
            | ScrapeError::Browser { details, .. }
            | ScrapeError::Internal { details, .. } => details,
            _ => None,
        };
        ErrorInfo { code, message, details }
    }
}

impl From<BrowserError> for ScrapeError {
    fn from(err: BrowserError) -> Self {
        if err.is_timeout() {
            ScrapeError::Timeout(err.to_string())
        } else {
            ScrapeError::Browser { message: err.to_string(), details: None }
        }
    }
}

/// Error payload of a failed scrape, as returned to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub code: ErrorKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorInfo {
    pub fn new(code: ErrorKind, message: impl Into<String>) -> Self {
        Self { code, message: message.into(), details: None }
    }

    /// Drop diagnostic details before handing the error to untrusted callers
    pub fn redacted(mut self) -> Self {
        self.details = None;
        self
    }
}
