//! Error types for the video resolver

use std::fmt;
use std::time::Duration;

#[derive(Debug)]
pub enum ResolverError {
    Http(Box<reqwest::Error>),
    /// Upstream answered with a non-success status
    Status(u16),
    Timeout(Duration),
    /// The extractor process could not run or exited unsuccessfully
    Extractor(String),
    Json(serde_json::Error),
}

impl fmt::Display for ResolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolverError::Http(err) => write!(f, "HTTP error: {}", err),
            ResolverError::Status(status) => write!(f, "Upstream returned status {}", status),
            ResolverError::Timeout(after) => write!(f, "Timed out after {:?}", after),
            ResolverError::Extractor(msg) => write!(f, "Extractor error: {}", msg),
            ResolverError::Json(err) => write!(f, "JSON parse error: {}", err),
        }
    }
}

impl std::error::Error for ResolverError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ResolverError::Http(err) => Some(err.as_ref()),
            ResolverError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ResolverError {
    fn from(err: reqwest::Error) -> Self {
        ResolverError::Http(Box::new(err))
    }
}

impl From<serde_json::Error> for ResolverError {
    fn from(err: serde_json::Error) -> Self {
        ResolverError::Json(err)
    }
}

pub type Result<T> = std::result::Result<T, ResolverError>;
