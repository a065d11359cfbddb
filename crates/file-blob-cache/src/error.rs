//! Error types for the blob cache

use crate::types::BlobId;
use std::fmt;

#[derive(Debug)]
pub enum BlobCacheError {
    /// The blob is not present in the store
    NotFound(BlobId),
    Io(Box<std::io::Error>),
}

impl fmt::Display for BlobCacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlobCacheError::NotFound(id) => write!(f, "Blob not found: {}", id),
            BlobCacheError::Io(err) => write!(f, "IO error: {}", err),
        }
    }
}

impl std::error::Error for BlobCacheError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            BlobCacheError::Io(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BlobCacheError {
    fn from(err: std::io::Error) -> Self {
        BlobCacheError::Io(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, BlobCacheError>;
