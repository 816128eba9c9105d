//! Error types for arena-lru

use std::fmt;

/// Result type alias for cache construction and recency list operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the cache and its recency list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// An argument was outside its accepted range (a zero capacity, for instance)
    InvalidArgument(String),

    /// The recency list had no entries to remove
    EmptyCollection,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            Error::EmptyCollection => write!(f, "Collection is empty"),
        }
    }
}

impl std::error::Error for Error {}
