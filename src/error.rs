//! Error types for bol-filter.
//!
//! Classification never fails: a listing that cannot be resolved or a label
//! without a seller is simply skipped. Errors only exist at the edges where
//! the engine talks to persistence or parses a page URL.

/// Error type for persistence and page setup.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The storage backend rejected a read or write.
    #[error("Storage failure: {0}")]
    Storage(String),

    /// Reading or writing a storage file failed.
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    /// A stored value could not be (de)serialized.
    #[error("Invalid stored JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The page URL could not be parsed.
    #[error("Invalid page URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Result type alias for fallible bol-filter operations.
pub type Result<T> = std::result::Result<T, Error>;
