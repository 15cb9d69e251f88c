//! Error types for fillbass
//!
//! The taxonomy follows the failure classes of a fetch run:
//! - transport failures ([`Error::Network`]) and non-2xx responses ([`Error::Http`])
//! - malformed listings or identifiers ([`Error::Parse`])
//! - local directory/file failures ([`Error::Filesystem`])
//!
//! Game and day units turn these into logged outcomes at their boundary; nothing
//! below that boundary swallows an error.

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for fillbass operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for fillbass
#[derive(Debug, Error)]
pub enum Error {
    /// Connection or transport failure (DNS, refused, reset, timeout)
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that was being fetched
        url: String,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// Server answered with a non-2xx status
    #[error("HTTP {status} fetching {url}")]
    Http {
        /// Response status code
        status: u16,
        /// The URL that was being fetched
        url: String,
    },

    /// Listing document or identifier could not be parsed
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Local directory or file operation failed
    #[error("filesystem error at {}: {source}", path.display())]
    Filesystem {
        /// Path the operation was applied to
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// URL is not a syntactically valid absolute http(s) URL
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The offending URL text
        url: String,
        /// Why it was rejected
        reason: String,
    },

    /// Date range with start after end
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Requested first day
        start: NaiveDate,
        /// Requested last day
        end: NaiveDate,
    },

    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "base_url")
        key: Option<String>,
    },

    /// Manifest or config (de)serialization failed
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The run was cancelled while this operation was in flight
    #[error("operation cancelled")]
    Cancelled,

    /// Shutdown in progress - not accepting new work
    #[error("shutdown in progress: not accepting new days")]
    ShuttingDown,
}

impl Error {
    /// Build a [`Error::Filesystem`] from a path and an I/O error
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Short machine-readable category, used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Network { .. } => "network",
            Error::Http { .. } => "http",
            Error::Parse(_) => "parse",
            Error::Filesystem { .. } => "filesystem",
            Error::InvalidUrl { .. } => "invalid_url",
            Error::InvalidDateRange { .. } => "invalid_date_range",
            Error::Config { .. } => "config",
            Error::Serialization(_) => "serialization",
            Error::Cancelled => "cancelled",
            Error::ShuttingDown => "shutting_down",
        }
    }
}

/// Listing and identifier parse errors
#[derive(Debug, Error)]
pub enum ParseError {
    /// CSS selector failed to compile
    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector {
        /// Selector text
        selector: String,
        /// Compiler message
        reason: String,
    },

    /// Anchor element without an href attribute
    #[error("anchor '{text}' has no href")]
    MissingHref {
        /// Link text of the anchor
        text: String,
    },

    /// Entity file name does not end in a numeric identifier
    #[error("no numeric entity id in '{href}'")]
    InvalidEntityId {
        /// The href that was inspected
        href: String,
    },

    /// Date text did not match the expected format
    #[error("invalid date '{input}', expected {expected}")]
    InvalidDate {
        /// The rejected input
        input: String,
        /// Human-readable format description
        expected: &'static str,
    },
}
