//! State-Watch: a change-gated crawler for hierarchical HTML data sites
//!
//! This crate watches a tree of HTML index pages for a new "Generated: ... UTC"
//! stamp on the root page. When the stamp moves past the last recorded run, it
//! walks the site's relative links depth-first and hands every page and link to
//! a fixed set of scanners, which locate data files and dispatch processing.

pub mod config;
pub mod crawler;
pub mod gate;
pub mod processor;
pub mod scanners;
pub mod storage;
pub mod timestamp;
pub mod url;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for State-Watch operations
///
/// Every variant is fatal to the current run.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not parse timestamp out of '{text}'")]
    MalformedTimestamp { text: String },

    #[error("Could not find a 'Generated: ... UTC' marker in the root page")]
    MissingTimestampMarker,

    #[error("Could not parse href value out of anchor: {anchor}")]
    MalformedAnchor { anchor: String },

    #[error("Fetch failed: {0}")]
    Fetch(#[from] crawler::FetchError),

    #[error("Output directory '{}' does not exist", path.display())]
    OutputDirectoryMissing { path: PathBuf },

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("URL error: {0}")]
    Url(#[from] UrlError),

    #[error("Run exceeded its deadline of {secs}s")]
    DeadlineExceeded { secs: u64 },

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Cannot join '{href}' onto '{base}': {reason}")]
    Join {
        base: String,
        href: String,
        reason: String,
    },
}

/// Result type alias for State-Watch operations
pub type Result<T> = std::result::Result<T, WatchError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, CrawlReport, RunOutcome, RunTarget};
pub use gate::should_run;
pub use timestamp::{extract_generated_instant, parse_instant};
