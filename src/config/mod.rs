//! Configuration module for State-Watch
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so running without a file is the common case.
//!
//! # Example
//!
//! ```no_run
//! use state_watch::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("state-watch.toml")).unwrap();
//! println!("Timestamps live in: {}", config.archive.directory.display());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    ArchiveConfig, Config, CrawlConfig, FetcherConfig, ProcessorConfig, ScannerConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
pub use validation::validate;
