//! Scanners react to crawled pages and links
//!
//! Two kinds exist:
//! - `ContentScanner`: sees each whole page once
//! - `LinkScanner`: sees each relative link of each page
//!
//! The set is closed and registered explicitly at startup through
//! `ScannerRegistry::builtin`. Scanners hold only their own configuration;
//! everything about the current crawl arrives as arguments.

mod managed_area;
mod speed_limit;

pub use managed_area::{ManagedAreaScanner, MANAGED_AREA_CSV};
pub use speed_limit::{derive_state_id, speed_limit_dir, SpeedLimitScanner, SPEED_LIMIT_SUFFIX};

use crate::config::ScannerConfig;
use crate::crawler::{Link, Page};
use crate::processor::FileProcessor;
use crate::WatchError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;

/// Per-run values every scanner receives
#[derive(Debug, Clone)]
pub struct ScanContext {
    /// Root directory all state output goes under
    pub output_root: PathBuf,

    /// Generated instant of the root page for this run
    pub run_instant: DateTime<Utc>,
}

/// What a scanner did with a page or link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Not of interest to this scanner
    Ignored,

    /// Recognized and reported, nothing dispatched
    Matched,

    /// Recognized and the file processor succeeded
    Processed,

    /// Recognized but the file processor failed
    ProcessorFailed,
}

/// Reacts to a whole page
#[async_trait]
pub trait ContentScanner: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Scans one page found at `depth` (root is 1)
    async fn scan_page(
        &self,
        page: &Page,
        depth: u32,
        ctx: &ScanContext,
    ) -> Result<ScanOutcome, WatchError>;
}

/// Reacts to a single relative link
#[async_trait]
pub trait LinkScanner: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Scans one link found on a page at `parent_depth`
    async fn scan_link(
        &self,
        link: &Link,
        parent_depth: u32,
        ctx: &ScanContext,
    ) -> Result<ScanOutcome, WatchError>;
}

/// Ordered collections of content and link scanners
#[derive(Default)]
pub struct ScannerRegistry {
    content: Vec<Box<dyn ContentScanner>>,
    link: Vec<Box<dyn LinkScanner>>,
}

impl ScannerRegistry {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the registry of every scanner this crate ships
    ///
    /// # Arguments
    ///
    /// * `config` - Scanner configuration
    /// * `processor` - File processor the speed-limit scanner dispatches to
    pub fn builtin(
        config: &ScannerConfig,
        processor: Arc<dyn FileProcessor>,
    ) -> Result<Self, WatchError> {
        let registry = Self::new()
            .with_content(ManagedAreaScanner::new(&config.managed_area_root)?)
            .with_link(SpeedLimitScanner::new(processor));

        for scanner in &registry.content {
            tracing::debug!("Registered content scanner: {}", scanner.name());
        }
        for scanner in &registry.link {
            tracing::debug!("Registered link scanner: {}", scanner.name());
        }

        Ok(registry)
    }

    /// Appends a content scanner
    pub fn with_content(mut self, scanner: impl ContentScanner + 'static) -> Self {
        self.content.push(Box::new(scanner));
        self
    }

    /// Appends a link scanner
    pub fn with_link(mut self, scanner: impl LinkScanner + 'static) -> Self {
        self.link.push(Box::new(scanner));
        self
    }

    /// Content scanners, in registration order
    pub fn content_scanners(&self) -> &[Box<dyn ContentScanner>] {
        &self.content
    }

    /// Link scanners, in registration order
    pub fn link_scanners(&self) -> &[Box<dyn LinkScanner>] {
        &self.link
    }
}

impl std::fmt::Debug for ScannerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScannerRegistry")
            .field("content", &self.content.iter().map(|s| s.name()).collect::<Vec<_>>())
            .field("link", &self.link.iter().map(|s| s.name()).collect::<Vec<_>>())
            .finish()
    }
}
