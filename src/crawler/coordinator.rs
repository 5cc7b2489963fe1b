//! Run coordinator - gate, crawl, record
//!
//! This module contains the driver for one unattended run:
//! - Reading the high-water mark from the timestamp store
//! - Fetching the root page and reading its generated instant
//! - Asking the update gate whether anything is new
//! - Crawling under the configured deadline
//! - Recording the instant only after the whole traversal succeeded

use crate::config::Config;
use crate::crawler::engine::{CrawlEngine, CrawlReport};
use crate::crawler::fetcher::{FetchError, HttpFetcher, PageFetcher};
use crate::gate::should_run;
use crate::processor::CommandProcessor;
use crate::scanners::{ScanContext, ScannerRegistry};
use crate::storage::{open_archive, TimestampStore};
use crate::timestamp::{extract_generated_instant, format_for_display};
use crate::url::parse_locator;
use crate::{UrlError, WatchError};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::sync::Arc;

/// Where a run starts and where its output goes
#[derive(Debug, Clone)]
pub struct RunTarget {
    /// Root index page of the watched site
    pub root_url: String,

    /// Existing directory state output is written under
    pub output_root: PathBuf,

    /// Follow links below the root page
    pub recurse: bool,
}

/// How a run ended, short of a fatal error
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// The root page carries nothing newer than the last recorded run
    Skipped {
        previous: Option<DateTime<Utc>>,
        current: DateTime<Utc>,
    },

    /// The gate was evaluated but nothing was crawled or recorded
    DryRun {
        previous: Option<DateTime<Utc>>,
        current: DateTime<Utc>,
        would_run: bool,
    },

    /// The site was crawled and the instant recorded
    Completed {
        instant: DateTime<Utc>,
        report: CrawlReport,
    },
}

/// Main run coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    target: RunTarget,
    fetcher: Arc<dyn PageFetcher>,
    registry: Arc<ScannerRegistry>,
    store: Box<dyn TimestampStore + Send>,
}

impl Coordinator {
    /// Creates a coordinator wired to HTTP, the timestamp archive and the
    /// external processor named in `config`
    ///
    /// # Arguments
    ///
    /// * `config` - The watcher configuration
    /// * `target` - Root locator, output root and recursion flag
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(WatchError)` - Output root missing, or a collaborator failed to
    ///   initialize
    pub fn new(config: Config, target: RunTarget) -> Result<Self, WatchError> {
        let fetcher = Arc::new(HttpFetcher::new(&config.fetcher)?);
        let processor = Arc::new(CommandProcessor::from_config(&config.processor));
        let registry = ScannerRegistry::builtin(&config.scanners, processor)?;
        let store = open_archive(&config.archive.directory)?;

        Self::with_parts(config, target, fetcher, registry, Box::new(store))
    }

    /// Creates a coordinator from explicit collaborators
    pub fn with_parts(
        config: Config,
        target: RunTarget,
        fetcher: Arc<dyn PageFetcher>,
        registry: ScannerRegistry,
        store: Box<dyn TimestampStore + Send>,
    ) -> Result<Self, WatchError> {
        if !target.output_root.is_dir() {
            tracing::error!(
                "Specified state output directory \"{}\" does not exist",
                target.output_root.display()
            );
            return Err(WatchError::OutputDirectoryMissing {
                path: target.output_root.clone(),
            });
        }

        Ok(Self {
            config: Arc::new(config),
            target,
            fetcher,
            registry: Arc::new(registry),
            store,
        })
    }

    /// Runs the watcher once
    ///
    /// This is the core driver logic that:
    /// 1. Reads the previous high-water mark
    /// 2. Fetches the root page exactly once
    /// 3. Extracts its generated instant and consults the gate
    /// 4. Crawls from the root (depth 1) under the run deadline
    /// 5. Records the instant after the crawl succeeded
    pub async fn run(&mut self) -> Result<RunOutcome, WatchError> {
        let (previous, current, root_page) = self.observe().await?;

        if !should_run(previous, current) {
            return Ok(RunOutcome::Skipped { previous, current });
        }

        tracing::info!(
            "Starting crawl of {} for data generated {}",
            root_page.locator,
            format_for_display(&current)
        );
        let start_time = std::time::Instant::now();

        let ctx = ScanContext {
            output_root: self.target.output_root.clone(),
            run_instant: current,
        };
        let engine = CrawlEngine::new(
            self.fetcher.clone(),
            self.registry.clone(),
            self.config.crawl.on_branch_error,
        );
        let crawl = engine.crawl(root_page, 1, &ctx, self.target.recurse);

        let report = match self.config.crawl.run_deadline() {
            Some(deadline) => tokio::time::timeout(deadline, crawl).await.map_err(|_| {
                tracing::error!("Run exceeded its deadline of {:?}", deadline);
                WatchError::DeadlineExceeded {
                    secs: deadline.as_secs(),
                }
            })??,
            None => crawl.await?,
        };

        self.store.record(&current)?;

        tracing::info!(
            "Crawl completed: {} pages visited in {:?}",
            report.pages_visited,
            start_time.elapsed()
        );

        Ok(RunOutcome::Completed {
            instant: current,
            report,
        })
    }

    /// Evaluates the gate without crawling or recording anything
    pub async fn dry_run(&self) -> Result<RunOutcome, WatchError> {
        let (previous, current, _) = self.observe().await?;
        let would_run = should_run(previous, current);

        Ok(RunOutcome::DryRun {
            previous,
            current,
            would_run,
        })
    }

    /// Reads the high-water mark, fetches the root and extracts its instant
    async fn observe(
        &self,
    ) -> Result<(Option<DateTime<Utc>>, DateTime<Utc>, crate::crawler::Page), WatchError> {
        let root = self.root_locator()?;

        let previous = self.store.latest()?;
        match previous {
            Some(ref instant) => {
                tracing::info!("Last recorded run: {}", format_for_display(instant))
            }
            None => tracing::info!("No recorded runs"),
        }

        let root_page = self.fetcher.fetch(&root).await?;
        let current = extract_generated_instant(&root_page.content)?;
        tracing::info!("Root page generated {}", format_for_display(&current));

        Ok((previous, current, root_page))
    }

    fn root_locator(&self) -> Result<String, WatchError> {
        match parse_locator(&self.target.root_url) {
            Ok(url) => Ok(url.to_string()),
            Err(UrlError::InvalidScheme(_)) => Err(FetchError::UnsupportedScheme {
                url: self.target.root_url.clone(),
            }
            .into()),
            Err(e) => Err(e.into()),
        }
    }
}
