//! Crawl engine - depth-first traversal of the watched site
//!
//! For every page, in order:
//! 1. Run each content scanner on the page
//! 2. Extract the page's relative links
//! 3. Run each link scanner on each link
//! 4. Queue each resolved link for a visit, unless it is a CSV leaf or has
//!    already been visited this run

use crate::crawler::fetcher::{Page, PageFetcher};
use crate::crawler::frontier::Frontier;
use crate::crawler::parser::{extract_links, Link};
use crate::scanners::{ScanContext, ScanOutcome, ScannerRegistry};
use crate::url::{is_csv_leaf, resolve_link};
use crate::WatchError;
use serde::Deserialize;
use std::sync::Arc;

/// What to do when a page below the root cannot be fetched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BranchErrorPolicy {
    /// Abort the whole run on the first failure
    #[default]
    Abort,

    /// Log the failure, skip that branch and keep crawling
    Skip,
}

/// A branch that was skipped under `BranchErrorPolicy::Skip`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedBranch {
    pub url: String,
    pub depth: u32,
    pub error: String,
}

/// Summary of one traversal
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlReport {
    /// Pages scanned, root included
    pub pages_visited: usize,

    /// Links handed to the link scanners
    pub links_scanned: usize,

    /// CSV locators not descended into
    pub csv_leaves: usize,

    /// Locators not fetched again because they were already visited
    pub revisits_skipped: usize,

    /// Scanner invocations that recognized something
    pub matches: usize,

    /// File processor runs that succeeded
    pub processed: usize,

    /// File processor runs that failed
    pub processor_failures: usize,

    /// Branches dropped after a fetch or parse failure
    pub failed_branches: Vec<FailedBranch>,
}

impl CrawlReport {
    fn tally(&mut self, outcome: ScanOutcome) {
        match outcome {
            ScanOutcome::Ignored => {}
            ScanOutcome::Matched => self.matches += 1,
            ScanOutcome::Processed => {
                self.matches += 1;
                self.processed += 1;
            }
            ScanOutcome::ProcessorFailed => {
                self.matches += 1;
                self.processor_failures += 1;
            }
        }
    }
}

/// Walks the link graph below a root page, invoking the scanners at each node
pub struct CrawlEngine {
    fetcher: Arc<dyn PageFetcher>,
    registry: Arc<ScannerRegistry>,
    policy: BranchErrorPolicy,
}

impl CrawlEngine {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        registry: Arc<ScannerRegistry>,
        policy: BranchErrorPolicy,
    ) -> Self {
        Self {
            fetcher,
            registry,
            policy,
        }
    }

    /// Crawls from an already fetched page
    ///
    /// # Arguments
    ///
    /// * `page` - The starting page, already fetched
    /// * `depth` - Depth of `page` (the root is 1)
    /// * `ctx` - Output root and run instant handed to every scanner
    /// * `recurse` - When false only `page` itself is scanned
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlReport)` - Traversal finished
    /// * `Err(WatchError)` - A fatal error; side effects so far are kept
    pub async fn crawl(
        &self,
        page: Page,
        depth: u32,
        ctx: &ScanContext,
        recurse: bool,
    ) -> Result<CrawlReport, WatchError> {
        let mut report = CrawlReport::default();
        let mut frontier = Frontier::new();
        frontier.mark_visited(&page.locator);

        let children = self.process_page(&page, depth, ctx, &mut report).await?;
        if !recurse {
            return Ok(report);
        }
        report.revisits_skipped += frontier.push_children(children, depth + 1);

        while let Some(queued) = frontier.next_url(&mut report.revisits_skipped) {
            tracing::info!("Recursing into {}", queued.url);

            let result = match self.fetcher.fetch(&queued.url).await {
                Ok(child) => self.process_page(&child, queued.depth, ctx, &mut report).await,
                Err(e) => Err(e.into()),
            };

            match result {
                Ok(children) => {
                    report.revisits_skipped +=
                        frontier.push_children(children, queued.depth + 1);
                }
                Err(e) => self.handle_branch_error(&queued.url, queued.depth, e, &mut report)?,
            }
        }

        tracing::debug!(
            "Traversal done: {} pages, {} distinct locators",
            report.pages_visited,
            frontier.visited_count()
        );
        Ok(report)
    }

    /// Scans one page and returns the child locators worth visiting
    async fn process_page(
        &self,
        page: &Page,
        depth: u32,
        ctx: &ScanContext,
        report: &mut CrawlReport,
    ) -> Result<Vec<String>, WatchError> {
        report.pages_visited += 1;

        for scanner in self.registry.content_scanners() {
            let outcome = scanner.scan_page(page, depth, ctx).await?;
            tracing::trace!("{} on {}: {:?}", scanner.name(), page.locator, outcome);
            report.tally(outcome);
        }

        let links = extract_links(&page.content, &page.locator)?;

        for link in &links {
            report.links_scanned += 1;
            for scanner in self.registry.link_scanners() {
                let outcome = scanner.scan_link(link, depth, ctx).await?;
                tracing::trace!("{} on {}: {:?}", scanner.name(), link.href, outcome);
                report.tally(outcome);
            }
        }

        self.child_locators(page, &links, report)
    }

    fn child_locators(
        &self,
        page: &Page,
        links: &[Link],
        report: &mut CrawlReport,
    ) -> Result<Vec<String>, WatchError> {
        let mut children = Vec::with_capacity(links.len());

        for link in links {
            let url = resolve_link(&page.locator, &link.href)?;
            if is_csv_leaf(&url) {
                tracing::debug!("Not recursing into link {} (CSV file)", url);
                report.csv_leaves += 1;
                continue;
            }
            children.push(url);
        }

        Ok(children)
    }

    fn handle_branch_error(
        &self,
        url: &str,
        depth: u32,
        error: WatchError,
        report: &mut CrawlReport,
    ) -> Result<(), WatchError> {
        match self.policy {
            BranchErrorPolicy::Abort => {
                tracing::error!("Aborting run: {} failed: {}", url, error);
                Err(error)
            }
            BranchErrorPolicy::Skip => {
                tracing::warn!("Skipping branch {}: {}", url, error);
                report.failed_branches.push(FailedBranch {
                    url: url.to_string(),
                    depth,
                    error: error.to_string(),
                });
                Ok(())
            }
        }
    }
}
