//! Crawler module for change-gated site traversal
//!
//! This module contains the core crawling logic, including:
//! - Page fetching behind the `PageFetcher` trait
//! - Link extraction from raw page text
//! - The depth-first frontier with a visited set
//! - The crawl engine that drives the scanners
//! - The coordinator that gates and records runs

mod coordinator;
mod engine;
mod fetcher;
mod frontier;
mod parser;

pub use coordinator::{Coordinator, RunOutcome, RunTarget};
pub use engine::{BranchErrorPolicy, CrawlEngine, CrawlReport, FailedBranch};
pub use fetcher::{build_http_client, FetchError, HttpFetcher, Page, PageFetcher};
pub use frontier::{Frontier, QueuedUrl};
pub use parser::{extract_links, parse_href, Link};
