//! Frontier for the depth-first crawl
//!
//! This module handles:
//! - A LIFO work stack of `(locator, depth)` pairs
//! - A visited set keyed by resolved locator, so repeated or cyclic links are
//!   fetched at most once per run

use std::collections::HashSet;

/// A locator waiting to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueuedUrl {
    /// Absolute locator to fetch
    pub url: String,

    /// Depth the page will be crawled at (root is 1)
    pub depth: u32,
}

/// Work stack plus visited set
///
/// Children are pushed in reverse so they pop in document order, which keeps
/// the traversal pre-order depth-first.
#[derive(Debug, Default)]
pub struct Frontier {
    stack: Vec<QueuedUrl>,
    visited: HashSet<String>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks a locator as visited; returns false if it already was
    pub fn mark_visited(&mut self, url: &str) -> bool {
        self.visited.insert(url.to_string())
    }

    /// Returns true if the locator has been visited
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Queues the children of one page
    ///
    /// Already-visited locators are dropped. Returns how many were dropped.
    pub fn push_children(&mut self, children: Vec<String>, depth: u32) -> usize {
        let mut dropped = 0;

        for url in children.into_iter().rev() {
            if self.is_visited(&url) {
                tracing::debug!("Already visited {}, not queueing again", url);
                dropped += 1;
                continue;
            }
            self.stack.push(QueuedUrl { url, depth });
        }

        dropped
    }

    /// Pops the next unvisited locator and marks it visited
    ///
    /// Entries visited since they were queued are skipped and counted in
    /// `skipped`.
    pub fn next_url(&mut self, skipped: &mut usize) -> Option<QueuedUrl> {
        while let Some(queued) = self.stack.pop() {
            if self.mark_visited(&queued.url) {
                return Some(queued);
            }
            tracing::debug!("Already visited {}, skipping", queued.url);
            *skipped += 1;
        }
        None
    }

    /// Number of locators waiting
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Returns true if nothing is waiting
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Number of distinct locators visited so far
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }
}
