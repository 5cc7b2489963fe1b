//! URL handling module for State-Watch
//!
//! This module reproduces the watched site's link-joining convention and the
//! small predicates the crawler uses to classify hrefs and locators.

mod join;

pub use join::{escape_href, parse_locator, resolve_link, trim_to_directory};

/// Suffix of locators that are never descended into
pub const CSV_SUFFIX: &str = ".csv";

/// Returns true if the href names an absolute `http://` or `https://` target
///
/// Only relative hrefs are treated as part of the watched site.
pub fn is_absolute_http(href: &str) -> bool {
    href.starts_with("http://") || href.starts_with("https://")
}

/// Returns true if the locator is a CSV leaf
pub fn is_csv_leaf(locator: &str) -> bool {
    locator.ends_with(CSV_SUFFIX)
}
