//! Link extraction from raw page text
//!
//! Anchors are located by pattern rather than by building a DOM: the watched
//! site serves generated index pages, and an anchor whose href cannot be read
//! is a hard error rather than something to skip.

use crate::url::is_absolute_http;
use crate::WatchError;
use regex::Regex;
use std::sync::LazyLock;

static ANCHOR_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<a\s+href.*?</a>").expect("anchor pattern is valid"));

static HREF_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href\s*=\s*"(.+?)""#).expect("href pattern is valid"));

/// A relative link found on a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    /// The href exactly as written in the page
    pub href: String,

    /// Locator of the page the link was found on
    pub parent: String,
}

/// Extracts the relative links of a page, in document order
///
/// Absolute `http://` and `https://` links are dropped.
///
/// # Arguments
///
/// * `content` - Raw page text
/// * `parent` - Locator of the page, recorded on every link
///
/// # Errors
///
/// Returns `WatchError::MalformedAnchor` for an anchor without a quoted href.
///
/// # Example
///
/// ```
/// use state_watch::crawler::extract_links;
///
/// let html = r#"<a href="tx-sl.csv">TX</a> <a href="https://other.org/">x</a>"#;
/// let links = extract_links(html, "http://example.org/states/").unwrap();
/// assert_eq!(links.len(), 1);
/// assert_eq!(links[0].href, "tx-sl.csv");
/// ```
pub fn extract_links(content: &str, parent: &str) -> Result<Vec<Link>, WatchError> {
    let mut links = Vec::new();

    for span in ANCHOR_SPAN.find_iter(content) {
        let anchor = span.as_str();
        let href = parse_href(anchor)?;

        if is_absolute_http(href) {
            tracing::trace!("Skipping absolute link {}", href);
            continue;
        }

        tracing::debug!("Found link {} in {}", href, parent);
        links.push(Link {
            href: href.to_string(),
            parent: parent.to_string(),
        });
    }

    Ok(links)
}

/// Reads the quoted href value out of an anchor span
pub fn parse_href(anchor: &str) -> Result<&str, WatchError> {
    HREF_VALUE
        .captures(anchor)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .ok_or_else(|| {
            tracing::error!("Could not parse href value out of {}", anchor);
            WatchError::MalformedAnchor {
                anchor: anchor.to_string(),
            }
        })
}
