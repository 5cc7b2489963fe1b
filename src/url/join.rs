use crate::{UrlError, UrlResult};
use url::Url;

/// Parses an absolute locator and checks it is fetchable over HTTP(S)
///
/// # Examples
///
/// ```
/// use state_watch::url::parse_locator;
///
/// assert!(parse_locator("http://example.org/states/").is_ok());
/// assert!(parse_locator("ftp://example.org/states/").is_err());
/// ```
pub fn parse_locator(locator: &str) -> UrlResult<Url> {
    let url = Url::parse(locator).map_err(|e| UrlError::Parse(format!("{}: {}", locator, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            url.scheme()
        )));
    }

    Ok(url)
}

/// Trims a locator back to (and including) its last `/`
///
/// Locators already ending in `/` are returned unchanged.
pub fn trim_to_directory(locator: &str) -> &str {
    if locator.ends_with('/') {
        return locator;
    }

    match locator.rfind('/') {
        Some(idx) => &locator[..=idx],
        None => locator,
    }
}

/// Percent-escapes an href, leaving `/` separators intact
///
/// Each path segment is escaped on its own, so only ASCII alphanumerics and
/// `-._~` survive unescaped inside a segment.
pub fn escape_href(href: &str) -> String {
    href.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Resolves a relative href against the page it was found on
///
/// # Joining Rule
///
/// 1. If the parent does not end in `/`, trim it back to its last `/`
/// 2. Percent-escape the href
/// 3. Resolve with standard relative-URL semantics
///
/// # Examples
///
/// ```
/// use state_watch::url::resolve_link;
///
/// let url = resolve_link("http://example.org/states/index.html", "tx-sl.csv").unwrap();
/// assert_eq!(url, "http://example.org/states/tx-sl.csv");
/// ```
pub fn resolve_link(parent: &str, href: &str) -> UrlResult<String> {
    let base = parse_locator(trim_to_directory(parent))?;
    let escaped = escape_href(href);

    base.join(&escaped)
        .map(|url| url.to_string())
        .map_err(|e| UrlError::Join {
            base: base.to_string(),
            href: href.to_string(),
            reason: e.to_string(),
        })
}
