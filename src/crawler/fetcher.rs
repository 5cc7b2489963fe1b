//! Page fetcher implementation
//!
//! This module turns locators into page content, including:
//! - Building the HTTP client with the configured user agent and timeouts
//! - GET requests returning the decoded body
//! - Error classification (status, timeout, network, unsupported scheme)

use crate::config::FetcherConfig;
use crate::url::parse_locator;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

/// A fetched page: where it came from and its raw text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// Locator the page was fetched from
    pub locator: String,

    /// Raw page text
    pub content: String,
}

impl Page {
    pub fn new(locator: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            content: content.into(),
        }
    }
}

/// Errors raised while fetching a page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error code {status} returned when accessing {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Unable to reach {url}: {message}")]
    Network { url: String, message: String },

    #[error("Unknown URL type {url}")]
    UnsupportedScheme { url: String },

    #[error("Unable to parse URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Anything that can resolve a locator to page content
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches the page at `locator`
    async fn fetch(&self, locator: &str) -> Result<Page, FetchError>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The fetcher configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use state_watch::config::FetcherConfig;
/// use state_watch::crawler::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Page fetcher backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher from the fetcher configuration
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, locator: &str) -> Result<Page, FetchError> {
        let url = parse_locator(locator).map_err(|e| match e {
            crate::UrlError::InvalidScheme(_) => FetchError::UnsupportedScheme {
                url: locator.to_string(),
            },
            other => FetchError::InvalidUrl {
                url: locator.to_string(),
                reason: other.to_string(),
            },
        })?;

        tracing::debug!("Opening URL {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify_error(locator, e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(
                "HTTP error code {} returned when accessing {}",
                status.as_u16(),
                locator
            );
            return Err(FetchError::Status {
                url: locator.to_string(),
                status: status.as_u16(),
            });
        }

        let content = response
            .text()
            .await
            .map_err(|e| classify_error(locator, e))?;

        tracing::debug!("Read {} bytes from {}", content.len(), locator);
        Ok(Page::new(locator, content))
    }
}

/// Maps a transport error onto the fetch error taxonomy
fn classify_error(locator: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: locator.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Network {
            url: locator.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        FetchError::Network {
            url: locator.to_string(),
            message: error.to_string(),
        }
    }
}
