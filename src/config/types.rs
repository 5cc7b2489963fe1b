use crate::crawler::BranchErrorPolicy;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration structure for State-Watch
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetcher: FetcherConfig,
    pub crawl: CrawlConfig,
    pub archive: ArchiveConfig,
    pub processor: ProcessorConfig,
    pub scanners: ScannerConfig,
}

/// HTTP fetch configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Connection timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0".to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
        }
    }
}

/// Traversal configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Upper bound on a whole crawl (seconds); 0 disables it
    #[serde(rename = "run-deadline-secs")]
    pub run_deadline_secs: u64,

    /// What to do when a page below the root cannot be fetched
    #[serde(rename = "on-branch-error")]
    pub on_branch_error: BranchErrorPolicy,
}

impl CrawlConfig {
    /// The run deadline, if one is set
    pub fn run_deadline(&self) -> Option<Duration> {
        (self.run_deadline_secs > 0).then(|| Duration::from_secs(self.run_deadline_secs))
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            run_deadline_secs: 3600,
            on_branch_error: BranchErrorPolicy::Abort,
        }
    }
}

/// Timestamp archive configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Directory of `.timestamp` markers, relative to the working directory
    pub directory: PathBuf,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("timestamp_archive"),
        }
    }
}

/// External file processor configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// Program to launch
    pub program: String,

    /// Arguments placed before the locator and output directory
    pub args: Vec<String>,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            program: "segmentcsv2kml".to_string(),
            args: Vec::new(),
        }
    }
}

/// Built-in scanner configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// States index on which the managed-area CSV is reported
    #[serde(rename = "managed-area-root")]
    pub managed_area_root: String,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            managed_area_root: "http://db.slickbox.net/states/".to_string(),
        }
    }
}
