use crate::crawler::Link;
use crate::processor::FileProcessor;
use crate::scanners::{LinkScanner, ScanContext, ScanOutcome};
use crate::timestamp::format_dir_token;
use crate::url::resolve_link;
use crate::WatchError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Filename suffix of per-state speed-limit CSVs
pub const SPEED_LIMIT_SUFFIX: &str = "-sl.csv";

/// Dispatches every `<state>-sl.csv` link to the file processor
///
/// Output lands in `<output_root>/<state>/<run token>/speed_limits`. A failing
/// processor is reported in the outcome and never aborts the crawl.
pub struct SpeedLimitScanner {
    processor: Arc<dyn FileProcessor>,
}

impl SpeedLimitScanner {
    pub fn new(processor: Arc<dyn FileProcessor>) -> Self {
        Self { processor }
    }
}

#[async_trait]
impl LinkScanner for SpeedLimitScanner {
    fn name(&self) -> &'static str {
        "speed-limit"
    }

    async fn scan_link(
        &self,
        link: &Link,
        _parent_depth: u32,
        ctx: &ScanContext,
    ) -> Result<ScanOutcome, WatchError> {
        if !link.href.ends_with(SPEED_LIMIT_SUFFIX) {
            return Ok(ScanOutcome::Ignored);
        }

        let locator = resolve_link(&link.parent, &link.href)?;
        tracing::info!("Found state speed limit CSV at {}", locator);

        let state = derive_state_id(&locator);
        if !is_safe_state_id(&state) {
            tracing::warn!(
                "Not processing {}: state id '{}' is not a plain directory name",
                locator,
                state
            );
            return Ok(ScanOutcome::Ignored);
        }

        let output_dir = speed_limit_dir(&ctx.output_root, &state, &ctx.run_instant);
        ensure_dir(&output_dir)?;

        match self.processor.process(&locator, &output_dir).await {
            Ok(()) => Ok(ScanOutcome::Processed),
            Err(e) => {
                tracing::warn!("Processing {} failed: {}", locator, e);
                Ok(ScanOutcome::ProcessorFailed)
            }
        }
    }
}

/// Derives the state identifier from a speed-limit CSV locator
///
/// Takes the last `/`-delimited token, strips the suffix and undoes
/// percent-escaping.
///
/// # Example
///
/// ```
/// use state_watch::scanners::derive_state_id;
///
/// assert_eq!(derive_state_id("http://example.org/states/tx-sl.csv"), "tx");
/// ```
pub fn derive_state_id(locator: &str) -> String {
    let file_name = locator.rsplit('/').next().unwrap_or(locator);
    let state = file_name
        .strip_suffix(SPEED_LIMIT_SUFFIX)
        .unwrap_or(file_name);

    urlencoding::decode(state)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| state.to_string())
}

/// Returns true if `state` names a single directory below the output root
fn is_safe_state_id(state: &str) -> bool {
    !state.is_empty()
        && state != "."
        && state != ".."
        && !state.contains(['/', '\\'])
}

/// Output directory for one state's speed limits in one run
pub fn speed_limit_dir(output_root: &Path, state: &str, run_instant: &DateTime<Utc>) -> PathBuf {
    output_root
        .join(state)
        .join(format_dir_token(run_instant))
        .join("speed_limits")
}

fn ensure_dir(dir: &Path) -> Result<(), WatchError> {
    if dir.is_dir() {
        tracing::warn!("Output directory {} already existed", dir.display());
        return Ok(());
    }

    tracing::info!("Creating output directory: {}", dir.display());
    std::fs::create_dir_all(dir)?;
    Ok(())
}
