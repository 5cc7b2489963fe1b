use crate::crawler::Page;
use crate::scanners::{ContentScanner, ScanContext, ScanOutcome};
use crate::url::{parse_locator, resolve_link};
use crate::WatchError;
use async_trait::async_trait;
use regex::Regex;
use std::sync::LazyLock;

/// Name of the managed-area CSV on the states index
pub const MANAGED_AREA_CSV: &str = "managedareas.csv";

static MANAGED_AREA_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"href\s*=\s*"managedareas\.csv""#).expect("managed-area pattern is valid")
});

/// Reports the managed-area CSV linked from the states index
///
/// Only fires on the root page (depth 1) and only when that page is the
/// configured states index. Reporting is all it does.
#[derive(Debug, Clone)]
pub struct ManagedAreaScanner {
    root: String,
}

impl ManagedAreaScanner {
    /// Creates a scanner watching the index at `root`
    pub fn new(root: &str) -> Result<Self, WatchError> {
        Ok(Self {
            root: parse_locator(root)?.to_string(),
        })
    }
}

#[async_trait]
impl ContentScanner for ManagedAreaScanner {
    fn name(&self) -> &'static str {
        "managed-area"
    }

    async fn scan_page(
        &self,
        page: &Page,
        depth: u32,
        _ctx: &ScanContext,
    ) -> Result<ScanOutcome, WatchError> {
        if depth != 1 || page.locator != self.root {
            return Ok(ScanOutcome::Ignored);
        }

        if !MANAGED_AREA_HREF.is_match(&page.content) {
            return Ok(ScanOutcome::Ignored);
        }

        let csv = resolve_link(&page.locator, MANAGED_AREA_CSV)?;
        tracing::info!("Found managed area CSV at {}!", csv);

        Ok(ScanOutcome::Matched)
    }
}
