//! Integration tests for the watcher
//!
//! These tests use wiremock to serve a small state index site and run the
//! full gate, crawl and record cycle end-to-end against it.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use state_watch::config::{Config, FetcherConfig, ScannerConfig};
use state_watch::crawler::{
    BranchErrorPolicy, Coordinator, FetchError, HttpFetcher, RunOutcome, RunTarget,
};
use state_watch::processor::{FileProcessor, ProcessorError};
use state_watch::scanners::ScannerRegistry;
use state_watch::storage::{TimestampArchive, TimestampStore};
use state_watch::WatchError;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATED: &str = "Generated: 2016-07-20 20:34:36.844030 UTC";

/// Records every dispatched CSV instead of running a program
#[derive(Default)]
struct RecordingProcessor {
    calls: Mutex<Vec<(String, PathBuf)>>,
}

impl RecordingProcessor {
    fn calls(&self) -> Vec<(String, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileProcessor for RecordingProcessor {
    async fn process(&self, locator: &str, output_dir: &Path) -> Result<(), ProcessorError> {
        self.calls
            .lock()
            .unwrap()
            .push((locator.to_string(), output_dir.to_path_buf()));
        Ok(())
    }
}

/// Temp directories for one test: state output and the archive
struct Workspace {
    _tmp: TempDir,
    output: PathBuf,
    archive: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let tmp = TempDir::new().expect("Failed to create temp dir");
        let output = tmp.path().join("out");
        std::fs::create_dir(&output).expect("Failed to create output dir");
        let archive = tmp.path().join("timestamp_archive");
        Self {
            _tmp: tmp,
            output,
            archive,
        }
    }

    fn recorded(&self) -> Vec<chrono::DateTime<Utc>> {
        TimestampArchive::open(&self.archive)
            .expect("Failed to open archive")
            .recorded()
            .expect("Failed to list archive")
    }
}

fn coordinator(
    server: &MockServer,
    ws: &Workspace,
    processor: Arc<RecordingProcessor>,
    policy: BranchErrorPolicy,
    recurse: bool,
) -> Coordinator {
    let mut config = Config::default();
    config.crawl.on_branch_error = policy;
    coordinator_with_config(server, ws, processor, config, recurse)
}

fn coordinator_with_config(
    server: &MockServer,
    ws: &Workspace,
    processor: Arc<RecordingProcessor>,
    mut config: Config,
    recurse: bool,
) -> Coordinator {
    config.archive.directory = ws.archive.clone();

    let scanners = ScannerConfig {
        managed_area_root: format!("{}/states/", server.uri()),
    };
    let registry = ScannerRegistry::builtin(&scanners, processor).expect("Failed to build registry");
    let fetcher = HttpFetcher::new(&config.fetcher).expect("Failed to build fetcher");
    let store = TimestampArchive::open(&ws.archive).expect("Failed to open archive");

    let target = RunTarget {
        root_url: format!("{}/states/", server.uri()),
        output_root: ws.output.clone(),
        recurse,
    };

    Coordinator::with_parts(config, target, Arc::new(fetcher), registry, Box::new(store))
        .expect("Failed to create coordinator")
}

async fn mount_page(server: &MockServer, route: &str, body: String, hits: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(hits)
        .mount(server)
        .await;
}

fn expected_instant() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2016, 7, 20, 20, 34, 36).unwrap()
        + chrono::Duration::microseconds(844_030)
}

#[tokio::test]
async fn test_first_run_processes_speed_limits() {
    let server = MockServer::start().await;
    let ws = Workspace::new();
    let processor = Arc::new(RecordingProcessor::default());

    mount_page(
        &server,
        "/states/",
        format!(
            r#"<html><body><p>{GENERATED}</p>
            <a href="managedareas.csv">Managed areas</a>
            <a href="tx-sl.csv">Texas</a>
            </body></html>"#
        ),
        1,
    )
    .await;
    // CSV leaves are handed to scanners but never fetched
    mount_page(&server, "/states/tx-sl.csv", String::new(), 0).await;
    mount_page(&server, "/states/managedareas.csv", String::new(), 0).await;

    let mut coordinator = coordinator(
        &server,
        &ws,
        processor.clone(),
        BranchErrorPolicy::Abort,
        true,
    );
    let outcome = coordinator.run().await.expect("Run failed");

    let RunOutcome::Completed { instant, report } = outcome else {
        panic!("expected a completed run");
    };
    assert_eq!(instant, expected_instant());
    assert_eq!(report.pages_visited, 1);
    assert_eq!(report.csv_leaves, 2);
    assert_eq!(report.processed, 1);
    // managed-area page match plus the speed-limit link
    assert_eq!(report.matches, 2);

    let expected_dir = ws.output.join("tx").join("20160720_203436").join("speed_limits");
    assert!(expected_dir.is_dir());
    assert_eq!(
        processor.calls(),
        vec![(format!("{}/states/tx-sl.csv", server.uri()), expected_dir)]
    );

    assert_eq!(ws.recorded(), vec![expected_instant()]);
}

#[tokio::test]
async fn test_rerun_without_new_data_is_skipped() {
    let server = MockServer::start().await;
    let ws = Workspace::new();
    let processor = Arc::new(RecordingProcessor::default());

    mount_page(
        &server,
        "/states/",
        format!(r#"{GENERATED} <a href="tx-sl.csv">Texas</a>"#),
        2,
    )
    .await;

    let mut first = coordinator(&server, &ws, processor.clone(), BranchErrorPolicy::Abort, true);
    first.run().await.expect("First run failed");

    let mut second = coordinator(&server, &ws, processor.clone(), BranchErrorPolicy::Abort, true);
    let outcome = second.run().await.expect("Second run failed");

    assert!(matches!(
        outcome,
        RunOutcome::Skipped {
            previous: Some(_),
            ..
        }
    ));
    assert_eq!(processor.calls().len(), 1);
    assert_eq!(ws.recorded().len(), 1);
}

#[tokio::test]
async fn test_recursion_survives_link_cycle() {
    let server = MockServer::start().await;
    let ws = Workspace::new();
    let processor = Arc::new(RecordingProcessor::default());

    mount_page(
        &server,
        "/states/",
        format!(r#"{GENERATED} <a href="tx/">Texas</a> <a href="ca/">California</a>"#),
        1,
    )
    .await;
    mount_page(
        &server,
        "/states/tx/",
        r#"<a href="tx-sl.csv">speed limits</a> <a href="../">up</a>"#.to_string(),
        1,
    )
    .await;
    mount_page(
        &server,
        "/states/ca/",
        r#"<a href="ca-sl.csv">speed limits</a> <a href="../tx/">sibling</a>"#.to_string(),
        1,
    )
    .await;

    let mut coordinator = coordinator(
        &server,
        &ws,
        processor.clone(),
        BranchErrorPolicy::Abort,
        true,
    );
    let outcome = coordinator.run().await.expect("Run failed");

    let RunOutcome::Completed { report, .. } = outcome else {
        panic!("expected a completed run");
    };
    assert_eq!(report.pages_visited, 3);
    assert_eq!(report.revisits_skipped, 2);

    let located: Vec<String> = processor.calls().into_iter().map(|(url, _)| url).collect();
    assert_eq!(
        located,
        vec![
            format!("{}/states/tx/tx-sl.csv", server.uri()),
            format!("{}/states/ca/ca-sl.csv", server.uri()),
        ]
    );
    assert!(ws.output.join("tx").is_dir());
    assert!(ws.output.join("ca").is_dir());
}

#[tokio::test]
async fn test_no_recurse_scans_root_only() {
    let server = MockServer::start().await;
    let ws = Workspace::new();
    let processor = Arc::new(RecordingProcessor::default());

    mount_page(
        &server,
        "/states/",
        format!(r#"{GENERATED} <a href="tx/">Texas</a> <a href="all-sl.csv">All</a>"#),
        1,
    )
    .await;
    mount_page(&server, "/states/tx/", String::new(), 0).await;

    let mut coordinator = coordinator(
        &server,
        &ws,
        processor.clone(),
        BranchErrorPolicy::Abort,
        false,
    );
    let outcome = coordinator.run().await.expect("Run failed");

    assert!(matches!(outcome, RunOutcome::Completed { .. }));
    assert_eq!(processor.calls().len(), 1);
    assert_eq!(ws.recorded().len(), 1);
}

#[tokio::test]
async fn test_failed_branch_aborts_and_records_nothing() {
    let server = MockServer::start().await;
    let ws = Workspace::new();
    let processor = Arc::new(RecordingProcessor::default());

    mount_page(
        &server,
        "/states/",
        format!(r#"{GENERATED} <a href="tx-sl.csv">Texas</a> <a href="gone/">Gone</a>"#),
        1,
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/states/gone/"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let mut coordinator = coordinator(
        &server,
        &ws,
        processor.clone(),
        BranchErrorPolicy::Abort,
        true,
    );
    let result = coordinator.run().await;

    assert!(matches!(
        result,
        Err(WatchError::Fetch(FetchError::Status { status: 404, .. }))
    ));
    // Side effects before the failure are kept
    assert_eq!(processor.calls().len(), 1);
    assert!(ws.recorded().is_empty());
}

#[tokio::test]
async fn test_failed_branch_skipped_when_configured() {
    let server = MockServer::start().await;
    let ws = Workspace::new();
    let processor = Arc::new(RecordingProcessor::default());

    mount_page(
        &server,
        "/states/",
        format!(r#"{GENERATED} <a href="gone/">Gone</a> <a href="tx/">Texas</a>"#),
        1,
    )
    .await;
    mount_page(
        &server,
        "/states/tx/",
        r#"<a href="tx-sl.csv">speed limits</a>"#.to_string(),
        1,
    )
    .await;

    let mut coordinator = coordinator(
        &server,
        &ws,
        processor.clone(),
        BranchErrorPolicy::Skip,
        true,
    );
    let outcome = coordinator.run().await.expect("Run failed");

    let RunOutcome::Completed { report, .. } = outcome else {
        panic!("expected a completed run");
    };
    assert_eq!(report.failed_branches.len(), 1);
    assert_eq!(
        report.failed_branches[0].url,
        format!("{}/states/gone/", server.uri())
    );
    assert_eq!(report.processed, 1);
    assert_eq!(ws.recorded(), vec![expected_instant()]);
}

#[tokio::test]
async fn test_missing_marker_fails_before_crawling() {
    let server = MockServer::start().await;
    let ws = Workspace::new();
    let processor = Arc::new(RecordingProcessor::default());

    mount_page(
        &server,
        "/states/",
        r#"<html><a href="tx/">Texas</a></html>"#.to_string(),
        1,
    )
    .await;
    mount_page(&server, "/states/tx/", String::new(), 0).await;

    let mut coordinator = coordinator(
        &server,
        &ws,
        processor.clone(),
        BranchErrorPolicy::Abort,
        true,
    );
    let result = coordinator.run().await;

    assert!(matches!(result, Err(WatchError::MissingTimestampMarker)));
    assert!(processor.calls().is_empty());
    assert!(ws.recorded().is_empty());
}

#[tokio::test]
async fn test_dry_run_leaves_archive_untouched() {
    let server = MockServer::start().await;
    let ws = Workspace::new();
    let processor = Arc::new(RecordingProcessor::default());

    mount_page(
        &server,
        "/states/",
        format!(r#"{GENERATED} <a href="tx-sl.csv">Texas</a>"#),
        1,
    )
    .await;

    let coordinator = coordinator(
        &server,
        &ws,
        processor.clone(),
        BranchErrorPolicy::Abort,
        true,
    );
    let outcome = coordinator.dry_run().await.expect("Dry run failed");

    assert!(matches!(
        outcome,
        RunOutcome::DryRun {
            previous: None,
            would_run: true,
            ..
        }
    ));
    assert!(processor.calls().is_empty());
    assert!(ws.recorded().is_empty());
}

#[tokio::test]
async fn test_slow_page_times_out() {
    let server = MockServer::start().await;
    let ws = Workspace::new();
    let processor = Arc::new(RecordingProcessor::default());

    Mock::given(method("GET"))
        .and(path("/states/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!(r#"{GENERATED} <a href="tx-sl.csv">Texas</a>"#))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let config = Config {
        fetcher: FetcherConfig {
            timeout_secs: 1,
            ..FetcherConfig::default()
        },
        ..Config::default()
    };
    let mut coordinator = coordinator_with_config(&server, &ws, processor.clone(), config, true);

    let result = coordinator.run().await;

    assert!(matches!(
        result,
        Err(WatchError::Fetch(FetchError::Timeout { .. }))
    ));
    assert!(processor.calls().is_empty());
    assert!(ws.recorded().is_empty());
}
