//! State-Watch main entry point
//!
//! This is the command-line interface for the State-Watch update monitor.

use clap::Parser;
use std::path::PathBuf;
use state_watch::config::{load_config_with_hash, Config};
use state_watch::crawler::{Coordinator, CrawlReport, RunOutcome, RunTarget};
use state_watch::timestamp::format_for_display;
use tracing_subscriber::EnvFilter;

/// State-Watch: watch state lists for updates
///
/// Fetches the root index page, compares its "Generated: ... UTC" stamp with
/// the last recorded run, and when newer walks the site to find state
/// speed-limit CSVs and hand each one to the external processor.
#[derive(Parser, Debug)]
#[command(name = "state-watch")]
#[command(version)]
#[command(about = "Watch state lists for updates, process new data on update", long_about = None)]
struct Cli {
    /// Root of the website where the data lives
    #[arg(value_name = "ROOT_URL")]
    root_url: String,

    /// Existing directory where state-specific output should go
    #[arg(value_name = "OUTPUT_DIR")]
    output_dir: PathBuf,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory of recorded run timestamps (overrides config)
    #[arg(long, value_name = "DIR")]
    archive_dir: Option<PathBuf>,

    /// Program that processes each located CSV (overrides config)
    #[arg(long, value_name = "PROGRAM")]
    processor: Option<String>,

    /// Scan the root page only, without following links
    #[arg(long)]
    no_recurse: bool,

    /// Check the root page against the last recorded run and exit
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let mut config = match load_configuration(cli.config.as_ref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };

    if let Some(dir) = cli.archive_dir {
        config.archive.directory = dir;
    }
    if let Some(program) = cli.processor {
        config.processor.program = program;
        config.processor.args.clear();
    }

    let target = RunTarget {
        root_url: cli.root_url,
        output_root: cli.output_dir,
        recurse: !cli.no_recurse,
    };

    let mut coordinator = match Coordinator::new(config, target) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to start: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&coordinator).await
    } else {
        handle_run(&mut coordinator).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("state_watch=info,warn"),
            1 => EnvFilter::new("state_watch=debug,info"),
            2 => EnvFilter::new("state_watch=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file if one was given, defaults otherwise
fn load_configuration(path: Option<&PathBuf>) -> Result<Config, Box<dyn std::error::Error>> {
    let Some(path) = path else {
        tracing::debug!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

/// Handles the --dry-run mode: reports what the gate decides
async fn handle_dry_run(coordinator: &Coordinator) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== State-Watch Dry Run ===\n");

    if let RunOutcome::DryRun {
        previous,
        current,
        would_run,
    } = coordinator.dry_run().await?
    {
        match previous {
            Some(previous) => println!("Last recorded run: {}", format_for_display(&previous)),
            None => println!("Last recorded run: none"),
        }
        println!("Root page generated: {}", format_for_display(&current));

        if would_run {
            println!("\n✓ New data: a run would crawl the site");
        } else {
            println!("\n✓ No new data: a run would exit without crawling");
        }
    }

    Ok(())
}

/// Handles the main watch operation
async fn handle_run(coordinator: &mut Coordinator) -> Result<(), Box<dyn std::error::Error>> {
    match coordinator.run().await {
        Ok(RunOutcome::Completed { instant, report }) => {
            tracing::info!("Run for {} completed", format_for_display(&instant));
            print_report(&report);
            Ok(())
        }
        Ok(_) => Ok(()),
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            Err(e.into())
        }
    }
}

/// Prints a crawl report to stdout
fn print_report(report: &CrawlReport) {
    println!("=== Crawl Report ===");
    println!("  Pages visited:       {}", report.pages_visited);
    println!("  Links scanned:       {}", report.links_scanned);
    println!("  CSV leaves:          {}", report.csv_leaves);
    println!("  Revisits skipped:    {}", report.revisits_skipped);
    println!("  Scanner matches:     {}", report.matches);
    println!("  Files processed:     {}", report.processed);
    println!("  Processor failures:  {}", report.processor_failures);

    if !report.failed_branches.is_empty() {
        println!("\nSkipped branches ({}):", report.failed_branches.len());
        for branch in &report.failed_branches {
            println!("  - {} (depth {}): {}", branch.url, branch.depth, branch.error);
        }
    }
}
