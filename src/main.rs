//! SiteGauge main entry point
//!
//! Reads newline-delimited seed URLs from stdin, crawls each seed in its
//! own session under a concurrency cap, and renders one report covering
//! every session.

use anyhow::Context;
use clap::Parser;
use sitegauge::{CrawlSession, OutputFormat, SessionConfig};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing_subscriber::EnvFilter;

/// SiteGauge: a per-page SEO crawl auditor
///
/// Reads seed URLs (or bare hostnames) from stdin, one per line, crawls
/// each site, and prints one row of SEO metrics per fetched page.
#[derive(Parser, Debug)]
#[command(name = "sitegauge")]
#[command(version = "1.0.0")]
#[command(about = "Crawl websites and report per-page SEO metrics", long_about = None)]
struct Cli {
    /// Maximum crawl depth (seed = 1, 0 = unlimited)
    #[arg(short = 'd', long, default_value_t = 1)]
    max_depth: usize,

    /// Write verbose logs of visits, errors, and per-page processing
    #[arg(short, long)]
    verbose: bool,

    /// Format of the output
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Follow links discovered on fetched pages
    #[arg(short, long)]
    recursive: bool,

    /// Fetch pages one at a time within a session instead of in parallel
    #[arg(long)]
    sequential: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let session_config = SessionConfig {
        max_depth: cli.max_depth,
        recursive: cli.recursive,
        concurrent: !cli.sequential,
    };

    let mut sink = cli.format.make_sink();
    let cap = session_concurrency(cli.max_depth);
    tracing::debug!("running up to {} sessions at once", cap);
    let semaphore = Arc::new(Semaphore::new(cap));

    let mut sessions = JoinSet::new();
    let mut next_id: u32 = 0;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading seed URLs")? {
        let seed = line.trim().to_string();
        if seed.is_empty() {
            continue;
        }
        next_id += 1;
        let id = next_id;
        let semaphore = Arc::clone(&semaphore);
        sessions.spawn(async move {
            // The permit is held until the session's records are drained,
            // so a cap slot frees only once its work is fully accounted.
            let _permit = semaphore.acquire_owned().await.expect("semaphore closed");
            let mut session = CrawlSession::new(id, seed.clone(), session_config);
            match session.run().await {
                Ok(()) => session.report(),
                Err(e) => {
                    tracing::error!("session for '{}' failed: {}", seed, e);
                    Vec::new()
                }
            }
        });
    }

    while let Some(joined) = sessions.join_next().await {
        match joined {
            Ok(records) => {
                for record in &records {
                    sink.append(record);
                }
            }
            Err(e) => tracing::error!("session task failed: {}", e),
        }
    }

    sink.render().context("rendering report")?;
    Ok(())
}

/// Caps cross-session concurrency: available parallelism divided by the
/// crawl depth, never below one.
fn session_concurrency(max_depth: usize) -> usize {
    let cpus = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    (cpus / max_depth.max(1)).max(1)
}

/// Sets up the tracing subscriber.
///
/// Logs go to stderr so the report on stdout stays machine-readable.
fn setup_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("sitegauge=debug,info")
    } else {
        EnvFilter::new("sitegauge=warn,error")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
