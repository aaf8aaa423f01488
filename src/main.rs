//! Dripgrab command-line interface

use anyhow::Context;
use clap::Parser;
use dripgrab::config::{resolve_config, Overrides};
use dripgrab::crawler::Coordinator;
use dripgrab::output::FileFailureLog;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Dripgrab: archive a forum board page range to disk
///
/// Walks the listing pages of an XpressEngine-style board, downloads each
/// post's images, and writes one directory per post containing the images
/// and an `info.json` with metadata, body paragraphs and comments.
#[derive(Parser, Debug)]
#[command(name = "dripgrab")]
#[command(version)]
#[command(about = "Archive a forum board page range to disk", long_about = None)]
struct Cli {
    /// Board listing URL (e.g. https://host/board or .../index.php?mid=board)
    #[arg(short, long)]
    url: Option<String>,

    /// Directory receiving one subdirectory per post
    #[arg(short, long, value_name = "DIR")]
    download_path: Option<PathBuf>,

    /// First listing page to process
    #[arg(short, long)]
    start_page: Option<u32>,

    /// Last listing page to process
    #[arg(short, long)]
    end_page: Option<u32>,

    /// Optional TOML config file; CLI flags override its values
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Maximum number of posts processed concurrently
    #[arg(long)]
    concurrency: Option<usize>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Exit non-zero when the post failure ratio exceeds this value
    #[arg(long)]
    fail_threshold: Option<f64>,

    /// Failure log file
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let overrides = Overrides {
        listing_url: cli.url,
        download_root: cli.download_path,
        start_page: cli.start_page,
        end_page: cli.end_page,
        max_concurrent_posts: cli.concurrency,
        request_timeout_secs: cli.timeout_secs,
        fail_threshold: cli.fail_threshold,
        log_file: cli.log_file,
    };
    let config = resolve_config(cli.config.as_deref(), overrides)
        .context("failed to build configuration")?;

    let failures = Arc::new(
        FileFailureLog::open(&config.output.log_file)
            .with_context(|| format!("failed to open log file {}", config.output.log_file.display()))?,
    );

    let fail_threshold = config.crawl.fail_threshold;
    let coordinator = Coordinator::new(config, failures)?;

    // Ctrl-C stops the crawl at the next page/post boundary; in-flight
    // posts finish so no directory is left half-written.
    let cancel = coordinator.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, finishing in-flight posts");
            cancel.cancel();
        }
    });

    let summary = coordinator.run().await?;

    tracing::info!(
        "Done: {} posts archived, {} failed, {} images downloaded",
        summary.posts_processed,
        summary.posts_failed,
        summary.images_downloaded
    );

    if summary.failure_ratio() > fail_threshold {
        anyhow::bail!(
            "post failure ratio {:.2} exceeded threshold {:.2}",
            summary.failure_ratio(),
            fail_threshold
        );
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("dripgrab=info,warn"),
            1 => EnvFilter::new("dripgrab=debug,info"),
            2 => EnvFilter::new("dripgrab=trace,debug"),
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
