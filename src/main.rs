//! # Idea Collector
//!
//! A one-shot collector that pulls idea candidates from Reddit and YouTube,
//! normalizes them into flat records, deduplicates and ranks them per source,
//! and writes a single timestamped JSON snapshot.
//!
//! ## Usage
//!
//! ```sh
//! REDDIT_CLIENT_ID=... REDDIT_CLIENT_SECRET=... YOUTUBE_API_KEY=... \
//!     idea_collector -c ./config.yml
//! ```
//!
//! ## Architecture
//!
//! The run follows a pipeline:
//! 1. **Settings**: load and validate the YAML settings, resolve credentials
//! 2. **Fetching**: each enabled source queries its targets one at a time
//! 3. **Merging**: per source, dedupe by identity, rank, truncate
//! 4. **Output**: wrap everything in a snapshot with counts and write it
//!
//! Exit code is 0 on success (including a run that found nothing) and 1 on
//! any top-level error.

use chrono::Local;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod collector;
mod config;
mod error;
mod models;
mod outputs;
mod sources;
mod transport;
mod utils;

use cli::Cli;
use collector::Collector;
use config::Settings;
use error::CollectError;
use models::CollectionResult;
use outputs::json::{build_snapshot, write_snapshot};
use transport::ApiClient;
use utils::{ensure_writable_dir, snapshot_filename};

/// What a completed run produced.
enum Outcome {
    Saved {
        path: PathBuf,
        data: CollectionResult,
    },
    NothingCollected,
}

#[tokio::main]
async fn main() -> ExitCode {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    match dotenvy::dotenv() {
        Ok(path) => debug!(path = %path.display(), "Loaded .env"),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => warn!(error = %e, "Failed to read .env; continuing with process environment"),
    }

    let args = Cli::parse();
    debug!(config = %args.config.display(), output = ?args.output, "Parsed CLI arguments");

    let start_time = std::time::Instant::now();
    match run(&args).await {
        Ok(Outcome::Saved { path, data }) => {
            println!("\nSUMMARY:");
            for (source, items) in &data {
                println!("[✓] {}: {} items", source.to_uppercase(), items.len());
            }
            println!("[✓] Output: {}", path.display());
            info!(elapsed_ms = start_time.elapsed().as_millis() as u64, "Execution complete");
            ExitCode::SUCCESS
        }
        Ok(Outcome::NothingCollected) => {
            println!("[!] No data collected");
            info!(elapsed_ms = start_time.elapsed().as_millis() as u64, "Execution complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Run failed");
            eprintln!("[!] Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[instrument(level = "info", skip_all)]
async fn run(args: &Cli) -> Result<Outcome, CollectError> {
    let mut settings = Settings::load(&args.config)?;
    if let Some(max_items) = args.max_items {
        settings.run.max_items_per_source = max_items;
        settings.validate()?;
    }
    if settings.enabled_sources().is_empty() {
        return Err(CollectError::NoSourcesEnabled);
    }

    // Early check: fail before any network call if the snapshot cannot be written
    let out_dir = settings.out_dir(&args.config);
    if let Err(e) = ensure_writable_dir(&out_dir).await {
        error!(path = %out_dir.display(), error = %e, "Output directory is not writable");
        return Err(e.into());
    }

    let credentials = args.credentials();
    let client = ApiClient::new(&settings.run.user_agent, settings.timeout())?;
    let data = Collector::new(&settings, &credentials, &client)
        .collect_all()
        .await;

    if data.values().all(Vec::is_empty) {
        return Ok(Outcome::NothingCollected);
    }

    let now = Local::now();
    let filename = args.output.clone().unwrap_or_else(|| snapshot_filename(&now));
    let snapshot = build_snapshot(data, now);
    let path = write_snapshot(&snapshot, &out_dir, &filename).await?;

    Ok(Outcome::Saved {
        path,
        data: snapshot.data,
    })
}
