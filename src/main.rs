//! rustwos - Web of Science / InCites batch lookup
//!
//! Reads accession numbers (`UT` column) from a CSV file, queries the API in
//! batches and writes the citation metrics to stdout as CSV.
//!
//! ## Usage
//!
//! ```bash
//! WOS_KEY=... rustwos records.csv > metrics.csv
//! rustwos records.csv --esci --on-error skip --order input
//! ```

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use rustwos::batch::DEFAULT_BATCH_SIZE;
use rustwos::client::{ClientConfig, WosClient, API_KEY_ENV, WOS_LITE_URL};
use rustwos::throttle::DEFAULT_DELAY_MS;
use rustwos::pipeline::{run_job, FailurePolicy, Job, OutputOrder, RunConfig};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, Level};
use tracing_subscriber::{fmt, EnvFilter};

// ============================================================================
// CLI Definition
// ============================================================================

/// Look up Web of Science citation metrics for a CSV of accession numbers
#[derive(Parser)]
#[command(name = "rustwos")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Input CSV with a `UT` column
    input: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Identifiers per request (the API accepts at most 100)
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Include the Emerging Sources Citation Index
    #[arg(long)]
    esci: bool,

    /// Pause between requests in milliseconds (0 disables)
    #[arg(long, default_value_t = DEFAULT_DELAY_MS)]
    delay_ms: u64,

    /// What to do when a batch request fails
    #[arg(long, value_enum, default_value_t = OnError::Abort)]
    on_error: OnError,

    /// Requests in flight at once; output stays in batch order
    #[arg(long, default_value_t = 1)]
    concurrency: usize,

    /// Row order within each batch
    #[arg(long, value_enum, default_value_t = Order::Response)]
    order: Order,

    /// Query endpoint
    #[arg(long, default_value = WOS_LITE_URL)]
    endpoint: String,

    /// Environment variable holding the API key
    #[arg(long, default_value = API_KEY_ENV)]
    key_env: String,

    /// Report the h-index of retrieved citation counts
    #[arg(long)]
    h_index: bool,

    /// Report the k-index (total citing articles) of retrieved records
    #[arg(long)]
    k_index: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum OnError {
    Abort,
    Skip,
}

impl From<OnError> for FailurePolicy {
    fn from(value: OnError) -> Self {
        match value {
            OnError::Abort => FailurePolicy::Abort,
            OnError::Skip => FailurePolicy::Skip,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum Order {
    Response,
    Input,
}

impl From<Order> for OutputOrder {
    fn from(value: Order) -> Self {
        match value {
            Order::Response => OutputOrder::Response,
            Order::Input => OutputOrder::Input,
        }
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries the CSV, so logs go to stderr
    let log_level = if cli.debug { Level::DEBUG } else { Level::INFO };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .init();

    let job = Job {
        key_env: cli.key_env,
        run: RunConfig {
            batch_size: cli.batch_size,
            concurrency: cli.concurrency,
            failure_policy: cli.on_error.into(),
            order: cli.order.into(),
            h_index: cli.h_index,
            k_index: cli.k_index,
        },
        interval: Duration::from_millis(cli.delay_ms),
        ..Job::new(cli.input)
    };

    let client_config = ClientConfig {
        base_url: cli.endpoint,
        esci: cli.esci,
        ..ClientConfig::default()
    };

    let summary = run_job(
        &job,
        |var| std::env::var(var).ok(),
        |key| WosClient::new(key, client_config),
        std::io::stdout().lock(),
    )
    .await
    .with_context(|| format!("Lookup failed for {}", job.input.display()))?;

    if let Some(h) = summary.h_index {
        info!(h_index = h, "h-index of retrieved records");
    }
    if let Some(k) = summary.k_index {
        info!(k_index = k, "k-index of retrieved records");
    }
    info!(
        batches = summary.batches,
        failed = summary.failed_batches,
        records = summary.records,
        "Done"
    );
    Ok(())
}
