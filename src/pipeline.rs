//! Batch lookup pipeline.
//!
//! Resolves the API key, extracts identifiers, then for each batch: request,
//! write, throttle. Batches are written strictly in input order, even when
//! several requests are in flight. With a single request in flight the pause
//! runs from the end of the previous batch; otherwise request starts are spaced.

use crate::batch::{batch_count, batch_ids, Batches, DEFAULT_BATCH_SIZE, MAX_BATCH_SIZE};
use crate::client::{Record, RecordSource, API_KEY_ENV};
use crate::error::{Result, WosError};
use crate::extract::{clean_identifier, extract_from_path, ExtractOptions};
use crate::hindex::HIndex;
use crate::kindex::KIndex;
use crate::schema::{OutputSchema, ACCESSION_FIELD};
use crate::throttle::{Throttle, DEFAULT_INTERVAL};
use crate::writer::ResultWriter;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// What to do when a batch request fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Stop the run; batches already written stay written
    #[default]
    Abort,
    /// Log the failure and move on to the next batch
    Skip,
}

/// Row order within a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputOrder {
    /// As returned by the API
    #[default]
    Response,
    /// By position of each record's `ISI_LOC` in the batch
    Input,
}

/// Per-run options for the batch loop
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub batch_size: usize,
    /// Requests allowed in flight at once
    pub concurrency: usize,
    pub failure_policy: FailurePolicy,
    pub order: OutputOrder,
    /// Compute the h-index of retrieved citation counts
    pub h_index: bool,
    /// Compute the k-index (total citing articles)
    pub k_index: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            concurrency: 1,
            failure_policy: FailurePolicy::Abort,
            order: OutputOrder::Response,
            h_index: false,
            k_index: false,
        }
    }
}

impl RunConfig {
    fn validate(&self) -> Result<()> {
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            return Err(WosError::Config(format!(
                "batch size must be between 1 and {}, got {}",
                MAX_BATCH_SIZE, self.batch_size
            )));
        }
        if self.concurrency == 0 {
            return Err(WosError::Config("concurrency must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Everything needed for one run from input file to CSV output
#[derive(Debug, Clone)]
pub struct Job {
    pub input: PathBuf,
    /// Environment variable holding the API key
    pub key_env: String,
    pub extract: ExtractOptions,
    pub schema: OutputSchema,
    pub run: RunConfig,
    /// Pause before each request; counted from the end of the previous batch when sequential
    pub interval: Duration,
}

impl Job {
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            key_env: API_KEY_ENV.to_string(),
            extract: ExtractOptions::default(),
            schema: OutputSchema::default(),
            run: RunConfig::default(),
            interval: DEFAULT_INTERVAL,
        }
    }
}

/// Outcome of a completed run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Batches attempted
    pub batches: usize,
    pub failed_batches: usize,
    /// Rows written
    pub records: usize,
    pub h_index: Option<u64>,
    pub k_index: Option<u64>,
}

/// Look up the API key, treating a blank value as missing.
pub fn resolve_api_key<L>(var: &str, lookup: L) -> Result<String>
where
    L: FnOnce(&str) -> Option<String>,
{
    match lookup(var) {
        Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(WosError::Config(format!(
            "environment variable \"{}\" is not set; set it to the Web of Science \
             developer key provided by Clarivate",
            var
        ))),
    }
}

/// Run a job end to end.
///
/// The key is resolved and the input parsed before `make_source` is called,
/// so configuration and input errors never reach the network.
pub async fn run_job<L, F, S, W>(
    job: &Job,
    lookup: L,
    make_source: F,
    output: W,
) -> Result<RunSummary>
where
    L: FnOnce(&str) -> Option<String>,
    F: FnOnce(String) -> Result<S>,
    S: RecordSource,
    W: Write,
{
    let key = resolve_api_key(&job.key_env, lookup)?;
    job.run.validate()?;

    let ids = extract_from_path(&job.input, &job.extract)?;
    let source = make_source(key)?;
    let throttle = Throttle::new(job.interval);
    let mut writer = ResultWriter::new(output, job.schema.clone())?;

    run(&ids, &source, &throttle, &mut writer, &job.run).await
}

/// Fetch every batch of `ids` and write the records.
pub async fn run<S, W>(
    ids: &[String],
    source: &S,
    throttle: &Throttle,
    writer: &mut ResultWriter<W>,
    config: &RunConfig,
) -> Result<RunSummary>
where
    S: RecordSource,
    W: Write,
{
    config.validate()?;

    let total = batch_count(ids.len(), config.batch_size);
    info!(
        ids = ids.len(),
        batches = total,
        batch_size = config.batch_size,
        concurrency = config.concurrency,
        "Starting batch lookup"
    );

    let batches = Batches::new(ids.iter().cloned(), config.batch_size)?;
    let mut outcomes = std::pin::pin!(stream::iter(batches.enumerate())
        .map(|(index, group)| async move {
            let batch = batch_ids(group);
            info!(batch = index, total = total, ids = batch.len(), "Processing batch");
            throttle.wait().await;
            let outcome = source.fetch(&batch).await;
            (index, batch, outcome)
        })
        .buffered(config.concurrency));

    let mut summary = RunSummary::default();
    let mut h_index = config.h_index.then(HIndex::new);
    let mut k_index = config.k_index.then(KIndex::new);
    let sequential = config.concurrency == 1;

    while let Some((index, batch, outcome)) = outcomes.next().await {
        summary.batches += 1;

        let records = match outcome {
            Ok(records) => records,
            Err(e) => match config.failure_policy {
                FailurePolicy::Abort => {
                    error!(batch = index, kind = e.kind(), error = %e, "Batch failed, aborting run");
                    return Err(WosError::Batch {
                        index,
                        source: Box::new(e),
                    });
                }
                FailurePolicy::Skip => {
                    warn!(batch = index, kind = e.kind(), error = %e, "Batch failed, skipping");
                    summary.failed_batches += 1;
                    if sequential {
                        throttle.mark().await;
                    }
                    continue;
                }
            },
        };

        let records = match config.order {
            OutputOrder::Response => records,
            OutputOrder::Input => order_by_input(records, &batch),
        };

        for record in &records {
            if let Some(h) = h_index.as_mut() {
                h.push_record(record);
            }
            if let Some(k) = k_index.as_mut() {
                k.push_record(record);
            }
        }

        writer.write_batch(&records)?;
        summary.records += records.len();
        debug!(batch = index, records = records.len(), "Batch written");

        if sequential {
            throttle.mark().await;
        }
    }

    summary.h_index = h_index.map(|h| h.value());
    summary.k_index = k_index.map(|k| k.value());
    info!(
        batches = summary.batches,
        failed = summary.failed_batches,
        records = summary.records,
        h_index = ?summary.h_index,
        k_index = ?summary.k_index,
        "Batch lookup complete"
    );
    Ok(summary)
}

/// Normalized accession number used to match records to input positions.
fn accession_key(raw: &str) -> String {
    clean_identifier(raw, crate::extract::DEFAULT_PREFIX).to_lowercase()
}

/// Stable-sort records by the input position of their `ISI_LOC`.
///
/// Records with no or an unknown `ISI_LOC` follow the matched ones.
pub fn order_by_input(mut records: Vec<Record>, batch: &[String]) -> Vec<Record> {
    let mut positions: HashMap<String, usize> = HashMap::with_capacity(batch.len());
    for (pos, id) in batch.iter().enumerate() {
        positions.entry(accession_key(id)).or_insert(pos);
    }

    records.sort_by_key(|record| {
        record
            .get(ACCESSION_FIELD)
            .and_then(|v| v.as_str())
            .and_then(|loc| positions.get(&accession_key(loc)).copied())
            .unwrap_or(usize::MAX)
    });
    records
}
