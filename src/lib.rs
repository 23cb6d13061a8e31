//! # rustwos
//!
//! Web of Science / InCites batch citation-metrics client.
//!
//! ## Modules
//!
//! - [`extract`] - Accession numbers from the input CSV
//! - [`batch`] - Fixed-size, padded batching
//! - [`client`] - API client and the [`client::RecordSource`] seam
//! - [`writer`] - Schema-driven CSV output
//! - [`pipeline`] - The batch loop tying it together
//! - [`hindex`] - h-index over retrieved citation counts
//! - [`kindex`] - k-index (total citing articles)
//! - [`error`] - Custom error types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use rustwos::client::{ClientConfig, WosClient};
//! use rustwos::pipeline::{run_job, Job};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let job = Job::new("records.csv".into());
//!     let summary = run_job(
//!         &job,
//!         |var| std::env::var(var).ok(),
//!         |key| WosClient::new(key, ClientConfig::default()),
//!         std::io::stdout().lock(),
//!     )
//!     .await?;
//!     eprintln!("Wrote {} records", summary.records);
//!     Ok(())
//! }
//! ```

pub mod batch;
pub mod client;
pub mod error;
pub mod extract;
pub mod hindex;
pub mod kindex;
pub mod pipeline;
pub mod schema;
pub mod throttle;
pub mod writer;

pub use error::{Result, WosError};
