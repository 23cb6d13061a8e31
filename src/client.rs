//! Web of Science Lite / InCites API client.
//!
//! One GET per batch: identifiers are comma-joined into the `UT` query
//! parameter, the key travels in the `X-ApiKey` header, and results are read
//! from `api[0].rval` in the JSON envelope.

use crate::error::{OptionExt, Result, WosError};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

/// Web of Science Lite query endpoint
pub const WOS_LITE_URL: &str = "https://api.clarivate.com/api/woslite/query";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "WOS_KEY";

/// Request header carrying the API key
const API_KEY_HEADER: &str = "X-ApiKey";

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// A single result record; fields vary between records.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Anything that can turn a batch of identifiers into result records.
#[allow(async_fn_in_trait)]
pub trait RecordSource {
    /// Fetch records for one batch of identifiers (no padding).
    async fn fetch(&self, ids: &[String]) -> Result<Vec<Record>>;
}

impl<T: RecordSource + ?Sized> RecordSource for &T {
    async fn fetch(&self, ids: &[String]) -> Result<Vec<Record>> {
        (**self).fetch(ids).await
    }
}

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Query endpoint
    pub base_url: String,
    /// Include the Emerging Sources Citation Index
    pub esci: bool,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: WOS_LITE_URL.to_string(),
            esci: false,
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }
}

/// HTTP client for the citation-metrics API
pub struct WosClient {
    client: reqwest::Client,
    api_key: String,
    config: ClientConfig,
}

impl WosClient {
    /// Create a new WosClient
    ///
    /// # Errors
    ///
    /// Returns `WosError::Config` for an empty key or an unparseable endpoint.
    pub fn new(api_key: String, config: ClientConfig) -> Result<Self> {
        if api_key.trim().is_empty() {
            return Err(WosError::Config("API key is empty".to_string()));
        }
        Url::parse(&config.base_url)
            .map_err(|e| WosError::Config(format!("Invalid endpoint {}: {}", config.base_url, e)))?;

        let client = reqwest::Client::builder()
            .user_agent(concat!("rustwos/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| WosError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key,
            config,
        })
    }

    /// Query the API for one batch.
    pub async fn query(&self, ids: &[String]) -> Result<Vec<Record>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let url = build_query_url(&self.config.base_url, ids, self.config.esci)?;
        debug!(url = %url, ids = ids.len(), "Sending query");

        let response = self
            .client
            .get(url)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "API error");
            return Err(WosError::Api {
                code: status.as_u16(),
                message: format!("{} {}", status, body.chars().take(200).collect::<String>())
                    .trim()
                    .to_string(),
            });
        }

        let body = response.text().await?;
        let records = parse_envelope(&body)?;
        info!(ids = ids.len(), records = records.len(), "Query complete");
        Ok(records)
    }
}

impl RecordSource for WosClient {
    async fn fetch(&self, ids: &[String]) -> Result<Vec<Record>> {
        self.query(ids).await
    }
}

/// Build the request URL with `UT` and optional `esci=y`.
pub fn build_query_url(base_url: &str, ids: &[String], esci: bool) -> Result<Url> {
    let mut params = vec![("UT", ids.join(","))];
    if esci {
        params.push(("esci", "y".to_string()));
    }
    Url::parse_with_params(base_url, &params)
        .map_err(|e| WosError::Config(format!("Invalid endpoint {}: {}", base_url, e)))
}

// === API Response Types ===

#[derive(Debug, Deserialize)]
struct Envelope {
    api: Vec<ApiSection>,
}

#[derive(Debug, Deserialize)]
struct ApiSection {
    rval: Vec<serde_json::Value>,
}

/// Extract the record list from `api[0].rval`.
pub fn parse_envelope(body: &str) -> Result<Vec<Record>> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|e| WosError::Shape(format!("Failed to parse response envelope: {}", e)))?;

    let section = envelope
        .api
        .into_iter()
        .next()
        .ok_or_shape("envelope has an empty 'api' list")?;

    section
        .rval
        .into_iter()
        .enumerate()
        .map(|(idx, value)| match value {
            serde_json::Value::Object(map) => Ok(map),
            other => Err(WosError::Shape(format!(
                "rval[{}] is not an object: {}",
                idx, other
            ))),
        })
        .collect()
}
