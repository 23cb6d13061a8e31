//! Custom error types for rustwos.
//!
//! All library functions return `Result<T, WosError>` instead of using `unwrap()`.

use thiserror::Error;

/// Main error type for rustwos operations.
#[derive(Debug, Error)]
pub enum WosError {
    /// Configuration error (missing API key, invalid batch size, bad endpoint)
    #[error("Config error: {0}")]
    Config(String),

    /// Input file could not be read or parsed
    #[error("Input error: {0}")]
    Input(String),

    /// Identifier column not present in the input header
    #[error("Input error: no column named '{column}' in header")]
    MissingColumn {
        /// Normalized column name that was searched for
        column: String,
    },

    /// Network/HTTP transport error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Remote API answered with a non-2xx status
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status code
        code: u16,
        /// Status text or response body excerpt
        message: String,
    },

    /// Response body is not the expected envelope
    #[error("Unexpected response shape: {0}")]
    Shape(String),

    /// A single batch failed
    #[error("Batch {index} failed: {source}")]
    Batch {
        /// 0-based batch index
        index: usize,
        /// Underlying failure
        #[source]
        source: Box<WosError>,
    },

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV read/write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WosError {
    /// Network failure or non-2xx status.
    pub fn is_transport(&self) -> bool {
        match self {
            WosError::Network(_) | WosError::Api { .. } => true,
            WosError::Batch { source, .. } => source.is_transport(),
            _ => false,
        }
    }

    /// Malformed JSON or missing envelope keys.
    pub fn is_shape(&self) -> bool {
        match self {
            WosError::Shape(_) | WosError::Json(_) => true,
            WosError::Batch { source, .. } => source.is_shape(),
            _ => false,
        }
    }

    /// Short label used in log fields.
    pub fn kind(&self) -> &'static str {
        if self.is_transport() {
            "transport"
        } else if self.is_shape() {
            "shape"
        } else {
            "other"
        }
    }
}

/// Result type alias using `WosError`
pub type Result<T> = std::result::Result<T, WosError>;

/// Extension trait for adding context to Option types
pub trait OptionExt<T> {
    /// Convert Option to Result with a response-shape error message
    fn ok_or_shape(self, msg: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_shape(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| WosError::Shape(msg.to_string()))
    }
}
