//! Error types for every stage of an analysis run.
//!
//! Expected conditions (a failed fetch, a page with too little text, an empty
//! vocabulary) are ordinary values here, never panics. Only configuration
//! misuse aborts a batch before the first request goes out.

use thiserror::Error;

/// Why a single fetch attempt failed. The URL is skipped; the batch continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// No response within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Server answered with a non-2xx status.
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// Connection, DNS, TLS or body transfer failure.
    #[error("network error: {0}")]
    Network(String),

    /// Anything reqwest could not classify.
    #[error("unknown fetch error: {0}")]
    Unknown(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if let Some(status) = e.status() {
            FetchError::HttpStatus(status.as_u16())
        } else if e.is_connect() || e.is_request() || e.is_body() || e.is_decode() {
            FetchError::Network(e.to_string())
        } else {
            FetchError::Unknown(e.to_string())
        }
    }
}

/// Why raw markup produced no usable document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// Input was blank or the content root carried no text at all.
    #[error("no content root with extractable text")]
    NoContentRoot,

    /// Deduplicated text is shorter than the minimum document length.
    #[error("extracted text too short ({chars} chars)")]
    BelowFloor { chars: usize },
}

/// Configuration misuse. The only condition that aborts a batch up front.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("no URLs supplied")]
    NoUrls,

    #[error("no input files supplied")]
    NoInputs,

    #[error("too many URLs: {count} (at most {max})")]
    TooManyUrls { count: usize, max: usize },

    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("min_freq must be in {min}..={max}, got {value}")]
    MinFreqOutOfRange { value: u64, min: u64, max: u64 },

    #[error("timeout must be in {min}..={max} seconds, got {value}")]
    TimeoutOutOfRange { value: u64, min: u64, max: u64 },

    #[error("top_n must be at least 1")]
    ZeroTopN,

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Outcome of a whole analysis that produced no table.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Nothing survived filtering, or nothing reached the threshold.
    #[error("no tokens with frequency >= {min_freq}")]
    EmptyResult { min_freq: u64 },

    #[error("runtime error: {0}")]
    Runtime(String),
}

/// Artifact write failure. Never invalidates the in-memory table.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
