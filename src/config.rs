//! Run configuration: defaults, JSON file loading and validation.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

pub const MAX_URLS: usize = 5;
pub const MIN_FREQ_RANGE: (u64, u64) = (1, 10);
pub const TIMEOUT_RANGE_SECS: (u64, u64) = (10, 15);

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
pub const DEFAULT_REPORT_PATH: &str = "words.txt";

/// Settings for one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnalysisConfig {
    /// Pages to analyze, fetched in this order.
    #[serde(default)]
    pub urls: Vec<String>,

    /// Minimum total count for a token to stay in the table.
    #[serde(default = "default_min_freq")]
    pub min_freq: u64,

    /// Length of the ranked list.
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Pause between successive fetches.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Replaces the bundled stopword table when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stopwords_path: Option<String>,

    /// Added on top of whichever stopword table is active.
    #[serde(default)]
    pub extra_stopwords: Vec<String>,

    #[serde(default = "default_report_path")]
    pub report_path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_path: Option<String>,

    /// Directory for per-page text snapshots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages_dir: Option<String>,
}

fn default_min_freq() -> u64 {
    2
}

fn default_top_n() -> usize {
    20
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_request_delay_ms() -> u64 {
    1000
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_report_path() -> String {
    DEFAULT_REPORT_PATH.to_string()
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            urls: Vec::new(),
            min_freq: default_min_freq(),
            top_n: default_top_n(),
            timeout_secs: default_timeout_secs(),
            request_delay_ms: default_request_delay_ms(),
            user_agent: default_user_agent(),
            stopwords_path: None,
            extra_stopwords: Vec::new(),
            report_path: default_report_path(),
            json_path: None,
            pages_dir: None,
        }
    }
}

impl AnalysisConfig {
    /// Create a configuration with defaults for the given URLs.
    pub fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            urls: urls.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Load configuration from a JSON file. Missing fields take defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        Self::from_json(&json).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    /// Check the threshold, timeout and list bounds. URLs are validated
    /// separately by [`AnalysisConfig::validate`] since local-file runs have none.
    pub fn validate_limits(&self) -> Result<(), ConfigError> {
        let (lo, hi) = MIN_FREQ_RANGE;
        if !(lo..=hi).contains(&self.min_freq) {
            return Err(ConfigError::MinFreqOutOfRange {
                value: self.min_freq,
                min: lo,
                max: hi,
            });
        }
        let (lo, hi) = TIMEOUT_RANGE_SECS;
        if !(lo..=hi).contains(&self.timeout_secs) {
            return Err(ConfigError::TimeoutOutOfRange {
                value: self.timeout_secs,
                min: lo,
                max: hi,
            });
        }
        if self.top_n == 0 {
            return Err(ConfigError::ZeroTopN);
        }
        Ok(())
    }

    /// Full validation for a URL batch. Runs before any fetch.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.urls.is_empty() {
            return Err(ConfigError::NoUrls);
        }
        if self.urls.len() > MAX_URLS {
            return Err(ConfigError::TooManyUrls {
                count: self.urls.len(),
                max: MAX_URLS,
            });
        }
        for url in &self.urls {
            validate_url(url)?;
        }
        self.validate_limits()
    }
}

/// Accept only absolute http(s) URLs.
fn validate_url(url: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ConfigError::InvalidUrl {
            url: url.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}
