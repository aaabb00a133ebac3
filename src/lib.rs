//! RustyWordFreq: fetch pages, extract visible text, rank the vocabulary.
//!
//! Pipeline: [`crawler`] → [`extract`] → [`filter`] + [`tokenize`] →
//! [`frequency`] → [`report`] / [`chart`], driven by [`session`].

pub mod chart;
pub mod config;
pub mod crawler;
pub mod error;
pub mod extract;
pub mod filter;
pub mod frequency;
pub mod report;
pub mod session;
pub mod stopwords;
pub mod tokenize;

pub use config::AnalysisConfig;
pub use error::{AnalysisError, ConfigError, ExtractError, FetchError, ReportError};
pub use extract::{Extractor, TextDocument};
pub use frequency::{aggregate, FrequencyAggregator, FrequencyTable, RankedToken, TopNList};
pub use session::{AnalysisOutcome, AnalysisSession, BatchStats};
