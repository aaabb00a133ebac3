//! Chart-ready series for visualization front ends.
//!
//! Nothing here draws anything; it shapes a finished table and ranking into
//! the series each chart form expects and serializes them as JSON.

use serde::Serialize;
use std::path::Path;

use crate::error::ReportError;
use crate::frequency::{FrequencyTable, TopNList};

/// Radar and polar charts only show this many ranked terms.
pub const RADIAL_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ChartKind {
    WordCloud,
    Bar,
    Line,
    Scatter,
    Pie,
    Radar,
    Heatmap,
    Treemap,
    Polar,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedValue {
    pub name: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RadarIndicator {
    pub name: String,
    pub max: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "chart", rename_all = "kebab-case")]
pub enum ChartData {
    /// Whole table; term size scales with count.
    WordCloud { items: Vec<NamedValue> },
    Bar { labels: Vec<String>, values: Vec<u64> },
    Line { labels: Vec<String>, values: Vec<u64> },
    Scatter { labels: Vec<String>, values: Vec<u64> },
    Pie { items: Vec<NamedValue> },
    Radar {
        indicators: Vec<RadarIndicator>,
        values: Vec<u64>,
    },
    /// One row; each cell is `[row, column, count]`.
    Heatmap {
        labels: Vec<String>,
        cells: Vec<[u64; 3]>,
        min: u64,
        max: u64,
    },
    Treemap { items: Vec<NamedValue> },
    Polar { labels: Vec<String>, values: Vec<u64> },
}

impl ChartData {
    pub fn build(kind: ChartKind, table: &FrequencyTable, top: &TopNList) -> Self {
        let (labels, values) = series(top);
        match kind {
            ChartKind::WordCloud => ChartData::WordCloud {
                items: table
                    .sorted()
                    .into_iter()
                    .map(|(name, value)| NamedValue {
                        name: name.to_string(),
                        value,
                    })
                    .collect(),
            },
            ChartKind::Bar => ChartData::Bar { labels, values },
            ChartKind::Line => ChartData::Line { labels, values },
            ChartKind::Scatter => ChartData::Scatter { labels, values },
            ChartKind::Pie => ChartData::Pie {
                items: named(top),
            },
            ChartKind::Treemap => ChartData::Treemap {
                items: named(top),
            },
            ChartKind::Radar => {
                let (labels, values) = series(&top.truncated(RADIAL_LIMIT));
                let max = values.iter().copied().max().unwrap_or(0);
                ChartData::Radar {
                    indicators: labels
                        .into_iter()
                        .map(|name| RadarIndicator { name, max })
                        .collect(),
                    values,
                }
            }
            ChartKind::Polar => {
                let (labels, values) = series(&top.truncated(RADIAL_LIMIT));
                ChartData::Polar { labels, values }
            }
            ChartKind::Heatmap => ChartData::Heatmap {
                cells: values
                    .iter()
                    .enumerate()
                    .map(|(i, &count)| [0, i as u64, count])
                    .collect(),
                min: values.iter().copied().min().unwrap_or(0),
                max: values.iter().copied().max().unwrap_or(0),
                labels,
            },
        }
    }
}

fn series(top: &TopNList) -> (Vec<String>, Vec<u64>) {
    top.iter().map(|e| (e.token.clone(), e.count)).unzip()
}

fn named(top: &TopNList) -> Vec<NamedValue> {
    top.iter()
        .map(|e| NamedValue {
            name: e.token.clone(),
            value: e.count,
        })
        .collect()
}

pub fn write_chart(
    path: &Path,
    kind: ChartKind,
    table: &FrequencyTable,
    top: &TopNList,
) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(&ChartData::build(kind, table, top))?;
    std::fs::write(path, json).map_err(|source| ReportError::Io {
        path: path.display().to_string(),
        source,
    })
}
