//! Report artifacts: the UTF-8 text report, the JSON export and per-page
//! text snapshots.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::ReportError;
use crate::extract::TextDocument;
use crate::frequency::{FrequencyTable, RankedToken, TopNList};

/// Render the text report.
pub fn render_text(table: &FrequencyTable, top: &TopNList, top_n: usize) -> String {
    let mut out = String::new();
    out.push_str("=== Filtered vocabulary summary ===\n");
    out.push_str(&format!("Distinct tokens: {}\n", table.len()));
    out.push_str(&format!("=== Top-{} ===\n", top_n));
    out.push_str(&format!("{}{}count\n", pad("rank", 6), pad("token", 12)));
    for entry in top.iter() {
        out.push_str(&format!(
            "{}{}{}\n",
            pad(&entry.rank.to_string(), 6),
            pad(&entry.token, 12),
            entry.count
        ));
    }
    out.push_str("=== Full table (count desc) ===\n");
    out.push_str(&format!("{}count\n", pad("token", 12)));
    for (token, count) in table.sorted() {
        out.push_str(&format!("{}{}\n", pad(token, 12), count));
    }
    out
}

/// Left-align to `width` chars; always leaves at least one space.
fn pad(s: &str, width: usize) -> String {
    let len = s.chars().count();
    let fill = if len < width { width - len } else { 1 };
    format!("{}{}", s, " ".repeat(fill))
}

pub fn write_text(
    path: &Path,
    table: &FrequencyTable,
    top: &TopNList,
    top_n: usize,
) -> Result<(), ReportError> {
    write_file(path, &render_text(table, top, top_n))?;
    info!(path = %path.display(), "report written");
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub distinct_tokens: usize,
    pub min_freq: u64,
    pub top: &'a [RankedToken],
    pub table: Vec<TableRow<'a>>,
}

#[derive(Debug, Serialize)]
pub struct TableRow<'a> {
    pub token: &'a str,
    pub count: u64,
}

impl<'a> JsonReport<'a> {
    pub fn new(table: &'a FrequencyTable, top: &'a TopNList) -> Self {
        Self {
            distinct_tokens: table.len(),
            min_freq: table.min_freq(),
            top: top.entries(),
            table: table
                .sorted()
                .into_iter()
                .map(|(token, count)| TableRow { token, count })
                .collect(),
        }
    }
}

pub fn write_json(path: &Path, table: &FrequencyTable, top: &TopNList) -> Result<(), ReportError> {
    let json = serde_json::to_string_pretty(&JsonReport::new(table, top))?;
    write_file(path, &json)?;
    info!(path = %path.display(), "JSON report written");
    Ok(())
}

/// Save one document as `page{number}.txt` under `dir`, one line per entry.
pub fn write_page(dir: &Path, number: usize, doc: &TextDocument) -> Result<PathBuf, ReportError> {
    fs::create_dir_all(dir).map_err(|source| ReportError::Io {
        path: dir.display().to_string(),
        source,
    })?;
    let path = dir.join(format!("page{}.txt", number));
    write_file(&path, &doc.text())?;
    Ok(path)
}

fn write_file(path: &Path, contents: &str) -> Result<(), ReportError> {
    fs::write(path, contents).map_err(|source| ReportError::Io {
        path: path.display().to_string(),
        source,
    })
}
