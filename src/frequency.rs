//! Token counting, thresholding and ranking.
//!
//! Counts are summed over the whole merged corpus, unweighted by document.
//! The threshold is applied before ranking, so the top-N list only ever sees
//! tokens that already meet `min_freq`. Ties in count are broken by first
//! occurrence in the corpus.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

use crate::error::AnalysisError;
use crate::filter::FilterPipeline;
use crate::stopwords::StopwordSet;
use crate::tokenize::Segmenter;

/// Running per-token counts in first-occurrence order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenCounter {
    entries: Vec<(String, u64)>,
    index: HashMap<String, usize>,
}

impl TokenCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, token: &str) {
        self.add_n(token, 1);
    }

    pub fn add_n(&mut self, token: &str, n: u64) {
        match self.index.get(token) {
            Some(&i) => self.entries[i].1 += n,
            None => {
                self.index.insert(token.to_string(), self.entries.len());
                self.entries.push((token.to_string(), n));
            }
        }
    }

    /// Fold `other` into `self`. Tokens new to `self` keep `other`'s order
    /// after the existing ones.
    pub fn merge(&mut self, other: TokenCounter) {
        for (token, count) in other.entries {
            self.add_n(&token, count);
        }
    }

    pub fn get(&self, token: &str) -> u64 {
        self.index.get(token).map_or(0, |&i| self.entries[i].1)
    }

    /// Distinct tokens seen.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    pub fn counts(&self) -> HashMap<&str, u64> {
        self.entries.iter().map(|(t, c)| (t.as_str(), *c)).collect()
    }

    /// Keep tokens with `count >= min_freq`; `EmptyResult` when none remain.
    pub fn threshold(&self, min_freq: u64) -> Result<FrequencyTable, AnalysisError> {
        let entries: Vec<TableEntry> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, (_, count))| *count >= min_freq)
            .map(|(first_seen, (token, count))| TableEntry {
                token: token.clone(),
                count: *count,
                first_seen,
            })
            .collect();

        debug!(
            distinct = self.len(),
            kept = entries.len(),
            min_freq,
            "applied frequency threshold"
        );

        if entries.is_empty() {
            return Err(AnalysisError::EmptyResult { min_freq });
        }
        let index = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.token.clone(), i))
            .collect();
        Ok(FrequencyTable {
            entries,
            index,
            min_freq,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TableEntry {
    token: String,
    count: u64,
    first_seen: usize,
}

/// Finalized token -> count table. Every count is at least `min_freq`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    entries: Vec<TableEntry>,
    index: HashMap<String, usize>,
    min_freq: u64,
}

impl FrequencyTable {
    pub fn get(&self, token: &str) -> Option<u64> {
        self.index.get(token).map(|&i| self.entries[i].count)
    }

    pub fn contains(&self, token: &str) -> bool {
        self.index.contains_key(token)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn min_freq(&self) -> u64 {
        self.min_freq
    }

    /// Pairs in first-occurrence order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|e| (e.token.as_str(), e.count))
    }

    /// All pairs, count descending, ties by first occurrence.
    pub fn sorted(&self) -> Vec<(&str, u64)> {
        let mut refs: Vec<&TableEntry> = self.entries.iter().collect();
        refs.sort_by(|a, b| rank_order(a, b));
        refs.into_iter().map(|e| (e.token.as_str(), e.count)).collect()
    }

    /// The `n` highest-count tokens.
    pub fn top_n(&self, n: usize) -> TopNList {
        let entries = self
            .sorted()
            .into_iter()
            .take(n)
            .enumerate()
            .map(|(i, (token, count))| RankedToken {
                rank: i + 1,
                token: token.to_string(),
                count,
            })
            .collect();
        TopNList { entries }
    }
}

/// Count descending, then first occurrence ascending.
fn rank_order(a: &TableEntry, b: &TableEntry) -> Ordering {
    b.count
        .cmp(&a.count)
        .then_with(|| a.first_seen.cmp(&b.first_seen))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedToken {
    /// 1-based.
    pub rank: usize,
    pub token: String,
    pub count: u64,
}

/// Ranked slice of a [`FrequencyTable`], strictly non-increasing by count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TopNList {
    entries: Vec<RankedToken>,
}

impl TopNList {
    pub fn entries(&self) -> &[RankedToken] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RankedToken> {
        self.entries.iter()
    }

    /// First `n` entries, for consumers that show fewer terms.
    pub fn truncated(&self, n: usize) -> TopNList {
        TopNList {
            entries: self.entries.iter().take(n).cloned().collect(),
        }
    }

    pub fn pairs(&self) -> Vec<(&str, u64)> {
        self.entries
            .iter()
            .map(|e| (e.token.as_str(), e.count))
            .collect()
    }
}

/// Filters, segments and counts text for one session.
pub struct FrequencyAggregator {
    pipeline: FilterPipeline,
    segmenter: Box<dyn Segmenter + Send + Sync>,
    counter: TokenCounter,
    rejected: HashMap<&'static str, u64>,
}

impl FrequencyAggregator {
    pub fn new(pipeline: FilterPipeline, segmenter: Box<dyn Segmenter + Send + Sync>) -> Self {
        Self {
            pipeline,
            segmenter,
            counter: TokenCounter::new(),
            rejected: HashMap::new(),
        }
    }

    /// Clean, segment and count one chunk of corpus text. Returns how many
    /// tokens were counted.
    pub fn add_text(&mut self, text: &str) -> usize {
        let cleaned = self.pipeline.clean(text);
        if cleaned.is_empty() {
            return 0;
        }
        let tokens = self.segmenter.segment(&cleaned);
        debug!(
            segmenter = self.segmenter.name(),
            tokens = tokens.len(),
            "segmented text"
        );
        self.add_tokens(tokens)
    }

    /// Count already-segmented tokens; text stages are skipped.
    pub fn add_tokens<I, S>(&mut self, tokens: I) -> usize
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut kept = 0;
        for token in tokens {
            let token = token.as_ref();
            match self.pipeline.rejected_by(token) {
                Some(stage) => *self.rejected.entry(stage).or_insert(0) += 1,
                None => {
                    self.counter.add(token);
                    kept += 1;
                }
            }
        }
        kept
    }

    pub fn counter(&self) -> &TokenCounter {
        &self.counter
    }

    /// Tokens dropped per stage name.
    pub fn rejected(&self) -> &HashMap<&'static str, u64> {
        &self.rejected
    }

    pub fn finalize(&self, min_freq: u64) -> Result<FrequencyTable, AnalysisError> {
        debug!(rejected = ?self.rejected, "filter pipeline summary");
        self.counter.threshold(min_freq)
    }
}

/// One-shot aggregation of a merged corpus.
pub fn aggregate(
    corpus: &str,
    stopwords: StopwordSet,
    segmenter: Box<dyn Segmenter + Send + Sync>,
    min_freq: u64,
    top_n: usize,
) -> Result<(FrequencyTable, TopNList), AnalysisError> {
    let mut aggregator = FrequencyAggregator::new(FilterPipeline::new(stopwords), segmenter);
    aggregator.add_text(corpus);
    let table = aggregator.finalize(min_freq)?;
    let top = table.top_n(top_n);
    Ok((table, top))
}
