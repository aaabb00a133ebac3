//! One analysis run: fetch, extract, aggregate, finalize.
//!
//! All per-run state lives in [`AnalysisSession`] and is dropped when the
//! session is consumed by `run`. URLs are processed one at a time in input
//! order with a fixed pause between requests. A failed fetch or a rejected
//! page is logged and skipped; only configuration errors stop the batch, and
//! they do so before the first request.

use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::config::AnalysisConfig;
use crate::crawler::{Fetcher, PageSource};
use crate::error::{AnalysisError, ConfigError};
use crate::extract::{Extractor, TextDocument};
use crate::filter::FilterPipeline;
use crate::frequency::{FrequencyAggregator, FrequencyTable, TopNList};
use crate::report;
use crate::stopwords::StopwordSet;
use crate::tokenize::{JiebaSegmenter, Segmenter};

/// Per-batch counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub requested: usize,
    pub fetched: usize,
    pub fetch_failures: usize,
    pub extraction_failures: usize,
    pub documents: usize,
}

impl BatchStats {
    pub fn skipped(&self) -> usize {
        self.fetch_failures + self.extraction_failures
    }
}

/// A finished run.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub table: FrequencyTable,
    pub top: TopNList,
    pub stats: BatchStats,
}

pub struct AnalysisSession {
    config: AnalysisConfig,
    extractor: Extractor,
    aggregator: FrequencyAggregator,
    stats: BatchStats,
}

impl AnalysisSession {
    /// Session with the dictionary segmenter.
    pub fn new(config: AnalysisConfig) -> Result<Self, AnalysisError> {
        Self::with_segmenter(config, Box::new(JiebaSegmenter::new()))
    }

    pub fn with_segmenter(
        config: AnalysisConfig,
        segmenter: Box<dyn Segmenter + Send + Sync>,
    ) -> Result<Self, AnalysisError> {
        config.validate_limits()?;
        let stopwords = load_stopwords(&config)?;
        info!(
            stopwords = stopwords.len(),
            segmenter = segmenter.name(),
            min_freq = config.min_freq,
            "session created"
        );
        Ok(Self {
            aggregator: FrequencyAggregator::new(FilterPipeline::new(stopwords), segmenter),
            extractor: Extractor::new(),
            stats: BatchStats::default(),
            config,
        })
    }

    /// Blocking entry point; drives [`AnalysisSession::run_async`] on its own runtime.
    pub fn run(self) -> Result<AnalysisOutcome, AnalysisError> {
        self.config.validate()?;
        let rt = tokio::runtime::Runtime::new().map_err(|e| AnalysisError::Runtime(e.to_string()))?;
        rt.block_on(self.run_async())
    }

    /// Fetch every configured URL in order and aggregate what survives.
    pub async fn run_async(mut self) -> Result<AnalysisOutcome, AnalysisError> {
        self.config.validate()?;
        let fetcher = Fetcher::from_config(&self.config)?;
        let delay = self.config.request_delay();
        let urls = self.config.urls.clone();

        for (i, url) in urls.iter().enumerate() {
            if i > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            info!(url = %url, n = i + 1, total = urls.len(), "processing page");
            let source = fetcher.fetch_source(url).await;
            self.ingest_source(source);
        }

        self.finish()
    }

    /// Aggregate saved plain-text pages instead of fetching.
    pub fn run_files<P: AsRef<Path>>(mut self, paths: &[P]) -> Result<AnalysisOutcome, AnalysisError> {
        if paths.is_empty() {
            return Err(ConfigError::NoInputs.into());
        }
        for path in paths {
            let path = path.as_ref();
            let name = path.display().to_string();
            self.stats.requested += 1;
            let text = match fs::read_to_string(path) {
                Ok(text) => text,
                Err(e) => {
                    warn!(path = %name, error = %e, "failed to read file, skipping");
                    self.stats.fetch_failures += 1;
                    continue;
                }
            };
            self.stats.fetched += 1;
            match TextDocument::from_lines(&name, text.lines()) {
                Ok(doc) => self.ingest_document(doc),
                Err(e) => {
                    warn!(path = %name, error = %e, "file rejected, skipping");
                    self.stats.extraction_failures += 1;
                }
            }
        }
        self.finish()
    }

    /// Extract one fetched page and fold it into the counts.
    pub fn ingest_source(&mut self, source: PageSource) {
        self.stats.requested += 1;
        let PageSource { url, outcome } = source;
        let raw = match outcome {
            Ok(raw) => raw,
            Err(e) => {
                warn!(url = %url, error = %e, "fetch failed, skipping");
                self.stats.fetch_failures += 1;
                return;
            }
        };
        self.stats.fetched += 1;

        match self.extractor.try_extract(&url, &raw) {
            Ok(doc) => self.ingest_document(doc),
            Err(e) => {
                warn!(url = %url, error = %e, "extraction failed, skipping");
                self.stats.extraction_failures += 1;
            }
        }
    }

    pub fn ingest_document(&mut self, doc: TextDocument) {
        self.stats.documents += 1;
        if let Some(dir) = &self.config.pages_dir {
            if let Err(e) = report::write_page(Path::new(dir), self.stats.documents, &doc) {
                warn!(error = %e, "failed to save page snapshot");
            }
        }
        let counted = self.aggregator.add_text(&doc.text());
        info!(
            source = %doc.source_url,
            lines = doc.lines().len(),
            tokens = counted,
            "document added"
        );
    }

    /// Threshold, rank and tear down the session.
    pub fn finish(self) -> Result<AnalysisOutcome, AnalysisError> {
        info!(
            requested = self.stats.requested,
            documents = self.stats.documents,
            skipped = self.stats.skipped(),
            "batch complete"
        );
        let table = self.aggregator.finalize(self.config.min_freq)?;
        let top = table.top_n(self.config.top_n);
        Ok(AnalysisOutcome {
            table,
            top,
            stats: self.stats,
        })
    }
}

/// Bundled table or file replacement, plus any extra words.
pub fn load_stopwords(config: &AnalysisConfig) -> Result<StopwordSet, ConfigError> {
    let mut stopwords = match &config.stopwords_path {
        Some(path) => StopwordSet::from_file(path)?,
        None => StopwordSet::default(),
    };
    stopwords.extend(config.extra_stopwords.iter().cloned());
    Ok(stopwords)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::tokenize::WhitespaceSegmenter;

    fn session(min_freq: u64) -> AnalysisSession {
        let mut config = AnalysisConfig::new(["https://example.com/"]);
        config.min_freq = min_freq;
        AnalysisSession::with_segmenter(config, Box::new(WhitespaceSegmenter)).unwrap()
    }

    fn page(body: &str) -> String {
        format!("<html><body>{}</body></html>", body)
    }

    #[test]
    fn test_three_documents_accumulate() {
        let mut s = session(2);
        for (i, topic) in ["新闻 报道 内容", "评论 文章 摘要", "专题 访谈 记录"].iter().enumerate() {
            let body = format!(
                "<p>测试 {}</p><p>第{}篇 这一段文字足够长以便通过最低长度检查因此需要再补充一些额外的描述性文字内容并且保证每一篇都超过五十个字符</p>",
                topic, i
            );
            s.ingest_source(PageSource {
                url: format!("https://example.com/{}", i),
                outcome: Ok(page(&body)),
            });
        }
        let outcome = s.finish().unwrap();
        assert_eq!(outcome.table.get("测试"), Some(3));
        assert_eq!(outcome.stats.documents, 3);
        assert_eq!(outcome.stats.skipped(), 0);
    }

    #[test]
    fn test_failures_are_skipped_not_fatal() {
        let mut s = session(1);
        s.ingest_source(PageSource {
            url: "https://a.example/".into(),
            outcome: Err(FetchError::Timeout),
        });
        s.ingest_source(PageSource {
            url: "https://b.example/".into(),
            outcome: Ok(page("")),
        });
        s.ingest_source(PageSource {
            url: "https://c.example/".into(),
            outcome: Ok(page(
                "<p>rust crawler extracts visible text from pages and counts rust tokens</p>",
            )),
        });
        let outcome = s.finish().unwrap();
        assert_eq!(
            outcome.stats,
            BatchStats {
                requested: 3,
                fetched: 2,
                fetch_failures: 1,
                extraction_failures: 1,
                documents: 1,
            }
        );
        assert_eq!(outcome.top.entries()[0].token, "rust");
        assert_eq!(outcome.top.entries()[0].count, 2);
    }

    #[test]
    fn test_all_pages_skipped_is_empty_result() {
        let mut s = session(1);
        s.ingest_source(PageSource {
            url: "https://a.example/".into(),
            outcome: Err(FetchError::HttpStatus(500)),
        });
        assert!(matches!(
            s.finish(),
            Err(AnalysisError::EmptyResult { min_freq: 1 })
        ));
    }

    #[test]
    fn test_invalid_config_aborts_before_fetch() {
        let config = AnalysisConfig::default();
        let s = AnalysisSession::with_segmenter(config, Box::new(WhitespaceSegmenter)).unwrap();
        assert!(matches!(
            s.run(),
            Err(AnalysisError::Config(ConfigError::NoUrls))
        ));

        let mut config = AnalysisConfig::new(["https://example.com/"]);
        config.min_freq = 0;
        assert!(AnalysisSession::with_segmenter(config, Box::new(WhitespaceSegmenter)).is_err());
    }

    #[test]
    fn test_custom_stopwords() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stop.txt");
        fs::write(&path, "rust\n").unwrap();

        let mut config = AnalysisConfig::new(["https://example.com/"]);
        config.stopwords_path = Some(path.display().to_string());
        config.extra_stopwords = vec!["pages".into()];
        let stopwords = load_stopwords(&config).unwrap();
        assert!(stopwords.contains("rust"));
        assert!(stopwords.contains("pages"));
        assert!(!stopwords.contains("的"));
    }

    #[test]
    fn test_snapshot_failure_keeps_counts() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        fs::write(&blocker, "occupied").unwrap();

        let mut config = AnalysisConfig::new(["https://example.com/"]);
        config.min_freq = 2;
        config.pages_dir = Some(blocker.display().to_string());
        let mut s = AnalysisSession::with_segmenter(config, Box::new(WhitespaceSegmenter)).unwrap();
        s.ingest_source(PageSource {
            url: "https://example.com/".into(),
            outcome: Ok(page(
                "<p>snapshot writes may fail but snapshot counting continues regardless</p>",
            )),
        });

        let outcome = s.finish().unwrap();
        assert_eq!(outcome.stats.documents, 1);
        assert_eq!(outcome.table.get("snapshot"), Some(2));
        assert_eq!(outcome.table.len(), 1);
        assert!(blocker.is_file());
    }

    #[test]
    fn test_run_files_and_snapshots() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("page1.txt");
        let second = dir.path().join("page2.txt");
        fs::write(&first, "测试 文本 第一份 保存的网页内容\n用于离线统计的词频分析 测试\n这是一段补充说明文字用来确保文件内容超过最低字数限制\n").unwrap();
        fs::write(&second, "short").unwrap();
        let missing = dir.path().join("page3.txt");

        let mut config = AnalysisConfig::default();
        config.min_freq = 2;
        config.pages_dir = Some(dir.path().join("snapshots").display().to_string());
        let s = AnalysisSession::with_segmenter(config, Box::new(WhitespaceSegmenter)).unwrap();
        let outcome = s.run_files(&[first, second, missing]).unwrap();

        assert_eq!(outcome.table.get("测试"), Some(2));
        assert_eq!(outcome.stats.fetch_failures, 1);
        assert_eq!(outcome.stats.extraction_failures, 1);
        assert!(dir.path().join("snapshots").join("page1.txt").exists());
    }
}
