//! Stopword sets: a bundled Chinese table plus file-based overrides.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::error::ConfigError;

/// Default table: high-frequency Chinese function words, pronouns and
/// measure words.
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "的", "了", "在", "是", "我", "有", "和", "就", "不", "人", "都", "一", "一个", "上", "也",
    "很", "到", "说", "要", "去", "你", "会", "着", "没有", "看", "好", "自己", "这", "那",
    "他", "她", "它", "我们", "你们", "他们", "这里", "那里", "然后", "但是", "因为", "所以",
    "如果", "虽然", "这些", "那些", "什么", "怎么", "为什么", "哪个", "哪", "多少", "几",
    "与", "及", "等", "对", "对于", "关于", "通过", "为了", "来自", "用于", "其中", "包括",
    "可以", "将", "能", "让", "使", "被", "把", "给", "向", "从", "以", "之", "而", "则",
    "此", "该", "其", "或", "即", "因", "由", "并", "个", "位", "件", "条", "本", "项",
];

/// Exact-match set of excluded tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StopwordSet {
    words: HashSet<String>,
}

impl Default for StopwordSet {
    fn default() -> Self {
        Self::from_words(DEFAULT_STOPWORDS.iter().copied())
    }
}

impl StopwordSet {
    pub fn empty() -> Self {
        Self {
            words: HashSet::new(),
        }
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words
                .into_iter()
                .map(Into::into)
                .filter(|w: &String| !w.is_empty())
                .collect(),
        }
    }

    /// One word per line; blank lines and `#` comments are skipped.
    pub fn parse(contents: &str) -> Self {
        Self::from_words(
            contents
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#')),
        )
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::parse(&contents))
    }

    pub fn extend<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.words
            .extend(words.into_iter().map(Into::into).filter(|w| !w.is_empty()));
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
