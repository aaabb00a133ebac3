//! Text segmentation behind a pluggable trait.
//!
//! A segmenter only splits. Case, stopwords and numerals are handled by the
//! filter pipeline, never here.

use jieba_rs::Jieba;

/// Splits text into token strings.
///
/// Implementations must be deterministic and must not emit blank tokens.
pub trait Segmenter {
    fn segment(&self, text: &str) -> Vec<String>;

    fn name(&self) -> &'static str;
}

/// Dictionary-based segmentation for CJK text; Latin runs pass through as
/// literal words.
pub struct JiebaSegmenter {
    jieba: Jieba,
}

impl Default for JiebaSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

impl JiebaSegmenter {
    /// Load the bundled dictionary. HMM is on for unknown words.
    pub fn new() -> Self {
        Self {
            jieba: Jieba::new(),
        }
    }
}

impl Segmenter for JiebaSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        self.jieba
            .cut(text, true)
            .into_iter()
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .collect()
    }

    fn name(&self) -> &'static str {
        "jieba"
    }
}

/// Split on whitespace only.
#[derive(Debug, Default, Clone, Copy)]
pub struct WhitespaceSegmenter;

impl Segmenter for WhitespaceSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    fn name(&self) -> &'static str {
        "whitespace"
    }
}
