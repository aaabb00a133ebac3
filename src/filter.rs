//! Ordered filter pipeline applied to the corpus before counting.
//!
//! Text stages run on the whole corpus before segmentation; token stages run
//! on each segmented token, in order, and a token is counted only if every
//! stage keeps it.

use regex::Regex;
use std::sync::OnceLock;

use crate::stopwords::StopwordSet;

/// Corpus-level rewrite applied before segmentation.
pub trait TextTransform {
    fn apply(&self, text: &str) -> String;

    fn name(&self) -> &'static str;
}

/// Per-token keep/drop decision.
pub trait TokenPredicate {
    fn keep(&self, token: &str) -> bool;

    fn name(&self) -> &'static str;
}

/// Removes `<...>` fragments that survived extraction, across lines.
#[derive(Debug, Default, Clone, Copy)]
pub struct StripMarkup;

impl TextTransform for StripMarkup {
    fn apply(&self, text: &str) -> String {
        static MARKUP: OnceLock<Regex> = OnceLock::new();
        let re = MARKUP.get_or_init(|| Regex::new(r"(?s)<.*?>").expect("markup pattern is valid"));
        re.replace_all(text, "").into_owned()
    }

    fn name(&self) -> &'static str {
        "strip_markup"
    }
}

/// Deletes ASCII, general, CJK and fullwidth punctuation, then collapses
/// whitespace runs to a single space.
#[derive(Debug, Default, Clone, Copy)]
pub struct StripPunctuation;

impl TextTransform for StripPunctuation {
    fn apply(&self, text: &str) -> String {
        static PUNCT: OnceLock<Regex> = OnceLock::new();
        static SPACES: OnceLock<Regex> = OnceLock::new();
        let punct = PUNCT.get_or_init(|| {
            Regex::new(concat!(
                r"[\u{0021}-\u{002F}\u{003A}-\u{0040}\u{005B}-\u{0060}\u{007B}-\u{007E}",
                r"\u{2000}-\u{206F}\u{3000}-\u{303F}",
                r"\u{FF01}-\u{FF0F}\u{FF1A}-\u{FF20}\u{FF3B}-\u{FF40}\u{FF5B}-\u{FF65}",
                r"\p{P}]",
            ))
            .expect("punctuation pattern is valid")
        });
        let spaces = SPACES.get_or_init(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

        let stripped = punct.replace_all(text, "");
        spaces.replace_all(&stripped, " ").trim().to_string()
    }

    fn name(&self) -> &'static str {
        "strip_punctuation"
    }
}

/// Keeps tokens with at least `min_chars` characters.
#[derive(Debug, Clone, Copy)]
pub struct MinLength {
    pub min_chars: usize,
}

impl Default for MinLength {
    fn default() -> Self {
        Self { min_chars: 2 }
    }
}

impl TokenPredicate for MinLength {
    fn keep(&self, token: &str) -> bool {
        token.chars().count() >= self.min_chars
    }

    fn name(&self) -> &'static str {
        "min_length"
    }
}

/// Drops tokens made only of numeric characters (ASCII, fullwidth and other
/// Unicode digits).
#[derive(Debug, Default, Clone, Copy)]
pub struct NotNumeric;

impl TokenPredicate for NotNumeric {
    fn keep(&self, token: &str) -> bool {
        token.is_empty() || !token.chars().all(char::is_numeric)
    }

    fn name(&self) -> &'static str {
        "not_numeric"
    }
}

/// Drops tokens present in the stopword set.
#[derive(Debug, Clone)]
pub struct NotStopword {
    stopwords: StopwordSet,
}

impl NotStopword {
    pub fn new(stopwords: StopwordSet) -> Self {
        Self { stopwords }
    }
}

impl TokenPredicate for NotStopword {
    fn keep(&self, token: &str) -> bool {
        !self.stopwords.contains(token)
    }

    fn name(&self) -> &'static str {
        "not_stopword"
    }
}

type BoxedTransform = Box<dyn TextTransform + Send + Sync>;
type BoxedPredicate = Box<dyn TokenPredicate + Send + Sync>;

/// The ordered stage list.
pub struct FilterPipeline {
    text_stages: Vec<BoxedTransform>,
    token_stages: Vec<BoxedPredicate>,
}

impl Default for FilterPipeline {
    fn default() -> Self {
        Self::new(StopwordSet::default())
    }
}

impl FilterPipeline {
    /// Standard order: markup, punctuation | length, numerals, stopwords.
    pub fn new(stopwords: StopwordSet) -> Self {
        Self::empty()
            .with_text_stage(StripMarkup)
            .with_text_stage(StripPunctuation)
            .with_token_stage(MinLength::default())
            .with_token_stage(NotNumeric)
            .with_token_stage(NotStopword::new(stopwords))
    }

    pub fn empty() -> Self {
        Self {
            text_stages: Vec::new(),
            token_stages: Vec::new(),
        }
    }

    pub fn with_text_stage<T>(mut self, stage: T) -> Self
    where
        T: TextTransform + Send + Sync + 'static,
    {
        self.text_stages.push(Box::new(stage));
        self
    }

    pub fn with_token_stage<P>(mut self, stage: P) -> Self
    where
        P: TokenPredicate + Send + Sync + 'static,
    {
        self.token_stages.push(Box::new(stage));
        self
    }

    /// Run every text stage in order.
    pub fn clean(&self, text: &str) -> String {
        self.text_stages
            .iter()
            .fold(text.to_string(), |acc, stage| stage.apply(&acc))
    }

    /// First stage that rejects `token`, if any.
    pub fn rejected_by(&self, token: &str) -> Option<&'static str> {
        self.token_stages
            .iter()
            .find(|stage| !stage.keep(token))
            .map(|stage| stage.name())
    }

    pub fn keep(&self, token: &str) -> bool {
        self.rejected_by(token).is_none()
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.text_stages
            .iter()
            .map(|s| s.name())
            .chain(self.token_stages.iter().map(|s| s.name()))
            .collect()
    }
}

impl std::fmt::Debug for FilterPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterPipeline")
            .field("stages", &self.stage_names())
            .finish()
    }
}
