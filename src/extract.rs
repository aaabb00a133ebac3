//! Markup to line-oriented plain text.
//!
//! Non-content elements are dropped by tag name before any text is read.
//! This is a fixed deny-list, not a content-density heuristic: boilerplate
//! inside ordinary `<div>`s (sidebars, cookie banners, menus built without
//! `<nav>`) passes through, and only line deduplication thins it out.

use scraper::{Html, Node, Selector};
use std::collections::HashSet;

use crate::error::ExtractError;

/// Documents shorter than this (in chars, summed over lines) are discarded.
pub const MIN_DOCUMENT_CHARS: usize = 50;

pub const DEFAULT_SUPPRESSED_TAGS: &[&str] = &[
    "head", "script", "style", "noscript", "template", "iframe", "frame", "frameset", "object",
    "embed", "svg", "canvas", "header", "footer", "nav",
];

/// Elements whose boundaries start a new line.
const BLOCK_TAGS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "form", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "li", "main",
    "ol", "option", "p", "pre", "section", "table", "tbody", "td", "tfoot", "th", "thead", "tr",
    "ul",
];

/// Extracted text of one page: trimmed, non-empty, first-occurrence-unique lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDocument {
    pub source_url: String,
    lines: Vec<String>,
}

impl TextDocument {
    /// Build a document from already-plain text lines: trim, drop blanks,
    /// deduplicate, then enforce the length floor.
    pub fn from_lines<I, S>(source_url: &str, lines: I) -> Result<Self, ExtractError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines = lines
            .into_iter()
            .map(|l| l.as_ref().trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        Self::checked(source_url, dedup_lines(lines), MIN_DOCUMENT_CHARS)
    }

    fn checked(source_url: &str, lines: Vec<String>, min_chars: usize) -> Result<Self, ExtractError> {
        if lines.is_empty() {
            return Err(ExtractError::NoContentRoot);
        }
        let doc = Self {
            source_url: source_url.to_string(),
            lines,
        };
        let chars = doc.char_count();
        if chars < min_chars {
            return Err(ExtractError::BelowFloor { chars });
        }
        Ok(doc)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Total characters across all lines, separators excluded.
    pub fn char_count(&self) -> usize {
        self.lines.iter().map(|l| l.chars().count()).sum()
    }

    /// Lines joined with `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// HTML text extractor with a configurable tag deny-list.
#[derive(Debug, Clone)]
pub struct Extractor {
    suppressed: HashSet<String>,
    min_chars: usize,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::with_suppressed_tags(DEFAULT_SUPPRESSED_TAGS.iter().copied())
    }
}

impl Extractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the deny-list. Tag names are matched lowercase.
    pub fn with_suppressed_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            suppressed: tags
                .into_iter()
                .map(|t| t.as_ref().to_ascii_lowercase())
                .collect(),
            min_chars: MIN_DOCUMENT_CHARS,
        }
    }

    pub fn is_suppressed(&self, tag: &str) -> bool {
        self.suppressed.contains(tag)
    }

    /// Extract a document, or `None` when the page carries too little text.
    pub fn extract(&self, source_url: &str, raw: &str) -> Option<TextDocument> {
        self.try_extract(source_url, raw).ok()
    }

    /// Like [`Extractor::extract`] but reports why a page was rejected.
    pub fn try_extract(&self, source_url: &str, raw: &str) -> Result<TextDocument, ExtractError> {
        if raw.trim().is_empty() {
            return Err(ExtractError::NoContentRoot);
        }

        let document = Html::parse_document(raw);
        let body_selector = Selector::parse("body").expect("body selector is valid");
        let body = document
            .select(&body_selector)
            .next()
            .ok_or(ExtractError::NoContentRoot)?;

        let mut buffer = LineBuffer::default();
        for child in body.children() {
            self.walk(child, &mut buffer);
        }
        TextDocument::checked(source_url, dedup_lines(buffer.finish()), self.min_chars)
    }

    fn walk(&self, node: ego_tree::NodeRef<'_, Node>, buffer: &mut LineBuffer) {
        match node.value() {
            Node::Text(text) => buffer.push_text(text),
            Node::Element(element) => {
                let name = element.name();
                if self.is_suppressed(name) {
                    return;
                }
                let block = BLOCK_TAGS.contains(&name);
                if block {
                    buffer.break_line();
                }
                for child in node.children() {
                    self.walk(child, buffer);
                }
                if block {
                    buffer.break_line();
                }
            }
            _ => {}
        }
    }
}

/// Accumulates inline text and cuts it into lines at block boundaries.
#[derive(Default)]
struct LineBuffer {
    current: String,
    lines: Vec<String>,
}

impl LineBuffer {
    fn push_text(&mut self, text: &str) {
        self.current.push_str(text);
    }

    fn break_line(&mut self) {
        let line = self.current.split_whitespace().collect::<Vec<_>>().join(" ");
        if !line.is_empty() {
            self.lines.push(line);
        }
        self.current.clear();
    }

    fn finish(mut self) -> Vec<String> {
        self.break_line();
        self.lines
    }
}

/// Keep the first occurrence of each line, in order.
fn dedup_lines(lines: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    lines
        .into_iter()
        .filter(|line| seen.insert(line.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <!DOCTYPE html>
        <html>
        <head><title>Title</title><style>body { color: red; }</style></head>
        <body>
            <header>Site header that should be suppressed</header>
            <nav><a href="/">首页</a> <a href="/news">新闻</a></nav>
            <div class="menu">首页 | 新闻 | 联系我们</div>
            <h1>苹果发布新品</h1>
            <p>苹果公司今天在发布会上发布了新品，包括新款 <b>iPhone</b> 和其他设备。</p>
            <script>var tracking = "should not appear";</script>
            <p>发布会吸引了大量媒体关注，现场气氛热烈。</p>
            <div class="menu">首页 | 新闻 | 联系我们</div>
            <iframe src="https://ads.example.com"></iframe>
            <footer>Copyright footer text</footer>
        </body>
        </html>
    "#;

    fn html_with_body(body: &str) -> String {
        format!("<html><head><title>t</title></head><body>{}</body></html>", body)
    }

    #[test]
    fn test_suppresses_non_content_tags() {
        let doc = Extractor::new().extract("https://example.com", PAGE).unwrap();
        let text = doc.text();
        assert!(text.contains("苹果发布新品"));
        assert!(text.contains("iPhone"));
        assert!(!text.contains("Site header"));
        assert!(!text.contains("tracking"));
        assert!(!text.contains("color: red"));
        assert!(!text.contains("Copyright"));
        assert!(!text.contains("Title"));
    }

    #[test]
    fn test_block_elements_become_lines() {
        let doc = Extractor::new().extract("u", PAGE).unwrap();
        assert_eq!(
            doc.lines(),
            &[
                "首页 | 新闻 | 联系我们".to_string(),
                "苹果发布新品".to_string(),
                "苹果公司今天在发布会上发布了新品，包括新款 iPhone 和其他设备。".to_string(),
                "发布会吸引了大量媒体关注，现场气氛热烈。".to_string(),
            ]
        );
    }

    #[test]
    fn test_dedup_keeps_first_occurrence() {
        let body = "<p>menu line</p><p>first paragraph with some words</p>\
                    <p>menu line</p><p>second paragraph with more words in it</p>";
        let doc = Extractor::new().extract("u", &html_with_body(body)).unwrap();
        assert_eq!(
            doc.lines(),
            &[
                "menu line".to_string(),
                "first paragraph with some words".to_string(),
                "second paragraph with more words in it".to_string(),
            ]
        );
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let extractor = Extractor::new();
        let a = extractor.extract("u", PAGE).unwrap();
        let b = extractor.extract("u", PAGE).unwrap();
        assert_eq!(a.text().as_bytes(), b.text().as_bytes());
    }

    #[test]
    fn test_floor_boundary() {
        let extractor = Extractor::new();

        let short = "a".repeat(49);
        let result = extractor.try_extract("u", &html_with_body(&format!("<p>{}</p>", short)));
        assert_eq!(result, Err(ExtractError::BelowFloor { chars: 49 }));

        let exact = "a".repeat(50);
        let doc = extractor
            .extract("u", &html_with_body(&format!("<p>{}</p>", exact)))
            .unwrap();
        assert_eq!(doc.char_count(), 50);
    }

    #[test]
    fn test_floor_counts_chars_not_bytes() {
        // 20 CJK chars are 60 bytes but still below the floor.
        let text = "测".repeat(20);
        let result = Extractor::new().try_extract("u", &html_with_body(&format!("<p>{}</p>", text)));
        assert_eq!(result, Err(ExtractError::BelowFloor { chars: 20 }));
    }

    #[test]
    fn test_empty_body_is_rejected() {
        let extractor = Extractor::new();
        assert_eq!(
            extractor.try_extract("u", &html_with_body("")),
            Err(ExtractError::NoContentRoot)
        );
        assert_eq!(
            extractor.try_extract("u", "   "),
            Err(ExtractError::NoContentRoot)
        );
        assert!(extractor
            .extract("u", &html_with_body("<script>only script</script>"))
            .is_none());
    }

    #[test]
    fn test_malformed_markup_tolerated() {
        let raw = "<html><body><div><p>unclosed paragraph with plenty of text inside it\
                   <div>another block that is never closed either";
        let doc = Extractor::new().extract("u", raw).unwrap();
        assert_eq!(doc.lines().len(), 2);
    }

    #[test]
    fn test_from_lines_normalizes() {
        let doc = TextDocument::from_lines(
            "file.txt",
            ["  第一行文字内容  ", "", "第一行文字内容", "second line with enough latin text to pass the floor"],
        )
        .unwrap();
        assert_eq!(doc.lines().len(), 2);
        assert_eq!(doc.lines()[0], "第一行文字内容");

        let short = TextDocument::from_lines("file.txt", ["too short"]);
        assert_eq!(short, Err(ExtractError::BelowFloor { chars: 9 }));
    }

    #[test]
    fn test_custom_suppression_list() {
        let body = "<aside>sidebar text that is long enough to count</aside>\
                    <p>main body text which is also reasonably long right here</p>";
        let extractor = Extractor::with_suppressed_tags(["aside", "script"]);
        let doc = extractor.extract("u", &html_with_body(body)).unwrap();
        assert_eq!(doc.lines().len(), 1);
        assert!(doc.text().starts_with("main body"));
    }
}
