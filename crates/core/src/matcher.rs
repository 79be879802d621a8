//! Keyword matching over scanned document text.
//!
//! Both the text and the keywords go through [`normalize`] before matching, so
//! accents, case and line breaks in extracted text do not hide a hit.

use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::error::HitboardError;
use crate::ports::Result;

/// Folds text for comparison: strips accents, turns line and page breaks into
/// spaces, collapses whitespace and lowercases.
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| match c {
            '\r' | '\n' | '\u{0c}' | '\t' => ' ',
            c => c,
        })
        .collect();
    stripped
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Matches a fixed list of keywords as whole words.
#[derive(Debug)]
pub struct KeywordMatcher {
    keywords: Vec<(String, Regex)>,
}

impl KeywordMatcher {
    pub fn new<I, S>(keywords: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut compiled = Vec::new();
        for keyword in keywords {
            let keyword = keyword.as_ref();
            let folded = normalize(keyword);
            if folded.is_empty() {
                continue;
            }
            let pattern = format!(r"\b{}\b", regex::escape(&folded));
            let regex = Regex::new(&pattern)
                .map_err(|e| HitboardError::Pattern(format!("{}: {}", keyword, e)))?;
            compiled.push((keyword.to_string(), regex));
        }
        Ok(Self { keywords: compiled })
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn is_match(&self, text: &str) -> bool {
        let folded = normalize(text);
        self.keywords.iter().any(|(_, re)| re.is_match(&folded))
    }

    /// Keywords (as configured) found in `text`
    pub fn matched_keywords(&self, text: &str) -> Vec<&str> {
        let folded = normalize(text);
        self.keywords
            .iter()
            .filter(|(_, re)| re.is_match(&folded))
            .map(|(k, _)| k.as_str())
            .collect()
    }
}
