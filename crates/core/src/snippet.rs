use crate::cache::fingerprint;
use crate::models::Snippet;
use regex::{Regex, RegexBuilder};

/// Characters of context kept before a keyword match.
pub const LEADING_CONTEXT_CHARS: usize = 50;
/// Characters of context kept after a keyword match. Clause headings are
/// usually followed by the value that matters (a date, an amount).
pub const TRAILING_CONTEXT_CHARS: usize = 250;

/// Splits a comma-separated keyword list, dropping blanks and repeats.
pub fn parse_keywords(input: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for keyword in input.split(',').map(str::trim) {
        if keyword.is_empty() || keywords.iter().any(|known| known == keyword) {
            continue;
        }
        keywords.push(keyword.to_string());
    }
    keywords
}

/// A keyword compiled for case-insensitive literal search.
#[derive(Debug, Clone)]
pub struct KeywordPattern {
    keyword: String,
    regex: Regex,
}

impl KeywordPattern {
    pub fn new(keyword: &str) -> Result<Self, regex::Error> {
        let regex = RegexBuilder::new(&regex::escape(keyword))
            .case_insensitive(true)
            .build()?;

        Ok(Self {
            keyword: keyword.to_string(),
            regex,
        })
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Returns the trimmed context window around the first match.
    ///
    /// Only the first occurrence is considered; later occurrences of the
    /// same keyword in the document never produce a snippet.
    pub fn locate<'t>(&self, full_text: &'t str) -> Option<&'t str> {
        if self.keyword.is_empty() {
            return None;
        }

        let found = self.regex.find(full_text)?;
        let snippet = context_window(full_text, found.start(), found.end()).trim();
        if snippet.is_empty() {
            None
        } else {
            Some(snippet)
        }
    }

    pub fn snippet(&self, contract_id: &str, full_text: &str) -> Option<Snippet> {
        self.locate(full_text).map(|text| Snippet {
            contract_id: contract_id.to_string(),
            keyword: self.keyword.clone(),
            text: text.to_string(),
            fingerprint: fingerprint(text),
        })
    }
}

pub fn locate(full_text: &str, keyword: &str) -> Option<String> {
    KeywordPattern::new(keyword)
        .ok()?
        .locate(full_text)
        .map(str::to_string)
}

/// Byte range `[start, end)` widened by the context constants, counted in
/// characters and clamped to the text.
fn context_window(full_text: &str, start: usize, end: usize) -> &str {
    let from = full_text[..start]
        .char_indices()
        .rev()
        .take(LEADING_CONTEXT_CHARS)
        .last()
        .map_or(start, |(index, _)| index);

    let to = full_text[end..]
        .char_indices()
        .nth(TRAILING_CONTEXT_CHARS)
        .map_or(full_text.len(), |(index, _)| end + index);

    &full_text[from..to]
}
