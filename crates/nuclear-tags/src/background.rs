//! Background/minor relationship detection.
//!
//! A relationship tag whose name contains a configured keyword as a whole
//! word ("Background Ron/Hermione", "Past Sirius/Remus") is background
//! material and defaults to micro prominence.
//!
//! Matching is case-insensitive and respects Unicode word boundaries:
//! "Backgrounder/Foregrounder" does not match `background`, "Pasta/Pesto"
//! does not match `past`. Hyphenated keywords such as `one-sided` match as
//! a unit.

use nuclear_core::{Error, Result};
use regex::{Regex, RegexBuilder};

/// Compiled whole-word matcher over the configured keywords.
#[derive(Debug, Clone)]
pub struct BackgroundMatcher {
    pattern: Option<Regex>,
    keywords: Vec<String>,
}

impl BackgroundMatcher {
    /// Compile a matcher. An empty keyword list yields a matcher that never
    /// matches.
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Result<Self> {
        let keywords: Vec<String> = keywords
            .iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .collect();

        if keywords.is_empty() {
            return Ok(Self {
                pattern: None,
                keywords,
            });
        }

        let alternation = keywords
            .iter()
            .map(|k| regex::escape(k))
            .collect::<Vec<_>>()
            .join("|");

        // Explicit guards instead of \b: keywords may start or end with
        // punctuation, where \b would require a word character outside.
        let pattern = RegexBuilder::new(&format!(r"(?:^|[^\w])(?:{})(?:$|[^\w])", alternation))
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::Config(format!("invalid background keywords: {}", e)))?;

        Ok(Self {
            pattern: Some(pattern),
            keywords,
        })
    }

    /// Whether `tag_name` contains any keyword as a whole word.
    pub fn is_background(&self, tag_name: &str) -> bool {
        self.matched_keyword(tag_name).is_some()
    }

    /// The first keyword (in configured order) found in `tag_name`.
    pub fn matched_keyword(&self, tag_name: &str) -> Option<&str> {
        let pattern = self.pattern.as_ref()?;
        if !pattern.is_match(tag_name) {
            return None;
        }
        let lowered = tag_name.to_lowercase();
        self.keywords
            .iter()
            .find(|kw| contains_whole_word(&lowered, kw))
            .map(String::as_str)
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

/// Whole-word containment on already-lowercased input.
pub(crate) fn contains_whole_word(haystack: &str, word: &str) -> bool {
    if word.is_empty() {
        return false;
    }
    haystack.match_indices(word).any(|(start, matched)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + matched.len()..].chars().next();
        !before.is_some_and(is_word_char) && !after.is_some_and(is_word_char)
    })
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
