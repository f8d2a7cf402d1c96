//! Classifier configuration.
//!
//! Every value is externally configurable without code changes, either by
//! deserializing a [`ClassifierConfig`] or through environment variables via
//! [`ClassifierConfig::from_env`]. Misconfiguration fails fast: both
//! constructors validate and return [`Error::Config`].

use std::env;
use std::time::Duration;

use nuclear_core::defaults;
use nuclear_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// Environment variable for [`ClassifierConfig::primary_relationship_cap`].
pub const ENV_PRIMARY_RELATIONSHIP_CAP: &str = "NUCLEAR_PRIMARY_RELATIONSHIP_CAP";
/// Environment variable for [`ClassifierConfig::background_keywords`] (comma-separated).
pub const ENV_BACKGROUND_KEYWORDS: &str = "NUCLEAR_BACKGROUND_KEYWORDS";
/// Environment variable for [`ClassifierConfig::gen_relationship_names`] (comma-separated).
pub const ENV_GEN_RELATIONSHIPS: &str = "NUCLEAR_GEN_RELATIONSHIPS";
/// Environment variable for [`ClassifierConfig::tag_spam_threshold`].
pub const ENV_TAG_SPAM_THRESHOLD: &str = "NUCLEAR_TAG_SPAM_THRESHOLD";
/// Environment variable for [`ClassifierConfig::synonym_lookup_timeout_ms`].
pub const ENV_SYNONYM_TIMEOUT_MS: &str = "NUCLEAR_SYNONYM_TIMEOUT_MS";

/// Configuration for prominence classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Maximum number of primary relationship tags per work. Must be at least 1.
    pub primary_relationship_cap: usize,

    /// Keywords marking a relationship as background/minor, matched as whole
    /// words, case-insensitively. An empty list disables background detection.
    pub background_keywords: Vec<String>,

    /// Relationship names denoting gen fiction; these are never parsed for
    /// character names.
    pub gen_relationship_names: Vec<String>,

    /// Total tag count above which a work is flagged as potential tag spam.
    pub tag_spam_threshold: usize,

    /// Upper bound for a single synonym lookup, in milliseconds.
    pub synonym_lookup_timeout_ms: u64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            primary_relationship_cap: defaults::PRIMARY_RELATIONSHIP_CAP,
            background_keywords: to_owned_list(defaults::BACKGROUND_KEYWORDS),
            gen_relationship_names: to_owned_list(defaults::GEN_RELATIONSHIP_NAMES),
            tag_spam_threshold: defaults::TAG_SPAM_THRESHOLD,
            synonym_lookup_timeout_ms: defaults::SYNONYM_LOOKUP_TIMEOUT_MS,
        }
    }
}

impl ClassifierConfig {
    /// Constructs a configuration from environment variables.
    ///
    /// Unset variables keep their defaults. Set but malformed variables are a
    /// configuration error rather than a silent fallback:
    /// - `NUCLEAR_PRIMARY_RELATIONSHIP_CAP` (default: 2)
    /// - `NUCLEAR_BACKGROUND_KEYWORDS` (default: `background,past,minor,implied,one-sided`)
    /// - `NUCLEAR_GEN_RELATIONSHIPS` (default: `gen,no romantic pairings`)
    /// - `NUCLEAR_TAG_SPAM_THRESHOLD` (default: 25)
    /// - `NUCLEAR_SYNONYM_TIMEOUT_MS` (default: 500)
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(cap) = parse_cap_env(ENV_PRIMARY_RELATIONSHIP_CAP)? {
            config.primary_relationship_cap = cap;
        }
        if let Some(keywords) = parse_list_env(ENV_BACKGROUND_KEYWORDS) {
            config.background_keywords = keywords;
        }
        if let Some(names) = parse_list_env(ENV_GEN_RELATIONSHIPS) {
            config.gen_relationship_names = names;
        }
        if let Some(threshold) = parse_number_env::<usize>(ENV_TAG_SPAM_THRESHOLD)? {
            config.tag_spam_threshold = threshold;
        }
        if let Some(timeout) = parse_number_env::<u64>(ENV_SYNONYM_TIMEOUT_MS)? {
            config.synonym_lookup_timeout_ms = timeout;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for deployment mistakes.
    pub fn validate(&self) -> Result<()> {
        if self.primary_relationship_cap == 0 {
            return Err(Error::Config(
                "primary_relationship_cap must be at least 1".to_string(),
            ));
        }

        for (i, keyword) in self.background_keywords.iter().enumerate() {
            let trimmed = keyword.trim();
            if trimmed.is_empty() {
                return Err(Error::Config(format!(
                    "background_keywords[{}] is blank",
                    i
                )));
            }
            if !trimmed.chars().any(char::is_alphanumeric) {
                return Err(Error::Config(format!(
                    "background_keywords[{}] ({:?}) contains no word characters",
                    i, keyword
                )));
            }
        }

        if self.gen_relationship_names.iter().any(|n| n.trim().is_empty()) {
            return Err(Error::Config(
                "gen_relationship_names contains a blank entry".to_string(),
            ));
        }

        if self.synonym_lookup_timeout_ms == 0 {
            return Err(Error::Config(
                "synonym_lookup_timeout_ms must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Builder-style override for the primary relationship cap.
    pub fn with_cap(mut self, cap: usize) -> Self {
        self.primary_relationship_cap = cap;
        self
    }

    /// Builder-style override for the background keyword list.
    pub fn with_background_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.background_keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style override for the tag spam threshold.
    pub fn with_tag_spam_threshold(mut self, threshold: usize) -> Self {
        self.tag_spam_threshold = threshold;
        self
    }

    /// Builder-style override for the synonym lookup timeout.
    pub fn with_synonym_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.synonym_lookup_timeout_ms = timeout_ms;
        self
    }

    /// The synonym lookup timeout as a [`Duration`].
    pub fn synonym_lookup_timeout(&self) -> Duration {
        Duration::from_millis(self.synonym_lookup_timeout_ms)
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Parses the cap. Signed parsing so that "-1" reports as non-positive rather
/// than as garbage.
fn parse_cap_env(key: &str) -> Result<Option<usize>> {
    let Some(raw) = env::var(key).ok() else {
        return Ok(None);
    };
    let value: i64 = raw.trim().parse().map_err(|_| {
        Error::Config(format!("{} must be an integer, got {:?}", key, raw))
    })?;
    if value <= 0 {
        return Err(Error::Config(format!(
            "{} must be at least 1, got {}",
            key, value
        )));
    }
    usize::try_from(value)
        .map(Some)
        .map_err(|_| Error::Config(format!("{} is out of range: {}", key, value)))
}

fn parse_number_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().map(Some).map_err(|_| {
            Error::Config(format!("{} must be a non-negative integer, got {:?}", key, raw))
        }),
        Err(_) => Ok(None),
    }
}

/// Parses a comma-separated list, trimming entries.
///
/// Blank entries are kept so that `validate` reports them.
fn parse_list_env(key: &str) -> Option<Vec<String>> {
    let raw = env::var(key).ok()?;
    if raw.trim().is_empty() {
        return Some(Vec::new());
    }
    Some(raw.split(',').map(|s| s.trim().to_string()).collect())
}
