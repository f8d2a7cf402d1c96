//! Centralized default constants for the tag services.
//!
//! **This module is the single source of truth** for shared default values.
//! Configuration types and the CLI reference these constants instead of
//! defining their own magic numbers.

// =============================================================================
// PROMINENCE CLASSIFICATION
// =============================================================================

/// Maximum number of relationship tags a work may expose as primary.
pub const PRIMARY_RELATIONSHIP_CAP: usize = 2;

/// Keywords that mark a relationship tag as background/minor.
///
/// Matched case-insensitively as whole words.
pub const BACKGROUND_KEYWORDS: &[&str] = &["background", "past", "minor", "implied", "one-sided"];

/// Relationship tag names that denote general (non-romantic) fiction.
///
/// These carry no character names, so they are never parsed.
pub const GEN_RELATIONSHIP_NAMES: &[&str] = &["gen", "no romantic pairings"];

/// Total tag count above which a work is flagged as potential tag spam.
pub const TAG_SPAM_THRESHOLD: usize = 25;

/// Upper bound for a single synonym lookup against the tag store.
pub const SYNONYM_LOOKUP_TIMEOUT_MS: u64 = 500;

// =============================================================================
// PROMINENCE ESTIMATION
// =============================================================================

/// Estimated score at or above which a tag is suggested as primary.
pub const ESTIMATE_PRIMARY_THRESHOLD: f64 = 0.7;

/// Estimated score below which a tag is suggested as micro.
pub const ESTIMATE_MICRO_THRESHOLD: f64 = 0.2;

/// Words-per-tag ratio above which content counts as substantial.
pub const ESTIMATE_SUBSTANTIAL_WORDS_PER_TAG: f64 = 3000.0;

/// Words-per-tag ratio below which content counts as light.
pub const ESTIMATE_LIGHT_WORDS_PER_TAG: f64 = 200.0;

/// Maximum total tag count for which a gen relationship gets a boost.
pub const ESTIMATE_GEN_MAX_TAGS: usize = 5;

/// Keywords in a relationship name that mark it as the main pairing.
pub const MAIN_PAIRING_KEYWORDS: &[&str] = &["main", "central", "pairing"];

/// Substrings in a warning tag name that mark a major warning.
pub const MAJOR_WARNING_PHRASES: &[&str] = &["character death", "main character"];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cap_is_positive() {
        assert!(PRIMARY_RELATIONSHIP_CAP >= 1);
    }

    #[test]
    fn test_background_keywords_are_lowercase() {
        for kw in BACKGROUND_KEYWORDS {
            assert_eq!(*kw, kw.to_lowercase());
            assert!(!kw.trim().is_empty());
        }
    }

    #[test]
    fn test_estimate_thresholds_ordered() {
        assert!(ESTIMATE_MICRO_THRESHOLD < ESTIMATE_PRIMARY_THRESHOLD);
        assert!(ESTIMATE_LIGHT_WORDS_PER_TAG < ESTIMATE_SUBSTANTIAL_WORDS_PER_TAG);
    }
}
