//! Advisory messages produced by classification.
//!
//! Advisories never block a work save. Their messages are phrased as
//! suggestions or notices for the author, not as errors.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Advisory {
    /// A name parsed from a relationship has no matching character tag.
    MissingCharacter {
        relationship: String,
        character: String,
    },

    /// No relationship structure could be recognized in the tag name.
    UnparsedRelationship { relationship: String },

    /// The tag mixes separator types, so the names could not be split safely.
    AmbiguousRelationship { relationship: String },

    /// The tag was set to micro because it names a background keyword.
    BackgroundRelationship {
        relationship: String,
        keyword: String,
    },

    /// The tag was moved from primary to secondary by the cap.
    DemotedToSecondary { relationship: String, cap: usize },

    /// Synonym lookups failed; character matching fell back to exact names.
    SynonymLookupUnavailable { reason: String },

    /// The work carries more tags than the spam threshold.
    PotentialTagSpam { tag_count: usize, threshold: usize },
}

impl Advisory {
    /// The relationship tag this advisory is about, if any.
    pub fn relationship(&self) -> Option<&str> {
        match self {
            Self::MissingCharacter { relationship, .. }
            | Self::UnparsedRelationship { relationship }
            | Self::AmbiguousRelationship { relationship }
            | Self::BackgroundRelationship { relationship, .. }
            | Self::DemotedToSecondary { relationship, .. } => Some(relationship),
            Self::SynonymLookupUnavailable { .. } | Self::PotentialTagSpam { .. } => None,
        }
    }

    /// User-facing message.
    pub fn message(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for Advisory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCharacter {
                relationship,
                character,
            } => write!(
                f,
                "consider adding a character tag for \"{}\" (mentioned in \"{}\")",
                character, relationship
            ),
            Self::UnparsedRelationship { relationship } => write!(
                f,
                "could not parse relationship structure of \"{}\"; consider using \"/\" or \"&\" between character names",
                relationship
            ),
            Self::AmbiguousRelationship { relationship } => write!(
                f,
                "\"{}\" mixes relationship separators, so its character names could not be checked",
                relationship
            ),
            Self::BackgroundRelationship {
                relationship,
                keyword,
            } => write!(
                f,
                "relationship \"{}\" was automatically set to micro prominence because it is marked \"{}\"",
                relationship, keyword
            ),
            Self::DemotedToSecondary { relationship, cap } => write!(
                f,
                "relationship \"{}\" was automatically moved to secondary prominence; primary is capped at {} to keep filtering useful",
                relationship, cap
            ),
            Self::SynonymLookupUnavailable { reason } => write!(
                f,
                "auto-tagging assistance was partially unavailable ({}); character suggestions used exact names only",
                reason
            ),
            Self::PotentialTagSpam {
                tag_count,
                threshold,
            } => write!(
                f,
                "this work has {} tags; consider trimming to {} or fewer so readers can find it",
                tag_count, threshold
            ),
        }
    }
}
