//! Relationship name parsing.
//!
//! Extracts candidate character names from a relationship tag's display
//! string, e.g. `"Harry Potter/Draco Malfoy"` or
//! `"Harry Potter & Hermione Granger & Ron Weasley"`.
//!
//! # Rules
//!
//! 1. Separators are detected in priority order: `/` (romantic), `&`
//!    (platonic/familial), then a standalone `x` token surrounded by
//!    whitespace (alternative romantic notation, either case).
//! 2. The string is split on the highest-priority separator present only.
//! 3. Segments are trimmed; empty segments are dropped, so runs of
//!    separators collapse.
//! 4. Candidates are deduplicated by exact (case-sensitive) match, keeping
//!    first-seen order.
//! 5. If any segment still contains a different separator type, a name
//!    itself contains a separator character and the split would be a guess;
//!    the tag is reported as ambiguous with no candidates.
//! 6. Without a separator (or with fewer than two names left after
//!    splitting) the structure is unrecognized; whatever names remain are
//!    returned as candidates.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One or more `x` tokens, each surrounded by whitespace.
static SPACED_X: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(?:\s+x)+\s+").expect("spaced x pattern is valid"));

/// Separator types in detection priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Separator {
    /// `/` - romantic
    Slash,
    /// `&` - platonic or familial
    Ampersand,
    /// ` x ` - alternative romantic notation
    SpacedX,
}

impl Separator {
    /// All separators, highest priority first.
    pub const PRIORITY: [Separator; 3] = [Self::Slash, Self::Ampersand, Self::SpacedX];

    fn is_present_in(self, s: &str) -> bool {
        match self {
            Self::Slash => s.contains('/'),
            Self::Ampersand => s.contains('&'),
            Self::SpacedX => SPACED_X.is_match(s),
        }
    }

    fn split(self, s: &str) -> Vec<&str> {
        match self {
            Self::Slash => s.split('/').collect(),
            Self::Ampersand => s.split('&').collect(),
            Self::SpacedX => SPACED_X.split(s).collect(),
        }
    }
}

impl std::fmt::Display for Separator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Slash => write!(f, "/"),
            Self::Ampersand => write!(f, "&"),
            Self::SpacedX => write!(f, " x "),
        }
    }
}

/// How the relationship name was understood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "structure", content = "separator")]
pub enum RelationshipStructure {
    /// Split cleanly on a single separator type.
    Split(Separator),
    /// No usable separator; fewer than two names recovered.
    Unstructured,
    /// Mixed separator types; a name likely contains a separator character.
    Ambiguous,
}

/// Result of parsing one relationship name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedRelationship {
    pub structure: RelationshipStructure,
    /// Candidate character names in first-seen order, without duplicates.
    pub candidates: Vec<String>,
}

impl ParsedRelationship {
    /// Whether the candidates can be trusted as a list of character names.
    pub fn is_confident(&self) -> bool {
        matches!(self.structure, RelationshipStructure::Split(_))
    }
}

/// Parse a relationship tag name into candidate character names.
///
/// # Examples
///
/// ```
/// use nuclear_tags::relationship_parser::parse_relationship;
///
/// let parsed = parse_relationship("Harry Potter/Draco Malfoy");
/// assert_eq!(parsed.candidates, vec!["Harry Potter", "Draco Malfoy"]);
///
/// let parsed = parse_relationship("Character A x Character B");
/// assert_eq!(parsed.candidates, vec!["Character A", "Character B"]);
/// ```
pub fn parse_relationship(name: &str) -> ParsedRelationship {
    let Some(separator) = Separator::PRIORITY
        .into_iter()
        .find(|sep| sep.is_present_in(name))
    else {
        return ParsedRelationship {
            structure: RelationshipStructure::Unstructured,
            candidates: dedup_segments(std::iter::once(name)),
        };
    };

    let segments = separator.split(name);

    // Whitespace left around a segment by the split belongs to the
    // separator, not the name: "Malcolm X & Betty" must not see " X ".
    let mixed = segments.iter().any(|segment| {
        let name = segment.trim();
        Separator::PRIORITY
            .into_iter()
            .filter(|other| *other != separator)
            .any(|other| other.is_present_in(name))
    });
    if mixed {
        return ParsedRelationship {
            structure: RelationshipStructure::Ambiguous,
            candidates: Vec::new(),
        };
    }

    let candidates = dedup_segments(segments.into_iter());
    let structure = if candidates.len() >= 2 {
        RelationshipStructure::Split(separator)
    } else {
        RelationshipStructure::Unstructured
    };

    ParsedRelationship {
        structure,
        candidates,
    }
}

fn dedup_segments<'a>(segments: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for segment in segments {
        let trimmed = segment.trim();
        if trimmed.is_empty() || out.iter().any(|seen| seen == trimmed) {
            continue;
        }
        out.push(trimmed.to_string());
    }
    out
}
