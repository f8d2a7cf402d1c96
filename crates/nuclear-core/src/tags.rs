//! Tag and work-tag types.
//!
//! A [`Tag`] is a canonical or synonym string labeled with a [`TagKind`].
//! A [`WorkTag`] is the assignment of a tag to a work, carrying the
//! [`Prominence`] readers filter on.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// ENUMS
// =============================================================================

/// Tag kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagKind {
    Fandom,
    Character,
    Relationship,
    Freeform,
    Rating,
    Warning,
    Category,
}

impl TagKind {
    /// Whether tags of this kind take part in prominence classification.
    pub fn is_classified(&self) -> bool {
        matches!(self, Self::Relationship | Self::Character)
    }
}

impl std::fmt::Display for TagKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fandom => write!(f, "fandom"),
            Self::Character => write!(f, "character"),
            Self::Relationship => write!(f, "relationship"),
            Self::Freeform => write!(f, "freeform"),
            Self::Rating => write!(f, "rating"),
            Self::Warning => write!(f, "warning"),
            Self::Category => write!(f, "category"),
        }
    }
}

impl std::str::FromStr for TagKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fandom" => Ok(Self::Fandom),
            "character" => Ok(Self::Character),
            "relationship" => Ok(Self::Relationship),
            // "additional" tags are freeforms under another name
            "freeform" | "additional" | "additional_tags" => Ok(Self::Freeform),
            "rating" => Ok(Self::Rating),
            "warning" => Ok(Self::Warning),
            "category" => Ok(Self::Category),
            _ => Err(format!("Invalid tag kind: {}", s)),
        }
    }
}

/// How central a relationship or character tag is to a work.
///
/// Ordered from most to least central, so `Primary < Secondary < Micro`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum Prominence {
    /// The main pairing(s) or focus characters.
    Primary,

    /// Present but not the focus. Default for tags never explicitly set.
    #[default]
    Secondary,

    /// Background, past, or implied.
    Micro,
}

impl std::fmt::Display for Prominence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
            Self::Secondary => write!(f, "secondary"),
            Self::Micro => write!(f, "micro"),
        }
    }
}

impl std::str::FromStr for Prominence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "primary" => Ok(Self::Primary),
            "secondary" => Ok(Self::Secondary),
            "micro" => Ok(Self::Micro),
            _ => Err(format!("Invalid prominence: {}", s)),
        }
    }
}

// =============================================================================
// TAG RECORDS
// =============================================================================

/// A tag record as held by the tag store.
///
/// A tag's kind is fixed at creation; there is no setter. Re-kinding a tag
/// means deleting it and creating a new one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    id: Uuid,
    name: String,
    kind: TagKind,
    /// Canonical tag this one is a synonym of. `None` for canonical tags.
    #[serde(skip_serializing_if = "Option::is_none")]
    canonical_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl Tag {
    /// Create a new canonical tag.
    pub fn new(name: impl Into<String>, kind: TagKind) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            kind,
            canonical_id: None,
            created_at: Utc::now(),
        }
    }

    /// Create a synonym of `canonical`. The synonym inherits the canonical kind.
    pub fn synonym_of(name: impl Into<String>, canonical: &Tag) -> Self {
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            kind: canonical.kind,
            canonical_id: Some(canonical.canonical_or_self()),
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> TagKind {
        self.kind
    }

    pub fn canonical_id(&self) -> Option<Uuid> {
        self.canonical_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_canonical(&self) -> bool {
        self.canonical_id.is_none()
    }

    /// The id of the canonical tag this tag resolves to (its own id if canonical).
    pub fn canonical_or_self(&self) -> Uuid {
        self.canonical_id.unwrap_or(self.id)
    }
}

/// A resolved canonical tag, as returned by synonym resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalTag {
    pub id: Uuid,
    pub name: String,
    pub kind: TagKind,
}

impl From<&Tag> for CanonicalTag {
    fn from(tag: &Tag) -> Self {
        Self {
            id: tag.id(),
            name: tag.name().to_string(),
            kind: tag.kind(),
        }
    }
}

// =============================================================================
// WORK TAG ASSIGNMENTS
// =============================================================================

/// A tag attached to a work, as supplied by the work store.
///
/// The order of a work's tag list is its insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkTag {
    pub name: String,
    pub kind: TagKind,
    /// Current prominence. `None` when it has never been set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prominence: Option<Prominence>,
    /// Whether the author chose this prominence explicitly.
    #[serde(default)]
    pub is_user_set: bool,
}

impl WorkTag {
    pub fn new(name: impl Into<String>, kind: TagKind) -> Self {
        Self {
            name: name.into(),
            kind,
            prominence: None,
            is_user_set: false,
        }
    }

    pub fn relationship(name: impl Into<String>) -> Self {
        Self::new(name, TagKind::Relationship)
    }

    pub fn character(name: impl Into<String>) -> Self {
        Self::new(name, TagKind::Character)
    }

    /// Set a prominence that was assigned automatically.
    pub fn with_prominence(mut self, prominence: Prominence) -> Self {
        self.prominence = Some(prominence);
        self.is_user_set = false;
        self
    }

    /// Set a prominence the author chose explicitly.
    pub fn user_set(mut self, prominence: Prominence) -> Self {
        self.prominence = Some(prominence);
        self.is_user_set = true;
        self
    }

    /// Prominence with the default applied for never-set tags.
    pub fn effective_prominence(&self) -> Prominence {
        self.prominence.unwrap_or_default()
    }
}

/// Normalize a tag or character name for comparison.
///
/// Lowercases and collapses every run of whitespace into a single space.
pub fn normalize_tag_name(name: &str) -> String {
    name.split_whitespace()
        .map(|part| part.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}
