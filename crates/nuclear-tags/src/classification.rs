//! Classification result types.

use nuclear_core::{Prominence, TagKind, WorkTag};
use serde::{Deserialize, Serialize};

use crate::advisory::Advisory;
use crate::missing_characters::MissingCharacter;

/// Classification outcome for one relationship or character tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedTag {
    pub name: String,
    pub kind: TagKind,
    pub prominence: Prominence,
    /// True when the prominence did not come from an explicit author choice.
    pub auto_assigned: bool,
    /// Whether the prominence is still the author's explicit choice.
    pub is_user_set: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub advisories: Vec<Advisory>,
}

impl ClassifiedTag {
    pub(crate) fn from_work_tag(tag: &WorkTag) -> Self {
        Self {
            name: tag.name.clone(),
            kind: tag.kind,
            prominence: tag.effective_prominence(),
            auto_assigned: !tag.is_user_set,
            is_user_set: tag.is_user_set,
            advisories: Vec::new(),
        }
    }

    pub fn is_relationship(&self) -> bool {
        self.kind == TagKind::Relationship
    }

    /// Advisory messages for display.
    pub fn advisory_messages(&self) -> Vec<String> {
        self.advisories.iter().map(Advisory::message).collect()
    }

    /// The assignment to persist back to the work store.
    pub fn to_work_tag(&self) -> WorkTag {
        WorkTag {
            name: self.name.clone(),
            kind: self.kind,
            prominence: Some(self.prominence),
            is_user_set: self.is_user_set,
        }
    }
}

/// Per-work prominence counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProminenceSummary {
    pub primary_relationship_count: usize,
    pub secondary_relationship_count: usize,
    pub micro_relationship_count: usize,
    /// All tags on the work, of every kind.
    pub total_tag_count: usize,
    pub potential_tag_spam: bool,
}

impl ProminenceSummary {
    pub(crate) fn compute(
        tags: &[ClassifiedTag],
        total_tag_count: usize,
        spam_threshold: usize,
    ) -> Self {
        let mut summary = Self {
            total_tag_count,
            potential_tag_spam: total_tag_count > spam_threshold,
            ..Self::default()
        };
        for tag in tags.iter().filter(|t| t.is_relationship()) {
            match tag.prominence {
                Prominence::Primary => summary.primary_relationship_count += 1,
                Prominence::Secondary => summary.secondary_relationship_count += 1,
                Prominence::Micro => summary.micro_relationship_count += 1,
            }
        }
        summary
    }
}

/// Transient classification result for one work. Never persisted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProminenceClassificationResult {
    /// Relationship and character tags in the work's tag order.
    pub tags: Vec<ClassifiedTag>,
    pub missing_characters: Vec<MissingCharacter>,
    /// Advisories about the work as a whole.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub advisories: Vec<Advisory>,
    /// True when synonym lookups were unavailable and matching used exact names only.
    pub partial: bool,
    pub summary: ProminenceSummary,
}

impl ProminenceClassificationResult {
    /// Look up a classified tag by exact name.
    pub fn tag(&self, name: &str) -> Option<&ClassifiedTag> {
        self.tags.iter().find(|t| t.name == name)
    }

    pub fn primary_relationships(&self) -> impl Iterator<Item = &ClassifiedTag> {
        self.tags
            .iter()
            .filter(|t| t.is_relationship() && t.prominence == Prominence::Primary)
    }

    /// Work-level advisories followed by per-tag advisories in tag order.
    pub fn all_advisories(&self) -> impl Iterator<Item = &Advisory> {
        self.advisories
            .iter()
            .chain(self.tags.iter().flat_map(|t| t.advisories.iter()))
    }

    /// Assignments to persist back to the work store.
    pub fn to_work_tags(&self) -> Vec<WorkTag> {
        self.tags.iter().map(ClassifiedTag::to_work_tag).collect()
    }
}
