//! Prominence classification orchestrator.
//!
//! Runs the classification steps for one work in a fixed order:
//!
//! 1. Background detection on every relationship tag. Tags naming a
//!    background keyword become micro unless the author set them.
//! 2. Relationship parsing and missing-character detection on every
//!    non-micro relationship tag. Gen relationships are skipped.
//! 3. Primary-relationship cap enforcement on the non-micro relationships.
//! 4. Everything else keeps its prior prominence, or secondary if never set.
//!
//! Classification never fails. A tag-store outage degrades character
//! matching to exact names and marks the result partial.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use nuclear_core::{
    normalize_tag_name, NoSynonyms, Prominence, Result, SynonymResolver, TagKind, WorkTag,
};
use tracing::{debug, info, instrument};

use crate::advisory::Advisory;
use crate::background::BackgroundMatcher;
use crate::cap::{enforce_primary_cap, RelationshipSlot};
use crate::classification::{ClassifiedTag, ProminenceClassificationResult, ProminenceSummary};
use crate::config::ClassifierConfig;
use crate::missing_characters::{find_missing_characters, CharacterIndex, SynonymLookup};
use crate::relationship_parser::{parse_relationship, RelationshipStructure};

/// Classifies work tags. Cheap to share; holds no per-work state.
pub struct Classifier {
    config: ClassifierConfig,
    background: BackgroundMatcher,
    gen_names: HashSet<String>,
    resolver: Arc<dyn SynonymResolver>,
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Classifier {
    /// Build a classifier. Fails on invalid configuration.
    pub fn new(config: ClassifierConfig, resolver: Arc<dyn SynonymResolver>) -> Result<Self> {
        config.validate()?;
        let background = BackgroundMatcher::new(&config.background_keywords)?;
        let gen_names = config
            .gen_relationship_names
            .iter()
            .map(|n| normalize_tag_name(n))
            .collect();

        debug!(
            cap = config.primary_relationship_cap,
            keywords = ?config.background_keywords,
            "Classifier configured"
        );

        Ok(Self {
            config,
            background,
            gen_names,
            resolver,
        })
    }

    /// Build a classifier that matches character names exactly, without a tag store.
    pub fn exact_only(config: ClassifierConfig) -> Result<Self> {
        Self::new(config, Arc::new(NoSynonyms))
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn background_matcher(&self) -> &BackgroundMatcher {
        &self.background
    }

    /// Whether a relationship name denotes gen fiction.
    pub fn is_gen_relationship(&self, name: &str) -> bool {
        self.gen_names.contains(&normalize_tag_name(name))
    }

    /// Classify one work's tags. Tags of kinds other than relationship and
    /// character only count toward the work's total.
    #[instrument(skip_all, fields(
        subsystem = "tags",
        component = "classifier",
        op = "classify",
        tag_count = work_tags.len(),
    ))]
    pub async fn classify(&self, work_tags: &[WorkTag]) -> ProminenceClassificationResult {
        let start = Instant::now();
        let cap = self.config.primary_relationship_cap;

        let mut tags: Vec<ClassifiedTag> = work_tags
            .iter()
            .filter(|t| t.kind.is_classified())
            .map(ClassifiedTag::from_work_tag)
            .collect();

        // Step 1: background relationships become micro.
        for tag in tags.iter_mut().filter(|t| t.is_relationship()) {
            let Some(keyword) = self.background.matched_keyword(&tag.name) else {
                continue;
            };
            if tag.is_user_set {
                debug!(tag = %tag.name, keyword, "Background keyword overridden by author");
                continue;
            }
            debug!(tag = %tag.name, keyword, "Background relationship set to micro");
            tag.prominence = Prominence::Micro;
            tag.auto_assigned = true;
            tag.advisories.push(Advisory::BackgroundRelationship {
                relationship: tag.name.clone(),
                keyword: keyword.to_string(),
            });
        }

        // Step 2: parse non-micro relationships and look for missing characters.
        let mut parsed: Vec<(usize, Vec<String>)> = Vec::new();
        for (i, tag) in tags.iter_mut().enumerate() {
            if !tag.is_relationship()
                || tag.prominence == Prominence::Micro
                || self.is_gen_relationship(&tag.name)
            {
                continue;
            }
            let relationship = parse_relationship(&tag.name);
            match relationship.structure {
                RelationshipStructure::Split(_) => {}
                RelationshipStructure::Unstructured => {
                    tag.advisories.push(Advisory::UnparsedRelationship {
                        relationship: tag.name.clone(),
                    });
                }
                RelationshipStructure::Ambiguous => {
                    tag.advisories.push(Advisory::AmbiguousRelationship {
                        relationship: tag.name.clone(),
                    });
                }
            }
            if !relationship.candidates.is_empty() {
                parsed.push((i, relationship.candidates));
            }
        }

        let mut lookup = SynonymLookup::new(
            Arc::clone(&self.resolver),
            self.config.synonym_lookup_timeout(),
        );
        let missing = {
            let character_names = tags
                .iter()
                .filter(|t| t.kind == TagKind::Character)
                .map(|t| t.name.as_str());
            let mut characters = CharacterIndex::new(character_names);
            let relationships: Vec<(&str, Vec<String>)> = parsed
                .iter()
                .map(|(i, candidates)| (tags[*i].name.as_str(), candidates.clone()))
                .collect();
            find_missing_characters(&relationships, &mut characters, &mut lookup).await
        };
        for entry in &missing {
            if let Some(tag) = tags
                .iter_mut()
                .find(|t| t.is_relationship() && t.name == entry.relationship)
            {
                tag.advisories.push(Advisory::MissingCharacter {
                    relationship: entry.relationship.clone(),
                    character: entry.character.clone(),
                });
            }
        }

        // Step 3: cap primary relationships.
        let relationship_positions: Vec<usize> = tags
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_relationship())
            .map(|(i, _)| i)
            .collect();
        let mut slots: Vec<RelationshipSlot> = relationship_positions
            .iter()
            .map(|&i| RelationshipSlot::new(tags[i].prominence, tags[i].is_user_set))
            .collect();
        let demoted = enforce_primary_cap(&mut slots, cap);
        for slot_index in &demoted {
            let tag = &mut tags[relationship_positions[*slot_index]];
            let slot = slots[*slot_index];
            tag.prominence = slot.prominence;
            tag.is_user_set = slot.is_user_set;
            tag.auto_assigned = true;
            tag.advisories.push(Advisory::DemotedToSecondary {
                relationship: tag.name.clone(),
                cap,
            });
        }

        // Work-level outcome.
        let summary =
            ProminenceSummary::compute(&tags, work_tags.len(), self.config.tag_spam_threshold);
        let mut advisories = Vec::new();
        let partial = !lookup.is_available();
        if let Some(reason) = lookup.unavailable_reason() {
            advisories.push(Advisory::SynonymLookupUnavailable {
                reason: reason.to_string(),
            });
        }
        if summary.potential_tag_spam {
            advisories.push(Advisory::PotentialTagSpam {
                tag_count: summary.total_tag_count,
                threshold: self.config.tag_spam_threshold,
            });
        }

        let result = ProminenceClassificationResult {
            tags,
            missing_characters: missing,
            advisories,
            partial,
            summary,
        };

        info!(
            demoted = demoted.len(),
            missing = result.missing_characters.len(),
            advisories = result.all_advisories().count(),
            partial,
            duration_ms = start.elapsed().as_millis() as u64,
            "Work tags classified"
        );

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> Classifier {
        Classifier::exact_only(ClassifierConfig::default()).unwrap()
    }

    #[test]
    fn test_invalid_config_fails_at_construction() {
        let err = Classifier::exact_only(ClassifierConfig::default().with_cap(0)).unwrap_err();
        assert!(matches!(err, nuclear_core::Error::Config(_)));
    }

    #[test]
    fn test_gen_names_normalized() {
        let c = classifier();
        assert!(c.is_gen_relationship("Gen"));
        assert!(c.is_gen_relationship("No  Romantic Pairings"));
        assert!(!c.is_gen_relationship("Harry/Ginny"));
    }

    #[tokio::test]
    async fn test_non_classified_kinds_excluded_but_counted() {
        let tags = vec![
            WorkTag::new("Harry Potter - J. K. Rowling", TagKind::Fandom),
            WorkTag::relationship("Harry Potter/Draco Malfoy"),
            WorkTag::new("Angst", TagKind::Freeform),
        ];
        let result = classifier().classify(&tags).await;
        assert_eq!(result.tags.len(), 1);
        assert_eq!(result.summary.total_tag_count, 3);
    }

    #[tokio::test]
    async fn test_never_set_defaults_to_secondary() {
        let tags = vec![
            WorkTag::relationship("Harry Potter/Draco Malfoy"),
            WorkTag::character("Harry Potter"),
        ];
        let result = classifier().classify(&tags).await;
        for tag in &result.tags {
            assert_eq!(tag.prominence, Prominence::Secondary);
            assert!(tag.auto_assigned);
        }
    }

    #[tokio::test]
    async fn test_character_tags_keep_prior_prominence() {
        let tags = vec![
            WorkTag::character("Harry Potter").user_set(Prominence::Primary),
            WorkTag::character("Ron Weasley").with_prominence(Prominence::Micro),
        ];
        let result = classifier().classify(&tags).await;
        assert_eq!(result.tags[0].prominence, Prominence::Primary);
        assert!(!result.tags[0].auto_assigned);
        assert_eq!(result.tags[1].prominence, Prominence::Micro);
    }

    #[tokio::test]
    async fn test_author_override_beats_background_keyword() {
        let tags = vec![WorkTag::relationship("Past Sirius Black/Remus Lupin")
            .user_set(Prominence::Primary)];
        let result = classifier().classify(&tags).await;
        let tag = &result.tags[0];
        assert_eq!(tag.prominence, Prominence::Primary);
        assert!(tag.is_user_set);
        assert!(!tag
            .advisories
            .iter()
            .any(|a| matches!(a, Advisory::BackgroundRelationship { .. })));
    }

    #[tokio::test]
    async fn test_gen_relationship_not_parsed() {
        let tags = vec![WorkTag::relationship("Gen")];
        let result = classifier().classify(&tags).await;
        assert!(result.tags[0].advisories.is_empty());
        assert!(result.missing_characters.is_empty());
    }

    #[tokio::test]
    async fn test_unstructured_relationship_gets_advisory() {
        let tags = vec![
            WorkTag::relationship("Harry Potter"),
            WorkTag::character("Harry Potter"),
        ];
        let result = classifier().classify(&tags).await;
        let messages = result.tags[0].advisory_messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("could not parse relationship structure"));
        assert!(result.missing_characters.is_empty());
    }

    #[tokio::test]
    async fn test_ambiguous_relationship_skips_character_check() {
        let tags = vec![WorkTag::relationship("Tom & Jerry/Spike")];
        let result = classifier().classify(&tags).await;
        assert!(matches!(
            result.tags[0].advisories.as_slice(),
            [Advisory::AmbiguousRelationship { .. }]
        ));
        assert!(result.missing_characters.is_empty());
    }

    #[tokio::test]
    async fn test_tag_spam_flagged() {
        let mut tags: Vec<WorkTag> = (0..30)
            .map(|i| WorkTag::new(format!("Freeform {}", i), TagKind::Freeform))
            .collect();
        tags.push(WorkTag::relationship("A/B"));
        let result = classifier().classify(&tags).await;
        assert!(result.summary.potential_tag_spam);
        assert!(result
            .advisories
            .iter()
            .any(|a| matches!(a, Advisory::PotentialTagSpam { tag_count: 31, .. })));
    }
}
