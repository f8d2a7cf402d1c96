//! Prominence estimation for tags that have never been assigned one.
//!
//! Used to backfill works created before prominence existed. Each tag is
//! scored from additive factors (work tag count, tag kind, name markers,
//! words per tag, chapter count) and the score is bucketed:
//!
//! | Score         | Prominence  |
//! |---------------|-------------|
//! | `>= 0.7`      | primary     |
//! | `< 0.2`       | micro       |
//! | otherwise     | secondary   |
//!
//! Estimates are suggestions. Backfilled tags go through the classifier
//! afterwards, so the primary cap and background rule still apply.

use std::collections::HashSet;

use nuclear_core::defaults::{
    ESTIMATE_GEN_MAX_TAGS, ESTIMATE_LIGHT_WORDS_PER_TAG, ESTIMATE_MICRO_THRESHOLD,
    ESTIMATE_PRIMARY_THRESHOLD, ESTIMATE_SUBSTANTIAL_WORDS_PER_TAG, MAIN_PAIRING_KEYWORDS,
    MAJOR_WARNING_PHRASES,
};
use nuclear_core::{normalize_tag_name, Prominence, Result, TagKind, WorkTag};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::background::{contains_whole_word, BackgroundMatcher};
use crate::config::ClassifierConfig;

/// Inputs for estimating one tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagContext {
    pub tag_name: String,
    pub kind: TagKind,
    pub word_count: u64,
    pub chapter_count: u32,
    /// All tags on the work, of every kind.
    pub total_tags: usize,
}

/// Why a score moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateReason {
    OnlyTag,
    FewTags,
    ManyTags,
    ModerateTags,
    MarkedAsMain,
    GenFic,
    MarkedAsBackground,
    MajorWarning,
    SubstantialContent,
    LightContent,
    ZeroWords,
    MultiChapter,
    SingleRelationship,
    PotentialTagSpam,
}

impl std::fmt::Display for EstimateReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::OnlyTag => "only tag",
            Self::FewTags => "few tags",
            Self::ManyTags => "many tags",
            Self::ModerateTags => "moderate tags",
            Self::MarkedAsMain => "marked as main",
            Self::GenFic => "gen fic",
            Self::MarkedAsBackground => "marked as background",
            Self::MajorWarning => "major warning",
            Self::SubstantialContent => "substantial content",
            Self::LightContent => "light content",
            Self::ZeroWords => "zero words",
            Self::MultiChapter => "multi-chapter",
            Self::SingleRelationship => "single relationship",
            Self::PotentialTagSpam => "potential tag spam",
        };
        write!(f, "{}", s)
    }
}

/// Estimated prominence for one tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProminenceEstimate {
    pub prominence: Prominence,
    /// Clamped to `[0.0, 1.0]`.
    pub score: f64,
    pub reasons: Vec<EstimateReason>,
    /// False when the work needs manual review.
    pub auto_assigned: bool,
}

impl ProminenceEstimate {
    pub fn has_reason(&self, reason: EstimateReason) -> bool {
        self.reasons.contains(&reason)
    }
}

/// The estimate behind one backfilled tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagEstimate {
    pub tag_name: String,
    #[serde(flatten)]
    pub estimate: ProminenceEstimate,
}

/// Outcome of backfilling one work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackfillResult {
    /// The work's tags in input order, unset prominences filled in.
    pub tags: Vec<WorkTag>,
    /// One entry per filled tag, in tag order.
    pub estimates: Vec<TagEstimate>,
}

impl BackfillResult {
    /// Whether any estimate was flagged for manual review.
    pub fn needs_review(&self) -> bool {
        self.estimates.iter().any(|e| !e.estimate.auto_assigned)
    }

    pub fn estimate_for(&self, tag_name: &str) -> Option<&ProminenceEstimate> {
        self.estimates
            .iter()
            .find(|e| e.tag_name == tag_name)
            .map(|e| &e.estimate)
    }
}

/// Scores unassigned tags.
#[derive(Debug, Clone)]
pub struct ProminenceEstimator {
    background: BackgroundMatcher,
    gen_names: HashSet<String>,
    spam_threshold: usize,
}

impl ProminenceEstimator {
    pub fn new(config: &ClassifierConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            background: BackgroundMatcher::new(&config.background_keywords)?,
            gen_names: config
                .gen_relationship_names
                .iter()
                .map(|n| normalize_tag_name(n))
                .collect(),
            spam_threshold: config.tag_spam_threshold,
        })
    }

    pub fn estimate(&self, ctx: &TagContext) -> ProminenceEstimate {
        let mut score = 0.0_f64;
        let mut reasons = Vec::new();
        let lowered = ctx.tag_name.to_lowercase();

        match ctx.total_tags {
            1 => {
                score += 0.4;
                reasons.push(EstimateReason::OnlyTag);
            }
            n if n <= 3 => {
                score += 0.3;
                reasons.push(EstimateReason::FewTags);
            }
            n if n > 20 => {
                score -= 0.2;
                reasons.push(EstimateReason::ManyTags);
            }
            n if n > 15 => {
                score -= 0.1;
                reasons.push(EstimateReason::ModerateTags);
            }
            _ => {}
        }

        let mut background = false;
        match ctx.kind {
            TagKind::Relationship => {
                score += 0.3;
                if MAIN_PAIRING_KEYWORDS
                    .iter()
                    .any(|kw| contains_whole_word(&lowered, kw))
                {
                    score += 0.5;
                    reasons.push(EstimateReason::MarkedAsMain);
                }
                if self.gen_names.contains(&normalize_tag_name(&ctx.tag_name))
                    && ctx.total_tags <= ESTIMATE_GEN_MAX_TAGS
                {
                    score += 0.5;
                    reasons.push(EstimateReason::GenFic);
                }
                if self.background.is_background(&ctx.tag_name) {
                    background = true;
                    score -= 0.6;
                    reasons.push(EstimateReason::MarkedAsBackground);
                }
            }
            TagKind::Warning => {
                score += 0.2;
                if MAJOR_WARNING_PHRASES.iter().any(|p| lowered.contains(p)) {
                    score += 0.3;
                    reasons.push(EstimateReason::MajorWarning);
                }
            }
            _ => {}
        }

        if ctx.word_count > 0 {
            let words_per_tag = ctx.word_count as f64 / ctx.total_tags.max(1) as f64;
            if words_per_tag > ESTIMATE_SUBSTANTIAL_WORDS_PER_TAG {
                score += 0.2;
                reasons.push(EstimateReason::SubstantialContent);
            } else if words_per_tag < ESTIMATE_LIGHT_WORDS_PER_TAG {
                score -= 0.1;
                reasons.push(EstimateReason::LightContent);
            }
        } else {
            reasons.push(EstimateReason::ZeroWords);
        }

        if ctx.chapter_count > 1 {
            score += if ctx.chapter_count >= 5 { 0.3 } else { 0.2 };
            reasons.push(EstimateReason::MultiChapter);
        }

        let mut prominence = if score >= ESTIMATE_PRIMARY_THRESHOLD {
            Prominence::Primary
        } else if score < ESTIMATE_MICRO_THRESHOLD {
            Prominence::Micro
        } else {
            Prominence::Secondary
        };

        if ctx.total_tags == 1 && ctx.kind == TagKind::Relationship {
            prominence = Prominence::Primary;
            reasons.push(EstimateReason::SingleRelationship);
        }

        let mut auto_assigned = true;
        if ctx.total_tags > self.spam_threshold {
            auto_assigned = false;
            reasons.push(EstimateReason::PotentialTagSpam);
            if prominence != Prominence::Primary && !background {
                prominence = Prominence::Secondary;
            }
        }

        ProminenceEstimate {
            prominence,
            score: score.clamp(0.0, 1.0),
            reasons,
            auto_assigned,
        }
    }

    /// Fill in prominence for relationship and character tags that have
    /// never been set. Tags with a prominence are returned unchanged.
    ///
    /// The estimates behind each filled tag are returned too, so callers can
    /// persist scores and route works needing review to a moderator.
    pub fn backfill(
        &self,
        tags: &[WorkTag],
        word_count: u64,
        chapter_count: u32,
    ) -> BackfillResult {
        let total_tags = tags.len();
        let mut estimates = Vec::new();

        let filled = tags
            .iter()
            .map(|tag| {
                if tag.prominence.is_some() || !tag.kind.is_classified() {
                    return tag.clone();
                }
                let estimate = self.estimate(&TagContext {
                    tag_name: tag.name.clone(),
                    kind: tag.kind,
                    word_count,
                    chapter_count,
                    total_tags,
                });
                let prominence = estimate.prominence;
                estimates.push(TagEstimate {
                    tag_name: tag.name.clone(),
                    estimate,
                });
                tag.clone().with_prominence(prominence)
            })
            .collect();

        let result = BackfillResult {
            tags: filled,
            estimates,
        };
        debug!(
            total_tags,
            filled = result.estimates.len(),
            needs_review = result.needs_review(),
            "Prominence backfilled"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator() -> ProminenceEstimator {
        ProminenceEstimator::new(&ClassifierConfig::default()).unwrap()
    }

    fn ctx(name: &str, kind: TagKind, total_tags: usize) -> TagContext {
        TagContext {
            tag_name: name.to_string(),
            kind,
            word_count: 0,
            chapter_count: 1,
            total_tags,
        }
    }

    #[test]
    fn test_single_relationship_is_primary() {
        let est = estimator().estimate(&ctx("Harry Potter/Draco Malfoy", TagKind::Relationship, 1));
        assert_eq!(est.prominence, Prominence::Primary);
        assert!(est.has_reason(EstimateReason::OnlyTag));
        assert!(est.has_reason(EstimateReason::SingleRelationship));
        assert!(est.auto_assigned);
    }

    #[test]
    fn test_background_relationship_is_micro() {
        let mut c = ctx("Background Ron Weasley/Hermione Granger", TagKind::Relationship, 10);
        c.word_count = 5000;
        let est = estimator().estimate(&c);
        assert_eq!(est.prominence, Prominence::Micro);
        assert_eq!(est.score, 0.0);
        assert!(est.has_reason(EstimateReason::MarkedAsBackground));
    }

    #[test]
    fn test_gen_with_few_tags_is_primary() {
        let est = estimator().estimate(&ctx("Gen", TagKind::Relationship, 3));
        assert_eq!(est.prominence, Prominence::Primary);
        assert!(est.has_reason(EstimateReason::GenFic));
        assert_eq!(est.score, 1.0);
    }

    #[test]
    fn test_gen_with_many_tags_gets_no_boost() {
        let est = estimator().estimate(&ctx("Gen", TagKind::Relationship, 10));
        assert!(!est.has_reason(EstimateReason::GenFic));
        assert_eq!(est.prominence, Prominence::Secondary);
    }

    #[test]
    fn test_main_pairing_marker() {
        let est = estimator().estimate(&ctx("Main Pairing: Alex/Sam", TagKind::Relationship, 10));
        assert!(est.has_reason(EstimateReason::MarkedAsMain));
        assert_eq!(est.prominence, Prominence::Primary);
    }

    #[test]
    fn test_major_warning_is_secondary() {
        let est = estimator().estimate(&ctx("Major Character Death", TagKind::Warning, 10));
        assert!(est.has_reason(EstimateReason::MajorWarning));
        assert_eq!(est.prominence, Prominence::Secondary);
    }

    #[test]
    fn test_long_multi_chapter_work_boosts_relationship() {
        let mut c = ctx("Alex/Sam", TagKind::Relationship, 10);
        c.word_count = 40_000;
        c.chapter_count = 6;
        let est = estimator().estimate(&c);
        assert!(est.has_reason(EstimateReason::SubstantialContent));
        assert!(est.has_reason(EstimateReason::MultiChapter));
        assert_eq!(est.prominence, Prominence::Primary);
    }

    #[test]
    fn test_tag_spam_needs_review_and_holds_secondary() {
        let est = estimator().estimate(&ctx("Fluff", TagKind::Freeform, 30));
        assert!(!est.auto_assigned);
        assert!(est.has_reason(EstimateReason::PotentialTagSpam));
        assert_eq!(est.prominence, Prominence::Secondary);
    }

    #[test]
    fn test_tag_spam_keeps_background_micro() {
        let est = estimator().estimate(&ctx("Past Alex/Sam", TagKind::Relationship, 30));
        assert!(!est.auto_assigned);
        assert_eq!(est.prominence, Prominence::Micro);
    }

    #[test]
    fn test_zero_words_recorded() {
        let est = estimator().estimate(&ctx("Alex", TagKind::Character, 10));
        assert!(est.has_reason(EstimateReason::ZeroWords));
    }

    #[test]
    fn test_backfill_only_fills_unset_classified_tags() {
        let tags = vec![
            WorkTag::relationship("Alex/Sam"),
            WorkTag::relationship("Jo/Kim").user_set(Prominence::Micro),
            WorkTag::new("Fluff", TagKind::Freeform),
        ];
        let result = estimator().backfill(&tags, 9000, 1);
        let filled = &result.tags;
        assert!(filled[0].prominence.is_some());
        assert!(!filled[0].is_user_set);
        assert_eq!(filled[1], tags[1]);
        assert_eq!(filled[2].prominence, None);

        assert_eq!(result.estimates.len(), 1);
        assert_eq!(result.estimates[0].tag_name, "Alex/Sam");
        assert_eq!(
            Some(result.estimates[0].estimate.prominence),
            filled[0].prominence
        );
        assert!(!result.needs_review());
    }

    #[test]
    fn test_backfill_of_spam_work_needs_review() {
        let mut tags: Vec<WorkTag> = (0..30)
            .map(|i| WorkTag::new(format!("Freeform {}", i), TagKind::Freeform))
            .collect();
        tags.push(WorkTag::relationship("Alex/Sam"));

        let result = estimator().backfill(&tags, 50_000, 3);

        assert!(result.needs_review());
        let estimate = result.estimate_for("Alex/Sam").unwrap();
        assert!(!estimate.auto_assigned);
        assert!(estimate.has_reason(EstimateReason::PotentialTagSpam));
        assert_eq!(result.tags[30].prominence, Some(Prominence::Secondary));
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(EstimateReason::MultiChapter.to_string(), "multi-chapter");
        assert_eq!(
            serde_json::to_string(&EstimateReason::PotentialTagSpam).unwrap(),
            "\"potential_tag_spam\""
        );
    }
}
