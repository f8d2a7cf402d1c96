//! Backfill tests: estimated prominence fed through the classifier.

use nuclear_tags::{
    Classifier, ClassifierConfig, Prominence, ProminenceEstimator, TagContext, TagKind, WorkTag,
};

#[tokio::test]
async fn test_backfilled_primaries_still_respect_cap() {
    let config = ClassifierConfig::default();
    let estimator = ProminenceEstimator::new(&config).unwrap();

    // A long multi-chapter work: every relationship scores primary.
    let tags = vec![
        WorkTag::relationship("Alex/Sam"),
        WorkTag::relationship("Jo/Kim"),
        WorkTag::relationship("Lee/Max"),
        WorkTag::relationship("Background Ana/Bea"),
    ];
    let backfill = estimator.backfill(&tags, 200_000, 12);
    assert_eq!(backfill.estimates.len(), 4);
    assert!(!backfill.needs_review());
    let filled = backfill.tags;
    let primaries = filled
        .iter()
        .filter(|t| t.prominence == Some(Prominence::Primary))
        .count();
    assert_eq!(primaries, 3);
    assert!(filled.iter().all(|t| t.prominence.is_some()));

    let result = Classifier::exact_only(config)
        .unwrap()
        .classify(&filled)
        .await;

    assert_eq!(result.summary.primary_relationship_count, 2);
    assert_eq!(result.tag("Lee/Max").unwrap().prominence, Prominence::Secondary);
    assert_eq!(
        result.tag("Background Ana/Bea").unwrap().prominence,
        Prominence::Micro
    );
}

#[tokio::test]
async fn test_backfilled_spam_work_flagged_for_review() {
    let config = ClassifierConfig::default();
    let estimator = ProminenceEstimator::new(&config).unwrap();

    let mut tags: Vec<WorkTag> = (0..28)
        .map(|i| WorkTag::new(format!("Freeform {}", i), TagKind::Freeform))
        .collect();
    tags.push(WorkTag::relationship("Alex/Sam"));
    tags.push(WorkTag::relationship("Jo/Kim"));
    tags.push(WorkTag::character("Alex"));

    let backfill = estimator.backfill(&tags, 10_000, 1);

    assert!(backfill.needs_review());
    assert_eq!(backfill.estimates.len(), 3);
    assert!(backfill.estimates.iter().all(|e| !e.estimate.auto_assigned));

    let json = serde_json::to_value(&backfill).unwrap();
    assert_eq!(json["estimates"][0]["tag_name"], "Alex/Sam");
    assert_eq!(json["estimates"][0]["auto_assigned"], false);
    assert!(json["estimates"][0]["score"].is_number());

    let result = Classifier::exact_only(config)
        .unwrap()
        .classify(&backfill.tags)
        .await;
    assert!(result.summary.potential_tag_spam);
}

#[test]
fn test_estimator_uses_configured_keywords() {
    let config = ClassifierConfig::default().with_background_keywords(["mentioned"]);
    let estimator = ProminenceEstimator::new(&config).unwrap();

    let est = estimator.estimate(&TagContext {
        tag_name: "Mentioned Alex/Sam".to_string(),
        kind: TagKind::Relationship,
        word_count: 5000,
        chapter_count: 1,
        total_tags: 10,
    });

    assert_eq!(est.prominence, Prominence::Micro);
}

#[test]
fn test_estimator_rejects_invalid_config() {
    let config = ClassifierConfig::default().with_cap(0);
    assert!(ProminenceEstimator::new(&config).is_err());
}
