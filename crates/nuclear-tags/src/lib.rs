//! # nuclear-tags
//!
//! Tag prominence classification for Nuclear AO3 works.
//!
//! This crate provides:
//! - Relationship name parsing (`/`, `&`, ` x ` separators)
//! - Missing-character detection with synonym-aware matching
//! - Background/minor relationship detection by keyword
//! - Primary-relationship cap enforcement
//! - The [`Classifier`] that runs these steps for one work
//! - Prominence estimation for backfilling unassigned tags
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use nuclear_tags::{Classifier, ClassifierConfig, InMemoryTagStore, WorkTag};
//!
//! let store = Arc::new(InMemoryTagStore::new());
//! let classifier = Classifier::new(ClassifierConfig::from_env()?, store)?;
//!
//! let result = classifier
//!     .classify(&[
//!         WorkTag::relationship("Harry Potter/Draco Malfoy"),
//!         WorkTag::character("Harry Potter"),
//!     ])
//!     .await;
//!
//! for advisory in result.all_advisories() {
//!     println!("{}", advisory);
//! }
//! ```

pub mod advisory;
pub mod background;
pub mod cap;
pub mod classification;
pub mod classifier;
pub mod config;
pub mod estimate;
pub mod memory_store;
pub mod missing_characters;
pub mod relationship_parser;

// Re-export core types
pub use nuclear_core::*;

pub use advisory::Advisory;
pub use background::BackgroundMatcher;
pub use cap::{enforce_primary_cap, RelationshipSlot};
pub use classification::{ClassifiedTag, ProminenceClassificationResult, ProminenceSummary};
pub use classifier::Classifier;
pub use config::ClassifierConfig;
pub use estimate::{
    BackfillResult, EstimateReason, ProminenceEstimate, ProminenceEstimator, TagContext,
    TagEstimate,
};
pub use memory_store::InMemoryTagStore;
pub use missing_characters::{
    find_missing_characters, CharacterIndex, MissingCharacter, SynonymLookup,
};
pub use relationship_parser::{
    parse_relationship, ParsedRelationship, RelationshipStructure, Separator,
};
