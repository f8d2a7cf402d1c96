//! Missing-character detection.
//!
//! For each name parsed out of a relationship tag, checks whether the work
//! carries a matching character tag. A candidate matches when:
//!
//! 1. its name equals a character tag's name after lowercasing and
//!    whitespace normalization, or
//! 2. it resolves to the same canonical tag as one of the character tags.
//!
//! Unmatched names are reported once per work. The result is advisory only.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use nuclear_core::{normalize_tag_name, Error, SynonymResolver};
use serde::{Deserialize, Serialize};
use tracing::{trace, warn};
use uuid::Uuid;

/// A candidate character name with no matching character tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingCharacter {
    /// The first relationship tag that mentions the character.
    pub relationship: String,
    pub character: String,
}

/// Memoizing, time-bounded synonym lookups for a single classification.
///
/// The first failure or timeout marks the lookup unavailable; every later
/// call answers `None` without touching the resolver.
pub struct SynonymLookup {
    resolver: Arc<dyn SynonymResolver>,
    timeout: Duration,
    cache: HashMap<String, Option<Uuid>>,
    unavailable: Option<String>,
}

impl SynonymLookup {
    pub fn new(resolver: Arc<dyn SynonymResolver>, timeout: Duration) -> Self {
        Self {
            resolver,
            timeout,
            cache: HashMap::new(),
            unavailable: None,
        }
    }

    /// Canonical tag id for `name`, or `None` if unknown or unavailable.
    pub async fn canonical_id(&mut self, name: &str) -> Option<Uuid> {
        if self.unavailable.is_some() {
            return None;
        }

        let key = normalize_tag_name(name);
        if let Some(cached) = self.cache.get(&key) {
            return *cached;
        }

        let outcome = tokio::time::timeout(self.timeout, self.resolver.resolve_canonical(name))
            .await
            .map_err(|_| {
                Error::Timeout(format!(
                    "synonym lookup exceeded {}ms",
                    self.timeout.as_millis()
                ))
            })
            .and_then(|res| res);

        match outcome {
            Ok(resolved) => {
                let id = resolved.map(|tag| tag.id);
                trace!(tag = %name, canonical = ?id, "Synonym lookup resolved");
                self.cache.insert(key, id);
                id
            }
            Err(e) => {
                warn!(
                    subsystem = "tags",
                    component = "tag_store",
                    op = "resolve_canonical",
                    tag = %name,
                    error = %e,
                    "Synonym lookup unavailable, falling back to exact matching"
                );
                self.unavailable = Some(e.to_string());
                None
            }
        }
    }

    /// Why lookups stopped, if they did.
    pub fn unavailable_reason(&self) -> Option<&str> {
        self.unavailable.as_deref()
    }

    pub fn is_available(&self) -> bool {
        self.unavailable.is_none()
    }
}

/// Character tags of one work, indexed for matching.
pub struct CharacterIndex<'a> {
    names: Vec<&'a str>,
    normalized: HashSet<String>,
    canonical_ids: Option<HashSet<Uuid>>,
}

impl<'a> CharacterIndex<'a> {
    pub fn new(names: impl IntoIterator<Item = &'a str>) -> Self {
        let names: Vec<&str> = names.into_iter().collect();
        let normalized = names.iter().map(|n| normalize_tag_name(n)).collect();
        Self {
            names,
            normalized,
            canonical_ids: None,
        }
    }

    /// Whether `candidate` is covered by a character tag.
    pub async fn covers(&mut self, candidate: &str, lookup: &mut SynonymLookup) -> bool {
        if self.normalized.contains(&normalize_tag_name(candidate)) {
            trace!(candidate = %candidate, "Candidate matched by name");
            return true;
        }
        if self.names.is_empty() {
            return false;
        }

        let Some(candidate_id) = lookup.canonical_id(candidate).await else {
            return false;
        };

        if self.canonical_ids.is_none() {
            let mut ids = HashSet::new();
            for name in &self.names {
                if let Some(id) = lookup.canonical_id(name).await {
                    ids.insert(id);
                }
            }
            // A failure mid-way leaves the set incomplete; don't cache it.
            if !lookup.is_available() {
                return ids.contains(&candidate_id);
            }
            self.canonical_ids = Some(ids);
        }

        let matched = self
            .canonical_ids
            .as_ref()
            .is_some_and(|ids| ids.contains(&candidate_id));
        trace!(candidate = %candidate, matched, "Candidate checked by synonym");
        matched
    }
}

/// Report candidate names with no character tag.
///
/// `relationships` pairs each relationship tag name with its parsed
/// candidates, in the work's tag order. Each missing name (compared after
/// normalization) is reported once, against the first relationship that
/// mentions it.
pub async fn find_missing_characters(
    relationships: &[(&str, Vec<String>)],
    characters: &mut CharacterIndex<'_>,
    lookup: &mut SynonymLookup,
) -> Vec<MissingCharacter> {
    let mut missing = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for (relationship, candidates) in relationships {
        for candidate in candidates {
            if !seen.insert(normalize_tag_name(candidate)) {
                continue;
            }
            if !characters.covers(candidate, lookup).await {
                missing.push(MissingCharacter {
                    relationship: relationship.to_string(),
                    character: candidate.clone(),
                });
            }
        }
    }

    missing
}
