//! In-memory tag store.
//!
//! Holds canonical tags and their synonyms keyed by normalized name, and
//! answers synonym resolution for the classifier. Used by the CLI and by
//! tests; a database-backed store implements the same [`SynonymResolver`]
//! contract.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use nuclear_core::{normalize_tag_name, CanonicalTag, Error, Result, SynonymResolver, Tag, TagKind};
use tracing::trace;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct InMemoryTagStore {
    by_name: RwLock<HashMap<String, Tag>>,
    by_id: RwLock<HashMap<Uuid, Tag>>,
    lookups: AtomicUsize,
}

impl InMemoryTagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a canonical tag, returning the stored record.
    ///
    /// If a tag with the same normalized name exists it is returned unchanged.
    pub fn insert_canonical(&self, name: &str, kind: TagKind) -> Tag {
        let key = normalize_tag_name(name);
        if let Some(existing) = self.read_names().get(&key) {
            return existing.clone();
        }
        let tag = Tag::new(name.trim(), kind);
        self.store(key, tag.clone());
        tag
    }

    /// Insert `name` as a synonym of the existing tag `canonical_name`.
    ///
    /// The synonym takes the canonical tag's kind.
    pub fn insert_synonym(&self, name: &str, canonical_name: &str) -> Result<Tag> {
        let canonical = self
            .get(canonical_name)
            .ok_or_else(|| Error::NotFound(format!("canonical tag {:?}", canonical_name)))?;

        let key = normalize_tag_name(name);
        if let Some(existing) = self.read_names().get(&key) {
            if existing.canonical_or_self() == canonical.canonical_or_self() {
                return Ok(existing.clone());
            }
            return Err(Error::InvalidInput(format!(
                "{:?} already names a different tag",
                name
            )));
        }

        let tag = Tag::synonym_of(name.trim(), &canonical);
        self.store(key, tag.clone());
        Ok(tag)
    }

    /// Load an alias to target map of synonyms.
    ///
    /// A target may itself be an alias (`Draco -> Malfoy -> Draco Malfoy`);
    /// each chain is followed to its end, which is stored as a canonical tag
    /// of `kind`. Aliases are processed in sorted order, so the outcome does
    /// not depend on the map's iteration order. A cycle is an error.
    pub fn insert_synonym_map(
        &self,
        synonyms: &HashMap<String, String>,
        kind: TagKind,
    ) -> Result<()> {
        let mut links: BTreeMap<String, (&str, &str)> = BTreeMap::new();
        for (alias, target) in synonyms {
            let key = normalize_tag_name(alias);
            if key == normalize_tag_name(target) {
                // An entry naming itself only declares a canonical tag.
                self.insert_canonical(target, kind);
                continue;
            }
            links.insert(key, (alias.as_str(), target.as_str()));
        }

        for (key, (alias, target)) in &links {
            let mut root = *target;
            let mut seen: HashSet<String> = HashSet::from([key.clone()]);
            loop {
                let root_key = normalize_tag_name(root);
                let Some((_, next)) = links.get(&root_key) else {
                    break;
                };
                if !seen.insert(root_key) {
                    return Err(Error::InvalidInput(format!(
                        "synonym chain starting at {:?} loops back on itself",
                        alias
                    )));
                }
                root = *next;
            }

            self.insert_canonical(root, kind);
            self.insert_synonym(alias, root)?;
        }

        trace!(count = links.len(), "Synonym map loaded");
        Ok(())
    }

    /// Look up a tag record by name (normalized).
    pub fn get(&self, name: &str) -> Option<Tag> {
        self.read_names().get(&normalize_tag_name(name)).cloned()
    }

    pub fn len(&self) -> usize {
        self.read_names().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of `resolve_canonical` calls served.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }

    fn store(&self, key: String, tag: Tag) {
        self.by_id
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(tag.id(), tag.clone());
        self.by_name
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(key, tag);
    }

    fn read_names(&self) -> std::sync::RwLockReadGuard<'_, HashMap<String, Tag>> {
        self.by_name.read().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl SynonymResolver for InMemoryTagStore {
    async fn resolve_canonical(&self, name: &str) -> Result<Option<CanonicalTag>> {
        self.lookups.fetch_add(1, Ordering::Relaxed);

        let Some(tag) = self.get(name) else {
            trace!(tag = %name, "No tag with this name");
            return Ok(None);
        };

        let canonical_id = tag.canonical_or_self();
        let by_id = self.by_id.read().unwrap_or_else(|e| e.into_inner());
        let canonical = by_id.get(&canonical_id).ok_or_else(|| {
            Error::Internal(format!(
                "tag {:?} points at missing canonical {}",
                tag.name(),
                canonical_id
            ))
        })?;

        Ok(Some(CanonicalTag::from(canonical)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_canonical_resolves_to_itself() {
        let store = InMemoryTagStore::new();
        let harry = store.insert_canonical("Harry Potter", TagKind::Character);

        let resolved = store.resolve_canonical("harry potter").await.unwrap().unwrap();
        assert_eq!(resolved.id, harry.id());
        assert_eq!(resolved.name, "Harry Potter");
    }

    #[tokio::test]
    async fn test_synonym_resolves_to_canonical() {
        let store = InMemoryTagStore::new();
        let draco = store.insert_canonical("Draco Malfoy", TagKind::Character);
        store.insert_synonym("Draco", "Draco Malfoy").unwrap();

        let resolved = store.resolve_canonical("Draco").await.unwrap().unwrap();
        assert_eq!(resolved.id, draco.id());
        assert_eq!(resolved.kind, TagKind::Character);
    }

    #[tokio::test]
    async fn test_unknown_name_resolves_to_none() {
        let store = InMemoryTagStore::new();
        assert!(store.resolve_canonical("Nobody").await.unwrap().is_none());
        assert_eq!(store.lookup_count(), 1);
    }

    #[test]
    fn test_synonym_requires_existing_canonical() {
        let store = InMemoryTagStore::new();
        let err = store.insert_synonym("Draco", "Draco Malfoy").unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_synonym_name_conflict() {
        let store = InMemoryTagStore::new();
        store.insert_canonical("Draco Malfoy", TagKind::Character);
        store.insert_canonical("Harry Potter", TagKind::Character);
        let err = store.insert_synonym("Harry Potter", "Draco Malfoy").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_insert_canonical_is_idempotent_on_normalized_name() {
        let store = InMemoryTagStore::new();
        let first = store.insert_canonical("Harry Potter", TagKind::Character);
        let second = store.insert_canonical("  harry   potter", TagKind::Character);
        assert_eq!(first.id(), second.id());
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_synonym_chain_resolves_to_end_in_any_order() {
        let synonyms = HashMap::from([
            ("Draco".to_string(), "Malfoy".to_string()),
            ("Malfoy".to_string(), "Draco Malfoy".to_string()),
        ]);
        for _ in 0..8 {
            let store = InMemoryTagStore::new();
            store
                .insert_synonym_map(&synonyms, TagKind::Character)
                .unwrap();

            let canonical = store.get("Draco Malfoy").unwrap();
            assert!(canonical.is_canonical());
            for alias in ["Draco", "Malfoy"] {
                let resolved = store.resolve_canonical(alias).await.unwrap().unwrap();
                assert_eq!(resolved.id, canonical.id(), "{} should resolve", alias);
            }
        }
    }

    #[test]
    fn test_synonym_chain_same_result_for_reversed_insertion() {
        let mut forward = HashMap::new();
        forward.insert("Draco".to_string(), "Malfoy".to_string());
        forward.insert("Malfoy".to_string(), "Draco Malfoy".to_string());
        let mut reversed = HashMap::new();
        reversed.insert("Malfoy".to_string(), "Draco Malfoy".to_string());
        reversed.insert("Draco".to_string(), "Malfoy".to_string());

        let a = InMemoryTagStore::new();
        let b = InMemoryTagStore::new();
        assert!(a.insert_synonym_map(&forward, TagKind::Character).is_ok());
        assert!(b.insert_synonym_map(&reversed, TagKind::Character).is_ok());
        assert_eq!(a.len(), 3);
        assert_eq!(b.len(), 3);
    }

    #[test]
    fn test_synonym_cycle_rejected() {
        let synonyms = HashMap::from([
            ("Draco".to_string(), "Malfoy".to_string()),
            ("Malfoy".to_string(), "Draco".to_string()),
        ]);
        let err = InMemoryTagStore::new()
            .insert_synonym_map(&synonyms, TagKind::Character)
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn test_self_mapping_declares_canonical() {
        let synonyms = HashMap::from([("Harry Potter".to_string(), "harry potter".to_string())]);
        let store = InMemoryTagStore::new();
        store
            .insert_synonym_map(&synonyms, TagKind::Character)
            .unwrap();
        assert!(store.get("Harry Potter").unwrap().is_canonical());
        assert_eq!(store.len(), 1);
    }
}
