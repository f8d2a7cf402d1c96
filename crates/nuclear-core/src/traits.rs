//! Collaborator traits consumed by the tag services.

use async_trait::async_trait;

use crate::error::Result;
use crate::tags::CanonicalTag;

// =============================================================================
// TAG STORE TRAITS
// =============================================================================

/// Synonym resolution against the tag store.
///
/// Implementations may be slow or unavailable; callers bound each call with
/// their own timeout and treat errors as "resolution unavailable".
#[async_trait]
pub trait SynonymResolver: Send + Sync {
    /// Resolve a tag name (canonical or synonym) to its canonical tag.
    ///
    /// Returns `Ok(None)` when no tag with that name exists.
    async fn resolve_canonical(&self, name: &str) -> Result<Option<CanonicalTag>>;
}

/// Resolver that knows no tags. Every lookup resolves to nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSynonyms;

#[async_trait]
impl SynonymResolver for NoSynonyms {
    async fn resolve_canonical(&self, _name: &str) -> Result<Option<CanonicalTag>> {
        Ok(None)
    }
}
