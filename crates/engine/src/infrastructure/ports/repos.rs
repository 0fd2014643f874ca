//! Repository port traits for content and character storage.

use async_trait::async_trait;
use charforge_domain::{CharacterId, CharacterSelections, OwnerKind, OwningEntity};

use super::error::RepoError;

// =============================================================================
// Content Storage (one store per owner kind)
// =============================================================================

/// A stored snapshot that no longer decodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnreadableSnapshot {
    pub kind: &'static str,
    pub id: String,
    pub error: String,
}

/// Whole-snapshot storage for feats, race traits, or class features.
///
/// A save replaces the stored entity, options and modifiers included.
#[async_trait]
pub trait OwnerRepo<K: OwnerKind>: Send + Sync {
    async fn get(&self, id: K::EntityId) -> Result<Option<OwningEntity<K>>, RepoError>;
    async fn save(&self, entity: &OwningEntity<K>) -> Result<(), RepoError>;
    async fn delete(&self, id: K::EntityId) -> Result<(), RepoError>;
    /// Every snapshot that decodes. Unreadable ones are skipped.
    async fn list(&self) -> Result<Vec<OwningEntity<K>>, RepoError>;
    /// Snapshots `list` skipped.
    async fn unreadable(&self) -> Result<Vec<UnreadableSnapshot>, RepoError>;
}

// =============================================================================
// Character Storage
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CharacterRepo: Send + Sync {
    async fn get(&self, id: CharacterId) -> Result<Option<CharacterSelections>, RepoError>;
    async fn save(&self, character: &CharacterSelections) -> Result<(), RepoError>;
}
