//! Content authoring: entities, their option pools, replacement links, and
//! modifiers.
//!
//! Every write loads the whole pool of its kind, applies the edit to a copy,
//! and re-runs the graph validator over the result. The edit is saved only if
//! it introduces no problem the pool did not already have, so a pool with
//! legacy damage can still be repaired one edit at a time.

mod entities;
mod modifiers;
mod options;
mod replacements;

pub use entities::EntityAuthoring;
pub use modifiers::ModifierAuthoring;
pub use options::OptionAuthoring;
pub use replacements::ReplacementAuthoring;

use std::sync::Arc;

use charforge_domain::{
    ClassFeatureOwner, DecodeError, DomainError, EncodeError, FeatOwner, GraphError,
    GraphValidator, OwnerKind, OwningEntity, RaceTraitOwner,
};

use crate::infrastructure::config::EngineConfig;
use crate::infrastructure::ports::{OwnerRepo, RepoError};

/// Shared error type for authoring use cases.
#[derive(Debug, thiserror::Error)]
pub enum AuthoringError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),
    #[error("Modifier {0} changed on a codec round trip")]
    RoundTrip(String),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),
}

impl AuthoringError {
    fn not_found<K: OwnerKind>(id: K::EntityId) -> Self {
        Self::NotFound {
            kind: K::ENTITY_LABEL,
            id: id.to_string(),
        }
    }
}

/// Authoring for one owner kind.
pub struct ContentAuthoring<K: OwnerKind> {
    pub entities: EntityAuthoring<K>,
    pub options: OptionAuthoring<K>,
    pub modifiers: ModifierAuthoring<K>,
}

impl<K: OwnerKind> ContentAuthoring<K> {
    pub fn new(repo: Arc<dyn OwnerRepo<K>>, config: &EngineConfig) -> Self {
        Self {
            entities: EntityAuthoring::new(repo.clone()),
            options: OptionAuthoring::new(repo.clone()),
            modifiers: ModifierAuthoring::new(repo, config.max_details_len),
        }
    }
}

/// Container for authoring use cases.
pub struct AuthoringUseCases {
    pub feats: ContentAuthoring<FeatOwner>,
    pub race_traits: ContentAuthoring<RaceTraitOwner>,
    pub class_features: ContentAuthoring<ClassFeatureOwner>,
    pub race_trait_replacements: ReplacementAuthoring<RaceTraitOwner>,
    pub class_feature_replacements: ReplacementAuthoring<ClassFeatureOwner>,
}

impl AuthoringUseCases {
    pub fn new(
        feats: ContentAuthoring<FeatOwner>,
        race_traits: ContentAuthoring<RaceTraitOwner>,
        class_features: ContentAuthoring<ClassFeatureOwner>,
        race_trait_replacements: ReplacementAuthoring<RaceTraitOwner>,
        class_feature_replacements: ReplacementAuthoring<ClassFeatureOwner>,
    ) -> Self {
        Self {
            feats,
            race_traits,
            class_features,
            race_trait_replacements,
            class_feature_replacements,
        }
    }
}

// =============================================================================
// Shared load / commit
// =============================================================================

pub(crate) async fn load_entity<K: OwnerKind>(
    repo: &dyn OwnerRepo<K>,
    id: K::EntityId,
) -> Result<OwningEntity<K>, AuthoringError> {
    repo.get(id)
        .await?
        .ok_or_else(|| AuthoringError::not_found::<K>(id))
}

/// Validate the pool with `updated` in place and save it if nothing new broke.
pub(crate) async fn commit<K: OwnerKind>(
    repo: &dyn OwnerRepo<K>,
    updated: OwningEntity<K>,
) -> Result<OwningEntity<K>, AuthoringError> {
    let mut pool = repo.list().await?;
    let before = GraphValidator::validate(&pool);

    match pool.iter_mut().find(|e| e.id() == updated.id()) {
        Some(slot) => *slot = updated.clone(),
        None => pool.push(updated.clone()),
    }

    let after = GraphValidator::validate(&pool);
    if let Some(problem) = after
        .problems
        .into_iter()
        .find(|p| !before.problems.contains(p))
    {
        tracing::warn!(
            kind = K::ENTITY_LABEL,
            entity_id = %updated.id(),
            error = %problem,
            "Rejected content edit"
        );
        return Err(problem.into());
    }

    repo.save(&updated).await?;
    Ok(updated)
}

/// Delete an entity that no other entity replaces. Snapshots that no longer
/// decode can always be deleted.
pub(crate) async fn delete_unreferenced<K: OwnerKind>(
    repo: &dyn OwnerRepo<K>,
    id: K::EntityId,
) -> Result<(), AuthoringError> {
    let pool = repo.list().await?;
    if !pool.iter().any(|e| e.id() == id) {
        let key = id.to_string();
        if !repo.unreadable().await?.iter().any(|s| s.id == key) {
            return Err(AuthoringError::not_found::<K>(id));
        }
        repo.delete(id).await?;
        tracing::info!(kind = K::ENTITY_LABEL, entity_id = %id, "Deleted unreadable snapshot");
        return Ok(());
    }

    let dependents: Vec<String> = pool
        .iter()
        .filter(|e| e.replaces_id() == Some(id))
        .map(|e| e.id().to_string())
        .collect();
    if !dependents.is_empty() {
        return Err(GraphError::ReferencedByOthers {
            kind: K::ENTITY_LABEL,
            id: id.to_string(),
            dependents,
        }
        .into());
    }

    repo.delete(id).await?;
    tracing::info!(kind = K::ENTITY_LABEL, entity_id = %id, "Deleted entity");
    Ok(())
}
