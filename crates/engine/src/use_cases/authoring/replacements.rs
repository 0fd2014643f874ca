//! Replacement links for race traits and class features.

use std::sync::Arc;

use charforge_domain::{Replaceable, ReplacementGraph, ReplacementLink};

use super::{commit, delete_unreferenced, load_entity, AuthoringError};
use crate::infrastructure::ports::OwnerRepo;

pub struct ReplacementAuthoring<K: Replaceable> {
    repo: Arc<dyn OwnerRepo<K>>,
}

impl<K: Replaceable> ReplacementAuthoring<K> {
    pub fn new(repo: Arc<dyn OwnerRepo<K>>) -> Self {
        Self { repo }
    }

    /// Point `entity_id` at the entity it replaces, or clear the link.
    ///
    /// The whole pool is validated with the new link in place. A link that
    /// closes a loop or points at a missing entity is refused and nothing is
    /// saved; so is one that leaves a replaced option still required elsewhere.
    pub async fn set_replacement(
        &self,
        entity_id: K::EntityId,
        target: Option<K::EntityId>,
    ) -> Result<(), AuthoringError> {
        let mut entity = load_entity(&*self.repo, entity_id).await?;
        entity.set_replaces(target);
        commit(&*self.repo, entity).await?;

        tracing::info!(
            kind = K::ENTITY_LABEL,
            entity_id = %entity_id,
            replaces = ?target,
            "Replacement link updated"
        );
        Ok(())
    }

    /// The entity followed by everything it transitively replaces.
    pub async fn chain(&self, entity_id: K::EntityId) -> Result<Vec<K::EntityId>, AuthoringError> {
        let pool = self.repo.list().await?;
        let graph = ReplacementGraph::<K>::from_links(pool.iter().map(|e| ReplacementLink {
            entity: e.id(),
            replaces: e.replaces_id(),
        }))?;
        Ok(graph.chain(entity_id)?)
    }

    /// Refused while another entity still replaces `entity_id`.
    pub async fn delete_entity(&self, entity_id: K::EntityId) -> Result<(), AuthoringError> {
        delete_unreferenced(&*self.repo, entity_id).await
    }
}
