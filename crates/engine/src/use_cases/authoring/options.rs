//! Option pool edits: add, re-point, gate, and remove options.

use std::sync::Arc;

use charforge_domain::{
    ContentName, Description, LevelGate, OptionDraft, OptionNode, OwnerKind,
};

use super::{commit, load_entity, AuthoringError};
use crate::infrastructure::ports::OwnerRepo;

pub struct OptionAuthoring<K: OwnerKind> {
    repo: Arc<dyn OwnerRepo<K>>,
}

impl<K: OwnerKind> OptionAuthoring<K> {
    pub fn new(repo: Arc<dyn OwnerRepo<K>>) -> Self {
        Self { repo }
    }

    /// Add an option to an entity's pool.
    ///
    /// # Errors
    ///
    /// - `AuthoringError::NotFound` if the entity does not exist
    /// - `AuthoringError::Graph(OutsidePool)` if the prerequisite is in another pool
    pub async fn add_option(
        &self,
        entity_id: K::EntityId,
        draft: OptionDraft<K>,
    ) -> Result<OptionNode<K>, AuthoringError> {
        let mut entity = load_entity(&*self.repo, entity_id).await?;
        let option_id = entity.options_mut().add_option(draft)?.id();
        let entity = commit(&*self.repo, entity).await?;

        tracing::info!(
            kind = K::ENTITY_LABEL,
            entity_id = %entity_id,
            option_id = %option_id,
            "Added option"
        );
        entity
            .options()
            .get(option_id)
            .cloned()
            .ok_or_else(|| AuthoringError::InvalidInput(format!("option {option_id} was not saved")))
    }

    /// Point an option at a new prerequisite in the same pool, or clear it.
    ///
    /// # Errors
    ///
    /// `AuthoringError::Graph` with `Cycle`, `OutsidePool`, or `UnknownNode`
    /// when the link is not allowed. Nothing is saved in that case.
    pub async fn set_prerequisite(
        &self,
        entity_id: K::EntityId,
        option_id: K::OptionId,
        required: Option<K::OptionId>,
    ) -> Result<(), AuthoringError> {
        let mut entity = load_entity(&*self.repo, entity_id).await?;
        if let Err(e) = entity.options_mut().set_required_option(option_id, required) {
            tracing::warn!(
                kind = K::OPTION_LABEL,
                option_id = %option_id,
                error = %e,
                "Rejected prerequisite change"
            );
            return Err(e.into());
        }
        commit(&*self.repo, entity).await?;
        tracing::debug!(option_id = %option_id, required = ?required, "Prerequisite updated");
        Ok(())
    }

    pub async fn set_level_gate(
        &self,
        entity_id: K::EntityId,
        option_id: K::OptionId,
        level: u8,
    ) -> Result<(), AuthoringError> {
        let gate = LevelGate::new(level)?;
        let mut entity = load_entity(&*self.repo, entity_id).await?;
        entity.options_mut().set_level_gate(option_id, gate)?;
        commit(&*self.repo, entity).await?;
        Ok(())
    }

    pub async fn set_granted_automatically(
        &self,
        entity_id: K::EntityId,
        option_id: K::OptionId,
        granted: bool,
    ) -> Result<(), AuthoringError> {
        let mut entity = load_entity(&*self.repo, entity_id).await?;
        entity
            .options_mut()
            .set_granted_automatically(option_id, granted)?;
        commit(&*self.repo, entity).await?;
        Ok(())
    }

    pub async fn update_option(
        &self,
        entity_id: K::EntityId,
        option_id: K::OptionId,
        name: String,
        description: Option<String>,
    ) -> Result<(), AuthoringError> {
        let name = ContentName::new(name)?;
        let description = match description {
            Some(text) => Description::new(text)?,
            None => Description::empty(),
        };
        let mut entity = load_entity(&*self.repo, entity_id).await?;
        entity
            .options_mut()
            .update_details(option_id, name, description)?;
        commit(&*self.repo, entity).await?;
        Ok(())
    }

    /// Remove an option no other option depends on.
    ///
    /// # Errors
    ///
    /// `AuthoringError::Graph(ReferencedByOthers)` while any option still
    /// names it as a prerequisite.
    pub async fn remove_option(
        &self,
        entity_id: K::EntityId,
        option_id: K::OptionId,
    ) -> Result<OptionNode<K>, AuthoringError> {
        let mut entity = load_entity(&*self.repo, entity_id).await?;
        let removed = entity.options_mut().remove_option(option_id)?;
        commit(&*self.repo, entity).await?;
        tracing::info!(
            kind = K::OPTION_LABEL,
            option_id = %option_id,
            "Removed option"
        );
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::InMemoryOwnerRepo;
    use charforge_domain::{
        ClassFeatureOwner, FeatId, FeatOptionId, FeatOwner, GraphError, OwningEntity,
        RaceTraitOwner,
    };
    use serde_json::json;

    fn draft<K: OwnerKind>(name: &str) -> OptionDraft<K> {
        OptionDraft::new(ContentName::new(name).unwrap())
    }

    async fn seeded<K: OwnerKind>(
        name: &str,
    ) -> (Arc<InMemoryOwnerRepo<K>>, OptionAuthoring<K>, K::EntityId) {
        let repo = Arc::new(InMemoryOwnerRepo::<K>::new());
        let entity = OwningEntity::<K>::new(ContentName::new(name).unwrap());
        repo.save(&entity).await.unwrap();
        let authoring = OptionAuthoring::new(repo.clone() as Arc<dyn OwnerRepo<K>>);
        (repo, authoring, entity.id())
    }

    #[tokio::test]
    async fn closing_a_cycle_is_refused_and_nothing_is_saved() {
        let (repo, authoring, feat) = seeded::<FeatOwner>("Elemental Adept").await;
        let a = authoring.add_option(feat, draft("Fire")).await.unwrap().id();
        let b = authoring
            .add_option(feat, draft("Greater Fire").requires(a))
            .await
            .unwrap()
            .id();

        let err = authoring.set_prerequisite(feat, a, Some(b)).await.unwrap_err();
        assert!(matches!(err, AuthoringError::Graph(GraphError::Cycle { .. })));

        let stored = repo.get(feat).await.unwrap().unwrap();
        assert_eq!(stored.options().get(a).unwrap().required_option_id(), None);
        assert_eq!(stored.options().get(b).unwrap().required_option_id(), Some(a));
    }

    #[tokio::test]
    async fn prerequisite_from_another_pool_is_refused() {
        let (repo, authoring, first) = seeded::<RaceTraitOwner>("Fey Ancestry").await;
        let other = OwningEntity::<RaceTraitOwner>::new(ContentName::new("Trance").unwrap());
        repo.save(&other).await.unwrap();
        let foreign = authoring.add_option(other.id(), draft("Meditate")).await.unwrap().id();
        let local = authoring.add_option(first, draft("Charm Ward")).await.unwrap().id();

        assert!(matches!(
            authoring.set_prerequisite(first, local, Some(foreign)).await,
            Err(AuthoringError::Graph(GraphError::OutsidePool { .. }))
        ));
        assert!(matches!(
            authoring.add_option(first, draft("Deep Ward").requires(foreign)).await,
            Err(AuthoringError::Graph(GraphError::OutsidePool { .. }))
        ));
    }

    #[tokio::test]
    async fn removal_refused_while_required() {
        let (repo, authoring, feature) = seeded::<ClassFeatureOwner>("Fighting Style").await;
        let base = authoring.add_option(feature, draft("Defense")).await.unwrap().id();
        let child = authoring
            .add_option(feature, draft("Shield Wall").requires(base))
            .await
            .unwrap()
            .id();

        assert!(matches!(
            authoring.remove_option(feature, base).await,
            Err(AuthoringError::Graph(GraphError::ReferencedByOthers { .. }))
        ));

        authoring.set_prerequisite(feature, child, None).await.unwrap();
        let removed = authoring.remove_option(feature, base).await.unwrap();
        assert_eq!(removed.id(), base);
        assert_eq!(repo.get(feature).await.unwrap().unwrap().options().len(), 1);
    }

    #[tokio::test]
    async fn gates_and_details_are_saved() {
        let (repo, authoring, feat) = seeded::<FeatOwner>("Tough").await;
        let option = authoring.add_option(feat, draft("Hardy")).await.unwrap().id();

        authoring.set_level_gate(feat, option, 4).await.unwrap();
        authoring
            .set_granted_automatically(feat, option, true)
            .await
            .unwrap();
        authoring
            .update_option(feat, option, "Hardier".to_string(), Some("More hit points.".to_string()))
            .await
            .unwrap();

        let stored = repo.get(feat).await.unwrap().unwrap();
        let node = stored.options().get(option).unwrap();
        assert_eq!(node.required_character_level().value(), 4);
        assert!(node.is_granted_automatically());
        assert_eq!(node.name().as_str(), "Hardier");
        assert!(authoring.set_level_gate(feat, option, 21).await.is_err());
    }

    #[tokio::test]
    async fn unknown_entity_is_not_found() {
        let (_repo, authoring, _) = seeded::<FeatOwner>("Lucky").await;
        assert!(matches!(
            authoring
                .add_option(charforge_domain::FeatId::new(), draft("Reroll"))
                .await,
            Err(AuthoringError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn unreadable_sibling_does_not_block_edits() {
        let (repo, authoring, feat) = seeded::<FeatOwner>("Sentinel").await;
        let broken = FeatId::new();
        let (a, b) = (FeatOptionId::new(), FeatOptionId::new());
        repo.insert_raw(
            broken,
            json!({
                "id": broken,
                "name": "Tangled",
                "options": [
                    { "id": a, "ownerId": broken, "name": "A", "requiredOptionId": b },
                    { "id": b, "ownerId": broken, "name": "B", "requiredOptionId": a }
                ]
            }),
        );

        let added = authoring.add_option(feat, draft("Guard")).await.unwrap();
        assert_eq!(repo.get(feat).await.unwrap().unwrap().options().len(), 1);
        assert_eq!(added.name().as_str(), "Guard");
        assert_eq!(repo.unreadable().await.unwrap().len(), 1);
    }
}
