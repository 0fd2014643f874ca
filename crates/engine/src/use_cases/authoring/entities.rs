//! Entity create/rename/delete for one owner kind.

use std::sync::Arc;

use charforge_domain::{ContentName, Description, OwnerKind, OwningEntity};

use super::{commit, delete_unreferenced, load_entity, AuthoringError};
use crate::infrastructure::ports::OwnerRepo;

pub struct EntityAuthoring<K: OwnerKind> {
    repo: Arc<dyn OwnerRepo<K>>,
}

impl<K: OwnerKind> EntityAuthoring<K> {
    pub fn new(repo: Arc<dyn OwnerRepo<K>>) -> Self {
        Self { repo }
    }

    pub async fn list(&self) -> Result<Vec<OwningEntity<K>>, AuthoringError> {
        Ok(self.repo.list().await?)
    }

    pub async fn get(&self, id: K::EntityId) -> Result<OwningEntity<K>, AuthoringError> {
        load_entity(&*self.repo, id).await
    }

    pub async fn create(
        &self,
        name: String,
        description: Option<String>,
    ) -> Result<OwningEntity<K>, AuthoringError> {
        let mut entity = OwningEntity::new(ContentName::new(name)?);
        if let Some(description) = description {
            entity = entity.with_description(Description::new(description)?);
        }

        let entity = commit(&*self.repo, entity).await?;
        tracing::info!(
            kind = K::ENTITY_LABEL,
            entity_id = %entity.id(),
            name = %entity.name(),
            "Created entity"
        );
        Ok(entity)
    }

    pub async fn update(
        &self,
        id: K::EntityId,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<OwningEntity<K>, AuthoringError> {
        let mut entity = load_entity(&*self.repo, id).await?;
        if let Some(name) = name {
            entity.set_name(ContentName::new(name)?);
        }
        if let Some(description) = description {
            entity.set_description(Description::new(description)?);
        }
        commit(&*self.repo, entity).await
    }

    /// Refused while another entity replaces this one.
    pub async fn delete(&self, id: K::EntityId) -> Result<(), AuthoringError> {
        delete_unreferenced(&*self.repo, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::InMemoryOwnerRepo;
    use charforge_domain::{FeatId, FeatOwner, GraphError, RaceTraitOwner};
    use serde_json::json;

    #[tokio::test]
    async fn create_update_delete() {
        let authoring = EntityAuthoring::<FeatOwner>::new(Arc::new(InMemoryOwnerRepo::new()));
        let feat = authoring
            .create("Alert".to_string(), Some("Always ready.".to_string()))
            .await
            .unwrap();

        let renamed = authoring
            .update(feat.id(), Some("Ever Alert".to_string()), None)
            .await
            .unwrap();
        assert_eq!(renamed.name().as_str(), "Ever Alert");
        assert_eq!(renamed.description().as_str(), "Always ready.");

        authoring.delete(feat.id()).await.unwrap();
        assert!(matches!(
            authoring.get(feat.id()).await,
            Err(AuthoringError::NotFound { kind: "feat", .. })
        ));
    }

    #[tokio::test]
    async fn blank_name_is_rejected() {
        let authoring = EntityAuthoring::<FeatOwner>::new(Arc::new(InMemoryOwnerRepo::new()));
        assert!(matches!(
            authoring.create("   ".to_string(), None).await,
            Err(AuthoringError::Domain(_))
        ));
        assert!(authoring.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_missing_entity_is_not_found() {
        let authoring = EntityAuthoring::<FeatOwner>::new(Arc::new(InMemoryOwnerRepo::new()));
        assert!(matches!(
            authoring.delete(FeatId::new()).await,
            Err(AuthoringError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn delete_refused_while_replaced() {
        let repo = Arc::new(InMemoryOwnerRepo::<RaceTraitOwner>::new());
        let base = OwningEntity::new(ContentName::new("Darkvision").unwrap());
        let sub =
            OwningEntity::new(ContentName::new("Superior Darkvision").unwrap()).with_replaces(base.id());
        repo.save(&base).await.unwrap();
        repo.save(&sub).await.unwrap();

        let authoring = EntityAuthoring::<RaceTraitOwner>::new(repo.clone());
        assert!(matches!(
            authoring.delete(base.id()).await,
            Err(AuthoringError::Graph(GraphError::ReferencedByOthers { .. }))
        ));

        authoring.delete(sub.id()).await.unwrap();
        authoring.delete(base.id()).await.unwrap();
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn unreadable_snapshot_can_be_deleted() {
        let repo = Arc::new(InMemoryOwnerRepo::<FeatOwner>::new());
        let broken = FeatId::new();
        repo.insert_raw(broken, json!({ "id": broken, "name": "" }));
        let authoring = EntityAuthoring::<FeatOwner>::new(repo.clone());

        let good = authoring.create("Alert".to_string(), None).await.unwrap();
        assert_eq!(authoring.list().await.unwrap(), vec![good]);

        authoring.delete(broken).await.unwrap();
        assert!(repo.unreadable().await.unwrap().is_empty());
        assert_eq!(repo.len(), 1);
    }
}
