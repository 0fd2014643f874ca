//! In-memory content and character stores.
//!
//! Content is kept in its encoded JSON form, so every read decodes through the
//! modifier codec exactly as a persistent store would. A save replaces the
//! whole snapshot; concurrent writers are last-writer-wins.

use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use charforge_domain::{CharacterId, CharacterSelections, OwnerKind, OwningEntity};
use dashmap::DashMap;
use serde_json::Value;

use crate::infrastructure::ports::{CharacterRepo, OwnerRepo, RepoError, UnreadableSnapshot};

struct StoredSnapshot {
    /// First-insert order, so listings are stable
    seq: u64,
    json: Value,
}

pub struct InMemoryOwnerRepo<K: OwnerKind> {
    entities: DashMap<K::EntityId, StoredSnapshot>,
    next_seq: AtomicU64,
    _kind: PhantomData<K>,
}

impl<K: OwnerKind> InMemoryOwnerRepo<K> {
    pub fn new() -> Self {
        Self {
            entities: DashMap::new(),
            next_seq: AtomicU64::new(0),
            _kind: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Store raw JSON as-is, bypassing encoding. Reads still decode it.
    pub fn insert_raw(&self, id: K::EntityId, json: Value) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.entities.insert(id, StoredSnapshot { seq, json });
    }

    fn decode(json: &Value) -> Result<OwningEntity<K>, RepoError> {
        Ok(serde_json::from_value(json.clone())?)
    }

    /// Decode every snapshot in insertion order, one at a time.
    fn decode_all(&self) -> (Vec<OwningEntity<K>>, Vec<UnreadableSnapshot>) {
        let mut stored: Vec<(u64, String, Value)> = self
            .entities
            .iter()
            .map(|entry| (entry.seq, entry.key().to_string(), entry.json.clone()))
            .collect();
        stored.sort_by_key(|(seq, _, _)| *seq);

        let mut entities = Vec::with_capacity(stored.len());
        let mut unreadable = Vec::new();
        for (_, id, json) in stored {
            match Self::decode(&json) {
                Ok(entity) => entities.push(entity),
                Err(e) => unreadable.push(UnreadableSnapshot {
                    kind: K::ENTITY_LABEL,
                    id,
                    error: e.to_string(),
                }),
            }
        }
        (entities, unreadable)
    }
}

impl<K: OwnerKind> Default for InMemoryOwnerRepo<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<K: OwnerKind> OwnerRepo<K> for InMemoryOwnerRepo<K> {
    async fn get(&self, id: K::EntityId) -> Result<Option<OwningEntity<K>>, RepoError> {
        self.entities
            .get(&id)
            .map(|stored| Self::decode(&stored.json))
            .transpose()
    }

    async fn save(&self, entity: &OwningEntity<K>) -> Result<(), RepoError> {
        let json = serde_json::to_value(entity)?;
        match self.entities.get_mut(&entity.id()) {
            Some(mut stored) => stored.json = json,
            None => self.insert_raw(entity.id(), json),
        }
        Ok(())
    }

    async fn delete(&self, id: K::EntityId) -> Result<(), RepoError> {
        self.entities
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| RepoError::not_found(K::ENTITY_LABEL, id))
    }

    async fn list(&self) -> Result<Vec<OwningEntity<K>>, RepoError> {
        let (entities, unreadable) = self.decode_all();
        for snapshot in &unreadable {
            tracing::warn!(
                kind = snapshot.kind,
                entity_id = %snapshot.id,
                error = %snapshot.error,
                "Skipping stored snapshot that does not decode"
            );
        }
        Ok(entities)
    }

    async fn unreadable(&self) -> Result<Vec<UnreadableSnapshot>, RepoError> {
        Ok(self.decode_all().1)
    }
}

#[derive(Default)]
pub struct InMemoryCharacterRepo {
    characters: DashMap<CharacterId, CharacterSelections>,
}

impl InMemoryCharacterRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CharacterRepo for InMemoryCharacterRepo {
    async fn get(&self, id: CharacterId) -> Result<Option<CharacterSelections>, RepoError> {
        Ok(self.characters.get(&id).map(|c| c.clone()))
    }

    async fn save(&self, character: &CharacterSelections) -> Result<(), RepoError> {
        self.characters.insert(character.id(), character.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use charforge_domain::{
        CharacterLevel, ContentName, FeatId, FeatOwner, Modifier, ModifierId, ModifierKind,
        ModifierOwner, OptionDraft, RaceTraitOwner,
    };
    use chrono::Utc;
    use serde_json::json;

    fn feat(name: &str) -> OwningEntity<FeatOwner> {
        OwningEntity::new(ContentName::new(name).unwrap())
    }

    #[tokio::test]
    async fn save_then_get_decodes_snapshot() {
        let repo = InMemoryOwnerRepo::<FeatOwner>::new();
        let mut entity = feat("Sentinel");
        entity
            .options_mut()
            .add_option(OptionDraft::new(ContentName::new("Guard").unwrap()))
            .unwrap();
        let modifier = Modifier::bare(ModifierOwner::Feat(entity.id()), ModifierKind::Bonus)
            .unwrap()
            .with_fixed_value(5);
        entity.attach_modifier(modifier).unwrap();

        repo.save(&entity).await.unwrap();
        let loaded = repo.get(entity.id()).await.unwrap().unwrap();
        assert_eq!(loaded, entity);
    }

    #[tokio::test]
    async fn list_keeps_first_insert_order() {
        let repo = InMemoryOwnerRepo::<RaceTraitOwner>::new();
        let first = OwningEntity::new(ContentName::new("Darkvision").unwrap());
        let second = OwningEntity::new(ContentName::new("Trance").unwrap());
        repo.save(&first).await.unwrap();
        repo.save(&second).await.unwrap();
        repo.save(&first).await.unwrap();

        let ids: Vec<_> = repo.list().await.unwrap().iter().map(|e| e.id()).collect();
        assert_eq!(ids, vec![first.id(), second.id()]);
    }

    #[tokio::test]
    async fn delete_missing_is_not_found() {
        let repo = InMemoryOwnerRepo::<FeatOwner>::new();
        let err = repo.delete(FeatId::new()).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn corrupt_record_is_skipped_by_list() {
        let repo = InMemoryOwnerRepo::<FeatOwner>::new();
        let good = feat("Alert");
        repo.save(&good).await.unwrap();
        let id = FeatId::new();
        repo.insert_raw(
            id,
            json!({
                "id": id,
                "name": "Broken",
                "modifiers": [{
                    "id": ModifierId::new(),
                    "featId": id,
                    "type": "Telepathy",
                    "appliesOnMulticlass": false
                }]
            }),
        );

        let err = repo.get(id).await.unwrap_err();
        assert!(matches!(err, RepoError::Serialization(_)));

        let listed: Vec<_> = repo.list().await.unwrap().iter().map(|e| e.id()).collect();
        assert_eq!(listed, vec![good.id()]);
        let unreadable = repo.unreadable().await.unwrap();
        assert_eq!(unreadable.len(), 1);
        assert_eq!(unreadable[0].id, id.to_string());
        assert_eq!(unreadable[0].kind, "feat");
        assert!(unreadable[0].error.contains("Telepathy"));
    }

    #[tokio::test]
    async fn characters_round_trip() {
        let repo = InMemoryCharacterRepo::new();
        let character = CharacterSelections::new(
            CharacterId::new(),
            CharacterLevel::new(3).unwrap(),
            Utc::now(),
        );
        assert!(repo.get(character.id()).await.unwrap().is_none());
        repo.save(&character).await.unwrap();
        assert_eq!(repo.get(character.id()).await.unwrap(), Some(character));
    }
}
