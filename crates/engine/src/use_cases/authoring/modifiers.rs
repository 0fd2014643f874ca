//! Modifier edits on an owning entity.
//!
//! Every modifier that is about to be saved is encoded and decoded again, and
//! the edit is refused unless it comes back unchanged.

use std::sync::Arc;

use charforge_domain::modifiers::codec;
use charforge_domain::{
    Details, KnownReferences, Modifier, ModifierId, ModifierVariant, OwnerKind,
};
use serde_json::Value;

use super::{commit, load_entity, AuthoringError};
use crate::infrastructure::ports::OwnerRepo;

pub struct ModifierAuthoring<K: OwnerKind> {
    repo: Arc<dyn OwnerRepo<K>>,
    max_details_len: usize,
}

impl<K: OwnerKind> ModifierAuthoring<K> {
    pub fn new(repo: Arc<dyn OwnerRepo<K>>, max_details_len: usize) -> Self {
        Self {
            repo,
            max_details_len,
        }
    }

    fn check(&self, modifier: &Modifier) -> Result<(), AuthoringError> {
        if let Some(details) = modifier.details() {
            Details::with_limit(details.as_str(), self.max_details_len)?;
        }
        let decoded = codec::decode(codec::encode(modifier)?)?;
        if &decoded != modifier {
            return Err(AuthoringError::RoundTrip(modifier.id().to_string()));
        }
        Ok(())
    }

    /// Attach a modifier given in its stored JSON form.
    ///
    /// The record must name this entity as its single owner.
    pub async fn attach_record(
        &self,
        entity_id: K::EntityId,
        record: Value,
    ) -> Result<Modifier, AuthoringError> {
        let modifier = codec::decode_json(record).inspect_err(|e| {
            tracing::warn!(entity_id = %entity_id, error = %e, "Rejected modifier record");
        })?;
        self.attach(entity_id, modifier).await
    }

    pub async fn attach(
        &self,
        entity_id: K::EntityId,
        modifier: Modifier,
    ) -> Result<Modifier, AuthoringError> {
        self.check(&modifier)?;
        let mut entity = load_entity(&*self.repo, entity_id).await?;
        entity.attach_modifier(modifier.clone())?;
        commit(&*self.repo, entity).await?;

        tracing::info!(
            entity_id = %entity_id,
            modifier_id = %modifier.id(),
            kind = %modifier.kind(),
            "Attached modifier"
        );
        Ok(modifier)
    }

    /// Swap a modifier's payload. Its kind follows the new payload.
    pub async fn replace_variant(
        &self,
        entity_id: K::EntityId,
        modifier_id: ModifierId,
        variant: ModifierVariant,
    ) -> Result<Modifier, AuthoringError> {
        let mut entity = load_entity(&*self.repo, entity_id).await?;
        let updated = entity
            .replace_modifier_variant(modifier_id, variant)?
            .clone();
        self.check(&updated)?;
        commit(&*self.repo, entity).await?;

        tracing::debug!(modifier_id = %modifier_id, kind = %updated.kind(), "Replaced modifier variant");
        Ok(updated)
    }

    pub async fn set_details(
        &self,
        entity_id: K::EntityId,
        modifier_id: ModifierId,
        details: Option<String>,
    ) -> Result<Modifier, AuthoringError> {
        let details = details
            .map(|text| Details::with_limit(text, self.max_details_len))
            .transpose()?;
        let mut entity = load_entity(&*self.repo, entity_id).await?;
        let modifier = entity.modifier_mut(modifier_id)?;
        modifier.set_details(details);
        let updated = modifier.clone();
        self.check(&updated)?;
        commit(&*self.repo, entity).await?;
        Ok(updated)
    }

    pub async fn remove(
        &self,
        entity_id: K::EntityId,
        modifier_id: ModifierId,
    ) -> Result<Modifier, AuthoringError> {
        let mut entity = load_entity(&*self.repo, entity_id).await?;
        let removed = entity.remove_modifier(modifier_id)?;
        commit(&*self.repo, entity).await?;
        tracing::info!(entity_id = %entity_id, modifier_id = %modifier_id, "Removed modifier");
        Ok(removed)
    }

    /// Clear optional weapon restrictions that point at missing items.
    ///
    /// Returns the number of references cleared. Required references (a
    /// granted feat, an enabled feature) are left for the audit to report.
    pub async fn prune_references(
        &self,
        entity_id: K::EntityId,
        known: &KnownReferences,
    ) -> Result<usize, AuthoringError> {
        let mut entity = load_entity(&*self.repo, entity_id).await?;
        let ids: Vec<ModifierId> = entity.modifiers().iter().map(|m| m.id()).collect();

        let mut cleared = 0;
        for id in ids {
            cleared += entity.modifier_mut(id)?.prune_dangling_references(known);
        }
        if cleared > 0 {
            commit(&*self.repo, entity).await?;
            tracing::info!(entity_id = %entity_id, cleared, "Pruned dangling references");
        }
        Ok(cleared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::InMemoryOwnerRepo;
    use charforge_domain::modifiers::{DamageTypeModifier, SenseModifier, WeaponAttackModifier};
    use charforge_domain::types::DamageType;
    use charforge_domain::{
        ContentName, DecodeError, FeatOwner, GraphError, ItemId, ModifierKind, ModifierOwner,
        OwningEntity, RaceTraitOwner,
    };
    use serde_json::json;

    async fn seeded<K: OwnerKind>(
        max_details_len: usize,
    ) -> (Arc<InMemoryOwnerRepo<K>>, ModifierAuthoring<K>, K::EntityId) {
        let repo = Arc::new(InMemoryOwnerRepo::<K>::new());
        let entity = OwningEntity::<K>::new(ContentName::new("Owner").unwrap());
        repo.save(&entity).await.unwrap();
        let authoring =
            ModifierAuthoring::new(repo.clone() as Arc<dyn OwnerRepo<K>>, max_details_len);
        (repo, authoring, entity.id())
    }

    #[tokio::test]
    async fn attach_record_then_replace_and_remove() {
        let (repo, authoring, trait_id) = seeded::<RaceTraitOwner>(500).await;
        let record = codec::encode_json(&Modifier::new(
            ModifierOwner::RaceTrait(trait_id),
            ModifierVariant::Resistance(DamageTypeModifier::of([DamageType::Fire])),
        ))
        .unwrap();

        let attached = authoring.attach_record(trait_id, record).await.unwrap();
        assert_eq!(attached.kind(), ModifierKind::Resistance);

        let replaced = authoring
            .replace_variant(
                trait_id,
                attached.id(),
                ModifierVariant::Vulnerability(DamageTypeModifier::of([DamageType::Cold])),
            )
            .await
            .unwrap();
        assert_eq!(replaced.kind(), ModifierKind::Vulnerability);

        let stored = repo.get(trait_id).await.unwrap().unwrap();
        assert_eq!(stored.modifier(attached.id()), Some(&replaced));

        authoring.remove(trait_id, attached.id()).await.unwrap();
        assert!(repo.get(trait_id).await.unwrap().unwrap().modifiers().is_empty());
    }

    #[tokio::test]
    async fn bad_record_is_rejected_with_decode_error() {
        let (_repo, authoring, feat) = seeded::<FeatOwner>(500).await;
        let record = json!({
            "id": ModifierId::new(),
            "featId": feat,
            "type": "Telepathy",
            "appliesOnMulticlass": false
        });
        assert!(matches!(
            authoring.attach_record(feat, record).await,
            Err(AuthoringError::Decode(DecodeError::UnknownTag { .. }))
        ));
    }

    #[tokio::test]
    async fn modifier_for_another_owner_is_refused() {
        let (_repo, authoring, feat) = seeded::<FeatOwner>(500).await;
        let stray = Modifier::new(
            ModifierOwner::Feat(charforge_domain::FeatId::new()),
            ModifierVariant::Sense(SenseModifier::default()),
        );
        assert!(matches!(
            authoring.attach(feat, stray).await,
            Err(AuthoringError::Graph(GraphError::ModifierOwnerMismatch { .. }))
        ));
    }

    #[tokio::test]
    async fn details_are_capped_by_config() {
        let (_repo, authoring, feat) = seeded::<FeatOwner>(10).await;
        let modifier = Modifier::new(
            ModifierOwner::Feat(feat),
            ModifierVariant::Sense(SenseModifier::default()),
        );
        let attached = authoring.attach(feat, modifier).await.unwrap();

        assert!(matches!(
            authoring
                .set_details(feat, attached.id(), Some("far too long for the cap".to_string()))
                .await,
            Err(AuthoringError::Domain(_))
        ));
        let updated = authoring
            .set_details(feat, attached.id(), Some("short".to_string()))
            .await
            .unwrap();
        assert_eq!(updated.details().map(|d| d.as_str()), Some("short"));
    }

    #[tokio::test]
    async fn prune_clears_missing_weapon_restrictions() {
        let (repo, authoring, feat) = seeded::<FeatOwner>(500).await;
        let known_weapon = ItemId::new();
        let missing_weapon = ItemId::new();
        for weapon in [known_weapon, missing_weapon] {
            let variant = ModifierVariant::MeleeWeaponAttack(WeaponAttackModifier {
                weapon_id: Some(weapon),
                ..WeaponAttackModifier::default()
            });
            authoring
                .attach(feat, Modifier::new(ModifierOwner::Feat(feat), variant))
                .await
                .unwrap();
        }

        let mut known = KnownReferences::default();
        known.items.insert(known_weapon);
        assert_eq!(authoring.prune_references(feat, &known).await.unwrap(), 1);
        assert_eq!(authoring.prune_references(feat, &known).await.unwrap(), 0);

        let stored = repo.get(feat).await.unwrap().unwrap();
        let weapons: Vec<_> = stored
            .modifiers()
            .iter()
            .filter_map(|m| match m.variant() {
                Some(ModifierVariant::MeleeWeaponAttack(p)) => Some(p.weapon_id),
                _ => None,
            })
            .collect();
        assert_eq!(weapons, vec![Some(known_weapon), None]);
    }
}
