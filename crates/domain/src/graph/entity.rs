//! Owning-entity snapshots: a feat, race trait, or class feature with its
//! option pool, replacement target, and modifiers.

use serde::{Deserialize, Serialize};

use super::error::GraphError;
use super::option::{OptionNode, OwnedOptionGraph};
use super::owner::{GraphId, OwnerKind, Replaceable};
use crate::ids::ModifierId;
use crate::modifiers::{Modifier, ModifierVariant};
use crate::value_objects::{ContentName, Description};

/// One content entity as loaded from the store.
///
/// The option pool is always internally valid. Pool-wide rules (replacement
/// cycles, cross-entity references) are checked by the validator over a full
/// snapshot, since a single entity cannot see its siblings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    rename_all = "camelCase",
    bound = "",
    try_from = "StoredOwningEntity<K>"
)]
pub struct OwningEntity<K: OwnerKind> {
    id: K::EntityId,
    name: ContentName,
    description: Description,
    options: OwnedOptionGraph<K>,
    replaces_id: Option<K::EntityId>,
    modifiers: Vec<Modifier>,
}

/// Wire form accepted on load. Replaceable kinds historically used
/// `traitToReplaceId` / `featureToReplaceId`; both are accepted.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase", bound = "")]
struct StoredOwningEntity<K: OwnerKind> {
    id: K::EntityId,
    name: ContentName,
    #[serde(default)]
    description: Description,
    #[serde(default)]
    options: Vec<OptionNode<K>>,
    #[serde(default, alias = "traitToReplaceId", alias = "featureToReplaceId")]
    replaces_id: Option<K::EntityId>,
    #[serde(default)]
    modifiers: Vec<Modifier>,
}

impl<K: OwnerKind> TryFrom<StoredOwningEntity<K>> for OwningEntity<K> {
    type Error = GraphError;

    fn try_from(stored: StoredOwningEntity<K>) -> Result<Self, Self::Error> {
        let entity = Self {
            id: stored.id,
            name: stored.name,
            description: stored.description,
            options: OwnedOptionGraph::from_options(stored.id, stored.options)?,
            replaces_id: stored.replaces_id,
            modifiers: Vec::new(),
        };
        entity.with_modifiers(stored.modifiers)
    }
}

impl<K: OwnerKind> OwningEntity<K> {
    pub fn new(name: ContentName) -> Self {
        let id = K::EntityId::generate();
        Self {
            id,
            name,
            description: Description::empty(),
            options: OwnedOptionGraph::new(id),
            replaces_id: None,
            modifiers: Vec::new(),
        }
    }

    /// Snapshot with no consistency checks, for validator input.
    pub fn from_parts_unchecked(
        id: K::EntityId,
        name: ContentName,
        options: Vec<OptionNode<K>>,
        replaces_id: Option<K::EntityId>,
        modifiers: Vec<Modifier>,
    ) -> Self {
        Self {
            id,
            name,
            description: Description::empty(),
            options: OwnedOptionGraph::unchecked(id, options),
            replaces_id,
            modifiers,
        }
    }

    pub fn with_description(mut self, description: Description) -> Self {
        self.description = description;
        self
    }

    fn with_modifiers(mut self, modifiers: Vec<Modifier>) -> Result<Self, GraphError> {
        for modifier in modifiers {
            self.attach_modifier(modifier)?;
        }
        Ok(self)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> K::EntityId {
        self.id
    }

    pub fn name(&self) -> &ContentName {
        &self.name
    }

    pub fn description(&self) -> &Description {
        &self.description
    }

    pub fn options(&self) -> &OwnedOptionGraph<K> {
        &self.options
    }

    /// Mutable pool access. The pool keeps its own invariants.
    pub fn options_mut(&mut self) -> &mut OwnedOptionGraph<K> {
        &mut self.options
    }

    pub fn replaces_id(&self) -> Option<K::EntityId> {
        self.replaces_id
    }

    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    pub fn modifier(&self, id: ModifierId) -> Option<&Modifier> {
        self.modifiers.iter().find(|m| m.id() == id)
    }

    pub fn set_name(&mut self, name: ContentName) {
        self.name = name;
    }

    pub fn set_description(&mut self, description: Description) {
        self.description = description;
    }

    // =========================================================================
    // Modifiers
    // =========================================================================

    /// Attach a modifier owned by this entity.
    ///
    /// # Errors
    ///
    /// - `GraphError::ModifierOwnerMismatch` if the modifier names another owner
    /// - `GraphError::DuplicateId` if the modifier is already attached
    pub fn attach_modifier(&mut self, modifier: Modifier) -> Result<(), GraphError> {
        let expected = K::modifier_owner(self.id);
        if modifier.owner() != expected {
            return Err(GraphError::ModifierOwnerMismatch {
                entity: expected.to_string(),
                modifier: modifier.id().to_string(),
                actual: modifier.owner().to_string(),
            });
        }
        if self.modifier(modifier.id()).is_some() {
            return Err(GraphError::DuplicateId {
                kind: "modifier",
                id: modifier.id().to_string(),
            });
        }
        self.modifiers.push(modifier);
        Ok(())
    }

    /// Swap the payload of an attached modifier. The kind follows the payload.
    pub fn replace_modifier_variant(
        &mut self,
        id: ModifierId,
        variant: ModifierVariant,
    ) -> Result<&Modifier, GraphError> {
        let modifier = self.modifier_mut(id)?;
        modifier.set_variant(variant);
        Ok(&*modifier)
    }

    pub fn modifier_mut(&mut self, id: ModifierId) -> Result<&mut Modifier, GraphError> {
        self.modifiers
            .iter_mut()
            .find(|m| m.id() == id)
            .ok_or_else(|| GraphError::unknown("modifier", id))
    }

    pub fn remove_modifier(&mut self, id: ModifierId) -> Result<Modifier, GraphError> {
        let position = self
            .modifiers
            .iter()
            .position(|m| m.id() == id)
            .ok_or_else(|| GraphError::unknown("modifier", id))?;
        Ok(self.modifiers.remove(position))
    }
}

impl<K: Replaceable> OwningEntity<K> {
    /// Set the replacement target. Pool-wide checks are the caller's job.
    pub fn set_replaces(&mut self, target: Option<K::EntityId>) {
        self.replaces_id = target;
    }

    pub fn with_replaces(mut self, target: K::EntityId) -> Self {
        self.replaces_id = Some(target);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::option::OptionDraft;
    use crate::graph::owner::{ClassFeatureOwner, FeatOwner, RaceTraitOwner};
    use crate::ids::{FeatId, RaceTraitId};
    use crate::modifiers::{DamageTypeModifier, ModifierKind, ModifierOwner};
    use crate::types::DamageType;

    fn name(text: &str) -> ContentName {
        ContentName::new(text).unwrap()
    }

    #[test]
    fn new_entity_owns_empty_pool() {
        let entity = OwningEntity::<RaceTraitOwner>::new(name("Darkvision"));
        assert_eq!(entity.options().owner_id(), entity.id());
        assert!(entity.options().is_empty());
        assert!(entity.replaces_id().is_none());
    }

    #[test]
    fn modifier_owner_must_match() {
        let mut entity = OwningEntity::<RaceTraitOwner>::new(name("Fire Resistance"));
        let foreign = Modifier::new(
            ModifierOwner::RaceTrait(RaceTraitId::new()),
            ModifierVariant::default_for(ModifierKind::Resistance),
        );
        assert!(matches!(
            entity.attach_modifier(foreign),
            Err(GraphError::ModifierOwnerMismatch { .. })
        ));

        let own = Modifier::new(
            RaceTraitOwner::modifier_owner(entity.id()),
            ModifierVariant::Resistance(DamageTypeModifier::of([DamageType::Fire])),
        );
        let id = own.id();
        entity.attach_modifier(own.clone()).unwrap();
        assert!(matches!(
            entity.attach_modifier(own),
            Err(GraphError::DuplicateId { .. })
        ));

        let updated = entity
            .replace_modifier_variant(id, ModifierVariant::default_for(ModifierKind::Immunity))
            .unwrap();
        assert_eq!(updated.kind(), ModifierKind::Immunity);
        entity.remove_modifier(id).unwrap();
        assert!(entity.modifiers().is_empty());
    }

    #[test]
    fn feat_entity_round_trips_through_json() {
        let mut feat = OwningEntity::<FeatOwner>::new(name("Great Weapon Master"));
        let base = feat
            .options_mut()
            .add_option(OptionDraft::new(name("Cleave")))
            .unwrap()
            .id();
        feat.options_mut()
            .add_option(OptionDraft::new(name("Heavy Swing")).requires(base))
            .unwrap();
        feat.attach_modifier(
            Modifier::bare(FeatOwner::modifier_owner(feat.id()), ModifierKind::Bonus).unwrap(),
        )
        .unwrap();

        let json = serde_json::to_value(&feat).unwrap();
        assert_eq!(json["options"].as_array().map(Vec::len), Some(2));
        let back: OwningEntity<FeatOwner> = serde_json::from_value(json).unwrap();
        assert_eq!(back, feat);
    }

    #[test]
    fn stored_legacy_replacement_field_is_accepted() {
        let base = crate::ids::ClassFeatureId::new();
        let json = serde_json::json!({
            "id": crate::ids::ClassFeatureId::new(),
            "name": "Improved Critical",
            "featureToReplaceId": base,
        });
        let entity: OwningEntity<ClassFeatureOwner> = serde_json::from_value(json).unwrap();
        assert_eq!(entity.replaces_id(), Some(base));
    }

    #[test]
    fn stored_entity_with_foreign_options_is_rejected() {
        let json = serde_json::json!({
            "id": FeatId::new(),
            "name": "Broken",
            "options": [{
                "id": crate::ids::FeatOptionId::new(),
                "ownerId": FeatId::new(),
                "name": "Stray",
            }],
        });
        assert!(serde_json::from_value::<OwningEntity<FeatOwner>>(json).is_err());
    }
}
