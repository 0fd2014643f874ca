//! A character's choices across all three owner kinds.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::ChoiceError;
use super::ledger::ChoiceLedger;
use super::resolver::OptionState;
use crate::graph::{ClassFeatureOwner, FeatOwner, OwnerKind, OwningEntity, RaceTraitOwner};
use crate::ids::CharacterId;
use crate::value_objects::CharacterLevel;

/// Owner kinds a character keeps a ledger for.
pub trait SelectionKind: OwnerKind {
    fn ledger(selections: &CharacterSelections) -> &ChoiceLedger<Self>;
    fn ledger_mut(selections: &mut CharacterSelections) -> &mut ChoiceLedger<Self>;
}

impl SelectionKind for FeatOwner {
    fn ledger(selections: &CharacterSelections) -> &ChoiceLedger<Self> {
        &selections.feats
    }

    fn ledger_mut(selections: &mut CharacterSelections) -> &mut ChoiceLedger<Self> {
        &mut selections.feats
    }
}

impl SelectionKind for RaceTraitOwner {
    fn ledger(selections: &CharacterSelections) -> &ChoiceLedger<Self> {
        &selections.race_traits
    }

    fn ledger_mut(selections: &mut CharacterSelections) -> &mut ChoiceLedger<Self> {
        &mut selections.race_traits
    }
}

impl SelectionKind for ClassFeatureOwner {
    fn ledger(selections: &CharacterSelections) -> &ChoiceLedger<Self> {
        &selections.class_features
    }

    fn ledger_mut(selections: &mut CharacterSelections) -> &mut ChoiceLedger<Self> {
        &mut selections.class_features
    }
}

/// Everything a character has chosen, plus the level that gates new choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterSelections {
    id: CharacterId,
    level: CharacterLevel,
    #[serde(default)]
    feats: ChoiceLedger<FeatOwner>,
    #[serde(default)]
    race_traits: ChoiceLedger<RaceTraitOwner>,
    #[serde(default)]
    class_features: ChoiceLedger<ClassFeatureOwner>,
    updated_at: DateTime<Utc>,
}

impl CharacterSelections {
    pub fn new(id: CharacterId, level: CharacterLevel, now: DateTime<Utc>) -> Self {
        Self {
            id,
            level,
            feats: ChoiceLedger::new(),
            race_traits: ChoiceLedger::new(),
            class_features: ChoiceLedger::new(),
            updated_at: now,
        }
    }

    pub fn id(&self) -> CharacterId {
        self.id
    }

    pub fn level(&self) -> CharacterLevel {
        self.level
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn ledger<K: SelectionKind>(&self) -> &ChoiceLedger<K> {
        K::ledger(self)
    }

    pub fn choose_entity<K: SelectionKind>(
        &mut self,
        entity: &OwningEntity<K>,
        now: DateTime<Utc>,
    ) -> Result<(), ChoiceError> {
        K::ledger_mut(self).choose_entity(entity, now)?;
        self.updated_at = now;
        Ok(())
    }

    pub fn choose_option<K: SelectionKind>(
        &mut self,
        entity: &OwningEntity<K>,
        option: K::OptionId,
        now: DateTime<Utc>,
    ) -> Result<(), ChoiceError> {
        let level = self.level;
        K::ledger_mut(self).choose_option(entity, option, level, now)?;
        self.updated_at = now;
        Ok(())
    }

    pub fn grant_automatic<K: SelectionKind>(
        &mut self,
        entity: &OwningEntity<K>,
        now: DateTime<Utc>,
    ) -> Result<Vec<K::OptionId>, ChoiceError> {
        let level = self.level;
        let granted = K::ledger_mut(self).grant_automatic(entity, level, now)?;
        if !granted.is_empty() {
            self.updated_at = now;
        }
        Ok(granted)
    }

    pub fn option_states<K: SelectionKind>(
        &self,
        entity: &OwningEntity<K>,
    ) -> Result<Vec<(K::OptionId, OptionState<K>)>, ChoiceError> {
        K::ledger(self).option_states(entity, self.level)
    }

    /// Raise the character's level. Levels never go down.
    pub fn level_up(
        &mut self,
        new_level: CharacterLevel,
        now: DateTime<Utc>,
    ) -> Result<(), ChoiceError> {
        if new_level <= self.level {
            return Err(ChoiceError::LevelNotRaised {
                current: self.level.value(),
                requested: new_level.value(),
            });
        }
        self.level = new_level;
        self.updated_at = now;
        Ok(())
    }
}
