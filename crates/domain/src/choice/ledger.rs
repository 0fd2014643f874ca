//! Append-only record of a character's choices for one owner kind.
//!
//! There is no way to un-choose: every event is permanent, and an entity's
//! options leave the Chosen state only when a later entity supersedes it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::error::ChoiceError;
use super::resolver::{self, ChoiceSnapshot, OptionState};
use crate::graph::{OwnerKind, OwningEntity};
use crate::value_objects::CharacterLevel;

/// One recorded choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase", bound = "")]
pub enum ChoiceEvent<K: OwnerKind> {
    EntityChosen {
        entity: K::EntityId,
        supersedes: Option<K::EntityId>,
        at: DateTime<Utc>,
    },
    OptionChosen {
        entity: K::EntityId,
        option: K::OptionId,
        at: DateTime<Utc>,
    },
}

/// Where an entity stands for a character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityState<K: OwnerKind> {
    Available,
    Chosen,
    Superseded { by: K::EntityId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent, bound = "")]
pub struct ChoiceLedger<K: OwnerKind> {
    events: Vec<ChoiceEvent<K>>,
}

impl<K: OwnerKind> Default for ChoiceLedger<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: OwnerKind> ChoiceLedger<K> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn events(&self) -> &[ChoiceEvent<K>] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn is_entity_chosen(&self, entity: K::EntityId) -> bool {
        self.events.iter().any(|e| {
            matches!(e, ChoiceEvent::EntityChosen { entity: chosen, .. } if *chosen == entity)
        })
    }

    /// The chosen entity that replaced `entity`, if any.
    pub fn superseded_by(&self, entity: K::EntityId) -> Option<K::EntityId> {
        self.events.iter().find_map(|e| match e {
            ChoiceEvent::EntityChosen {
                entity: by,
                supersedes: Some(target),
                ..
            } if *target == entity => Some(*by),
            _ => None,
        })
    }

    pub fn entity_state(&self, entity: K::EntityId) -> EntityState<K> {
        if let Some(by) = self.superseded_by(entity) {
            EntityState::Superseded { by }
        } else if self.is_entity_chosen(entity) {
            EntityState::Chosen
        } else {
            EntityState::Available
        }
    }

    /// Chosen entities that nothing has superseded, in choice order.
    pub fn active_entities(&self) -> Vec<K::EntityId> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ChoiceEvent::EntityChosen { entity, .. } => Some(*entity),
                ChoiceEvent::OptionChosen { .. } => None,
            })
            .filter(|entity| self.superseded_by(*entity).is_none())
            .collect()
    }

    /// Options chosen from one entity's pool.
    pub fn chosen_options(&self, entity: K::EntityId) -> HashSet<K::OptionId> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ChoiceEvent::OptionChosen {
                    entity: owner,
                    option,
                    ..
                } if *owner == entity => Some(*option),
                _ => None,
            })
            .collect()
    }

    pub fn snapshot(&self, entity: K::EntityId, level: CharacterLevel) -> ChoiceSnapshot<K> {
        ChoiceSnapshot {
            chosen: self.chosen_options(entity),
            level,
            superseded: self.superseded_by(entity).is_some(),
        }
    }

    /// Per-option states for one entity at the given level.
    pub fn option_states(
        &self,
        entity: &OwningEntity<K>,
        level: CharacterLevel,
    ) -> Result<Vec<(K::OptionId, OptionState<K>)>, ChoiceError> {
        resolver::resolve_option_states(entity.options(), &self.snapshot(entity.id(), level))
    }

    /// Chosen options of one entity that no longer hold up against its pool.
    pub fn recheck(&self, entity: &OwningEntity<K>, level: CharacterLevel) -> Vec<ChoiceError> {
        resolver::validate_choice_set(entity.options(), &self.chosen_options(entity.id()), level)
    }

    // =========================================================================
    // Choices
    // =========================================================================

    fn ensure_not_superseded(&self, entity: K::EntityId) -> Result<(), ChoiceError> {
        match self.superseded_by(entity) {
            Some(by) => Err(ChoiceError::Superseded {
                entity: K::modifier_owner(entity).to_string(),
                by: K::modifier_owner(by).to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Choose an entity. If it replaces another, that one becomes Superseded.
    pub fn choose_entity(
        &mut self,
        entity: &OwningEntity<K>,
        at: DateTime<Utc>,
    ) -> Result<(), ChoiceError> {
        self.ensure_not_superseded(entity.id())?;
        if self.is_entity_chosen(entity.id()) {
            return Err(ChoiceError::AlreadyChosen {
                id: K::modifier_owner(entity.id()).to_string(),
            });
        }
        self.events.push(ChoiceEvent::EntityChosen {
            entity: entity.id(),
            supersedes: entity.replaces_id(),
            at,
        });
        Ok(())
    }

    /// Choose one option from an already chosen entity.
    ///
    /// # Errors
    ///
    /// - `ChoiceError::UnknownOption` if the option is not in the entity's pool
    /// - `ChoiceError::Superseded` if the entity has been replaced
    /// - `ChoiceError::OwnerNotSelected` if the entity has not been chosen
    /// - `ChoiceError::AlreadyChosen` if the option is already chosen
    /// - `ChoiceError::PrerequisiteUnmet` if an ancestor is not chosen
    /// - `ChoiceError::LevelTooLow` if the level gate is not met
    pub fn choose_option(
        &mut self,
        entity: &OwningEntity<K>,
        option: K::OptionId,
        level: CharacterLevel,
        at: DateTime<Utc>,
    ) -> Result<(), ChoiceError> {
        if !entity.options().contains(option) {
            return Err(ChoiceError::UnknownOption {
                entity: K::modifier_owner(entity.id()).to_string(),
                option: resolver::option_label::<K>(option),
            });
        }
        self.ensure_not_superseded(entity.id())?;
        if !self.is_entity_chosen(entity.id()) {
            return Err(ChoiceError::OwnerNotSelected {
                entity: K::modifier_owner(entity.id()).to_string(),
            });
        }
        resolver::check_choosable(entity.options(), option, &self.snapshot(entity.id(), level))?;
        self.events.push(ChoiceEvent::OptionChosen {
            entity: entity.id(),
            option,
            at,
        });
        Ok(())
    }

    /// Choose every automatically granted option that is now available,
    /// repeating until nothing changes so granted chains resolve in one call.
    ///
    /// Returns the options granted, in grant order.
    pub fn grant_automatic(
        &mut self,
        entity: &OwningEntity<K>,
        level: CharacterLevel,
        at: DateTime<Utc>,
    ) -> Result<Vec<K::OptionId>, ChoiceError> {
        if self.entity_state(entity.id()) != EntityState::Chosen {
            return Ok(Vec::new());
        }

        let mut granted = Vec::new();
        loop {
            let snapshot = self.snapshot(entity.id(), level);
            let mut ready = Vec::new();
            for node in entity.options().iter() {
                if node.is_granted_automatically()
                    && resolver::option_state(entity.options(), node.id(), &snapshot)?
                        == OptionState::Available
                {
                    ready.push(node.id());
                }
            }
            if ready.is_empty() {
                return Ok(granted);
            }
            for option in ready {
                self.events.push(ChoiceEvent::OptionChosen {
                    entity: entity.id(),
                    option,
                    at,
                });
                granted.push(option);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ClassFeatureOwner, FeatOwner, OptionDraft, RaceTraitOwner};
    use crate::value_objects::{ContentName, LevelGate};

    fn name(text: &str) -> ContentName {
        ContentName::new(text).unwrap()
    }

    fn level(n: u8) -> CharacterLevel {
        CharacterLevel::new(n).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn option_requires_chosen_owner() {
        let mut feat = OwningEntity::<FeatOwner>::new(name("Lucky"));
        let option = feat
            .options_mut()
            .add_option(OptionDraft::new(name("Reroll")))
            .unwrap()
            .id();
        let mut ledger = ChoiceLedger::new();

        assert!(matches!(
            ledger.choose_option(&feat, option, level(1), now()),
            Err(ChoiceError::OwnerNotSelected { .. })
        ));
        ledger.choose_entity(&feat, now()).unwrap();
        ledger.choose_option(&feat, option, level(1), now()).unwrap();
        assert!(matches!(
            ledger.choose_option(&feat, option, level(1), now()),
            Err(ChoiceError::AlreadyChosen { .. })
        ));
    }

    #[test]
    fn level_gate_then_level_up() {
        let mut feat = OwningEntity::<FeatOwner>::new(name("Mage Slayer"));
        let gated = feat
            .options_mut()
            .add_option(OptionDraft::new(name("Gated")).at_level(LevelGate::new(3).unwrap()))
            .unwrap()
            .id();
        let mut ledger = ChoiceLedger::new();
        ledger.choose_entity(&feat, now()).unwrap();

        assert!(matches!(
            ledger.choose_option(&feat, gated, level(2), now()),
            Err(ChoiceError::LevelTooLow {
                required: 3,
                actual: 2,
                ..
            })
        ));
        ledger.choose_option(&feat, gated, level(3), now()).unwrap();
        assert!(ledger.chosen_options(feat.id()).contains(&gated));
    }

    #[test]
    fn prerequisites_reported_before_level() {
        let mut feat = OwningEntity::<FeatOwner>::new(name("Tiered"));
        let base = feat
            .options_mut()
            .add_option(OptionDraft::new(name("Base")))
            .unwrap()
            .id();
        let top = feat
            .options_mut()
            .add_option(
                OptionDraft::new(name("Top"))
                    .requires(base)
                    .at_level(LevelGate::new(5).unwrap()),
            )
            .unwrap()
            .id();
        let mut ledger = ChoiceLedger::new();
        ledger.choose_entity(&feat, now()).unwrap();

        assert!(matches!(
            ledger.choose_option(&feat, top, level(1), now()),
            Err(ChoiceError::PrerequisiteUnmet { .. })
        ));
        ledger.choose_option(&feat, base, level(1), now()).unwrap();
        assert!(matches!(
            ledger.choose_option(&feat, top, level(1), now()),
            Err(ChoiceError::LevelTooLow { .. })
        ));
    }

    #[test]
    fn replacement_supersedes_chosen_entity() {
        let mut base = OwningEntity::<ClassFeatureOwner>::new(name("Fighting Style"));
        let option = base
            .options_mut()
            .add_option(OptionDraft::new(name("Archery")))
            .unwrap()
            .id();
        let sub = OwningEntity::<ClassFeatureOwner>::new(name("Superior Style")).with_replaces(base.id());

        let mut ledger = ChoiceLedger::new();
        ledger.choose_entity(&base, now()).unwrap();
        ledger.choose_option(&base, option, level(1), now()).unwrap();
        ledger.choose_entity(&sub, now()).unwrap();

        assert_eq!(
            ledger.entity_state(base.id()),
            EntityState::Superseded { by: sub.id() }
        );
        assert_eq!(ledger.active_entities(), vec![sub.id()]);
        let states = ledger.option_states(&base, level(1)).unwrap();
        assert_eq!(states, vec![(option, OptionState::Superseded)]);
        assert!(matches!(
            ledger.choose_entity(&base, now()),
            Err(ChoiceError::Superseded { .. })
        ));
    }

    #[test]
    fn superseding_an_unchosen_entity_blocks_it() {
        let base = OwningEntity::<RaceTraitOwner>::new(name("Keen Senses"));
        let sub = OwningEntity::<RaceTraitOwner>::new(name("Keener Senses")).with_replaces(base.id());
        let mut ledger = ChoiceLedger::new();
        ledger.choose_entity(&sub, now()).unwrap();
        assert!(matches!(
            ledger.choose_entity(&base, now()),
            Err(ChoiceError::Superseded { .. })
        ));
    }

    #[test]
    fn automatic_grants_follow_chains() {
        let mut trait_ = OwningEntity::<RaceTraitOwner>::new(name("Draconic Ancestry"));
        let first = trait_
            .options_mut()
            .add_option(OptionDraft::new(name("Breath")).granted_automatically())
            .unwrap()
            .id();
        let second = trait_
            .options_mut()
            .add_option(
                OptionDraft::new(name("Stronger Breath"))
                    .requires(first)
                    .granted_automatically(),
            )
            .unwrap()
            .id();
        let gated = trait_
            .options_mut()
            .add_option(
                OptionDraft::new(name("Wings"))
                    .granted_automatically()
                    .at_level(LevelGate::new(5).unwrap()),
            )
            .unwrap()
            .id();
        let manual = trait_
            .options_mut()
            .add_option(OptionDraft::new(name("Manual")))
            .unwrap()
            .id();

        let mut ledger = ChoiceLedger::new();
        assert!(ledger
            .grant_automatic(&trait_, level(1), now())
            .unwrap()
            .is_empty());

        ledger.choose_entity(&trait_, now()).unwrap();
        let granted = ledger.grant_automatic(&trait_, level(1), now()).unwrap();
        assert_eq!(granted, vec![first, second]);

        let later = ledger.grant_automatic(&trait_, level(5), now()).unwrap();
        assert_eq!(later, vec![gated]);
        assert!(!ledger.chosen_options(trait_.id()).contains(&manual));
    }

    #[test]
    fn ledger_serializes_as_event_list() {
        let feat = OwningEntity::<FeatOwner>::new(name("Tough"));
        let mut ledger = ChoiceLedger::new();
        ledger.choose_entity(&feat, now()).unwrap();

        let json = serde_json::to_value(&ledger).unwrap();
        assert_eq!(json[0]["event"], "entityChosen");
        assert!(json[0]["supersedes"].is_null());
        let back: ChoiceLedger<FeatOwner> = serde_json::from_value(json).unwrap();
        assert_eq!(back, ledger);
    }
}
