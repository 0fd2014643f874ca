//! Option states for one entity's pool, given what a character has chosen.
//!
//! Pure functions over a snapshot: nothing here mutates a ledger.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::error::ChoiceError;
use crate::graph::{OwnedOptionGraph, OwnerKind};
use crate::value_objects::{CharacterLevel, LevelGate};

/// What a character has chosen from one entity's pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceSnapshot<K: OwnerKind> {
    pub chosen: HashSet<K::OptionId>,
    pub level: CharacterLevel,
    /// The owning entity has been replaced for this character
    pub superseded: bool,
}

impl<K: OwnerKind> ChoiceSnapshot<K> {
    pub fn new(level: CharacterLevel) -> Self {
        Self {
            chosen: HashSet::new(),
            level,
            superseded: false,
        }
    }

    pub fn with_chosen(mut self, chosen: impl IntoIterator<Item = K::OptionId>) -> Self {
        self.chosen.extend(chosen);
        self
    }
}

/// Where an option stands for a character.
///
/// Transitions: Locked -> Available -> Chosen, and any state -> Superseded.
/// Chosen only leaves through supersession.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "state",
    rename_all = "camelCase",
    rename_all_fields = "camelCase",
    bound = ""
)]
pub enum OptionState<K: OwnerKind> {
    Available,
    Chosen,
    Locked {
        /// Unchosen prerequisites, nearest first
        missing: Vec<K::OptionId>,
        /// Level gate not yet met
        required_level: Option<LevelGate>,
    },
    Superseded,
}

pub(crate) fn option_label<K: OwnerKind>(id: K::OptionId) -> String {
    format!("{} {}", K::OPTION_LABEL, id)
}

fn entity_label<K: OwnerKind>(graph: &OwnedOptionGraph<K>) -> String {
    K::modifier_owner(graph.owner_id()).to_string()
}

fn missing_ancestors<K: OwnerKind>(
    graph: &OwnedOptionGraph<K>,
    option: K::OptionId,
    chosen: &HashSet<K::OptionId>,
) -> Result<Vec<K::OptionId>, ChoiceError> {
    Ok(graph
        .ancestors(option)?
        .into_iter()
        .filter(|a| !chosen.contains(a))
        .collect())
}

/// State of one option.
pub fn option_state<K: OwnerKind>(
    graph: &OwnedOptionGraph<K>,
    option: K::OptionId,
    snapshot: &ChoiceSnapshot<K>,
) -> Result<OptionState<K>, ChoiceError> {
    let node = graph.get(option).ok_or_else(|| ChoiceError::UnknownOption {
        entity: entity_label(graph),
        option: option_label::<K>(option),
    })?;

    if snapshot.superseded {
        return Ok(OptionState::Superseded);
    }
    if snapshot.chosen.contains(&option) {
        return Ok(OptionState::Chosen);
    }

    let missing = missing_ancestors(graph, option, &snapshot.chosen)?;
    let gate = node.required_character_level();
    let required_level = (!snapshot.level.meets(gate)).then_some(gate);

    if missing.is_empty() && required_level.is_none() {
        Ok(OptionState::Available)
    } else {
        Ok(OptionState::Locked {
            missing,
            required_level,
        })
    }
}

/// States of every option in the pool, in pool order.
pub fn resolve_option_states<K: OwnerKind>(
    graph: &OwnedOptionGraph<K>,
    snapshot: &ChoiceSnapshot<K>,
) -> Result<Vec<(K::OptionId, OptionState<K>)>, ChoiceError> {
    graph
        .iter()
        .map(|node| Ok((node.id(), option_state(graph, node.id(), snapshot)?)))
        .collect()
}

/// Check that `option` can move to Chosen.
///
/// Prerequisites are checked before the level gate, so a character missing
/// both sees the prerequisite first.
pub(crate) fn check_choosable<K: OwnerKind>(
    graph: &OwnedOptionGraph<K>,
    option: K::OptionId,
    snapshot: &ChoiceSnapshot<K>,
) -> Result<(), ChoiceError> {
    match option_state(graph, option, snapshot)? {
        OptionState::Available => Ok(()),
        OptionState::Chosen => Err(ChoiceError::AlreadyChosen {
            id: option_label::<K>(option),
        }),
        OptionState::Superseded => Err(ChoiceError::Superseded {
            entity: entity_label(graph),
            by: "a replacement".to_string(),
        }),
        OptionState::Locked {
            missing,
            required_level,
        } => {
            if !missing.is_empty() {
                return Err(ChoiceError::PrerequisiteUnmet {
                    option: option_label::<K>(option),
                    missing: missing.into_iter().map(option_label::<K>).collect(),
                });
            }
            let required = required_level.map(|g| g.value()).unwrap_or_default();
            Err(ChoiceError::LevelTooLow {
                option: option_label::<K>(option),
                required,
                actual: snapshot.level.value(),
            })
        }
    }
}

/// Re-check a stored choice set against the current pool.
///
/// Content edits can invalidate earlier choices; this lists every chosen
/// option that no longer holds up.
pub fn validate_choice_set<K: OwnerKind>(
    graph: &OwnedOptionGraph<K>,
    chosen: &HashSet<K::OptionId>,
    level: CharacterLevel,
) -> Vec<ChoiceError> {
    let mut problems: Vec<ChoiceError> = chosen
        .iter()
        .filter(|id| !graph.contains(**id))
        .map(|id| ChoiceError::UnknownOption {
            entity: entity_label(graph),
            option: option_label::<K>(*id),
        })
        .collect();

    for node in graph.iter().filter(|n| chosen.contains(&n.id())) {
        match missing_ancestors(graph, node.id(), chosen) {
            Ok(missing) if !missing.is_empty() => {
                problems.push(ChoiceError::PrerequisiteUnmet {
                    option: option_label::<K>(node.id()),
                    missing: missing.into_iter().map(option_label::<K>).collect(),
                });
            }
            Ok(_) => {}
            Err(e) => problems.push(e),
        }
        let gate = node.required_character_level();
        if !level.meets(gate) {
            problems.push(ChoiceError::LevelTooLow {
                option: option_label::<K>(node.id()),
                required: gate.value(),
                actual: level.value(),
            });
        }
    }

    problems
}
