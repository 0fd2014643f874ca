//! Whole-pool validation over a content snapshot.
//!
//! Mutation paths refuse bad writes one at a time. The validator instead takes
//! everything of one kind as loaded (possibly written by older tools) and lists
//! every problem it finds, so an audit can report them all at once.

use std::collections::{HashMap, HashSet};

use super::entity::OwningEntity;
use super::error::GraphError;
use super::owner::OwnerKind;
use super::replacement::{ReplacementGraph, ReplacementLink};
use crate::ids::ModifierId;
use crate::modifiers::{ReferenceLookup, ReferenceResolution, ResolvedReference};

/// Everything wrong with one pool snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    pub kind: &'static str,
    pub entities: usize,
    pub options: usize,
    pub modifiers: usize,
    pub problems: Vec<GraphError>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.problems.is_empty()
    }

    /// First problem, if any.
    pub fn into_result(self) -> Result<(), GraphError> {
        match self.problems.into_iter().next() {
            Some(problem) => Err(problem),
            None => Ok(()),
        }
    }
}

/// A modifier reference that did not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceIssue {
    pub entity: String,
    pub modifier: ModifierId,
    pub reference: ResolvedReference,
}

impl ReferenceIssue {
    pub fn is_invalid(&self) -> bool {
        self.reference.resolution == ReferenceResolution::Invalid
    }
}

pub struct GraphValidator;

impl GraphValidator {
    /// Validate every entity of one kind together.
    pub fn validate<K: OwnerKind>(entities: &[OwningEntity<K>]) -> ValidationReport {
        let mut problems = Vec::new();

        // Which entity owns each option, across the whole snapshot
        let mut option_owner = HashMap::new();
        for entity in entities {
            for option in entity.options().iter() {
                option_owner.entry(option.id()).or_insert(entity.id());
            }
        }

        for entity in entities {
            let pool = entity.options();
            problems.extend(
                pool.problems()
                    .into_iter()
                    .filter(|p| !matches!(p, GraphError::OutsidePool { .. })),
            );

            for option in pool.iter() {
                let Some(required) = option.required_option_id() else {
                    continue;
                };
                if pool.contains(required) {
                    continue;
                }
                let problem = if option_owner.contains_key(&required) {
                    GraphError::OutsidePool {
                        kind: K::OPTION_LABEL,
                        id: option.id().to_string(),
                        required: required.to_string(),
                    }
                } else {
                    GraphError::Dangling {
                        kind: K::OPTION_LABEL,
                        id: option.id().to_string(),
                        target: required.to_string(),
                    }
                };
                problems.push(problem);
            }

            let expected = K::modifier_owner(entity.id());
            for modifier in entity.modifiers() {
                if modifier.owner() != expected {
                    problems.push(GraphError::ModifierOwnerMismatch {
                        entity: expected.to_string(),
                        modifier: modifier.id().to_string(),
                        actual: modifier.owner().to_string(),
                    });
                }
            }
        }

        let replacements = ReplacementGraph::<K>::unchecked(entities.iter().map(|e| {
            ReplacementLink {
                entity: e.id(),
                replaces: e.replaces_id(),
            }
        }));
        problems.extend(replacements.problems());

        if K::REPLACEABLE {
            problems.extend(Self::replaced_still_required(entities, &option_owner));
        }

        ValidationReport {
            kind: K::ENTITY_LABEL,
            entities: entities.len(),
            options: entities.iter().map(|e| e.options().len()).sum(),
            modifiers: entities.iter().map(|e| e.modifiers().len()).sum(),
            problems,
        }
    }

    /// A replaced entity's options must not be prerequisites of any other
    /// live entity's options.
    fn replaced_still_required<K: OwnerKind>(
        entities: &[OwningEntity<K>],
        option_owner: &HashMap<K::OptionId, K::EntityId>,
    ) -> Vec<GraphError> {
        let replaced: HashMap<K::EntityId, K::EntityId> = entities
            .iter()
            .filter_map(|e| e.replaces_id().map(|target| (target, e.id())))
            .collect();
        if replaced.is_empty() {
            return Vec::new();
        }

        let mut problems = Vec::new();
        let mut reported = HashSet::new();
        for entity in entities {
            for option in entity.options().iter() {
                let Some(required) = option.required_option_id() else {
                    continue;
                };
                let Some(required_owner) = option_owner.get(&required) else {
                    continue;
                };
                if *required_owner == entity.id() {
                    continue;
                }
                let Some(replaced_by) = replaced.get(required_owner) else {
                    continue;
                };
                if reported.insert((option.id(), required)) {
                    problems.push(GraphError::ReplacedIsRequired {
                        kind: K::ENTITY_LABEL,
                        replaced: required_owner.to_string(),
                        replaced_by: replaced_by.to_string(),
                        required_option: required.to_string(),
                        required_by: option.id().to_string(),
                    });
                }
            }
        }
        problems
    }

    /// Modifier references that did not resolve against `lookup`.
    pub fn check_references<K: OwnerKind>(
        entities: &[OwningEntity<K>],
        lookup: &impl ReferenceLookup,
    ) -> Vec<ReferenceIssue> {
        entities
            .iter()
            .flat_map(|entity| {
                entity.modifiers().iter().flat_map(move |modifier| {
                    modifier
                        .variant()
                        .map(|v| v.resolve_references(lookup))
                        .unwrap_or_default()
                        .into_iter()
                        .filter(|r| r.resolution != ReferenceResolution::Resolved)
                        .map(move |reference| ReferenceIssue {
                            entity: K::modifier_owner(entity.id()).to_string(),
                            modifier: modifier.id(),
                            reference,
                        })
                })
            })
            .collect()
    }
}
