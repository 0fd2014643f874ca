//! Option pools and their prerequisite chains.
//!
//! Every feat, race trait, and class feature owns a pool of options. An option
//! may name one prerequisite from the same pool; following prerequisites must
//! always terminate. The pool is only mutated through [`OwnedOptionGraph`],
//! which rejects any write that would create a cycle or point outside the pool.

use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;

use super::error::GraphError;
use super::owner::{GraphId, OwnerKind};
use super::walk::{walk, Walk};
use crate::value_objects::{ContentName, Description, LevelGate};

/// A selectable option within an entity's pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound = "")]
pub struct OptionNode<K: OwnerKind> {
    id: K::OptionId,
    owner_id: K::EntityId,
    name: ContentName,
    #[serde(default)]
    description: Description,
    #[serde(default)]
    required_option_id: Option<K::OptionId>,
    #[serde(default)]
    required_character_level: LevelGate,
    #[serde(default)]
    is_granted_automatically: bool,
}

impl<K: OwnerKind> OptionNode<K> {
    #[inline]
    pub fn id(&self) -> K::OptionId {
        self.id
    }

    #[inline]
    pub fn owner_id(&self) -> K::EntityId {
        self.owner_id
    }

    pub fn name(&self) -> &ContentName {
        &self.name
    }

    pub fn description(&self) -> &Description {
        &self.description
    }

    pub fn required_option_id(&self) -> Option<K::OptionId> {
        self.required_option_id
    }

    pub fn required_character_level(&self) -> LevelGate {
        self.required_character_level
    }

    pub fn is_granted_automatically(&self) -> bool {
        self.is_granted_automatically
    }
}

/// Input for a new option. The id and owner are assigned by the pool.
#[derive(Debug, Clone)]
pub struct OptionDraft<K: OwnerKind> {
    pub name: ContentName,
    pub description: Description,
    pub required_option_id: Option<K::OptionId>,
    pub required_character_level: LevelGate,
    pub is_granted_automatically: bool,
}

impl<K: OwnerKind> OptionDraft<K> {
    pub fn new(name: ContentName) -> Self {
        Self {
            name,
            description: Description::empty(),
            required_option_id: None,
            required_character_level: LevelGate::none(),
            is_granted_automatically: false,
        }
    }

    pub fn with_description(mut self, description: Description) -> Self {
        self.description = description;
        self
    }

    pub fn requires(mut self, option: K::OptionId) -> Self {
        self.required_option_id = Some(option);
        self
    }

    pub fn at_level(mut self, gate: LevelGate) -> Self {
        self.required_character_level = gate;
        self
    }

    pub fn granted_automatically(mut self) -> Self {
        self.is_granted_automatically = true;
        self
    }
}

/// One entity's option pool.
///
/// # Invariants
///
/// - Option ids are unique and every option's owner is this pool's owner
/// - Every prerequisite names an option in this pool
/// - Prerequisite chains are acyclic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedOptionGraph<K: OwnerKind> {
    owner_id: K::EntityId,
    options: Vec<OptionNode<K>>,
}

impl<K: OwnerKind> OwnedOptionGraph<K> {
    pub fn new(owner_id: K::EntityId) -> Self {
        Self {
            owner_id,
            options: Vec::new(),
        }
    }

    /// Rebuild a pool from stored options, rejecting any that break an invariant.
    pub fn from_options(
        owner_id: K::EntityId,
        options: Vec<OptionNode<K>>,
    ) -> Result<Self, GraphError> {
        let graph = Self { owner_id, options };
        graph.validate()?;
        Ok(graph)
    }

    /// Build a pool without checking it, so a validator can report every problem.
    pub(crate) fn unchecked(owner_id: K::EntityId, options: Vec<OptionNode<K>>) -> Self {
        Self { owner_id, options }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn owner_id(&self) -> K::EntityId {
        self.owner_id
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &OptionNode<K>> {
        self.options.iter()
    }

    pub fn get(&self, id: K::OptionId) -> Option<&OptionNode<K>> {
        self.options.iter().find(|o| o.id == id)
    }

    pub fn contains(&self, id: K::OptionId) -> bool {
        self.get(id).is_some()
    }

    fn required_of(&self, id: K::OptionId) -> Option<K::OptionId> {
        self.get(id).and_then(|o| o.required_option_id)
    }

    fn node_mut(&mut self, id: K::OptionId) -> Result<&mut OptionNode<K>, GraphError> {
        self.options
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or_else(|| GraphError::unknown(K::OPTION_LABEL, id))
    }

    /// Transitive prerequisites of an option, nearest first.
    pub fn ancestors(&self, id: K::OptionId) -> Result<Vec<K::OptionId>, GraphError> {
        if !self.contains(id) {
            return Err(GraphError::unknown(K::OPTION_LABEL, id));
        }
        match walk(
            id,
            self.len(),
            |n| self.required_of(n),
            |n| self.contains(n),
        ) {
            Walk::End(path) => Ok(path.into_iter().skip(1).collect()),
            Walk::Cycle(path) => Err(GraphError::cycle(K::OPTION_LABEL, &path)),
            Walk::Dangling { path, missing } => Err(GraphError::OutsidePool {
                kind: K::OPTION_LABEL,
                id: path.last().copied().unwrap_or(id).to_string(),
                required: missing.to_string(),
            }),
        }
    }

    /// Options that name `id` as their direct prerequisite.
    pub fn dependents(&self, id: K::OptionId) -> Vec<K::OptionId> {
        self.options
            .iter()
            .filter(|o| o.required_option_id == Some(id))
            .map(|o| o.id)
            .collect()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Add a new option to the pool.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::OutsidePool` if the prerequisite is not in this pool.
    pub fn add_option(&mut self, draft: OptionDraft<K>) -> Result<&OptionNode<K>, GraphError> {
        let id = K::OptionId::generate();
        if let Some(required) = draft.required_option_id {
            self.check_in_pool(id, required)?;
        }
        self.options.push(OptionNode {
            id,
            owner_id: self.owner_id,
            name: draft.name,
            description: draft.description,
            required_option_id: draft.required_option_id,
            required_character_level: draft.required_character_level,
            is_granted_automatically: draft.is_granted_automatically,
        });
        self.get(id)
            .ok_or_else(|| GraphError::unknown(K::OPTION_LABEL, id))
    }

    /// Point an option at a new prerequisite, or clear it.
    ///
    /// # Errors
    ///
    /// - `GraphError::UnknownNode` if `id` is not in this pool
    /// - `GraphError::OutsidePool` if `required` is not in this pool
    /// - `GraphError::Cycle` if the new link would close a loop
    pub fn set_required_option(
        &mut self,
        id: K::OptionId,
        required: Option<K::OptionId>,
    ) -> Result<(), GraphError> {
        if !self.contains(id) {
            return Err(GraphError::unknown(K::OPTION_LABEL, id));
        }
        if let Some(required) = required {
            self.check_in_pool(id, required)?;
            let next = |n: K::OptionId| {
                if n == id {
                    Some(required)
                } else {
                    self.required_of(n)
                }
            };
            if let Walk::Cycle(path) = walk(id, self.len(), next, |n| self.contains(n)) {
                return Err(GraphError::cycle(K::OPTION_LABEL, &path));
            }
        }
        self.node_mut(id)?.required_option_id = required;
        Ok(())
    }

    fn check_in_pool(&self, id: K::OptionId, required: K::OptionId) -> Result<(), GraphError> {
        if self.contains(required) {
            Ok(())
        } else {
            Err(GraphError::OutsidePool {
                kind: K::OPTION_LABEL,
                id: id.to_string(),
                required: required.to_string(),
            })
        }
    }

    pub fn update_details(
        &mut self,
        id: K::OptionId,
        name: ContentName,
        description: Description,
    ) -> Result<(), GraphError> {
        let node = self.node_mut(id)?;
        node.name = name;
        node.description = description;
        Ok(())
    }

    pub fn set_level_gate(&mut self, id: K::OptionId, gate: LevelGate) -> Result<(), GraphError> {
        self.node_mut(id)?.required_character_level = gate;
        Ok(())
    }

    pub fn set_granted_automatically(
        &mut self,
        id: K::OptionId,
        granted: bool,
    ) -> Result<(), GraphError> {
        self.node_mut(id)?.is_granted_automatically = granted;
        Ok(())
    }

    /// Remove an option nothing depends on.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::ReferencedByOthers` while any option still names it
    /// as a prerequisite. Callers must re-point or remove those first.
    pub fn remove_option(&mut self, id: K::OptionId) -> Result<OptionNode<K>, GraphError> {
        let position = self
            .options
            .iter()
            .position(|o| o.id == id)
            .ok_or_else(|| GraphError::unknown(K::OPTION_LABEL, id))?;
        let dependents = self.dependents(id);
        if !dependents.is_empty() {
            return Err(GraphError::ReferencedByOthers {
                kind: K::OPTION_LABEL,
                id: id.to_string(),
                dependents: dependents.iter().map(ToString::to_string).collect(),
            });
        }
        Ok(self.options.remove(position))
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Every invariant violation in this pool.
    pub fn problems(&self) -> Vec<GraphError> {
        let mut problems = Vec::new();
        let mut seen = HashSet::new();

        for node in &self.options {
            if !seen.insert(node.id) {
                problems.push(GraphError::DuplicateId {
                    kind: K::OPTION_LABEL,
                    id: node.id.to_string(),
                });
            }
            if node.owner_id != self.owner_id {
                problems.push(GraphError::OwnerMismatch {
                    kind: K::OPTION_LABEL,
                    id: node.id.to_string(),
                    expected: self.owner_id.to_string(),
                    actual: node.owner_id.to_string(),
                });
            }
            if let Some(required) = node.required_option_id {
                if let Err(e) = self.check_in_pool(node.id, required) {
                    problems.push(e);
                }
            }
        }

        let mut reported_cycles = HashSet::new();
        for node in &self.options {
            if let Walk::Cycle(path) = walk(
                node.id,
                self.len(),
                |n| self.required_of(n),
                |n| self.contains(n),
            ) {
                let cycle = cycle_portion(&path);
                let mut members: Vec<String> = cycle
                    .iter()
                    .skip(1)
                    .map(ToString::to_string)
                    .collect();
                members.sort();
                if reported_cycles.insert(members) {
                    problems.push(GraphError::cycle(K::OPTION_LABEL, cycle));
                }
            }
        }

        problems
    }

    /// First invariant violation, if any.
    pub fn validate(&self) -> Result<(), GraphError> {
        match self.problems().into_iter().next() {
            Some(problem) => Err(problem),
            None => Ok(()),
        }
    }
}

/// The loop at the end of a cyclic walk, closed on both ends.
pub(crate) fn cycle_portion<I: PartialEq>(path: &[I]) -> &[I] {
    match path.last() {
        Some(last) => {
            let start = path.iter().position(|p| p == last).unwrap_or(0);
            &path[start..]
        }
        None => path,
    }
}

impl<K: OwnerKind> Serialize for OwnedOptionGraph<K> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.options)
    }
}
