//! Replacement links between entities of one kind.
//!
//! A race trait or class feature may replace another of its kind (a subclass
//! feature replacing the base one, a subrace trait replacing the parent's).
//! Each entity names at most one target and following targets must terminate.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::error::GraphError;
use super::option::cycle_portion;
use super::owner::{OwnerKind, Replaceable};
use super::walk::{walk, Walk};

/// One entity and the entity it replaces, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound = "")]
pub struct ReplacementLink<K: OwnerKind> {
    pub entity: K::EntityId,
    pub replaces: Option<K::EntityId>,
}

/// Replacement links for every entity in a pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplacementGraph<K: OwnerKind> {
    links: Vec<ReplacementLink<K>>,
}

impl<K: Replaceable> ReplacementGraph<K> {
    pub fn new() -> Self {
        Self { links: Vec::new() }
    }

    /// Rebuild from stored links, rejecting duplicates, dangling targets, and cycles.
    pub fn from_links(
        links: impl IntoIterator<Item = ReplacementLink<K>>,
    ) -> Result<Self, GraphError> {
        let graph = Self::unchecked(links);
        graph.validate()?;
        Ok(graph)
    }

    /// Register an entity, optionally replacing one already registered.
    pub fn insert(
        &mut self,
        entity: K::EntityId,
        replaces: Option<K::EntityId>,
    ) -> Result<(), GraphError> {
        if self.contains(entity) {
            return Err(GraphError::DuplicateId {
                kind: K::ENTITY_LABEL,
                id: entity.to_string(),
            });
        }
        self.links.push(ReplacementLink {
            entity,
            replaces: None,
        });
        if let Err(e) = self.set_replacement(entity, replaces) {
            self.links.pop();
            return Err(e);
        }
        Ok(())
    }

    /// Point an entity at a new replacement target, or clear it.
    ///
    /// # Errors
    ///
    /// - `GraphError::UnknownNode` if `entity` is not registered
    /// - `GraphError::Dangling` if `target` is not registered
    /// - `GraphError::Cycle` if the link would close a loop
    pub fn set_replacement(
        &mut self,
        entity: K::EntityId,
        target: Option<K::EntityId>,
    ) -> Result<(), GraphError> {
        let position = self
            .position(entity)
            .ok_or_else(|| GraphError::unknown(K::ENTITY_LABEL, entity))?;
        if let Some(target) = target {
            if !self.contains(target) {
                return Err(GraphError::Dangling {
                    kind: K::ENTITY_LABEL,
                    id: entity.to_string(),
                    target: target.to_string(),
                });
            }
            let next = |n: K::EntityId| {
                if n == entity {
                    Some(target)
                } else {
                    self.target_of(n)
                }
            };
            if let Walk::Cycle(path) = walk(entity, self.links.len(), next, |n| self.contains(n)) {
                return Err(GraphError::cycle(K::ENTITY_LABEL, &path));
            }
        }
        self.links[position].replaces = target;
        Ok(())
    }

    /// Drop an entity that nothing replaces.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::ReferencedByOthers` while another entity replaces it.
    pub fn remove_entity(&mut self, entity: K::EntityId) -> Result<ReplacementLink<K>, GraphError> {
        let position = self
            .position(entity)
            .ok_or_else(|| GraphError::unknown(K::ENTITY_LABEL, entity))?;
        let replaced_by = self.replaced_by(entity);
        if !replaced_by.is_empty() {
            return Err(GraphError::ReferencedByOthers {
                kind: K::ENTITY_LABEL,
                id: entity.to_string(),
                dependents: replaced_by.iter().map(ToString::to_string).collect(),
            });
        }
        Ok(self.links.remove(position))
    }

    /// The entity followed by everything it transitively replaces.
    pub fn chain(&self, entity: K::EntityId) -> Result<Vec<K::EntityId>, GraphError> {
        if !self.contains(entity) {
            return Err(GraphError::unknown(K::ENTITY_LABEL, entity));
        }
        match walk(
            entity,
            self.links.len(),
            |n| self.target_of(n),
            |n| self.contains(n),
        ) {
            Walk::End(path) => Ok(path),
            Walk::Cycle(path) => Err(GraphError::cycle(K::ENTITY_LABEL, &path)),
            Walk::Dangling { path, missing } => Err(GraphError::Dangling {
                kind: K::ENTITY_LABEL,
                id: path.last().copied().unwrap_or(entity).to_string(),
                target: missing.to_string(),
            }),
        }
    }
}

impl<K: Replaceable> Default for ReplacementGraph<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: OwnerKind> ReplacementGraph<K> {
    pub(crate) fn unchecked(links: impl IntoIterator<Item = ReplacementLink<K>>) -> Self {
        Self {
            links: links.into_iter().collect(),
        }
    }

    fn position(&self, entity: K::EntityId) -> Option<usize> {
        self.links.iter().position(|l| l.entity == entity)
    }

    pub fn contains(&self, entity: K::EntityId) -> bool {
        self.position(entity).is_some()
    }

    pub fn target_of(&self, entity: K::EntityId) -> Option<K::EntityId> {
        self.links
            .iter()
            .find(|l| l.entity == entity)
            .and_then(|l| l.replaces)
    }

    /// Entities that name `entity` as their replacement target.
    pub fn replaced_by(&self, entity: K::EntityId) -> Vec<K::EntityId> {
        self.links
            .iter()
            .filter(|l| l.replaces == Some(entity))
            .map(|l| l.entity)
            .collect()
    }

    pub fn links(&self) -> &[ReplacementLink<K>] {
        &self.links
    }

    /// Every invariant violation among the links.
    pub fn problems(&self) -> Vec<GraphError> {
        let mut problems = Vec::new();
        let mut seen = HashSet::new();

        for link in &self.links {
            if !seen.insert(link.entity) {
                problems.push(GraphError::DuplicateId {
                    kind: K::ENTITY_LABEL,
                    id: link.entity.to_string(),
                });
            }
            let Some(target) = link.replaces else {
                continue;
            };
            if !K::REPLACEABLE {
                problems.push(GraphError::ReplacementUnsupported {
                    kind: K::ENTITY_LABEL,
                    id: link.entity.to_string(),
                });
            } else if !self.contains(target) {
                problems.push(GraphError::Dangling {
                    kind: K::ENTITY_LABEL,
                    id: link.entity.to_string(),
                    target: target.to_string(),
                });
            }
        }

        if K::REPLACEABLE {
            let mut reported_cycles = HashSet::new();
            for link in &self.links {
                if let Walk::Cycle(path) = walk(
                    link.entity,
                    self.links.len(),
                    |n| self.target_of(n),
                    |n| self.contains(n),
                ) {
                    let cycle = cycle_portion(&path);
                    let mut members: Vec<String> =
                        cycle.iter().skip(1).map(ToString::to_string).collect();
                    members.sort();
                    if reported_cycles.insert(members) {
                        problems.push(GraphError::cycle(K::ENTITY_LABEL, cycle));
                    }
                }
            }
        }

        problems
    }

    pub fn validate(&self) -> Result<(), GraphError> {
        match self.problems().into_iter().next() {
            Some(problem) => Err(problem),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::owner::{ClassFeatureOwner, FeatOwner, RaceTraitOwner};
    use crate::ids::{ClassFeatureId, FeatId, RaceTraitId};

    #[test]
    fn chain_follows_targets() {
        let base = ClassFeatureId::new();
        let sub = ClassFeatureId::new();
        let subsub = ClassFeatureId::new();
        let mut graph = ReplacementGraph::<ClassFeatureOwner>::new();
        graph.insert(base, None).unwrap();
        graph.insert(sub, Some(base)).unwrap();
        graph.insert(subsub, Some(sub)).unwrap();

        assert_eq!(graph.chain(subsub).unwrap(), vec![subsub, sub, base]);
        assert_eq!(graph.replaced_by(base), vec![sub]);
    }

    #[test]
    fn replacement_loop_is_rejected() {
        let a = RaceTraitId::new();
        let b = RaceTraitId::new();
        let mut graph = ReplacementGraph::<RaceTraitOwner>::new();
        graph.insert(a, None).unwrap();
        graph.insert(b, Some(a)).unwrap();

        assert!(matches!(
            graph.set_replacement(a, Some(b)),
            Err(GraphError::Cycle { .. })
        ));
        assert!(matches!(
            graph.set_replacement(a, Some(a)),
            Err(GraphError::Cycle { .. })
        ));
        assert_eq!(graph.target_of(a), None);
    }

    #[test]
    fn insert_with_unknown_target_is_rolled_back() {
        let mut graph = ReplacementGraph::<RaceTraitOwner>::new();
        let lone = RaceTraitId::new();
        let err = graph.insert(lone, Some(RaceTraitId::new())).unwrap_err();
        assert!(matches!(err, GraphError::Dangling { .. }));
        assert!(!graph.contains(lone));
    }

    #[test]
    fn removing_a_replaced_entity_is_refused() {
        let base = ClassFeatureId::new();
        let sub = ClassFeatureId::new();
        let mut graph = ReplacementGraph::<ClassFeatureOwner>::new();
        graph.insert(base, None).unwrap();
        graph.insert(sub, Some(base)).unwrap();

        assert!(matches!(
            graph.remove_entity(base),
            Err(GraphError::ReferencedByOthers { .. })
        ));
        graph.set_replacement(sub, None).unwrap();
        graph.remove_entity(base).unwrap();
    }

    #[test]
    fn from_links_rejects_stored_cycle() {
        let a = ClassFeatureId::new();
        let b = ClassFeatureId::new();
        let err = ReplacementGraph::<ClassFeatureOwner>::from_links([
            ReplacementLink {
                entity: a,
                replaces: Some(b),
            },
            ReplacementLink {
                entity: b,
                replaces: Some(a),
            },
        ])
        .unwrap_err();
        assert!(matches!(err, GraphError::Cycle { .. }));
    }

    #[test]
    fn feat_links_are_unsupported() {
        let graph = ReplacementGraph::<FeatOwner>::unchecked([
            ReplacementLink {
                entity: FeatId::new(),
                replaces: None,
            },
            ReplacementLink {
                entity: FeatId::new(),
                replaces: Some(FeatId::new()),
            },
        ]);
        let problems = graph.problems();
        assert_eq!(problems.len(), 1);
        assert!(matches!(
            problems[0],
            GraphError::ReplacementUnsupported { .. }
        ));
    }
}
