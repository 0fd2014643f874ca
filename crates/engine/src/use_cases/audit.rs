//! Whole-store content audit.
//!
//! Loads every pool, runs the graph validator over each kind, and resolves
//! the weak references in modifier payloads against what the store holds.

use std::collections::HashSet;

use charforge_domain::{
    GraphValidator, ItemId, KnownReferences, ReferenceIssue, ReferenceResolution, ValidationReport,
};

use crate::infrastructure::ports::{RepoError, UnreadableSnapshot};
use crate::repositories::ContentRepos;

#[derive(Debug, thiserror::Error)]
pub enum AuditError {
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditReport {
    pub feats: ValidationReport,
    pub race_traits: ValidationReport,
    pub class_features: ValidationReport,
    /// Unresolved modifier references, across all kinds
    pub references: Vec<ReferenceIssue>,
    /// Stored snapshots that no longer decode, across all kinds
    pub unreadable: Vec<UnreadableSnapshot>,
}

impl AuditReport {
    pub fn reports(&self) -> [&ValidationReport; 3] {
        [&self.feats, &self.race_traits, &self.class_features]
    }

    pub fn graph_problem_count(&self) -> usize {
        self.reports().iter().map(|r| r.problems.len()).sum()
    }

    /// Required references whose referent is gone.
    pub fn invalid_reference_count(&self) -> usize {
        self.references.iter().filter(|r| r.is_invalid()).count()
    }

    /// Optional weapon restrictions whose item is gone. These only widen an
    /// effect and do not fail the audit.
    pub fn unrestricted_reference_count(&self) -> usize {
        self.references.len() - self.invalid_reference_count()
    }

    pub fn is_clean(&self) -> bool {
        self.graph_problem_count() == 0
            && self.invalid_reference_count() == 0
            && self.unreadable.is_empty()
    }
}

pub struct ContentAudit {
    content: ContentRepos,
}

impl ContentAudit {
    pub fn new(content: ContentRepos) -> Self {
        Self { content }
    }

    /// Audit everything in the store. `items` are the item ids weapon
    /// restrictions may point at.
    pub async fn run(&self, items: &HashSet<ItemId>) -> Result<AuditReport, AuditError> {
        let feats = self.content.feats.list().await?;
        let race_traits = self.content.race_traits.list().await?;
        let class_features = self.content.class_features.list().await?;

        let mut unreadable = self.content.feats.unreadable().await?;
        unreadable.extend(self.content.race_traits.unreadable().await?);
        unreadable.extend(self.content.class_features.unreadable().await?);

        let known = KnownReferences {
            items: items.clone(),
            feats: feats.iter().map(|f| f.id()).collect(),
            class_features: class_features.iter().map(|c| c.id()).collect(),
        };

        let mut references = GraphValidator::check_references(&feats, &known);
        references.extend(GraphValidator::check_references(&race_traits, &known));
        references.extend(GraphValidator::check_references(&class_features, &known));

        let report = AuditReport {
            feats: GraphValidator::validate(&feats),
            race_traits: GraphValidator::validate(&race_traits),
            class_features: GraphValidator::validate(&class_features),
            references,
            unreadable,
        };

        for pool in report.reports() {
            for problem in &pool.problems {
                tracing::warn!(kind = pool.kind, error = %problem, "Content problem");
            }
        }
        for issue in &report.references {
            match issue.reference.resolution {
                ReferenceResolution::Invalid => tracing::warn!(
                    entity = %issue.entity,
                    modifier_id = %issue.modifier,
                    reference = %issue.reference.reference,
                    "Modifier references missing content"
                ),
                _ => tracing::debug!(
                    entity = %issue.entity,
                    modifier_id = %issue.modifier,
                    reference = %issue.reference.reference,
                    "Weapon restriction points at missing item, effect applies to any weapon"
                ),
            }
        }
        tracing::info!(
            feats = report.feats.entities,
            race_traits = report.race_traits.entities,
            class_features = report.class_features.entities,
            graph_problems = report.graph_problem_count(),
            invalid_references = report.invalid_reference_count(),
            unreadable = report.unreadable.len(),
            unrestricted_references = report.unrestricted_reference_count(),
            "Content audit finished"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::memory::InMemoryOwnerRepo;
    use crate::infrastructure::ports::OwnerRepo;
    use charforge_domain::modifiers::{EnableFeatureModifier, FeatModifier, WeaponAttackModifier};
    use charforge_domain::{
        ClassFeatureId, ClassFeatureOwner, ContentName, FeatId, FeatOptionId, FeatOwner,
        GraphError, Modifier,
        ModifierOwner, ModifierVariant, OwningEntity, RaceTraitId, RaceTraitOwner,
    };
    use serde_json::json;
    use std::sync::Arc;

    fn name(text: &str) -> ContentName {
        ContentName::new(text).unwrap()
    }

    #[tokio::test]
    async fn empty_store_is_clean() {
        let report = ContentAudit::new(ContentRepos::in_memory())
            .run(&HashSet::new())
            .await
            .unwrap();
        assert!(report.is_clean());
        assert_eq!(report.feats.kind, "feat");
        assert_eq!(report.class_features.entities, 0);
    }

    #[tokio::test]
    async fn missing_required_reference_fails_audit() {
        let content = ContentRepos::in_memory();
        let granted = OwningEntity::<FeatOwner>::new(name("Magic Initiate"));
        let mut granting = OwningEntity::<FeatOwner>::new(name("Versatile"));
        for feat_id in [granted.id(), FeatId::new()] {
            let variant = ModifierVariant::Feat(FeatModifier {
                feat_id: Some(feat_id),
                category: None,
            });
            granting
                .attach_modifier(Modifier::new(ModifierOwner::Feat(granting.id()), variant))
                .unwrap();
        }
        let mut feature = OwningEntity::<ClassFeatureOwner>::new(name("Pact Boon"));
        let enable = ModifierVariant::EnableFeature(EnableFeatureModifier {
            feature_id: Some(ClassFeatureId::new()),
            feature_name: "Pact of the Blade".to_string(),
        });
        feature
            .attach_modifier(Modifier::new(ModifierOwner::ClassFeature(feature.id()), enable))
            .unwrap();

        content.feats.save(&granted).await.unwrap();
        content.feats.save(&granting).await.unwrap();
        content.class_features.save(&feature).await.unwrap();

        let report = ContentAudit::new(content).run(&HashSet::new()).await.unwrap();
        assert_eq!(report.graph_problem_count(), 0);
        assert_eq!(report.invalid_reference_count(), 2);
        assert!(!report.is_clean());
    }

    #[tokio::test]
    async fn missing_weapon_only_warns() {
        let content = ContentRepos::in_memory();
        let mut feat = OwningEntity::<FeatOwner>::new(name("Dueling Master"));
        let variant = ModifierVariant::MeleeWeaponAttack(WeaponAttackModifier {
            weapon_id: Some(ItemId::new()),
            ..WeaponAttackModifier::default()
        });
        feat.attach_modifier(Modifier::new(ModifierOwner::Feat(feat.id()), variant))
            .unwrap();
        content.feats.save(&feat).await.unwrap();

        let report = ContentAudit::new(content).run(&HashSet::new()).await.unwrap();
        assert_eq!(report.unrestricted_reference_count(), 1);
        assert!(report.is_clean());
    }

    #[tokio::test]
    async fn stored_link_problems_are_reported() {
        let feats = Arc::new(InMemoryOwnerRepo::<FeatOwner>::new());
        let traits = Arc::new(InMemoryOwnerRepo::<RaceTraitOwner>::new());

        // Written by an older tool: a feat with a replacement link, and a
        // race trait replacing something that does not exist.
        let feat_id = FeatId::new();
        feats.insert_raw(
            feat_id,
            json!({ "id": feat_id, "name": "Odd Feat", "replacesId": FeatId::new() }),
        );
        let trait_id = RaceTraitId::new();
        traits.insert_raw(
            trait_id,
            json!({ "id": trait_id, "name": "Orphan", "traitToReplaceId": RaceTraitId::new() }),
        );

        let content = ContentRepos::new(
            feats,
            traits,
            Arc::new(InMemoryOwnerRepo::<ClassFeatureOwner>::new()),
        );
        let report = ContentAudit::new(content).run(&HashSet::new()).await.unwrap();

        assert!(matches!(
            report.feats.problems.as_slice(),
            [GraphError::ReplacementUnsupported { .. }]
        ));
        assert!(matches!(
            report.race_traits.problems.as_slice(),
            [GraphError::Dangling { .. }]
        ));
        assert_eq!(report.graph_problem_count(), 2);
    }

    #[tokio::test]
    async fn unreadable_snapshot_is_reported_not_fatal() {
        let feats = Arc::new(InMemoryOwnerRepo::<FeatOwner>::new());
        let good = OwningEntity::<FeatOwner>::new(name("Alert"));
        feats.save(&good).await.unwrap();

        // Options requiring each other fail to load.
        let broken_id = FeatId::new();
        let (a, b) = (FeatOptionId::new(), FeatOptionId::new());
        feats.insert_raw(
            broken_id,
            json!({
                "id": broken_id,
                "name": "Tangled",
                "options": [
                    { "id": a, "ownerId": broken_id, "name": "A", "requiredOptionId": b },
                    { "id": b, "ownerId": broken_id, "name": "B", "requiredOptionId": a }
                ]
            }),
        );

        let content = ContentRepos::new(
            feats,
            Arc::new(InMemoryOwnerRepo::<RaceTraitOwner>::new()),
            Arc::new(InMemoryOwnerRepo::<ClassFeatureOwner>::new()),
        );
        let report = ContentAudit::new(content).run(&HashSet::new()).await.unwrap();

        assert_eq!(report.feats.entities, 1);
        assert_eq!(report.graph_problem_count(), 0);
        assert_eq!(report.unreadable.len(), 1);
        assert_eq!(report.unreadable[0].id, broken_id.to_string());
        assert!(!report.is_clean());
    }
}
