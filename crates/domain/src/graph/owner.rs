//! Owner kinds: the three content types that own option pools.
//!
//! Feats, race traits, and class features all own options with the same
//! prerequisite rules, so the graph code is written once over [`OwnerKind`]
//! and instantiated per kind. Only race traits and class features can replace
//! another entity of their kind; that capability is the [`Replaceable`] marker.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{Debug, Display};
use std::hash::Hash;

use crate::ids::{
    ClassFeatureId, ClassFeatureOptionId, FeatId, FeatOptionId, RaceTraitId, RaceTraitOptionId,
};
use crate::modifiers::ModifierOwner;

/// Bounds shared by every entity and option id.
pub trait GraphId:
    Copy + Eq + Hash + Debug + Display + Serialize + DeserializeOwned + Send + Sync + 'static
{
    fn generate() -> Self;
}

macro_rules! impl_graph_id {
    ($($id:ty),+ $(,)?) => {
        $(
            impl GraphId for $id {
                fn generate() -> Self {
                    <$id>::new()
                }
            }
        )+
    };
}

impl_graph_id!(
    FeatId,
    FeatOptionId,
    RaceTraitId,
    RaceTraitOptionId,
    ClassFeatureId,
    ClassFeatureOptionId,
);

/// A content type that owns a pool of options.
pub trait OwnerKind:
    Debug + Clone + Copy + PartialEq + Eq + Default + Send + Sync + 'static
{
    type EntityId: GraphId;
    type OptionId: GraphId;

    /// Entity label for messages, e.g. "race trait".
    const ENTITY_LABEL: &'static str;
    /// Option label for messages, e.g. "race trait option".
    const OPTION_LABEL: &'static str;
    /// Whether entities of this kind may carry a replacement link.
    const REPLACEABLE: bool;

    /// The modifier owner for an entity of this kind.
    fn modifier_owner(id: Self::EntityId) -> ModifierOwner;
}

/// Kinds whose entities may replace another entity of the same kind.
pub trait Replaceable: OwnerKind {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeatOwner;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RaceTraitOwner;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ClassFeatureOwner;

impl OwnerKind for FeatOwner {
    type EntityId = FeatId;
    type OptionId = FeatOptionId;

    const ENTITY_LABEL: &'static str = "feat";
    const OPTION_LABEL: &'static str = "feat option";
    const REPLACEABLE: bool = false;

    fn modifier_owner(id: FeatId) -> ModifierOwner {
        ModifierOwner::Feat(id)
    }
}

impl OwnerKind for RaceTraitOwner {
    type EntityId = RaceTraitId;
    type OptionId = RaceTraitOptionId;

    const ENTITY_LABEL: &'static str = "race trait";
    const OPTION_LABEL: &'static str = "race trait option";
    const REPLACEABLE: bool = true;

    fn modifier_owner(id: RaceTraitId) -> ModifierOwner {
        ModifierOwner::RaceTrait(id)
    }
}

impl OwnerKind for ClassFeatureOwner {
    type EntityId = ClassFeatureId;
    type OptionId = ClassFeatureOptionId;

    const ENTITY_LABEL: &'static str = "class feature";
    const OPTION_LABEL: &'static str = "class feature option";
    const REPLACEABLE: bool = true;

    fn modifier_owner(id: ClassFeatureId) -> ModifierOwner {
        ModifierOwner::ClassFeature(id)
    }
}

impl Replaceable for RaceTraitOwner {}
impl Replaceable for ClassFeatureOwner {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_traits_and_features_are_replaceable() {
        assert!(!FeatOwner::REPLACEABLE);
        assert!(RaceTraitOwner::REPLACEABLE);
        assert!(ClassFeatureOwner::REPLACEABLE);
    }

    #[test]
    fn modifier_owner_matches_kind() {
        let id = ClassFeatureId::new();
        assert_eq!(
            ClassFeatureOwner::modifier_owner(id),
            ModifierOwner::ClassFeature(id)
        );
    }

    #[test]
    fn generated_ids_are_distinct() {
        assert_ne!(FeatOptionId::generate(), FeatOptionId::generate());
    }
}
