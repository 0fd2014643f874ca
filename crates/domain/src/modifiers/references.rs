//! Weak references from modifier payloads to other content.
//!
//! A payload may name an item, a feat, or a class feature by id. Those ids are
//! not owned by the modifier and may dangle after the referent is deleted, so
//! they are resolved against a snapshot rather than trusted.

use std::collections::HashSet;

use super::envelope::Modifier;
use super::variant::ModifierVariant;
use crate::ids::{ClassFeatureId, FeatId, ItemId};

/// Existence checks against a content snapshot.
pub trait ReferenceLookup {
    fn item_exists(&self, id: ItemId) -> bool;
    fn feat_exists(&self, id: FeatId) -> bool;
    fn class_feature_exists(&self, id: ClassFeatureId) -> bool;
}

/// An id a payload points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeakReference {
    Item(ItemId),
    Feat(FeatId),
    ClassFeature(ClassFeatureId),
}

impl WeakReference {
    fn exists(&self, lookup: &impl ReferenceLookup) -> bool {
        match self {
            Self::Item(id) => lookup.item_exists(*id),
            Self::Feat(id) => lookup.feat_exists(*id),
            Self::ClassFeature(id) => lookup.class_feature_exists(*id),
        }
    }
}

impl std::fmt::Display for WeakReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Item(id) => write!(f, "item {}", id),
            Self::Feat(id) => write!(f, "feat {}", id),
            Self::ClassFeature(id) => write!(f, "class feature {}", id),
        }
    }
}

/// A reference together with whether the effect is meaningless without it.
///
/// Weapon ids narrow an effect to one weapon and are optional restrictions.
/// A granted feat or enabled feature is the effect itself, so it is required.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReferenceSlot {
    pub reference: WeakReference,
    pub required: bool,
}

/// Outcome of resolving one weak reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceResolution {
    /// The referent exists
    Resolved,
    /// An optional restriction whose referent is gone; the effect applies unrestricted
    Unrestricted,
    /// A required referent is gone; the effect cannot apply
    Invalid,
}

/// A resolved reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedReference {
    pub reference: WeakReference,
    pub resolution: ReferenceResolution,
}

impl ModifierVariant {
    /// Every weak reference carried by this payload.
    pub fn references(&self) -> Vec<ReferenceSlot> {
        let restriction = |id: Option<ItemId>| {
            id.map(|id| ReferenceSlot {
                reference: WeakReference::Item(id),
                required: false,
            })
        };

        let slot = match self {
            Self::Feat(p) => p.feat_id.map(|id| ReferenceSlot {
                reference: WeakReference::Feat(id),
                required: true,
            }),
            Self::EnableFeature(p) => p.feature_id.map(|id| ReferenceSlot {
                reference: WeakReference::ClassFeature(id),
                required: true,
            }),
            Self::MeleeWeaponAttack(p) | Self::RangedWeaponAttack(p) => restriction(p.weapon_id),
            Self::WeaponProperty(p) | Self::IgnoreWeaponProperty(p) => restriction(p.weapon_id),
            Self::MonkWeapon(p) => restriction(p.weapon_id),
            Self::WeaponMastery(p) => restriction(p.weapon_id),
            Self::ReplaceWeaponAbility(p) => restriction(p.weapon_id),
            Self::Bonus(_)
            | Self::StackingBonus(_)
            | Self::Damage(_)
            | Self::Advantage(_)
            | Self::Disadvantage(_)
            | Self::Reroll(_)
            | Self::Resistance(_)
            | Self::Immunity(_)
            | Self::Vulnerability(_)
            | Self::Sense(_)
            | Self::Set(_)
            | Self::SetBase(_)
            | Self::HalfProficiency(_)
            | Self::Proficiency(_)
            | Self::Expertise(_)
            | Self::TwiceProficiency(_)
            | Self::Language(_)
            | Self::CarryingCapacity(_)
            | Self::NaturalWeapon(_)
            | Self::SpeedIncrease(_)
            | Self::SpeedReduction(_)
            | Self::FavoredEnemy(_)
            | Self::Ignore(_)
            | Self::EldritchBlast(_)
            | Self::ReplaceDamageType(_)
            | Self::Protection(_)
            | Self::Size(_) => None,
        };
        slot.into_iter().collect()
    }

    /// Resolve every weak reference against a snapshot.
    pub fn resolve_references(&self, lookup: &impl ReferenceLookup) -> Vec<ResolvedReference> {
        self.references()
            .into_iter()
            .map(|slot| {
                let resolution = if slot.reference.exists(lookup) {
                    ReferenceResolution::Resolved
                } else if slot.required {
                    ReferenceResolution::Invalid
                } else {
                    ReferenceResolution::Unrestricted
                };
                ResolvedReference {
                    reference: slot.reference,
                    resolution,
                }
            })
            .collect()
    }

    /// Whether a required referent is missing.
    pub fn has_invalid_references(&self, lookup: &impl ReferenceLookup) -> bool {
        self.resolve_references(lookup)
            .iter()
            .any(|r| r.resolution == ReferenceResolution::Invalid)
    }

    /// Copy of this payload with dangling optional restrictions cleared.
    ///
    /// Required references are left in place so the caller can report them.
    pub fn without_dangling_references(&self, lookup: &impl ReferenceLookup) -> Self {
        let keep = |id: Option<ItemId>| id.filter(|id| lookup.item_exists(*id));
        let mut variant = self.clone();
        match &mut variant {
            Self::MeleeWeaponAttack(p) | Self::RangedWeaponAttack(p) => {
                p.weapon_id = keep(p.weapon_id)
            }
            Self::WeaponProperty(p) | Self::IgnoreWeaponProperty(p) => {
                p.weapon_id = keep(p.weapon_id)
            }
            Self::MonkWeapon(p) => p.weapon_id = keep(p.weapon_id),
            Self::WeaponMastery(p) => p.weapon_id = keep(p.weapon_id),
            Self::ReplaceWeaponAbility(p) => p.weapon_id = keep(p.weapon_id),
            // Required references stay so the caller can report them.
            Self::Feat(_) | Self::EnableFeature(_) => {}
            Self::Bonus(_)
            | Self::StackingBonus(_)
            | Self::Damage(_)
            | Self::Advantage(_)
            | Self::Disadvantage(_)
            | Self::Reroll(_)
            | Self::Resistance(_)
            | Self::Immunity(_)
            | Self::Vulnerability(_)
            | Self::Sense(_)
            | Self::Set(_)
            | Self::SetBase(_)
            | Self::HalfProficiency(_)
            | Self::Proficiency(_)
            | Self::Expertise(_)
            | Self::TwiceProficiency(_)
            | Self::Language(_)
            | Self::CarryingCapacity(_)
            | Self::NaturalWeapon(_)
            | Self::SpeedIncrease(_)
            | Self::SpeedReduction(_)
            | Self::FavoredEnemy(_)
            | Self::Ignore(_)
            | Self::EldritchBlast(_)
            | Self::ReplaceDamageType(_)
            | Self::Protection(_)
            | Self::Size(_) => {}
        }
        variant
    }
}

impl Modifier {
    /// Clear dangling optional restrictions on this modifier's payload.
    ///
    /// Returns the number of references cleared.
    pub fn prune_dangling_references(&mut self, lookup: &impl ReferenceLookup) -> usize {
        let Some(variant) = self.variant() else {
            return 0;
        };
        let before = variant.references().len();
        let pruned = variant.without_dangling_references(lookup);
        let cleared = before - pruned.references().len();
        if cleared > 0 {
            self.set_variant(pruned);
        }
        cleared
    }
}

/// A plain set-backed snapshot of known ids.
#[derive(Debug, Clone, Default)]
pub struct KnownReferences {
    pub items: HashSet<ItemId>,
    pub feats: HashSet<FeatId>,
    pub class_features: HashSet<ClassFeatureId>,
}

impl ReferenceLookup for KnownReferences {
    fn item_exists(&self, id: ItemId) -> bool {
        self.items.contains(&id)
    }

    fn feat_exists(&self, id: FeatId) -> bool {
        self.feats.contains(&id)
    }

    fn class_feature_exists(&self, id: ClassFeatureId) -> bool {
        self.class_features.contains(&id)
    }
}
