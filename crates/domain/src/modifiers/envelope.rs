//! The modifier envelope: one rule effect attached to a feat, race trait, or class feature.
//!
//! # Invariants
//!
//! - `variant.kind() == kind` whenever a variant is present
//! - A variant may be absent only for kinds where [`ModifierKind::allows_bare`]
//! - Exactly one owner, expressed as an enum rather than three nullable keys
//!
//! Fields are private; every constructor and mutator preserves the invariants,
//! and the codec re-checks them for records written by other writers.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::codec::{self, DecodeError, ModifierRecord};
use super::variant::{ModifierKind, ModifierVariant};
use crate::error::DomainError;
use crate::ids::{ClassFeatureId, FeatId, ModifierId, RaceTraitId};
use crate::types::AbilityScore;
use crate::value_objects::{DiceRoll, Details, ModifierDuration};

/// The single entity a modifier belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierOwner {
    Feat(FeatId),
    RaceTrait(RaceTraitId),
    ClassFeature(ClassFeatureId),
}

impl ModifierOwner {
    /// Label used in error messages and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Feat(_) => "feat",
            Self::RaceTrait(_) => "race trait",
            Self::ClassFeature(_) => "class feature",
        }
    }
}

impl fmt::Display for ModifierOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Feat(id) => write!(f, "feat {}", id),
            Self::RaceTrait(id) => write!(f, "race trait {}", id),
            Self::ClassFeature(id) => write!(f, "class feature {}", id),
        }
    }
}

/// A stored rule effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Modifier {
    id: ModifierId,
    owner: ModifierOwner,
    kind: ModifierKind,
    variant: Option<ModifierVariant>,
    ability_score: Option<AbilityScore>,
    dice: Option<DiceRoll>,
    fixed_value: Option<i32>,
    details: Option<Details>,
    duration: Option<ModifierDuration>,
    applies_on_multiclass: bool,
}

impl Modifier {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Create a modifier carrying a payload. The kind is taken from the payload.
    pub fn new(owner: ModifierOwner, variant: ModifierVariant) -> Self {
        Self {
            id: ModifierId::new(),
            owner,
            kind: variant.kind(),
            variant: Some(variant),
            ability_score: None,
            dice: None,
            fixed_value: None,
            details: None,
            duration: None,
            applies_on_multiclass: false,
        }
    }

    /// Create a numeric-only modifier with no payload.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the kind needs a payload.
    pub fn bare(owner: ModifierOwner, kind: ModifierKind) -> Result<Self, DomainError> {
        if !kind.allows_bare() {
            return Err(DomainError::validation(format!(
                "{} modifiers need a payload",
                kind
            )));
        }
        Ok(Self {
            id: ModifierId::new(),
            owner,
            kind,
            variant: None,
            ability_score: None,
            dice: None,
            fixed_value: None,
            details: None,
            duration: None,
            applies_on_multiclass: false,
        })
    }

    /// Reassemble a modifier from stored parts, checking every invariant.
    pub(crate) fn from_parts(
        id: ModifierId,
        owner: ModifierOwner,
        kind: ModifierKind,
        variant: Option<ModifierVariant>,
        ability_score: Option<AbilityScore>,
        dice: Option<DiceRoll>,
        fixed_value: Option<i32>,
        details: Option<Details>,
        duration: Option<ModifierDuration>,
        applies_on_multiclass: bool,
    ) -> Result<Self, DecodeError> {
        match &variant {
            Some(v) if v.kind() != kind => {
                return Err(DecodeError::TagMismatch {
                    declared: kind.to_string(),
                    payload: v.kind().to_string(),
                });
            }
            None if !kind.allows_bare() => {
                return Err(DecodeError::MissingPayload {
                    kind: kind.to_string(),
                });
            }
            _ => {}
        }
        Ok(Self {
            id,
            owner,
            kind,
            variant,
            ability_score,
            dice,
            fixed_value,
            details,
            duration,
            applies_on_multiclass,
        })
    }

    // =========================================================================
    // Builder-style methods
    // =========================================================================

    pub fn with_ability_score(mut self, ability: AbilityScore) -> Self {
        self.ability_score = Some(ability);
        self
    }

    pub fn with_dice(mut self, dice: DiceRoll) -> Self {
        self.dice = Some(dice);
        self
    }

    pub fn with_fixed_value(mut self, value: i32) -> Self {
        self.fixed_value = Some(value);
        self
    }

    pub fn with_details(mut self, details: Details) -> Self {
        self.details = Some(details);
        self
    }

    pub fn with_duration(mut self, duration: ModifierDuration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn with_applies_on_multiclass(mut self, applies: bool) -> Self {
        self.applies_on_multiclass = applies;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn id(&self) -> ModifierId {
        self.id
    }

    #[inline]
    pub fn owner(&self) -> ModifierOwner {
        self.owner
    }

    #[inline]
    pub fn kind(&self) -> ModifierKind {
        self.kind
    }

    pub fn variant(&self) -> Option<&ModifierVariant> {
        self.variant.as_ref()
    }

    pub fn ability_score(&self) -> Option<AbilityScore> {
        self.ability_score
    }

    pub fn dice(&self) -> Option<DiceRoll> {
        self.dice
    }

    pub fn fixed_value(&self) -> Option<i32> {
        self.fixed_value
    }

    pub fn details(&self) -> Option<&Details> {
        self.details.as_ref()
    }

    pub fn duration(&self) -> Option<ModifierDuration> {
        self.duration
    }

    pub fn applies_on_multiclass(&self) -> bool {
        self.applies_on_multiclass
    }

    // =========================================================================
    // Mutations (content edits)
    // =========================================================================

    /// Replace the payload. The kind follows the new payload.
    pub fn set_variant(&mut self, variant: ModifierVariant) {
        self.kind = variant.kind();
        self.variant = Some(variant);
    }

    /// Drop the payload, leaving a numeric-only modifier.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the kind needs a payload.
    pub fn clear_variant(&mut self) -> Result<(), DomainError> {
        if !self.kind.allows_bare() {
            return Err(DomainError::validation(format!(
                "{} modifiers need a payload",
                self.kind
            )));
        }
        self.variant = None;
        Ok(())
    }

    pub fn set_ability_score(&mut self, ability: Option<AbilityScore>) {
        self.ability_score = ability;
    }

    pub fn set_dice(&mut self, dice: Option<DiceRoll>) {
        self.dice = dice;
    }

    pub fn set_fixed_value(&mut self, value: Option<i32>) {
        self.fixed_value = value;
    }

    pub fn set_details(&mut self, details: Option<Details>) {
        self.details = details;
    }

    pub fn set_duration(&mut self, duration: Option<ModifierDuration>) {
        self.duration = duration;
    }

    pub fn set_applies_on_multiclass(&mut self, applies: bool) {
        self.applies_on_multiclass = applies;
    }
}

impl Serialize for Modifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let record = codec::encode(self).map_err(serde::ser::Error::custom)?;
        record.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Modifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = ModifierRecord::deserialize(deserializer)?;
        codec::decode(record).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modifiers::payloads::{BonusModifier, DamageTypeModifier, SenseModifier};
    use crate::types::{BonusTarget, DamageType};
    use crate::value_objects::{DieSize, DurationUnit};

    fn feat_owner() -> ModifierOwner {
        ModifierOwner::Feat(FeatId::new())
    }

    #[test]
    fn new_takes_kind_from_variant() {
        let modifier = Modifier::new(
            feat_owner(),
            ModifierVariant::Sense(SenseModifier::default()),
        );
        assert_eq!(modifier.kind(), ModifierKind::Sense);
        assert!(modifier.variant().is_some());
    }

    #[test]
    fn bare_allowed_for_numeric_kinds() {
        let modifier = Modifier::bare(feat_owner(), ModifierKind::Bonus)
            .unwrap()
            .with_fixed_value(1);
        assert!(modifier.variant().is_none());
        assert_eq!(modifier.fixed_value(), Some(1));
    }

    #[test]
    fn bare_rejected_for_payload_kinds() {
        let err = Modifier::bare(feat_owner(), ModifierKind::Resistance).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn set_variant_keeps_kind_in_sync() {
        let mut modifier = Modifier::new(
            feat_owner(),
            ModifierVariant::Bonus(BonusModifier {
                target: BonusTarget::ArmorClass,
                skill: None,
            }),
        );
        modifier.set_variant(ModifierVariant::Resistance(DamageTypeModifier::of([
            DamageType::Fire,
        ])));
        assert_eq!(modifier.kind(), ModifierKind::Resistance);
        assert_eq!(
            modifier.variant().map(ModifierVariant::kind),
            Some(ModifierKind::Resistance)
        );
    }

    #[test]
    fn clear_variant_respects_kind() {
        let mut resistance = Modifier::new(
            feat_owner(),
            ModifierVariant::default_for(ModifierKind::Resistance),
        );
        assert!(resistance.clear_variant().is_err());
        assert!(resistance.variant().is_some());

        let mut bonus = Modifier::new(
            feat_owner(),
            ModifierVariant::default_for(ModifierKind::Bonus),
        );
        assert!(bonus.clear_variant().is_ok());
        assert!(bonus.variant().is_none());
    }

    #[test]
    fn from_parts_rejects_mismatched_tag() {
        let err = Modifier::from_parts(
            ModifierId::new(),
            feat_owner(),
            ModifierKind::Immunity,
            Some(ModifierVariant::default_for(ModifierKind::Resistance)),
            None,
            None,
            None,
            None,
            None,
            false,
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::TagMismatch { .. }));
    }

    #[test]
    fn builder_sets_shared_fields() {
        let modifier = Modifier::bare(feat_owner(), ModifierKind::Damage)
            .unwrap()
            .with_dice(DiceRoll::new(2, DieSize::D6).unwrap())
            .with_ability_score(AbilityScore::Cha)
            .with_duration(ModifierDuration::new(1, DurationUnit::Minute).unwrap())
            .with_details(Details::new("Once per turn").unwrap())
            .with_applies_on_multiclass(true);
        assert_eq!(modifier.dice().map(|d| d.to_string()).as_deref(), Some("2d6"));
        assert_eq!(modifier.ability_score(), Some(AbilityScore::Cha));
        assert!(modifier.applies_on_multiclass());
        assert_eq!(
            modifier.details().map(Details::as_str),
            Some("Once per turn")
        );
    }
}
