//! The closed set of modifier kinds and their payload-carrying variants.
//!
//! `ModifierKind` is the coarse tag stored beside every modifier;
//! `ModifierVariant` carries the payload for exactly one kind. Both are
//! generated from a single table so a kind can never exist without a variant
//! (or the other way round), and every `match` on them stays exhaustive.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::codec::DecodeError;
use super::payloads::*;

macro_rules! modifier_variants {
    ($( $(#[$doc:meta])* $kind:ident => $payload:ty ),+ $(,)?) => {
        /// Coarse modifier tag.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum ModifierKind {
            $( $(#[$doc])* $kind, )+
        }

        impl ModifierKind {
            /// Every kind, in declaration order.
            pub const ALL: &'static [ModifierKind] = &[ $( ModifierKind::$kind, )+ ];

            /// The tag as stored in the `type` field.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$kind => stringify!($kind), )+
                }
            }
        }

        impl FromStr for ModifierKind {
            type Err = DecodeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( stringify!($kind) => Ok(Self::$kind), )+
                    other => Err(DecodeError::UnknownTag { tag: other.to_string() }),
                }
            }
        }

        /// A modifier payload, one variant per [`ModifierKind`].
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub enum ModifierVariant {
            $( $(#[$doc])* $kind($payload), )+
        }

        impl ModifierVariant {
            /// The kind this payload belongs to.
            pub fn kind(&self) -> ModifierKind {
                match self {
                    $( Self::$kind(_) => ModifierKind::$kind, )+
                }
            }

            /// An empty payload for the given kind, for authoring tools.
            pub fn default_for(kind: ModifierKind) -> Self {
                match kind {
                    $( ModifierKind::$kind => Self::$kind(<$payload>::default()), )+
                }
            }

            pub(crate) fn payload_to_value(&self) -> Result<Value, serde_json::Error> {
                match self {
                    $( Self::$kind(payload) => serde_json::to_value(payload), )+
                }
            }

            pub(crate) fn payload_from_value(
                kind: ModifierKind,
                value: Value,
            ) -> Result<Self, serde_json::Error> {
                match kind {
                    $( ModifierKind::$kind => serde_json::from_value::<$payload>(value).map(Self::$kind), )+
                }
            }
        }
    };
}

modifier_variants! {
    /// Flat bonus to a number
    Bonus => BonusModifier,
    /// Bonus that stacks within its group
    StackingBonus => StackingBonusModifier,
    /// Extra damage
    Damage => DamageModifier,
    Advantage => RollModifier,
    Disadvantage => RollModifier,
    /// Reroll low dice
    Reroll => RerollModifier,
    Resistance => DamageTypeModifier,
    Immunity => ImmunityModifier,
    Vulnerability => DamageTypeModifier,
    Sense => SenseModifier,
    /// Overwrite a value
    Set => SetModifier,
    /// Replace a value's base formula
    SetBase => SetBaseModifier,
    HalfProficiency => HalfProficiencyModifier,
    Proficiency => ProficiencyModifier,
    Expertise => ProficiencyModifier,
    /// Proficiency bonus applied twice
    TwiceProficiency => ProficiencyModifier,
    Language => LanguageModifier,
    /// Grants a feat
    Feat => FeatModifier,
    CarryingCapacity => CarryingCapacityModifier,
    NaturalWeapon => NaturalWeaponModifier,
    SpeedIncrease => SpeedIncreaseModifier,
    SpeedReduction => SpeedReductionModifier,
    MeleeWeaponAttack => WeaponAttackModifier,
    RangedWeaponAttack => WeaponAttackModifier,
    /// Grants a weapon property
    WeaponProperty => WeaponPropertyModifier,
    IgnoreWeaponProperty => WeaponPropertyModifier,
    FavoredEnemy => FavoredEnemyModifier,
    Ignore => IgnoreModifier,
    EldritchBlast => EldritchBlastModifier,
    ReplaceDamageType => ReplaceDamageTypeModifier,
    MonkWeapon => MonkWeaponModifier,
    Protection => ProtectionModifier,
    Size => SizeModifier,
    WeaponMastery => WeaponMasteryModifier,
    EnableFeature => EnableFeatureModifier,
    ReplaceWeaponAbility => ReplaceWeaponAbilityModifier,
}

impl ModifierKind {
    /// Kinds whose whole effect can be a bare number on the envelope, so the
    /// payload may be omitted.
    pub fn allows_bare(&self) -> bool {
        matches!(
            self,
            Self::Bonus
                | Self::StackingBonus
                | Self::Damage
                | Self::Set
                | Self::SetBase
                | Self::SpeedIncrease
                | Self::SpeedReduction
                | Self::CarryingCapacity
        )
    }
}

impl fmt::Display for ModifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
