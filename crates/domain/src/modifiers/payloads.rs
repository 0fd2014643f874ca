//! Payload shapes for modifier variants.
//!
//! Each struct is an immutable value with a `Default` suitable for authoring
//! tools. Several tags share one shape (Advantage and Disadvantage both carry a
//! [`RollModifier`]); the tag, not the struct, tells them apart.
//!
//! Every field that is optional in the rules is an `Option`, never a sentinel.
//! Payloads reject unknown fields so nothing is silently dropped on decode.

use serde::{Deserialize, Serialize};

use crate::ids::{ClassFeatureId, FeatId, ItemId};
use crate::types::{
    AbilityScore, AttackKind, AttackRollPart, BonusTarget, Condition, CreatureSize,
    CreatureType, DamageType, IgnoreTarget, MasteryProperty, MovementMode, ProficiencyTarget,
    ProtectionTarget, RollTarget, SenseKind, SetTarget, Skill, WeaponCategory, WeaponProperty,
};
use crate::value_objects::{DiceRoll, DieSize};

/// Flat bonus to a number. The amount lives on the envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BonusModifier {
    pub target: BonusTarget,
    /// Narrow a skill-check bonus to one skill
    pub skill: Option<Skill>,
}

/// Bonus that stacks with others in the same group instead of taking the highest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct StackingBonusModifier {
    pub target: BonusTarget,
    pub skill: Option<Skill>,
    pub stack_group: String,
}

/// Extra damage of a given type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DamageModifier {
    pub damage_type: DamageType,
    pub attack_kind: Option<AttackKind>,
    pub critical_only: bool,
}

/// Advantage or disadvantage on a kind of roll.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RollModifier {
    pub target: RollTarget,
    pub skill: Option<Skill>,
    /// Restrict to checks or saves of one ability
    pub ability: Option<AbilityScore>,
    /// Only against effects that would impose this condition
    pub against_condition: Option<Condition>,
    pub against_creature_type: Option<CreatureType>,
}

/// Reroll low dice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RerollModifier {
    pub target: RollTarget,
    pub reroll_at_or_below: u8,
    pub must_use_new_roll: bool,
}

impl Default for RerollModifier {
    fn default() -> Self {
        Self {
            target: RollTarget::AttackRoll,
            reroll_at_or_below: 1,
            must_use_new_roll: true,
        }
    }
}

/// Resistance or vulnerability to damage types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DamageTypeModifier {
    pub damage_types: Vec<DamageType>,
    /// Applies to every damage type
    pub all_damage: bool,
    /// Applies to bludgeoning, piercing, and slashing from nonmagical attacks
    pub all_nonmagical_physical: bool,
}

impl DamageTypeModifier {
    pub fn of(damage_types: impl IntoIterator<Item = DamageType>) -> Self {
        Self {
            damage_types: damage_types.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn covers(&self, damage_type: DamageType) -> bool {
        self.all_damage
            || (self.all_nonmagical_physical && damage_type.is_physical())
            || self.damage_types.contains(&damage_type)
    }
}

/// Immunity to damage types and conditions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ImmunityModifier {
    pub damage_types: Vec<DamageType>,
    pub conditions: Vec<Condition>,
    pub all_damage: bool,
    pub all_nonmagical_physical: bool,
}

/// A special sense with a range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SenseModifier {
    pub sense: SenseKind,
    pub range_feet: u16,
}

impl Default for SenseModifier {
    fn default() -> Self {
        Self {
            sense: SenseKind::Darkvision,
            range_feet: 60,
        }
    }
}

/// Overwrite a value with the envelope's fixed value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SetModifier {
    pub target: SetTarget,
    /// Only apply when the new value beats the current one
    pub only_if_higher: bool,
}

/// Replace the base formula of a value, e.g. unarmored AC.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SetBaseModifier {
    pub target: SetTarget,
    pub added_abilities: Vec<AbilityScore>,
    pub max_dex_bonus: Option<i8>,
}

/// Add half the proficiency bonus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct HalfProficiencyModifier {
    pub target: Option<ProficiencyTarget>,
    pub restrict_to_ability: Option<AbilityScore>,
    pub round_up: bool,
}

/// Proficiency, expertise, or doubled proficiency in something, possibly chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProficiencyModifier {
    /// Fixed target; `None` when the player picks from `choose_from`
    pub target: Option<ProficiencyTarget>,
    pub choose_from: Vec<ProficiencyTarget>,
    pub choose_count: Option<u8>,
}

impl ProficiencyModifier {
    pub fn fixed(target: ProficiencyTarget) -> Self {
        Self {
            target: Some(target),
            ..Self::default()
        }
    }
}

/// Languages known or chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct LanguageModifier {
    pub languages: Vec<String>,
    pub choose_count: Option<u8>,
}

/// Grants a feat, either a specific one or a pick from a category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FeatModifier {
    pub feat_id: Option<FeatId>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CarryingCapacityModifier {
    pub multiplier: Option<u8>,
    pub count_as_larger_size: bool,
}

/// Claws, bites, horns, and the like.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NaturalWeaponModifier {
    pub name: String,
    pub damage: DiceRoll,
    pub damage_type: DamageType,
    /// Ability used instead of Strength
    pub ability: Option<AbilityScore>,
    pub reach_feet: u16,
}

impl Default for NaturalWeaponModifier {
    fn default() -> Self {
        Self {
            name: String::new(),
            damage: DiceRoll::default(),
            damage_type: DamageType::Bludgeoning,
            ability: None,
            reach_feet: 5,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SpeedIncreaseModifier {
    pub movement: MovementMode,
    /// Grant this movement mode at the walking speed instead of a fixed amount
    pub equal_to_walking: bool,
    pub only_unarmored: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SpeedReductionModifier {
    /// `None` reduces every movement mode
    pub movement: Option<MovementMode>,
    /// Strength score at which the reduction no longer applies
    pub negated_by_strength: Option<u8>,
}

/// Melee or ranged weapon attack adjustment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WeaponAttackModifier {
    /// Weak reference; a deleted weapon means "any weapon"
    pub weapon_id: Option<ItemId>,
    pub weapon_property: Option<WeaponProperty>,
    pub applies_to: AttackRollPart,
}

/// Grants or ignores a weapon property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WeaponPropertyModifier {
    pub property: WeaponProperty,
    pub weapon_id: Option<ItemId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FavoredEnemyModifier {
    pub creature_types: Vec<CreatureType>,
    /// Humanoid kinds counted separately, e.g. "gnoll", "orc"
    pub humanoid_kinds: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IgnoreModifier {
    pub target: IgnoreTarget,
    /// Required context for `IgnoreTarget::Resistance`
    pub damage_type: Option<DamageType>,
}

/// Eldritch invocation tweaks to the eldritch blast cantrip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EldritchBlastModifier {
    pub add_ability_modifier: bool,
    pub range_feet: Option<u16>,
    pub push_feet: Option<u16>,
    pub slow_feet: Option<u16>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReplaceDamageTypeModifier {
    /// `None` converts any damage type
    pub from: Option<DamageType>,
    pub to: DamageType,
}

/// Marks a weapon as usable with martial arts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct MonkWeaponModifier {
    pub weapon_id: Option<ItemId>,
    pub category: Option<WeaponCategory>,
    pub martial_arts_die: Option<DieSize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProtectionModifier {
    pub target: ProtectionTarget,
    pub requires_no_armor: bool,
    pub requires_no_shield: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SizeModifier {
    pub size: CreatureSize,
    /// Counts as this size only for carrying capacity and push/drag/lift
    pub only_for_carrying: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WeaponMasteryModifier {
    /// `None` uses the weapon's own mastery property
    pub mastery: Option<MasteryProperty>,
    pub weapon_id: Option<ItemId>,
    pub choose_count: Option<u8>,
}

/// Switches on a class feature that is otherwise dormant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EnableFeatureModifier {
    pub feature_id: Option<ClassFeatureId>,
    pub feature_name: String,
}

/// Use a different ability for attack and damage rolls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ReplaceWeaponAbilityModifier {
    pub from: AbilityScore,
    pub to: AbilityScore,
    pub weapon_id: Option<ItemId>,
    pub weapon_property: Option<WeaponProperty>,
}

impl Default for ReplaceWeaponAbilityModifier {
    fn default() -> Self {
        Self {
            from: AbilityScore::Str,
            to: AbilityScore::Dex,
            weapon_id: None,
            weapon_property: None,
        }
    }
}
