//! What a modifier applies to.

use serde::{Deserialize, Serialize};

use super::{AbilityScore, ArmorCategory, Skill, WeaponCategory};

/// A d20 roll that can be made with advantage, disadvantage, or a reroll.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RollTarget {
    #[default]
    AttackRoll,
    AbilityCheck,
    SkillCheck,
    SavingThrow,
    DeathSave,
    Concentration,
    Initiative,
    DamageRoll,
}

/// A number a flat bonus can be added to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BonusTarget {
    #[default]
    AttackRoll,
    DamageRoll,
    ArmorClass,
    SavingThrow,
    AbilityCheck,
    SkillCheck,
    Initiative,
    SpellAttack,
    SpellSaveDc,
    HitPoints,
    HitPointsPerLevel,
    PassivePerception,
    Speed,
}

/// A value a modifier can overwrite outright.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SetTarget {
    #[default]
    AbilityScore,
    ArmorClass,
    Speed,
    HitPointMaximum,
    PassivePerception,
}

/// Something a modifier lets the bearer disregard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IgnoreTarget {
    #[default]
    DifficultTerrain,
    HalfCover,
    ThreeQuartersCover,
    LongRangeDisadvantage,
    LoadingProperty,
    Resistance,
    ArmorSpeedPenalty,
    ArmorStealthDisadvantage,
}

/// What a protection modifier shields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ProtectionTarget {
    ArmorClass,
    SavingThrows,
    #[default]
    ArmorClassAndSavingThrows,
}

/// Something a character can be proficient in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "category", content = "value", rename_all = "camelCase")]
pub enum ProficiencyTarget {
    Skill(Skill),
    SavingThrow(AbilityScore),
    Armor(ArmorCategory),
    WeaponCategory(WeaponCategory),
    /// A single named weapon, e.g. "longsword"
    Weapon(String),
    Tool(String),
    Instrument(String),
    Vehicle(String),
    /// Initiative, ability checks without a skill, and similar
    AllAbilityChecks,
}
