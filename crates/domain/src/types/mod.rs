//! Shared vocabulary types used by modifier payloads.
//!
//! Every enum here is closed: unknown wire values fail to decode rather than
//! collapsing into a catch-all.

mod abilities;
mod combat;
mod creatures;
mod targets;

pub use abilities::{AbilityScore, Skill};
pub use combat::{
    ArmorCategory, AttackKind, AttackRollPart, Condition, DamageType, MasteryProperty,
    WeaponCategory, WeaponProperty,
};
pub use creatures::{CreatureSize, CreatureType, MovementMode, SenseKind};
pub use targets::{
    BonusTarget, IgnoreTarget, ProficiencyTarget, ProtectionTarget, RollTarget, SetTarget,
};
