pub mod types;

pub mod choice;
pub mod error;
pub mod graph;
pub mod ids;
pub mod modifiers;
pub mod value_objects;

pub use error::DomainError;

// Re-export ID types
pub use ids::{
    CharacterId, ClassFeatureId, ClassFeatureOptionId, FeatId, FeatOptionId, ItemId, ModifierId,
    RaceTraitId, RaceTraitOptionId,
};

// Modifiers and their codec
pub use modifiers::{
    BatchDecode, DecodeError, EncodeError, KnownReferences, Modifier, ModifierKind,
    ModifierOwner, ModifierRecord, ModifierVariant, ReferenceLookup, ReferenceResolution,
};

// Option graphs
pub use graph::{
    ClassFeatureOwner, FeatOwner, GraphError, GraphValidator, OptionDraft, OptionNode,
    OwnedOptionGraph, OwnerKind, OwningEntity, RaceTraitOwner, ReferenceIssue, Replaceable,
    ReplacementGraph, ReplacementLink, ValidationReport,
};

// Character choices
pub use choice::{
    CharacterSelections, ChoiceError, ChoiceLedger, ChoiceSnapshot, OptionState, SelectionKind,
};

pub use value_objects::{
    CharacterLevel, ContentName, Description, Details, DiceRoll, DieSize, LevelGate,
    ModifierDuration,
};
