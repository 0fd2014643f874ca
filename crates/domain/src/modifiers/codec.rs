//! Tagged external form for modifiers.
//!
//! A stored modifier is a flat record with a string `type` discriminant and a
//! nested `variant` object whose shape depends on it. The nested object repeats
//! the tag in its own `kind` field; the two are logically one discriminant and
//! the decoder refuses a record where they disagree.
//!
//! ```json
//! {
//!   "id": "4f0c...",
//!   "featId": null,
//!   "raceTraitId": "9a1e...",
//!   "classFeatureId": null,
//!   "type": "Resistance",
//!   "abilityScore": null,
//!   "diceCount": null,
//!   "diceValue": null,
//!   "fixedValue": null,
//!   "details": null,
//!   "duration": null,
//!   "appliesOnMulticlass": false,
//!   "variant": {
//!     "kind": "Resistance",
//!     "damageTypes": ["fire", "cold"],
//!     "allDamage": false,
//!     "allNonmagicalPhysical": false
//!   }
//! }
//! ```
//!
//! Round-trip law: `decode(encode(m)?) == Ok(m)` for every valid modifier.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use super::envelope::{Modifier, ModifierOwner};
use super::variant::{ModifierKind, ModifierVariant};
use crate::ids::{ClassFeatureId, FeatId, ModifierId, RaceTraitId};
use crate::types::AbilityScore;
use crate::value_objects::{DiceRoll, DieSize, Details, ModifierDuration};

/// Name of the tag field inside the nested variant object.
pub const VARIANT_TAG_FIELD: &str = "kind";

/// Why a stored modifier could not be decoded.
///
/// Always scoped to one record: callers reject that record and carry on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("Unknown modifier type: {tag}")]
    UnknownTag { tag: String },

    #[error("Modifier type {declared} does not match payload kind {payload}")]
    TagMismatch { declared: String, payload: String },

    #[error("Payload does not fit {kind}: {reason}")]
    ShapeMismatch { kind: String, reason: String },

    #[error("{kind} modifiers need a payload")]
    MissingPayload { kind: String },

    #[error("Modifier must have exactly one owner, found {owners}")]
    OwnerConflict { owners: usize },

    #[error("Invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Malformed modifier record: {0}")]
    Malformed(String),
}

impl DecodeError {
    fn shape(kind: ModifierKind, reason: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            kind: kind.to_string(),
            reason: reason.into(),
        }
    }

    fn field(field: &'static str, reason: impl ToString) -> Self {
        Self::InvalidField {
            field,
            reason: reason.to_string(),
        }
    }
}

/// A payload failed to serialize.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to encode {kind} payload: {message}")]
pub struct EncodeError {
    pub kind: String,
    pub message: String,
}

/// The flat stored form of a modifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifierRecord {
    pub id: ModifierId,
    #[serde(default)]
    pub feat_id: Option<FeatId>,
    #[serde(default)]
    pub race_trait_id: Option<RaceTraitId>,
    #[serde(default)]
    pub class_feature_id: Option<ClassFeatureId>,
    #[serde(rename = "type")]
    pub modifier_type: String,
    #[serde(default)]
    pub ability_score: Option<String>,
    #[serde(default)]
    pub dice_count: Option<u8>,
    #[serde(default)]
    pub dice_value: Option<u8>,
    #[serde(default)]
    pub fixed_value: Option<i32>,
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub duration: Option<ModifierDuration>,
    #[serde(default)]
    pub applies_on_multiclass: bool,
    #[serde(default)]
    pub variant: Option<Value>,
}

// =============================================================================
// Variant codec
// =============================================================================

/// Encode a payload into its kind and nested tagged object.
pub fn encode_variant(variant: &ModifierVariant) -> Result<(ModifierKind, Value), EncodeError> {
    let kind = variant.kind();
    let value = variant.payload_to_value().map_err(|e| EncodeError {
        kind: kind.to_string(),
        message: e.to_string(),
    })?;
    let mut object = match value {
        Value::Object(object) => object,
        other => {
            return Err(EncodeError {
                kind: kind.to_string(),
                message: format!("payload serialized to a non-object: {}", other),
            })
        }
    };
    object.insert(
        VARIANT_TAG_FIELD.to_string(),
        Value::String(kind.as_str().to_string()),
    );
    Ok((kind, Value::Object(object)))
}

/// Decode a nested variant object for the given coarse tag.
///
/// If the object carries its own `kind` it must agree with `tag`.
pub fn decode_variant(tag: &str, raw: Value) -> Result<ModifierVariant, DecodeError> {
    let kind: ModifierKind = tag.parse()?;
    let object = match raw {
        Value::Object(object) => object,
        other => {
            return Err(DecodeError::shape(
                kind,
                format!("expected an object, found {}", json_type_name(&other)),
            ))
        }
    };
    decode_variant_object(kind, object, false)
}

fn decode_variant_object(
    kind: ModifierKind,
    mut object: Map<String, Value>,
    require_inner_tag: bool,
) -> Result<ModifierVariant, DecodeError> {
    match object.remove(VARIANT_TAG_FIELD) {
        Some(Value::String(inner)) => {
            let inner_kind: ModifierKind = inner.parse()?;
            if inner_kind != kind {
                return Err(DecodeError::TagMismatch {
                    declared: kind.to_string(),
                    payload: inner_kind.to_string(),
                });
            }
        }
        Some(other) => {
            return Err(DecodeError::shape(
                kind,
                format!(
                    "`{}` must be a string, found {}",
                    VARIANT_TAG_FIELD,
                    json_type_name(&other)
                ),
            ))
        }
        None if require_inner_tag => {
            return Err(DecodeError::shape(
                kind,
                format!("payload is missing its `{}` tag", VARIANT_TAG_FIELD),
            ))
        }
        None => {}
    }

    ModifierVariant::payload_from_value(kind, Value::Object(object))
        .map_err(|e| DecodeError::shape(kind, e.to_string()))
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

// =============================================================================
// Envelope codec
// =============================================================================

/// Encode a modifier into its stored record.
pub fn encode(modifier: &Modifier) -> Result<ModifierRecord, EncodeError> {
    let (feat_id, race_trait_id, class_feature_id) = match modifier.owner() {
        ModifierOwner::Feat(id) => (Some(id), None, None),
        ModifierOwner::RaceTrait(id) => (None, Some(id), None),
        ModifierOwner::ClassFeature(id) => (None, None, Some(id)),
    };

    let variant = match modifier.variant() {
        Some(variant) => Some(encode_variant(variant)?.1),
        None => None,
    };

    Ok(ModifierRecord {
        id: modifier.id(),
        feat_id,
        race_trait_id,
        class_feature_id,
        modifier_type: modifier.kind().as_str().to_string(),
        ability_score: modifier.ability_score().map(|a| a.as_str().to_string()),
        dice_count: modifier.dice().map(|d| d.count()),
        dice_value: modifier.dice().map(|d| d.die().sides()),
        fixed_value: modifier.fixed_value(),
        details: modifier.details().map(|d| d.as_str().to_string()),
        duration: modifier.duration(),
        applies_on_multiclass: modifier.applies_on_multiclass(),
        variant,
    })
}

/// Decode a stored record, checking every envelope invariant.
///
/// Written by another (possibly older or buggy) writer, so nothing is trusted:
/// the coarse tag and the payload tag are cross-checked, the owner keys must
/// name exactly one owner, and dice must be complete.
pub fn decode(record: ModifierRecord) -> Result<Modifier, DecodeError> {
    let kind: ModifierKind = record.modifier_type.parse()?;

    let owner = decode_owner(&record)?;

    let variant = match record.variant {
        None | Some(Value::Null) => None,
        Some(Value::Object(object)) => Some(decode_variant_object(kind, object, true)?),
        Some(other) => {
            return Err(DecodeError::shape(
                kind,
                format!("expected an object, found {}", json_type_name(&other)),
            ))
        }
    };

    let ability_score = record
        .ability_score
        .as_deref()
        .map(str::parse::<AbilityScore>)
        .transpose()
        .map_err(|e| DecodeError::field("abilityScore", e))?;

    let dice = match (record.dice_count, record.dice_value) {
        (Some(count), Some(sides)) => Some(
            DieSize::from_sides(sides)
                .and_then(|die| DiceRoll::new(count, die))
                .map_err(|e| DecodeError::field("dice", e))?,
        ),
        (None, None) => None,
        _ => {
            return Err(DecodeError::field(
                "dice",
                "diceCount and diceValue must be set together",
            ))
        }
    };

    let details = record
        .details
        .map(Details::new)
        .transpose()
        .map_err(|e| DecodeError::field("details", e))?;

    Modifier::from_parts(
        record.id,
        owner,
        kind,
        variant,
        ability_score,
        dice,
        record.fixed_value,
        details,
        record.duration,
        record.applies_on_multiclass,
    )
}

fn decode_owner(record: &ModifierRecord) -> Result<ModifierOwner, DecodeError> {
    match (
        record.feat_id,
        record.race_trait_id,
        record.class_feature_id,
    ) {
        (Some(id), None, None) => Ok(ModifierOwner::Feat(id)),
        (None, Some(id), None) => Ok(ModifierOwner::RaceTrait(id)),
        (None, None, Some(id)) => Ok(ModifierOwner::ClassFeature(id)),
        (feat, race_trait, class_feature) => Err(DecodeError::OwnerConflict {
            owners: [
                feat.is_some(),
                race_trait.is_some(),
                class_feature.is_some(),
            ]
            .iter()
            .filter(|present| **present)
            .count(),
        }),
    }
}

/// Encode a modifier straight to JSON.
pub fn encode_json(modifier: &Modifier) -> Result<Value, EncodeError> {
    let record = encode(modifier)?;
    serde_json::to_value(record).map_err(|e| EncodeError {
        kind: modifier.kind().to_string(),
        message: e.to_string(),
    })
}

/// Decode a modifier from raw JSON.
pub fn decode_json(value: Value) -> Result<Modifier, DecodeError> {
    let record: ModifierRecord =
        serde_json::from_value(value).map_err(|e| DecodeError::Malformed(e.to_string()))?;
    decode(record)
}

// =============================================================================
// Batches
// =============================================================================

/// A record that failed to decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRecord {
    /// Position in the input batch
    pub index: usize,
    /// The record's id, when it could be read
    pub id: Option<String>,
    pub error: DecodeError,
}

/// Outcome of decoding many records: one bad record never sinks the rest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchDecode {
    pub modifiers: Vec<Modifier>,
    pub rejected: Vec<RejectedRecord>,
}

impl BatchDecode {
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Decode a batch of raw JSON records, keeping the good ones.
pub fn decode_batch(records: impl IntoIterator<Item = Value>) -> BatchDecode {
    let mut batch = BatchDecode::default();
    for (index, value) in records.into_iter().enumerate() {
        let id = value
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string);
        match decode_json(value) {
            Ok(modifier) => batch.modifiers.push(modifier),
            Err(error) => batch.rejected.push(RejectedRecord { index, id, error }),
        }
    }
    batch
}
