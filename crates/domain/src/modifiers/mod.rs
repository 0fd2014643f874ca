//! Rule-effect modifiers attached to feats, race traits, and class features.

pub mod codec;
mod envelope;
pub mod payloads;
mod references;
mod variant;

pub use codec::{
    decode, decode_batch, decode_json, decode_variant, encode, encode_json, encode_variant,
    BatchDecode, DecodeError, EncodeError, ModifierRecord, RejectedRecord,
};
pub use envelope::{Modifier, ModifierOwner};
pub use payloads::*;
pub use references::{
    KnownReferences, ReferenceLookup, ReferenceResolution, ReferenceSlot, ResolvedReference,
    WeakReference,
};
pub use variant::{ModifierKind, ModifierVariant};
