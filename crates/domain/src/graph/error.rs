use thiserror::Error;

/// A graph write or snapshot that would break a structural invariant.
///
/// Ids are carried as strings so one error type serves every owner kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("Cycle in {kind} chain: {}", .path.join(" -> "))]
    Cycle {
        kind: &'static str,
        path: Vec<String>,
    },

    #[error("Cannot remove {kind} {id}: still referenced by {}", .dependents.join(", "))]
    ReferencedByOthers {
        kind: &'static str,
        id: String,
        dependents: Vec<String>,
    },

    #[error("{kind} {id} requires {required}, which belongs to a different entity")]
    OutsidePool {
        kind: &'static str,
        id: String,
        required: String,
    },

    #[error("{kind} {id} points at {target}, which does not exist")]
    Dangling {
        kind: &'static str,
        id: String,
        target: String,
    },

    #[error("Duplicate {kind} id {id}")]
    DuplicateId { kind: &'static str, id: String },

    #[error("{kind} {id} belongs to {actual}, not {expected}")]
    OwnerMismatch {
        kind: &'static str,
        id: String,
        expected: String,
        actual: String,
    },

    #[error("Unknown {kind} {id}")]
    UnknownNode { kind: &'static str, id: String },

    #[error("{kind} {id} cannot replace another {kind}")]
    ReplacementUnsupported { kind: &'static str, id: String },

    #[error(
        "{kind} {replaced} is replaced by {replaced_by} but its option {required_option} is still required by {required_by}"
    )]
    ReplacedIsRequired {
        kind: &'static str,
        replaced: String,
        replaced_by: String,
        required_option: String,
        required_by: String,
    },

    #[error("Modifier {modifier} on {entity} belongs to {actual}")]
    ModifierOwnerMismatch {
        entity: String,
        modifier: String,
        actual: String,
    },
}

impl GraphError {
    pub(crate) fn unknown(kind: &'static str, id: impl ToString) -> Self {
        Self::UnknownNode {
            kind,
            id: id.to_string(),
        }
    }

    pub(crate) fn cycle<I: ToString>(kind: &'static str, path: &[I]) -> Self {
        Self::Cycle {
            kind,
            path: path.iter().map(ToString::to_string).collect(),
        }
    }
}
