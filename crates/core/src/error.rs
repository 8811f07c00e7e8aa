//! Core error taxonomy.
//!
//! Every operation of the registry and the coordinator returns one of
//! these kinds, with enough context (record kind, id, offending field)
//! for the caller to produce a specific message. `StateConflict` is
//! deliberately distinct from `NotFound`: "bed no longer available" and
//! "bed does not exist" call for different corrective actions.

use bednet_store::{RecordKind, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// The referenced record does not exist.
    #[error("{kind} not found: {id}")]
    NotFound { kind: RecordKind, id: String },
    /// Malformed input, named after the wire field it arrived in.
    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },
    /// The requested transition is illegal for the record's current state.
    #[error("{entity} {id}: {message}")]
    StateConflict {
        entity: RecordKind,
        id: String,
        message: String,
    },
    /// A stored record could not be decoded, or a record could not be
    /// encoded for storage. Store-failure class: the data layer, not the
    /// caller, is at fault.
    #[error("failed to encode or decode {kind} record {id}: {source}")]
    Codec {
        kind: RecordKind,
        id: String,
        #[source]
        source: serde_json::Error,
    },
    /// The underlying record store failed; any partial mutation applied in
    /// the current operation has been rolled back.
    #[error("record store failure: {0}")]
    Store(#[from] StoreError),
}

pub type CoreResult<T> = std::result::Result<T, CoreError>;
