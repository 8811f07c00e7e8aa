//! Store error types.

use crate::RecordKind;

/// Failures surfaced by a [`crate::RecordStore`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{kind} record not found: {id}")]
    NotFound { kind: RecordKind, id: String },
    #[error("{kind} record already exists: {id}")]
    DuplicateId { kind: RecordKind, id: String },
    #[error("{kind} record {id} was modified concurrently (expected revision {expected}, found {actual})")]
    RevisionConflict {
        kind: RecordKind,
        id: String,
        expected: u64,
        actual: u64,
    },
    #[error("invalid document: {0}")]
    InvalidDocument(String),
    /// Transport, timeout or backend-internal failure. The in-memory store
    /// never produces this; real backends and test doubles do.
    #[error("record store backend failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
