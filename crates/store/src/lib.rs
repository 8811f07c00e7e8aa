//! # Bednet Store
//!
//! The persistent record-store contract the bed-network core is written
//! against, plus an in-memory reference implementation.
//!
//! The store holds generic JSON documents in three collections (beds,
//! reservations, facilities) and exposes only create / read / partial
//! update / list. Every document carries a `revision` counter that acts as
//! an optimistic-concurrency token: an update may be guarded on the
//! revision the caller last read, and a guarded update either applies
//! atomically or fails without writing. That single primitive is what lets
//! the reservation coordinator close the check-then-flip race on bed
//! availability.
//!
//! **No domain logic**: typed records and transition rules live in
//! `bednet-types` and `bednet-core`.

pub mod error;
pub mod memory;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;

use serde_json::Value;

/// The record collections the core operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Bed,
    Reservation,
    Facility,
}

impl RecordKind {
    /// The collection id used by the backing store.
    pub fn collection_id(&self) -> &'static str {
        match self {
            RecordKind::Bed => "hospitalbeds",
            RecordKind::Reservation => "bookings",
            RecordKind::Facility => "hospitals",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RecordKind::Bed => "bed",
            RecordKind::Reservation => "reservation",
            RecordKind::Facility => "facility",
        };
        write!(f, "{label}")
    }
}

/// A stored record: its id, its revision, and its JSON body.
///
/// `revision` starts at 1 on create and increments on every update. The
/// body always contains the id under `"_id"`.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub revision: u64,
    pub data: Value,
}

/// Concurrency guard for [`RecordStore::update`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateGuard {
    /// Apply unconditionally; concurrent writers serialize and the last
    /// one wins.
    Any,
    /// Apply only if the record's current revision matches; otherwise fail
    /// with [`StoreError::RevisionConflict`] and write nothing.
    IfRevision(u64),
}

/// The persistence boundary for bed, reservation and facility records.
///
/// Implementations must serialize writers per record: two concurrent
/// updates of the same id must apply one after the other, and a guarded
/// update must check and write as one atomic step. Reads may serve a
/// snapshot and are not required to observe a write still in flight.
///
/// All methods are async: callers must assume any of them can suspend on
/// I/O and must not rely on ordering between operations issued by
/// different callers.
#[async_trait::async_trait]
pub trait RecordStore: Send + Sync {
    /// Creates a record, with a caller-supplied id or a store-assigned one.
    ///
    /// # Errors
    ///
    /// `DuplicateId` if the id already exists in the collection,
    /// `InvalidDocument` if the body is not a JSON object.
    async fn create(&self, kind: RecordKind, id: Option<String>, data: Value)
        -> StoreResult<Document>;

    /// Fetches a record by id.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing id; never a default record.
    async fn get_by_id(&self, kind: RecordKind, id: &str) -> StoreResult<Document>;

    /// Applies a partial update: only the top-level fields present in
    /// `patch` are written, everything else is untouched, and the
    /// revision is bumped. The `"_id"` field is ignored if present in the
    /// patch.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing id, `RevisionConflict` if the guard does
    /// not match, `InvalidDocument` if `patch` is not a JSON object. On
    /// any error nothing is written.
    async fn update(
        &self,
        kind: RecordKind,
        id: &str,
        patch: Value,
        guard: UpdateGuard,
    ) -> StoreResult<Document>;

    /// Returns every record in the collection.
    async fn list(&self, kind: RecordKind) -> StoreResult<Vec<Document>>;
}
