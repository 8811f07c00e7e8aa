//! In-memory record store.
//!
//! Backs the test suite and embedders that do not need durability. A
//! single `RwLock` over all collections serializes writers, which makes
//! the revision-guarded update a true compare-and-swap.

use crate::error::{StoreError, StoreResult};
use crate::{Document, RecordKind, RecordStore, UpdateGuard};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

type Collection = HashMap<String, Document>;

/// A [`RecordStore`] held entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<&'static str, Collection>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes a record outright.
    ///
    /// Not part of the [`RecordStore`] contract (the core never deletes);
    /// this exists for seeding and teardown in tests and maintenance
    /// tooling. Returns the removed document, if any.
    pub async fn remove(&self, kind: RecordKind, id: &str) -> Option<Document> {
        let mut collections = self.collections.write().await;
        collections
            .get_mut(kind.collection_id())
            .and_then(|collection| collection.remove(id))
    }
}

#[async_trait::async_trait]
impl RecordStore for MemoryStore {
    async fn create(
        &self,
        kind: RecordKind,
        id: Option<String>,
        data: Value,
    ) -> StoreResult<Document> {
        let Value::Object(mut body) = data else {
            return Err(StoreError::InvalidDocument(
                "record body must be a JSON object".into(),
            ));
        };

        let id = id.unwrap_or_else(|| Uuid::new_v4().to_string());
        body.insert("_id".to_owned(), Value::String(id.clone()));

        let mut collections = self.collections.write().await;
        let collection = collections.entry(kind.collection_id()).or_default();
        if collection.contains_key(&id) {
            return Err(StoreError::DuplicateId { kind, id });
        }

        let document = Document {
            id: id.clone(),
            revision: 1,
            data: Value::Object(body),
        };
        collection.insert(id, document.clone());
        Ok(document)
    }

    async fn get_by_id(&self, kind: RecordKind, id: &str) -> StoreResult<Document> {
        let collections = self.collections.read().await;
        collections
            .get(kind.collection_id())
            .and_then(|collection| collection.get(id))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                kind,
                id: id.to_owned(),
            })
    }

    async fn update(
        &self,
        kind: RecordKind,
        id: &str,
        patch: Value,
        guard: UpdateGuard,
    ) -> StoreResult<Document> {
        let Value::Object(patch) = patch else {
            return Err(StoreError::InvalidDocument(
                "update patch must be a JSON object".into(),
            ));
        };

        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(kind.collection_id())
            .and_then(|collection| collection.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                kind,
                id: id.to_owned(),
            })?;

        if let UpdateGuard::IfRevision(expected) = guard {
            if document.revision != expected {
                return Err(StoreError::RevisionConflict {
                    kind,
                    id: id.to_owned(),
                    expected,
                    actual: document.revision,
                });
            }
        }

        let Value::Object(body) = &mut document.data else {
            return Err(StoreError::InvalidDocument(format!(
                "stored {kind} record {id} is not a JSON object"
            )));
        };
        for (field, value) in patch {
            if field == "_id" {
                continue;
            }
            body.insert(field, value);
        }
        document.revision += 1;
        Ok(document.clone())
    }

    async fn list(&self, kind: RecordKind) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read().await;
        let mut documents: Vec<Document> = collections
            .get(kind.collection_id())
            .map(|collection| collection.values().cloned().collect())
            .unwrap_or_default();
        documents.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(documents)
    }
}
