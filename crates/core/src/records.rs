//! Conversions between typed records and store documents.

use crate::error::{CoreError, CoreResult};
use bednet_store::{Document, RecordKind};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Decodes a fetched document into a typed record.
pub(crate) fn decode<T: DeserializeOwned>(kind: RecordKind, document: &Document) -> CoreResult<T> {
    serde_json::from_value(document.data.clone()).map_err(|source| CoreError::Codec {
        kind,
        id: document.id.clone(),
        source,
    })
}

/// Encodes a typed record into a document body for storage.
pub(crate) fn encode<T: Serialize>(kind: RecordKind, id: &str, record: &T) -> CoreResult<Value> {
    serde_json::to_value(record).map_err(|source| CoreError::Codec {
        kind,
        id: id.to_owned(),
        source,
    })
}
