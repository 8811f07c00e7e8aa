//! Bed Registry: availability queries over the bed inventory.
//!
//! The registry is the sole authority over a bed's availability state.
//! Reads serve a snapshot of the store; the only mutation,
//! [`BedRegistry::set_availability`], is crate-private so that nothing
//! outside the reservation coordinator can flip a bed.

use crate::error::{CoreError, CoreResult};
use crate::records;
use bednet_store::{RecordKind, RecordStore, StoreError, UpdateGuard};
use bednet_types::{AvailabilityCounts, Bed, BedFilter, BedState, Facility};
use chrono::Utc;
use std::sync::Arc;

/// Read (and, for the coordinator, write) access to the bed inventory.
pub struct BedRegistry<S> {
    store: Arc<S>,
}

impl<S> Clone for BedRegistry<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: RecordStore> BedRegistry<S> {
    /// Creates a registry over the given record store.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Returns a snapshot of the beds matching the filter.
    ///
    /// The filter is a conjunction; an unconstrained filter returns the
    /// whole inventory. Records that fail to decode are skipped with a
    /// warning rather than failing the whole listing.
    pub async fn list_beds(&self, filter: &BedFilter) -> CoreResult<Vec<Bed>> {
        let documents = self.store.list(RecordKind::Bed).await?;
        let mut beds = Vec::with_capacity(documents.len());
        for document in documents {
            match records::decode::<Bed>(RecordKind::Bed, &document) {
                Ok(bed) => {
                    if filter.matches(&bed) {
                        beds.push(bed);
                    }
                }
                Err(err) => {
                    tracing::warn!("skipping undecodable bed record {}: {err}", document.id);
                }
            }
        }
        Ok(beds)
    }

    /// Fetches a single bed.
    ///
    /// # Errors
    ///
    /// `NotFound` if no bed has this id.
    pub async fn get_bed(&self, id: &str) -> CoreResult<Bed> {
        let (bed, _revision) = self.bed_with_revision(id).await?;
        Ok(bed)
    }

    /// Fetches a bed together with its store revision, the concurrency
    /// token the coordinator guards its availability flip on.
    pub(crate) async fn bed_with_revision(&self, id: &str) -> CoreResult<(Bed, u64)> {
        let document = match self.store.get_by_id(RecordKind::Bed, id).await {
            Ok(document) => document,
            Err(StoreError::NotFound { .. }) => {
                return Err(CoreError::NotFound {
                    kind: RecordKind::Bed,
                    id: id.to_owned(),
                })
            }
            Err(err) => return Err(err.into()),
        };
        let bed = records::decode(RecordKind::Bed, &document)?;
        Ok((bed, document.revision))
    }

    /// Overwrites a bed's availability state.
    ///
    /// Status, availability flag and last-updated timestamp are written
    /// together in one patch, so the pair can never desynchronize. With
    /// `UpdateGuard::IfRevision` this is the compare-and-swap the reserve
    /// transition relies on; with `UpdateGuard::Any` concurrent writers
    /// serialize and the last one wins.
    ///
    /// Crate-private: only the reservation coordinator may flip a bed.
    pub(crate) async fn set_availability(
        &self,
        id: &str,
        state: BedState,
        guard: UpdateGuard,
    ) -> CoreResult<Bed> {
        let patch = serde_json::json!({
            "status": state.label(),
            "isAvailable": state.is_available(),
            "lastUpdated": Utc::now(),
        });
        match self.store.update(RecordKind::Bed, id, patch, guard).await {
            Ok(document) => records::decode(RecordKind::Bed, &document),
            Err(StoreError::NotFound { .. }) => Err(CoreError::NotFound {
                kind: RecordKind::Bed,
                id: id.to_owned(),
            }),
            Err(err) => Err(err.into()),
        }
    }

    /// Returns every facility in the network.
    pub async fn list_facilities(&self) -> CoreResult<Vec<Facility>> {
        let documents = self.store.list(RecordKind::Facility).await?;
        let mut facilities = Vec::with_capacity(documents.len());
        for document in documents {
            match records::decode::<Facility>(RecordKind::Facility, &document) {
                Ok(facility) => facilities.push(facility),
                Err(err) => {
                    tracing::warn!(
                        "skipping undecodable facility record {}: {err}",
                        document.id
                    );
                }
            }
        }
        Ok(facilities)
    }

    /// Fetches a single facility.
    ///
    /// # Errors
    ///
    /// `NotFound` if no facility has this id.
    pub async fn get_facility(&self, id: &str) -> CoreResult<Facility> {
        let document = match self.store.get_by_id(RecordKind::Facility, id).await {
            Ok(document) => document,
            Err(StoreError::NotFound { .. }) => {
                return Err(CoreError::NotFound {
                    kind: RecordKind::Facility,
                    id: id.to_owned(),
                })
            }
            Err(err) => return Err(err.into()),
        };
        records::decode(RecordKind::Facility, &document)
    }
}

/// Aggregates availability figures over a set of beds. Pure; no store
/// access.
///
/// `occupied` is simply `total - available`. `emergency` counts the
/// emergency overlay regardless of its availability flag, so an emergency
/// bed also appears under `available` or `occupied`.
pub fn compute_availability_counts(beds: &[Bed]) -> AvailabilityCounts {
    let total = beds.len();
    let available = beds.iter().filter(|bed| bed.state.is_available()).count();
    let emergency = beds
        .iter()
        .filter(|bed| matches!(bed.state, BedState::Emergency { .. }))
        .count();
    AvailabilityCounts {
        total,
        available,
        occupied: total - available,
        emergency,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bednet_store::MemoryStore;
    use serde_json::json;

    fn bed_body(number: &str, department: &str, room_type: &str, state: &BedState) -> serde_json::Value {
        json!({
            "bedNumber": number,
            "department": department,
            "roomType": room_type,
            "status": state.label(),
            "isAvailable": state.is_available(),
            "lastUpdated": "2024-03-01T09:00:00Z",
            "hospitalId": "fac-1",
        })
    }

    async fn seed_bed(store: &MemoryStore, id: &str, department: &str, state: BedState) {
        store
            .create(
                RecordKind::Bed,
                Some(id.to_owned()),
                bed_body(&format!("B-{id}"), department, "Ward", &state),
            )
            .await
            .unwrap();
    }

    fn in_memory_bed(id: &str, state: BedState) -> Bed {
        Bed {
            id: id.to_owned(),
            bed_number: format!("B-{id}"),
            department: "ICU".to_owned(),
            room_type: "Ward".to_owned(),
            state,
            last_updated: Utc::now(),
            facility_id: "fac-1".to_owned(),
        }
    }

    #[tokio::test]
    async fn list_beds_applies_the_filter_conjunctively() {
        let store = Arc::new(MemoryStore::new());
        seed_bed(&store, "1", "ICU", BedState::Available).await;
        seed_bed(&store, "2", "ICU", BedState::Occupied).await;
        seed_bed(&store, "3", "Maternity", BedState::Available).await;
        let registry = BedRegistry::new(store);

        let all = registry.list_beds(&BedFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let filter = BedFilter {
            department: Some("ICU".to_owned()),
            status: Some("available".to_owned()),
            ..BedFilter::default()
        };
        let filtered = registry.list_beds(&filter).await.unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].id, "1");
    }

    #[tokio::test]
    async fn list_beds_skips_undecodable_records() {
        let store = Arc::new(MemoryStore::new());
        seed_bed(&store, "1", "ICU", BedState::Available).await;
        store
            .create(
                RecordKind::Bed,
                Some("broken".to_owned()),
                json!({"bedNumber": "B-x", "lastUpdated": "not a date"}),
            )
            .await
            .unwrap();
        let registry = BedRegistry::new(store);

        let beds = registry.list_beds(&BedFilter::default()).await.unwrap();
        assert_eq!(beds.len(), 1);
        assert_eq!(beds[0].id, "1");
    }

    #[tokio::test]
    async fn get_bed_missing_is_not_found() {
        let registry = BedRegistry::new(Arc::new(MemoryStore::new()));
        let err = registry.get_bed("nope").await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::NotFound {
                kind: RecordKind::Bed,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn set_availability_writes_both_fields_and_the_timestamp() {
        let store = Arc::new(MemoryStore::new());
        seed_bed(&store, "1", "ICU", BedState::Available).await;
        let registry = BedRegistry::new(store.clone());

        let bed = registry
            .set_availability("1", BedState::Occupied, UpdateGuard::Any)
            .await
            .unwrap();
        assert_eq!(bed.state, BedState::Occupied);

        let document = store.get_by_id(RecordKind::Bed, "1").await.unwrap();
        assert_eq!(document.data["status"], "occupied");
        assert_eq!(document.data["isAvailable"], false);
        assert_ne!(document.data["lastUpdated"], "2024-03-01T09:00:00Z");
    }

    #[tokio::test]
    async fn facilities_are_listed_and_fetched() {
        let store = Arc::new(MemoryStore::new());
        store
            .create(
                RecordKind::Facility,
                Some("fac-1".to_owned()),
                json!({"hospitalName": "St Elsewhere", "city": "London"}),
            )
            .await
            .unwrap();
        let registry = BedRegistry::new(store);

        let facilities = registry.list_facilities().await.unwrap();
        assert_eq!(facilities.len(), 1);

        let facility = registry.get_facility("fac-1").await.unwrap();
        assert_eq!(facility.name, "St Elsewhere");

        let err = registry.get_facility("fac-2").await.unwrap_err();
        assert!(matches!(
            err,
            CoreError::NotFound {
                kind: RecordKind::Facility,
                ..
            }
        ));
    }

    #[test]
    fn counts_match_the_reference_scenario() {
        // 10 beds, 6 available, 2 emergency of which 1 is available.
        let mut beds = vec![
            in_memory_bed("1", BedState::Available),
            in_memory_bed("2", BedState::Available),
            in_memory_bed("3", BedState::Available),
            in_memory_bed("4", BedState::Available),
            in_memory_bed("5", BedState::Available),
            in_memory_bed("6", BedState::Emergency { available: true }),
            in_memory_bed("7", BedState::Emergency { available: false }),
            in_memory_bed("8", BedState::Occupied),
            in_memory_bed("9", BedState::Cleaning),
            in_memory_bed("10", BedState::Maintenance),
        ];
        let counts = compute_availability_counts(&beds);
        assert_eq!(
            counts,
            AvailabilityCounts {
                total: 10,
                available: 6,
                occupied: 4,
                emergency: 2
            }
        );

        // Unknown labels count as unavailable.
        beds.push(in_memory_bed("11", BedState::Unknown("quarantine".into())));
        let counts = compute_availability_counts(&beds);
        assert_eq!(counts.total, 11);
        assert_eq!(counts.available, 6);
        assert_eq!(counts.occupied, 5);
    }

    #[test]
    fn counts_over_no_beds_are_zero() {
        assert_eq!(compute_availability_counts(&[]), AvailabilityCounts::default());
    }
}
