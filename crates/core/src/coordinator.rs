//! Reservation Coordinator: the reserve/cancel state machine.
//!
//! Per bed, as observed through reservations: `Free -> Reserved` on a
//! successful reserve, `Reserved -> Free` on cancellation, and nothing
//! else. Reserving re-checks availability against the store at execution
//! time and flips the bed with a revision-guarded update, so two racing
//! reservations resolve to exactly one winner; the loser gets a state
//! conflict, never a silently overwritten reservation.
//!
//! Reserve creates the reservation first and flips the bed second. If the
//! flip fails for any reason the reservation is rolled back (marked
//! `failed`), so a bed still shown as available never has a live
//! reservation pointing at it.

use crate::error::{CoreError, CoreResult};
use crate::records;
use crate::registry::BedRegistry;
use crate::validation;
use bednet_store::{RecordKind, RecordStore, StoreError, UpdateGuard};
use bednet_types::{BedState, PatientInfo, Reservation, ReservationStatus};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

/// A request to reserve a bed for a patient.
///
/// Patient details arrive pre-validated (see
/// [`crate::validation::patient_info`]); the time window is validated at
/// execution time.
#[derive(Debug, Clone)]
pub struct ReserveRequest {
    pub bed_id: String,
    pub patient: PatientInfo,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// The result of a successful cancellation.
///
/// `bed_restored` is false when the referenced bed no longer existed, in
/// which case the availability restore was skipped with a warning.
#[derive(Debug, Clone)]
pub struct CancelOutcome {
    pub reservation: Reservation,
    pub bed_restored: bool,
}

/// Executes reservation transitions against the bed inventory.
pub struct ReservationCoordinator<S> {
    store: Arc<S>,
    registry: BedRegistry<S>,
}

impl<S> Clone for ReservationCoordinator<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            registry: self.registry.clone(),
        }
    }
}

impl<S: RecordStore> ReservationCoordinator<S> {
    /// Creates a coordinator over the given record store.
    pub fn new(store: Arc<S>) -> Self {
        let registry = BedRegistry::new(store.clone());
        Self { store, registry }
    }

    /// The registry this coordinator mutates through.
    pub fn registry(&self) -> &BedRegistry<S> {
        &self.registry
    }

    /// Reserves a bed: creates a confirmed reservation and flips the bed
    /// to occupied, atomically with respect to other reservation attempts
    /// on the same bed.
    ///
    /// # Errors
    ///
    /// - `Validation` if the time window is empty, inverted, or starts in
    ///   the past.
    /// - `NotFound` if the bed does not exist.
    /// - `StateConflict` if the bed is not available at execution time,
    ///   including the case where a concurrent reservation won the race
    ///   after this one's availability check.
    /// - `Store` if the record store failed; any reservation already
    ///   created has been rolled back.
    pub async fn reserve(&self, request: ReserveRequest) -> CoreResult<Reservation> {
        validation::validate_reservation_window(request.start, request.end, Utc::now())?;

        let (bed, revision) = self.registry.bed_with_revision(&request.bed_id).await?;
        if !bed.state.is_available() {
            return Err(CoreError::StateConflict {
                entity: RecordKind::Bed,
                id: bed.id,
                message: "bed is not available".into(),
            });
        }

        let reservation = Reservation {
            id: Uuid::new_v4().to_string(),
            patient_name: request.patient.name,
            patient_email: request.patient.email,
            patient_contact_number: request.patient.contact_number,
            bed_id: bed.id.clone(),
            start: request.start,
            end: request.end,
            status: ReservationStatus::Confirmed,
        };
        let body = records::encode(RecordKind::Reservation, &reservation.id, &reservation)?;
        self.store
            .create(RecordKind::Reservation, Some(reservation.id.clone()), body)
            .await?;

        // The flip is guarded on the revision read above: if anything
        // touched the bed since, the update fails and nothing is written.
        match self
            .registry
            .set_availability(&bed.id, BedState::Occupied, UpdateGuard::IfRevision(revision))
            .await
        {
            Ok(_) => {
                tracing::debug!("reserved bed {} under reservation {}", bed.id, reservation.id);
                Ok(reservation)
            }
            Err(CoreError::Store(StoreError::RevisionConflict { .. })) => {
                self.roll_back_reservation(&reservation.id).await;
                Err(CoreError::StateConflict {
                    entity: RecordKind::Bed,
                    id: bed.id,
                    message: "bed is no longer available".into(),
                })
            }
            Err(err) => {
                self.roll_back_reservation(&reservation.id).await;
                Err(err)
            }
        }
    }

    /// Cancels a confirmed reservation and restores the bed to available.
    ///
    /// Double-cancel is rejected, not silently accepted: a second cancel
    /// of the same reservation reports a state conflict so client-side
    /// bugs stay visible.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the reservation does not exist.
    /// - `StateConflict` if the reservation is not in `confirmed` state,
    ///   or a concurrent cancel got there first.
    /// - `Store` if the record store failed; the reservation has been
    ///   restored to `confirmed`.
    pub async fn cancel(&self, reservation_id: &str) -> CoreResult<CancelOutcome> {
        let document = match self
            .store
            .get_by_id(RecordKind::Reservation, reservation_id)
            .await
        {
            Ok(document) => document,
            Err(StoreError::NotFound { .. }) => {
                return Err(CoreError::NotFound {
                    kind: RecordKind::Reservation,
                    id: reservation_id.to_owned(),
                })
            }
            Err(err) => return Err(err.into()),
        };
        let mut reservation: Reservation = records::decode(RecordKind::Reservation, &document)?;

        if reservation.status != ReservationStatus::Confirmed {
            return Err(CoreError::StateConflict {
                entity: RecordKind::Reservation,
                id: reservation.id,
                message: format!(
                    "reservation is {}; only a confirmed reservation can be cancelled",
                    reservation.status
                ),
            });
        }

        // Guarded on the revision read above, so of two racing cancels
        // only one flips the status.
        let patch = serde_json::json!({ "bookingStatus": ReservationStatus::Cancelled });
        match self
            .store
            .update(
                RecordKind::Reservation,
                &reservation.id,
                patch,
                UpdateGuard::IfRevision(document.revision),
            )
            .await
        {
            Ok(_) => {}
            Err(StoreError::RevisionConflict { .. }) => {
                return Err(CoreError::StateConflict {
                    entity: RecordKind::Reservation,
                    id: reservation.id,
                    message: "reservation was modified concurrently; it may already be cancelled"
                        .into(),
                })
            }
            Err(err) => return Err(err.into()),
        }
        reservation.status = ReservationStatus::Cancelled;

        match self
            .registry
            .set_availability(&reservation.bed_id, BedState::Available, UpdateGuard::Any)
            .await
        {
            Ok(_) => Ok(CancelOutcome {
                reservation,
                bed_restored: true,
            }),
            Err(CoreError::NotFound { .. }) => {
                tracing::warn!(
                    "bed {} referenced by cancelled reservation {} no longer exists; skipping availability restore",
                    reservation.bed_id,
                    reservation.id
                );
                Ok(CancelOutcome {
                    reservation,
                    bed_restored: false,
                })
            }
            Err(err) => {
                // The cancel half-applied: put the reservation back.
                let patch = serde_json::json!({ "bookingStatus": ReservationStatus::Confirmed });
                if let Err(rollback_err) = self
                    .store
                    .update(
                        RecordKind::Reservation,
                        &reservation.id,
                        patch,
                        UpdateGuard::Any,
                    )
                    .await
                {
                    tracing::error!(
                        "failed to restore reservation {} to confirmed after bed update failure: {rollback_err}",
                        reservation.id
                    );
                }
                Err(err)
            }
        }
    }

    /// Fetches a single reservation.
    ///
    /// # Errors
    ///
    /// `NotFound` if no reservation has this id.
    pub async fn get_reservation(&self, id: &str) -> CoreResult<Reservation> {
        let document = match self.store.get_by_id(RecordKind::Reservation, id).await {
            Ok(document) => document,
            Err(StoreError::NotFound { .. }) => {
                return Err(CoreError::NotFound {
                    kind: RecordKind::Reservation,
                    id: id.to_owned(),
                })
            }
            Err(err) => return Err(err.into()),
        };
        records::decode(RecordKind::Reservation, &document)
    }

    /// Returns every reservation in the store, undecodable records
    /// skipped with a warning.
    pub async fn list_reservations(&self) -> CoreResult<Vec<Reservation>> {
        let documents = self.store.list(RecordKind::Reservation).await?;
        let mut reservations = Vec::with_capacity(documents.len());
        for document in documents {
            match records::decode::<Reservation>(RecordKind::Reservation, &document) {
                Ok(reservation) => reservations.push(reservation),
                Err(err) => {
                    tracing::warn!(
                        "skipping undecodable reservation record {}: {err}",
                        document.id
                    );
                }
            }
        }
        Ok(reservations)
    }

    /// Marks a reservation `failed` after its bed update did not apply.
    /// A rollback failure is logged, not returned: the primary error is
    /// already on its way to the caller.
    async fn roll_back_reservation(&self, id: &str) {
        let patch = serde_json::json!({ "bookingStatus": ReservationStatus::Failed });
        if let Err(err) = self
            .store
            .update(RecordKind::Reservation, id, patch, UpdateGuard::Any)
            .await
        {
            tracing::error!("failed to roll back reservation {id} after bed update failure: {err}");
        }
    }
}
