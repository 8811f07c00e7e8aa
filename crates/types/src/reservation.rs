//! Reservation records and patient contact details.

use crate::{Email, NonEmptyText};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The lifecycle status of a reservation.
///
/// A reservation is created `Confirmed`, may move to `Cancelled`, and never
/// moves back. `Failed` marks a reservation whose bed update lost the race
/// or hit a store failure and was rolled back; the store contract has no
/// delete, so rollback marks instead of removing. `Pending` exists in
/// legacy data and is never produced by this system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Confirmed,
    Cancelled,
    Pending,
    Failed,
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Pending => "pending",
            ReservationStatus::Failed => "failed",
        };
        write!(f, "{label}")
    }
}

/// Validated patient contact details attached to a reservation request.
///
/// Construction goes through the validated text types, so a
/// `PatientInfo` in hand means every required field is present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatientInfo {
    pub name: NonEmptyText,
    pub email: Email,
    pub contact_number: NonEmptyText,
}

/// A bed reservation as held in the record store.
///
/// Many reservations may reference the same bed over time, but at most one
/// `confirmed` reservation may exist per bed at any moment; the reservation
/// coordinator protects that invariant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    #[serde(rename = "_id")]
    pub id: String,
    pub patient_name: NonEmptyText,
    pub patient_email: Email,
    pub patient_contact_number: NonEmptyText,
    #[serde(rename = "bedIdentifier")]
    pub bed_id: String,
    #[serde(rename = "bookingStartDate")]
    pub start: DateTime<Utc>,
    #[serde(rename = "bookingEndDate")]
    pub end: DateTime<Utc>,
    #[serde(rename = "bookingStatus")]
    pub status: ReservationStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn status_serialises_lowercase() {
        let s = serde_json::to_string(&ReservationStatus::Confirmed).unwrap();
        assert_eq!(s, "\"confirmed\"");
        let s = serde_json::to_string(&ReservationStatus::Cancelled).unwrap();
        assert_eq!(s, "\"cancelled\"");
    }

    #[test]
    fn reservation_serialises_with_collection_field_names() {
        let reservation = Reservation {
            id: "r-1".to_owned(),
            patient_name: NonEmptyText::new("Jane Doe").unwrap(),
            patient_email: Email::new("jane@example.org").unwrap(),
            patient_contact_number: NonEmptyText::new("+44 20 7946 0000").unwrap(),
            bed_id: "bed-1".to_owned(),
            start: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
            status: ReservationStatus::Confirmed,
        };
        let json = serde_json::to_value(&reservation).unwrap();
        assert_eq!(json["_id"], "r-1");
        assert_eq!(json["patientName"], "Jane Doe");
        assert_eq!(json["bedIdentifier"], "bed-1");
        assert_eq!(json["bookingStartDate"], "2024-03-01T10:00:00Z");
        assert_eq!(json["bookingEndDate"], "2024-03-01T12:00:00Z");
        assert_eq!(json["bookingStatus"], "confirmed");
    }

    #[test]
    fn reservation_rejects_blank_patient_name_on_decode() {
        let result: Result<Reservation, _> = serde_json::from_value(serde_json::json!({
            "_id": "r-2",
            "patientName": "   ",
            "patientEmail": "jane@example.org",
            "patientContactNumber": "0",
            "bedIdentifier": "bed-1",
            "bookingStartDate": "2024-03-01T10:00:00Z",
            "bookingEndDate": "2024-03-01T12:00:00Z",
            "bookingStatus": "confirmed"
        }));
        assert!(result.is_err());
    }
}
