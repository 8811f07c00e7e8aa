//! Bed records and the availability state value object.
//!
//! A bed's `status` label and `isAvailable` flag travel as two sibling
//! fields on the wire, but in Rust they are a single [`BedState`] so the
//! pair can never desynchronize: every transition writes both halves
//! together.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wire representation of a bed's availability: the `{status, isAvailable}`
/// field pair stored alongside the rest of the bed record.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BedStateWire {
    status: String,
    is_available: bool,
}

/// The availability state of a bed.
///
/// `Emergency` is a status overlay, not a third availability axis: an
/// emergency bed carries its own availability flag and may count as either
/// available or occupied. Labels outside the conventional set are preserved
/// as `Unknown` and treated as unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BedStateWire", into = "BedStateWire")]
pub enum BedState {
    /// Ready for a new patient.
    Available,
    /// A patient (or a confirmed reservation) holds the bed.
    Occupied,
    /// Being turned over between patients.
    Cleaning,
    /// Out of service for repair.
    Maintenance,
    /// Reserved for emergency admissions; may or may not be bookable.
    Emergency { available: bool },
    /// A status label this system does not recognise.
    Unknown(String),
}

impl BedState {
    /// Reconstructs a state from the stored field pair.
    ///
    /// Label matching is case-insensitive (the source data mixes cases).
    /// Unknown labels are lowercased and kept, so a record written by some
    /// other system survives a round-trip through this one.
    pub fn from_parts(status: &str, is_available: bool) -> Self {
        match status.trim().to_ascii_lowercase().as_str() {
            "available" => BedState::Available,
            "occupied" => BedState::Occupied,
            "cleaning" => BedState::Cleaning,
            "maintenance" => BedState::Maintenance,
            "emergency" => BedState::Emergency {
                available: is_available,
            },
            other => BedState::Unknown(other.to_owned()),
        }
    }

    /// The status label as stored and displayed.
    pub fn label(&self) -> &str {
        match self {
            BedState::Available => "available",
            BedState::Occupied => "occupied",
            BedState::Cleaning => "cleaning",
            BedState::Maintenance => "maintenance",
            BedState::Emergency { .. } => "emergency",
            BedState::Unknown(label) => label,
        }
    }

    /// Whether a reservation may be placed against this bed.
    ///
    /// Only `Available` and a bookable `Emergency` bed answer true; every
    /// other state, including unknown labels, is unavailable.
    pub fn is_available(&self) -> bool {
        match self {
            BedState::Available => true,
            BedState::Emergency { available } => *available,
            _ => false,
        }
    }
}

impl From<BedStateWire> for BedState {
    fn from(wire: BedStateWire) -> Self {
        BedState::from_parts(&wire.status, wire.is_available)
    }
}

impl From<BedState> for BedStateWire {
    fn from(state: BedState) -> Self {
        BedStateWire {
            is_available: state.is_available(),
            status: state.label().to_owned(),
        }
    }
}

/// A hospital bed as held in the record store.
///
/// Field names on the wire follow the store's collection schema
/// (`bedNumber`, `roomType`, `hospitalId`, ...). The bed number is a
/// display label and is not unique across facilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bed {
    #[serde(rename = "_id")]
    pub id: String,
    pub bed_number: String,
    pub department: String,
    pub room_type: String,
    #[serde(flatten)]
    pub state: BedState,
    pub last_updated: DateTime<Utc>,
    #[serde(rename = "hospitalId")]
    pub facility_id: String,
}

/// A conjunctive filter over the bed inventory.
///
/// `None` on a dimension means unconstrained; the UI convention of passing
/// the literal selection `"all"` maps to `None` via [`BedFilter::selection`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BedFilter {
    pub facility_id: Option<String>,
    pub department: Option<String>,
    pub room_type: Option<String>,
    pub status: Option<String>,
}

impl BedFilter {
    /// Maps a UI filter selection to a constraint: `"all"` (any case) and
    /// blank both mean unconstrained.
    pub fn selection(value: &str) -> Option<String> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("all") {
            None
        } else {
            Some(trimmed.to_owned())
        }
    }

    /// Whether the given bed satisfies every constrained dimension.
    ///
    /// Status compares against the bed's state label, case-insensitively;
    /// the other dimensions compare exactly.
    pub fn matches(&self, bed: &Bed) -> bool {
        if let Some(facility_id) = &self.facility_id {
            if *facility_id != bed.facility_id {
                return false;
            }
        }
        if let Some(department) = &self.department {
            if *department != bed.department {
                return false;
            }
        }
        if let Some(room_type) = &self.room_type {
            if *room_type != bed.room_type {
                return false;
            }
        }
        if let Some(status) = &self.status {
            if !status.eq_ignore_ascii_case(bed.state.label()) {
                return false;
            }
        }
        true
    }
}

/// Aggregate availability figures over a set of beds.
///
/// `emergency` counts the emergency overlay regardless of its availability
/// flag, so emergency beds also appear in `available` or `occupied`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AvailabilityCounts {
    pub total: usize,
    pub available: usize,
    pub occupied: usize,
    pub emergency: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bed(id: &str, department: &str, room_type: &str, state: BedState) -> Bed {
        Bed {
            id: id.to_owned(),
            bed_number: format!("B-{id}"),
            department: department.to_owned(),
            room_type: room_type.to_owned(),
            state,
            last_updated: Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap(),
            facility_id: "fac-1".to_owned(),
        }
    }

    #[test]
    fn state_parses_case_insensitively() {
        assert_eq!(BedState::from_parts("Available", true), BedState::Available);
        assert_eq!(BedState::from_parts("CLEANING", false), BedState::Cleaning);
    }

    #[test]
    fn emergency_keeps_its_availability_flag() {
        let bookable = BedState::from_parts("emergency", true);
        assert!(bookable.is_available());
        let held = BedState::from_parts("emergency", false);
        assert!(!held.is_available());
        assert_eq!(held.label(), "emergency");
    }

    #[test]
    fn unknown_label_round_trips_and_is_unavailable() {
        let state = BedState::from_parts("Quarantine", true);
        assert_eq!(state, BedState::Unknown("quarantine".to_owned()));
        assert!(!state.is_available());

        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"status": "quarantine", "isAvailable": false})
        );
    }

    #[test]
    fn bed_serialises_with_collection_field_names() {
        let json = serde_json::to_value(bed("7", "ICU", "Private", BedState::Available)).unwrap();
        assert_eq!(json["_id"], "7");
        assert_eq!(json["bedNumber"], "B-7");
        assert_eq!(json["roomType"], "Private");
        assert_eq!(json["hospitalId"], "fac-1");
        assert_eq!(json["status"], "available");
        assert_eq!(json["isAvailable"], true);
        assert_eq!(json["lastUpdated"], "2024-03-01T09:00:00Z");
    }

    #[test]
    fn bed_deserialises_state_from_field_pair() {
        let bed: Bed = serde_json::from_value(serde_json::json!({
            "_id": "9",
            "bedNumber": "B-9",
            "department": "ICU",
            "roomType": "Ward",
            "status": "occupied",
            "isAvailable": false,
            "lastUpdated": "2024-03-01T09:00:00Z",
            "hospitalId": "fac-2"
        }))
        .unwrap();
        assert_eq!(bed.state, BedState::Occupied);
        assert!(!bed.state.is_available());
    }

    #[test]
    fn selection_all_is_unconstrained() {
        assert_eq!(BedFilter::selection("all"), None);
        assert_eq!(BedFilter::selection("  All "), None);
        assert_eq!(BedFilter::selection(""), None);
        assert_eq!(BedFilter::selection("ICU"), Some("ICU".to_owned()));
    }

    #[test]
    fn filter_is_a_conjunction() {
        let filter = BedFilter {
            department: Some("ICU".to_owned()),
            status: Some("available".to_owned()),
            ..BedFilter::default()
        };
        assert!(filter.matches(&bed("1", "ICU", "Ward", BedState::Available)));
        assert!(!filter.matches(&bed("2", "ICU", "Ward", BedState::Occupied)));
        assert!(!filter.matches(&bed("3", "Maternity", "Ward", BedState::Available)));
    }

    #[test]
    fn default_filter_matches_everything() {
        let filter = BedFilter::default();
        assert!(filter.matches(&bed("1", "ICU", "Ward", BedState::Maintenance)));
    }
}
