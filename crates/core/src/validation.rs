//! Input validation for reservation requests.
//!
//! Field names in validation errors are the wire names the caller
//! submitted (`patientName`, `bookingStartDate`, ...), so the presentation
//! layer can attach the message to the right form field.

use crate::error::{CoreError, CoreResult};
use bednet_types::{Email, NonEmptyText, PatientInfo, TextError};
use chrono::{DateTime, Utc};

/// Validates a reservation window against the clock.
///
/// `now` is passed in rather than read here so callers (and tests) control
/// the clock; `reserve` passes `Utc::now()`.
///
/// # Errors
///
/// `Validation` on `bookingEndDate` if the window is empty or inverted,
/// on `bookingStartDate` if the start is already in the past.
pub fn validate_reservation_window(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> CoreResult<()> {
    if end <= start {
        return Err(CoreError::Validation {
            field: "bookingEndDate",
            message: "booking end must be after booking start".into(),
        });
    }
    if start < now {
        return Err(CoreError::Validation {
            field: "bookingStartDate",
            message: "booking start must not be in the past".into(),
        });
    }
    Ok(())
}

/// Builds validated patient contact details from raw form input.
///
/// # Errors
///
/// `Validation` naming the first offending field: all three fields are
/// required, and the email must look like `local@domain`.
pub fn patient_info(name: &str, email: &str, contact_number: &str) -> CoreResult<PatientInfo> {
    let name = NonEmptyText::new(name).map_err(|err| field_error("patientName", err))?;
    let email = Email::new(email).map_err(|err| field_error("patientEmail", err))?;
    let contact_number =
        NonEmptyText::new(contact_number).map_err(|err| field_error("patientContactNumber", err))?;
    Ok(PatientInfo {
        name,
        email,
        contact_number,
    })
}

fn field_error(field: &'static str, err: TextError) -> CoreError {
    CoreError::Validation {
        field,
        message: err.to_string(),
    }
}
