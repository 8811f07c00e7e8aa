//! Facility records.
//!
//! Facilities are descriptive only: beds reference them, the presentation
//! layer lists them, and no state transition ever touches one.

use serde::{Deserialize, Serialize};

/// A hospital (or other care facility) in the network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Facility {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "hospitalName")]
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
}
