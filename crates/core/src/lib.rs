//! # Bednet Core
//!
//! Bed-inventory and reservation logic for the bed network.
//!
//! Two cooperating components:
//! - [`BedRegistry`] answers availability and filter queries over the bed
//!   inventory and is the sole mutation point for a bed's availability
//!   state.
//! - [`ReservationCoordinator`] runs the reserve/cancel state machine: a
//!   bed moves `Free -> Reserved` when a confirmed reservation is created
//!   and back to `Free` when it is cancelled, with at most one confirmed
//!   reservation per bed at any time.
//!
//! Both are written against the `bednet-store` record-store contract and
//! never assume a single writer: the availability check and the flip to
//! occupied go through a revision-guarded update, so of two racing
//! reservations exactly one wins and the other is rejected.
//!
//! **No presentation concerns**: list rendering, filter widgets and
//! navigation belong to the embedding application.

pub mod coordinator;
pub mod error;
pub mod registry;
pub mod validation;

mod records;

pub use coordinator::{CancelOutcome, ReservationCoordinator, ReserveRequest};
pub use error::{CoreError, CoreResult};
pub use registry::{compute_availability_counts, BedRegistry};
