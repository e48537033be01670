//! Foundation types for the HBnB object store.
//!
//! Every other HBnB crate depends on `hbnb-types`.
//!
//! # Key Types
//!
//! - [`RecordId`] — Identity of a stored record (random UUID when fresh)
//! - [`Timestamp`] — Microsecond-resolution creation/update time

pub mod error;
pub mod identity;
pub mod temporal;

pub use error::TypeError;
pub use identity::RecordId;
pub use temporal::{Timestamp, TIMESTAMP_FORMAT};
