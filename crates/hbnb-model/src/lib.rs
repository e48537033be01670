//! Entity records for the HBnB object store.
//!
//! Every domain object -- users, states, cities, places, amenities,
//! reviews -- is a [`Record`]: an identity, creation/update timestamps, and
//! a bag of named fields layered over its [`EntityKind`]'s defaults.
//!
//! # Lifecycle
//!
//! - [`Record::create_new`] -- fresh identity and timestamps
//! - [`Record::reconstruct`] -- strict rebuild from a serialized field map
//! - [`Record::to_dict`] -- serialize, tagging the kind under `__class__`
//!
//! The [`TypeRegistry`] maps a `__class__` tag back to the factory that
//! rebuilds that kind. Registering records in a store is not this crate's
//! concern; see `hbnb-store`.

pub mod error;
pub mod kind;
pub mod record;
pub mod registry;

pub use error::{ModelError, ModelResult};
pub use kind::EntityKind;
pub use record::{composite_key, FieldMap, Record, CLASS_KEY, CREATED_AT_KEY, ID_KEY, UPDATED_AT_KEY};
pub use registry::{Factory, TypeRegistry};

pub use hbnb_types::{RecordId, Timestamp};
