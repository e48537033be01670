use hbnb_types::{Timestamp, TypeError};

use crate::kind::EntityKind;

/// Errors from building, reconstructing, or mutating records.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ModelError {
    /// The operation was invoked with an unusable argument shape.
    #[error("invalid call: {0}")]
    InvalidCall(String),

    /// A field required for reconstruction is absent.
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// A field holds a JSON value of the wrong type (e.g. `null` for `id`).
    #[error("field `{field}` must be a {expected}, got {found}")]
    InvalidFieldType {
        field: String,
        expected: &'static str,
        found: &'static str,
    },

    /// A timestamp field is a string but not a well-formed timestamp.
    #[error("field `{field}`: {source}")]
    InvalidTimestamp {
        field: &'static str,
        #[source]
        source: TypeError,
    },

    /// Identity, timestamps and the class tag cannot be assigned as fields.
    #[error("field `{0}` is reserved")]
    ReservedField(String),

    /// The `__class__` tag names a different kind than the one requested.
    #[error("class tag {found:?} does not match {expected}")]
    ClassMismatch { expected: EntityKind, found: String },

    /// No factory is registered for the class tag.
    #[error("unknown type: {0}")]
    UnknownType(String),

    #[error("updated_at {updated_at} precedes created_at {created_at}")]
    TimestampOrder {
        created_at: Timestamp,
        updated_at: Timestamp,
    },
}

/// Result alias for model operations.
pub type ModelResult<T> = Result<T, ModelError>;
