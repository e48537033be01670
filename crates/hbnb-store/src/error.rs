use hbnb_model::ModelError;

/// Errors from object store and persistence operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An operation received an argument of the wrong shape.
    #[error("invalid call: {0}")]
    InvalidCall(String),

    /// A required reference is absent or unusable (e.g. a blank identity).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Malformed record or container content.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// A `__class__` tag matched no registered type.
    #[error("unknown type: {0}")]
    UnknownType(String),

    /// The persistence file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record lock was poisoned by a panicking writer.
    #[error("lock poisoned: {0}")]
    Poisoned(String),
}

impl From<ModelError> for StoreError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::InvalidCall(reason) => Self::InvalidCall(reason),
            ModelError::UnknownType(tag) => Self::UnknownType(tag),
            ModelError::ReservedField(_) => Self::InvalidArgument(err.to_string()),
            other => Self::Deserialization(other.to_string()),
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
