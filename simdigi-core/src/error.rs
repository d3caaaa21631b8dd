//! Error types for simdigi-core.

use thiserror::Error;

/// Result type alias for simdigi operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for simdigi operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid algorithm configuration.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Event store access failed.
    #[error("event store error: {0}")]
    Store(#[from] StoreError),
}

/// Construction-time configuration errors.
///
/// These are fatal: an algorithm that fails validation is never built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Input collection name is empty.
    #[error("missing input collection: {0}")]
    MissingInput(&'static str),

    /// Output collection name is empty.
    #[error("missing output collection: {0}")]
    MissingOutput(&'static str),

    /// A required collaborator was not provided.
    #[error("missing {0}")]
    MissingCollaborator(&'static str),

    /// A numeric parameter is out of range.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Event store errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Collection names must not be empty.
    #[error("collection name is empty")]
    EmptyName,

    /// No collection with this name exists.
    #[error("missing collection '{0}'")]
    Missing(String),

    /// A collection with this name was already added.
    #[error("collection '{0}' already exists")]
    Duplicate(String),

    /// The collection exists but holds a different type.
    #[error("collection '{name}' is not of type {expected}")]
    TypeMismatch {
        /// Collection name.
        name: String,
        /// Requested type name.
        expected: &'static str,
    },
}
