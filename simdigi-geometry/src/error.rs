//! Geometry error types.

use simdigi_core::GeometryId;
use thiserror::Error;

/// Result type for geometry operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Geometry error types.
#[derive(Error, Debug)]
pub enum Error {
    /// Bin boundaries or bin counts are unusable.
    #[error("invalid binning: {0}")]
    InvalidBinning(String),

    /// Module parameters are out of range.
    #[error("invalid module: {0}")]
    InvalidModule(String),

    /// Two surfaces share the same geometry id.
    #[error("duplicate surface {0}")]
    DuplicateSurface(GeometryId),

    /// Malformed detector description.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
