//! Error types for boundary lookups and the dataset codec.

use thiserror::Error;

/// Country boundaries errors.
#[derive(Error, Debug)]
pub enum BoundariesError {
    /// Caller passed a non-finite coordinate, an out-of-range latitude or an inverted bbox.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Raster dimensions do not describe a whole grid.
    #[error("Invalid raster: {0}")]
    InvalidRaster(String),

    /// Serialized data is corrupt, truncated or of an unsupported version.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Index does not fit the fixed-width fields of the serialization format.
    #[error("Encode error: {0}")]
    Encode(String),

    /// IO error from the underlying stream.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for boundary operations.
pub type Result<T> = std::result::Result<T, BoundariesError>;
