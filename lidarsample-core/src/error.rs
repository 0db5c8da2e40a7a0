//! Error types for lidarsample

use thiserror::Error;

use crate::crs::Crs;

/// Main error type for lidarsample operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A call-time parameter is structurally invalid (zero voxel size, zero stride, ...)
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The input cloud contains values the engine refuses to index
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("CRS mismatch: expected {expected}, found {found}")]
    CrsMismatch { expected: Crs, found: Crs },
}

/// Result type alias for lidarsample operations
pub type Result<T> = std::result::Result<T, Error>;
