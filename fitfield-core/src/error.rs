//! Error types for fitfield

use thiserror::Error;

/// Main error type for fitfield operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    #[error("Unknown fit type: \"{0}\"")]
    UnknownFitType(String),

    #[error("Anchor point index {index} is out of range (point set has {len} points)")]
    AnchorOutOfRange { index: usize, len: usize },

    #[error("Point index {index} is out of range (point set has {len} points)")]
    PointOutOfRange { index: usize, len: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Image error: {0}")]
    Image(String),
}

/// Result type alias for fitfield operations
pub type Result<T> = std::result::Result<T, Error>;
