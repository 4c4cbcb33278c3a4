//! Error types for I/O operations

use thiserror::Error;

/// Errors that can occur during I/O operations
#[derive(Error, Debug)]
pub enum IoError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Parse error: {message}")]
    ParseError { message: String },

    #[error("Image error: {message}")]
    ImageError { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<IoError> for fitfield_core::Error {
    fn from(err: IoError) -> Self {
        match err {
            IoError::Io(e) => fitfield_core::Error::Io(e),
            IoError::FileNotFound { path } => fitfield_core::Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("file not found: {path}"),
            )),
            IoError::ParseError { message } => fitfield_core::Error::InvalidData(message),
            IoError::ImageError { message } => fitfield_core::Error::Image(message),
        }
    }
}

impl From<image::ImageError> for IoError {
    fn from(err: image::ImageError) -> Self {
        IoError::ImageError {
            message: err.to_string(),
        }
    }
}
