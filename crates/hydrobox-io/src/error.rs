//! Error types for I/O

use thiserror::Error;

/// I/O errors
#[derive(Error, Debug)]
pub enum Error {
    /// Validation error from the core crate
    #[error(transparent)]
    Core(#[from] hydrobox_core::Error),

    /// Connection information is missing fields
    #[error("The connection is missing information: {}", missing.join(", "))]
    IncompleteDescriptor { missing: Vec<String> },

    /// A connection file could not be read
    #[error("Cannot read connection file {path}: {message}")]
    ConnectionFile { path: String, message: String },

    /// Malformed CSV content
    #[error("{source_name}, line {line}: {message}")]
    Parse {
        source_name: String,
        line: u64,
        message: String,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for I/O
pub type Result<T> = std::result::Result<T, Error>;
