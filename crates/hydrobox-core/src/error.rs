//! Error types for hydrobox
//!
//! Provides the validation error type shared by all hydrobox crates.

use thiserror::Error;

/// Core error type for hydrobox operations
#[derive(Error, Debug)]
pub enum Error {
    /// An argument had the wrong runtime type
    #[error("{function}(...): arg {argument}: type is {actual}, must be {expected}")]
    TypeMismatch {
        function: String,
        argument: String,
        actual: String,
        expected: String,
    },

    /// A type specification names an argument the function does not declare
    #[error("{function}(...): arg {argument} is not a parameter of this function")]
    UnknownArgument { function: String, argument: String },

    /// Invalid parameter provided to a function
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Insufficient data for the requested operation
    #[error("Insufficient data: expected at least {expected} samples, got {actual}")]
    InsufficientData { expected: usize, actual: usize },

    /// Numerical computation error
    #[error("Computation error: {0}")]
    Computation(String),

    /// Input shape or feature the operation does not support
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// IO error (for file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an error for a series that is not indexed by date-time
    pub fn not_datetime_indexed(function: &str) -> Self {
        Self::InvalidInput(format!(
            "{function}(...): data has to be indexed by a datetime index"
        ))
    }

    /// Create an error for size mismatch
    pub fn size_mismatch(expected: usize, actual: usize, context: &str) -> Self {
        Self::InvalidInput(format!(
            "Size mismatch in {context}: expected {expected}, got {actual}"
        ))
    }

    /// Create an error for NaN/Inf values
    pub fn non_finite(context: &str) -> Self {
        Self::Computation(format!("{context} contains NaN or infinite values"))
    }
}
