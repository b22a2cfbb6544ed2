//! Error types for geostatistics

use thiserror::Error;

/// Geostatistics errors
#[derive(Error, Debug)]
pub enum Error {
    /// Validation or numerical error from the core crate
    #[error(transparent)]
    Core(#[from] hydrobox_core::Error),

    /// Backend selection or rendering error
    #[error(transparent)]
    Plot(#[from] hydrobox_plotting::Error),

    /// Kriging equation system without a unique solution
    #[error("Singular kriging system: {0}")]
    Singular(String),

    /// Model fit did not produce parameters
    #[error("Variogram fit failed: {0}")]
    Fit(String),
}

/// Result type alias for geostatistics
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn invalid(function: &str, argument: &str, reason: impl std::fmt::Display) -> Self {
        hydrobox_core::Error::InvalidParameter(format!("{function}(...): arg {argument}: {reason}")).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_names_function_and_argument() {
        let err = Error::invalid("variogram", "n_lags", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "Invalid parameter: variogram(...): arg n_lags: must be at least 1"
        );
    }

    #[test]
    fn test_singular_display() {
        let err = Error::Singular("duplicated coordinates".to_string());
        assert!(err.to_string().starts_with("Singular kriging system"));
    }
}
