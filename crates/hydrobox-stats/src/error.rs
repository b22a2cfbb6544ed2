//! Error types for statistics

use thiserror::Error;

/// Statistics errors
#[derive(Error, Debug)]
pub enum Error {
    /// Validation or numerical error from the core crate
    #[error(transparent)]
    Core(#[from] hydrobox_core::Error),

    /// Backend selection or rendering error
    #[error(transparent)]
    Plot(#[from] hydrobox_plotting::Error),
}

/// Result type alias for statistics
pub type Result<T> = std::result::Result<T, Error>;
