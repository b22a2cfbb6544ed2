//! Error types for plotting

use thiserror::Error;

use crate::backend::Backend;

/// Plotting errors
#[derive(Error, Debug)]
pub enum Error {
    /// Backend name outside the fixed set
    #[error("plotting_backend(...): backend {name} is not in the allowed set {allowed}")]
    UnknownBackend { name: String, allowed: String },

    /// Known backend that was not compiled into this build
    #[error("plotting_backend(...): backend {backend} is unavailable, available backends: {available}")]
    BackendUnavailable { backend: Backend, available: String },

    /// No backend at all was enabled at build time
    #[error("No plotting backend is available; enable one of the bitmap, svg or html features")]
    NoBackendEnabled,

    /// Logical plot name without any rendering routine
    #[error("No plotting routine for '{name}'")]
    NoPlotRoutine { name: String },

    /// Plot exists but not for the selected backend
    #[error("The '{plot}' plot has no implementation for the {backend} backend")]
    NoBackendRoutine { plot: String, backend: Backend },

    /// Failure inside a renderer
    #[error("Render error: {0}")]
    Render(String),

    /// Error from the core crate
    #[error(transparent)]
    Core(#[from] hydrobox_core::Error),

    /// IO error while saving a figure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for plotting
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Render error for a payload the routine cannot draw
    pub fn payload_mismatch(routine: &str, expected: &str) -> Self {
        Self::Render(format!("{routine} expects a {expected} payload"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_errors_are_distinct() {
        let unknown = Error::UnknownBackend {
            name: "gnuplot".to_string(),
            allowed: "bitmap, svg, html".to_string(),
        };
        let unavailable = Error::BackendUnavailable {
            backend: Backend::Html,
            available: "bitmap".to_string(),
        };
        assert!(unknown.to_string().contains("not in the allowed set"));
        assert!(unavailable.to_string().contains("backend html is unavailable"));
    }

    #[test]
    fn test_routine_errors() {
        let err = Error::NoBackendRoutine {
            plot: "kriging".to_string(),
            backend: Backend::Html,
        };
        assert_eq!(
            err.to_string(),
            "The 'kriging' plot has no implementation for the html backend"
        );
    }
}
