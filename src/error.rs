//! Error type of the top-level toolbox

use thiserror::Error;

/// Any error raised by a hydrobox crate, plus toolbox and configuration errors
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] hydrobox_core::Error),

    #[error(transparent)]
    Plot(#[from] hydrobox_plotting::Error),

    #[error(transparent)]
    Discharge(#[from] hydrobox_discharge::Error),

    #[error(transparent)]
    Stats(#[from] hydrobox_stats::Error),

    #[error(transparent)]
    Geostat(#[from] hydrobox_geostat::Error),

    #[error(transparent)]
    Io(#[from] hydrobox_io::Error),

    /// A configuration file could not be read or parsed
    #[error("Invalid configuration {source_name}: {message}")]
    Config { source_name: String, message: String },

    /// No tool of that name is registered
    #[error("No tool named '{0}'")]
    UnknownTool(String),
}

pub type Result<T> = std::result::Result<T, Error>;
