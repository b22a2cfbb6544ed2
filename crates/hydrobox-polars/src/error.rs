//! Error types for hydrobox-polars

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error(transparent)]
    Core(#[from] hydrobox_core::Error),

    #[error(transparent)]
    Discharge(#[from] hydrobox_discharge::Error),

    #[error("Invalid column: {0}")]
    InvalidColumn(String),

    #[error("Type mismatch: column {column} is {got}, expected {expected}")]
    TypeMismatch {
        column: String,
        expected: String,
        got: String,
    },
}

pub type Result<T> = std::result::Result<T, Error>;
