//! Hydrological and geostatistical toolbox
//!
//! The toolbox is split into workspace crates that are re-exported here:
//!
//! - [`discharge`]: flow duration curves, monthly regime, Richards-Baker index
//! - [`signal`]: signal simplification
//! - [`preprocessing`]: aggregate to a frequency, cut, merge
//! - [`stats`]: moving windows and linear regression
//! - [`sample`]: random choice, gaussian random fields, gamma series
//! - [`geostat`]: variograms, kriging and variogram grid search
//! - [`io`]: SQL connection descriptor and bundled datasets
//! - [`plotting`]: the plotting-backend dispatcher
//!
//! On top of them, [`toolbox`] exposes the analyses as named tools taking
//! dynamically typed, validated arguments, [`config`] reads settings from
//! TOML and [`logging`] installs a `tracing` subscriber.
//!
//! # Example
//!
//! ```rust
//! use hydrobox::discharge::{regime, RegimeOptions};
//! use hydrobox::io::{load_dataset, Dataset};
//!
//! let q = load_dataset(Dataset::Discharge).unwrap();
//! let table = regime(&q, &RegimeOptions::default()).unwrap();
//! assert_eq!(table.months.len(), 12);
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod toolbox;

pub use config::HydroboxConfig;
pub use error::{Error, Result};
pub use toolbox::{Output, Toolbox};

pub use hydrobox_core::{numeric, validate, Aggregation, Index, TimeFrame, TimeSeries};
pub use hydrobox_discharge as discharge;
pub use hydrobox_geostat as geostat;
pub use hydrobox_io as io;
pub use hydrobox_plotting as plotting;
pub use hydrobox_preprocessing as preprocessing;
pub use hydrobox_sample as sample;
pub use hydrobox_signal as signal;
pub use hydrobox_stats as stats;

#[cfg(feature = "polars")]
pub use hydrobox_polars as dataframe;

pub use hydrobox_plotting::{plotting_backend, Backend};

/// Commonly used items
pub mod prelude {
    pub use crate::toolbox::{Output, Toolbox};
    pub use crate::{Error, HydroboxConfig, Result};
    pub use hydrobox_core::prelude::*;
    pub use hydrobox_plotting::{plotting_backend, Backend, PlotContext, PlotOptions};
}
