//! Polars integration for hydrobox
//!
//! [`HydroFrameExt`] runs discharge analysis and preprocessing on the
//! columns of a Polars DataFrame and returns the results as DataFrames.
//!
//! # Example
//!
//! ```rust
//! use polars::prelude::*;
//! use hydrobox_polars::HydroFrameExt;
//!
//! let df = df!["q" => [2.0, 8.0, 4.0, 1.0]].unwrap();
//! let fdc = df.flow_duration_curves(&["q"], true).unwrap();
//! assert_eq!(fdc.shape(), (4, 2));
//!
//! let rb = df.richards_baker(&["q"]).unwrap();
//! assert!(rb.column("q_richards_baker").unwrap().f64().unwrap().get(0).unwrap() > 0.0);
//! ```

mod convert;
mod error;
mod traits;

pub use convert::{timeframe_to_dataframe, timeseries_to_dataframe};
pub use error::{Error, Result};
pub use traits::HydroFrameExt;
