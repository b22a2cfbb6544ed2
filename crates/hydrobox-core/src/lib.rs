//! Core types for hydrobox
//!
//! This crate holds what every other hydrobox crate shares:
//!
//! - [`Error`] and [`Result`]
//! - [`TimeSeries`] and [`TimeFrame`], indexed `f64` containers
//! - [`Aggregation`], numpy-style named reductions plus custom closures
//! - [`numeric`], ranking and percentile helpers
//! - [`validate`], the runtime argument validator used by the toolbox
//!
//! # Example
//!
//! ```rust
//! use hydrobox_core::{Aggregation, TimeSeries};
//!
//! let series = TimeSeries::from_values(vec![1.0, f64::NAN, 3.0]);
//! let agg: Aggregation = "nanmean".parse().unwrap();
//! assert_eq!(agg.apply(series.values()), 2.0);
//! ```

pub mod aggregate;
pub mod error;
pub mod numeric;
pub mod series;
pub mod validate;

pub use aggregate::{AggregateFn, Aggregation};
pub use error::{Error, Result};
pub use series::{Index, TimeFrame, TimeSeries};

/// Commonly used items
pub mod prelude {
    pub use crate::aggregate::Aggregation;
    pub use crate::error::{Error, Result};
    pub use crate::series::{Index, TimeFrame, TimeSeries};
    pub use crate::validate::{CallArgs, Kind, ParamSpec, Signature, Tool, ToolExt, TypeSpec, Value};
}
