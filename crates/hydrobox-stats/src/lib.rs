//! Rolling statistics and linear regression
//!
//! # Example
//!
//! ```rust
//! use hydrobox_core::{Aggregation, TimeSeries};
//! use hydrobox_stats::{linregress, moving_window, WindowType};
//!
//! let x = TimeSeries::from_values(vec![1.0, 2.0, 3.0, 4.0]);
//! let smooth = moving_window(&x, 2, Some(WindowType::Boxcar), &Aggregation::NanMean).unwrap();
//! assert_eq!(&smooth.values()[1..], &[1.5, 2.5, 3.5]);
//!
//! let reg = linregress(&[1.0, 2.0, 3.0], &[2.0, 4.0, 6.0]).unwrap();
//! assert!((reg.slope - 2.0).abs() < 1e-12);
//! ```

pub mod error;
pub mod regression;
pub mod rolling;

pub use error::{Error, Result};
pub use regression::{
    linear_regression, linear_regression_series, linregress, plot_regression, plot_regression_grid,
    LinearRegression, Regression, RegressionGrid,
};
pub use rolling::{moving_window, moving_window_frame, WindowType};
