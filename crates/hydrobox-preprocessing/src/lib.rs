//! Time series preprocessing
//!
//! - [`aggregate`]: reduce a datetime-indexed series to a coarser [`Frequency`]
//! - [`cut`]: truncate to a period
//! - [`merge`]: outer-join several series into a [`TimeFrame`](hydrobox_core::TimeFrame)
//!
//! The `*_frame` variants apply the same operation to every column of a frame.
//!
//! # Example
//!
//! ```rust
//! use chrono::{Duration, NaiveDate};
//! use hydrobox_core::{Aggregation, TimeSeries};
//! use hydrobox_preprocessing::{aggregate, cut};
//!
//! let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let index = (0..60).map(|d| start + Duration::days(d)).collect();
//! let x = TimeSeries::from_datetimes(index, vec![1.0; 60]).unwrap();
//!
//! let monthly = aggregate(&x, "1M", &Aggregation::Sum).unwrap();
//! assert_eq!(monthly.values(), &[31.0, 29.0]);
//!
//! let january = cut(&x, None, Some("20200131".into())).unwrap();
//! assert_eq!(january.len(), 31);
//! ```

pub mod frequency;
pub mod merge;
pub mod resample;
pub mod truncate;

pub use frequency::{Frequency, FrequencyUnit};
pub use merge::merge;
pub use resample::{aggregate, aggregate_frame};
pub use truncate::{cut, cut_frame, Bound};
