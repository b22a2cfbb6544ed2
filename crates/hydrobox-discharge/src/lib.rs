//! Discharge analysis
//!
//! - [`flow_duration_curve`] / [`flow_duration_curves`]: Weibull (non-)exceedance probabilities
//! - [`regime`]: monthly aggregate with optional percentiles and normalisation
//! - [`richards_baker`]: flashiness index
//!
//! Each computation has a `plot_*` counterpart that renders through a
//! [`hydrobox_plotting::PlotContext`].
//!
//! # Example
//!
//! ```rust
//! use hydrobox_discharge::{flow_duration_curve, richards_baker};
//!
//! let q = [2.0, 8.0, 4.0, 1.0];
//! let fdc = flow_duration_curve(&q, true).unwrap();
//! assert_eq!(fdc.probability, vec![0.2, 0.4, 0.6, 0.8]);
//! assert!(richards_baker(&q).unwrap() > 0.0);
//! ```

pub mod error;
pub mod fdc;
pub mod indices;
pub mod regime;

pub use error::{Error, Result};
pub use fdc::{
    flow_duration_curve, flow_duration_curves, plot_flow_duration_curve, plot_flow_duration_curves,
    FlowDurationCurve,
};
pub use indices::richards_baker;
pub use regime::{plot_regime, regime, Percentiles, RegimeOptions, RegimeTable};
