//! Variograms, kriging and variogram grid search
//!
//! A compact geostatistics engine:
//!
//! - [`Variogram`]: experimental variogram with a fitted [`Model`]
//! - [`Kriging`]: ordinary, simple, universal and external drift kriging
//! - [`GridSearch`]: cross-validated search over variogram settings
//!
//! # Example
//!
//! ```rust
//! use hydrobox_geostat::{kriging, variogram, KrigingMode, Model, VariogramConfig};
//! use ndarray::Array2;
//!
//! let coords = Array2::from_shape_fn((30, 2), |(i, k)| ((i * (3 + k)) % 11) as f64 + 0.1 * i as f64);
//! let values: Vec<f64> = coords.rows().into_iter().map(|r| r[0] + 0.5 * r[1]).collect();
//!
//! let v = variogram(coords.view(), &values, VariogramConfig::default().with_model(Model::Exponential)).unwrap();
//! assert_eq!(v.bins().len(), 10);
//!
//! let field = kriging(&v, KrigingMode::Ordinary, 20).unwrap();
//! assert_eq!(field.field.shape(), &[20, 20]);
//! ```

pub mod binning;
pub mod distance;
pub mod error;
pub mod estimator;
pub mod gridsearch;
pub mod kriging;
pub mod model;
pub mod plot;
pub mod variogram;

pub use binning::{BinFunc, Maxlag};
pub use distance::DistFunc;
pub use error::{Error, Result};
pub use estimator::Estimator;
pub use gridsearch::{CandidateScore, GridSearch, GridSearchResult, ParamGrid, ParamSet};
pub use kriging::{kriging, plot_kriging, Kriging, KrigingField, KrigingMode};
pub use model::{Model, ModelParameters};
pub use plot::{plot_variogram, VariogramPlotType};
pub use variogram::{
    variogram, variogram_model, variogram_model_with, FitMethod, FitSigma, ModelCurve, Score, Variogram,
    VariogramConfig, VariogramDescription,
};
