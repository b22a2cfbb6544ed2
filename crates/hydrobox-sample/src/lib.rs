//! Random samples and fields
//!
//! - [`choice`]: random coordinates (and their values) from an n-dimensional array
//! - [`gaussian_field`]: spectrally filtered 2D Gaussian random field
//! - [`gamma_series`]: seeded gamma distributed values, handy as synthetic discharge
//!
//! Every generator takes an optional seed; the same seed reproduces the
//! same output.

pub mod field;
pub mod random;

pub use field::{gaussian_field, gaussian_field_with, FieldOptions, Spectrum};
pub use random::{choice, gamma_series, Sample};
