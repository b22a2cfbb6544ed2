//! Gaussian random fields by spectral filtering
//!
//! White noise is transformed to the frequency domain, weighted by the
//! square root of a power spectrum `P(k)` and transformed back. With the
//! default power law `P(k) = k^alpha` and a negative `alpha`, low
//! frequencies dominate and the field becomes spatially correlated.

use std::fmt;
use std::sync::Arc;

use ndarray::Array2;
use num_complex::Complex;
use rand_distr::{Distribution, StandardNormal};
use rustfft::{FftDirection, FftPlanner};
use tracing::{debug, instrument};

use hydrobox_core::numeric::min_max;
use hydrobox_core::{Error, Result};

use crate::random::seeded_rng;

/// Power spectrum as a function of the wavenumber
#[derive(Clone)]
pub enum Spectrum {
    /// `k^alpha`
    PowerLaw(f64),
    Custom(Arc<dyn Fn(f64) -> f64 + Send + Sync>),
}

impl Spectrum {
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(f))
    }

    fn power(&self, k: f64) -> f64 {
        match self {
            Self::PowerLaw(alpha) => k.powf(*alpha),
            Self::Custom(f) => f(k),
        }
    }
}

impl fmt::Debug for Spectrum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PowerLaw(alpha) => f.debug_tuple("PowerLaw").field(alpha).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Options for [`gaussian_field`]
#[derive(Debug, Clone)]
pub struct FieldOptions {
    pub spectrum: Spectrum,
    pub size: (usize, usize),
    pub seed: Option<u64>,
    /// Rescale to `(min, max)`; `None` keeps the raw field
    pub feature_range: Option<(f64, f64)>,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            spectrum: Spectrum::PowerLaw(-3.0),
            size: (100, 100),
            seed: None,
            feature_range: Some((0.0, 1.0)),
        }
    }
}

impl FieldOptions {
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.spectrum = Spectrum::PowerLaw(alpha);
        self
    }

    pub fn with_spectrum(mut self, spectrum: Spectrum) -> Self {
        self.spectrum = spectrum;
        self
    }

    pub fn with_size(mut self, nx: usize, ny: usize) -> Self {
        self.size = (nx, ny);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_feature_range(mut self, range: Option<(f64, f64)>) -> Self {
        self.feature_range = range;
        self
    }
}

/// Signed wavenumber of FFT bin `i` out of `n`
fn wavenumber(i: usize, n: usize) -> f64 {
    if i <= n / 2 {
        i as f64
    } else {
        i as f64 - n as f64
    }
}

/// In-place 2D FFT of a row-major `nx` × `ny` buffer
fn fft2(buffer: &mut [Complex<f64>], nx: usize, ny: usize, direction: FftDirection) {
    let mut planner = FftPlanner::new();
    // rows are contiguous; rustfft processes consecutive chunks of its length
    planner.plan_fft(ny, direction).process(buffer);

    let mut columns: Vec<Complex<f64>> = (0..ny)
        .flat_map(|j| (0..nx).map(move |i| (i, j)))
        .map(|(i, j)| buffer[i * ny + j])
        .collect();
    planner.plan_fft(nx, direction).process(&mut columns);
    for j in 0..ny {
        for i in 0..nx {
            buffer[i * ny + j] = columns[j * nx + i];
        }
    }
}

/// Gaussian random field with standard normal noise
pub fn gaussian_field(options: &FieldOptions) -> Result<Array2<f64>> {
    gaussian_field_with(options, StandardNormal)
}

/// Gaussian random field filtering noise drawn from `dist`
#[instrument(skip(options, dist), fields(size = ?options.size, spectrum = ?options.spectrum))]
pub fn gaussian_field_with<D>(options: &FieldOptions, dist: D) -> Result<Array2<f64>>
where
    D: Distribution<f64>,
{
    let (nx, ny) = options.size;
    if nx == 0 || ny == 0 {
        return Err(Error::InvalidParameter(format!(
            "gaussian_field(...): arg size: both axes must be positive, got ({nx}, {ny})"
        )));
    }
    if let Some((lo, hi)) = options.feature_range {
        if lo.is_nan() || hi.is_nan() || lo >= hi {
            return Err(Error::InvalidParameter(format!(
                "gaussian_field(...): arg feature_range: ({lo}, {hi}) is not increasing"
            )));
        }
    }

    let mut rng = seeded_rng(options.seed);
    let mut buffer: Vec<Complex<f64>> = (0..nx * ny)
        .map(|_| Complex::new(dist.sample(&mut rng), 0.0))
        .collect();
    fft2(&mut buffer, nx, ny, FftDirection::Forward);

    for i in 0..nx {
        let kx = wavenumber(i, nx);
        for j in 0..ny {
            let ky = wavenumber(j, ny);
            let amplitude = if i == 0 && j == 0 {
                0.0
            } else {
                options.spectrum.power(kx.hypot(ky)).sqrt()
            };
            buffer[i * ny + j] *= amplitude;
        }
    }

    fft2(&mut buffer, nx, ny, FftDirection::Inverse);
    let norm = (nx * ny) as f64;
    let mut field = Array2::from_shape_vec((nx, ny), buffer.iter().map(|c| c.re / norm).collect())
        .map_err(|e| Error::Computation(format!("gaussian_field(...): {e}")))?;

    if field.iter().any(|v| !v.is_finite()) {
        return Err(Error::non_finite("gaussian_field(...): power spectrum"));
    }

    if let Some((lo, hi)) = options.feature_range {
        if let Some((min, max)) = min_max(field.as_slice().unwrap_or(&[])) {
            let span = max - min;
            field.mapv_inplace(|v| {
                if span > 0.0 {
                    lo + (v - min) / span * (hi - lo)
                } else {
                    lo
                }
            });
        }
    }
    debug!("random field generated");
    Ok(field)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_wavenumbers() {
        let k: Vec<f64> = (0..5).map(|i| wavenumber(i, 5)).collect();
        assert_eq!(k, vec![0.0, 1.0, 2.0, -2.0, -1.0]);
        let k: Vec<f64> = (0..4).map(|i| wavenumber(i, 4)).collect();
        assert_eq!(k, vec![0.0, 1.0, 2.0, -1.0]);
    }

    #[test]
    fn test_fft2_roundtrip() {
        let (nx, ny) = (3, 4);
        let original: Vec<Complex<f64>> = (0..nx * ny).map(|i| Complex::new(i as f64, 0.0)).collect();
        let mut buffer = original.clone();
        fft2(&mut buffer, nx, ny, FftDirection::Forward);
        // DC term is the sum
        assert_relative_eq!(buffer[0].re, 66.0, epsilon = 1e-9);
        fft2(&mut buffer, nx, ny, FftDirection::Inverse);
        for (a, b) in buffer.iter().zip(&original) {
            assert_relative_eq!(a.re / 12.0, b.re, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_scaled_to_feature_range() {
        let opts = FieldOptions::default()
            .with_size(32, 24)
            .with_seed(42)
            .with_feature_range(Some((-1.0, 2.0)));
        let field = gaussian_field(&opts).unwrap();
        assert_eq!(field.dim(), (32, 24));
        let (min, max) = min_max(field.as_slice().unwrap()).unwrap();
        assert_relative_eq!(min, -1.0, epsilon = 1e-12);
        assert_relative_eq!(max, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_raw_field_has_zero_mean() {
        let opts = FieldOptions::default()
            .with_size(16, 16)
            .with_seed(1)
            .with_feature_range(None);
        let field = gaussian_field(&opts).unwrap();
        // the zero-frequency component is removed
        assert_relative_eq!(field.mean().unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_seed_and_custom_spectrum() {
        let opts = FieldOptions::default()
            .with_size(8, 8)
            .with_seed(5)
            .with_spectrum(Spectrum::custom(|k| (-k).exp()));
        assert_eq!(gaussian_field(&opts).unwrap(), gaussian_field(&opts).unwrap());
        assert!(gaussian_field(&opts.clone().with_size(0, 8)).is_err());
        assert!(gaussian_field(&opts.with_feature_range(Some((1.0, 1.0)))).is_err());
    }
}
