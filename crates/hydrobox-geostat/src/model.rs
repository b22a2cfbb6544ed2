//! Theoretical variogram models
//!
//! All models take the effective range `r`, the sill `c0` (excluding the
//! nugget) and the nugget `b`. Stable and Matérn also take a shape
//! parameter `s`. At `h = 0` every model returns the nugget.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use statrs::function::gamma::gamma;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Model {
    #[default]
    Spherical,
    Exponential,
    Gaussian,
    Cubic,
    Stable,
    Matern,
}

/// Fitted or manually chosen model parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    pub range: f64,
    pub sill: f64,
    pub nugget: f64,
    /// Shape of the stable model or smoothness of the Matérn model
    pub shape: Option<f64>,
}

impl ModelParameters {
    pub fn new(range: f64, sill: f64, nugget: f64) -> Self {
        Self {
            range,
            sill,
            nugget,
            shape: None,
        }
    }

    pub fn with_shape(mut self, shape: f64) -> Self {
        self.shape = Some(shape);
        self
    }
}

impl Model {
    pub const ALL: [Model; 6] = [
        Self::Spherical,
        Self::Exponential,
        Self::Gaussian,
        Self::Cubic,
        Self::Stable,
        Self::Matern,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Spherical => "spherical",
            Self::Exponential => "exponential",
            Self::Gaussian => "gaussian",
            Self::Cubic => "cubic",
            Self::Stable => "stable",
            Self::Matern => "matern",
        }
    }

    pub fn has_shape(self) -> bool {
        matches!(self, Self::Stable | Self::Matern)
    }

    /// Shape used when none is given
    pub fn default_shape(self) -> Option<f64> {
        match self {
            Self::Stable => Some(1.5),
            Self::Matern => Some(1.0),
            _ => None,
        }
    }

    /// Admissible shape interval
    pub(crate) fn shape_bounds(self) -> (f64, f64) {
        match self {
            Self::Matern => (0.2, 20.0),
            _ => (0.05, 2.0),
        }
    }

    pub(crate) fn check(self, params: &ModelParameters) -> Result<()> {
        let ModelParameters { range, sill, nugget, shape } = *params;
        if !(range.is_finite() && range > 0.0) {
            return Err(Error::invalid("variogram", "range", format!("{range} is not a positive number")));
        }
        if !(sill.is_finite() && sill >= 0.0) || !(nugget.is_finite() && nugget >= 0.0) {
            return Err(Error::invalid(
                "variogram",
                "sill",
                format!("sill {sill} and nugget {nugget} must be non-negative"),
            ));
        }
        if let Some(s) = shape.or(self.default_shape()).filter(|_| self.has_shape()) {
            if !(s.is_finite() && s > 0.0) {
                return Err(Error::invalid("variogram", "shape", format!("{s} is not a positive number")));
            }
        }
        Ok(())
    }

    /// Semi-variance at lag `h`
    pub fn evaluate(self, h: f64, params: &ModelParameters) -> f64 {
        let ModelParameters { range: r, sill: c0, nugget: b, .. } = *params;
        if h <= 0.0 {
            return b;
        }
        let shape = params.shape.or(self.default_shape()).unwrap_or(1.0);
        let structured = match self {
            Self::Spherical => {
                if h <= r {
                    let u = h / r;
                    1.5 * u - 0.5 * u.powi(3)
                } else {
                    1.0
                }
            }
            Self::Exponential => 1.0 - (-h / (r / 3.0)).exp(),
            Self::Gaussian => 1.0 - (-(h / (r / 2.0)).powi(2)).exp(),
            Self::Cubic => {
                if h <= r {
                    let u = h / r;
                    7.0 * u.powi(2) - 35.0 / 4.0 * u.powi(3) + 3.5 * u.powi(5) - 0.75 * u.powi(7)
                } else {
                    1.0
                }
            }
            Self::Stable => {
                let a = r / 3f64.powf(1.0 / shape);
                1.0 - (-(h / a).powf(shape)).exp()
            }
            Self::Matern => {
                let u = h * shape.sqrt() / (r / 2.0);
                if 2.0 * u > 700.0 {
                    1.0
                } else {
                    1.0 - 2.0 / gamma(shape) * u.powf(shape) * bessel_k(shape, 2.0 * u)
                }
            }
        };
        b + c0 * structured
    }

    /// Model evaluated at every lag
    pub fn curve(self, lags: &[f64], params: &ModelParameters) -> Vec<f64> {
        lags.iter().map(|&h| self.evaluate(h, params)).collect()
    }
}

/// Modified Bessel function of the second kind, `K_nu(z)` for `z > 0`.
///
/// Trapezoidal rule on `int_0^inf exp(-z cosh t) cosh(nu t) dt`; the
/// integrand is smooth and decays double exponentially.
fn bessel_k(nu: f64, z: f64) -> f64 {
    const STEP: f64 = 0.01;
    const T_MAX: f64 = 60.0;
    let integrand = |t: f64| (-z * t.cosh() + nu * t).exp() * 0.5 * (1.0 + (-2.0 * nu * t).exp());
    let mut sum = 0.5 * integrand(0.0);
    let mut t = STEP;
    while t < T_MAX {
        let term = integrand(t);
        sum += term;
        if t > 1.0 && term < 1e-17 * sum {
            break;
        }
        t += STEP;
    }
    sum * STEP
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Model {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| Error::invalid("variogram", "model", format!("unknown model '{s}'")))
    }
}
