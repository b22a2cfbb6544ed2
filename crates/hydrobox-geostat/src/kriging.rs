//! Kriging on the fitted variogram model
//!
//! Ordinary, universal and external drift kriging solve
//!
//! ```text
//! | Γ   F | |λ|   |γ0|
//! | Fᵀ  0 | |μ| = |f0|
//! ```
//!
//! where `Γ` holds the model semi-variances between observations (zero on
//! the diagonal) and the columns of `F` are the drift functions: a
//! constant, the coordinates (universal) or an external variable. The
//! estimate is `λᵀz` with variance `λᵀγ0 + μᵀf0`. Simple kriging uses the
//! covariance `C(h) = sill + nugget - γ(h)` around a known mean instead.
//!
//! The system is factorised once per [`Kriging`]; every prediction is one
//! back substitution.

use nalgebra::linalg::LU;
use nalgebra::{DMatrix, DVector, Dynamic};
use ndarray::{Array2, ArrayD, ArrayView1, ArrayView2, Axis, Ix2, IxDyn};
use serde::Serialize;
use tracing::{debug, instrument};

use hydrobox_core::numeric::{linspace, min_max};
use hydrobox_core::Error as CoreError;
use hydrobox_plotting::{FieldChart, Figure, PlotContext, PlotKind, PlotOptions};

use crate::distance::DistFunc;
use crate::model::{Model, ModelParameters};
use crate::variogram::Variogram;
use crate::{Error, Result};

const MAX_GRID_POINTS: usize = 10_000_000;

#[derive(Debug, Clone, PartialEq, Default)]
pub enum KrigingMode {
    /// Unknown constant mean
    #[default]
    Ordinary,
    /// Known mean
    Simple { mean: f64 },
    /// Mean linear in the coordinates
    Universal,
    /// Mean linear in an external variable, given at the observations and
    /// at every prediction target in target order
    ExternalDrift {
        at_observations: Vec<f64>,
        at_targets: Vec<f64>,
    },
}

impl KrigingMode {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ordinary => "ordinary",
            Self::Simple { .. } => "simple",
            Self::Universal => "universal",
            Self::ExternalDrift { .. } => "external_drift",
        }
    }

    fn n_drift(&self, ndim: usize) -> usize {
        match self {
            Self::Simple { .. } => 0,
            Self::Ordinary => 1,
            Self::Universal => 1 + ndim,
            Self::ExternalDrift { .. } => 2,
        }
    }
}

/// Kriging estimate and variance on a structured grid
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KrigingField {
    /// Grid coordinates along every axis
    pub axes: Vec<Vec<f64>>,
    pub field: ArrayD<f64>,
    /// Kriging variance
    pub sigma: ArrayD<f64>,
}

impl KrigingField {
    pub fn ndim(&self) -> usize {
        self.axes.len()
    }
}

/// Factorised kriging system for one set of observations
#[derive(Debug, Clone)]
pub struct Kriging {
    coordinates: Array2<f64>,
    values: Vec<f64>,
    model: Model,
    parameters: ModelParameters,
    dist_func: DistFunc,
    mode: KrigingMode,
    lu: LU<f64, Dynamic, Dynamic>,
}

impl Kriging {
    /// Kriging with the observations and fitted model of `variogram`
    pub fn new(variogram: &Variogram, mode: KrigingMode) -> Result<Self> {
        Self::from_parts(
            variogram.coordinates().clone(),
            variogram.values().to_vec(),
            variogram.model(),
            *variogram.parameters(),
            variogram.config().dist_func,
            mode,
        )
    }

    pub(crate) fn from_parts(
        coordinates: Array2<f64>,
        values: Vec<f64>,
        model: Model,
        parameters: ModelParameters,
        dist_func: DistFunc,
        mode: KrigingMode,
    ) -> Result<Self> {
        let n = values.len();
        if let KrigingMode::ExternalDrift { at_observations, .. } = &mode {
            if at_observations.len() != n {
                return Err(CoreError::size_mismatch(n, at_observations.len(), "kriging(...): external drift").into());
            }
        }
        let m = mode.n_drift(coordinates.ncols());
        let mut a = DMatrix::<f64>::zeros(n + m, n + m);
        for i in 0..n {
            for j in (i + 1)..n {
                let h = dist_func.between(coordinates.row(i), coordinates.row(j));
                let v = match mode {
                    KrigingMode::Simple { .. } => covariance(model, &parameters, h),
                    _ => semivariance(model, &parameters, h),
                };
                a[(i, j)] = v;
                a[(j, i)] = v;
            }
            if let KrigingMode::Simple { .. } = mode {
                a[(i, i)] = covariance(model, &parameters, 0.0);
            }
            let drift_value = match &mode {
                KrigingMode::ExternalDrift { at_observations, .. } => Some(at_observations[i]),
                _ => None,
            };
            for (k, f) in drift(&mode, coordinates.row(i), drift_value).into_iter().enumerate() {
                a[(i, n + k)] = f;
                a[(n + k, i)] = f;
            }
        }

        let lu = a.lu();
        if !lu.is_invertible() {
            return Err(Error::Singular(format!(
                "{} kriging of {n} observations; check for duplicated coordinates",
                mode.name()
            )));
        }
        debug!(n, drift_terms = m, mode = mode.name(), "kriging system factorised");
        Ok(Self {
            coordinates,
            values,
            model,
            parameters,
            dist_func,
            mode,
            lu,
        })
    }

    pub fn mode(&self) -> &KrigingMode {
        &self.mode
    }

    fn solve(&self, point: ArrayView1<f64>, drift_value: Option<f64>) -> Result<(f64, f64)> {
        let n = self.values.len();
        let simple_mean = match self.mode {
            KrigingMode::Simple { mean } => Some(mean),
            _ => None,
        };
        let f0 = drift(&self.mode, point, drift_value);
        let mut b = DVector::<f64>::zeros(n + f0.len());
        for i in 0..n {
            let h = self.dist_func.between(self.coordinates.row(i), point);
            b[i] = if simple_mean.is_some() {
                covariance(self.model, &self.parameters, h)
            } else {
                semivariance(self.model, &self.parameters, h)
            };
        }
        for (k, f) in f0.iter().enumerate() {
            b[n + k] = *f;
        }

        let x = self
            .lu
            .solve(&b)
            .ok_or_else(|| Error::Singular(format!("{} kriging: system cannot be solved", self.mode.name())))?;
        let weights = x.rows(0, n);
        let variance = match simple_mean {
            Some(_) => covariance(self.model, &self.parameters, 0.0) - weights.dot(&b.rows(0, n)),
            None => x.dot(&b),
        };
        let estimate = match simple_mean {
            Some(mean) => mean + weights.iter().zip(&self.values).map(|(w, z)| w * (z - mean)).sum::<f64>(),
            None => weights.iter().zip(&self.values).map(|(w, z)| w * z).sum(),
        };
        if !estimate.is_finite() || !variance.is_finite() {
            return Err(Error::Singular(format!("{} kriging: non-finite solution", self.mode.name())));
        }
        Ok((estimate, variance.max(0.0)))
    }

    /// Estimate and variance at every row of `points`
    pub fn predict(&self, points: ArrayView2<'_, f64>) -> Result<(Vec<f64>, Vec<f64>)> {
        if points.ncols() != self.coordinates.ncols() {
            return Err(CoreError::size_mismatch(self.coordinates.ncols(), points.ncols(), "kriging(...): point dimension").into());
        }
        let targets = match &self.mode {
            KrigingMode::ExternalDrift { at_targets, .. } => {
                if at_targets.len() != points.nrows() {
                    return Err(CoreError::size_mismatch(points.nrows(), at_targets.len(), "kriging(...): external drift targets").into());
                }
                Some(at_targets.as_slice())
            }
            _ => None,
        };
        let mut estimates = Vec::with_capacity(points.nrows());
        let mut variances = Vec::with_capacity(points.nrows());
        for (i, row) in points.rows().into_iter().enumerate() {
            let (e, v) = self.solve(row, targets.map(|t| t[i]))?;
            estimates.push(e);
            variances.push(v);
        }
        Ok((estimates, variances))
    }

    /// Estimate on `resolution` points per axis over the bounding box of
    /// the observations; axes vary slowest first
    #[instrument(skip(self), fields(mode = self.mode.name()))]
    pub fn grid(&self, resolution: usize) -> Result<KrigingField> {
        if resolution < 2 {
            return Err(Error::invalid("kriging", "resolution", "must be at least 2"));
        }
        let ndim = self.coordinates.ncols();
        let total = u32::try_from(ndim)
            .ok()
            .and_then(|d| resolution.checked_pow(d))
            .filter(|&t| t <= MAX_GRID_POINTS)
            .ok_or_else(|| Error::invalid("kriging", "resolution", format!("{resolution}^{ndim} grid points are too many")))?;

        let axes: Vec<Vec<f64>> = self
            .coordinates
            .axis_iter(Axis(1))
            .map(|column| {
                let column: Vec<f64> = column.to_vec();
                let (lo, hi) = min_max(&column).unwrap_or((0.0, 0.0));
                linspace(lo, hi, resolution)
            })
            .collect();
        let points = Array2::from_shape_fn((total, ndim), |(p, k)| {
            let stride = resolution.pow((ndim - 1 - k) as u32);
            axes[k][(p / stride) % resolution]
        });

        let (estimates, variances) = self.predict(points.view())?;
        let shape = IxDyn(&vec![resolution; ndim]);
        let field = ArrayD::from_shape_vec(shape.clone(), estimates)
            .map_err(|e| CoreError::Computation(format!("kriging(...): {e}")))?;
        let sigma = ArrayD::from_shape_vec(shape, variances)
            .map_err(|e| CoreError::Computation(format!("kriging(...): {e}")))?;
        debug!(total, "kriging grid estimated");
        Ok(KrigingField { axes, field, sigma })
    }
}

fn semivariance(model: Model, params: &ModelParameters, h: f64) -> f64 {
    if h == 0.0 {
        0.0
    } else {
        model.evaluate(h, params)
    }
}

fn covariance(model: Model, params: &ModelParameters, h: f64) -> f64 {
    params.sill + params.nugget - semivariance(model, params, h)
}

fn drift(mode: &KrigingMode, point: ArrayView1<f64>, drift_value: Option<f64>) -> Vec<f64> {
    match mode {
        KrigingMode::Simple { .. } => Vec::new(),
        KrigingMode::Ordinary => vec![1.0],
        KrigingMode::Universal => std::iter::once(1.0).chain(point.iter().copied()).collect(),
        KrigingMode::ExternalDrift { .. } => vec![1.0, drift_value.unwrap_or(0.0)],
    }
}

/// Kriging of `variogram` on a grid with `resolution` points per axis
pub fn kriging(variogram: &Variogram, mode: KrigingMode, resolution: usize) -> Result<KrigingField> {
    Kriging::new(variogram, mode)?.grid(resolution)
}

/// Ordinary kriging estimate minus observation, leaving out one
/// observation at a time
pub(crate) fn leave_one_out(variogram: &Variogram) -> Result<Vec<f64>> {
    let coords = variogram.coordinates();
    let values = variogram.values();
    let n = values.len();
    (0..n)
        .map(|i| {
            let rest: Vec<usize> = (0..n).filter(|&j| j != i).collect();
            let k = Kriging::from_parts(
                coords.select(Axis(0), &rest),
                rest.iter().map(|&j| values[j]).collect(),
                variogram.model(),
                *variogram.parameters(),
                variogram.config().dist_func,
                KrigingMode::Ordinary,
            )?;
            let (estimate, _) = k.solve(coords.row(i), None)?;
            Ok(estimate - values[i])
        })
        .collect()
}

/// Ordinary kriging of held-out observations from a training variogram
pub(crate) fn holdout_errors(train: &Variogram, coordinates: ArrayView2<'_, f64>, values: &[f64]) -> Result<Vec<f64>> {
    let k = Kriging::new(train, KrigingMode::Ordinary)?;
    let (estimates, _) = k.predict(coordinates)?;
    Ok(estimates.iter().zip(values).map(|(e, z)| e - z).collect())
}

/// Estimated field with the observation locations on top
pub fn plot_kriging(
    variogram: &Variogram,
    field: &KrigingField,
    ctx: &PlotContext,
    options: &PlotOptions,
) -> Result<Figure> {
    let coords = variogram.coordinates();
    let chart = match field.ndim() {
        1 => FieldChart {
            title: "kriging".to_string(),
            x: field.axes[0].clone(),
            y: vec![0.0],
            values: field
                .field
                .clone()
                .into_shape((field.axes[0].len(), 1))
                .map_err(|e| CoreError::Computation(format!("plot_kriging(...): {e}")))?,
            points: coords.column(0).iter().map(|&x| (x, 0.0)).collect(),
        },
        2 => FieldChart {
            title: "kriging".to_string(),
            x: field.axes[0].clone(),
            y: field.axes[1].clone(),
            values: field
                .field
                .clone()
                .into_dimensionality::<Ix2>()
                .map_err(|e| CoreError::Computation(format!("plot_kriging(...): {e}")))?,
            points: coords.rows().into_iter().map(|r| (r[0], r[1])).collect(),
        },
        ndim => {
            return Err(CoreError::Unsupported(format!(
                "plot_kriging(...): {ndim}-dimensional fields cannot be plotted"
            ))
            .into())
        }
    };
    Ok(ctx.render(PlotKind::Kriging, chart, options)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::variogram::VariogramConfig;
    use approx::assert_relative_eq;

    fn scattered() -> (Array2<f64>, Vec<f64>) {
        let coords = Array2::from_shape_fn((25, 2), |(i, k)| {
            let t = i as f64;
            if k == 0 {
                (t * 3.7) % 10.0
            } else {
                (t * 2.3 + 1.0) % 10.0
            }
        });
        let values = coords.rows().into_iter().map(|r| (r[0] / 3.0).sin() + r[1] / 5.0).collect();
        (coords, values)
    }

    fn variogram() -> Variogram {
        let (coords, values) = scattered();
        Variogram::new(coords.view(), &values, VariogramConfig::default().with_model(Model::Exponential)).unwrap()
    }

    #[test]
    fn test_exact_at_observations() {
        let v = variogram();
        for mode in [KrigingMode::Ordinary, KrigingMode::Simple { mean: 1.0 }, KrigingMode::Universal] {
            let k = Kriging::new(&v, mode).unwrap();
            let (est, var) = k.predict(v.coordinates().view()).unwrap();
            for (e, z) in est.iter().zip(v.values()) {
                assert_relative_eq!(*e, *z, epsilon = 1e-6);
            }
            assert!(var.iter().all(|s| *s < 1e-6));
        }
    }

    #[test]
    fn test_variance_grows_away_from_data() {
        let v = variogram();
        let k = Kriging::new(&v, KrigingMode::Ordinary).unwrap();
        let far = Array2::from_shape_vec((2, 2), vec![5.0, 5.0, 40.0, 40.0]).unwrap();
        let (_, var) = k.predict(far.view()).unwrap();
        assert!(var[1] > var[0]);
    }

    #[test]
    fn test_duplicated_coordinates_are_singular() {
        let coords = Array2::from_shape_vec((3, 1), vec![0.0, 0.0, 1.0]).unwrap();
        let params = ModelParameters::new(2.0, 1.0, 0.0);
        let err = Kriging::from_parts(
            coords,
            vec![1.0, 2.0, 3.0],
            Model::Spherical,
            params,
            DistFunc::Euclidean,
            KrigingMode::Ordinary,
        )
        .unwrap_err();
        assert!(matches!(err, Error::Singular(_)));
    }

    #[test]
    fn test_external_drift_sizes() {
        let v = variogram();
        let n = v.values().len();
        let mode = KrigingMode::ExternalDrift {
            at_observations: vec![0.0; n - 1],
            at_targets: vec![],
        };
        assert!(Kriging::new(&v, mode).is_err());

        let drift: Vec<f64> = v.coordinates().column(1).to_vec();
        let mode = KrigingMode::ExternalDrift {
            at_observations: drift,
            at_targets: vec![1.0, 2.0],
        };
        let k = Kriging::new(&v, mode).unwrap();
        let one = Array2::from_shape_vec((1, 2), vec![5.0, 5.0]).unwrap();
        assert!(k.predict(one.view()).is_err());
    }

    #[test]
    fn test_grid_shape_and_axes() {
        let v = variogram();
        let field = kriging(&v, KrigingMode::Ordinary, 6).unwrap();
        assert_eq!(field.field.shape(), &[6, 6]);
        assert_eq!(field.sigma.shape(), &[6, 6]);
        let (lo, hi) = min_max(&v.coordinates().column(0).to_vec()).unwrap();
        assert_relative_eq!(field.axes[0][0], lo);
        assert_relative_eq!(field.axes[0][5], hi);
        assert!(Kriging::new(&v, KrigingMode::Ordinary).unwrap().grid(1).is_err());
    }

    #[test]
    fn test_leave_one_out_errors() {
        let v = variogram();
        let errors = leave_one_out(&v).unwrap();
        assert_eq!(errors.len(), 25);
        assert!(errors.iter().all(|e| e.is_finite()));
    }
}
