//! Experimental variogram and model fit
//!
//! [`Variogram::new`] pairs every observation with every other one, groups
//! the pairs into lag classes, estimates one semi-variance per class and
//! fits a theoretical [`Model`] to the result. Fitting is a weighted least
//! squares problem solved with Nelder-Mead:
//!
//! - `trf` keeps every parameter inside its bounds (range up to the last
//!   lag, sill and nugget up to the largest semi-variance)
//! - `lm` only keeps the parameters non-negative
//! - `manual` takes the parameters from the configuration

use std::fmt;
use std::str::FromStr;

use argmin::core::{CostFunction, Executor};
use argmin::solver::neldermead::NelderMead;
use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use hydrobox_core::numeric::{linspace, mean, min_max};
use hydrobox_core::Error as CoreError;

use crate::binning::{lag_classes, BinFunc, Maxlag};
use crate::distance::{DistFunc, PairList};
use crate::estimator::Estimator;
use crate::kriging;
use crate::model::{Model, ModelParameters};
use crate::{Error, Result};

/// How the model parameters are found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMethod {
    #[default]
    Trf,
    Lm,
    Manual,
}

impl FromStr for FitMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "trf" => Ok(Self::Trf),
            "lm" => Ok(Self::Lm),
            "manual" => Ok(Self::Manual),
            other => Err(Error::invalid("variogram", "fit_method", format!("unknown fit method '{other}'"))),
        }
    }
}

/// Uncertainty assigned to each lag class during the fit.
///
/// Relative to the largest lag `x / xmax`; a class gets the weight
/// `1 / sigma^2`, so small sigmas pull the model towards short lags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitSigma {
    #[default]
    None,
    Linear,
    Sqrt,
    Sq,
    Exp,
}

impl FitSigma {
    fn sigma(self, x: f64, xmax: f64) -> f64 {
        let u = x / xmax;
        match self {
            Self::None => 1.0,
            Self::Linear => u,
            Self::Sqrt => u.sqrt(),
            Self::Sq => u * u,
            Self::Exp => (-1.0 / u).exp(),
        }
    }

    fn weights(self, x: &[f64]) -> Vec<f64> {
        let xmax = x.iter().copied().fold(f64::MIN_POSITIVE, f64::max);
        x.iter()
            .map(|&v| 1.0 / self.sigma(v, xmax).max(1e-12).powi(2))
            .collect()
    }
}

impl FromStr for FitSigma {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(Self::None),
            "linear" => Ok(Self::Linear),
            "sqrt" => Ok(Self::Sqrt),
            "sq" => Ok(Self::Sq),
            "exp" => Ok(Self::Exp),
            other => Err(Error::invalid("variogram", "fit_sigma", format!("unknown sigma '{other}'"))),
        }
    }
}

/// Error measure over a set of residuals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Score {
    #[default]
    Rmse,
    Mse,
    Mae,
}

impl Score {
    pub fn name(self) -> &'static str {
        match self {
            Self::Rmse => "rmse",
            Self::Mse => "mse",
            Self::Mae => "mae",
        }
    }

    /// Score of `residuals`, NaN when there are none
    pub fn apply(self, residuals: &[f64]) -> f64 {
        let n = residuals.len() as f64;
        if residuals.is_empty() {
            return f64::NAN;
        }
        let mse = || residuals.iter().map(|r| r * r).sum::<f64>() / n;
        match self {
            Self::Rmse => mse().sqrt(),
            Self::Mse => mse(),
            Self::Mae => residuals.iter().map(|r| r.abs()).sum::<f64>() / n,
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Score {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rmse" => Ok(Self::Rmse),
            "mse" => Ok(Self::Mse),
            "mae" => Ok(Self::Mae),
            other => Err(Error::invalid("gridsearch", "score", format!("'{other}' is not one of rmse, mse, mae"))),
        }
    }
}

/// Everything that controls how a [`Variogram`] is built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariogramConfig {
    pub estimator: Estimator,
    pub model: Model,
    pub dist_func: DistFunc,
    pub bin_func: BinFunc,
    pub fit_method: FitMethod,
    pub fit_sigma: FitSigma,
    pub use_nugget: bool,
    pub maxlag: Maxlag,
    pub n_lags: usize,
    /// Parameters for [`FitMethod::Manual`]
    pub manual_parameters: Option<ModelParameters>,
}

impl Default for VariogramConfig {
    fn default() -> Self {
        Self {
            estimator: Estimator::Matheron,
            model: Model::Spherical,
            dist_func: DistFunc::Euclidean,
            bin_func: BinFunc::Even,
            fit_method: FitMethod::Trf,
            fit_sigma: FitSigma::None,
            use_nugget: false,
            maxlag: Maxlag::None,
            n_lags: 10,
            manual_parameters: None,
        }
    }
}

impl VariogramConfig {
    /// Settings used by [`variogram_model`]: cressie estimator, 15 even
    /// lag classes up to the median distance
    pub fn model_defaults() -> Self {
        Self {
            estimator: Estimator::Cressie,
            maxlag: Maxlag::Median,
            n_lags: 15,
            ..Self::default()
        }
    }

    pub fn with_estimator(mut self, estimator: Estimator) -> Self {
        self.estimator = estimator;
        self
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    pub fn with_dist_func(mut self, dist_func: DistFunc) -> Self {
        self.dist_func = dist_func;
        self
    }

    pub fn with_bin_func(mut self, bin_func: BinFunc) -> Self {
        self.bin_func = bin_func;
        self
    }

    pub fn with_fit_method(mut self, fit_method: FitMethod) -> Self {
        self.fit_method = fit_method;
        self
    }

    pub fn with_fit_sigma(mut self, fit_sigma: FitSigma) -> Self {
        self.fit_sigma = fit_sigma;
        self
    }

    pub fn with_nugget(mut self, use_nugget: bool) -> Self {
        self.use_nugget = use_nugget;
        self
    }

    pub fn with_maxlag(mut self, maxlag: Maxlag) -> Self {
        self.maxlag = maxlag;
        self
    }

    pub fn with_n_lags(mut self, n_lags: usize) -> Self {
        self.n_lags = n_lags;
        self
    }

    /// Skip the fit and use `parameters`
    pub fn with_manual_parameters(mut self, parameters: ModelParameters) -> Self {
        self.fit_method = FitMethod::Manual;
        self.manual_parameters = Some(parameters);
        self
    }
}

/// Summary of a fitted variogram
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VariogramDescription {
    pub model: String,
    pub estimator: String,
    pub dist_func: String,
    pub bin_func: String,
    pub effective_range: f64,
    pub sill: f64,
    pub nugget: f64,
    pub shape: Option<f64>,
    pub maxlag: f64,
    pub n_lags: usize,
    pub params: VariogramConfig,
}

/// Experimental variogram with a fitted model
#[derive(Debug, Clone)]
pub struct Variogram {
    coordinates: Array2<f64>,
    values: Array1<f64>,
    config: VariogramConfig,
    pairs: PairList,
    differences: Vec<f64>,
    maxlag: f64,
    bins: Vec<f64>,
    experimental: Vec<f64>,
    counts: Vec<usize>,
    parameters: ModelParameters,
}

impl Variogram {
    /// Build and fit a variogram; `coordinates` has one row per observation
    #[instrument(skip(coordinates, values), fields(n = values.len(), model = %config.model, estimator = %config.estimator))]
    pub fn new(coordinates: ArrayView2<'_, f64>, values: &[f64], config: VariogramConfig) -> Result<Self> {
        if coordinates.nrows() != values.len() {
            return Err(CoreError::size_mismatch(values.len(), coordinates.nrows(), "variogram(...): coordinates").into());
        }
        if values.len() < 3 {
            return Err(CoreError::InsufficientData {
                expected: 3,
                actual: values.len(),
            }
            .into());
        }
        if values.iter().chain(coordinates.iter()).any(|v| !v.is_finite()) {
            return Err(CoreError::non_finite("variogram(...): input").into());
        }
        config.estimator.validate()?;

        let pairs = PairList::new(coordinates, config.dist_func);
        let differences = pairs.differences(values);
        let maxlag = config.maxlag.resolve(&pairs.distances)?;
        let within: Vec<f64> = pairs.distances.iter().copied().filter(|&d| d <= maxlag).collect();
        let bins = config.bin_func.edges(&within, config.n_lags, maxlag)?;

        let classes = lag_classes(&pairs.distances, &bins);
        let mut groups: Vec<Vec<f64>> = vec![Vec::new(); bins.len()];
        for (class, diff) in classes.iter().zip(&differences) {
            if let Some(k) = class {
                groups[*k].push(*diff);
            }
        }
        let experimental: Vec<f64> = groups.iter().map(|g| config.estimator.estimate(g)).collect();
        let counts: Vec<usize> = groups.iter().map(Vec::len).collect();
        debug!(n_pairs = pairs.len(), maxlag, n_lags = bins.len(), "experimental variogram estimated");

        let parameters = fit(&config, &bins, &experimental)?;
        debug!(?parameters, "model fitted");

        Ok(Self {
            coordinates: coordinates.to_owned(),
            values: Array1::from(values.to_vec()),
            config,
            pairs,
            differences,
            maxlag,
            bins,
            experimental,
            counts,
            parameters,
        })
    }

    /// Same observations under another configuration
    pub fn with_config(&self, config: VariogramConfig) -> Result<Self> {
        Self::new(self.coordinates.view(), self.values.as_slice().unwrap_or(&[]), config)
    }

    /// Variogram of the observations at `rows`
    pub fn subset(&self, rows: &[usize]) -> Result<Self> {
        let coordinates = self.coordinates.select(Axis(0), rows);
        let values: Vec<f64> = rows.iter().map(|&i| self.values[i]).collect();
        Self::new(coordinates.view(), &values, self.config.clone())
    }

    pub fn coordinates(&self) -> &Array2<f64> {
        &self.coordinates
    }

    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    pub fn config(&self) -> &VariogramConfig {
        &self.config
    }

    pub fn model(&self) -> Model {
        self.config.model
    }

    /// Upper lag class edges
    pub fn bins(&self) -> &[f64] {
        &self.bins
    }

    /// Semi-variance per lag class, NaN for empty classes
    pub fn experimental(&self) -> &[f64] {
        &self.experimental
    }

    /// Number of point pairs per lag class
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    pub fn parameters(&self) -> &ModelParameters {
        &self.parameters
    }

    pub fn maxlag(&self) -> f64 {
        self.maxlag
    }

    /// Separating distance of every point pair
    pub fn distances(&self) -> &[f64] {
        &self.pairs.distances
    }

    /// Absolute value difference of every point pair
    pub fn differences(&self) -> &[f64] {
        &self.differences
    }

    pub(crate) fn pairs(&self) -> &[(usize, usize)] {
        &self.pairs.pairs
    }

    /// Fitted model at lag `h`
    pub fn model_value(&self, h: f64) -> f64 {
        self.config.model.evaluate(h, &self.parameters)
    }

    /// Fitted model on `n` lags from 0 to the last bin
    pub fn model_curve(&self, n: usize) -> (Vec<f64>, Vec<f64>) {
        let last = self.bins.last().copied().unwrap_or(self.maxlag);
        let lags = linspace(0.0, last, n);
        let values = self.config.model.curve(&lags, &self.parameters);
        (lags, values)
    }

    /// Model minus experimental value for every non-empty class
    pub fn residuals(&self) -> Vec<f64> {
        self.bins
            .iter()
            .zip(&self.experimental)
            .filter(|(_, e)| e.is_finite())
            .map(|(&h, e)| self.model_value(h) - e)
            .collect()
    }

    pub fn rmse(&self) -> f64 {
        Score::Rmse.apply(&self.residuals())
    }

    pub fn mse(&self) -> f64 {
        Score::Mse.apply(&self.residuals())
    }

    pub fn mae(&self) -> f64 {
        Score::Mae.apply(&self.residuals())
    }

    /// Leave-one-out ordinary kriging, scored over all observations
    pub fn cross_validate(&self, score: Score) -> Result<f64> {
        let errors = kriging::leave_one_out(self)?;
        Ok(score.apply(&errors))
    }

    pub fn describe(&self) -> VariogramDescription {
        VariogramDescription {
            model: self.config.model.to_string(),
            estimator: self.config.estimator.to_string(),
            dist_func: self.config.dist_func.to_string(),
            bin_func: self.config.bin_func.to_string(),
            effective_range: self.parameters.range,
            sill: self.parameters.sill,
            nugget: self.parameters.nugget,
            shape: self.parameters.shape,
            maxlag: self.maxlag,
            n_lags: self.bins.len(),
            params: self.config.clone(),
        }
    }
}

/// Which parameters the optimizer sees, in vector order
#[derive(Debug, Clone, Copy)]
struct Layout {
    model: Model,
    use_nugget: bool,
    bounded: bool,
    xmax: f64,
    ymax: f64,
}

impl Layout {
    fn decode(&self, p: &[f64]) -> ModelParameters {
        let mut it = p.iter().copied();
        let mut next = || it.next().unwrap_or(0.0);
        let range = next();
        let sill = next();
        let shape = if self.model.has_shape() { Some(next()) } else { None };
        let nugget = if self.use_nugget { next() } else { 0.0 };

        let tiny = self.xmax * 1e-9;
        if self.bounded {
            let (lo, hi) = self.model.shape_bounds();
            ModelParameters {
                range: range.clamp(tiny, self.xmax),
                sill: sill.clamp(0.0, self.ymax),
                nugget: nugget.clamp(0.0, self.ymax),
                shape: shape.map(|s| s.clamp(lo, hi)),
            }
        } else {
            ModelParameters {
                range: range.abs().max(tiny),
                sill: sill.abs(),
                nugget: nugget.abs(),
                shape: shape.map(|s| s.abs().max(1e-3)),
            }
        }
    }

    fn initial(&self, x: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let mut start = vec![mean(x), self.ymax];
        let mut steps = vec![0.2 * self.xmax, -0.2 * self.ymax];
        if let Some(s) = self.model.default_shape() {
            start.push(s);
            steps.push(0.25 * s);
        }
        if self.use_nugget {
            start.push(0.0);
            steps.push(0.1 * self.ymax);
        }
        (start, steps)
    }
}

struct FitCost<'a> {
    layout: Layout,
    x: &'a [f64],
    y: &'a [f64],
    weights: &'a [f64],
}

impl CostFunction for FitCost<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, p: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
        let params = self.layout.decode(p);
        let sse: f64 = self
            .x
            .iter()
            .zip(self.y)
            .zip(self.weights)
            .map(|((&h, &y), w)| w * (self.layout.model.evaluate(h, &params) - y).powi(2))
            .sum();
        Ok(if sse.is_finite() { sse } else { f64::MAX })
    }
}

fn fit(config: &VariogramConfig, bins: &[f64], experimental: &[f64]) -> Result<ModelParameters> {
    if config.fit_method == FitMethod::Manual {
        let mut params = config.manual_parameters.ok_or_else(|| {
            Error::invalid("variogram", "fit_method", "manual fitting needs manual_parameters")
        })?;
        if params.shape.is_none() {
            params.shape = config.model.default_shape();
        }
        config.model.check(&params)?;
        return Ok(params);
    }

    let (x, y): (Vec<f64>, Vec<f64>) = bins
        .iter()
        .zip(experimental)
        .filter(|(_, e)| e.is_finite())
        .map(|(&b, &e)| (b, e))
        .unzip();
    let n_params = 2 + usize::from(config.model.has_shape()) + usize::from(config.use_nugget);
    if x.len() < n_params {
        return Err(Error::Fit(format!(
            "{} non-empty lag classes cannot determine {n_params} parameters",
            x.len()
        )));
    }

    let (_, xmax) = min_max(&x).unwrap_or((0.0, 1.0));
    let (_, ymax) = min_max(&y).unwrap_or((0.0, 1.0));
    let layout = Layout {
        model: config.model,
        use_nugget: config.use_nugget,
        bounded: config.fit_method == FitMethod::Trf,
        xmax,
        ymax,
    };
    let weights = config.fit_sigma.weights(&x);

    let (start, steps) = layout.initial(&x);
    let mut simplex = vec![start.clone()];
    for (i, step) in steps.iter().enumerate() {
        let mut vertex = start.clone();
        vertex[i] += if *step == 0.0 { 0.1 } else { *step };
        simplex.push(vertex);
    }

    let cost = FitCost {
        layout,
        x: &x,
        y: &y,
        weights: &weights,
    };
    let solver = NelderMead::new(simplex)
        .with_sd_tolerance(1e-10)
        .map_err(|e| Error::Fit(e.to_string()))?;
    let result = Executor::new(cost, solver)
        .configure(|state| state.max_iters(2000))
        .run()
        .map_err(|e| Error::Fit(e.to_string()))?;
    let best = result
        .state()
        .best_param
        .as_ref()
        .ok_or_else(|| Error::Fit("optimizer returned no parameters".to_string()))?;
    Ok(layout.decode(best))
}

/// Build and fit a variogram
pub fn variogram(coordinates: ArrayView2<'_, f64>, values: &[f64], config: VariogramConfig) -> Result<Variogram> {
    Variogram::new(coordinates, values, config)
}

/// Experimental variogram next to a model that was not fitted
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelCurve {
    pub bins: Vec<f64>,
    pub experimental: Vec<f64>,
    /// 100 lags from 0 to the last bin
    pub lags: Vec<f64>,
    pub model: Vec<f64>,
}

/// Evaluate `model` with fixed `parameters` next to the experimental
/// variogram built with [`VariogramConfig::model_defaults`]
pub fn variogram_model(
    coordinates: ArrayView2<'_, f64>,
    values: &[f64],
    model: Model,
    parameters: ModelParameters,
) -> Result<ModelCurve> {
    let config = VariogramConfig::model_defaults().with_model(model);
    variogram_model_with(coordinates, values, parameters, config)
}

/// [`variogram_model`] with explicit binning and estimator settings
pub fn variogram_model_with(
    coordinates: ArrayView2<'_, f64>,
    values: &[f64],
    parameters: ModelParameters,
    config: VariogramConfig,
) -> Result<ModelCurve> {
    let v = Variogram::new(coordinates, values, config.with_manual_parameters(parameters))?;
    let (lags, model) = v.model_curve(100);
    Ok(ModelCurve {
        bins: v.bins,
        experimental: v.experimental,
        lags,
        model,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::Array2;

    /// Observations on a line, valued by the sine of the position
    fn line(n: usize) -> (Array2<f64>, Vec<f64>) {
        let coords = Array2::from_shape_fn((n, 1), |(i, _)| i as f64);
        let values = (0..n).map(|i| ((i as f64) * 0.7).sin()).collect();
        (coords, values)
    }

    #[test]
    fn test_experimental_matches_hand_computed() {
        let coords = Array2::from_shape_vec((3, 1), vec![0.0, 1.0, 2.0]).unwrap();
        let values = [1.0, 2.0, 4.0];
        let config = VariogramConfig::default()
            .with_n_lags(2)
            .with_manual_parameters(ModelParameters::new(2.0, 1.0, 0.0));
        let v = Variogram::new(coords.view(), &values, config).unwrap();
        assert_eq!(v.bins(), &[1.0, 2.0]);
        assert_eq!(v.counts(), &[2, 1]);
        // lag 1: differences 1 and 2; lag 2: difference 3
        assert_relative_eq!(v.experimental()[0], 5.0 / 4.0);
        assert_relative_eq!(v.experimental()[1], 9.0 / 2.0);
    }

    #[test]
    fn test_fit_stays_in_bounds() {
        let (coords, values) = line(40);
        for method in [FitMethod::Trf, FitMethod::Lm] {
            let config = VariogramConfig::default().with_fit_method(method).with_nugget(true);
            let v = Variogram::new(coords.view(), &values, config).unwrap();
            let p = v.parameters();
            assert!(p.range > 0.0 && p.sill >= 0.0 && p.nugget >= 0.0);
            if method == FitMethod::Trf {
                assert!(p.range <= v.bins().last().copied().unwrap() + 1e-9);
            }
        }
    }

    #[test]
    fn test_fit_recovers_manual_model() {
        // an experimental variogram that is exactly a spherical model
        let bins: Vec<f64> = (1..=12).map(f64::from).collect();
        let truth = ModelParameters::new(8.0, 3.0, 0.0);
        let experimental = Model::Spherical.curve(&bins, &truth);
        let params = fit(&VariogramConfig::default(), &bins, &experimental).unwrap();
        assert_relative_eq!(params.range, 8.0, max_relative = 1e-3);
        assert_relative_eq!(params.sill, 3.0, max_relative = 1e-3);
    }

    #[test]
    fn test_manual_requires_parameters() {
        let (coords, values) = line(10);
        let config = VariogramConfig::default().with_fit_method(FitMethod::Manual);
        assert!(Variogram::new(coords.view(), &values, config).is_err());
    }

    #[test]
    fn test_input_validation() {
        let (coords, values) = line(10);
        assert!(Variogram::new(coords.view(), &values[..9], VariogramConfig::default()).is_err());
        let mut bad = values.clone();
        bad[3] = f64::NAN;
        assert!(Variogram::new(coords.view(), &bad, VariogramConfig::default()).is_err());
        assert!(Variogram::new(coords.view(), &values, VariogramConfig::default().with_n_lags(0)).is_err());
    }

    #[test]
    fn test_scores() {
        let r = [3.0, -4.0];
        assert_relative_eq!(Score::Mse.apply(&r), 12.5);
        assert_relative_eq!(Score::Rmse.apply(&r), 12.5f64.sqrt());
        assert_relative_eq!(Score::Mae.apply(&r), 3.5);
        assert!(Score::Rmse.apply(&[]).is_nan());
        assert!("r2".parse::<Score>().is_err());
    }

    #[test]
    fn test_sigma_weights_favour_short_lags() {
        let x = [1.0, 2.0, 4.0];
        let w = FitSigma::Linear.weights(&x);
        assert_relative_eq!(w[0], 16.0);
        assert_relative_eq!(w[2], 1.0);
        assert!(FitSigma::None.weights(&x).iter().all(|w| *w == 1.0));
        let w = FitSigma::Exp.weights(&x);
        assert!(w[0] > w[1] && w[1] > w[2]);
    }

    #[test]
    fn test_describe() {
        let (coords, values) = line(20);
        let v = Variogram::new(coords.view(), &values, VariogramConfig::default()).unwrap();
        let d = v.describe();
        assert_eq!(d.model, "spherical");
        assert_eq!(d.estimator, "matheron");
        assert_eq!(d.n_lags, 10);
        assert_eq!(d.params, *v.config());
    }
}
