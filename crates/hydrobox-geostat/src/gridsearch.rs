//! Exhaustive search over variogram settings
//!
//! Every combination in a [`ParamGrid`] is scored by k-fold
//! cross-validation (5 folds of consecutive observations). Per fold the
//! candidate variogram is built on the training observations; with
//! `cross_validate` the held-out observations are predicted by ordinary
//! kriging and the prediction errors are scored, otherwise the fit error
//! of the model against the experimental variogram is scored. Lower scores
//! are better.

use ndarray::{Array2, ArrayView2, Axis};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::binning::{BinFunc, Maxlag};
use crate::estimator::Estimator;
use crate::kriging::holdout_errors;
use crate::model::Model;
use crate::variogram::{Score, Variogram, VariogramConfig};
use crate::{Error, Result};

/// Options to combine; an empty list keeps the base setting
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParamGrid {
    pub model: Vec<Model>,
    pub estimator: Vec<Estimator>,
    pub bin_func: Vec<BinFunc>,
    pub n_lags: Vec<usize>,
    pub maxlag: Vec<Maxlag>,
    pub use_nugget: Vec<bool>,
}

impl ParamGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_models(mut self, models: impl IntoIterator<Item = Model>) -> Self {
        self.model = models.into_iter().collect();
        self
    }

    pub fn with_estimators(mut self, estimators: impl IntoIterator<Item = Estimator>) -> Self {
        self.estimator = estimators.into_iter().collect();
        self
    }

    pub fn with_bin_funcs(mut self, bin_funcs: impl IntoIterator<Item = BinFunc>) -> Self {
        self.bin_func = bin_funcs.into_iter().collect();
        self
    }

    pub fn with_n_lags(mut self, n_lags: impl IntoIterator<Item = usize>) -> Self {
        self.n_lags = n_lags.into_iter().collect();
        self
    }

    pub fn with_maxlags(mut self, maxlags: impl IntoIterator<Item = Maxlag>) -> Self {
        self.maxlag = maxlags.into_iter().collect();
        self
    }

    pub fn with_nugget(mut self, use_nugget: impl IntoIterator<Item = bool>) -> Self {
        self.use_nugget = use_nugget.into_iter().collect();
        self
    }

    /// Cartesian product on top of `base`
    pub fn candidates(&self, base: &VariogramConfig) -> Vec<ParamSet> {
        fn or_base<T: Clone>(options: &[T], base: T) -> Vec<T> {
            if options.is_empty() {
                vec![base]
            } else {
                options.to_vec()
            }
        }
        let mut out = Vec::new();
        for &model in &or_base(&self.model, base.model) {
            for &estimator in &or_base(&self.estimator, base.estimator) {
                for &bin_func in &or_base(&self.bin_func, base.bin_func) {
                    for &n_lags in &or_base(&self.n_lags, base.n_lags) {
                        for &maxlag in &or_base(&self.maxlag, base.maxlag) {
                            for &use_nugget in &or_base(&self.use_nugget, base.use_nugget) {
                                out.push(ParamSet {
                                    model,
                                    estimator,
                                    bin_func,
                                    n_lags,
                                    maxlag,
                                    use_nugget,
                                });
                            }
                        }
                    }
                }
            }
        }
        out
    }
}

/// One combination of searched settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ParamSet {
    pub model: Model,
    pub estimator: Estimator,
    pub bin_func: BinFunc,
    pub n_lags: usize,
    pub maxlag: Maxlag,
    pub use_nugget: bool,
}

impl ParamSet {
    pub fn apply(&self, base: &VariogramConfig) -> VariogramConfig {
        VariogramConfig {
            model: self.model,
            estimator: self.estimator,
            bin_func: self.bin_func,
            n_lags: self.n_lags,
            maxlag: self.maxlag,
            use_nugget: self.use_nugget,
            ..base.clone()
        }
    }
}

/// Scores of one candidate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateScore {
    pub params: ParamSet,
    /// NaN where the fold could not be fitted
    pub fold_scores: Vec<f64>,
    /// Mean over the folds, NaN when any fold failed
    pub mean_score: f64,
}

/// Outcome of [`GridSearch::run`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridSearchResult {
    pub score: Score,
    pub candidates: Vec<CandidateScore>,
    /// Index of the lowest finite mean score
    pub best_index: Option<usize>,
}

impl GridSearchResult {
    pub fn best(&self) -> Option<&CandidateScore> {
        self.best_index.map(|i| &self.candidates[i])
    }

    pub fn best_params(&self) -> Option<ParamSet> {
        self.best().map(|c| c.params)
    }
}

/// Builder for a variogram grid search
#[derive(Debug, Clone)]
pub struct GridSearch {
    grid: ParamGrid,
    data: Option<(Array2<f64>, Vec<f64>)>,
    base: VariogramConfig,
    score: Score,
    cross_validate: bool,
    n_jobs: i32,
    folds: usize,
}

impl GridSearch {
    pub fn new(grid: ParamGrid) -> Self {
        Self {
            grid,
            data: None,
            base: VariogramConfig::default(),
            score: Score::Rmse,
            cross_validate: true,
            n_jobs: -1,
            folds: 5,
        }
    }

    /// Search around an existing variogram: its observations and settings
    /// become the data and the base configuration
    pub fn with_variogram(mut self, variogram: &Variogram) -> Self {
        let values = variogram.values().to_vec();
        self.data = Some((variogram.coordinates().clone(), values));
        self.base = variogram.config().clone();
        self
    }

    pub fn with_data(mut self, coordinates: ArrayView2<'_, f64>, values: &[f64]) -> Self {
        self.data = Some((coordinates.to_owned(), values.to_vec()));
        self
    }

    pub fn with_base_config(mut self, base: VariogramConfig) -> Self {
        self.base = base;
        self
    }

    pub fn with_score(mut self, score: Score) -> Self {
        self.score = score;
        self
    }

    pub fn with_cross_validate(mut self, cross_validate: bool) -> Self {
        self.cross_validate = cross_validate;
        self
    }

    /// Worker threads: `1` runs sequentially, `-1` uses all cores.
    /// Without the `parallel` feature every search is sequential.
    pub fn with_n_jobs(mut self, n_jobs: i32) -> Self {
        self.n_jobs = n_jobs;
        self
    }

    pub fn with_folds(mut self, folds: usize) -> Self {
        self.folds = folds;
        self
    }

    fn fold_score(&self, config: &VariogramConfig, coords: &Array2<f64>, values: &[f64], test: &[usize]) -> Result<f64> {
        let train: Vec<usize> = (0..values.len()).filter(|i| !test.contains(i)).collect();
        let train_values: Vec<f64> = train.iter().map(|&i| values[i]).collect();
        let v = Variogram::new(coords.select(Axis(0), &train).view(), &train_values, config.clone())?;
        if !self.cross_validate {
            return Ok(self.score.apply(&v.residuals()));
        }
        let test_values: Vec<f64> = test.iter().map(|&i| values[i]).collect();
        let errors = holdout_errors(&v, coords.select(Axis(0), test).view(), &test_values)?;
        Ok(self.score.apply(&errors))
    }

    fn evaluate(&self, params: ParamSet, coords: &Array2<f64>, values: &[f64], folds: &[Vec<usize>]) -> CandidateScore {
        let config = params.apply(&self.base);
        let fold_scores: Vec<f64> = folds
            .iter()
            .map(|test| {
                self.fold_score(&config, coords, values, test).unwrap_or_else(|e| {
                    debug!(?params, error = %e, "fold failed");
                    f64::NAN
                })
            })
            .collect();
        let mean_score = fold_scores.iter().sum::<f64>() / fold_scores.len() as f64;
        CandidateScore {
            params,
            fold_scores,
            mean_score,
        }
    }

    #[cfg(feature = "parallel")]
    fn evaluate_all(&self, candidates: &[ParamSet], coords: &Array2<f64>, values: &[f64], folds: &[Vec<usize>]) -> Result<Vec<CandidateScore>> {
        use rayon::prelude::*;

        let run = || -> Vec<CandidateScore> {
            candidates
                .par_iter()
                .map(|&p| self.evaluate(p, coords, values, folds))
                .collect()
        };
        match self.n_jobs {
            1 => Ok(candidates.iter().map(|&p| self.evaluate(p, coords, values, folds)).collect()),
            n if n > 1 => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n as usize)
                    .build()
                    .map_err(|e| Error::invalid("gridsearch", "n_jobs", format!("failed to create thread pool: {e}")))?;
                Ok(pool.install(run))
            }
            _ => Ok(run()),
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn evaluate_all(&self, candidates: &[ParamSet], coords: &Array2<f64>, values: &[f64], folds: &[Vec<usize>]) -> Result<Vec<CandidateScore>> {
        Ok(candidates.iter().map(|&p| self.evaluate(p, coords, values, folds)).collect())
    }

    /// Score every candidate
    #[instrument(skip(self), fields(score = %self.score, cross_validate = self.cross_validate))]
    pub fn run(&self) -> Result<GridSearchResult> {
        let (coords, values) = self.data.as_ref().ok_or_else(|| {
            Error::invalid(
                "gridsearch",
                "variogram",
                "either a Variogram or both coordinates and values have to be given",
            )
        })?;
        if coords.nrows() != values.len() {
            return Err(hydrobox_core::Error::size_mismatch(values.len(), coords.nrows(), "gridsearch(...): coordinates").into());
        }
        if self.folds < 2 || self.folds > values.len() {
            return Err(Error::invalid(
                "gridsearch",
                "folds",
                format!("{} folds cannot split {} observations", self.folds, values.len()),
            ));
        }

        let folds = contiguous_folds(values.len(), self.folds);
        let candidates = self.grid.candidates(&self.base);
        debug!(n_candidates = candidates.len(), "grid search started");
        let scored = self.evaluate_all(&candidates, coords, values, &folds)?;

        let best_index = scored
            .iter()
            .enumerate()
            .filter(|(_, c)| c.mean_score.is_finite())
            .min_by(|(_, a), (_, b)| a.mean_score.total_cmp(&b.mean_score))
            .map(|(i, _)| i);
        debug!(?best_index, "grid search finished");
        Ok(GridSearchResult {
            score: self.score,
            candidates: scored,
            best_index,
        })
    }

    /// Only the best combination
    pub fn best_params(&self) -> Result<ParamSet> {
        self.run()?
            .best_params()
            .ok_or_else(|| Error::Fit("no candidate could be scored on every fold".to_string()))
    }
}

/// `k` folds of consecutive indices; the first `n % k` folds get one more
fn contiguous_folds(n: usize, k: usize) -> Vec<Vec<usize>> {
    let mut start = 0;
    (0..k)
        .map(|f| {
            let size = n / k + usize::from(f < n % k);
            let fold = (start..start + size).collect();
            start += size;
            fold
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidates_cover_the_grid() {
        let grid = ParamGrid::new()
            .with_models([Model::Spherical, Model::Exponential, Model::Gaussian])
            .with_n_lags([8, 12]);
        let base = VariogramConfig::default().with_estimator(Estimator::Dowd);
        let candidates = grid.candidates(&base);
        assert_eq!(candidates.len(), 6);
        assert!(candidates.iter().all(|c| c.estimator == Estimator::Dowd));
        assert_eq!(candidates[1].n_lags, 12);
        assert_eq!(candidates[2].model, Model::Exponential);
    }

    #[test]
    fn test_contiguous_folds() {
        let folds = contiguous_folds(12, 5);
        let sizes: Vec<usize> = folds.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![3, 3, 2, 2, 2]);
        assert_eq!(folds[1], vec![3, 4, 5]);
        assert_eq!(folds.concat(), (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn test_missing_input() {
        let err = GridSearch::new(ParamGrid::new()).run().unwrap_err();
        assert!(err.to_string().contains("either a Variogram"));
    }

    #[test]
    fn test_param_set_apply_keeps_base() {
        let base = VariogramConfig::default().with_dist_func(crate::DistFunc::Cityblock);
        let set = ParamGrid::new().candidates(&base)[0];
        let config = set.apply(&base);
        assert_eq!(config, base);
    }
}
