//! Random coordinate sampling and seeded series

use std::collections::HashSet;

use ndarray::{Array1, Array2, ArrayBase, Data, Dimension};
use rand::{thread_rng, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Gamma};
use tracing::{debug, instrument, warn};

use hydrobox_core::{Error, Result};

/// Generator for `seed`, or a freshly seeded one when `None`
pub(crate) fn seeded_rng(seed: Option<u64>) -> ChaCha8Rng {
    let seed = seed.unwrap_or_else(|| thread_rng().gen());
    ChaCha8Rng::seed_from_u64(seed)
}

/// Coordinates drawn by [`choice`] and the values found there
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// One row per draw, one column per axis
    pub coordinates: Array2<usize>,
    pub values: Array1<f64>,
}

impl Sample {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Draw `size` random coordinates from `arr`, independently on every axis.
///
/// With `replace`, duplicated coordinates are redrawn until all of them are
/// unique. That is impossible when an axis is shorter than `size`, so
/// `replace` is switched off in that case.
#[instrument(skip(arr), fields(shape = ?arr.shape()))]
pub fn choice<S, D>(arr: &ArrayBase<S, D>, size: usize, seed: Option<u64>, replace: bool) -> Result<Sample>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    if arr.is_empty() {
        return Err(Error::InvalidInput(
            "choice(...): arg arr: cannot sample from an empty array".to_string(),
        ));
    }
    let shape = arr.shape().to_vec();
    let mut replace = replace;
    if replace && (shape.iter().any(|&n| size > n) || arr.len() < size) {
        warn!(size, ?shape, "at least one axis has fewer cells than size; replace disabled");
        replace = false;
    }

    let mut rng = seeded_rng(seed);
    let mut draw = |count: usize| -> Vec<Vec<usize>> {
        (0..count)
            .map(|_| shape.iter().map(|&n| rng.gen_range(0..n)).collect())
            .collect()
    };

    let mut coordinates = draw(size);
    let mut rounds = 0usize;
    while replace {
        let mut seen = HashSet::with_capacity(size);
        coordinates.retain(|c| seen.insert(c.clone()));
        if coordinates.len() == size {
            break;
        }
        rounds += 1;
        coordinates.extend(draw(size - coordinates.len()));
    }
    debug!(rounds, "coordinates drawn");

    let view = arr.view().into_dyn();
    let values: Array1<f64> = coordinates.iter().map(|c| view[c.as_slice()]).collect();
    let ndim = shape.len();
    let flat: Vec<usize> = coordinates.into_iter().flatten().collect();
    let coordinates = Array2::from_shape_vec((size, ndim), flat)
        .map_err(|e| Error::Computation(format!("choice(...): {e}")))?;

    Ok(Sample {
        coordinates,
        values,
    })
}

/// `size` gamma distributed samples with the given shape and scale
pub fn gamma_series(shape: f64, scale: f64, size: usize, seed: Option<u64>) -> Result<Vec<f64>> {
    let gamma = Gamma::new(shape, scale).map_err(|e| {
        Error::InvalidParameter(format!(
            "gamma_series(...): shape {shape} and scale {scale}: {e}"
        ))
    })?;
    let mut rng = seeded_rng(seed);
    Ok((0..size).map(|_| gamma.sample(&mut rng)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, Array3};

    #[test]
    fn test_coordinates_are_unique_with_replace() {
        let arr = Array::from_shape_fn((20, 20), |(i, j)| (i * 20 + j) as f64);
        let sample = choice(&arr, 15, Some(42), true).unwrap();
        assert_eq!(sample.coordinates.dim(), (15, 2));

        let unique: HashSet<Vec<usize>> = sample
            .coordinates
            .rows()
            .into_iter()
            .map(|r| r.to_vec())
            .collect();
        assert_eq!(unique.len(), 15);

        for (row, value) in sample.coordinates.rows().into_iter().zip(&sample.values) {
            assert_eq!(*value, (row[0] * 20 + row[1]) as f64);
        }
    }

    #[test]
    fn test_seed_reproduces() {
        let arr = Array3::<f64>::zeros((4, 5, 6));
        let a = choice(&arr, 3, Some(7), true).unwrap();
        let b = choice(&arr, 3, Some(7), true).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_replace_disabled_for_short_axes() {
        let arr = Array::from_shape_fn((3, 50), |(i, _)| i as f64);
        let sample = choice(&arr, 10, Some(1), true).unwrap();
        assert_eq!(sample.len(), 10);
        assert!(sample.coordinates.column(0).iter().all(|&i| i < 3));
    }

    #[test]
    fn test_empty_array() {
        let arr = Array2::<f64>::zeros((0, 3));
        assert!(choice(&arr, 1, None, true).is_err());
    }

    #[test]
    fn test_gamma_series() {
        let a = gamma_series(2.0, 2.0, 1000, Some(3)).unwrap();
        assert_eq!(a, gamma_series(2.0, 2.0, 1000, Some(3)).unwrap());
        assert!(a.iter().all(|v| *v > 0.0));
        let mean = a.iter().sum::<f64>() / a.len() as f64;
        assert!((mean - 4.0).abs() < 0.5);
        assert!(gamma_series(-1.0, 2.0, 10, None).is_err());
    }
}
