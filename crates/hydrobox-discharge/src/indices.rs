//! Single-number discharge indices

use tracing::instrument;

use hydrobox_core::Error as CoreError;

use crate::Result;

/// Richards-Baker flashiness index.
///
/// `sum(|x[i] - x[i-1]|) / sum(x[1..])` for `i` in `1..n`. Being relative
/// to the total discharge, it does not depend on the unit of `x`.
///
/// Needs at least two observations; a zero denominator or missing values
/// are reported as errors.
#[instrument(skip(x), fields(n = x.as_ref().len()))]
pub fn richards_baker<T: AsRef<[f64]> + ?Sized>(x: &T) -> Result<f64> {
    let x = x.as_ref();
    if x.len() < 2 {
        return Err(CoreError::InsufficientData {
            expected: 2,
            actual: x.len(),
        }
        .into());
    }
    if x.iter().any(|v| !v.is_finite()) {
        return Err(CoreError::non_finite("richards_baker(...): x").into());
    }

    let path: f64 = x.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
    let total: f64 = x[1..].iter().sum();
    if total == 0.0 {
        return Err(CoreError::Computation(
            "richards_baker(...): sum of x[1..] is zero".to_string(),
        )
        .into());
    }
    Ok(path / total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use hydrobox_core::TimeSeries;

    #[test]
    fn test_hand_computed() {
        // |2-1| + |1-2| + |4-1| = 5 over 2 + 1 + 4 = 7
        assert_relative_eq!(richards_baker(&[1.0, 2.0, 1.0, 4.0]).unwrap(), 5.0 / 7.0);
    }

    #[test]
    fn test_constant_series_is_zero() {
        assert_relative_eq!(richards_baker(&[3.0; 10]).unwrap(), 0.0);
    }

    #[test]
    fn test_slice_vec_and_series_agree() {
        let values = vec![5.2, 4.8, 6.1, 5.0, 5.5];
        let series = TimeSeries::from_values(values.clone());
        let a = richards_baker(values.as_slice()).unwrap();
        let b = richards_baker(&values).unwrap();
        let c = richards_baker(&series).unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_edge_cases_are_errors() {
        assert!(richards_baker(&[1.0]).is_err());
        assert!(richards_baker(&[1.0, 0.0]).is_err());
        assert!(richards_baker(&[1.0, f64::NAN, 2.0]).is_err());
    }
}
