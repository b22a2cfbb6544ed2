//! Discharge analysis on seeded gamma-distributed fixtures

use approx::assert_relative_eq;
use chrono::{Datelike, Duration, NaiveDate};
use hydrobox_core::{Aggregation, TimeSeries};
use hydrobox_discharge::{
    flow_duration_curve, flow_duration_curves, plot_flow_duration_curve, plot_regime, regime,
    richards_baker, Percentiles, RegimeOptions,
};
use hydrobox_plotting::{Backend, Figure, PlotContext, PlotOptions};
use ndarray::Array2;
use proptest::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Gamma};

fn gamma_samples(n: usize, seed: u64) -> Vec<f64> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let gamma = Gamma::new(2.0, 2.0).unwrap();
    (0..n).map(|_| gamma.sample(&mut rng)).collect()
}

fn daily_series(years: i64, seed: u64) -> TimeSeries {
    let start = NaiveDate::from_ymd_opt(2001, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
    let n = (365 * years) as usize;
    let index = (0..n as i64).map(|d| start + Duration::days(d)).collect();
    TimeSeries::from_datetimes(index, gamma_samples(n, seed)).unwrap()
}

#[test]
fn fdc_of_twenty_samples_is_k_over_21() {
    let x = gamma_samples(20, 42);
    let curve = flow_duration_curve(&x, true).unwrap();
    for (k, p) in curve.probability.iter().enumerate() {
        assert_relative_eq!(*p, (k + 1) as f64 / 21.0, epsilon = 1e-12);
    }
    // discharge is reordered alongside, so it is ascending as well
    assert!(curve.discharge.windows(2).all(|w| w[0] <= w[1]));

    let reversed = flow_duration_curve(&x, false).unwrap();
    let mut expected = curve.probability.clone();
    expected.reverse();
    assert_eq!(reversed.probability, expected);
}

#[test]
fn fdc_per_column() {
    let data = gamma_samples(60, 7);
    let matrix = Array2::from_shape_vec((20, 3), data).unwrap();
    let out = flow_duration_curves(matrix.view(), true).unwrap();
    for column in out.columns() {
        for (k, p) in column.iter().enumerate() {
            assert_relative_eq!(*p, (k + 1) as f64 / 21.0, epsilon = 1e-12);
        }
    }
}

#[test]
fn regime_median_and_mean_differ() {
    let series = daily_series(3, 2409);
    let median = regime(&series, &RegimeOptions::default()).unwrap();
    let mean = regime(&series, &RegimeOptions::default().with_agg(Aggregation::Mean)).unwrap();

    assert_eq!(median.months, (1..=12).collect::<Vec<u32>>());
    assert_eq!(median.aggregate().len(), 12);
    assert_ne!(median.aggregate(), mean.aggregate());
    // gamma(2, 2) is right skewed, so monthly means exceed medians
    let above = median
        .aggregate()
        .iter()
        .zip(mean.aggregate())
        .filter(|(m, a)| a > m)
        .count();
    assert!(above >= 8);
}

/// 2001-2003 daily, `month + day^2 / 100`
fn calendar_series() -> TimeSeries {
    let start = NaiveDate::from_ymd_opt(2001, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
    let index: Vec<_> = (0..365 * 3).map(|d| start + Duration::days(d)).collect();
    let values = index
        .iter()
        .map(|t| f64::from(t.month()) + f64::from(t.day() * t.day()) / 100.0)
        .collect();
    TimeSeries::from_datetimes(index, values).unwrap()
}

const CALENDAR_MEDIAN: [f64; 12] = [
    3.56, 4.105, 5.56, 6.405, 7.56, 8.405, 9.56, 10.56, 11.405, 12.56, 13.405, 14.56,
];
const CALENDAR_MEAN: [f64; 12] = [
    4.36,
    4.755,
    6.36,
    7.151_666_666_666_667,
    8.36,
    9.151_666_666_666_667,
    10.36,
    11.36,
    12.151_666_666_666_667,
    13.36,
    14.151_666_666_666_667,
    15.36,
];

#[test]
fn regime_of_calendar_values() {
    let series = calendar_series();
    let median = regime(&series, &RegimeOptions::default()).unwrap();
    let mean = regime(&series, &RegimeOptions::default().with_agg(Aggregation::Mean)).unwrap();

    assert_eq!(median.months, (1..=12).collect::<Vec<u32>>());
    for (got, want) in median.aggregate().iter().zip(CALENDAR_MEDIAN) {
        assert_relative_eq!(*got, want, epsilon = 1e-12);
    }
    assert_eq!(mean.aggregate().len(), 12);
    for (got, want) in mean.aggregate().iter().zip(CALENDAR_MEAN) {
        assert_relative_eq!(*got, want, epsilon = 1e-12);
    }
}

#[test]
fn regime_normalization_divides_by_overall_aggregate() {
    let series = daily_series(3, 2409);
    for agg in [Aggregation::NanMedian, Aggregation::Mean] {
        let plain = regime(&series, &RegimeOptions::default().with_agg(agg.clone())).unwrap();
        let normalized = regime(
            &series,
            &RegimeOptions::default().with_agg(agg.clone()).with_normalize(true),
        )
        .unwrap();
        let overall = agg.apply(plain.aggregate());
        for (n, v) in normalized.aggregate().iter().zip(plain.aggregate()) {
            assert_relative_eq!(*n, v / overall, epsilon = 1e-12);
        }
    }
}

#[test]
fn regime_quantile_columns_are_ordered() {
    let series = daily_series(3, 11);
    let opts = RegimeOptions::default().with_percentiles(Percentiles::Count(4));
    let table = regime(&series, &opts).unwrap();
    let names: Vec<&str> = table.columns.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["nanmedian", "q20", "q40", "q60", "q80"]);
    let m = table.to_array2();
    for row in m.rows() {
        assert!(row[1] <= row[2] && row[2] <= row[3] && row[3] <= row[4]);
    }
}

#[test]
fn richards_baker_is_representation_independent() {
    let values = gamma_samples(1000, 2409);
    let series = TimeSeries::from_values(values.clone()).with_name("q");
    assert_eq!(richards_baker(&values).unwrap(), richards_baker(&series).unwrap());
}

#[test]
fn plots_render_as_html() {
    let ctx = PlotContext::new(Backend::Html).unwrap();
    let opts = PlotOptions::default();

    let fig = plot_flow_duration_curve(&gamma_samples(50, 3), true, true, &ctx, &opts).unwrap();
    assert!(matches!(&fig, Figure::Html(page) if page.contains("loglog FDC")));

    let series = daily_series(2, 5);
    let opts_q = RegimeOptions::default().with_percentiles(Percentiles::List(vec![10.0, 90.0]));
    let fig = plot_regime(&series, &opts_q, &ctx, &opts).unwrap();
    assert!(matches!(&fig, Figure::Html(page) if page.contains("q10-q90")));
}

proptest! {
    #[test]
    fn fdc_probabilities_are_bounded(values in proptest::collection::vec(0.0f64..1000.0, 1..100)) {
        let curve = flow_duration_curve(&values, true).unwrap();
        prop_assert_eq!(curve.len(), values.len());
        prop_assert!(curve.probability.iter().all(|p| *p > 0.0 && *p < 1.0));
        prop_assert!(curve.probability.windows(2).all(|w| w[0] <= w[1]));
    }
}
