//! HydroFrameExt on small hand-checked frames

mod common;

use approx::assert_relative_eq;
use hydrobox_core::{Aggregation, Index, TimeSeries};
use hydrobox_discharge::{Percentiles, RegimeOptions};
use hydrobox_polars::{timeseries_to_dataframe, Error, HydroFrameExt};
use polars::prelude::*;

#[test]
fn fdc_columns_are_padded_per_column() -> anyhow::Result<()> {
    let df = DataFrame::new(vec![
        Series::new(PlSmallStr::from("a"), vec![3.0, 1.0, 2.0, 4.0]).into(),
        Series::new(PlSmallStr::from("b"), vec![Some(1.0), None, Some(5.0), Some(2.0)]).into(),
    ])?;
    let fdc = df.flow_duration_curves(&["a", "b"], true)?;
    assert_eq!(fdc.shape(), (4, 4));

    let p: Vec<Option<f64>> = fdc.column("a_probability")?.f64()?.into_iter().collect();
    assert_eq!(p, vec![Some(0.2), Some(0.4), Some(0.6), Some(0.8)]);
    let q: Vec<Option<f64>> = fdc.column("b_discharge")?.f64()?.into_iter().collect();
    assert_eq!(q, vec![Some(1.0), Some(2.0), Some(5.0), None]);
    Ok(())
}

#[test]
fn regime_of_monthly_steps() -> anyhow::Result<()> {
    let df = common::monthly_steps();
    let options = RegimeOptions::default().with_percentiles(Percentiles::List(vec![25.0, 75.0]));
    let out = df.regime("date", "q", &options)?;
    assert_eq!(out.height(), 12);
    assert_eq!(out.width(), 4);

    let months: Vec<Option<u32>> = out.column("month")?.u32()?.into_iter().collect();
    let agg = out.column(options.agg.name())?.f64()?;
    for (m, v) in months.iter().zip(agg.into_iter()) {
        assert_relative_eq!(v.unwrap(), m.unwrap() as f64);
    }
    Ok(())
}

#[test]
fn monthly_aggregate_keeps_the_time_column() -> anyhow::Result<()> {
    let df = common::monthly_steps();
    let out = df.aggregate("date", &["q"], "1M", &Aggregation::Mean)?;
    assert_eq!(out.height(), 36);
    assert!(matches!(out.column("date")?.dtype(), DataType::Datetime(_, _)));
    let q: Vec<f64> = out.column("q")?.f64()?.into_no_null_iter().collect();
    assert_eq!(q[0], 1.0);
    assert_eq!(q[13], 2.0);
    Ok(())
}

#[test]
fn series_roundtrip_through_a_dataframe() -> anyhow::Result<()> {
    let df = common::monthly_steps();
    let series = df.to_timeseries(Some("date"), "q")?;
    assert_eq!(series.name(), Some("q"));

    let back = timeseries_to_dataframe(&series, "time")?;
    assert_eq!(back.get_column_names_str(), vec!["time", "q"]);
    assert_eq!(back.to_timeseries(Some("time"), "q")?, series);
    Ok(())
}

#[test]
fn range_index_without_time_column() -> anyhow::Result<()> {
    let series = TimeSeries::from_values(vec![1.0, 3.0, 2.0]);
    let df = timeseries_to_dataframe(&series, "time")?;
    assert_eq!(df.get_column_names_str(), vec!["value"]);
    let back = df.to_timeseries(None, "value")?;
    assert_eq!(back.index(), &Index::Range(3));

    assert!(matches!(
        df.richards_baker(&["value"])?.column("value_richards_baker")?.f64()?.get(0),
        Some(v) if v > 0.0
    ));
    Ok(())
}

#[test]
fn wrong_column_types_are_reported() {
    let df = common::monthly_steps();
    assert!(matches!(df.richards_baker(&["date"]), Err(Error::TypeMismatch { .. })));
    assert!(matches!(df.to_timeseries(Some("q"), "q"), Err(Error::TypeMismatch { .. })));
    assert!(matches!(df.richards_baker(&["nope"]), Err(Error::InvalidColumn(_))));
}
