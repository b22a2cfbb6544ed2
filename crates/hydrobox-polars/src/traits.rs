//! Extension trait for hydrobox operations on Polars DataFrames

use polars::prelude::*;
use tracing::{debug, instrument};

use hydrobox_core::{Aggregation, TimeFrame, TimeSeries};
use hydrobox_discharge::{flow_duration_curve, richards_baker, regime, RegimeOptions};
use hydrobox_preprocessing::aggregate_frame;

use crate::convert::{float_values, index, timeframe_to_dataframe};
use crate::Result;

/// Discharge analysis and preprocessing directly on DataFrame columns
pub trait HydroFrameExt {
    /// Read `value_column` as a series, indexed by `time_column` when given
    fn to_timeseries(&self, time_column: Option<&str>, value_column: &str) -> Result<TimeSeries>;

    /// Read `columns` into a frame sharing one index
    fn to_timeframe(&self, time_column: Option<&str>, columns: &[&str]) -> Result<TimeFrame>;

    /// Flow duration curve per column
    ///
    /// # Returns
    /// DataFrame with columns `{column}_probability` and `{column}_discharge`.
    /// Columns with missing values have shorter curves and are padded with
    /// nulls.
    fn flow_duration_curves(&self, columns: &[&str], non_exceeding: bool) -> Result<DataFrame>;

    /// Monthly regime of `value_column`
    ///
    /// # Returns
    /// DataFrame with a `month` column followed by the aggregate and
    /// percentile columns of the regime table
    fn regime(&self, time_column: &str, value_column: &str, options: &RegimeOptions) -> Result<DataFrame>;

    /// Richards-Baker flashiness index per column
    ///
    /// # Returns
    /// Single-row DataFrame with columns `{column}_richards_baker`
    fn richards_baker(&self, columns: &[&str]) -> Result<DataFrame>;

    /// Aggregate `columns` to the frequency `by` (e.g. `"1M"`)
    ///
    /// # Returns
    /// DataFrame with the bin start in `time_column` and one aggregated
    /// column per input column
    fn aggregate(&self, time_column: &str, columns: &[&str], by: &str, agg: &Aggregation) -> Result<DataFrame>;
}

fn padded(values: Vec<f64>, height: usize) -> Vec<Option<f64>> {
    let n = values.len();
    values.into_iter().map(Some).chain(std::iter::repeat(None).take(height - n)).collect()
}

impl HydroFrameExt for DataFrame {
    fn to_timeseries(&self, time_column: Option<&str>, value_column: &str) -> Result<TimeSeries> {
        let series = TimeSeries::new(index(self, time_column)?, float_values(self, value_column)?)?;
        Ok(series.with_name(value_column))
    }

    fn to_timeframe(&self, time_column: Option<&str>, columns: &[&str]) -> Result<TimeFrame> {
        let frame = TimeFrame::new(index(self, time_column)?);
        columns.iter().try_fold(frame, |frame, name| {
            Ok(frame.with_column(*name, float_values(self, name)?)?)
        })
    }

    #[instrument(skip(self), fields(rows = self.height()))]
    fn flow_duration_curves(&self, columns: &[&str], non_exceeding: bool) -> Result<DataFrame> {
        let curves = columns
            .iter()
            .map(|name| Ok(flow_duration_curve(&float_values(self, name)?, non_exceeding)?))
            .collect::<Result<Vec<_>>>()?;
        let height = curves.iter().map(|c| c.len()).max().unwrap_or(0);

        let mut out: Vec<Column> = Vec::with_capacity(2 * columns.len());
        for (name, curve) in columns.iter().zip(curves) {
            out.push(
                Series::new(PlSmallStr::from(format!("{name}_probability")), padded(curve.probability, height)).into(),
            );
            out.push(Series::new(PlSmallStr::from(format!("{name}_discharge")), padded(curve.discharge, height)).into());
        }
        Ok(DataFrame::new(out)?)
    }

    #[instrument(skip(self, options), fields(rows = self.height()))]
    fn regime(&self, time_column: &str, value_column: &str, options: &RegimeOptions) -> Result<DataFrame> {
        let series = self.to_timeseries(Some(time_column), value_column)?;
        let table = regime(&series, options)?;

        let mut out: Vec<Column> = vec![Series::new(PlSmallStr::from("month"), table.months).into()];
        for (name, values) in table.columns {
            out.push(Series::new(PlSmallStr::from(name), values).into());
        }
        Ok(DataFrame::new(out)?)
    }

    fn richards_baker(&self, columns: &[&str]) -> Result<DataFrame> {
        let out = columns
            .iter()
            .map(|name| {
                let index = richards_baker(&float_values(self, name)?)?;
                Ok(Series::new(PlSmallStr::from(format!("{name}_richards_baker")), vec![index]).into())
            })
            .collect::<Result<Vec<Column>>>()?;
        Ok(DataFrame::new(out)?)
    }

    #[instrument(skip(self, agg), fields(rows = self.height(), agg = %agg))]
    fn aggregate(&self, time_column: &str, columns: &[&str], by: &str, agg: &Aggregation) -> Result<DataFrame> {
        let frame = self.to_timeframe(Some(time_column), columns)?;
        let aggregated = aggregate_frame(&frame, by, agg)?;
        debug!(bins = aggregated.n_rows(), "frame aggregated");
        timeframe_to_dataframe(&aggregated, time_column)
    }
}
