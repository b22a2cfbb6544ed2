//! Aggregation of datetime-indexed data to a coarser frequency

use chrono::NaiveDateTime;
use tracing::{debug, instrument};

use hydrobox_core::{Aggregation, Error, Index, Result, TimeFrame, TimeSeries};

use crate::frequency::Frequency;

const MAX_BINS: usize = 10_000_000;

/// Observation positions grouped into contiguous bins
struct Bins {
    labels: Vec<NaiveDateTime>,
    members: Vec<Vec<usize>>,
}

impl Bins {
    fn build(index: &[NaiveDateTime], freq: Frequency) -> Result<Self> {
        let Some(first) = index.iter().min().copied() else {
            return Ok(Self {
                labels: Vec::new(),
                members: Vec::new(),
            });
        };
        let origin = freq.origin(first)?;
        let bins: Vec<i64> = index.iter().map(|&t| freq.bin(origin, t)).collect();
        let span = bins.iter().max().map_or(0, |b| b + 1);
        let n_bins = usize::try_from(span)
            .ok()
            .filter(|&n| n <= MAX_BINS)
            .ok_or_else(|| {
                Error::InvalidParameter(format!(
                    "aggregate(...): arg by: {freq} spans {span} bins, at most {MAX_BINS} are supported"
                ))
            })?;

        let mut members = vec![Vec::new(); n_bins];
        for (i, b) in bins.into_iter().enumerate() {
            members[b as usize].push(i);
        }
        let labels = (0..n_bins as i64)
            .map(|k| freq.label(origin, k))
            .collect::<Option<Vec<_>>>()
            .ok_or_else(|| Error::Computation(format!("bin labels for {freq} overflow")))?;

        Ok(Self { labels, members })
    }

    fn reduce(&self, values: &[f64], agg: &Aggregation) -> Vec<f64> {
        self.members
            .iter()
            .map(|m| {
                if m.is_empty() {
                    f64::NAN
                } else {
                    agg.apply(&m.iter().map(|&i| values[i]).collect::<Vec<f64>>())
                }
            })
            .collect()
    }
}

fn parse_frequency(by: &str) -> Result<Frequency> {
    by.parse().map_err(|e: Error| {
        Error::InvalidParameter(format!("aggregate(...): arg by: {e}"))
    })
}

/// Aggregate `x` to the frequency `by` (e.g. `"1M"`, `"3D"`, `"15min"`).
///
/// Bins are contiguous from the floor of the earliest timestamp and are
/// labelled with their start. A bin without observations is NaN.
#[instrument(skip(x, agg), fields(n = x.len(), agg = %agg))]
pub fn aggregate(x: &TimeSeries, by: &str, agg: &Aggregation) -> Result<TimeSeries> {
    let index = x.require_datetime("aggregate")?;
    let bins = Bins::build(index, parse_frequency(by)?)?;
    let values = bins.reduce(x.values(), agg);
    debug!(bins = values.len(), "series aggregated");

    let out = TimeSeries::from_datetimes(bins.labels, values)?;
    Ok(match x.name() {
        Some(name) => out.with_name(name),
        None => out,
    })
}

/// [`aggregate`] applied to every column of a frame
#[instrument(skip(x, agg), fields(rows = x.n_rows(), agg = %agg))]
pub fn aggregate_frame(x: &TimeFrame, by: &str, agg: &Aggregation) -> Result<TimeFrame> {
    let index = x
        .index()
        .datetimes()
        .ok_or_else(|| Error::not_datetime_indexed("aggregate"))?;
    let bins = Bins::build(index, parse_frequency(by)?)?;

    let frame = TimeFrame::new(Index::Datetime(bins.labels.clone()));
    x.columns().try_fold(frame, |frame, (name, values)| {
        frame.with_column(name, bins.reduce(values, agg))
    })
}
