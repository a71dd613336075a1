use chrono::NaiveDate;
use core_types::{CurvePoint, DailyBuckets, DrawdownPoint, SeriesKind};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Materializes one series over the shared date axis according to its
/// fill rule.
///
/// A `Flow` series is the running prefix-sum of its daily values, with
/// absent days contributing zero. A `Level` series carries the last
/// observed value forward and is converted to a delta against the first
/// observed value; axis dates before that first observation therefore
/// sit at zero.
fn fill_series(
    axis: &[NaiveDate],
    series: &BTreeMap<NaiveDate, Decimal>,
    kind: SeriesKind,
) -> Vec<Decimal> {
    match kind {
        SeriesKind::Flow => {
            let mut running = Decimal::ZERO;
            axis.iter()
                .map(|date| {
                    running += series.get(date).copied().unwrap_or(Decimal::ZERO);
                    running
                })
                .collect()
        }
        SeriesKind::Level => {
            let first = series.values().next().copied().unwrap_or(Decimal::ZERO);
            let mut last = first;
            axis.iter()
                .map(|date| {
                    if let Some(value) = series.get(date) {
                        last = *value;
                    }
                    last - first
                })
                .collect()
        }
    }
}

/// The canonical curve constructor.
///
/// Builds the union of all dates across the four bucket maps (no date
/// is dropped, even when only one series has data that day), fills each
/// series per its kind, and re-bases every series so its first output
/// value is exactly zero.
///
/// Empty buckets produce an empty curve; a single-point curve is valid.
pub fn build_equity_curves(buckets: &DailyBuckets) -> Vec<CurvePoint> {
    let axis: Vec<NaiveDate> = buckets
        .combined
        .keys()
        .chain(buckets.swing.keys())
        .chain(buckets.intraday.keys())
        .chain(buckets.benchmark.keys())
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    if axis.is_empty() {
        return Vec::new();
    }

    let combined = fill_series(&axis, &buckets.combined, SeriesKind::Flow);
    let swing = fill_series(&axis, &buckets.swing, SeriesKind::Flow);
    let intraday = fill_series(&axis, &buckets.intraday, SeriesKind::Flow);
    let benchmark = fill_series(&axis, &buckets.benchmark, SeriesKind::Level);

    let base = (combined[0], swing[0], intraday[0], benchmark[0]);
    debug!(points = axis.len(), "built equity curve axis");

    axis.iter()
        .enumerate()
        .map(|(i, &date)| CurvePoint {
            date,
            combined: combined[i] - base.0,
            swing: swing[i] - base.1,
            intraday: intraday[i] - base.2,
            benchmark: benchmark[i] - base.3,
        })
        .collect()
}

/// Derives the running-peak drawdown curve from a normalized equity
/// curve. Four independent running maxima, one forward scan; every
/// output value is `value - runningPeak`, so zero marks a fresh high.
pub fn build_drawdown_curves(curve: &[CurvePoint]) -> Vec<DrawdownPoint> {
    if curve.is_empty() {
        return Vec::new();
    }

    let mut peak_combined = curve[0].combined;
    let mut peak_swing = curve[0].swing;
    let mut peak_intraday = curve[0].intraday;
    let mut peak_benchmark = curve[0].benchmark;

    curve
        .iter()
        .map(|point| {
            peak_combined = peak_combined.max(point.combined);
            peak_swing = peak_swing.max(point.swing);
            peak_intraday = peak_intraday.max(point.intraday);
            peak_benchmark = peak_benchmark.max(point.benchmark);
            DrawdownPoint {
                date: point.date,
                combined: point.combined - peak_combined,
                swing: point.swing - peak_swing,
                intraday: point.intraday - peak_intraday,
                benchmark: point.benchmark - peak_benchmark,
            }
        })
        .collect()
}
