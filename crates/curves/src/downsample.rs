use chrono::Datelike;
use core_types::CurvePoint;
use rust_decimal::prelude::*;

/// Indices kept by a largest-triangle-three-buckets pass over `(x, y)`
/// samples. The first and last samples are always kept; the interior is
/// split into `max_points - 2` equal-width buckets and each bucket
/// contributes the point forming the largest triangle with the
/// previously kept point and the average of the next bucket.
fn select_indices(xs: &[f64], ys: &[f64], max_points: usize) -> Vec<usize> {
    let len = xs.len();
    let bucket_count = max_points - 2;
    let span = (len - 2) as f64 / bucket_count as f64;

    let mut kept = Vec::with_capacity(max_points);
    kept.push(0);
    let mut prev = 0usize;

    for bucket in 0..bucket_count {
        let start = (bucket as f64 * span) as usize + 1;
        let end = ((bucket as f64 + 1.0) * span) as usize + 1;

        // The anchor on the far side is the next bucket's average, or
        // the final point when this is the last bucket.
        let (next_start, next_end) = if bucket + 1 < bucket_count {
            (end, (((bucket as f64 + 2.0) * span) as usize + 1).min(len - 1))
        } else {
            (len - 1, len)
        };
        let next_len = (next_end - next_start).max(1) as f64;
        let avg_x = xs[next_start..next_end].iter().sum::<f64>() / next_len;
        let avg_y = ys[next_start..next_end].iter().sum::<f64>() / next_len;

        let mut best = start;
        let mut best_area = -1.0f64;
        for i in start..end.min(len - 1) {
            let area = ((xs[prev] - avg_x) * (ys[i] - ys[prev])
                - (xs[prev] - xs[i]) * (avg_y - ys[prev]))
                .abs()
                * 0.5;
            if area > best_area {
                best_area = area;
                best = i;
            }
        }
        kept.push(best);
        prev = best;
    }

    kept.push(len - 1);
    kept
}

/// Row indices a largest-triangle-three-buckets pass over the curve
/// keeps. The combined series drives point selection and the x
/// coordinate is the day ordinal, which weights calendar gaps
/// correctly; callers reduce any row-aligned companion series (the
/// drawdown curve in particular) with the same selection.
///
/// A curve that already fits keeps every row, and `max_points` below 3
/// degrades to just the endpoints.
pub fn downsample_indices(curve: &[CurvePoint], max_points: usize) -> Vec<usize> {
    if curve.len() <= max_points || curve.len() < 3 {
        return (0..curve.len()).collect();
    }
    if max_points < 3 {
        return vec![0, curve.len() - 1];
    }

    let xs: Vec<f64> = curve.iter().map(|p| f64::from(p.date.num_days_from_ce())).collect();
    let ys: Vec<f64> = curve.iter().map(|p| p.combined.to_f64().unwrap_or(0.0)).collect();

    select_indices(&xs, &ys, max_points)
}

/// Reduces a curve to at most `max_points` rows while preserving its
/// visual shape; the rows kept are exactly [`downsample_indices`].
pub fn downsample_curve(curve: &[CurvePoint], max_points: usize) -> Vec<CurvePoint> {
    downsample_indices(curve, max_points).into_iter().map(|i| curve[i]).collect()
}
