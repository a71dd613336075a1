use analytics::mean;
use serde::{Deserialize, Serialize};

/// One fixed-width bin of the daily-return histogram. Buckets are
/// contiguous: each bucket's `to` is the next bucket's `from`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributionBucket {
    pub from: f64,
    pub to: f64,
    pub count: usize,
    /// Share of all observations in this bucket, in percent.
    pub percentage: f64,
}

/// Moment statistics, tail shares, and the bucketed histogram of a
/// daily-return sample.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReturnDistribution {
    pub observations: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub skewness: f64,
    /// Excess kurtosis (Fisher); a normal sample reports near zero.
    pub kurtosis: f64,
    /// Share of days with a return above +1%, in percent.
    pub pct_gt_1pct: f64,
    /// Share of days with a return below -1%, in percent.
    pub pct_lt_minus_1pct: f64,
    pub positive_days: usize,
    pub negative_days: usize,
    pub zero_days: usize,
    pub best_day: f64,
    pub worst_day: f64,
    pub buckets: Vec<DistributionBucket>,
}

/// Analyzes a daily-return sample into moments, tails, and a histogram
/// of `bucket_count` contiguous fixed-width bins spanning [min, max].
///
/// Fewer than two observations degrade to zero buckets and zeroed
/// moments; an all-equal sample yields a single zero-width bucket
/// holding every observation.
pub fn analyze_returns(returns: &[f64], bucket_count: usize) -> ReturnDistribution {
    let mut dist = ReturnDistribution { observations: returns.len(), ..Default::default() };
    if returns.len() < 2 {
        return dist;
    }

    dist.mean = mean(returns);
    let n = returns.len() as f64;
    let variance = returns.iter().map(|r| (r - dist.mean).powi(2)).sum::<f64>() / n;
    dist.std_dev = variance.sqrt();
    if dist.std_dev > 0.0 {
        dist.skewness =
            returns.iter().map(|r| ((r - dist.mean) / dist.std_dev).powi(3)).sum::<f64>() / n;
        dist.kurtosis =
            returns.iter().map(|r| ((r - dist.mean) / dist.std_dev).powi(4)).sum::<f64>() / n - 3.0;
    }

    dist.positive_days = returns.iter().filter(|&&r| r > 0.0).count();
    dist.negative_days = returns.iter().filter(|&&r| r < 0.0).count();
    dist.zero_days = returns.len() - dist.positive_days - dist.negative_days;
    dist.best_day = returns.iter().copied().fold(f64::MIN, f64::max);
    dist.worst_day = returns.iter().copied().fold(f64::MAX, f64::min);
    dist.pct_gt_1pct = returns.iter().filter(|&&r| r > 0.01).count() as f64 / n * 100.0;
    dist.pct_lt_minus_1pct = returns.iter().filter(|&&r| r < -0.01).count() as f64 / n * 100.0;

    dist.buckets = build_buckets(returns, dist.worst_day, dist.best_day, bucket_count);
    dist
}

fn build_buckets(returns: &[f64], min: f64, max: f64, bucket_count: usize) -> Vec<DistributionBucket> {
    let n = returns.len() as f64;
    if bucket_count == 0 {
        return Vec::new();
    }
    if min == max {
        // Degenerate all-equal sample: one zero-width bucket.
        return vec![DistributionBucket {
            from: min,
            to: max,
            count: returns.len(),
            percentage: 100.0,
        }];
    }

    // Shared edges keep adjacent buckets exactly contiguous.
    let width = (max - min) / bucket_count as f64;
    let edges: Vec<f64> = (0..=bucket_count).map(|i| min + i as f64 * width).collect();

    let mut counts = vec![0usize; bucket_count];
    for &r in returns {
        let index = (((r - min) / width) as usize).min(bucket_count - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| DistributionBucket {
            from: edges[i],
            to: edges[i + 1],
            count,
            percentage: count as f64 / n * 100.0,
        })
        .collect()
}
