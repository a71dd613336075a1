use crate::engine::{mean, sample_std_dev};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Full-period market sensitivity of a strategy series against the
/// benchmark series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BetaAlpha {
    /// Covariance with the benchmark over the benchmark's variance.
    pub beta: f64,
    /// Annualized excess return not explained by the benchmark.
    pub alpha: f64,
}

/// Dated day-over-day fractional returns of a dated level series
/// (prices or equity), dated at the later point of each pair. A zero
/// previous level contributes a zero return.
pub fn dated_returns(series: &[(NaiveDate, f64)]) -> Vec<(NaiveDate, f64)> {
    series
        .windows(2)
        .map(|w| (w[1].0, if w[0].1 == 0.0 { 0.0 } else { w[1].1 / w[0].1 - 1.0 }))
        .collect()
}

/// Annualized volatility over a sliding window of dated daily returns.
///
/// Each output point is dated at the window's last return; nothing is
/// emitted until `window` observations exist, so the result holds
/// exactly `returns.len() - window + 1` points.
pub fn rolling_volatility(
    returns: &[(NaiveDate, f64)],
    window: usize,
    trading_days_per_year: u32,
) -> Vec<(NaiveDate, f64)> {
    if window < 2 || returns.len() < window {
        return Vec::new();
    }
    let annualize = f64::from(trading_days_per_year).sqrt();
    returns
        .windows(window)
        .map(|w| {
            let values: Vec<f64> = w.iter().map(|&(_, r)| r).collect();
            (w[window - 1].0, sample_std_dev(&values) * annualize)
        })
        .collect()
}

/// Annualized Sharpe over a sliding window of dated daily returns;
/// windows without volatility report 0. Same alignment contract as
/// [`rolling_volatility`].
pub fn rolling_sharpe(
    returns: &[(NaiveDate, f64)],
    window: usize,
    daily_risk_free: f64,
    trading_days_per_year: u32,
) -> Vec<(NaiveDate, f64)> {
    if window < 2 || returns.len() < window {
        return Vec::new();
    }
    let annualize = f64::from(trading_days_per_year).sqrt();
    returns
        .windows(window)
        .map(|w| {
            let values: Vec<f64> = w.iter().map(|&(_, r)| r).collect();
            let vol = sample_std_dev(&values);
            let value = if vol < 1e-12 {
                0.0
            } else {
                annualize * (mean(&values) - daily_risk_free) / vol
            };
            (w[window - 1].0, value)
        })
        .collect()
}

/// Full-period beta and annualized alpha of the strategy's daily
/// returns against the benchmark's, joined on date.
///
/// Returns `None` when fewer than two dates overlap or the benchmark
/// has no variance, since beta is undefined in both cases.
pub fn beta_alpha(
    strategy: &[(NaiveDate, f64)],
    benchmark: &[(NaiveDate, f64)],
    trading_days_per_year: u32,
) -> Option<BetaAlpha> {
    let by_date: BTreeMap<NaiveDate, f64> = benchmark.iter().copied().collect();
    let pairs: Vec<(f64, f64)> = strategy
        .iter()
        .filter_map(|&(date, r)| by_date.get(&date).map(|&b| (r, b)))
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_s = pairs.iter().map(|&(s, _)| s).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|&(_, b)| b).sum::<f64>() / n;
    let covariance =
        pairs.iter().map(|&(s, b)| (s - mean_s) * (b - mean_b)).sum::<f64>() / n;
    let variance = pairs.iter().map(|&(_, b)| (b - mean_b) * (b - mean_b)).sum::<f64>() / n;
    if variance == 0.0 {
        return None;
    }

    let beta = covariance / variance;
    let alpha = (mean_s - beta * mean_b) * f64::from(trading_days_per_year);
    Some(BetaAlpha { beta, alpha })
}
