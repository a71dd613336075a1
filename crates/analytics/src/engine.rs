use crate::report::{MetricsBundle, RuinEstimate, TradeStats};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use tracing::trace;

/// Volatility below this is floating-point noise from a constant
/// return stream and is reported as exactly zero.
const VOL_EPSILON: f64 = 1e-12;

/// A stateless calculator for the full performance-metric battery.
///
/// The struct holds only statistical conventions; `calculate` is a pure
/// function of its inputs. Degenerate inputs produce the documented
/// zero/neutral values rather than errors, and no output is ever NaN.
#[derive(Debug, Clone)]
pub struct MetricsEngine {
    /// Annualization convention for daily statistics.
    pub trading_days_per_year: u32,
    /// Annual risk-free rate as a fraction.
    pub risk_free_rate: f64,
}

impl Default for MetricsEngine {
    fn default() -> Self {
        Self { trading_days_per_year: 252, risk_free_rate: 0.0 }
    }
}

impl MetricsEngine {
    pub fn new(trading_days_per_year: u32, risk_free_rate: f64) -> Self {
        Self { trading_days_per_year, risk_free_rate }
    }

    fn periods(&self) -> f64 {
        f64::from(self.trading_days_per_year)
    }

    fn daily_risk_free(&self) -> f64 {
        self.risk_free_rate / self.periods()
    }

    /// The main entry point: derives every metric of the bundle from a
    /// chronologically ordered equity curve (absolute account values),
    /// the per-trade PnL list, and the capital base.
    pub fn calculate(
        &self,
        equity: &[(NaiveDate, f64)],
        trade_pnls: &[Decimal],
        balance: Decimal,
    ) -> MetricsBundle {
        let mut bundle = MetricsBundle::new();

        let values: Vec<f64> = equity.iter().map(|&(_, v)| v).collect();
        let returns = daily_returns(&values);

        bundle.total_return = total_return(&values);
        bundle.annualized_return =
            annualized_return(bundle.total_return, returns.len(), self.trading_days_per_year);
        bundle.mean_daily_return = mean(&returns);

        let raw_vol = sample_std_dev(&returns);
        bundle.daily_volatility = if raw_vol < VOL_EPSILON { 0.0 } else { raw_vol };
        bundle.annualized_volatility = bundle.daily_volatility * self.periods().sqrt();

        bundle.sharpe = sharpe(&returns, self.daily_risk_free(), self.trading_days_per_year);
        bundle.sortino = sortino(&returns, self.daily_risk_free(), self.trading_days_per_year);

        let (dd_pct, dd_dollars) = max_drawdown(&values);
        bundle.max_drawdown = dd_pct;
        bundle.max_drawdown_dollars = dd_dollars;
        bundle.calmar = ratio_or_zero(bundle.annualized_return, dd_pct.abs());
        // The MAR ratio is the full-period variant of Calmar; with one
        // observation window the two coincide.
        bundle.mar_ratio = bundle.calmar;
        bundle.ulcer_index = ulcer_index(&values);

        bundle.trades = trade_stats(trade_pnls);
        let net_profit = bundle.trades.net_profit.to_f64().unwrap_or(0.0);
        bundle.recovery_factor = ratio_or_zero(net_profit, dd_dollars.abs());
        bundle.kelly_pct = kelly_pct(bundle.trades.win_rate, bundle.trades.payoff_ratio);
        bundle.risk_of_ruin = risk_of_ruin(
            bundle.trades.win_rate,
            bundle.trades.payoff_ratio,
            bundle.trades.average_loss,
            balance.to_f64().unwrap_or(0.0),
        );

        let (monthly, quarterly) = consistency(equity);
        bundle.monthly_consistency_pct = monthly;
        bundle.quarterly_consistency_pct = quarterly;

        trace!(
            points = equity.len(),
            trades = trade_pnls.len(),
            sharpe = bundle.sharpe,
            "computed metrics bundle"
        );
        bundle
    }
}

/// Day-over-day fractional returns. A zero previous value contributes a
/// zero return instead of dividing by zero.
pub fn daily_returns(equity: &[f64]) -> Vec<f64> {
    equity
        .windows(2)
        .map(|w| if w[0] == 0.0 { 0.0 } else { w[1] / w[0] - 1.0 })
        .collect()
}

/// Total fractional return over the curve; 0 for fewer than two points
/// or a zero starting value.
pub fn total_return(equity: &[f64]) -> f64 {
    if equity.len() < 2 || equity[0] == 0.0 {
        return 0.0;
    }
    equity[equity.len() - 1] / equity[0] - 1.0
}

/// Geometric annualization of a total return observed over `intervals`
/// daily steps. The base is clamped at zero so a total loss of 100% or
/// more yields exactly -1 rather than NaN.
pub fn annualized_return(total: f64, intervals: usize, trading_days_per_year: u32) -> f64 {
    if intervals == 0 {
        return 0.0;
    }
    let base = (1.0 + total).max(0.0);
    base.powf(f64::from(trading_days_per_year) / intervals as f64) - 1.0
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 divisor); 0 for fewer than two
/// observations.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Annualized Sharpe ratio over daily returns; exactly 0 when the
/// return stream has no volatility.
pub fn sharpe(returns: &[f64], daily_risk_free: f64, trading_days_per_year: u32) -> f64 {
    let vol = sample_std_dev(returns);
    if vol < VOL_EPSILON {
        return 0.0;
    }
    f64::from(trading_days_per_year).sqrt() * (mean(returns) - daily_risk_free) / vol
}

/// Annualized Sortino ratio: the Sharpe numerator over the downside
/// deviation (standard deviation of the negative returns only). 0 when
/// there are no negative returns.
pub fn sortino(returns: &[f64], daily_risk_free: f64, trading_days_per_year: u32) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let downside_sq: Vec<f64> = returns.iter().filter(|&&r| r < 0.0).map(|r| r * r).collect();
    if downside_sq.is_empty() {
        return 0.0;
    }
    let downside = (downside_sq.iter().sum::<f64>() / downside_sq.len() as f64).sqrt();
    if downside < VOL_EPSILON {
        return 0.0;
    }
    f64::from(trading_days_per_year).sqrt() * (mean(returns) - daily_risk_free) / downside
}

/// Maximum drawdown over the curve as `(fraction, dollars)`, both less
/// than or equal to zero. The percentage leg guards a non-positive
/// peak; a non-declining or empty curve reports (0, 0).
pub fn max_drawdown(equity: &[f64]) -> (f64, f64) {
    if equity.is_empty() {
        return (0.0, 0.0);
    }
    let mut peak = equity[0];
    let mut worst_pct = 0.0_f64;
    let mut worst_dollars = 0.0_f64;
    for &value in equity {
        if value > peak {
            peak = value;
        }
        let dollars = value - peak;
        if dollars < worst_dollars {
            worst_dollars = dollars;
        }
        if peak > 0.0 {
            let pct = dollars / peak;
            if pct < worst_pct {
                worst_pct = pct;
            }
        }
    }
    (worst_pct, worst_dollars)
}

/// Root-mean-square of the percentage drawdowns over the curve, in
/// percent. Deeper and longer drawdowns both raise it.
pub fn ulcer_index(equity: &[f64]) -> f64 {
    if equity.is_empty() {
        return 0.0;
    }
    let mut peak = equity[0];
    let mut squared_sum = 0.0_f64;
    for &value in equity {
        if value > peak {
            peak = value;
        }
        if peak > 0.0 {
            let dd_pct = (value - peak) / peak * 100.0;
            squared_sum += dd_pct * dd_pct;
        }
    }
    (squared_sum / equity.len() as f64).sqrt()
}

/// Trade-level statistics from the signed PnL list. Sums stay in exact
/// decimals; averages and ratios convert to f64.
pub fn trade_stats(pnls: &[Decimal]) -> TradeStats {
    let mut stats = TradeStats { total_trades: pnls.len(), ..TradeStats::default() };
    if pnls.is_empty() {
        return stats;
    }

    let mut largest_win = Decimal::ZERO;
    let mut largest_loss = Decimal::ZERO;
    for &pnl in pnls {
        stats.net_profit += pnl;
        if pnl > Decimal::ZERO {
            stats.winning_trades += 1;
            stats.gross_profit += pnl;
            largest_win = largest_win.max(pnl);
        } else if pnl < Decimal::ZERO {
            stats.losing_trades += 1;
            stats.gross_loss += pnl.abs();
            largest_loss = largest_loss.max(pnl.abs());
        }
    }

    stats.win_rate = stats.winning_trades as f64 / stats.total_trades as f64;
    stats.largest_win = largest_win.to_f64().unwrap_or(0.0);
    stats.largest_loss = largest_loss.to_f64().unwrap_or(0.0);

    let gross_profit = stats.gross_profit.to_f64().unwrap_or(0.0);
    let gross_loss = stats.gross_loss.to_f64().unwrap_or(0.0);
    if stats.winning_trades > 0 {
        stats.average_win = gross_profit / stats.winning_trades as f64;
    }
    if stats.losing_trades > 0 {
        stats.average_loss = gross_loss / stats.losing_trades as f64;
    }

    stats.profit_factor = if gross_loss > 0.0 {
        gross_profit / gross_loss
    } else if gross_profit > 0.0 {
        // Documented sentinel: wins and not a single loss.
        f64::INFINITY
    } else {
        0.0
    };
    stats.payoff_ratio =
        if stats.average_loss > 0.0 { stats.average_win / stats.average_loss } else { 0.0 };

    let loss_rate = 1.0 - stats.win_rate;
    stats.expectancy = stats.win_rate * stats.average_win - loss_rate * stats.average_loss;
    stats
}

/// Kelly criterion as a display percentage, clamped to [-100, 100].
/// 0 when the payoff ratio is undefined (no losing trades).
pub fn kelly_pct(win_rate: f64, payoff_ratio: f64) -> f64 {
    if payoff_ratio <= 0.0 {
        return 0.0;
    }
    let fraction = win_rate - (1.0 - win_rate) / payoff_ratio;
    (fraction * 100.0).clamp(-100.0, 100.0)
}

/// Fixed-fractional risk-of-ruin estimate with its intermediates.
///
/// Without losing trades there is no measurable ruin path and the
/// probability is 0; without a positive trading advantage ruin is
/// certain and the probability is 1. Never NaN.
pub fn risk_of_ruin(
    win_rate: f64,
    payoff_ratio: f64,
    average_loss: f64,
    balance: f64,
) -> RuinEstimate {
    if average_loss <= 0.0 {
        return RuinEstimate::default();
    }

    let loss_rate = 1.0 - win_rate;
    let advantage = if payoff_ratio > 0.0 {
        (win_rate * payoff_ratio - loss_rate) / payoff_ratio
    } else {
        // Losses without a single win: no edge at all.
        -loss_rate
    };
    let capital_units = (balance / average_loss).max(0.0);

    let probability = if advantage <= 0.0 {
        1.0
    } else if advantage >= 1.0 {
        0.0
    } else {
        ((1.0 - advantage) / (1.0 + advantage)).powf(capital_units).clamp(0.0, 1.0)
    };

    RuinEstimate { probability, advantage, capital_units }
}

/// Percentage of calendar months and quarters with strictly positive
/// summed PnL, from the dated curve's first differences.
pub fn consistency(equity: &[(NaiveDate, f64)]) -> (f64, f64) {
    use std::collections::BTreeMap;

    let mut months: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    let mut quarters: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for w in equity.windows(2) {
        let (date, change) = (w[1].0, w[1].1 - w[0].1);
        *months.entry((date.year(), date.month())).or_insert(0.0) += change;
        *quarters.entry((date.year(), (date.month() - 1) / 3)).or_insert(0.0) += change;
    }

    let positive_pct = |sums: &BTreeMap<(i32, u32), f64>| {
        if sums.is_empty() {
            return 0.0;
        }
        sums.values().filter(|&&v| v > 0.0).count() as f64 / sums.len() as f64 * 100.0
    };
    (positive_pct(&months), positive_pct(&quarters))
}

/// `numerator / denominator` with a zero result for a zero denominator.
fn ratio_or_zero(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 { 0.0 } else { numerator / denominator }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    const TOLERANCE: f64 = 1e-9;

    fn dated(values: &[f64]) -> Vec<(NaiveDate, f64)> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| (start + chrono::Duration::days(i as i64), v))
            .collect()
    }

    #[test]
    fn constant_one_percent_days_have_zero_volatility_and_sharpe() {
        // Scenario: +1% every day.
        let engine = MetricsEngine::default();
        let bundle = engine.calculate(&dated(&[100.0, 101.0, 102.01, 103.0301]), &[], dec!(100));

        assert!((bundle.total_return - 0.030301).abs() < TOLERANCE);
        assert_eq!(bundle.daily_volatility, 0.0);
        assert_eq!(bundle.sharpe, 0.0);
        assert_eq!(bundle.sortino, 0.0);
    }

    #[test]
    fn peak_to_trough_drawdown_is_measured_against_the_peak() {
        // Scenario: peak 110, trough 90.
        let engine = MetricsEngine::default();
        let bundle = engine.calculate(&dated(&[100.0, 110.0, 90.0, 95.0]), &[], dec!(100));

        assert!((bundle.max_drawdown - (-20.0 / 110.0)).abs() < TOLERANCE);
        assert!((bundle.max_drawdown_dollars - (-20.0)).abs() < TOLERANCE);
        assert!((bundle.total_return - (-0.05)).abs() < TOLERANCE);
    }

    #[test]
    fn total_return_round_trips_last_over_first() {
        let values = [100.0, 103.0, 99.5, 108.25];
        assert!((total_return(&values) - (108.25 / 100.0 - 1.0)).abs() < TOLERANCE);
    }

    #[test]
    fn sortino_is_at_least_sharpe_with_upside_volatility() {
        let returns = daily_returns(&[100.0, 103.0, 101.0, 104.0, 102.5, 106.0]);
        assert!(returns.iter().any(|&r| r > 0.0));
        let s = sharpe(&returns, 0.0, 252);
        let so = sortino(&returns, 0.0, 252);
        assert!(so >= s, "sortino {so} < sharpe {s}");
    }

    #[test]
    fn degenerate_curves_report_zeroed_metrics_without_nan() {
        let engine = MetricsEngine::default();
        for curve in [vec![], vec![(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), 100.0)]] {
            let bundle = engine.calculate(&curve, &[], dec!(100000));
            assert_eq!(bundle.total_return, 0.0);
            assert_eq!(bundle.sharpe, 0.0);
            assert_eq!(bundle.max_drawdown, 0.0);
            assert_eq!(bundle.calmar, 0.0);
        }
    }

    #[test]
    fn zero_starting_equity_never_divides() {
        let engine = MetricsEngine::default();
        let bundle = engine.calculate(&dated(&[0.0, 50.0, 25.0]), &[], dec!(0));
        assert!(bundle.total_return.is_finite());
        assert!(bundle.sharpe.is_finite());
        assert!(bundle.annualized_return.is_finite());
    }

    #[test]
    fn full_loss_annualizes_to_minus_one_not_nan() {
        assert_eq!(annualized_return(-1.0, 10, 252), -1.0);
        assert_eq!(annualized_return(-1.5, 10, 252), -1.0);
    }

    #[test]
    fn trade_stats_split_wins_and_losses() {
        let stats = trade_stats(&[dec!(100), dec!(-50), dec!(200), dec!(-25), dec!(0)]);
        assert_eq!(stats.total_trades, 5);
        assert_eq!(stats.winning_trades, 2);
        assert_eq!(stats.losing_trades, 2);
        assert_eq!(stats.net_profit, dec!(225));
        assert!((stats.win_rate - 0.4).abs() < TOLERANCE);
        assert!((stats.average_win - 150.0).abs() < TOLERANCE);
        assert!((stats.average_loss - 37.5).abs() < TOLERANCE);
        assert!((stats.profit_factor - 4.0).abs() < TOLERANCE);
        assert!((stats.payoff_ratio - 4.0).abs() < TOLERANCE);
        assert!((stats.expectancy - (0.4 * 150.0 - 0.6 * 37.5)).abs() < TOLERANCE);
    }

    #[test]
    fn profit_factor_sentinel_for_loss_free_lists() {
        assert_eq!(trade_stats(&[dec!(10), dec!(20)]).profit_factor, f64::INFINITY);
        assert_eq!(trade_stats(&[dec!(-10), dec!(-20)]).profit_factor, 0.0);
        assert_eq!(trade_stats(&[]).profit_factor, 0.0);
    }

    #[test]
    fn kelly_is_clamped_and_guards_zero_payoff() {
        assert_eq!(kelly_pct(0.5, 0.0), 0.0);
        assert!((kelly_pct(0.6, 2.0) - 40.0).abs() < TOLERANCE);
        assert_eq!(kelly_pct(0.0, 0.001), -100.0);
    }

    #[test]
    fn risk_of_ruin_exposes_advantage_and_capital_units() {
        let ruin = risk_of_ruin(0.6, 2.0, 500.0, 10_000.0);
        // A = (0.6 * 2 - 0.4) / 2 = 0.4, U = 20.
        assert!((ruin.advantage - 0.4).abs() < TOLERANCE);
        assert!((ruin.capital_units - 20.0).abs() < TOLERANCE);
        let expected = (0.6_f64 / 1.4).powf(20.0);
        assert!((ruin.probability - expected).abs() < TOLERANCE);
    }

    #[test]
    fn risk_of_ruin_degenerates_safely() {
        // No edge: ruin is certain.
        assert_eq!(risk_of_ruin(0.3, 1.0, 100.0, 10_000.0).probability, 1.0);
        // Never a winner: ruin is certain.
        assert_eq!(risk_of_ruin(0.0, 0.0, 100.0, 10_000.0).probability, 1.0);
        // No losing trades: no measurable ruin path.
        assert_eq!(risk_of_ruin(1.0, 0.0, 0.0, 10_000.0).probability, 0.0);
        for ruin in [
            risk_of_ruin(0.5, 1.0, 100.0, 0.0),
            risk_of_ruin(0.99, 100.0, 1.0, 1e9),
        ] {
            assert!(ruin.probability.is_finite());
            assert!((0.0..=1.0).contains(&ruin.probability));
        }
    }

    #[test]
    fn ulcer_index_is_zero_for_a_rising_curve() {
        assert_eq!(ulcer_index(&[100.0, 101.0, 102.0]), 0.0);
        assert!(ulcer_index(&[100.0, 80.0, 100.0]) > 0.0);
    }

    #[test]
    fn consistency_counts_positive_months_and_quarters() {
        // Jan +10, Feb -5, Mar +1: two of three months positive, one
        // quarter positive in total.
        let curve = vec![
            (NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(), 100.0),
            (NaiveDate::from_ymd_opt(2024, 1, 20).unwrap(), 110.0),
            (NaiveDate::from_ymd_opt(2024, 2, 15).unwrap(), 105.0),
            (NaiveDate::from_ymd_opt(2024, 3, 10).unwrap(), 106.0),
        ];
        let (monthly, quarterly) = consistency(&curve);
        assert!((monthly - 200.0 / 3.0).abs() < TOLERANCE);
        assert_eq!(quarterly, 100.0);
    }

    #[test]
    fn calmar_relates_annualized_return_to_drawdown() {
        let engine = MetricsEngine::default();
        let bundle = engine.calculate(&dated(&[100.0, 110.0, 99.0, 121.0]), &[], dec!(100));
        assert!(bundle.max_drawdown < 0.0);
        let expected = bundle.annualized_return / bundle.max_drawdown.abs();
        assert!((bundle.calmar - expected).abs() < TOLERANCE);
        assert_eq!(bundle.calmar, bundle.mar_ratio);
    }
}
