use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The full set of derived scalars for one (equity curve, trade list)
/// pair.
///
/// This struct is the final output of the `MetricsEngine` and serves as
/// the data transfer object for performance results throughout the
/// system. Returns and ratios are fractions unless the field name says
/// `_pct`; every field is recomputed per call and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsBundle {
    // I. Return and volatility
    pub total_return: f64,
    pub annualized_return: f64,
    pub mean_daily_return: f64,
    pub daily_volatility: f64,
    pub annualized_volatility: f64,

    // II. Risk-adjusted ratios
    pub sharpe: f64,
    pub sortino: f64,
    pub calmar: f64,
    pub mar_ratio: f64,

    // III. Drawdown and recovery
    pub max_drawdown: f64,
    pub max_drawdown_dollars: f64,
    pub ulcer_index: f64,
    pub recovery_factor: f64,

    // IV. Trade-level statistics
    pub trades: TradeStats,
    pub kelly_pct: f64,
    pub risk_of_ruin: RuinEstimate,

    // V. Consistency
    pub monthly_consistency_pct: f64,
    pub quarterly_consistency_pct: f64,
}

impl MetricsBundle {
    /// Creates a new, zeroed-out bundle. This is the value reported for
    /// an empty history.
    pub fn new() -> Self {
        Self {
            total_return: 0.0,
            annualized_return: 0.0,
            mean_daily_return: 0.0,
            daily_volatility: 0.0,
            annualized_volatility: 0.0,
            sharpe: 0.0,
            sortino: 0.0,
            calmar: 0.0,
            mar_ratio: 0.0,
            max_drawdown: 0.0,
            max_drawdown_dollars: 0.0,
            ulcer_index: 0.0,
            recovery_factor: 0.0,
            trades: TradeStats::default(),
            kelly_pct: 0.0,
            risk_of_ruin: RuinEstimate::default(),
            monthly_consistency_pct: 0.0,
            quarterly_consistency_pct: 0.0,
        }
    }
}

impl Default for MetricsBundle {
    fn default() -> Self {
        Self::new()
    }
}

/// Trade-level profitability statistics, computed from the PnL list
/// independently of the equity curve.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeStats {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Fraction of trades with strictly positive PnL.
    pub win_rate: f64,
    pub net_profit: Decimal,
    pub gross_profit: Decimal,
    /// Positive magnitude of the summed losses.
    pub gross_loss: Decimal,
    pub average_win: f64,
    /// Positive magnitude.
    pub average_loss: f64,
    pub largest_win: f64,
    /// Positive magnitude.
    pub largest_loss: f64,
    /// `gross_profit / gross_loss`. `f64::INFINITY` is the documented
    /// sentinel for a list with wins and no losses; 0 for no wins.
    pub profit_factor: f64,
    /// `average_win / average_loss`, 0 when there are no losses.
    pub payoff_ratio: f64,
    /// `win_rate * avg_win - loss_rate * avg_loss`, in dollars per trade.
    pub expectancy: f64,
}

/// Risk-of-ruin probability with the intermediate quantities exposed
/// so callers can explain the number.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuinEstimate {
    /// `((1 - A) / (1 + A))^U`, in [0, 1].
    pub probability: f64,
    /// Trading advantage `A = (win_rate * payoff - loss_rate) / payoff`.
    pub advantage: f64,
    /// Capital units `U = balance / average_loss`.
    pub capital_units: f64,
}
