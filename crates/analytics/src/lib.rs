//! # Vantage Analytics Engine
//!
//! This crate computes the risk/performance metric battery from an equity
//! curve and a trade PnL list. It acts as the "unbiased judge" of the
//! system.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of
//!   external systems and depends only on `core-types` (Layer 0).
//! - **Stateless Calculation:** The `MetricsEngine` holds only statistical
//!   conventions (annualization factor, risk-free rate). Every call is a
//!   pure function of its inputs producing a fresh `MetricsBundle`.
//! - **Total functions:** Degenerate inputs (empty history, a single
//!   point, zero volatility) yield the documented zero/neutral values.
//!   No method returns NaN, and none returns Infinity except the
//!   profit-factor sentinel for a loss-free trade list.
//!
//! ## Public API
//!
//! - `MetricsEngine`: the calculator and its statistical conventions.
//! - `MetricsBundle`: the full set of derived scalars, one per call.
//! - `TradeStats` / `RuinEstimate`: trade-level sub-reports.
//! - `rolling`: rolling volatility/Sharpe windows and benchmark beta/alpha.

// Declare the modules that constitute this crate.
pub mod engine;
pub mod report;
pub mod rolling;

// Re-export the key components to create a clean, public-facing API.
pub use engine::{
    MetricsEngine, annualized_return, consistency, daily_returns, kelly_pct, max_drawdown, mean,
    risk_of_ruin, sample_std_dev, sharpe, sortino, total_return, trade_stats, ulcer_index,
};
pub use report::{MetricsBundle, RuinEstimate, TradeStats};
pub use rolling::{BetaAlpha, beta_alpha, dated_returns, rolling_sharpe, rolling_volatility};
