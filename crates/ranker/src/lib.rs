//! # Vantage Strategy Ranker
//!
//! Aggregates normalized trades into comparable per-strategy summary
//! rows with filter, search, sort, and pagination semantics.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** Pure fetch-free pipeline over in-memory trades:
//!   group, score, filter, sort, slice.
//! - **Two Sharpe variants:** each row carries the daily-equity Sharpe
//!   and the cruder per-trade-return approximation. The trade-based one
//!   annualizes per-trade returns as if they were daily and is the less
//!   precise of the two; both are exposed so callers can choose.
//! - **Stable paging:** equal sort keys fall back to the strategy name,
//!   so a page requested twice returns the same rows.
//!
//! ## Public API
//!
//! - `rank_strategies`: the full pipeline, returning `(total, rows)`.
//! - `RankRequest` / `RankResponse` / `StrategyRow`: the wire shapes.

use aggregation::aggregate_by_strategy;
use analytics::{MetricsEngine, daily_returns, max_drawdown, sharpe, trade_stats};
use core_types::{DailyPnlRow, NormalizedTrade, StrategyClass, StrategyMeta};
use rust_decimal::Decimal;
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::trace;

/// One comparable summary row per strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyRow {
    pub strategy_id: String,
    pub name: String,
    pub class: StrategyClass,
    pub trades: usize,
    pub total_pnl: Decimal,
    pub total_notional: Decimal,
    /// Total PnL over total notional, in percent.
    pub total_return_pct: f64,
    pub win_rate: f64,
    pub profit_factor: f64,
    /// Max drawdown of the per-strategy daily equity series, in
    /// percent, negative.
    pub max_drawdown_pct: f64,
    /// Sharpe over the per-strategy daily equity series.
    pub sharpe_daily: f64,
    /// Approximate Sharpe over per-trade returns, annualized as if the
    /// trades were daily observations. Less precise than
    /// `sharpe_daily`.
    pub sharpe_trade: f64,
}

/// Column to order the rows by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Name,
    Trades,
    TotalPnl,
    TotalReturn,
    WinRate,
    ProfitFactor,
    MaxDrawdown,
    Sharpe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Filter, sort, and paging parameters for one ranking call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankRequest {
    /// Keep only strategies of this class.
    pub class: Option<StrategyClass>,
    /// Case-insensitive substring match on the strategy name.
    pub search: Option<String>,
    pub sort_key: SortKey,
    pub direction: SortDirection,
    /// 1-based page number.
    pub page: usize,
    pub page_size: usize,
}

impl Default for RankRequest {
    fn default() -> Self {
        Self {
            class: None,
            search: None,
            sort_key: SortKey::TotalPnl,
            direction: SortDirection::Descending,
            page: 1,
            page_size: 25,
        }
    }
}

/// The stable `(total, rows)` contract: `total` counts every row that
/// passed the filters, `rows` is the requested page of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankResponse {
    pub total: usize,
    pub rows: Vec<StrategyRow>,
}

/// Builds, filters, sorts, and paginates the per-strategy summary rows.
///
/// The per-strategy equity series starts from `balance` and accumulates
/// that strategy's daily PnL; `engine` supplies the annualization and
/// risk-free conventions for the Sharpe variants.
pub fn rank_strategies(
    trades: &[NormalizedTrade],
    balance: Decimal,
    engine: &MetricsEngine,
    request: &RankRequest,
) -> RankResponse {
    let daily = aggregate_by_strategy(trades);
    let mut rows: Vec<StrategyRow> = group_by_strategy(trades)
        .into_values()
        .map(|group| {
            let meta = meta_of(&group);
            let series: Vec<&DailyPnlRow> =
                daily.iter().filter(|r| r.strategy_id == meta.strategy_id).collect();
            summarize(meta, &group, &series, balance, engine)
        })
        .collect();

    if let Some(class) = request.class {
        rows.retain(|row| row.class == class);
    }
    if let Some(search) = request.search.as_deref() {
        let needle = search.to_lowercase();
        rows.retain(|row| row.name.to_lowercase().contains(&needle));
    }
    let total = rows.len();

    rows.sort_by(|a, b| {
        let ordering = compare(a, b, request.sort_key);
        let ordering = match request.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        };
        ordering.then_with(|| a.name.cmp(&b.name))
    });

    let page = request.page.max(1);
    let rows: Vec<StrategyRow> = rows
        .into_iter()
        .skip((page - 1) * request.page_size)
        .take(request.page_size)
        .collect();

    trace!(total, page_rows = rows.len(), "ranked strategies");
    RankResponse { total, rows }
}

fn group_by_strategy(trades: &[NormalizedTrade]) -> BTreeMap<String, Vec<&NormalizedTrade>> {
    let mut groups: BTreeMap<String, Vec<&NormalizedTrade>> = BTreeMap::new();
    for trade in trades {
        groups.entry(trade.strategy_id.clone()).or_default().push(trade);
    }
    groups
}

fn meta_of(group: &[&NormalizedTrade]) -> StrategyMeta {
    let first = group[0];
    StrategyMeta {
        strategy_id: first.strategy_id.clone(),
        name: first.strategy_name.clone(),
        class: first.class,
    }
}

fn summarize(
    meta: StrategyMeta,
    group: &[&NormalizedTrade],
    daily: &[&DailyPnlRow],
    balance: Decimal,
    engine: &MetricsEngine,
) -> StrategyRow {
    let pnls: Vec<Decimal> = group.iter().map(|t| t.pnl).collect();
    let stats = trade_stats(&pnls);
    let total_notional: Decimal = group.iter().map(|t| t.notional).sum();

    let total_return_pct = if total_notional > Decimal::ZERO {
        (stats.net_profit / total_notional).to_f64().unwrap_or(0.0) * 100.0
    } else {
        0.0
    };

    // Per-trade fractional returns, annualized as if daily.
    let trade_returns: Vec<f64> = group
        .iter()
        .filter(|t| t.notional > Decimal::ZERO)
        .map(|t| (t.pnl / t.notional).to_f64().unwrap_or(0.0))
        .collect();
    let daily_risk_free = engine.risk_free_rate / f64::from(engine.trading_days_per_year);
    let sharpe_trade = sharpe(&trade_returns, daily_risk_free, engine.trading_days_per_year);

    // Daily equity series: balance plus the strategy's cumulative
    // daily PnL. The rows arrive ordered by date, one per trading day.
    let mut running = balance;
    let mut equity = vec![balance.to_f64().unwrap_or(0.0)];
    for row in daily {
        running += row.daily_pnl;
        equity.push(running.to_f64().unwrap_or(0.0));
    }
    let equity_returns = daily_returns(&equity);
    let sharpe_daily = sharpe(&equity_returns, daily_risk_free, engine.trading_days_per_year);
    let (max_dd, _) = max_drawdown(&equity);

    StrategyRow {
        strategy_id: meta.strategy_id,
        name: meta.name,
        class: meta.class,
        trades: group.len(),
        total_pnl: stats.net_profit,
        total_notional,
        total_return_pct,
        win_rate: stats.win_rate,
        profit_factor: stats.profit_factor,
        max_drawdown_pct: max_dd * 100.0,
        sharpe_daily,
        sharpe_trade,
    }
}

/// String keys order via `Ord`; numeric keys via `partial_cmp` with
/// NaN-safe equality fallback.
fn compare(a: &StrategyRow, b: &StrategyRow, key: SortKey) -> Ordering {
    let numeric = |x: f64, y: f64| x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    match key {
        SortKey::Name => a.name.cmp(&b.name),
        SortKey::Trades => a.trades.cmp(&b.trades),
        SortKey::TotalPnl => a.total_pnl.cmp(&b.total_pnl),
        SortKey::TotalReturn => numeric(a.total_return_pct, b.total_return_pct),
        SortKey::WinRate => numeric(a.win_rate, b.win_rate),
        SortKey::ProfitFactor => numeric(a.profit_factor, b.profit_factor),
        SortKey::MaxDrawdown => numeric(a.max_drawdown_pct, b.max_drawdown_pct),
        SortKey::Sharpe => numeric(a.sharpe_daily, b.sharpe_daily),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use core_types::TradeSide;
    use rust_decimal_macros::dec;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn trade(
        id: &str,
        name: &str,
        class: StrategyClass,
        date: NaiveDate,
        pnl: Decimal,
    ) -> NormalizedTrade {
        NormalizedTrade {
            date,
            strategy_id: id.to_string(),
            strategy_name: name.to_string(),
            class,
            side: TradeSide::Long,
            pnl,
            notional: dec!(10000),
        }
    }

    fn sample_trades() -> Vec<NormalizedTrade> {
        vec![
            trade("a", "ES Trend", StrategyClass::Swing, day(3), dec!(500)),
            trade("a", "ES Trend", StrategyClass::Swing, day(4), dec!(-200)),
            trade("a", "ES Trend", StrategyClass::Swing, day(6), dec!(300)),
            trade("b", "NQ Scalper", StrategyClass::Intraday, day(3), dec!(150)),
            trade("b", "NQ Scalper", StrategyClass::Intraday, day(5), dec!(-100)),
            trade("c", "CL Breakout", StrategyClass::Swing, day(4), dec!(-400)),
        ]
    }

    #[test]
    fn rows_aggregate_pnl_and_expose_both_sharpe_variants() {
        let engine = MetricsEngine::default();
        let response =
            rank_strategies(&sample_trades(), dec!(100000), &engine, &RankRequest::default());

        assert_eq!(response.total, 3);
        let best = &response.rows[0];
        assert_eq!(best.strategy_id, "a");
        assert_eq!(best.name, "ES Trend");
        assert_eq!(best.class, StrategyClass::Swing);
        assert_eq!(best.total_pnl, dec!(600));
        assert_eq!(best.trades, 3);
        assert_eq!(best.total_notional, dec!(30000));
        assert!((best.total_return_pct - 2.0).abs() < 1e-9);
        assert!((best.win_rate - 2.0 / 3.0).abs() < 1e-9);
        assert!(best.sharpe_daily.is_finite());
        assert!(best.sharpe_trade.is_finite());
        assert!(best.max_drawdown_pct <= 0.0);
    }

    #[test]
    fn same_day_trades_collapse_to_one_equity_step() {
        let engine = MetricsEngine::default();
        let trades = vec![
            trade("a", "ES Trend", StrategyClass::Swing, day(3), dec!(500)),
            trade("a", "ES Trend", StrategyClass::Swing, day(3), dec!(-600)),
        ];
        let response = rank_strategies(&trades, dec!(100000), &engine, &RankRequest::default());

        // Both trades land on the same day, so the equity series takes
        // a single -100 step and the drawdown reflects the net move.
        let row = &response.rows[0];
        assert_eq!(row.total_pnl, dec!(-100));
        assert!((row.max_drawdown_pct - (-0.1)).abs() < 1e-9);
    }

    #[test]
    fn class_filter_keeps_only_that_class() {
        let engine = MetricsEngine::default();
        let request =
            RankRequest { class: Some(StrategyClass::Intraday), ..RankRequest::default() };
        let response = rank_strategies(&sample_trades(), dec!(100000), &engine, &request);
        assert_eq!(response.total, 1);
        assert_eq!(response.rows[0].strategy_id, "b");
    }

    #[test]
    fn search_matches_name_substrings_case_insensitively() {
        let engine = MetricsEngine::default();
        let request = RankRequest { search: Some("scalp".to_string()), ..RankRequest::default() };
        let response = rank_strategies(&sample_trades(), dec!(100000), &engine, &request);
        assert_eq!(response.total, 1);
        assert_eq!(response.rows[0].name, "NQ Scalper");
    }

    #[test]
    fn sorting_respects_key_and_direction() {
        let engine = MetricsEngine::default();
        let request = RankRequest {
            sort_key: SortKey::TotalPnl,
            direction: SortDirection::Ascending,
            ..RankRequest::default()
        };
        let response = rank_strategies(&sample_trades(), dec!(100000), &engine, &request);
        let pnls: Vec<Decimal> = response.rows.iter().map(|r| r.total_pnl).collect();
        assert_eq!(pnls, vec![dec!(-400), dec!(50), dec!(600)]);
    }

    #[test]
    fn pagination_slices_after_counting_the_total() {
        let engine = MetricsEngine::default();
        let request = RankRequest { page: 2, page_size: 2, ..RankRequest::default() };
        let response = rank_strategies(&sample_trades(), dec!(100000), &engine, &request);
        assert_eq!(response.total, 3);
        assert_eq!(response.rows.len(), 1);

        let request = RankRequest { page: 5, page_size: 2, ..RankRequest::default() };
        let response = rank_strategies(&sample_trades(), dec!(100000), &engine, &request);
        assert_eq!(response.total, 3);
        assert!(response.rows.is_empty());
    }

    #[test]
    fn equal_keys_tie_break_by_name_for_stable_pages() {
        let engine = MetricsEngine::default();
        let trades = vec![
            trade("x", "Beta", StrategyClass::Swing, day(3), dec!(100)),
            trade("y", "Alpha", StrategyClass::Swing, day(3), dec!(100)),
        ];
        let request = RankRequest { sort_key: SortKey::TotalPnl, ..RankRequest::default() };
        let response = rank_strategies(&trades, dec!(100000), &engine, &request);
        let names: Vec<&str> = response.rows.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Beta"]);
    }

    #[test]
    fn empty_input_produces_an_empty_stable_response() {
        let engine = MetricsEngine::default();
        let response = rank_strategies(&[], dec!(100000), &engine, &RankRequest::default());
        assert_eq!(response.total, 0);
        assert!(response.rows.is_empty());
    }
}
