use crate::enums::{StrategyClass, TradeSide};
use crate::error::CoreError;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single trade as recorded by the ledger, typed and validated.
///
/// Immutable once closed. PnL is derived through [`TradeRecord::pnl`],
/// never stored redundantly. A record missing its exit data is an open
/// position and is not eligible for aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub strategy_id: String,
    pub side: TradeSide,
    pub entry_price: Decimal,
    pub exit_price: Option<Decimal>,
    pub quantity: Decimal,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
}

impl TradeRecord {
    pub fn is_closed(&self) -> bool {
        self.exit_price.is_some() && self.exit_time.is_some()
    }

    /// Signed dollar PnL of the trade. `None` while the position is open.
    pub fn pnl(&self) -> Option<Decimal> {
        let exit = self.exit_price?;
        match self.side {
            TradeSide::Long => Some((exit - self.entry_price) * self.quantity),
            TradeSide::Short => Some((self.entry_price - exit) * self.quantity),
        }
    }

    /// Dollar exposure at entry.
    pub fn notional(&self) -> Decimal {
        self.entry_price * self.quantity
    }

    /// Calendar day the trade closed on. UTC truncation only, no
    /// timezone conversion; this is the engine's sole temporal
    /// granularity.
    pub fn close_date(&self) -> Option<NaiveDate> {
        self.exit_time.map(|t| t.date_naive())
    }
}

/// A raw trade row as returned by the external trade-ledger collaborator.
///
/// Numeric fields arrive as floating point and may be non-finite; the
/// side and class literals are unvalidated text. The aggregation layer
/// owns all eligibility checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerTradeRow {
    pub strategy_id: String,
    pub strategy_name: String,
    pub strategy_class: String,
    pub side: String,
    pub entry_price: f64,
    pub exit_price: Option<f64>,
    pub quantity: f64,
    pub entry_time: DateTime<Utc>,
    pub exit_time: Option<DateTime<Utc>>,
}

/// Read-only reference data describing one strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyMeta {
    pub strategy_id: String,
    pub name: String,
    pub class: StrategyClass,
}

/// One eligible closed trade after PnL derivation and date bucketing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTrade {
    pub date: NaiveDate,
    pub strategy_id: String,
    pub strategy_name: String,
    pub class: StrategyClass,
    pub side: TradeSide,
    pub pnl: Decimal,
    pub notional: Decimal,
}

/// One closing price of the benchmark series. Sparse; non-trading days
/// are absent and forward-filled by the curve builder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRow {
    pub date: NaiveDate,
    pub close: Decimal,
}

/// Summed PnL for one (date, strategy) pair. Ephemeral, recomputed per
/// query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyPnlRow {
    pub date: NaiveDate,
    pub strategy_id: String,
    pub class: StrategyClass,
    pub daily_pnl: Decimal,
}

/// Aggregator output: per-day PnL sums for the combined book and each
/// strategy-class bucket, plus the sparse benchmark close series over
/// the same window.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyBuckets {
    pub combined: BTreeMap<NaiveDate, Decimal>,
    pub swing: BTreeMap<NaiveDate, Decimal>,
    pub intraday: BTreeMap<NaiveDate, Decimal>,
    pub benchmark: BTreeMap<NaiveDate, Decimal>,
}

/// One point of the merged multi-series equity curve. All four series
/// are re-based so the first point of the requested window is zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub date: NaiveDate,
    pub combined: Decimal,
    pub swing: Decimal,
    pub intraday: Decimal,
    pub benchmark: Decimal,
}

/// Same shape as [`CurvePoint`] but each field holds the distance from
/// that series' running peak, always less than or equal to zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DrawdownPoint {
    pub date: NaiveDate,
    pub combined: Decimal,
    pub swing: Decimal,
    pub intraday: Decimal,
    pub benchmark: Decimal,
}

/// Inclusive calendar-day filter. Open bounds are unbounded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateWindow {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateWindow {
    /// Builds a window, rejecting an inverted date range.
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<Self, CoreError> {
        if let (Some(s), Some(e)) = (start, end) {
            if e < s {
                return Err(CoreError::InvalidInput(
                    "date window".to_string(),
                    format!("end {e} precedes start {s}"),
                ));
            }
        }
        Ok(Self { start, end })
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }
}
