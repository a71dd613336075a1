use crate::error::StoreError;
use crate::{BenchmarkStore, TradeLedger};
use chrono::NaiveDate;
use core_types::{BenchmarkRow, DateWindow, LedgerTradeRow};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File-backed reference implementation of the trade ledger.
///
/// Expects the normalized ledger columns: `strategy_id, strategy_name,
/// strategy_class, side, entry_price, exit_price, quantity, entry_time,
/// exit_time`, with RFC 3339 timestamps and empty exit fields for open
/// positions.
pub struct CsvTradeLedger {
    path: PathBuf,
}

impl CsvTradeLedger {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

impl TradeLedger for CsvTradeLedger {
    fn closed_trades(
        &self,
        window: DateWindow,
        strategy_ids: Option<&[String]>,
    ) -> Result<Vec<LedgerTradeRow>, StoreError> {
        let mut reader = open_reader(&self.path)?;
        let mut rows = Vec::new();
        for record in reader.deserialize::<LedgerTradeRow>() {
            let row = record?;
            if let Some(ids) = strategy_ids {
                if !ids.contains(&row.strategy_id) {
                    continue;
                }
            }
            // Open positions pass through so the normalizer can log
            // them as data-quality exclusions.
            if row.exit_time.is_some_and(|t| !window.contains(t.date_naive())) {
                continue;
            }
            rows.push(row);
        }
        debug!(path = %self.path.display(), rows = rows.len(), "loaded ledger rows");
        Ok(rows)
    }
}

/// One row of the benchmark seed file:
/// `date,symbol,open,high,low,close,volume`.
#[derive(Debug, Deserialize)]
struct BenchmarkFileRow {
    date: NaiveDate,
    symbol: String,
    #[allow(dead_code)]
    open: Decimal,
    #[allow(dead_code)]
    high: Decimal,
    #[allow(dead_code)]
    low: Decimal,
    close: Decimal,
    #[allow(dead_code)]
    volume: f64,
}

/// File-backed reference implementation of the benchmark store.
pub struct CsvBenchmarkStore {
    path: PathBuf,
}

impl CsvBenchmarkStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }
}

impl BenchmarkStore for CsvBenchmarkStore {
    fn closes(&self, symbol: &str, window: DateWindow) -> Result<Vec<BenchmarkRow>, StoreError> {
        let mut reader = open_reader(&self.path)?;
        let mut rows = Vec::new();
        for record in reader.deserialize::<BenchmarkFileRow>() {
            let row = record?;
            if row.symbol.eq_ignore_ascii_case(symbol) && window.contains(row.date) {
                rows.push(BenchmarkRow { date: row.date, close: row.close });
            }
        }
        rows.sort_by_key(|r| r.date);
        debug!(path = %self.path.display(), symbol, rows = rows.len(), "loaded benchmark rows");
        Ok(rows)
    }
}

fn open_reader(path: &Path) -> Result<csv::Reader<std::fs::File>, StoreError> {
    csv::Reader::from_path(path)
        .map_err(|e| StoreError::Unavailable(format!("cannot read {}: {e}", path.display())))
}
