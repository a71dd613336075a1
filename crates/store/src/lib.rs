//! # Vantage Store
//!
//! The collaborator boundary of the analytics core: the trade-ledger
//! and benchmark-store interfaces, CSV-file reference implementations,
//! and the injected snapshot cache.
//!
//! ## Architectural Principles
//!
//! - **Boundary Adapter:** Everything I/O-shaped lives here so the
//!   computation crates stay pure. The analytics pipeline consumes one
//!   immutable `AnalyticsSnapshot` per request and never reads again.
//! - **No retries:** an unreachable source surfaces as a
//!   `StoreError::Unavailable` with a stable message; retry policy
//!   belongs to whoever owns the data source.
//! - **Injected cache:** the short-TTL result cache is an explicit
//!   collaborator handed to the `SnapshotLoader`, never hidden state
//!   inside a computation.
//!
//! ## Public API
//!
//! - `TradeLedger` / `BenchmarkStore`: the collaborator traits.
//! - `CsvTradeLedger` / `CsvBenchmarkStore`: file-backed reference
//!   implementations.
//! - `SnapshotLoader` / `AnalyticsSnapshot` / `TtlCache`.
//! - `StoreError`: the failure taxonomy of this boundary.

// Declare the modules that constitute this crate.
pub mod cache;
pub mod csv_files;
pub mod error;
pub mod snapshot;

use core_types::{BenchmarkRow, DateWindow, LedgerTradeRow};

// Re-export the key components to create a clean, public-facing API.
pub use cache::TtlCache;
pub use csv_files::{CsvBenchmarkStore, CsvTradeLedger};
pub use error::StoreError;
pub use snapshot::{AnalyticsSnapshot, SnapshotLoader};

/// Query interface of the external trade ledger.
pub trait TradeLedger {
    /// Closed trades inside the window, optionally restricted to a set
    /// of strategy ids.
    fn closed_trades(
        &self,
        window: DateWindow,
        strategy_ids: Option<&[String]>,
    ) -> Result<Vec<LedgerTradeRow>, StoreError>;
}

/// Query interface of the external benchmark price store.
pub trait BenchmarkStore {
    /// Daily closes for one symbol inside the window, ascending by date.
    fn closes(&self, symbol: &str, window: DateWindow) -> Result<Vec<BenchmarkRow>, StoreError>;
}
