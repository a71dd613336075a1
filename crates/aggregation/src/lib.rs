//! # Vantage Aggregation
//!
//! This crate owns the first two steps of the analytics pipeline: turning
//! raw ledger rows into eligible, normalized trades, and summing those
//! trades into per-day buckets for the curve builder.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** Pure transformation over in-memory rows. It has no
//!   knowledge of where the ledger rows come from; that is the store
//!   crate's concern.
//! - **Ineligibility is not an error:** Rows that cannot be aggregated
//!   (open positions, bad literals, non-finite numbers) are excluded with
//!   a data-quality warning. Only the CSV export can genuinely fail.
//!
//! ## Public API
//!
//! - `normalize_trade` / `normalize_ledger`: eligibility and PnL derivation.
//! - `aggregate_daily` / `aggregate_by_strategy`: per-day summation.
//! - `trades_to_csv`: the trade-level CSV export.

// Declare the modules that constitute this crate.
pub mod daily;
pub mod error;
pub mod export;
pub mod normalizer;

// Re-export the key components to create a clean, public-facing API.
pub use daily::{aggregate_by_strategy, aggregate_daily};
pub use error::AggregationError;
pub use export::trades_to_csv;
pub use normalizer::{normalize_ledger, normalize_trade};
