pub mod enums;
pub mod error;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use enums::{SeriesKind, StrategyClass, TradeSide};
pub use error::CoreError;
pub use structs::{
    BenchmarkRow, CurvePoint, DailyBuckets, DailyPnlRow, DateWindow, DrawdownPoint,
    LedgerTradeRow, NormalizedTrade, StrategyMeta, TradeRecord,
};
