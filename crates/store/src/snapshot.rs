use crate::cache::TtlCache;
use crate::error::StoreError;
use crate::{BenchmarkStore, TradeLedger};
use core_types::{BenchmarkRow, DateWindow, LedgerTradeRow};
use std::time::Duration;
use tracing::debug;

/// The immutable input snapshot one analytics request computes over.
/// Fetched once per request; nothing in the pipeline reads again.
#[derive(Debug, Clone)]
pub struct AnalyticsSnapshot {
    pub trades: Vec<LedgerTradeRow>,
    pub benchmark: Vec<BenchmarkRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SnapshotKey {
    symbol: String,
    window: DateWindow,
    strategy_ids: Option<Vec<String>>,
}

/// Loads analytics snapshots from the collaborator stores through an
/// injected TTL cache.
///
/// Within the TTL window a repeated request returns the cached,
/// stale-but-valid snapshot without touching either store; the cache
/// policy belongs to whoever constructed the loader.
pub struct SnapshotLoader {
    ledger: Box<dyn TradeLedger>,
    benchmarks: Box<dyn BenchmarkStore>,
    cache: TtlCache<SnapshotKey, AnalyticsSnapshot>,
}

impl SnapshotLoader {
    pub fn new(
        ledger: Box<dyn TradeLedger>,
        benchmarks: Box<dyn BenchmarkStore>,
        ttl: Duration,
    ) -> Self {
        Self { ledger, benchmarks, cache: TtlCache::new(ttl) }
    }

    /// Fetches (or returns the cached) snapshot for one request.
    pub fn load(
        &mut self,
        symbol: &str,
        window: DateWindow,
        strategy_ids: Option<&[String]>,
    ) -> Result<AnalyticsSnapshot, StoreError> {
        let key = SnapshotKey {
            symbol: symbol.to_string(),
            window,
            strategy_ids: strategy_ids.map(<[String]>::to_vec),
        };
        if let Some(snapshot) = self.cache.get(&key) {
            return Ok(snapshot);
        }

        let trades = self.ledger.closed_trades(window, strategy_ids)?;
        let benchmark = self.benchmarks.closes(symbol, window)?;
        debug!(trades = trades.len(), benchmark = benchmark.len(), "loaded fresh snapshot");

        let snapshot = AnalyticsSnapshot { trades, benchmark };
        self.cache.put(key, snapshot.clone());
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingLedger {
        calls: Rc<Cell<usize>>,
    }

    impl TradeLedger for CountingLedger {
        fn closed_trades(
            &self,
            _window: DateWindow,
            _strategy_ids: Option<&[String]>,
        ) -> Result<Vec<LedgerTradeRow>, StoreError> {
            self.calls.set(self.calls.get() + 1);
            Ok(Vec::new())
        }
    }

    struct EmptyBenchmarks;

    impl BenchmarkStore for EmptyBenchmarks {
        fn closes(
            &self,
            _symbol: &str,
            _window: DateWindow,
        ) -> Result<Vec<BenchmarkRow>, StoreError> {
            Ok(Vec::new())
        }
    }

    fn loader_with_counter(ttl: Duration) -> (SnapshotLoader, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let loader = SnapshotLoader::new(
            Box::new(CountingLedger { calls: calls.clone() }),
            Box::new(EmptyBenchmarks),
            ttl,
        );
        (loader, calls)
    }

    #[test]
    fn repeated_loads_within_the_ttl_hit_the_cache() {
        let (mut loader, calls) = loader_with_counter(Duration::from_secs(30));
        loader.load("SPX", DateWindow::unbounded(), None).unwrap();
        loader.load("SPX", DateWindow::unbounded(), None).unwrap();
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn different_requests_are_cached_independently() {
        let (mut loader, calls) = loader_with_counter(Duration::from_secs(30));
        loader.load("SPX", DateWindow::unbounded(), None).unwrap();
        loader.load("NDX", DateWindow::unbounded(), None).unwrap();
        let ids = vec!["es-trend".to_string()];
        loader.load("SPX", DateWindow::unbounded(), Some(&ids)).unwrap();
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn a_zero_ttl_loader_always_refetches() {
        let (mut loader, calls) = loader_with_counter(Duration::ZERO);
        loader.load("SPX", DateWindow::unbounded(), None).unwrap();
        loader.load("SPX", DateWindow::unbounded(), None).unwrap();
        assert_eq!(calls.get(), 2);
    }
}
