use core_types::{
    BenchmarkRow, DailyBuckets, DailyPnlRow, DateWindow, NormalizedTrade, StrategyClass,
};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tracing::debug;

/// Groups eligible trades into per-day PnL sums.
///
/// Every trade lands in `combined` and in exactly one of the
/// `swing`/`intraday` buckets according to its strategy class. The
/// benchmark series is carried through sparse; forward-filling is the
/// curve builder's job because a price is a level, not a flow.
pub fn aggregate_daily(
    trades: &[NormalizedTrade],
    benchmark: &[BenchmarkRow],
    window: DateWindow,
) -> DailyBuckets {
    let mut buckets = DailyBuckets::default();

    for trade in trades.iter().filter(|t| window.contains(t.date)) {
        *buckets.combined.entry(trade.date).or_insert(Decimal::ZERO) += trade.pnl;
        let class_bucket = match trade.class {
            StrategyClass::Swing => &mut buckets.swing,
            StrategyClass::Intraday => &mut buckets.intraday,
        };
        *class_bucket.entry(trade.date).or_insert(Decimal::ZERO) += trade.pnl;
    }

    for row in benchmark.iter().filter(|r| window.contains(r.date)) {
        buckets.benchmark.insert(row.date, row.close);
    }

    debug!(
        pnl_days = buckets.combined.len(),
        benchmark_days = buckets.benchmark.len(),
        "aggregated daily buckets"
    );
    buckets
}

/// Sums same-day trades per strategy, producing one row per
/// (date, strategy) pair ordered by date and then strategy id.
pub fn aggregate_by_strategy(trades: &[NormalizedTrade]) -> Vec<DailyPnlRow> {
    let mut sums: BTreeMap<(chrono::NaiveDate, String), (StrategyClass, Decimal)> = BTreeMap::new();
    for trade in trades {
        let entry = sums
            .entry((trade.date, trade.strategy_id.clone()))
            .or_insert((trade.class, Decimal::ZERO));
        entry.1 += trade.pnl;
    }

    sums.into_iter()
        .map(|((date, strategy_id), (class, daily_pnl))| DailyPnlRow {
            date,
            strategy_id,
            class,
            daily_pnl,
        })
        .collect()
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

    fn trade(date: NaiveDate, id: &str, class: StrategyClass, pnl: Decimal) -> NormalizedTrade {
        NormalizedTrade {
            date,
            strategy_id: id.to_string(),
            strategy_name: id.to_string(),
            class,
            side: TradeSide::Long,
            pnl,
            notional: dec!(10000),
        }
    }

    #[test]
    fn class_buckets_sum_to_combined() {
        let trades = vec![
            trade(day(3), "a", StrategyClass::Swing, dec!(100)),
            trade(day(3), "b", StrategyClass::Intraday, dec!(20)),
            trade(day(4), "a", StrategyClass::Swing, dec!(-50)),
        ];
        let buckets = aggregate_daily(&trades, &[], DateWindow::unbounded());

        assert_eq!(buckets.combined[&day(3)], dec!(120));
        assert_eq!(buckets.combined[&day(4)], dec!(-50));
        assert_eq!(buckets.swing[&day(3)], dec!(100));
        assert_eq!(buckets.intraday[&day(3)], dec!(20));
        assert!(!buckets.intraday.contains_key(&day(4)));

        for (date, total) in &buckets.combined {
            let swing = buckets.swing.get(date).copied().unwrap_or(Decimal::ZERO);
            let intraday = buckets.intraday.get(date).copied().unwrap_or(Decimal::ZERO);
            assert_eq!(swing + intraday, *total);
        }
    }

    #[test]
    fn same_day_trades_are_summed() {
        let trades = vec![
            trade(day(3), "a", StrategyClass::Swing, dec!(75)),
            trade(day(3), "a", StrategyClass::Swing, dec!(-25)),
        ];
        let buckets = aggregate_daily(&trades, &[], DateWindow::unbounded());
        assert_eq!(buckets.combined[&day(3)], dec!(50));
        assert_eq!(buckets.swing[&day(3)], dec!(50));
    }

    #[test]
    fn window_filter_is_inclusive_on_both_bounds() {
        let trades = vec![
            trade(day(1), "a", StrategyClass::Swing, dec!(1)),
            trade(day(2), "a", StrategyClass::Swing, dec!(2)),
            trade(day(5), "a", StrategyClass::Swing, dec!(5)),
        ];
        let benchmark = vec![
            BenchmarkRow { date: day(1), close: dec!(5000) },
            BenchmarkRow { date: day(3), close: dec!(5010) },
            BenchmarkRow { date: day(6), close: dec!(5020) },
        ];
        let window = DateWindow::new(Some(day(2)), Some(day(5))).unwrap();
        let buckets = aggregate_daily(&trades, &benchmark, window);

        assert!(!buckets.combined.contains_key(&day(1)));
        assert_eq!(buckets.combined[&day(2)], dec!(2));
        assert_eq!(buckets.combined[&day(5)], dec!(5));
        assert_eq!(buckets.benchmark.len(), 1);
        assert_eq!(buckets.benchmark[&day(3)], dec!(5010));
    }

    #[test]
    fn per_strategy_rows_sum_same_day_trades() {
        let trades = vec![
            trade(day(3), "a", StrategyClass::Swing, dec!(100)),
            trade(day(3), "a", StrategyClass::Swing, dec!(-40)),
            trade(day(3), "b", StrategyClass::Intraday, dec!(20)),
            trade(day(4), "a", StrategyClass::Swing, dec!(10)),
        ];
        let rows = aggregate_by_strategy(&trades);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].strategy_id, "a");
        assert_eq!(rows[0].daily_pnl, dec!(60));
        assert_eq!(rows[1].strategy_id, "b");
        assert_eq!(rows[2].date, day(4));
    }
}
