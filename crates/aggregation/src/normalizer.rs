use core_types::{LedgerTradeRow, NormalizedTrade, StrategyClass, TradeRecord, TradeSide};
use rust_decimal::prelude::*;
use tracing::warn;

/// Converts one raw ledger row into an eligible [`NormalizedTrade`].
///
/// Returns `None` when the row is ineligible: still open, unparseable
/// side or class literal, a non-finite numeric field, or an exit
/// recorded before its entry. Ineligibility is a data-quality
/// condition, not an error; [`normalize_ledger`] logs each exclusion.
pub fn normalize_trade(row: &LedgerTradeRow) -> Option<NormalizedTrade> {
    let side: TradeSide = row.side.parse().ok()?;
    let class: StrategyClass = row.strategy_class.parse().ok()?;

    // `from_f64` returns `None` for NaN and infinities, which is
    // exactly the non-finite exclusion rule.
    let entry_price = Decimal::from_f64(row.entry_price)?;
    let quantity = Decimal::from_f64(row.quantity)?;
    let exit_price = Decimal::from_f64(row.exit_price?)?;
    let exit_time = row.exit_time?;
    if exit_time < row.entry_time {
        return None;
    }

    let record = TradeRecord {
        strategy_id: row.strategy_id.clone(),
        side,
        entry_price,
        exit_price: Some(exit_price),
        quantity,
        entry_time: row.entry_time,
        exit_time: Some(exit_time),
    };

    let pnl = record.pnl()?;
    let date = record.close_date()?;
    let notional = record.notional();

    Some(NormalizedTrade {
        date,
        strategy_id: record.strategy_id,
        strategy_name: row.strategy_name.clone(),
        class,
        side,
        pnl,
        notional,
    })
}

/// Normalizes a batch of ledger rows, logging a warning for every
/// excluded row so data-quality problems stay visible.
pub fn normalize_ledger(rows: &[LedgerTradeRow]) -> Vec<NormalizedTrade> {
    let mut eligible = Vec::with_capacity(rows.len());
    for row in rows {
        match normalize_trade(row) {
            Some(trade) => eligible.push(trade),
            None => warn!(
                strategy_id = %row.strategy_id,
                side = %row.side,
                class = %row.strategy_class,
                "excluding ineligible trade row from aggregation"
            ),
        }
    }
    eligible
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn sample_row() -> LedgerTradeRow {
        LedgerTradeRow {
            strategy_id: "es-trend".to_string(),
            strategy_name: "ES Trend".to_string(),
            strategy_class: "swing".to_string(),
            side: "long".to_string(),
            entry_price: 5000.0,
            exit_price: Some(5050.0),
            quantity: 2.0,
            entry_time: Utc.with_ymd_and_hms(2024, 3, 4, 14, 30, 0).unwrap(),
            exit_time: Some(Utc.with_ymd_and_hms(2024, 3, 6, 20, 0, 0).unwrap()),
        }
    }

    #[test]
    fn long_trade_normalizes_with_derived_pnl_and_exit_date() {
        let trade = normalize_trade(&sample_row()).unwrap();
        assert_eq!(trade.pnl, dec!(100.0));
        assert_eq!(trade.notional, dec!(10000.0));
        assert_eq!(trade.date, chrono::NaiveDate::from_ymd_opt(2024, 3, 6).unwrap());
        assert_eq!(trade.class, StrategyClass::Swing);
        assert_eq!(trade.side, TradeSide::Long);
    }

    #[test]
    fn short_trade_pnl_sign_is_inverted() {
        let mut row = sample_row();
        row.side = "short".to_string();
        let trade = normalize_trade(&row).unwrap();
        assert_eq!(trade.pnl, dec!(-100.0));
    }

    #[test]
    fn open_position_is_ineligible() {
        let mut row = sample_row();
        row.exit_price = None;
        row.exit_time = None;
        assert!(normalize_trade(&row).is_none());
    }

    #[test]
    fn unknown_side_or_class_is_ineligible() {
        let mut row = sample_row();
        row.side = "hedge".to_string();
        assert!(normalize_trade(&row).is_none());

        let mut row = sample_row();
        row.strategy_class = "scalp".to_string();
        assert!(normalize_trade(&row).is_none());
    }

    #[test]
    fn non_finite_numbers_are_ineligible() {
        let mut row = sample_row();
        row.entry_price = f64::NAN;
        assert!(normalize_trade(&row).is_none());

        let mut row = sample_row();
        row.exit_price = Some(f64::INFINITY);
        assert!(normalize_trade(&row).is_none());

        let mut row = sample_row();
        row.quantity = f64::NEG_INFINITY;
        assert!(normalize_trade(&row).is_none());
    }

    #[test]
    fn exit_before_entry_is_ineligible() {
        let mut row = sample_row();
        row.exit_time = Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        assert!(normalize_trade(&row).is_none());
    }

    #[test]
    fn batch_normalization_drops_only_ineligible_rows() {
        let good = sample_row();
        let mut bad = sample_row();
        bad.side = "hedge".to_string();
        let trades = normalize_ledger(&[good, bad]);
        assert_eq!(trades.len(), 1);
    }
}
