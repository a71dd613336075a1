use crate::error::AggregationError;
use core_types::NormalizedTrade;

/// Renders normalized trades as a CSV document with a header row.
///
/// Quoting follows the standard rules: fields containing a comma, a
/// double quote, or a line break are wrapped in quotes and embedded
/// quotes are doubled.
pub fn trades_to_csv(trades: &[NormalizedTrade]) -> Result<String, AggregationError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "date",
        "strategy_id",
        "strategy_name",
        "class",
        "side",
        "pnl",
        "notional",
    ])?;

    for trade in trades {
        writer.write_record([
            trade.date.to_string(),
            trade.strategy_id.clone(),
            trade.strategy_name.clone(),
            trade.class.to_string(),
            trade.side.to_string(),
            trade.pnl.to_string(),
            trade.notional.to_string(),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}
