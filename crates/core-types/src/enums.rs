use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeSide {
    Long,
    Short,
}

impl FromStr for TradeSide {
    type Err = CoreError;

    /// Parses the side literal as recorded by the ledger, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "long" => Ok(TradeSide::Long),
            "short" => Ok(TradeSide::Short),
            _ => Err(CoreError::InvalidInput("side".to_string(), s.to_string())),
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Long => write!(f, "long"),
            TradeSide::Short => write!(f, "short"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StrategyClass {
    Swing,
    Intraday,
}

impl FromStr for StrategyClass {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "swing" => Ok(StrategyClass::Swing),
            "intraday" => Ok(StrategyClass::Intraday),
            _ => Err(CoreError::InvalidInput("class".to_string(), s.to_string())),
        }
    }
}

impl fmt::Display for StrategyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyClass::Swing => write!(f, "swing"),
            StrategyClass::Intraday => write!(f, "intraday"),
        }
    }
}

/// Fill rule applied when a series is materialized over the shared
/// date axis. PnL is a flow (a missing day contributes zero); a price
/// is a level (a missing day carries the last observed value).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeriesKind {
    Flow,
    Level,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_literals_parse_case_insensitively() {
        assert_eq!("long".parse::<TradeSide>().unwrap(), TradeSide::Long);
        assert_eq!("SHORT".parse::<TradeSide>().unwrap(), TradeSide::Short);
        assert_eq!(" Long ".parse::<TradeSide>().unwrap(), TradeSide::Long);
    }

    #[test]
    fn unknown_side_literal_is_rejected() {
        assert!("buy".parse::<TradeSide>().is_err());
        assert!("".parse::<TradeSide>().is_err());
    }

    #[test]
    fn class_literals_parse_case_insensitively() {
        assert_eq!("swing".parse::<StrategyClass>().unwrap(), StrategyClass::Swing);
        assert_eq!("Intraday".parse::<StrategyClass>().unwrap(), StrategyClass::Intraday);
        assert!("scalp".parse::<StrategyClass>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        assert_eq!(TradeSide::Short.to_string().parse::<TradeSide>().unwrap(), TradeSide::Short);
        assert_eq!(
            StrategyClass::Intraday.to_string().parse::<StrategyClass>().unwrap(),
            StrategyClass::Intraday
        );
    }
}
