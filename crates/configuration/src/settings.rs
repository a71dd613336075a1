use rust_decimal::Decimal;
use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub account: AccountSettings,
    #[serde(default)]
    pub analytics: AnalyticsSettings,
    #[serde(default)]
    pub monte_carlo: MonteCarloSettings,
    #[serde(default)]
    pub episodes: EpisodeSettings,
    #[serde(default)]
    pub chart: ChartSettings,
    pub data: DataSettings,
}

impl Config {
    /// Checks cross-field invariants that deserialization cannot express.
    pub fn validate(&self) -> Result<(), crate::error::ConfigError> {
        use crate::error::ConfigError::ValidationError;

        if self.account.balance <= Decimal::ZERO {
            return Err(ValidationError("account.balance must be positive".to_string()));
        }
        if self.analytics.trading_days_per_year == 0 {
            return Err(ValidationError(
                "analytics.trading_days_per_year must be positive".to_string(),
            ));
        }
        if self.analytics.rolling_window < 2 {
            return Err(ValidationError(
                "analytics.rolling_window must be at least 2".to_string(),
            ));
        }
        if self.analytics.distribution_buckets == 0 {
            return Err(ValidationError(
                "analytics.distribution_buckets must be positive".to_string(),
            ));
        }
        if self.monte_carlo.horizon_days == 0 || self.monte_carlo.simulations == 0 {
            return Err(ValidationError(
                "monte_carlo.horizon_days and monte_carlo.simulations must be positive".to_string(),
            ));
        }
        if self.episodes.min_depth_pct >= 0.0 {
            return Err(ValidationError(
                "episodes.min_depth_pct is a drawdown depth and must be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Account-level inputs for capital-based metrics.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountSettings {
    /// The account balance used as the capital base for return and
    /// risk-of-ruin calculations.
    pub balance: Decimal,
    /// Ticker of the benchmark series the strategy curves are compared
    /// against (e.g., "SPX").
    pub benchmark_symbol: String,
}

/// Statistical conventions for the metrics engine.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalyticsSettings {
    /// Annualization convention for daily statistics.
    pub trading_days_per_year: u32,
    /// Annual risk-free rate as a fraction (0.02 corresponds to 2%).
    pub risk_free_rate: f64,
    /// Observation count for rolling volatility and rolling Sharpe.
    pub rolling_window: usize,
    /// Number of fixed-width bins in the daily-return histogram.
    pub distribution_buckets: usize,
}

/// Parameters for the forward equity projection.
#[derive(Debug, Clone, Deserialize)]
pub struct MonteCarloSettings {
    /// Simulated horizon in calendar days.
    pub horizon_days: usize,
    /// Number of simulated paths.
    pub simulations: usize,
    /// Fixed RNG seed for reproducible projections. Omit for entropy.
    pub seed: Option<u64>,
}

/// Thresholds for major-drawdown episode detection.
#[derive(Debug, Clone, Deserialize)]
pub struct EpisodeSettings {
    /// Episodes with a trough shallower than this percentage are
    /// dropped. Must be negative; the default keeps anything deeper
    /// than -10%.
    pub min_depth_pct: f64,
}

/// Presentation limits for curve output.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartSettings {
    /// Maximum number of curve points handed to a chart consumer;
    /// longer series are downsampled.
    pub max_points: usize,
}

/// Locations of the collaborator data files.
#[derive(Debug, Clone, Deserialize)]
pub struct DataSettings {
    /// CSV file holding the closed-trade ledger rows.
    pub trades_file: String,
    /// CSV file holding the benchmark price history.
    pub benchmark_file: String,
    /// Lifetime of a cached analytics snapshot, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

fn default_cache_ttl_secs() -> u64 {
    30
}

// --- Default Implementations ---
// These allow a user to omit whole sections from their toml and still
// get a working configuration.

impl Default for AnalyticsSettings {
    fn default() -> Self {
        Self {
            trading_days_per_year: 252,
            risk_free_rate: 0.0,
            rolling_window: 60,
            distribution_buckets: 20,
        }
    }
}

impl Default for MonteCarloSettings {
    fn default() -> Self {
        Self { horizon_days: 252, simulations: 1000, seed: None }
    }
}

impl Default for EpisodeSettings {
    fn default() -> Self {
        Self { min_depth_pct: -10.0 }
    }
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self { max_points: 500 }
    }
}
