//! # Vantage Distribution Analyzer
//!
//! Return-distribution statistics and major-drawdown episode detection.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** Pure functions over a dated equity curve or a
//!   daily-return list; no I/O and no state.
//! - **Population moments:** Skewness and kurtosis use the population
//!   formulas (kurtosis is reported as excess, so a normal sample sits
//!   near zero). This intentionally coexists with the projector's
//!   i.i.d.-normal sampler, which ignores both.
//!
//! ## Public API
//!
//! - `analyze_returns`: histogram, moments, and tail/day-outcome summary.
//! - `detect_episodes`: peak-to-trough-to-recovery drawdown episodes.

// Declare the modules that constitute this crate.
pub mod episodes;
pub mod histogram;

// Re-export the key components to create a clean, public-facing API.
pub use episodes::{DrawdownEpisode, detect_episodes};
pub use histogram::{DistributionBucket, ReturnDistribution, analyze_returns};
