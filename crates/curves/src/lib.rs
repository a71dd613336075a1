//! # Vantage Curves
//!
//! The canonical equity- and drawdown-curve constructor plus the
//! shape-preserving downsampler that feeds chart consumers.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** Pure transformation over aggregated daily
//!   buckets. No I/O, no knowledge of where the buckets came from.
//! - **One canonical builder:** `build_equity_curves` is the single
//!   source of truth for date alignment, fill rules, and zero-based
//!   normalization. Every downstream statistic reads its output.
//!
//! ## Public API
//!
//! - `build_equity_curves` / `build_drawdown_curves`: the curve pass.
//! - `downsample_curve` / `downsample_indices`: largest-triangle-three-
//!   buckets reduction, with the kept rows exposed so companion curves
//!   reduce consistently.

// Declare the modules that constitute this crate.
pub mod builder;
pub mod downsample;

// Re-export the key components to create a clean, public-facing API.
pub use builder::{build_drawdown_curves, build_equity_curves};
pub use downsample::{downsample_curve, downsample_indices};
