#![warn(missing_docs)]
//! scastat Statistical Engine
//!
//! Provides the statistics behind scastat's result tables:
//! - Percentiles with linear interpolation between order statistics
//! - Mean, sample standard deviation and normal-approximation 95% CIs
//! - Seeded percentile bootstrap for the median

mod bootstrap;
mod percentiles;
mod summary;

pub use bootstrap::{
    BootstrapConfig, BootstrapError, BootstrapResult, ConfidenceInterval,
    compute_median_bootstrap, median_ci95,
};
pub use percentiles::{compute_median, compute_percentile, median_of_sorted, percentile_of_sorted};
pub use summary::{
    MeanCi, mean, mean_ci95, relative_change_percent, round_to, sample_std_dev,
};

/// Default number of bootstrap iterations
pub const DEFAULT_BOOTSTRAP_ITERATIONS: usize = 6_000;

/// Default seed for the bootstrap RNG
pub const DEFAULT_BOOTSTRAP_SEED: u64 = 12_345;

/// Default confidence level (95%)
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// z-score of a two-sided 95% normal interval
pub const NORMAL_Z_95: f64 = 1.96;

/// Decimal places summary tables are rounded to
pub const SUMMARY_PRECISION: u32 = 6;
