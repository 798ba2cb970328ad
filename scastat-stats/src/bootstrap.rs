//! Bootstrap Resampling
//!
//! Percentile bootstrap confidence intervals for the median. Resampling is
//! driven by a seeded `ChaCha8Rng`, so the same sample, iteration count and
//! seed always reproduce the same interval bit for bit.

use crate::percentiles::{median_of_sorted, percentile_of_sorted, sort_samples};
use crate::{DEFAULT_BOOTSTRAP_ITERATIONS, DEFAULT_BOOTSTRAP_SEED, DEFAULT_CONFIDENCE_LEVEL};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bootstrap configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapConfig {
    /// Number of resamples (default: 6,000)
    pub iterations: usize,
    /// Confidence level (default: 0.95 for 95% CI)
    pub confidence_level: f64,
    /// Seed for the resampling RNG
    pub seed: u64,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_BOOTSTRAP_ITERATIONS,
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            seed: DEFAULT_BOOTSTRAP_SEED,
        }
    }
}

/// Confidence interval bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    /// Lower percentile bound
    pub lower: f64,
    /// Upper percentile bound
    pub upper: f64,
    /// Confidence level the bounds were taken at (e.g. 0.95)
    pub level: f64,
}

impl ConfidenceInterval {
    /// True when either bound is NaN (bootstrap over an empty sample).
    pub fn is_undefined(&self) -> bool {
        self.lower.is_nan() || self.upper.is_nan()
    }
}

/// Result of a median bootstrap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BootstrapResult {
    /// Sample median (NaN for an empty sample)
    pub point_estimate: f64,
    /// Percentile interval of the resampled medians
    pub confidence_interval: ConfidenceInterval,
    /// Number of resamples drawn
    pub iterations: usize,
    /// Size of the original sample
    pub sample_count: usize,
}

/// Errors that can occur during bootstrap
#[derive(Debug, Error, PartialEq)]
pub enum BootstrapError {
    /// Confidence level outside `(0, 1)`
    #[error("Invalid confidence level: {0} (must be between 0 and 1)")]
    InvalidConfidenceLevel(f64),

    /// `iterations` was zero
    #[error("Bootstrap needs at least one iteration")]
    ZeroIterations,
}

/// 95% percentile-bootstrap interval for the median.
///
/// Returns `(NaN, NaN)` for an empty sample rather than failing, so a single
/// empty group does not abort a batch. A one-element sample collapses to
/// `(x, x)`.
///
/// ```
/// # use scastat_stats::median_ci95;
/// assert_eq!(median_ci95(&[5.0], 100, 1), (5.0, 5.0));
/// let (low, high) = median_ci95(&[], 100, 1);
/// assert!(low.is_nan() && high.is_nan());
/// ```
pub fn median_ci95(sample: &[f64], iterations: usize, seed: u64) -> (f64, f64) {
    if sample.is_empty() || iterations == 0 {
        return (f64::NAN, f64::NAN);
    }
    let medians = bootstrap_medians(sample, iterations, seed);
    percentile_interval(&medians, 0.95)
}

/// Median bootstrap with an explicit configuration
pub fn compute_median_bootstrap(
    sample: &[f64],
    config: &BootstrapConfig,
) -> Result<BootstrapResult, BootstrapError> {
    if config.confidence_level <= 0.0 || config.confidence_level >= 1.0 {
        return Err(BootstrapError::InvalidConfidenceLevel(
            config.confidence_level,
        ));
    }
    if config.iterations == 0 {
        return Err(BootstrapError::ZeroIterations);
    }

    let (point_estimate, (lower, upper)) = if sample.is_empty() {
        (f64::NAN, (f64::NAN, f64::NAN))
    } else {
        let mut sorted = sample.to_vec();
        sort_samples(&mut sorted);
        let medians = bootstrap_medians(sample, config.iterations, config.seed);
        (
            median_of_sorted(&sorted),
            percentile_interval(&medians, config.confidence_level),
        )
    };

    Ok(BootstrapResult {
        point_estimate,
        confidence_interval: ConfidenceInterval {
            lower,
            upper,
            level: config.confidence_level,
        },
        iterations: config.iterations,
        sample_count: sample.len(),
    })
}

/// Draw `iterations` resamples with replacement and return their medians.
///
/// Serial on purpose: a single RNG stream is what makes the output depend
/// only on `(sample, iterations, seed)`.
fn bootstrap_medians(sample: &[f64], iterations: usize, seed: u64) -> Vec<f64> {
    let n = sample.len();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut resample = vec![0.0; n];

    (0..iterations)
        .map(|_| {
            for slot in resample.iter_mut() {
                *slot = sample[rng.gen_range(0..n)];
            }
            sort_samples(&mut resample);
            median_of_sorted(&resample)
        })
        .collect()
}

/// Two-sided percentile interval with linear interpolation
fn percentile_interval(bootstrap_stats: &[f64], confidence: f64) -> (f64, f64) {
    let mut sorted = bootstrap_stats.to_vec();
    sort_samples(&mut sorted);

    let alpha = (1.0 - confidence) / 2.0;
    (
        percentile_of_sorted(&sorted, alpha * 100.0),
        percentile_of_sorted(&sorted, (1.0 - alpha) * 100.0),
    )
}
