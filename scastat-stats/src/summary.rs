//! Summary Statistics
//!
//! Mean, sample standard deviation and the normal-approximation confidence
//! interval used for per-config tables:
//! - `n >= 2`: `1.96 * sd(ddof = 1) / sqrt(n)`
//! - `n == 1`: `0.0`
//! - `n == 0`: no value at all

use serde::{Deserialize, Serialize};

use crate::NORMAL_Z_95;

/// Mean and 95% CI half-width of a sample, unrounded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanCi {
    /// Arithmetic mean (`None` for an empty sample)
    pub mean: Option<f64>,
    /// CI half-width (`None` for an empty sample, `0.0` for one value)
    pub ci95: Option<f64>,
    /// Sample standard deviation with `ddof = 1` (`None` below 2 values)
    pub std_dev: Option<f64>,
    /// Number of values the figures were computed from
    pub sample_count: usize,
}

impl MeanCi {
    /// Round mean, CI and std-dev to `places` decimals.
    pub fn rounded(self, places: u32) -> Self {
        Self {
            mean: self.mean.map(|v| round_to(v, places)),
            ci95: self.ci95.map(|v| round_to(v, places)),
            std_dev: self.std_dev.map(|v| round_to(v, places)),
            sample_count: self.sample_count,
        }
    }
}

/// Arithmetic mean, `None` when empty.
pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Sample standard deviation (`ddof = 1`), `None` below two values.
pub fn sample_std_dev(samples: &[f64]) -> Option<f64> {
    if samples.len() < 2 {
        return None;
    }
    let m = mean(samples)?;
    let variance =
        samples.iter().map(|x| (x - m).powi(2)).sum::<f64>() / (samples.len() - 1) as f64;
    Some(variance.sqrt())
}

/// Mean with its normal-approximation 95% CI half-width.
pub fn mean_ci95(samples: &[f64]) -> MeanCi {
    let n = samples.len();
    let std_dev = sample_std_dev(samples);
    let ci95 = match n {
        0 => None,
        1 => Some(0.0),
        _ => std_dev.map(|sd| NORMAL_Z_95 * sd / (n as f64).sqrt()),
    };

    MeanCi {
        mean: mean(samples),
        ci95,
        std_dev,
        sample_count: n,
    }
}

/// Round half away from zero to a fixed number of decimal places.
///
/// Non-finite values pass through unchanged.
pub fn round_to(value: f64, places: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}

/// Relative change of `value` against `reference`, in percent.
///
/// NaN when the reference is zero or NaN.
pub fn relative_change_percent(value: f64, reference: f64) -> f64 {
    if reference == 0.0 || reference.is_nan() {
        return f64::NAN;
    }
    100.0 * (value - reference) / reference
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_value_has_zero_ci() {
        let summary = mean_ci95(&[10.0]);
        assert_eq!(summary.mean, Some(10.0));
        assert_eq!(summary.ci95, Some(0.0));
        assert_eq!(summary.std_dev, None);
        assert_eq!(summary.sample_count, 1);
    }

    #[test]
    fn test_three_values() {
        let summary = mean_ci95(&[1.0, 2.0, 3.0]);
        assert!((summary.mean.unwrap() - 2.0).abs() < 1e-12);
        assert!((summary.std_dev.unwrap() - 1.0).abs() < 1e-12);
        let expected = 1.96 * 1.0 / 3f64.sqrt();
        assert!((summary.ci95.unwrap() - expected).abs() < 1e-12);
    }

    #[test]
    fn test_two_values_ci_is_z() {
        // sd([4, 6]) = sqrt(2), so sd / sqrt(2) = 1
        let summary = mean_ci95(&[4.0, 6.0]);
        assert!((summary.mean.unwrap() - 5.0).abs() < 1e-12);
        assert!((summary.ci95.unwrap() - 1.96).abs() < 1e-12);
    }

    #[test]
    fn test_empty_sample_has_no_values() {
        let summary = mean_ci95(&[]);
        assert_eq!(summary.mean, None);
        assert_eq!(summary.ci95, None);
        assert_eq!(summary.sample_count, 0);
    }

    #[test]
    fn test_rounding() {
        assert_eq!(round_to(1.131_605_5, 6), 1.131_606);
        assert_eq!(round_to(-2.5, 0), -3.0);
        assert!(round_to(f64::NAN, 6).is_nan());

        let rounded = mean_ci95(&[1.0, 2.0, 3.0]).rounded(6);
        assert_eq!(rounded.ci95, Some(1.131_607));
    }

    #[test]
    fn test_relative_change() {
        assert!((relative_change_percent(110.0, 100.0) - 10.0).abs() < 1e-12);
        assert!(relative_change_percent(1.0, 0.0).is_nan());
        assert!(relative_change_percent(1.0, f64::NAN).is_nan());
    }
}
