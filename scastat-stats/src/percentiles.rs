//! Percentile Computation
//!
//! Percentiles use linear interpolation between order statistics
//! (`rank = p * (n - 1)`), the conventional definition shared by most
//! numerical libraries, so results can be checked against a reference
//! implementation.

/// Compute a single percentile from samples
///
/// Uses linear interpolation between nearest ranks. Returns NaN for an empty
/// sample so that callers can tell "no data" apart from a real zero.
///
/// # Examples
///
/// ```
/// # use scastat_stats::compute_percentile;
/// let samples = vec![1.0, 2.0, 3.0, 4.0, 5.0];
/// assert_eq!(compute_percentile(&samples, 50.0), 3.0);
/// assert_eq!(compute_percentile(&samples, 25.0), 2.0);
/// ```
pub fn compute_percentile(samples: &[f64], percentile: f64) -> f64 {
    if samples.is_empty() {
        return f64::NAN;
    }

    let mut sorted = samples.to_vec();
    sort_samples(&mut sorted);
    percentile_of_sorted(&sorted, percentile)
}

/// Percentile of an already sorted slice.
///
/// The slice must be sorted ascending; NaN is returned when it is empty.
pub fn percentile_of_sorted(sorted: &[f64], percentile: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted[0];
    }

    let p = (percentile / 100.0).clamp(0.0, 1.0);

    // Linear interpolation between nearest ranks
    let rank = p * (n - 1) as f64;
    let lower_idx = rank.floor() as usize;
    let upper_idx = (lower_idx + 1).min(n - 1);
    let fraction = rank - lower_idx as f64;

    sorted[lower_idx] + fraction * (sorted[upper_idx] - sorted[lower_idx])
}

/// Median of a sample; mean of the two middle values for even lengths.
pub fn compute_median(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return f64::NAN;
    }
    let mut sorted = samples.to_vec();
    sort_samples(&mut sorted);
    median_of_sorted(&sorted)
}

/// Median of an already sorted slice.
pub fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    match n {
        0 => f64::NAN,
        _ if n % 2 == 1 => sorted[n / 2],
        _ => (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0,
    }
}

/// Sort ascending using IEEE total ordering.
pub(crate) fn sort_samples(samples: &mut [f64]) {
    samples.sort_by(f64::total_cmp);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median() {
        let samples = vec![5.0, 1.0, 4.0, 2.0, 3.0];
        assert!((compute_percentile(&samples, 50.0) - 3.0).abs() < f64::EPSILON);
        assert!((compute_median(&samples) - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_even_median_is_midpoint() {
        let samples = vec![4.0, 1.0, 3.0, 2.0];
        assert!((compute_median(&samples) - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_linear_interpolation() {
        // rank = 0.975 * 3 = 2.925 -> 3 + 0.925 * (4 - 3)
        let samples = vec![1.0, 2.0, 3.0, 4.0];
        let p = compute_percentile(&samples, 97.5);
        assert!((p - 3.925).abs() < 1e-12);

        // rank = 0.025 * 3 = 0.075 -> 1 + 0.075
        let p = compute_percentile(&samples, 2.5);
        assert!((p - 1.075).abs() < 1e-12);
    }

    #[test]
    fn test_quartiles() {
        let samples: Vec<f64> = (1..=100).map(|x| x as f64).collect();
        assert!((compute_percentile(&samples, 25.0) - 25.75).abs() < 1e-9);
        assert!((compute_percentile(&samples, 75.0) - 75.25).abs() < 1e-9);
    }

    #[test]
    fn test_single_sample() {
        let samples = vec![42.0];
        assert!((compute_percentile(&samples, 2.5) - 42.0).abs() < f64::EPSILON);
        assert!((compute_median(&samples) - 42.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_empty_samples_are_nan() {
        let samples: Vec<f64> = Vec::new();
        assert!(compute_percentile(&samples, 50.0).is_nan());
        assert!(compute_median(&samples).is_nan());
    }

    #[test]
    fn test_extremes_hit_min_and_max() {
        let samples = vec![3.0, -1.0, 7.0];
        assert_eq!(compute_percentile(&samples, 0.0), -1.0);
        assert_eq!(compute_percentile(&samples, 100.0), 7.0);
    }
}
