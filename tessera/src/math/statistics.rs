//! Robust statistics for bias estimation: median, MAD, sigma-clipped mean.

/// MAD (Median Absolute Deviation) to standard deviation conversion factor.
///
/// For a normal distribution, σ ≈ 1.4826 × MAD.
pub const MAD_TO_SIGMA: f32 = 1.4826022;

#[inline]
pub fn mad_to_sigma(mad: f32) -> f32 {
    mad * MAD_TO_SIGMA
}

/// Calculate the median of f32 values in-place.
///
/// Mutates the input buffer (partial sort via quickselect).
#[inline]
pub fn median_f32_mut(data: &mut [f32]) -> f32 {
    debug_assert!(!data.is_empty());

    let len = data.len();
    let mid = len / 2;

    let (left_part, median, _) = data.select_nth_unstable_by(mid, f32::total_cmp);
    let upper = *median;
    if len % 2 == 1 {
        upper
    } else {
        let lower = left_part.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        (lower + upper) * 0.5
    }
}

/// Median of the finite values in `values`, or `None` if there are none.
///
/// `scratch` is reused between calls to avoid reallocating per row.
pub fn finite_median(values: &[f32], scratch: &mut Vec<f32>) -> Option<f32> {
    scratch.clear();
    scratch.extend(values.iter().copied().filter(|v| v.is_finite()));
    if scratch.is_empty() {
        return None;
    }
    Some(median_f32_mut(scratch))
}

/// Mean and population standard deviation, accumulated in f64.
fn mean_and_std(values: &[f32]) -> (f32, f32) {
    debug_assert!(!values.is_empty());

    let n = values.len() as f64;
    let mean = values.iter().map(|&v| v as f64).sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|&v| (v as f64 - mean).powi(2))
        .sum::<f64>()
        / n;
    (mean as f32, variance.sqrt() as f32)
}

/// Sigma-clipped mean of the finite values in `values`.
///
/// The first pass centres on the median with σ estimated from the MAD, so a
/// handful of extreme samples cannot inflate the initial threshold. Later passes
/// use the mean and standard deviation of the survivors. Each pass drops samples
/// further than `kappa × σ` from the centre; clipping stops early once a pass
/// rejects nothing or would reject everything. Returns `None` when `values` holds
/// no finite sample.
pub fn sigma_clipped_mean(values: &[f32], kappa: f32, iterations: u32) -> Option<f32> {
    let mut kept: Vec<f32> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if kept.is_empty() {
        return None;
    }

    let mut scratch = kept.clone();
    let mut center = median_f32_mut(&mut scratch);
    for v in scratch.iter_mut() {
        *v = (*v - center).abs();
    }
    let mut sigma = mad_to_sigma(median_f32_mut(&mut scratch));

    for _ in 0..iterations {
        let threshold = kappa * sigma;
        let survivors = kept
            .iter()
            .filter(|&&v| (v - center).abs() <= threshold)
            .count();
        if survivors == kept.len() || survivors == 0 {
            break;
        }

        kept.retain(|&v| (v - center).abs() <= threshold);
        (center, sigma) = mean_and_std(&kept);
    }

    Some(mean_and_std(&kept).0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_median_odd() {
        let mut values = vec![1.0f32, 3.0, 2.0, 5.0, 4.0];
        assert!((median_f32_mut(&mut values) - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_median_even() {
        let mut values = vec![1.0f32, 2.0, 3.0, 4.0];
        assert!((median_f32_mut(&mut values) - 2.5).abs() < f32::EPSILON);
    }

    #[test]
    fn test_median_single() {
        let mut values = vec![7.5f32];
        assert_eq!(median_f32_mut(&mut values), 7.5);
    }

    #[test]
    fn test_finite_median_skips_nan() {
        let mut scratch = Vec::new();
        let values = [f32::NAN, 1.0, 9.0, 5.0, f32::INFINITY];
        assert_eq!(finite_median(&values, &mut scratch), Some(5.0));
    }

    #[test]
    fn test_finite_median_all_nan() {
        let mut scratch = Vec::new();
        assert_eq!(finite_median(&[f32::NAN, f32::NAN], &mut scratch), None);
        assert_eq!(finite_median(&[], &mut scratch), None);
    }

    #[test]
    fn test_clipped_mean_rejects_single_outlier() {
        let values = [10.0f32, 10.0, 10.0, 10.0, 1000.0];
        let mean = sigma_clipped_mean(&values, 3.0, 3).unwrap();
        assert!((mean - 10.0).abs() < 1e-4, "Expected ~10, got {mean}");
        // The plain mean would be 208.
        let plain: f32 = values.iter().sum::<f32>() / values.len() as f32;
        assert!((plain - 208.0).abs() < 1e-3);
    }

    #[test]
    fn test_clipped_mean_constant() {
        let values = vec![2.0f32; 40];
        assert_eq!(sigma_clipped_mean(&values, 3.0, 3), Some(2.0));
    }

    #[test]
    fn test_clipped_mean_noisy_with_hot_pixels() {
        // Alternating +-1 around 100 with two hot pixels.
        let mut values: Vec<f32> = (0..200)
            .map(|i| if i % 2 == 0 { 101.0 } else { 99.0 })
            .collect();
        values[17] = 5000.0;
        values[123] = 4000.0;

        let mean = sigma_clipped_mean(&values, 3.0, 5).unwrap();
        assert!((mean - 100.0).abs() < 0.1, "Expected ~100, got {mean}");
    }

    #[test]
    fn test_clipped_mean_keeps_inliers_mean() {
        // No outliers: the clipped mean equals the plain mean.
        let values = [1.0f32, 2.0, 3.0, 4.0, 5.0];
        let mean = sigma_clipped_mean(&values, 3.0, 3).unwrap();
        assert!((mean - 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_clipped_mean_zero_iterations_is_plain_mean() {
        let values = [10.0f32, 10.0, 10.0, 10.0, 1000.0];
        let mean = sigma_clipped_mean(&values, 3.0, 0).unwrap();
        assert!((mean - 208.0).abs() < 1e-3);
    }

    #[test]
    fn test_clipped_mean_ignores_non_finite() {
        let values = [4.0f32, f32::NAN, 4.0, f32::NEG_INFINITY, 4.0];
        assert_eq!(sigma_clipped_mean(&values, 3.0, 3), Some(4.0));
        assert_eq!(sigma_clipped_mean(&[f32::NAN], 3.0, 3), None);
    }
}
