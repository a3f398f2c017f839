//! Overscan-based bias estimation and subtraction.

use serde::{Deserialize, Serialize};

use common::Buffer2;
use crate::math::statistics::{finite_median, sigma_clipped_mean};

/// How the bias level is estimated from the overscan.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum BiasMode {
    /// Median of each overscan row, subtracted from the matching data row.
    /// Tracks bias drift along the readout.
    #[default]
    PerRow,
    /// One sigma-clipped mean over the whole overscan.
    GlobalClippedMean {
        /// Clipping threshold in standard deviations.
        sigma: f32,
        /// Maximum clipping passes.
        iterations: u32,
    },
}

impl BiasMode {
    /// Sigma-clipped mean with 3σ clipping and three passes.
    pub fn clipped_mean() -> Self {
        Self::GlobalClippedMean {
            sigma: 3.0,
            iterations: 3,
        }
    }

    /// # Panics
    ///
    /// Panics on a non-positive clipping threshold.
    pub fn validate(&self) {
        if let BiasMode::GlobalClippedMean { sigma, .. } = self {
            assert!(*sigma > 0.0, "Clipping sigma must be positive, got {}", sigma);
        }
    }
}

/// The bias level that was removed.
#[derive(Debug, Clone, PartialEq)]
pub enum BiasEstimate {
    PerRow(Vec<f32>),
    Global(f32),
}

impl BiasEstimate {
    /// Average level over all rows.
    pub fn mean_level(&self) -> f32 {
        match self {
            Self::PerRow(levels) if levels.is_empty() => 0.0,
            Self::PerRow(levels) => {
                (levels.iter().map(|&v| v as f64).sum::<f64>() / levels.len() as f64) as f32
            }
            Self::Global(level) => *level,
        }
    }
}

/// Estimate the bias from `overscan` and subtract it from `data` in place.
///
/// Returns `None`, leaving `data` untouched, when the overscan (or, per row,
/// any overscan row) holds no finite sample.
pub fn subtract_bias(
    data: &mut Buffer2<f32>,
    overscan: &Buffer2<f32>,
    mode: BiasMode,
) -> Option<BiasEstimate> {
    let estimate = estimate_bias(overscan, mode)?;

    match &estimate {
        BiasEstimate::PerRow(levels) => {
            debug_assert_eq!(levels.len(), data.height());
            for (row, &level) in data.rows_mut().zip(levels) {
                for v in row {
                    *v -= level;
                }
            }
        }
        BiasEstimate::Global(level) => {
            for v in data.iter_mut() {
                *v -= level;
            }
        }
    }

    Some(estimate)
}

fn estimate_bias(overscan: &Buffer2<f32>, mode: BiasMode) -> Option<BiasEstimate> {
    match mode {
        BiasMode::PerRow => {
            let mut scratch = Vec::with_capacity(overscan.width());
            overscan
                .rows()
                .map(|row| finite_median(row, &mut scratch))
                .collect::<Option<Vec<f32>>>()
                .map(BiasEstimate::PerRow)
        }
        BiasMode::GlobalClippedMean { sigma, iterations } => {
            sigma_clipped_mean(overscan.pixels(), sigma, iterations).map(BiasEstimate::Global)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_row_subtracts_row_medians() {
        let mut data = Buffer2::new_filled(3, 2, 100.0f32);
        // Row 0 bias 10, row 1 bias 20 (with one hot pixel the median ignores).
        let overscan = Buffer2::new(3, 2, vec![10.0, 9.0, 11.0, 20.0, 20.0, 900.0]);

        let estimate = subtract_bias(&mut data, &overscan, BiasMode::PerRow).unwrap();

        assert_eq!(estimate, BiasEstimate::PerRow(vec![10.0, 20.0]));
        assert_eq!(data.row(0), &[90.0, 90.0, 90.0]);
        assert_eq!(data.row(1), &[80.0, 80.0, 80.0]);
    }

    #[test]
    fn test_global_clipped_mean_resists_outlier() {
        let mut data = Buffer2::new_filled(2, 1, 50.0f32);
        let overscan = Buffer2::new(5, 1, vec![10.0, 10.0, 10.0, 10.0, 1000.0]);

        let estimate = subtract_bias(&mut data, &overscan, BiasMode::clipped_mean()).unwrap();

        let BiasEstimate::Global(level) = estimate else {
            panic!("expected a global estimate");
        };
        assert!((level - 10.0).abs() < 1e-4, "Expected ~10, got {level}");
        assert!(data.iter().all(|&v| (v - 40.0).abs() < 1e-4));
    }

    #[test]
    fn test_constant_overscan_both_modes_agree() {
        for mode in [BiasMode::PerRow, BiasMode::clipped_mean()] {
            let mut data = Buffer2::new_filled(4, 4, 7.0f32);
            let overscan = Buffer2::new_filled(2, 4, 2.0f32);
            subtract_bias(&mut data, &overscan, mode).unwrap();
            assert!(data.iter().all(|&v| v == 5.0), "{mode:?}");
        }
    }

    #[test]
    fn test_non_finite_overscan_leaves_data_untouched() {
        let mut data = Buffer2::new_filled(2, 2, 7.0f32);
        let overscan = Buffer2::new(1, 2, vec![3.0, f32::NAN]);

        assert!(subtract_bias(&mut data, &overscan, BiasMode::PerRow).is_none());
        assert!(data.iter().all(|&v| v == 7.0));

        // The global estimate only needs one finite sample.
        assert_eq!(
            subtract_bias(&mut data, &overscan, BiasMode::clipped_mean()),
            Some(BiasEstimate::Global(3.0))
        );
    }

    #[test]
    #[should_panic(expected = "Clipping sigma must be positive")]
    fn test_validate_rejects_zero_sigma() {
        BiasMode::GlobalClippedMean {
            sigma: 0.0,
            iterations: 3,
        }
        .validate();
    }
}
