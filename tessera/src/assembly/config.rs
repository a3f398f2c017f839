//! Assembly configuration.

use serde::{Deserialize, Serialize};

use super::bias::BiasMode;

/// What to do when an amplifier's pixels cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MissingDataPolicy {
    /// Leave the tile at zero and report the amplifier in
    /// [`AssembledImage::missing`](super::AssembledImage::missing).
    #[default]
    Skip,
    /// Fail the whole assembly.
    Abort,
}

/// Parameters of one mosaic assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    /// Bias-correct each amplifier and keep only its data region.
    pub trim: bool,
    /// Bias estimator used when trimming.
    pub bias: BiasMode,
    pub missing_data: MissingDataPolicy,
    /// Prepare amplifiers on the rayon pool.
    pub parallel: bool,
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            trim: false,
            bias: BiasMode::PerRow,
            missing_data: MissingDataPolicy::Skip,
            parallel: true,
        }
    }
}

impl AssemblyConfig {
    /// Raw readouts, prescan and overscan included.
    pub fn untrimmed() -> Self {
        Self::default()
    }

    /// Bias-corrected data regions only.
    pub fn trimmed(bias: BiasMode) -> Self {
        Self {
            trim: true,
            bias,
            ..Self::default()
        }
    }

    pub fn with_missing_data(mut self, policy: MissingDataPolicy) -> Self {
        self.missing_data = policy;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validate the configuration.
    ///
    /// # Panics
    ///
    /// Panics with a descriptive message on an invalid bias estimator.
    pub fn validate(&self) {
        self.bias.validate();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AssemblyConfig::default();
        assert!(!config.trim);
        assert_eq!(config.bias, BiasMode::PerRow);
        assert_eq!(config.missing_data, MissingDataPolicy::Skip);
        assert!(config.parallel);
    }

    #[test]
    fn test_trimmed_preset() {
        let config = AssemblyConfig::trimmed(BiasMode::clipped_mean())
            .with_missing_data(MissingDataPolicy::Abort)
            .with_parallel(false);
        assert!(config.trim);
        assert_eq!(
            config.bias,
            BiasMode::GlobalClippedMean {
                sigma: 3.0,
                iterations: 3
            }
        );
        assert_eq!(config.missing_data, MissingDataPolicy::Abort);
        assert!(!config.parallel);
    }

    #[test]
    fn test_from_yaml_fills_defaults() {
        let config: AssemblyConfig =
            serde_yml::from_str("trim: true\nmissing_data: Abort\n").unwrap();
        assert!(config.trim);
        assert_eq!(config.bias, BiasMode::PerRow);
        assert_eq!(config.missing_data, MissingDataPolicy::Abort);
        assert!(config.parallel);
    }

    #[test]
    #[should_panic(expected = "Clipping sigma must be positive")]
    fn test_validate_rejects_negative_sigma() {
        AssemblyConfig::trimmed(BiasMode::GlobalClippedMean {
            sigma: -1.0,
            iterations: 3,
        })
        .validate();
    }
}
