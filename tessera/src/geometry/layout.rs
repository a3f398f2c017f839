//! Readout layout configuration: the numbers that are not in the headers.

use serde::{Deserialize, Serialize};

use super::{ChannelId, PixelRect};

/// Electronic characteristics of one amplifier. Carried through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectronicParams {
    /// Electrons per ADU.
    pub gain: f64,
    /// Read noise in electrons.
    pub read_noise: f64,
    /// Saturation level in ADU (0 = unknown).
    pub saturation: f64,
}

impl Default for ElectronicParams {
    fn default() -> Self {
        Self {
            gain: 1.0,
            read_noise: 0.0,
            saturation: 0.0,
        }
    }
}

/// Per-amplifier pixel layout shared by every channel of a detector.
///
/// # Examples
///
/// ```ignore
/// use tessera::ReadoutLayout;
///
/// // Default 16-channel layout
/// let layout = ReadoutLayout::default();
///
/// // Small synthetic amplifiers for tests
/// let layout = ReadoutLayout {
///     prescan_cols: 1,
///     data_cols: 5,
///     data_rows: 5,
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadoutLayout {
    /// Pre-scan columns read before the first light-sensitive column.
    pub prescan_cols: usize,
    /// Light-sensitive columns per amplifier.
    pub data_cols: usize,
    /// Light-sensitive rows per amplifier.
    pub data_rows: usize,
    /// Readout width used when no header is available.
    pub fixed_width: usize,
    /// Readout height used when no header is available.
    pub fixed_height: usize,
    /// Amplifiers per row in the fixed layout (the detector has two rows).
    pub channels_per_row: u32,
    /// Electronic parameters assigned to every amplifier.
    pub electronic: ElectronicParams,
}

impl Default for ReadoutLayout {
    fn default() -> Self {
        Self {
            prescan_cols: 10,
            data_cols: 512,
            data_rows: 2000,
            fixed_width: 542,
            fixed_height: 2022,
            channels_per_row: 8,
            electronic: ElectronicParams::default(),
        }
    }
}

impl ReadoutLayout {
    /// Parse a layout from YAML. Missing keys take their default values.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yml::Error> {
        serde_yml::from_str(yaml)
    }

    /// Number of channels the fixed layout knows about.
    pub fn fixed_channel_count(&self) -> u32 {
        self.channels_per_row * 2
    }

    /// Light-sensitive window, offset by the pre-scan columns.
    pub fn data_region(&self) -> PixelRect {
        PixelRect::new(self.prescan_cols, 0, self.data_cols, self.data_rows)
    }

    /// Serial overscan: every column right of the data region up to `readout_width`,
    /// over the data rows. Empty when the readout has no room for it.
    pub fn overscan_region(&self, readout_width: usize) -> PixelRect {
        let x0 = self.prescan_cols + self.data_cols;
        PixelRect::new(
            x0,
            0,
            readout_width.saturating_sub(x0),
            self.data_rows,
        )
    }

    /// Tile position and orientation of `channel` in the fixed two-row layout.
    ///
    /// The bottom row holds channels `1..=n` left to right; the top row holds
    /// `n+1..=2n` right to left, read out rotated and mirrored. Returns `None`
    /// past the last channel.
    pub(crate) fn fixed_position(&self, channel: ChannelId) -> Option<FixedPosition> {
        let n = self.channels_per_row;
        let ch = channel.get();
        if ch <= n {
            Some(FixedPosition {
                grid: ((ch - 1) as usize, 0),
                rotated: false,
            })
        } else if ch <= 2 * n {
            Some(FixedPosition {
                grid: ((2 * n - ch) as usize, 1),
                rotated: true,
            })
        } else {
            None
        }
    }

    /// Validate layout parameters.
    ///
    /// # Panics
    ///
    /// Panics if any size is zero or the fixed readout cannot hold the data region
    /// plus at least one overscan column.
    pub fn validate(&self) {
        assert!(self.data_cols > 0, "Data columns must be positive");
        assert!(self.data_rows > 0, "Data rows must be positive");
        assert!(self.channels_per_row > 0, "Channels per row must be positive");
        assert!(
            self.fixed_width > self.prescan_cols + self.data_cols,
            "Fixed readout width {} leaves no overscan after {} pre-scan + {} data columns",
            self.fixed_width,
            self.prescan_cols,
            self.data_cols
        );
        assert!(
            self.fixed_height >= self.data_rows,
            "Fixed readout height {} is smaller than {} data rows",
            self.fixed_height,
            self.data_rows
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FixedPosition {
    pub grid: (usize, usize),
    pub rotated: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_layout_regions() {
        let layout = ReadoutLayout::default();
        layout.validate();
        assert_eq!(layout.data_region(), PixelRect::new(10, 0, 512, 2000));
        assert_eq!(layout.overscan_region(542), PixelRect::new(522, 0, 20, 2000));
        assert_eq!(layout.fixed_channel_count(), 16);
    }

    #[test]
    fn test_overscan_empty_when_readout_too_narrow() {
        let layout = ReadoutLayout::default();
        assert!(layout.overscan_region(522).is_empty());
        assert!(layout.overscan_region(100).is_empty());
    }

    #[test]
    fn test_fixed_positions() {
        let layout = ReadoutLayout::default();
        let pos = |ch| layout.fixed_position(ChannelId::new(ch));

        assert_eq!(pos(1).unwrap().grid, (0, 0));
        assert_eq!(pos(8).unwrap().grid, (7, 0));
        assert_eq!(pos(9).unwrap().grid, (7, 1));
        assert_eq!(pos(16).unwrap().grid, (0, 1));
        assert!(!pos(8).unwrap().rotated);
        assert!(pos(9).unwrap().rotated);
        assert!(pos(17).is_none());
    }

    #[test]
    fn test_from_yaml_partial_override() {
        let yaml = "prescan_cols: 1\ndata_cols: 5\ndata_rows: 5\nelectronic:\n  gain: 2.5\n";
        let layout = ReadoutLayout::from_yaml(yaml).unwrap();
        assert_eq!(layout.prescan_cols, 1);
        assert_eq!(layout.data_cols, 5);
        assert_eq!(layout.data_rows, 5);
        // Untouched keys keep their defaults.
        assert_eq!(layout.fixed_width, 542);
        assert_eq!(layout.channels_per_row, 8);
        assert_eq!(layout.electronic.gain, 2.5);
        assert_eq!(layout.electronic.read_noise, 0.0);
    }

    #[test]
    fn test_from_yaml_rejects_wrong_type() {
        assert!(ReadoutLayout::from_yaml("data_cols: lots\n").is_err());
    }

    #[test]
    #[should_panic(expected = "leaves no overscan")]
    fn test_validate_rejects_layout_without_overscan() {
        let layout = ReadoutLayout {
            fixed_width: 522,
            ..Default::default()
        };
        layout.validate();
    }
}
