//! Error types for geometry resolution.

use thiserror::Error;

use super::transform::TransformError;
use super::{ChannelId, PixelRect};

/// Errors raised while resolving amplifier geometry or building a mosaic.
///
/// Everything except [`GeometryError::NoMoreChannels`] means the detector cannot
/// be modeled and the detector-level operation must stop.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeometryError {
    #[error("Invalid transform for channel {channel}: {source}")]
    InvalidTransform {
        channel: ChannelId,
        #[source]
        source: TransformError,
    },

    #[error("Missing required header key '{key}'")]
    MissingField { key: &'static str },

    #[error("Header key '{key}' must be {expected}")]
    InvalidField {
        key: &'static str,
        expected: &'static str,
    },

    /// Fixed-layout enumeration ran past the last channel. Not a failure.
    #[error("No amplifier for channel number {channel}")]
    NoMoreChannels { channel: u32 },

    #[error("Channel {channel} maps to negative tile position ({col}, {row})")]
    NegativeGridPosition {
        channel: ChannelId,
        col: i64,
        row: i64,
    },

    /// The tile index, or the mosaic extent it implies, is not addressable.
    #[error("Channel {channel} maps to unaddressable tile position ({col}, {row})")]
    TileOutOfRange {
        channel: ChannelId,
        col: f64,
        row: f64,
    },

    #[error("Channel {channel}: region {region} lies outside {bounds}")]
    RegionOutOfBounds {
        channel: ChannelId,
        region: PixelRect,
        bounds: PixelRect,
    },

    #[error("Channel {channel}: data region {data} overlaps overscan region {overscan}")]
    OverlappingRegions {
        channel: ChannelId,
        data: PixelRect,
        overscan: PixelRect,
    },

    #[error("Channel {channel} appears more than once in detector '{detector}'")]
    DuplicateChannel { detector: String, channel: ChannelId },

    #[error(
        "Channel {channel} readout is {actual:?}, expected {expected:?} \
         like the rest of detector '{detector}'"
    )]
    HeterogeneousAmplifiers {
        detector: String,
        channel: ChannelId,
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Detector '{detector}' has no amplifiers")]
    NoAmplifiers { detector: String },
}

impl GeometryError {
    /// Whether this is the end-of-enumeration signal rather than a real failure.
    pub fn is_end_of_channels(&self) -> bool {
        matches!(self, GeometryError::NoMoreChannels { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field_message() {
        let err = GeometryError::MissingField { key: "LTV1" };
        assert_eq!(err.to_string(), "Missing required header key 'LTV1'");
    }

    #[test]
    fn test_invalid_transform_has_source() {
        use std::error::Error as StdError;

        let err = GeometryError::InvalidTransform {
            channel: ChannelId::new(3),
            source: TransformError::Sheared { m01: 0.5, m10: 0.0 },
        };
        let msg = err.to_string();
        assert!(msg.contains("channel 3"));
        assert!(msg.contains("shear"));
        assert!(err.source().is_some());
    }

    #[test]
    fn test_region_out_of_bounds_message() {
        let err = GeometryError::RegionOutOfBounds {
            channel: ChannelId::new(7),
            region: PixelRect::new(10, 0, 512, 2000),
            bounds: PixelRect::from_size(100, 100),
        };
        let msg = err.to_string();
        assert!(msg.contains("Channel 7"));
        assert!(msg.contains("[10:522, 0:2000]"));
        assert!(msg.contains("[0:100, 0:100]"));
    }

    #[test]
    fn test_only_no_more_channels_ends_enumeration() {
        assert!(GeometryError::NoMoreChannels { channel: 17 }.is_end_of_channels());
        assert!(!GeometryError::MissingField { key: "CHANNEL" }.is_end_of_channels());
    }
}
