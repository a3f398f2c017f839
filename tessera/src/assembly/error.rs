//! Error types for mosaic assembly.

use thiserror::Error;

use super::source::PixelSourceError;
use crate::geometry::{ChannelId, PixelRect};

/// Errors that can occur while assembling a detector mosaic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssemblyError {
    #[error("Pixel data for channel {channel} is unavailable: {source}")]
    MissingAmplifierData {
        channel: ChannelId,
        #[source]
        source: PixelSourceError,
    },

    #[error("Channel {channel}: region {region} does not fit in {bounds}")]
    RegionOutOfBounds {
        channel: ChannelId,
        region: PixelRect,
        bounds: PixelRect,
    },

    #[error("Channel {channel}: overscan holds no finite sample")]
    NoValidOverscan { channel: ChannelId },
}

impl AssemblyError {
    pub fn channel(&self) -> ChannelId {
        match self {
            Self::MissingAmplifierData { channel, .. }
            | Self::RegionOutOfBounds { channel, .. }
            | Self::NoValidOverscan { channel } => *channel,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn test_missing_data_chains_source() {
        let ch = ChannelId::new(4);
        let err = AssemblyError::MissingAmplifierData {
            channel: ch,
            source: PixelSourceError::ChannelNotFound(ch),
        };

        assert_eq!(err.channel(), ch);
        assert_eq!(
            err.source().map(|s| s.to_string()),
            Some("No pixel data for channel 4".to_string())
        );
    }

    #[test]
    fn test_region_message_names_rectangles() {
        let err = AssemblyError::RegionOutOfBounds {
            channel: ChannelId::new(2),
            region: PixelRect::new(10, 0, 600, 2000),
            bounds: PixelRect::from_size(542, 2022),
        };
        assert_eq!(
            err.to_string(),
            "Channel 2: region [10:610, 0:2000] does not fit in [0:542, 0:2022]"
        );
    }
}
