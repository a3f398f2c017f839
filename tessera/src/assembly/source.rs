//! Raw pixel supply for the assembler.

use hashbrown::HashMap;
use thiserror::Error;

use common::Buffer2;
use crate::geometry::{ChannelId, PixelRect};

/// Failures reported by an [`AmplifierPixelSource`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PixelSourceError {
    #[error("No pixel data for channel {0}")]
    ChannelNotFound(ChannelId),

    #[error("Region {region} exceeds the {width}x{height} readout of channel {channel}")]
    RegionOutOfBounds {
        channel: ChannelId,
        region: PixelRect,
        width: usize,
        height: usize,
    },

    #[error("Failed to read channel {channel}: {reason}")]
    Read { channel: ChannelId, reason: String },
}

/// Supplies raw amplifier pixels in electronic (on-disk) orientation.
///
/// Calls may block. A failed call yields no partial data.
pub trait AmplifierPixelSource: Sync {
    fn read_region(
        &self,
        channel: ChannelId,
        region: PixelRect,
    ) -> Result<Buffer2<f32>, PixelSourceError>;
}

impl<T: AmplifierPixelSource + ?Sized> AmplifierPixelSource for &T {
    fn read_region(
        &self,
        channel: ChannelId,
        region: PixelRect,
    ) -> Result<Buffer2<f32>, PixelSourceError> {
        (**self).read_region(channel, region)
    }
}

/// Whole raw readouts held in memory, cropped on request.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPixelSource {
    readouts: HashMap<ChannelId, Buffer2<f32>>,
}

impl InMemoryPixelSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, channel: ChannelId, readout: Buffer2<f32>) {
        self.readouts.insert(channel, readout);
    }

    pub fn with(mut self, channel: ChannelId, readout: Buffer2<f32>) -> Self {
        self.insert(channel, readout);
        self
    }

    pub fn remove(&mut self, channel: ChannelId) -> Option<Buffer2<f32>> {
        self.readouts.remove(&channel)
    }

    pub fn len(&self) -> usize {
        self.readouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readouts.is_empty()
    }
}

impl AmplifierPixelSource for InMemoryPixelSource {
    fn read_region(
        &self,
        channel: ChannelId,
        region: PixelRect,
    ) -> Result<Buffer2<f32>, PixelSourceError> {
        let readout = self
            .readouts
            .get(&channel)
            .ok_or(PixelSourceError::ChannelNotFound(channel))?;

        if !readout.contains_window(region.x0, region.y0, region.width, region.height) {
            return Err(PixelSourceError::RegionOutOfBounds {
                channel,
                region,
                width: readout.width(),
                height: readout.height(),
            });
        }

        Ok(readout.crop(region.x0, region.y0, region.width, region.height))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(width: usize, height: usize) -> Buffer2<f32> {
        Buffer2::new(width, height, (0..width * height).map(|i| i as f32).collect())
    }

    #[test]
    fn test_read_full_readout() {
        let ch = ChannelId::new(1);
        let source = InMemoryPixelSource::new().with(ch, ramp(4, 3));
        let pixels = source.read_region(ch, PixelRect::from_size(4, 3)).unwrap();
        assert_eq!(pixels, ramp(4, 3));
    }

    #[test]
    fn test_read_sub_region() {
        let ch = ChannelId::new(2);
        let source = InMemoryPixelSource::new().with(ch, ramp(4, 3));
        let pixels = source.read_region(ch, PixelRect::new(1, 1, 2, 2)).unwrap();
        assert_eq!(pixels.pixels(), &[5.0, 6.0, 9.0, 10.0]);
    }

    #[test]
    fn test_missing_channel() {
        let source = InMemoryPixelSource::new();
        let ch = ChannelId::new(5);
        assert_eq!(
            source.read_region(ch, PixelRect::from_size(1, 1)),
            Err(PixelSourceError::ChannelNotFound(ch))
        );
    }

    #[test]
    fn test_region_past_readout() {
        let ch = ChannelId::new(1);
        let source = InMemoryPixelSource::new().with(ch, ramp(4, 3));
        let err = source
            .read_region(ch, PixelRect::from_size(5, 3))
            .unwrap_err();
        assert!(matches!(
            err,
            PixelSourceError::RegionOutOfBounds {
                width: 4,
                height: 3,
                ..
            }
        ));
    }
}
