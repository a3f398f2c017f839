//! Mosaic assembly: bias-correct, reorient and place every amplifier of a
//! detector into one chip-oriented image.
//!
//! Amplifier blocks are prepared independently (optionally on the rayon pool)
//! and then copied into the destination in mosaic order. Destination tiles never
//! overlap, so the copy needs no synchronisation.

pub mod bias;
pub mod config;
pub mod error;
pub mod orient;
pub mod source;


use common::Buffer2;
use rayon::prelude::*;

pub use bias::{subtract_bias, BiasEstimate, BiasMode};
pub use config::{AssemblyConfig, MissingDataPolicy};
pub use error::AssemblyError;
pub use orient::{flip_horizontal, orient, rotate_180};
pub use source::{AmplifierPixelSource, InMemoryPixelSource, PixelSourceError};

use crate::geometry::{AmplifierGeometry, ChannelId, PixelRect};
use crate::mosaic::DetectorMosaic;

/// An amplifier left out of an assembled image.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingAmplifier {
    pub channel: ChannelId,
    pub error: PixelSourceError,
}

/// A detector image in chip orientation.
#[derive(Debug, Clone)]
pub struct AssembledImage {
    image: Buffer2<f32>,
    mosaic: DetectorMosaic,
    trimmed: bool,
    missing: Vec<MissingAmplifier>,
}

impl AssembledImage {
    pub fn image(&self) -> &Buffer2<f32> {
        &self.image
    }

    pub fn into_image(self) -> Buffer2<f32> {
        self.image
    }

    /// The input mosaic with `trimmed` set on every amplifier that was corrected.
    pub fn mosaic(&self) -> &DetectorMosaic {
        &self.mosaic
    }

    pub fn is_trimmed(&self) -> bool {
        self.trimmed
    }

    /// Amplifiers whose tiles were left at zero.
    pub fn missing(&self) -> &[MissingAmplifier] {
        &self.missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Copy of one amplifier's tile, or `None` for an unknown channel.
    pub fn tile(&self, channel: ChannelId) -> Option<Buffer2<f32>> {
        let rect = self.mosaic.amplifier(channel)?.mosaic_rect(self.trimmed);
        Some(self.image.crop(rect.x0, rect.y0, rect.width, rect.height))
    }
}

/// Assemble `mosaic` with the default missing-data policy and parallelism.
///
/// With `trim`, each amplifier is bias-corrected with `bias_mode` and only its
/// data region is kept; otherwise whole readouts (pre-scan and overscan
/// included) are placed. Either way blocks are reoriented to chip space.
pub fn assemble<S: AmplifierPixelSource + ?Sized>(
    mosaic: &DetectorMosaic,
    source: &S,
    trim: bool,
    bias_mode: BiasMode,
) -> Result<AssembledImage, AssemblyError> {
    let config = AssemblyConfig {
        trim,
        bias: bias_mode,
        ..AssemblyConfig::default()
    };
    assemble_with_config(mosaic, source, &config)
}

/// Assemble `mosaic` according to `config`.
///
/// Geometry and bias failures always abort. A pixel source failure aborts only
/// under [`MissingDataPolicy::Abort`]; otherwise the tile stays zero and the
/// amplifier is listed in [`AssembledImage::missing`].
///
/// # Panics
///
/// Panics if `config` fails [`AssemblyConfig::validate`].
pub fn assemble_with_config<S: AmplifierPixelSource + ?Sized>(
    mosaic: &DetectorMosaic,
    source: &S,
    config: &AssemblyConfig,
) -> Result<AssembledImage, AssemblyError> {
    config.validate();

    let trim = config.trim;
    let (width, height) = mosaic.mosaic_size(trim);
    let mut image = Buffer2::new_default(width, height);

    let prepare = |amp: &AmplifierGeometry| prepare_amplifier(amp, source, config);
    let blocks: Vec<Result<Buffer2<f32>, AssemblyError>> = if config.parallel {
        mosaic.amplifiers().par_iter().map(prepare).collect()
    } else {
        mosaic.iter().map(prepare).collect()
    };

    let mut assembled = mosaic.clone();
    let mut missing = Vec::new();
    for (amp, block) in assembled.amplifiers_mut().iter_mut().zip(blocks) {
        match block {
            Ok(block) => {
                let dest = amp.mosaic_rect(trim);
                debug_assert_eq!(block.size(), dest.size());
                image.blit(&block, dest.x0, dest.y0);
                if trim {
                    amp.set_trimmed(true);
                }
            }
            Err(AssemblyError::MissingAmplifierData {
                channel,
                source: error,
            }) if config.missing_data == MissingDataPolicy::Skip => {
                tracing::warn!(
                    "Detector '{}': channel {} skipped, {}",
                    mosaic.detector_id(),
                    channel,
                    error
                );
                missing.push(MissingAmplifier { channel, error });
            }
            Err(err) => return Err(err),
        }
    }

    tracing::info!(
        "Assembled detector '{}': {}x{} {}, {}/{} amplifiers",
        mosaic.detector_id(),
        width,
        height,
        if trim { "trimmed" } else { "untrimmed" },
        mosaic.len() - missing.len(),
        mosaic.len()
    );

    Ok(AssembledImage {
        image,
        mosaic: assembled,
        trimmed: trim,
        missing,
    })
}

/// One amplifier's bias-corrected data region, in electronic orientation.
///
/// # Panics
///
/// Panics if `bias_mode` fails [`BiasMode::validate`].
pub fn correct_amplifier<S: AmplifierPixelSource + ?Sized>(
    geometry: &AmplifierGeometry,
    source: &S,
    bias_mode: BiasMode,
) -> Result<Buffer2<f32>, AssemblyError> {
    bias_mode.validate();
    let raw = read_readout(geometry, source)?;
    correct_readout(geometry, &raw, bias_mode)
}

fn prepare_amplifier<S: AmplifierPixelSource + ?Sized>(
    amp: &AmplifierGeometry,
    source: &S,
    config: &AssemblyConfig,
) -> Result<Buffer2<f32>, AssemblyError> {
    let raw = read_readout(amp, source)?;
    let mut block = if config.trim {
        correct_readout(amp, &raw, config.bias)?
    } else {
        raw
    };
    orient(&mut block, amp.rotation(), amp.flip_horizontal());
    Ok(block)
}

fn read_readout<S: AmplifierPixelSource + ?Sized>(
    amp: &AmplifierGeometry,
    source: &S,
) -> Result<Buffer2<f32>, AssemblyError> {
    let channel = amp.channel_id();
    let full = amp.full_region();

    let raw = source
        .read_region(channel, full)
        .map_err(|source| AssemblyError::MissingAmplifierData { channel, source })?;

    if raw.size() != full.size() {
        return Err(AssemblyError::RegionOutOfBounds {
            channel,
            region: full,
            bounds: PixelRect::from_size(raw.width(), raw.height()),
        });
    }

    Ok(raw)
}

fn correct_readout(
    amp: &AmplifierGeometry,
    raw: &Buffer2<f32>,
    mode: BiasMode,
) -> Result<Buffer2<f32>, AssemblyError> {
    let channel = amp.channel_id();
    let bounds = PixelRect::from_size(raw.width(), raw.height());
    let data_region = amp.data_region();
    let overscan_region = amp.overscan_region();

    for region in [data_region, overscan_region] {
        if !bounds.contains(&region) {
            return Err(AssemblyError::RegionOutOfBounds {
                channel,
                region,
                bounds,
            });
        }
    }

    // Row-wise correction pairs overscan row i with data row i.
    if matches!(mode, BiasMode::PerRow)
        && (overscan_region.y0, overscan_region.height) != (data_region.y0, data_region.height)
    {
        return Err(AssemblyError::RegionOutOfBounds {
            channel,
            region: overscan_region,
            bounds: PixelRect::new(
                overscan_region.x0,
                data_region.y0,
                overscan_region.width,
                data_region.height,
            ),
        });
    }

    let mut data = raw.crop(
        data_region.x0,
        data_region.y0,
        data_region.width,
        data_region.height,
    );
    let overscan = raw.crop(
        overscan_region.x0,
        overscan_region.y0,
        overscan_region.width,
        overscan_region.height,
    );

    let estimate = subtract_bias(&mut data, &overscan, mode)
        .ok_or(AssemblyError::NoValidOverscan { channel })?;

    tracing::debug!(
        "Channel {}: subtracted bias {:.3} ({:?})",
        channel,
        estimate.mean_level(),
        mode
    );

    Ok(data)
}
