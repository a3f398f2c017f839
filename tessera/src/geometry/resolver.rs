//! Per-amplifier geometry resolution from header metadata or the fixed layout.

use super::metadata::keys;
use super::transform::{LinearTransform, Orientation};
use super::{
    AmplifierGeometry, AmplifierMetadata, ChannelId, FixedLayoutScan, GeometryError, HeaderScan,
    HeaderSource, PixelRect, ReadoutLayout, Rotation,
};

/// Value used for any `LTMi_j` card absent from a header.
///
/// A missing diagonal entry therefore makes the transform invalid, and a missing
/// off-diagonal entry means "no shear".
pub const LTM_DEFAULT: f64 = 0.0;

/// Turns header metadata or channel numbers into [`AmplifierGeometry`].
#[derive(Debug, Clone, Default)]
pub struct GeometryResolver {
    layout: ReadoutLayout,
}

/// Readout extent, orientation and tile position, before regions are laid out.
struct Placement {
    channel: ChannelId,
    extent: (usize, usize),
    grid: (usize, usize),
    orientation: Orientation,
}

impl GeometryResolver {
    /// # Panics
    ///
    /// Panics if `layout` fails [`ReadoutLayout::validate`].
    pub fn new(layout: ReadoutLayout) -> Self {
        layout.validate();
        Self { layout }
    }

    pub fn layout(&self) -> &ReadoutLayout {
        &self.layout
    }

    /// Resolve one amplifier.
    ///
    /// With `metadata`, geometry comes from the `CHANNEL`, `DATASEC`, `LTV*` and
    /// `LTM*` cards and `fallback_channel` is ignored. Without it, the fixed
    /// layout is used for `fallback_channel`; a channel past the end of the
    /// layout yields [`GeometryError::NoMoreChannels`].
    pub fn resolve_amplifier(
        &self,
        metadata: Option<&AmplifierMetadata>,
        fallback_channel: Option<ChannelId>,
    ) -> Result<AmplifierGeometry, GeometryError> {
        let placement = match (metadata, fallback_channel) {
            (Some(md), _) => self.place_from_metadata(md)?,
            (None, Some(channel)) => self.place_fixed(channel)?,
            (None, None) => {
                return Err(GeometryError::MissingField {
                    key: keys::CHANNEL,
                })
            }
        };

        self.build(placement)
    }

    /// Lazily resolve channels `1, 2, …` from the fixed layout.
    pub fn scan_fixed_layout(&self) -> FixedLayoutScan<'_> {
        FixedLayoutScan::new(self)
    }

    /// Lazily resolve one amplifier per image extension of `source`.
    pub fn scan_headers<'a, S: HeaderSource + ?Sized>(
        &'a self,
        source: &'a S,
    ) -> HeaderScan<'a, S> {
        HeaderScan::new(self, source)
    }

    fn place_from_metadata(&self, md: &AmplifierMetadata) -> Result<Placement, GeometryError> {
        let channel = md.int(keys::CHANNEL)?;
        let channel = u32::try_from(channel)
            .ok()
            .and_then(ChannelId::try_new)
            .ok_or(GeometryError::InvalidField {
                key: keys::CHANNEL,
                expected: "a positive channel number",
            })?;

        let (ewidth, eheight) = md.section_extent(keys::DATASEC)?;
        let ltv1 = finite_float(md, keys::LTV1)?;
        let ltv2 = finite_float(md, keys::LTV2)?;

        let transform = LinearTransform::new(
            ltm_entry(md, keys::LTM1_1)?,
            ltm_entry(md, keys::LTM2_1)?,
            ltm_entry(md, keys::LTM1_2)?,
            ltm_entry(md, keys::LTM2_2)?,
            ltv1,
            ltv2,
        )
        .validate()
        .map_err(|source| GeometryError::InvalidTransform { channel, source })?;

        let orientation = transform.orientation();
        let tile_out_of_range = || {
            let tile = transform.tile_position(ewidth, eheight);
            GeometryError::TileOutOfRange {
                channel,
                col: tile.x,
                row: tile.y,
            }
        };
        let (col, row) = transform
            .grid_position(ewidth, eheight)
            .ok_or_else(tile_out_of_range)?;
        if col < 0 || row < 0 {
            return Err(GeometryError::NegativeGridPosition { channel, col, row });
        }
        let grid = match (usize::try_from(col), usize::try_from(row)) {
            (Ok(col), Ok(row)) => (col, row),
            _ => return Err(tile_out_of_range()),
        };

        tracing::debug!(
            "Channel {} at tile ({}, {}) from header, {:?}, flip {}",
            channel,
            col,
            row,
            orientation.rotation,
            orientation.flip_horizontal
        );

        Ok(Placement {
            channel,
            extent: (ewidth, eheight),
            grid,
            orientation,
        })
    }

    fn place_fixed(&self, channel: ChannelId) -> Result<Placement, GeometryError> {
        let position = self
            .layout
            .fixed_position(channel)
            .ok_or(GeometryError::NoMoreChannels {
                channel: channel.get(),
            })?;

        let orientation = if position.rotated {
            Orientation {
                rotation: Rotation::Rotate180,
                flip_horizontal: true,
            }
        } else {
            Orientation {
                rotation: Rotation::None,
                flip_horizontal: false,
            }
        };

        Ok(Placement {
            channel,
            extent: (self.layout.fixed_width, self.layout.fixed_height),
            grid: position.grid,
            orientation,
        })
    }

    fn build(&self, placement: Placement) -> Result<AmplifierGeometry, GeometryError> {
        let (ewidth, eheight) = placement.extent;
        let full_region = PixelRect::from_size(ewidth, eheight);

        AmplifierGeometry::new(
            placement.channel,
            placement.grid,
            placement.orientation.rotation,
            placement.orientation.flip_horizontal,
            full_region,
            self.layout.data_region(),
            self.layout.overscan_region(ewidth),
            self.layout.electronic,
        )
    }
}

fn finite_float(md: &AmplifierMetadata, key: &'static str) -> Result<f64, GeometryError> {
    match md.float(key)? {
        v if v.is_finite() => Ok(v),
        _ => Err(GeometryError::InvalidField {
            key,
            expected: "a finite number",
        }),
    }
}

/// The single place where absent `LTM` cards fall back to [`LTM_DEFAULT`].
fn ltm_entry(md: &AmplifierMetadata, key: &'static str) -> Result<f64, GeometryError> {
    Ok(md.optional_float(key)?.unwrap_or(LTM_DEFAULT))
}
