//! Amplifier geometry: where each readout channel's pixels live and how they
//! must be reoriented to sit in the detector mosaic.

pub mod error;
pub mod layout;
pub mod metadata;
pub mod resolver;
pub mod scan;
pub mod transform;


use std::fmt;

use serde::{Deserialize, Serialize};

pub use error::GeometryError;
pub use layout::{ElectronicParams, ReadoutLayout};
pub use metadata::{AmplifierMetadata, HeaderValue};
pub use resolver::GeometryResolver;
pub use scan::{FixedLayoutScan, HeaderScan, HeaderSource};
pub use transform::{LinearTransform, MappedCorners, TransformError, ValidatedTransform};

/// Readout channel number. Always positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(u32);

impl ChannelId {
    /// # Panics
    ///
    /// Panics if `id` is zero.
    pub fn new(id: u32) -> Self {
        assert!(id > 0, "Channel ids start at 1");
        Self(id)
    }

    /// Returns `None` for zero.
    pub fn try_new(id: u32) -> Option<Self> {
        (id > 0).then_some(Self(id))
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Axis-aligned pixel rectangle, 0-indexed, half-open on the far edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    pub x0: usize,
    pub y0: usize,
    pub width: usize,
    pub height: usize,
}

impl PixelRect {
    pub const fn new(x0: usize, y0: usize, width: usize, height: usize) -> Self {
        Self {
            x0,
            y0,
            width,
            height,
        }
    }

    /// Rectangle at the origin.
    pub const fn from_size(width: usize, height: usize) -> Self {
        Self::new(0, 0, width, height)
    }

    /// One past the last column.
    #[inline]
    pub fn x1(&self) -> usize {
        self.x0 + self.width
    }

    /// One past the last row.
    #[inline]
    pub fn y1(&self) -> usize {
        self.y0 + self.height
    }

    #[inline]
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Whether `other` lies entirely inside `self`.
    pub fn contains(&self, other: &PixelRect) -> bool {
        other.x0 >= self.x0
            && other.y0 >= self.y0
            && other.x1() <= self.x1()
            && other.y1() <= self.y1()
    }

    /// Whether the two rectangles share at least one pixel.
    pub fn overlaps(&self, other: &PixelRect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x0 < other.x1()
            && other.x0 < self.x1()
            && self.y0 < other.y1()
            && other.y0 < self.y1()
    }
}

impl fmt::Display for PixelRect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}, {}:{}]", self.x0, self.x1(), self.y0, self.y1())
    }
}

/// Rotation that aligns amplifier pixel space with chip space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    None,
    Rotate180,
}

/// One readout channel's place in the detector.
///
/// Every field except `trimmed` is fixed at resolution time. `trimmed` records
/// whether the amplifier currently describes bias-corrected, data-only pixels;
/// only the assembler changes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmplifierGeometry {
    channel_id: ChannelId,
    grid_col: usize,
    grid_row: usize,
    rotation: Rotation,
    flip_horizontal: bool,
    full_region: PixelRect,
    data_region: PixelRect,
    overscan_region: PixelRect,
    electronic_params: ElectronicParams,
    trimmed: bool,
}

impl AmplifierGeometry {
    /// Builds a geometry record, checking the region invariants.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        channel_id: ChannelId,
        grid: (usize, usize),
        rotation: Rotation,
        flip_horizontal: bool,
        full_region: PixelRect,
        data_region: PixelRect,
        overscan_region: PixelRect,
        electronic_params: ElectronicParams,
    ) -> Result<Self, GeometryError> {
        if full_region.x0 != 0 || full_region.y0 != 0 {
            return Err(GeometryError::RegionOutOfBounds {
                channel: channel_id,
                region: full_region,
                bounds: PixelRect::from_size(full_region.width, full_region.height),
            });
        }
        for region in [data_region, overscan_region] {
            if region.is_empty() || !full_region.contains(&region) {
                return Err(GeometryError::RegionOutOfBounds {
                    channel: channel_id,
                    region,
                    bounds: full_region,
                });
            }
        }
        if data_region.overlaps(&overscan_region) {
            return Err(GeometryError::OverlappingRegions {
                channel: channel_id,
                data: data_region,
                overscan: overscan_region,
            });
        }
        // The data footprint lies inside the full one, so bounding the full
        // tile bounds both mosaic layouts.
        if mosaic_extent(grid, full_region.size()).is_none() {
            return Err(GeometryError::TileOutOfRange {
                channel: channel_id,
                col: grid.0 as f64,
                row: grid.1 as f64,
            });
        }

        Ok(Self {
            channel_id,
            grid_col: grid.0,
            grid_row: grid.1,
            rotation,
            flip_horizontal,
            full_region,
            data_region,
            overscan_region,
            electronic_params,
            trimmed: false,
        })
    }

    pub fn channel_id(&self) -> ChannelId {
        self.channel_id
    }

    pub fn grid_col(&self) -> usize {
        self.grid_col
    }

    pub fn grid_row(&self) -> usize {
        self.grid_row
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn flip_horizontal(&self) -> bool {
        self.flip_horizontal
    }

    pub fn full_region(&self) -> PixelRect {
        self.full_region
    }

    pub fn data_region(&self) -> PixelRect {
        self.data_region
    }

    pub fn overscan_region(&self) -> PixelRect {
        self.overscan_region
    }

    pub fn electronic_params(&self) -> &ElectronicParams {
        &self.electronic_params
    }

    pub fn is_trimmed(&self) -> bool {
        self.trimmed
    }

    pub(crate) fn set_trimmed(&mut self, trimmed: bool) {
        self.trimmed = trimmed;
    }

    /// Size of the block this amplifier contributes to a mosaic.
    pub fn footprint(&self, trimmed: bool) -> (usize, usize) {
        if trimmed {
            self.data_region.size()
        } else {
            self.full_region.size()
        }
    }

    /// Destination rectangle in a mosaic whose tiles are this amplifier's footprint.
    pub fn mosaic_rect(&self, trimmed: bool) -> PixelRect {
        let (width, height) = self.footprint(trimmed);
        PixelRect::new(self.grid_col * width, self.grid_row * height, width, height)
    }
}

/// Size of a mosaic covering tiles `0..=grid` of size `tile`, or `None` when
/// the extent or its pixel count does not fit in `usize`.
pub(crate) fn mosaic_extent(grid: (usize, usize), tile: (usize, usize)) -> Option<(usize, usize)> {
    let width = grid.0.checked_add(1)?.checked_mul(tile.0)?;
    let height = grid.1.checked_add(1)?.checked_mul(tile.1)?;
    width.checked_mul(height)?;
    Some((width, height))
}
