//! Electronic-to-chip linear transform (the `LTM`/`LTV` header keywords).
//!
//! On-disk pixel coordinates map to chip coordinates as
//! `chip = M⁻¹ · (electronic − v)`. Only rigid, axis-aligned mappings with unit
//! pixels can be modeled: `M` must be diagonal with entries of magnitude one.

use glam::{DMat2, DVec2};
use thiserror::Error;

use super::Rotation;

/// Added to the translation of rotated channels before corner mapping.
///
/// Headers of the rotated (top-row) channels declare their origin one pixel off
/// in both axes relative to the unrotated ones. This is an empirical correction,
/// pinned as a constant.
pub const ROTATED_ORIGIN_CORRECTION: DVec2 = DVec2::ONE;

/// Reasons a declared transform cannot describe the detector.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TransformError {
    #[error("refusing non-square pixels: |m00| = {}, |m11| = {}", .m00.abs(), .m11.abs())]
    NonSquarePixels { m00: f64, m11: f64 },

    #[error("refusing sheared detector: m01 = {m01}, m10 = {m10}")]
    Sheared { m01: f64, m10: f64 },
}

/// Declared linear mapping from electronic to chip coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTransform {
    pub matrix: DMat2,
    pub translation: DVec2,
}

impl LinearTransform {
    /// Builds the transform from row-major matrix entries and the translation.
    pub fn new(m00: f64, m01: f64, m10: f64, m11: f64, v0: f64, v1: f64) -> Self {
        // glam matrices are column-major.
        Self {
            matrix: DMat2::from_cols(DVec2::new(m00, m10), DVec2::new(m01, m11)),
            translation: DVec2::new(v0, v1),
        }
    }

    /// Identity matrix with the given translation.
    pub fn translation(v0: f64, v1: f64) -> Self {
        Self::new(1.0, 0.0, 0.0, 1.0, v0, v1)
    }

    #[inline]
    pub fn m00(&self) -> f64 {
        self.matrix.x_axis.x
    }

    #[inline]
    pub fn m01(&self) -> f64 {
        self.matrix.y_axis.x
    }

    #[inline]
    pub fn m10(&self) -> f64 {
        self.matrix.x_axis.y
    }

    #[inline]
    pub fn m11(&self) -> f64 {
        self.matrix.y_axis.y
    }

    /// Accepts the transform iff `|m00| = |m11| = 1` and `m01 = m10 = 0`.
    ///
    /// Pixel squareness is checked before shear.
    pub fn validate(self) -> Result<ValidatedTransform, TransformError> {
        let (m00, m01, m10, m11) = (self.m00(), self.m01(), self.m10(), self.m11());

        if m00.abs() != 1.0 || m11.abs() != 1.0 {
            return Err(TransformError::NonSquarePixels { m00, m11 });
        }
        if m01 != 0.0 || m10 != 0.0 {
            return Err(TransformError::Sheared { m01, m10 });
        }

        Ok(ValidatedTransform(self))
    }
}

/// Orientation needed to bring amplifier pixels into chip orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Orientation {
    pub rotation: Rotation,
    pub flip_horizontal: bool,
}

/// Data-region corners in 0-indexed chip coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MappedCorners {
    pub lower_left: DVec2,
    pub upper_right: DVec2,
}

/// A transform that passed [`LinearTransform::validate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidatedTransform(LinearTransform);

impl ValidatedTransform {
    pub fn transform(&self) -> &LinearTransform {
        &self.0
    }

    /// Rotate 180° and flip left-right iff `m11 < 0`.
    ///
    /// The sign of `m00` is ignored: `m00 = -1, m11 = 1` gets no reorientation,
    /// and `m00 = -1, m11 = -1` is treated like `m00 = 1, m11 = -1`.
    pub fn orientation(&self) -> Orientation {
        if self.0.m11() < 0.0 {
            Orientation {
                rotation: Rotation::Rotate180,
                flip_horizontal: true,
            }
        } else {
            Orientation {
                rotation: Rotation::None,
                flip_horizontal: false,
            }
        }
    }

    /// `M⁻¹ · (electronic − translation)` with an explicit translation.
    pub fn electronic_to_chip(&self, electronic: DVec2, translation: DVec2) -> DVec2 {
        // Diagonal with unit entries, so never singular.
        self.0.matrix.inverse() * (electronic - translation)
    }

    /// Maps the data-region corners `(1, 1)` and `(ewidth, eheight)` (1-indexed,
    /// inclusive) into 0-indexed chip coordinates.
    ///
    /// Rotated channels get [`ROTATED_ORIGIN_CORRECTION`] added to the translation,
    /// and their mapped corners swapped, since a negative diagonal reverses the
    /// min/max ordering.
    pub fn map_data_corners(&self, ewidth: usize, eheight: usize) -> MappedCorners {
        let rotated = self.orientation().rotation == Rotation::Rotate180;
        let translation = if rotated {
            self.0.translation + ROTATED_ORIGIN_CORRECTION
        } else {
            self.0.translation
        };

        let llc = self.electronic_to_chip(DVec2::ONE, translation);
        let urc =
            self.electronic_to_chip(DVec2::new(ewidth as f64, eheight as f64), translation);
        let (llc, urc) = if rotated { (urc, llc) } else { (llc, urc) };

        MappedCorners {
            lower_left: llc - DVec2::ONE,
            upper_right: urc - DVec2::ONE,
        }
    }

    /// Floored tile coordinates of an `ewidth × eheight` amplifier:
    /// `floor(lower_left / (ewidth, eheight))`.
    pub fn tile_position(&self, ewidth: usize, eheight: usize) -> DVec2 {
        let corners = self.map_data_corners(ewidth, eheight);
        (corners.lower_left / DVec2::new(ewidth as f64, eheight as f64)).floor()
    }

    /// [`Self::tile_position`] as integers. `None` when either coordinate is
    /// not finite or does not fit in an `i64`.
    pub fn grid_position(&self, ewidth: usize, eheight: usize) -> Option<(i64, i64)> {
        let tile = self.tile_position(ewidth, eheight);
        // `i64::MAX as f64` rounds up to 2^63, which is itself out of range.
        let limit = i64::MAX as f64;
        let in_range = |v: f64| v.is_finite() && v >= -limit && v < limit;
        (in_range(tile.x) && in_range(tile.y)).then(|| (tile.x as i64, tile.y as i64))
    }
}
