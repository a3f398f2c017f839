//! Reorienting amplifier blocks from electronic to chip orientation.

use common::Buffer2;
use crate::geometry::Rotation;

/// Rotate by 180° (reverses both axes).
pub fn rotate_180(block: &mut Buffer2<f32>) {
    block.pixels_mut().reverse();
}

/// Mirror left-right.
pub fn flip_horizontal(block: &mut Buffer2<f32>) {
    for row in block.rows_mut() {
        row.reverse();
    }
}

/// Apply `rotation`, then the optional mirror.
pub fn orient(block: &mut Buffer2<f32>, rotation: Rotation, flip: bool) {
    if rotation == Rotation::Rotate180 {
        rotate_180(block);
    }
    if flip {
        flip_horizontal(block);
    }
}
