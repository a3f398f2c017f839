//! A detector's full set of amplifiers.

use serde::{Deserialize, Serialize};

use crate::geometry::{
    mosaic_extent, AmplifierGeometry, ChannelId, GeometryError, GeometryResolver, HeaderSource,
    PixelRect,
};

/// Ordered amplifiers of one detector sharing one coordinate convention.
///
/// Channel ids are unique and every amplifier has the same readout and data
/// sizes, so tile `(col, row)` always starts at `(col × w, row × h)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorMosaic {
    detector_id: String,
    amplifiers: Vec<AmplifierGeometry>,
}

impl DetectorMosaic {
    pub fn new(
        detector_id: impl Into<String>,
        amplifiers: Vec<AmplifierGeometry>,
    ) -> Result<Self, GeometryError> {
        let detector_id = detector_id.into();

        let Some(first) = amplifiers.first() else {
            return Err(GeometryError::NoAmplifiers {
                detector: detector_id,
            });
        };

        let expected_full = first.footprint(false);
        let expected_data = first.footprint(true);
        let mut max_grid = (0, 0);
        for (i, amp) in amplifiers.iter().enumerate() {
            if amplifiers[..i]
                .iter()
                .any(|other| other.channel_id() == amp.channel_id())
            {
                return Err(GeometryError::DuplicateChannel {
                    detector: detector_id,
                    channel: amp.channel_id(),
                });
            }

            for (expected, actual) in [
                (expected_full, amp.footprint(false)),
                (expected_data, amp.footprint(true)),
            ] {
                if actual != expected {
                    return Err(GeometryError::HeterogeneousAmplifiers {
                        detector: detector_id,
                        channel: amp.channel_id(),
                        expected,
                        actual,
                    });
                }
            }

            max_grid = (max_grid.0.max(amp.grid_col()), max_grid.1.max(amp.grid_row()));
            if mosaic_extent(max_grid, expected_full).is_none() {
                return Err(GeometryError::TileOutOfRange {
                    channel: amp.channel_id(),
                    col: amp.grid_col() as f64,
                    row: amp.grid_row() as f64,
                });
            }
        }

        let mosaic = Self {
            detector_id,
            amplifiers,
        };
        debug_assert!(
            mosaic.tiles_disjoint(true) && mosaic.tiles_disjoint(false),
            "Amplifier tiles of detector '{}' overlap",
            mosaic.detector_id
        );

        tracing::debug!(
            "Detector '{}': {} amplifiers, {:?} trimmed mosaic",
            mosaic.detector_id,
            mosaic.amplifiers.len(),
            mosaic.mosaic_size(true)
        );

        Ok(mosaic)
    }

    /// All channels of the resolver's fixed layout.
    pub fn from_fixed_layout(
        detector_id: impl Into<String>,
        resolver: &GeometryResolver,
    ) -> Result<Self, GeometryError> {
        let amplifiers = resolver
            .scan_fixed_layout()
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(detector_id, amplifiers)
    }

    /// One amplifier per image extension of `source`.
    pub fn from_headers<S: HeaderSource + ?Sized>(
        detector_id: impl Into<String>,
        resolver: &GeometryResolver,
        source: &S,
    ) -> Result<Self, GeometryError> {
        let amplifiers = resolver
            .scan_headers(source)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(detector_id, amplifiers)
    }

    pub fn detector_id(&self) -> &str {
        &self.detector_id
    }

    pub fn amplifiers(&self) -> &[AmplifierGeometry] {
        &self.amplifiers
    }

    pub fn len(&self) -> usize {
        self.amplifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amplifiers.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AmplifierGeometry> {
        self.amplifiers.iter()
    }

    pub fn amplifier(&self, channel: ChannelId) -> Option<&AmplifierGeometry> {
        self.amplifiers
            .iter()
            .find(|amp| amp.channel_id() == channel)
    }

    pub(crate) fn amplifiers_mut(&mut self) -> &mut [AmplifierGeometry] {
        &mut self.amplifiers
    }

    /// Size of the union of every amplifier's tile.
    pub fn mosaic_size(&self, trimmed: bool) -> (usize, usize) {
        self.amplifiers
            .iter()
            .map(|amp| amp.mosaic_rect(trimmed))
            .fold((0, 0), |(w, h), rect| (w.max(rect.x1()), h.max(rect.y1())))
    }

    /// Destination rectangle of each amplifier, in mosaic order.
    pub fn tile_rects(&self, trimmed: bool) -> Vec<(ChannelId, PixelRect)> {
        self.amplifiers
            .iter()
            .map(|amp| (amp.channel_id(), amp.mosaic_rect(trimmed)))
            .collect()
    }

    /// Whether no two amplifiers share a destination pixel.
    pub fn tiles_disjoint(&self, trimmed: bool) -> bool {
        let rects = self.tile_rects(trimmed);
        rects.iter().enumerate().all(|(i, (_, a))| {
            rects[i + 1..].iter().all(|(_, b)| !a.overlaps(b))
        })
    }
}

impl<'a> IntoIterator for &'a DetectorMosaic {
    type Item = &'a AmplifierGeometry;
    type IntoIter = std::slice::Iter<'a, AmplifierGeometry>;

    fn into_iter(self) -> Self::IntoIter {
        self.amplifiers.iter()
    }
}
