//! Tessera - multi-amplifier CCD geometry and mosaic assembly.
//!
//! A CCD read out through several amplifiers arrives as one raw block per
//! channel, each in its own electronic orientation with pre-scan and overscan
//! columns around the light-sensitive pixels. This crate:
//! - Resolves where each amplifier sits in the detector (from `LTV`/`LTM`/`DATASEC`
//!   header cards, or from a fixed two-row layout when no headers exist)
//! - Validates the electronic-to-chip transforms
//! - Bias-corrects, trims, reorients and tiles the blocks into one image
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tessera::prelude::*;
//!
//! let resolver = GeometryResolver::default();
//! let mosaic = DetectorMosaic::from_fixed_layout("ccd0", &resolver)?;
//!
//! let mut source = InMemoryPixelSource::new();
//! // source.insert(channel, raw_readout) for every channel ...
//!
//! let result = assemble(&mosaic, &source, true, BiasMode::PerRow)?;
//! println!("{:?}", result.image().size());
//! ```

pub mod assembly;
pub mod geometry;
pub(crate) mod math;
pub mod mosaic;

pub mod prelude;

pub use common::Buffer2;

// ============================================================================
// Geometry
// ============================================================================

pub use geometry::{
    AmplifierGeometry, AmplifierMetadata, ChannelId, ElectronicParams, FixedLayoutScan,
    GeometryError, GeometryResolver, HeaderScan, HeaderSource, HeaderValue, LinearTransform,
    PixelRect, ReadoutLayout, Rotation, TransformError, ValidatedTransform,
};
pub use mosaic::DetectorMosaic;

// ============================================================================
// Assembly
// ============================================================================

pub use assembly::{
    assemble, assemble_with_config, correct_amplifier, AmplifierPixelSource, AssembledImage,
    AssemblyConfig, AssemblyError, BiasMode, InMemoryPixelSource, MissingAmplifier,
    MissingDataPolicy, PixelSourceError,
};
