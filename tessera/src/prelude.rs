//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use tessera::prelude::*;
//! ```

// Geometry
pub use crate::{
    AmplifierGeometry, AmplifierMetadata, ChannelId, DetectorMosaic, GeometryError,
    GeometryResolver, PixelRect, ReadoutLayout, Rotation,
};

// Assembly
pub use crate::{
    assemble, assemble_with_config, correct_amplifier, AmplifierPixelSource, AssembledImage,
    AssemblyConfig, AssemblyError, BiasMode, InMemoryPixelSource, MissingDataPolicy,
};

pub use crate::Buffer2;
