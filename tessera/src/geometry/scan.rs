//! Lazy enumeration of a detector's amplifiers.
//!
//! Both scans are finite and fused: they end at the first channel the layout does
//! not know, the first unreadable or non-image extension, or right after
//! yielding an error. Restart by asking the resolver for a new scan.

use super::{AmplifierGeometry, AmplifierMetadata, ChannelId, GeometryError, GeometryResolver};

/// Supplies decoded headers by extension number (0 is the primary header).
pub trait HeaderSource {
    /// `None` when extension `extension` does not exist or cannot be read.
    fn header(&self, extension: usize) -> Option<AmplifierMetadata>;
}

impl HeaderSource for [AmplifierMetadata] {
    fn header(&self, extension: usize) -> Option<AmplifierMetadata> {
        self.get(extension).cloned()
    }
}

impl HeaderSource for Vec<AmplifierMetadata> {
    fn header(&self, extension: usize) -> Option<AmplifierMetadata> {
        self.as_slice().header(extension)
    }
}

/// Channels `1, 2, …` of the fixed layout.
#[derive(Debug, Clone)]
pub struct FixedLayoutScan<'a> {
    resolver: &'a GeometryResolver,
    next_channel: u32,
    done: bool,
}

impl<'a> FixedLayoutScan<'a> {
    pub(crate) fn new(resolver: &'a GeometryResolver) -> Self {
        Self {
            resolver,
            next_channel: 1,
            done: false,
        }
    }
}

impl Iterator for FixedLayoutScan<'_> {
    type Item = Result<AmplifierGeometry, GeometryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let channel = ChannelId::new(self.next_channel);
        self.next_channel += 1;

        match self.resolver.resolve_amplifier(None, Some(channel)) {
            Ok(amp) => Some(Ok(amp)),
            Err(err) if err.is_end_of_channels() => {
                self.done = true;
                None
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl std::iter::FusedIterator for FixedLayoutScan<'_> {}

/// One amplifier per image extension, starting after the primary header.
pub struct HeaderScan<'a, S: HeaderSource + ?Sized> {
    resolver: &'a GeometryResolver,
    source: &'a S,
    next_extension: usize,
    done: bool,
}

impl<'a, S: HeaderSource + ?Sized> HeaderScan<'a, S> {
    pub(crate) fn new(resolver: &'a GeometryResolver, source: &'a S) -> Self {
        Self {
            resolver,
            source,
            next_extension: 1,
            done: false,
        }
    }
}

impl<S: HeaderSource + ?Sized> Iterator for HeaderScan<'_, S> {
    type Item = Result<AmplifierGeometry, GeometryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let extension = self.next_extension;
        self.next_extension += 1;

        let Some(md) = self.source.header(extension) else {
            tracing::debug!("Header scan stopped at unreadable extension {}", extension);
            self.done = true;
            return None;
        };
        if md.is_table() {
            tracing::debug!("Header scan stopped at table extension {}", extension);
            self.done = true;
            return None;
        }

        let result = self.resolver.resolve_amplifier(Some(&md), None);
        if result.is_err() {
            self.done = true;
        }
        Some(result)
    }
}

impl<S: HeaderSource + ?Sized> std::iter::FusedIterator for HeaderScan<'_, S> {}
