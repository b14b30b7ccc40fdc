//! IFD chain traversal.
//!
//! Directories form a singly-linked list starting at the header's first IFD
//! offset. The list comes from untrusted input, so the walk keeps a set of
//! visited offsets and a directory budget: a pointer back to any visited
//! directory, or a chain longer than the budget, aborts the walk.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::TiffError;
use crate::io::ByteSource;

use super::parser::{Ifd, TiffHeader};

/// Default maximum number of IFDs walked before giving up.
pub const DEFAULT_MAX_IFDS: usize = 1000;

// =============================================================================
// ChainWalker
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkState {
    /// Next IFD to read is at this offset
    Reading(u64),
    /// Chain ended with a zero next-IFD offset
    Done,
    /// A fatal error was returned; the walk yields nothing more
    Failed,
}

/// Iterator over the IFDs of a file, in chain order.
///
/// Yields `Err` at most once and stops afterwards.
pub struct ChainWalker<'a, S: ?Sized> {
    source: &'a S,
    header: TiffHeader,
    max_ifds: usize,
    visited: HashSet<u64>,
    state: WalkState,
}

impl<'a, S: ByteSource + ?Sized> ChainWalker<'a, S> {
    /// Start a walk at the header's first IFD offset.
    pub fn new(source: &'a S, header: TiffHeader, max_ifds: usize) -> Self {
        let state = match header.first_ifd_offset {
            0 => WalkState::Done,
            offset => WalkState::Reading(offset),
        };

        ChainWalker {
            source,
            header,
            max_ifds,
            visited: HashSet::new(),
            state,
        }
    }

    /// Number of IFDs read so far.
    pub fn ifds_read(&self) -> usize {
        self.visited.len()
    }

    fn read_next(&mut self, offset: u64) -> Result<Ifd, TiffError> {
        if self.visited.contains(&offset) {
            warn!(offset, "IFD chain loops back to a visited directory");
            return Err(TiffError::CircularChain(offset));
        }
        if self.visited.len() >= self.max_ifds {
            warn!(max_ifds = self.max_ifds, "IFD chain exceeds the directory limit");
            return Err(TiffError::ChainTooLong(self.max_ifds));
        }

        let ifd = Ifd::parse(self.source, offset, &self.header)?;
        self.visited.insert(offset);
        Ok(ifd)
    }
}

impl<'a, S: ByteSource + ?Sized> Iterator for ChainWalker<'a, S> {
    type Item = Result<Ifd, TiffError>;

    fn next(&mut self) -> Option<Self::Item> {
        let WalkState::Reading(offset) = self.state else {
            return None;
        };

        match self.read_next(offset) {
            Ok(ifd) => {
                self.state = match ifd.next_ifd_offset {
                    0 => WalkState::Done,
                    next => WalkState::Reading(next),
                };
                Some(Ok(ifd))
            }
            Err(e) => {
                self.state = WalkState::Failed;
                Some(Err(e))
            }
        }
    }
}

impl<'a, S: ByteSource + ?Sized> std::iter::FusedIterator for ChainWalker<'a, S> {}

// =============================================================================
// TiffFile
// =============================================================================

/// A fully parsed TIFF structure: header plus every IFD in chain order.
///
/// The first IFD is the main image, the rest are overviews (or any other
/// images) in the order the chain links them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TiffFile {
    /// The TIFF header
    pub header: TiffHeader,

    /// IFDs in chain order
    pub ifds: Vec<Ifd>,
}

impl TiffFile {
    /// Parse the header and walk the full IFD chain with the default limit.
    pub fn parse<S: ByteSource + ?Sized>(source: &S) -> Result<Self, TiffError> {
        Self::parse_with_limit(source, DEFAULT_MAX_IFDS)
    }

    /// Parse the header and walk the full IFD chain.
    ///
    /// Any header, bounds or chain error aborts the parse; no partial
    /// structure is returned.
    pub fn parse_with_limit<S: ByteSource + ?Sized>(
        source: &S,
        max_ifds: usize,
    ) -> Result<Self, TiffError> {
        let header = TiffHeader::read(source)?;
        let ifds = ChainWalker::new(source, header, max_ifds).collect::<Result<Vec<_>, _>>()?;

        debug!(ifds = ifds.len(), "Walked IFD chain");

        Ok(TiffFile { header, ifds })
    }

    /// Number of IFDs in the file.
    pub fn ifd_count(&self) -> usize {
        self.ifds.len()
    }
}

// =============================================================================
// Tests
// =============================================================================
