use bytes::Bytes;

use crate::error::IoError;

/// Random access to the bytes of a file held in memory.
///
/// This abstraction lets the TIFF parser work the same way over a fully
/// loaded buffer or a memory-mapped file. Every read is bounds-checked:
/// a range that does not fit inside the source fails instead of panicking.
pub trait ByteSource {
    /// Borrow exactly `len` bytes starting at `offset`.
    ///
    /// Returns `IoError::RangeOutOfBounds` if the range exceeds the source.
    fn read_exact_at(&self, offset: u64, len: usize) -> Result<&[u8], IoError>;

    /// Get the total size of the source in bytes.
    fn size(&self) -> u64;
}

impl ByteSource for [u8] {
    fn read_exact_at(&self, offset: u64, len: usize) -> Result<&[u8], IoError> {
        let out_of_bounds = || IoError::RangeOutOfBounds {
            offset,
            requested: len as u64,
            size: self.len() as u64,
        };

        let start = usize::try_from(offset).map_err(|_| out_of_bounds())?;
        let end = start.checked_add(len).ok_or_else(out_of_bounds)?;
        self.get(start..end).ok_or_else(out_of_bounds)
    }

    #[inline]
    fn size(&self) -> u64 {
        self.len() as u64
    }
}

impl ByteSource for Vec<u8> {
    #[inline]
    fn read_exact_at(&self, offset: u64, len: usize) -> Result<&[u8], IoError> {
        self.as_slice().read_exact_at(offset, len)
    }

    #[inline]
    fn size(&self) -> u64 {
        self.len() as u64
    }
}

impl ByteSource for Bytes {
    #[inline]
    fn read_exact_at(&self, offset: u64, len: usize) -> Result<&[u8], IoError> {
        self.as_ref().read_exact_at(offset, len)
    }

    #[inline]
    fn size(&self) -> u64 {
        self.len() as u64
    }
}

// =============================================================================
// Endian Helper Functions
// =============================================================================
//
// TIFF files can be either little-endian or big-endian, determined by the
// marker at the start of the file. Callers pass slices obtained from
// `ByteSource::read_exact_at`, so the length is already guaranteed.

/// Read a little-endian u16 from a byte slice.
///
/// # Panics
/// Panics if the slice has fewer than 2 bytes.
#[inline]
pub fn read_u16_le(bytes: &[u8]) -> u16 {
    u16::from_le_bytes([bytes[0], bytes[1]])
}

/// Read a big-endian u16 from a byte slice.
///
/// # Panics
/// Panics if the slice has fewer than 2 bytes.
#[inline]
pub fn read_u16_be(bytes: &[u8]) -> u16 {
    u16::from_be_bytes([bytes[0], bytes[1]])
}

/// Read a little-endian u32 from a byte slice.
///
/// # Panics
/// Panics if the slice has fewer than 4 bytes.
#[inline]
pub fn read_u32_le(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Read a big-endian u32 from a byte slice.
///
/// # Panics
/// Panics if the slice has fewer than 4 bytes.
#[inline]
pub fn read_u32_be(bytes: &[u8]) -> u32 {
    u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Read a little-endian u64 from a byte slice.
///
/// # Panics
/// Panics if the slice has fewer than 8 bytes.
#[inline]
pub fn read_u64_le(bytes: &[u8]) -> u64 {
    u64::from_le_bytes([
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
    ])
}

/// Read a big-endian u64 from a byte slice.
///
/// # Panics
/// Panics if the slice has fewer than 8 bytes.
#[inline]
pub fn read_u64_be(bytes: &[u8]) -> u64 {
    u64::from_be_bytes([
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
    ])
}
