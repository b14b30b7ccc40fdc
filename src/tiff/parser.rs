//! TIFF header and directory parsing.
//!
//! # TIFF Header Structure
//!
//! ## Classic TIFF (8 bytes)
//! ```text
//! Bytes 0-1: Byte order (0x4949 = little-endian "II", 0x4D4D = big-endian "MM")
//! Bytes 2-3: Version (42 = 0x002A)
//! Bytes 4-7: Offset to first IFD (4 bytes)
//! ```
//!
//! ## BigTIFF (16 bytes)
//! ```text
//! Bytes 0-1: Byte order (0x4949 = little-endian "II", 0x4D4D = big-endian "MM")
//! Bytes 2-3: Version (43 = 0x002B)
//! Bytes 4-7: Offset byte size and reserved word (not interpreted)
//! Bytes 8-15: Offset to first IFD (8 bytes)
//! ```
//!
//! # IFD Structure
//! ```text
//! Entry count:  2 bytes (TIFF) / 8 bytes (BigTIFF)
//! Entries:      12 bytes each (TIFF) / 20 bytes each (BigTIFF)
//!               tag (2) | type (2) | count (4/8) | value or offset (4/8)
//! Next IFD:     4 bytes (TIFF) / 8 bytes (BigTIFF), 0 terminates the chain
//! ```

use tracing::{debug, trace};

use crate::error::TiffError;
use crate::io::{
    read_u16_be, read_u16_le, read_u32_be, read_u32_le, read_u64_be, read_u64_le, ByteSource,
};

use super::tags::{FieldType, TiffTag};

// =============================================================================
// Constants
// =============================================================================

/// Marker indicating little-endian byte order ("II" for Intel)
const BYTE_ORDER_LITTLE_ENDIAN: u16 = 0x4949;

/// Marker indicating big-endian byte order ("MM" for Motorola)
const BYTE_ORDER_BIG_ENDIAN: u16 = 0x4D4D;

/// Version number for classic TIFF
const VERSION_TIFF: u16 = 42;

/// Version number for BigTIFF
const VERSION_BIGTIFF: u16 = 43;

/// Size of classic TIFF header in bytes
pub const TIFF_HEADER_SIZE: usize = 8;

/// Size of BigTIFF header in bytes
pub const BIGTIFF_HEADER_SIZE: usize = 16;

// =============================================================================
// ByteOrder
// =============================================================================

/// Byte order (endianness) of a TIFF file.
///
/// TIFF files declare their byte order in the first two bytes of the header.
/// All multi-byte values in the file must be read respecting this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    /// Little-endian ("II" = Intel)
    LittleEndian,
    /// Big-endian ("MM" = Motorola)
    BigEndian,
}

impl ByteOrder {
    /// Read a u16 from a byte slice using this byte order.
    #[inline]
    pub fn read_u16(self, bytes: &[u8]) -> u16 {
        match self {
            ByteOrder::LittleEndian => read_u16_le(bytes),
            ByteOrder::BigEndian => read_u16_be(bytes),
        }
    }

    /// Read a u32 from a byte slice using this byte order.
    #[inline]
    pub fn read_u32(self, bytes: &[u8]) -> u32 {
        match self {
            ByteOrder::LittleEndian => read_u32_le(bytes),
            ByteOrder::BigEndian => read_u32_be(bytes),
        }
    }

    /// Read a u64 from a byte slice using this byte order.
    #[inline]
    pub fn read_u64(self, bytes: &[u8]) -> u64 {
        match self {
            ByteOrder::LittleEndian => read_u64_le(bytes),
            ByteOrder::BigEndian => read_u64_be(bytes),
        }
    }

    /// Short name used in reports.
    pub const fn name(self) -> &'static str {
        match self {
            ByteOrder::LittleEndian => "little-endian",
            ByteOrder::BigEndian => "big-endian",
        }
    }
}

// =============================================================================
// TiffHeader
// =============================================================================

/// Parsed TIFF file header.
///
/// Contains the essential information needed to begin parsing IFDs:
/// - Byte order for reading all subsequent values
/// - Whether this is classic TIFF or BigTIFF (affects entry sizes and offset widths)
/// - Location of the first IFD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TiffHeader {
    /// Byte order for all multi-byte values in the file
    pub byte_order: ByteOrder,

    /// Whether this is a BigTIFF file (64-bit offsets)
    pub is_bigtiff: bool,

    /// Offset to the first IFD in the file
    pub first_ifd_offset: u64,
}

impl TiffHeader {
    /// Parse a TIFF header from the start of a file.
    ///
    /// Only the first 16 bytes are ever looked at. The first IFD offset is
    /// not range-checked here; a bad offset surfaces when the directory is read.
    ///
    /// # Errors
    /// - `FileTooSmall` if there aren't enough bytes for the header
    /// - `InvalidByteOrder` if the first two bytes are not II or MM
    /// - `InvalidMagic` if the version is not 42 or 43
    pub fn parse(bytes: &[u8]) -> Result<Self, TiffError> {
        if bytes.len() < TIFF_HEADER_SIZE {
            return Err(TiffError::FileTooSmall {
                required: TIFF_HEADER_SIZE as u64,
                actual: bytes.len() as u64,
            });
        }

        // The marker is a byte pattern, so the read order does not matter
        let marker = u16::from_le_bytes([bytes[0], bytes[1]]);
        let byte_order = match marker {
            BYTE_ORDER_LITTLE_ENDIAN => ByteOrder::LittleEndian,
            BYTE_ORDER_BIG_ENDIAN => ByteOrder::BigEndian,
            _ => return Err(TiffError::InvalidByteOrder(marker)),
        };

        let version = byte_order.read_u16(&bytes[2..4]);

        let header = match version {
            VERSION_TIFF => TiffHeader {
                byte_order,
                is_bigtiff: false,
                first_ifd_offset: u64::from(byte_order.read_u32(&bytes[4..8])),
            },
            VERSION_BIGTIFF => {
                if bytes.len() < BIGTIFF_HEADER_SIZE {
                    return Err(TiffError::FileTooSmall {
                        required: BIGTIFF_HEADER_SIZE as u64,
                        actual: bytes.len() as u64,
                    });
                }

                let offset_size = byte_order.read_u16(&bytes[4..6]);
                if offset_size != 8 {
                    debug!(offset_size, "BigTIFF header declares a non-standard offset size");
                }

                TiffHeader {
                    byte_order,
                    is_bigtiff: true,
                    first_ifd_offset: byte_order.read_u64(&bytes[8..16]),
                }
            }
            _ => return Err(TiffError::InvalidMagic(version)),
        };

        debug!(
            byte_order = header.byte_order.name(),
            bigtiff = header.is_bigtiff,
            first_ifd_offset = header.first_ifd_offset,
            "Parsed TIFF header"
        );

        Ok(header)
    }

    /// Read and parse the header from a byte source.
    ///
    /// Reads 16 bytes when available so BigTIFF headers are complete,
    /// otherwise whatever the source holds.
    pub fn read<S: ByteSource + ?Sized>(source: &S) -> Result<Self, TiffError> {
        let len = source.size().min(BIGTIFF_HEADER_SIZE as u64) as usize;
        let bytes = source.read_exact_at(0, len)?;
        Self::parse(bytes)
    }

    /// Size of an IFD entry in bytes.
    ///
    /// Classic TIFF: 12 bytes (2 tag + 2 type + 4 count + 4 value/offset)
    /// BigTIFF: 20 bytes (2 tag + 2 type + 8 count + 8 value/offset)
    #[inline]
    pub const fn ifd_entry_size(&self) -> usize {
        if self.is_bigtiff {
            20
        } else {
            12
        }
    }

    /// Size of the entry count field at the start of an IFD.
    ///
    /// Classic TIFF: 2 bytes (u16)
    /// BigTIFF: 8 bytes (u64)
    #[inline]
    pub const fn ifd_count_size(&self) -> usize {
        if self.is_bigtiff {
            8
        } else {
            2
        }
    }

    /// Size of the next IFD offset field at the end of an IFD.
    ///
    /// Classic TIFF: 4 bytes (u32)
    /// BigTIFF: 8 bytes (u64)
    #[inline]
    pub const fn ifd_next_offset_size(&self) -> usize {
        if self.is_bigtiff {
            8
        } else {
            4
        }
    }

    /// Size of the count and value/offset fields in an IFD entry.
    ///
    /// Classic TIFF: 4 bytes
    /// BigTIFF: 8 bytes
    #[inline]
    pub const fn value_offset_size(&self) -> usize {
        if self.is_bigtiff {
            8
        } else {
            4
        }
    }

    /// Read an offset-width value (u32 widened, or u64).
    #[inline]
    fn read_offset(&self, bytes: &[u8]) -> u64 {
        if self.is_bigtiff {
            self.byte_order.read_u64(bytes)
        } else {
            u64::from(self.byte_order.read_u32(bytes))
        }
    }
}

// =============================================================================
// IfdEntry
// =============================================================================

/// A single tag entry in an IFD.
///
/// `value_offset` holds either the value itself (when it fits in the slot)
/// or the file offset of out-of-line data. It is never dereferenced here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IfdEntry {
    /// Tag ID
    pub tag_id: u16,

    /// Raw field type code
    pub field_type: u16,

    /// Number of values
    pub count: u64,

    /// Value/offset slot read as an unsigned integer of the slot width
    pub value_offset: u64,
}

impl IfdEntry {
    /// Decode a single entry record of `header.ifd_entry_size()` bytes.
    fn parse(record: &[u8], header: &TiffHeader) -> Self {
        let order = header.byte_order;
        let width = header.value_offset_size();

        IfdEntry {
            tag_id: order.read_u16(&record[0..2]),
            field_type: order.read_u16(&record[2..4]),
            count: header.read_offset(&record[4..4 + width]),
            value_offset: header.read_offset(&record[4 + width..4 + 2 * width]),
        }
    }

    /// The field type, if it is one this crate names.
    pub fn field_type(&self) -> Option<FieldType> {
        FieldType::from_u16(self.field_type)
    }

    /// Whether the value is stored in the slot itself.
    ///
    /// Returns `None` for unknown field types, whose size cannot be known.
    pub fn is_inline(&self, is_bigtiff: bool) -> Option<bool> {
        self.field_type()
            .map(|field_type| field_type.fits_inline(self.count, is_bigtiff))
    }
}

// =============================================================================
// Ifd
// =============================================================================

/// A parsed Image File Directory.
///
/// Entries keep file order. Tag IDs are neither assumed unique nor sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ifd {
    /// Offset of this IFD in the file
    pub offset: u64,

    /// Tag entries in the order they appear in the file
    pub entries: Vec<IfdEntry>,

    /// Offset of the next IFD, 0 if this is the last one
    pub next_ifd_offset: u64,
}

impl Ifd {
    /// Total byte size of an IFD with `entry_count` entries.
    ///
    /// Returns `None` if the size does not fit in a `u64`.
    pub fn calculate_size(entry_count: u64, header: &TiffHeader) -> Option<u64> {
        entry_count
            .checked_mul(header.ifd_entry_size() as u64)?
            .checked_add(header.ifd_count_size() as u64)?
            .checked_add(header.ifd_next_offset_size() as u64)
    }

    /// Parse the IFD located at `offset`.
    ///
    /// # Errors
    /// `TruncatedData` if the count, any entry or the next-IFD pointer lies
    /// outside the source.
    pub fn parse<S: ByteSource + ?Sized>(
        source: &S,
        offset: u64,
        header: &TiffHeader,
    ) -> Result<Self, TiffError> {
        let count_size = header.ifd_count_size();
        let count_bytes = source.read_exact_at(offset, count_size)?;
        let entry_count = if header.is_bigtiff {
            header.byte_order.read_u64(count_bytes)
        } else {
            u64::from(header.byte_order.read_u16(count_bytes))
        };

        // Read the whole directory in one range so a bogus entry count fails
        // before anything is allocated for it.
        let truncated = || TiffError::TruncatedData {
            offset,
            requested: u64::MAX,
            size: source.size(),
        };
        let ifd_size = Self::calculate_size(entry_count, header).ok_or_else(truncated)?;
        let ifd_len = usize::try_from(ifd_size).map_err(|_| truncated())?;
        let ifd_bytes = source.read_exact_at(offset, ifd_len)?;

        let entry_size = header.ifd_entry_size();
        let entries_end = ifd_len - header.ifd_next_offset_size();
        let entries: Vec<IfdEntry> = ifd_bytes[count_size..entries_end]
            .chunks_exact(entry_size)
            .map(|record| IfdEntry::parse(record, header))
            .collect();

        for entry in &entries {
            trace!(
                tag = entry.tag_id,
                field_type = entry.field_type,
                count = entry.count,
                value_offset = entry.value_offset,
                "IFD entry"
            );
        }

        let next_ifd_offset = header.read_offset(&ifd_bytes[entries_end..]);

        debug!(
            offset,
            entries = entries.len(),
            next_ifd_offset,
            "Parsed IFD"
        );

        Ok(Ifd {
            offset,
            entries,
            next_ifd_offset,
        })
    }

    /// Number of entries in this IFD.
    #[inline]
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// First entry with the given raw tag ID, in file order.
    pub fn get_entry(&self, tag_id: u16) -> Option<&IfdEntry> {
        self.entries.iter().find(|entry| entry.tag_id == tag_id)
    }

    /// First entry for a known tag, in file order.
    #[inline]
    pub fn get_entry_by_tag(&self, tag: TiffTag) -> Option<&IfdEntry> {
        self.get_entry(tag.as_u16())
    }

    /// Whether a tag is present at all.
    #[inline]
    pub fn has_tag(&self, tag: TiffTag) -> bool {
        self.get_entry_by_tag(tag).is_some()
    }

    /// Whether this IFD stores its pixels as tiles.
    ///
    /// Requires TileWidth, TileLength and TileOffsets. TileByteCounts is
    /// not required.
    pub fn is_tiled(&self) -> bool {
        self.has_tag(TiffTag::TileWidth)
            && self.has_tag(TiffTag::TileLength)
            && self.has_tag(TiffTag::TileOffsets)
    }

    /// Whether this IFD stores its pixels as strips.
    pub fn is_stripped(&self) -> bool {
        self.has_tag(TiffTag::StripOffsets)
    }
}

// =============================================================================
// Tests
// =============================================================================
