//! TIFF structure parsing and layout validation.
//!
//! # Key Concepts
//!
//! - **Byte order**: TIFF files declare their endianness (II = little-endian, MM = big-endian)
//!   in the header. All multi-byte values must be read respecting this order.
//!
//! - **Classic TIFF vs BigTIFF**: Classic TIFF uses 32-bit offsets and counts,
//!   BigTIFF uses 64-bit ones. Both are widened to `u64` after decoding.
//!
//! - **IFD (Image File Directory)**: Metadata for one image. IFDs form a linked
//!   chain; in a cloud-optimized file the first is the main image and the
//!   rest are overviews.
//!
//! - **Untrusted input**: Every read is bounds-checked and the IFD chain walk
//!   rejects loops and overly long chains.

mod chain;
mod parser;
mod tags;
mod validation;

pub use chain::{ChainWalker, TiffFile, DEFAULT_MAX_IFDS};
pub use parser::{ByteOrder, Ifd, IfdEntry, TiffHeader, BIGTIFF_HEADER_SIZE, TIFF_HEADER_SIZE};
pub use tags::{FieldType, TiffTag};
pub use validation::{
    check_tiled, estimate_metadata_end, estimated_ifd_size, min_tile_offset, validate_cog,
    ValidationError, ValidationResult, INTERLEAVED_WARNING,
};
