//! # COG Validator
//!
//! Checks whether a TIFF or BigTIFF file has a cloud-optimized layout: every
//! image directory is tiled, and directory metadata sits before the tile data
//! it describes, so a reader can fetch all IFDs with one request and then
//! read tiles with HTTP range requests.
//!
//! ## Architecture
//!
//! - [`io`] - Bounds-checked byte sources over loaded or memory-mapped files
//! - [`tiff`] - Header and IFD parsing, chain walking and layout validation
//! - [`report`] - Text and JSON reports for the command line
//! - [`config`] - CLI configuration
//!
//! ## Example
//!
//! ```rust
//! use cog_validator::{validate_cog, TiffFile};
//!
//! // Classic little-endian TIFF with no IFDs
//! let bytes = vec![0x49, 0x49, 0x2A, 0x00, 0x00, 0x00, 0x00, 0x00];
//!
//! let file = TiffFile::parse(&bytes).expect("header is well-formed");
//! let result = validate_cog(&file);
//!
//! assert!(!result.is_valid);
//! assert_eq!(result.error_messages(), vec!["No IFDs found in file"]);
//! ```

pub mod config;
pub mod error;
pub mod io;
pub mod report;
pub mod tiff;

// Re-export commonly used types
pub use config::{Config, OutputFormat};
pub use error::{IoError, TiffError};
pub use io::{ByteSource, FileSource};
pub use report::{Report, Status};
pub use tiff::{
    check_tiled, validate_cog, ByteOrder, ChainWalker, FieldType, Ifd, IfdEntry, TiffFile,
    TiffHeader, TiffTag, ValidationError, ValidationResult, DEFAULT_MAX_IFDS,
};
