//! Cloud-optimized layout validation.
//!
//! A file has a cloud-optimized layout when:
//! - **Organization**: every IFD (main image and overviews) is tiled
//! - **Ordering**: IFD metadata sits ahead of the tile data, so a reader can
//!   fetch all directories with one request from the start of the file
//!
//! Tiling problems are errors. A suspected ordering problem is only a
//! warning, because the metadata end is an estimate.
//!
//! Overview resolution order, compression and tile dimensions are not checked.

use thiserror::Error;
use tracing::{debug, info};

use super::chain::TiffFile;
use super::parser::{Ifd, TiffHeader};
use super::tags::TiffTag;

/// Warning added when tile data may start before the IFDs end.
pub const INTERLEAVED_WARNING: &str = "Tile data may be interleaved with IFDs.";

// =============================================================================
// Validation Result
// =============================================================================

/// A layout error that makes the file not cloud-optimized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The IFD chain is empty
    #[error("No IFDs found in file")]
    NoIfds,

    /// An IFD lacks TileWidth, TileLength or TileOffsets
    #[error("{} is not tiled", image_label(.ifd_index))]
    NotTiled {
        /// Position of the IFD in the chain
        ifd_index: usize,
    },
}

/// "Main image" for the first IFD, "Overview N" for the rest.
fn image_label(ifd_index: &usize) -> String {
    if *ifd_index == 0 {
        "Main image".to_string()
    } else {
        format!("Overview {}", ifd_index)
    }
}

/// Result of validating a TIFF layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    /// Whether the layout is cloud-optimized
    pub is_valid: bool,

    /// Layout errors in the order they were found (empty if valid)
    pub errors: Vec<ValidationError>,

    /// Advisory findings that never affect `is_valid`
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Create a successful validation result.
    pub fn ok() -> Self {
        ValidationResult {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Create a failed validation result with a single error.
    pub fn error(error: ValidationError) -> Self {
        ValidationResult {
            is_valid: false,
            errors: vec![error],
            warnings: Vec::new(),
        }
    }

    /// Add an error to the result.
    pub fn add_error(&mut self, error: ValidationError) {
        self.is_valid = false;
        self.errors.push(error);
    }

    /// Add a warning to the result.
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Errors rendered as human-readable messages.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }
}

// =============================================================================
// Layout Validation
// =============================================================================

/// Validate the layout of a parsed TIFF file.
///
/// Every IFD is checked for tiling so the error list is complete. The
/// interleaving check runs afterwards and can only add a warning.
pub fn validate_cog(file: &TiffFile) -> ValidationResult {
    if file.ifds.is_empty() {
        info!("No IFDs found");
        return ValidationResult::error(ValidationError::NoIfds);
    }

    let mut result = ValidationResult::ok();

    for (ifd_index, ifd) in file.ifds.iter().enumerate() {
        if let Err(error) = check_tiled(ifd, ifd_index) {
            result.add_error(error);
        }
    }

    let metadata_end = estimate_metadata_end(file);
    if let Some(first_tile) = min_tile_offset(file) {
        debug!(?metadata_end, first_tile, "Checking IFD and tile data ordering");
        if metadata_end.is_some_and(|end| first_tile < end) {
            result.add_warning(INTERLEAVED_WARNING);
        }
    }

    info!(
        valid = result.is_valid,
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "Validated layout"
    );

    result
}

/// Check if an IFD uses tiled organization.
pub fn check_tiled(ifd: &Ifd, ifd_index: usize) -> Result<(), ValidationError> {
    if ifd.is_tiled() {
        Ok(())
    } else {
        debug!(
            ifd_index,
            offset = ifd.offset,
            stripped = ifd.is_stripped(),
            "IFD is not tiled"
        );
        Err(ValidationError::NotTiled { ifd_index })
    }
}

/// Estimated byte size of an IFD's on-disk record.
///
/// Classic TIFF: 2-byte count + 4-byte next offset + 12 bytes per entry.
/// BigTIFF: 8-byte count + 8-byte next offset + 20 bytes per entry.
pub fn estimated_ifd_size(ifd: &Ifd, header: &TiffHeader) -> u64 {
    let overhead = (header.ifd_count_size() + header.ifd_next_offset_size()) as u64;
    let entries = ifd.entry_count() as u64;
    entries
        .saturating_mul(header.ifd_entry_size() as u64)
        .saturating_add(overhead)
}

/// Estimated offset where IFD metadata ends.
///
/// The highest IFD offset plus the size of the last IFD in chain order.
/// Out-of-line tag data is not included. Returns `None` with no IFDs.
pub fn estimate_metadata_end(file: &TiffFile) -> Option<u64> {
    let last_ifd_offset = file.ifds.iter().map(|ifd| ifd.offset).max()?;
    let last = file.ifds.last()?;
    Some(last_ifd_offset.saturating_add(estimated_ifd_size(last, &file.header)))
}

/// Smallest TileOffsets value/offset slot across all IFDs.
pub fn min_tile_offset(file: &TiffFile) -> Option<u64> {
    file.ifds
        .iter()
        .filter_map(|ifd| ifd.get_entry_by_tag(TiffTag::TileOffsets))
        .inspect(|entry| {
            debug!(
                value_offset = entry.value_offset,
                inline = ?entry.is_inline(file.header.is_bigtiff),
                "TileOffsets entry"
            )
        })
        .map(|entry| entry.value_offset)
        .min()
}

// =============================================================================
// Tests
// =============================================================================
