//! Validation reports for the command line.
//!
//! A report keeps "could not parse" apart from "parsed but invalid": the
//! first carries the fatal parse error and no structure, the second carries
//! the layout errors and a summary of every IFD.

use serde::Serialize;

use crate::error::{IoError, TiffError};
use crate::tiff::{Ifd, TiffFile, ValidationResult};

// =============================================================================
// Status
// =============================================================================

/// Overall outcome of checking one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// Parsed and the layout is cloud-optimized
    Valid,
    /// Parsed but the layout has errors
    Invalid,
    /// The file could not be read or its structure could not be parsed
    ParseError,
}

impl Status {
    /// Process exit code for this outcome.
    pub const fn exit_code(self) -> u8 {
        match self {
            Status::Valid => 0,
            Status::Invalid => 1,
            Status::ParseError => 2,
        }
    }
}

// =============================================================================
// Structure Summary
// =============================================================================

/// How an IFD stores its pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    Tiled,
    Stripped,
    Unknown,
}

impl Layout {
    fn of(ifd: &Ifd) -> Self {
        if ifd.is_tiled() {
            Layout::Tiled
        } else if ifd.is_stripped() {
            Layout::Stripped
        } else {
            Layout::Unknown
        }
    }

    fn name(self) -> &'static str {
        match self {
            Layout::Tiled => "tiled",
            Layout::Stripped => "stripped",
            Layout::Unknown => "unknown",
        }
    }
}

/// One IFD as shown in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IfdSummary {
    pub index: usize,
    pub offset: u64,
    pub entries: usize,
    pub layout: Layout,
    pub next_offset: u64,
}

/// Header facts and the IFD chain as shown in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructureSummary {
    pub format: &'static str,
    pub byte_order: &'static str,
    pub ifds: Vec<IfdSummary>,
}

impl StructureSummary {
    pub fn from_file(file: &TiffFile) -> Self {
        let ifds = file
            .ifds
            .iter()
            .enumerate()
            .map(|(index, ifd)| IfdSummary {
                index,
                offset: ifd.offset,
                entries: ifd.entry_count(),
                layout: Layout::of(ifd),
                next_offset: ifd.next_ifd_offset,
            })
            .collect();

        StructureSummary {
            format: if file.header.is_bigtiff {
                "BigTIFF"
            } else {
                "TIFF"
            },
            byte_order: file.header.byte_order.name(),
            ifds,
        }
    }
}

// =============================================================================
// Report
// =============================================================================

/// Everything printed about one checked file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub file: String,
    pub status: Status,
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structure: Option<StructureSummary>,
}

impl Report {
    /// Report for a file that parsed and was validated.
    pub fn checked(file_name: impl Into<String>, file: &TiffFile, result: &ValidationResult) -> Self {
        Report {
            file: file_name.into(),
            status: if result.is_valid {
                Status::Valid
            } else {
                Status::Invalid
            },
            valid: result.is_valid,
            errors: result.error_messages(),
            warnings: result.warnings.clone(),
            structure: Some(StructureSummary::from_file(file)),
        }
    }

    /// Report for a file whose structure could not be parsed.
    pub fn parse_failure(file_name: impl Into<String>, error: &TiffError) -> Self {
        Self::failure(file_name, error.to_string())
    }

    /// Report for a file that could not be read at all.
    pub fn read_failure(file_name: impl Into<String>, error: &IoError) -> Self {
        Self::failure(file_name, error.to_string())
    }

    fn failure(file_name: impl Into<String>, message: String) -> Self {
        Report {
            file: file_name.into(),
            status: Status::ParseError,
            valid: false,
            errors: vec![message],
            warnings: Vec::new(),
            structure: None,
        }
    }

    /// Render as a pretty-printed JSON document.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Render as human-readable lines.
    pub fn to_text(&self) -> String {
        let mut lines = Vec::new();

        match self.status {
            Status::Valid => lines.push(format!("✓ {} is a valid cloud-optimized TIFF", self.file)),
            Status::Invalid => lines.push(format!("✗ {} is NOT a valid cloud-optimized TIFF", self.file)),
            Status::ParseError => lines.push(format!("✗ {} could not be parsed", self.file)),
        }

        if let Some(ref structure) = self.structure {
            lines.push(format!(
                "  {} ({}), {} IFD(s)",
                structure.format,
                structure.byte_order,
                structure.ifds.len()
            ));
            for ifd in &structure.ifds {
                lines.push(format!(
                    "    IFD {} at offset {}: {} entries, {}",
                    ifd.index,
                    ifd.offset,
                    ifd.entries,
                    ifd.layout.name()
                ));
            }
        }

        if !self.errors.is_empty() {
            lines.push("Errors:".to_string());
            lines.extend(self.errors.iter().map(|e| format!("  - {}", e)));
        }

        if !self.warnings.is_empty() {
            lines.push("Warnings:".to_string());
            lines.extend(self.warnings.iter().map(|w| format!("  - {}", w)));
        }

        lines.join("\n")
    }
}

// =============================================================================
// Tests
// =============================================================================
