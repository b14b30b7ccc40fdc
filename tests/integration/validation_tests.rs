//! Layout validation integration tests.
//!
//! Tests run the full parse-then-validate path on generated files and check
//! the exact diagnostics a user would see.

use cog_validator::{validate_cog, FileSource, Report, Status, TiffFile, ValidationResult};

use super::test_utils::{
    stripped_entries, tiled_entries, write_temp_file, ByteOrderType, TiffBuilder,
};

const INTERLEAVED: &str = "Tile data may be interleaved with IFDs.";

fn check(data: &[u8]) -> ValidationResult {
    let file = TiffFile::parse(data).expect("test file should parse");
    validate_cog(&file)
}

// =============================================================================
// Tiling
// =============================================================================

#[test]
fn test_two_tiled_ifds_valid() {
    for order in ByteOrderType::ALL {
        for bigtiff in [false, true] {
            let data = TiffBuilder::new(order, bigtiff)
                .ifd(tiled_entries(4096))
                .ifd(tiled_entries(8192))
                .build();
            let result = check(&data);

            assert!(result.is_valid, "{:?} bigtiff={}", order, bigtiff);
            assert!(result.errors.is_empty());
            assert!(result.warnings.is_empty());
        }
    }
}

#[test]
fn test_untiled_overview() {
    let data = TiffBuilder::classic_le()
        .ifd(tiled_entries(4096))
        .ifd(stripped_entries(8192))
        .build();
    let result = check(&data);

    assert!(!result.is_valid);
    assert_eq!(result.error_messages(), vec!["Overview 1 is not tiled"]);
}

#[test]
fn test_untiled_main_image_and_overview() {
    let data = TiffBuilder::new(ByteOrderType::BigEndian, false)
        .ifd(stripped_entries(4096))
        .ifd(tiled_entries(8192))
        .ifd(stripped_entries(9000))
        .build();
    let result = check(&data);

    assert_eq!(
        result.error_messages(),
        vec!["Main image is not tiled", "Overview 2 is not tiled"]
    );
}

#[test]
fn test_empty_chain() {
    let data = TiffBuilder::classic_le().build();
    let result = check(&data);

    assert!(!result.is_valid);
    assert_eq!(result.error_messages(), vec!["No IFDs found in file"]);
    assert!(result.warnings.is_empty());
}

// =============================================================================
// Interleaving
// =============================================================================

#[test]
fn test_tile_data_before_ifds_warns() {
    // Second IFD ends well after offset 20
    let data = TiffBuilder::classic_le()
        .ifd(tiled_entries(4096))
        .ifd(tiled_entries(20))
        .build();
    let result = check(&data);

    assert!(result.is_valid);
    assert_eq!(result.warnings, vec![INTERLEAVED.to_string()]);
}

#[test]
fn test_tile_data_right_after_ifds_no_warning() {
    let builder = TiffBuilder::classic_le()
        .ifd(tiled_entries(0))
        .ifd(tiled_entries(0));
    let end = builder.ifd_offsets()[1] + builder.ifd_size(7);

    let data = TiffBuilder::classic_le()
        .ifd(tiled_entries(end))
        .ifd(tiled_entries(end + 1024))
        .build();
    let result = check(&data);

    assert!(result.is_valid);
    assert!(result.warnings.is_empty());
}

#[test]
fn test_bigtiff_metadata_estimate_uses_bigtiff_sizes() {
    // One BigTIFF IFD at 16 with 7 entries ends at 16 + 8 + 140 + 8 = 172.
    // Classic sizes would put the end at 16 + 6 + 84 = 106.
    let data = TiffBuilder::new(ByteOrderType::LittleEndian, true)
        .ifd(tiled_entries(150))
        .build();
    let result = check(&data);

    assert!(result.is_valid);
    assert_eq!(result.warnings, vec![INTERLEAVED.to_string()]);
}

// =============================================================================
// Reports
// =============================================================================

#[test]
fn test_report_distinguishes_parse_failure_from_invalid() {
    let invalid = TiffBuilder::classic_le()
        .ifd(stripped_entries(4096))
        .build();
    let file = TiffFile::parse(&invalid).unwrap();
    let report = Report::checked("invalid.tif", &file, &validate_cog(&file));
    assert_eq!(report.status, Status::Invalid);

    let looping = TiffBuilder::classic_le()
        .ifd(tiled_entries(4096))
        .link_last_to(0)
        .build();
    let error = TiffFile::parse(&looping).unwrap_err();
    let report = Report::parse_failure("looping.tif", &error);
    assert_eq!(report.status, Status::ParseError);

    assert_ne!(Status::Invalid.exit_code(), Status::ParseError.exit_code());
}

#[test]
fn test_validate_mapped_file() {
    let data = TiffBuilder::new(ByteOrderType::BigEndian, true)
        .ifd(tiled_entries(4096))
        .ifd(tiled_entries(8192))
        .ifd(tiled_entries(12288))
        .build();
    let temp = write_temp_file(&data);

    let source = FileSource::map(temp.path()).unwrap();
    let file = TiffFile::parse(&source).unwrap();
    let result = validate_cog(&file);

    assert!(result.is_valid);
    assert_eq!(file.ifd_count(), 3);
}
