//! Parser integration tests.
//!
//! Tests verify:
//! - Literal header byte sequences decode as expected
//! - The same structure is recovered from every byte order and width
//! - Malformed chains abort the parse with the right error

use proptest::prelude::*;

use cog_validator::{
    ByteOrder, ChainWalker, FileSource, TiffError, TiffFile, TiffHeader, DEFAULT_MAX_IFDS,
};

use super::test_utils::{
    stripped_entries, tiled_entries, write_temp_file, ByteOrderType, TiffBuilder,
    TAG_TILE_OFFSETS,
};

// =============================================================================
// Header Scenarios
// =============================================================================

#[test]
fn test_classic_little_endian_header() {
    let header = TiffHeader::parse(&[0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00]).unwrap();

    assert!(!header.is_bigtiff);
    assert_eq!(header.byte_order, ByteOrder::LittleEndian);
    assert_eq!(header.first_ifd_offset, 8);
}

#[test]
fn test_bad_byte_order_marker() {
    let result = TiffHeader::parse(&[0x00, 0x00, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00]);

    let err = result.unwrap_err();
    assert!(matches!(err, TiffError::InvalidByteOrder(_)));
    assert!(err.to_string().contains("bad byte order marker"));
}

#[test]
fn test_bad_magic_number() {
    let result = TiffHeader::parse(&[0x49, 0x49, 0x00, 0x00, 0x08, 0x00, 0x00, 0x00]);

    let err = result.unwrap_err();
    assert!(matches!(err, TiffError::InvalidMagic(0)));
    assert_eq!(err.to_string(), "Malformed header: bad magic number: 0");
}

#[test]
fn test_bigtiff_header() {
    let header = TiffHeader::parse(&[
        0x49, 0x49, 0x2B, 0x00, 0x08, 0x00, 0x00, 0x00, 0x10, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00,
    ])
    .unwrap();

    assert!(header.is_bigtiff);
    assert_eq!(header.first_ifd_offset, 16);
}

proptest! {
    #[test]
    fn prop_classic_header_offset(offset in any::<u32>(), big_endian in any::<bool>()) {
        let mut bytes = Vec::new();
        if big_endian {
            bytes.extend_from_slice(b"MM\x00\x2A");
            bytes.extend_from_slice(&offset.to_be_bytes());
        } else {
            bytes.extend_from_slice(b"II\x2A\x00");
            bytes.extend_from_slice(&offset.to_le_bytes());
        }

        let header = TiffHeader::parse(&bytes).unwrap();
        prop_assert!(!header.is_bigtiff);
        prop_assert_eq!(header.first_ifd_offset, u64::from(offset));
    }

    #[test]
    fn prop_bigtiff_header_offset(offset in any::<u64>(), big_endian in any::<bool>()) {
        let mut bytes = Vec::new();
        if big_endian {
            bytes.extend_from_slice(b"MM\x00\x2B\x00\x08\x00\x00");
            bytes.extend_from_slice(&offset.to_be_bytes());
        } else {
            bytes.extend_from_slice(b"II\x2B\x00\x08\x00\x00\x00");
            bytes.extend_from_slice(&offset.to_le_bytes());
        }

        let header = TiffHeader::parse(&bytes).unwrap();
        prop_assert!(header.is_bigtiff);
        prop_assert_eq!(header.first_ifd_offset, offset);
    }

    #[test]
    fn prop_unknown_marker_rejected(marker in any::<[u8; 2]>(), rest in any::<[u8; 14]>()) {
        prop_assume!(&marker != b"II" && &marker != b"MM");

        let mut bytes = marker.to_vec();
        bytes.extend_from_slice(&rest);

        prop_assert!(matches!(
            TiffHeader::parse(&bytes),
            Err(TiffError::InvalidByteOrder(_))
        ));
    }

    #[test]
    fn prop_unknown_version_rejected(version in any::<u16>()) {
        prop_assume!(version != 42 && version != 43);

        let mut bytes = b"II".to_vec();
        bytes.extend_from_slice(&version.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 12]);

        prop_assert!(matches!(
            TiffHeader::parse(&bytes),
            Err(TiffError::InvalidMagic(v)) if v == version
        ));
    }
}

// =============================================================================
// Chain Parsing
// =============================================================================

#[test]
fn test_same_structure_in_every_layout() {
    for order in ByteOrderType::ALL {
        for bigtiff in [false, true] {
            let builder = TiffBuilder::new(order, bigtiff)
                .ifd(tiled_entries(4096))
                .ifd(stripped_entries(8192))
                .pad_to(256);
            let data = builder.build();

            let file = TiffFile::parse(&data).unwrap();
            let context = format!("{:?} bigtiff={}", order, bigtiff);

            assert_eq!(file.header.is_bigtiff, bigtiff, "{}", context);
            assert_eq!(file.ifd_count(), 2, "{}", context);

            let offsets: Vec<u64> = file.ifds.iter().map(|ifd| ifd.offset).collect();
            assert_eq!(offsets, builder.ifd_offsets(), "{}", context);

            assert_eq!(file.ifds[0].entry_count(), 7, "{}", context);
            let tile_offsets = file.ifds[0].get_entry(TAG_TILE_OFFSETS).unwrap();
            assert_eq!(tile_offsets.count, 16, "{}", context);
            assert_eq!(tile_offsets.value_offset, 4096, "{}", context);

            assert!(file.ifds[0].is_tiled(), "{}", context);
            assert!(file.ifds[1].is_stripped(), "{}", context);
            assert_eq!(file.ifds[1].next_ifd_offset, 0, "{}", context);
        }
    }
}

#[test]
fn test_circular_chain_rejected() {
    let data = TiffBuilder::classic_le()
        .ifd(tiled_entries(4096))
        .ifd(tiled_entries(8192))
        .ifd(tiled_entries(12288))
        .link_last_to(1)
        .build();

    let result = TiffFile::parse(&data);
    assert!(matches!(result, Err(TiffError::CircularChain(_))));
}

#[test]
fn test_self_referencing_ifd_rejected() {
    let builder = TiffBuilder::new(ByteOrderType::BigEndian, true)
        .ifd(tiled_entries(4096))
        .link_last_to(0);
    let first = builder.ifd_offsets()[0];

    let result = TiffFile::parse(&builder.build());
    assert!(matches!(result, Err(TiffError::CircularChain(o)) if o == first));
}

#[test]
fn test_chain_limit() {
    let mut builder = TiffBuilder::classic_le();
    for i in 0..5 {
        builder = builder.ifd(tiled_entries(10_000 + i));
    }
    let data = builder.build();

    assert_eq!(TiffFile::parse_with_limit(&data, 5).unwrap().ifd_count(), 5);
    assert!(matches!(
        TiffFile::parse_with_limit(&data, 4),
        Err(TiffError::ChainTooLong(4))
    ));
}

#[test]
fn test_truncated_file_rejected() {
    let data = TiffBuilder::classic_le()
        .ifd(tiled_entries(4096))
        .ifd(tiled_entries(8192))
        .build();

    // Cut into the middle of the second IFD's entries
    let truncated = &data[..data.len() - 20];
    let result = TiffFile::parse(truncated);
    assert!(matches!(result, Err(TiffError::TruncatedData { .. })));
}

#[test]
fn test_first_ifd_past_end_rejected() {
    let data = vec![0x49, 0x49, 0x2A, 0x00, 0x00, 0x10, 0x00, 0x00];
    let result = TiffFile::parse(&data);
    assert!(matches!(
        result,
        Err(TiffError::TruncatedData { offset: 4096, .. })
    ));
}

#[test]
fn test_walker_yields_in_chain_order() {
    let builder = TiffBuilder::new(ByteOrderType::BigEndian, false)
        .ifd(tiled_entries(4096))
        .ifd(tiled_entries(8192))
        .ifd(stripped_entries(9000));
    let data = builder.build();
    let header = TiffHeader::read(&data).unwrap();

    let offsets: Vec<u64> = ChainWalker::new(&data, header, DEFAULT_MAX_IFDS)
        .map(|ifd| ifd.unwrap().offset)
        .collect();
    assert_eq!(offsets, builder.ifd_offsets());
}

// =============================================================================
// File Sources
// =============================================================================

#[test]
fn test_parse_from_disk() {
    let data = TiffBuilder::new(ByteOrderType::LittleEndian, true)
        .ifd(tiled_entries(4096))
        .ifd(tiled_entries(8192))
        .build();
    let temp = write_temp_file(&data);

    let loaded = FileSource::open(temp.path()).unwrap();
    let mapped = FileSource::map(temp.path()).unwrap();

    let from_loaded = TiffFile::parse(&loaded).unwrap();
    let from_mapped = TiffFile::parse(&mapped).unwrap();
    assert_eq!(from_loaded, from_mapped);
    assert_eq!(from_loaded, TiffFile::parse(&data).unwrap());
}

#[test]
fn test_empty_file_rejected() {
    let temp = write_temp_file(&[]);
    let source = FileSource::open(temp.path()).unwrap();

    assert!(matches!(
        TiffFile::parse(&source),
        Err(TiffError::FileTooSmall { actual: 0, .. })
    ));
}
