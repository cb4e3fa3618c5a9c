#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests for tile set decoding
//!
//! Blobs are assembled by hand so the header and slot layout is exercised
//! independently of the builder.

use pretty_assertions::assert_eq;
use wwmix_formats::tile::{
    DecodeFailure, DecodedTile, EMPTY_TILE, TileEncoding, TileError, TileSet, TileSetBuilder,
};

fn blob(width: u16, height: u16, encoding: u16, slots: &[u32], image: &[u8]) -> Vec<u8> {
    let index_start = 20u32;
    let index_end = index_start + 4 * slots.len() as u32;
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&width.to_le_bytes());
    bytes.extend_from_slice(&height.to_le_bytes());
    bytes.extend_from_slice(&(slots.len() as u16).to_le_bytes());
    bytes.extend_from_slice(&encoding.to_le_bytes());
    bytes.extend_from_slice(&index_end.to_le_bytes());
    bytes.extend_from_slice(&index_start.to_le_bytes());
    bytes.extend_from_slice(&index_end.to_le_bytes());
    for slot in slots {
        bytes.extend_from_slice(&slot.to_le_bytes());
    }
    bytes.extend_from_slice(image);
    bytes
}

#[test]
fn empty_sentinel_is_not_a_failure() {
    let set = TileSet::parse(blob(2, 2, 0, &[EMPTY_TILE, 0], &[1, 2, 3, 4])).unwrap();

    let tile = set.decode_tile(0).unwrap();
    assert_eq!(tile, DecodedTile::Empty);
    assert_eq!(tile.into_pixels_or(0x7F, set.tile_size()), vec![0x7F; 4]);
    assert_eq!(set.decode_tile(1).unwrap(), DecodedTile::Pixels(vec![1, 2, 3, 4]));
}

#[test]
fn short_raw_tile_is_a_decode_failure() {
    let set = TileSet::parse(blob(4, 4, 0, &[0], &[0; 10])).unwrap();

    match set.decode_tile(0) {
        Err(TileError::Decode { index, failure }) => {
            assert_eq!(index, 0);
            assert_eq!(
                failure,
                DecodeFailure::SizeMismatch {
                    expected: 16,
                    actual: 10
                }
            );
        }
        other => panic!("expected a decode failure, got {other:?}"),
    }
}

#[test]
fn raw_tile_is_bounded_by_the_next_slot() {
    // tile 0 owns two bytes, tile 1 the next four
    let set = TileSet::parse(blob(2, 2, 0, &[0, 2], &[1, 2, 3, 4, 5, 6])).unwrap();

    match set.decode_tile(0) {
        Err(TileError::Decode { index, failure }) => {
            assert_eq!(index, 0);
            assert_eq!(
                failure,
                DecodeFailure::SizeMismatch {
                    expected: 4,
                    actual: 2
                }
            );
        }
        other => panic!("expected a decode failure, got {other:?}"),
    }
    assert_eq!(set.decode_tile(1).unwrap(), DecodedTile::Pixels(vec![3, 4, 5, 6]));
}

#[test]
fn oversized_raw_tile_is_a_decode_failure() {
    let set = TileSet::parse(blob(2, 2, 0, &[0], &[1, 2, 3, 4, 5, 6])).unwrap();

    assert_eq!(
        set.decode_tile(0).unwrap_err().decode_failure(),
        Some(&DecodeFailure::SizeMismatch {
            expected: 4,
            actual: 6
        })
    );
    assert_eq!(set.decode_all().failed(), 1);
}

#[test]
fn all_zero_raw_tile_round_trips() {
    let pixels = vec![0u8; 24 * 24];
    let bytes = TileSetBuilder::new(24, 24, TileEncoding::Raw)
        .tile(pixels.clone())
        .build()
        .unwrap();

    let set = TileSet::parse(bytes).unwrap();
    assert_eq!(set.decode_tile(0).unwrap(), DecodedTile::Pixels(pixels));
}

#[test]
fn rle_set_with_failures_still_decodes_the_rest() {
    let image = [
        0x84, 0x05, // tile 0: four fives
        0x80, 0x00, 0x00, // tile 1: zero-length long run
        0x02, 0x01, 0x02, 0x82, 0x03, // tile 2: 1 2 3 3
        0x85, 0x09, // tile 3: overflow
    ];
    let set = TileSet::parse(blob(2, 2, 1, &[0, 2, 5, EMPTY_TILE, 10], &image)).unwrap();
    let report = set.decode_all();

    assert_eq!(report.results.len(), 5);
    assert_eq!(report.decoded(), 2);
    assert_eq!(report.empty(), 1);
    assert_eq!(report.failed(), 2);
    assert!(!report.is_clean());
    assert_eq!(report.results[2], Ok(DecodedTile::Pixels(vec![1, 2, 3, 3])));

    let failures: Vec<(usize, DecodeFailure)> = report
        .failures()
        .map(|(index, failure)| (index, failure.clone()))
        .collect();
    assert_eq!(
        failures,
        vec![
            (1, DecodeFailure::ZeroLengthRun { offset: 0 }),
            (
                4,
                DecodeFailure::Overflow {
                    offset: 0,
                    run: 5,
                    remaining: 4
                }
            ),
        ]
    );
}

#[test]
fn delta_frames_follow_the_previous_frame() {
    let frames = [vec![4, 4, 4, 4], vec![4, 5, 4, 5], vec![6, 5, 4, 3]];
    let bytes = TileSetBuilder::new(2, 2, TileEncoding::RleDelta)
        .tile(frames[0].clone())
        .tile(frames[1].clone())
        .empty()
        .tile(frames[2].clone())
        .build()
        .unwrap();
    let set = TileSet::parse(bytes).unwrap();

    assert_eq!(set.decode_tile(3).unwrap().pixels(), Some(&frames[2][..]));
    assert_eq!(
        set.decode_delta(1, &frames[0]).unwrap().pixels(),
        Some(&frames[1][..])
    );
    assert!(set.decode_all().is_clean());
}

#[test]
fn structural_errors() {
    assert!(matches!(
        TileSet::parse(vec![0; 10]),
        Err(TileError::Structural { .. })
    ));
    // unknown encoding
    assert!(matches!(
        TileSet::parse(blob(1, 1, 7, &[0], &[0])),
        Err(TileError::Structural { .. })
    ));
    // zero-sized tiles
    assert!(matches!(
        TileSet::parse(blob(0, 8, 0, &[0], &[0])),
        Err(TileError::Structural { .. })
    ));
    // slot table starting inside the header
    let mut bytes = blob(1, 1, 0, &[0], &[0]);
    bytes[12..16].copy_from_slice(&4u32.to_le_bytes());
    bytes[16..20].copy_from_slice(&8u32.to_le_bytes());
    assert!(matches!(
        TileSet::parse(bytes),
        Err(TileError::Structural { .. })
    ));
}
