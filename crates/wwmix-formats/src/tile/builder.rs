//! Tile set construction

use binrw::BinWrite;
use std::io::Cursor;

use super::codec;
use super::error::{TileError, TileResult};
use super::header::{EMPTY_TILE, TileEncoding, TileSetHeader};

#[derive(Debug, Clone)]
enum Pending {
    Pixels(Vec<u8>),
    Encoded(Vec<u8>),
    Empty,
}

/// Builder for tile set blobs
///
/// Slots are laid out in order directly after the slot table. Pixel tiles are
/// encoded according to the set's encoding; delta frames are XORed against
/// the previous pixel tile before run-length encoding.
#[derive(Debug, Clone)]
pub struct TileSetBuilder {
    tile_width: u16,
    tile_height: u16,
    encoding: TileEncoding,
    tiles: Vec<Pending>,
}

impl TileSetBuilder {
    /// Start an empty set
    pub fn new(tile_width: u16, tile_height: u16, encoding: TileEncoding) -> Self {
        Self {
            tile_width,
            tile_height,
            encoding,
            tiles: Vec::new(),
        }
    }

    /// Append a tile of `width * height` pixels
    #[must_use]
    pub fn tile(mut self, pixels: Vec<u8>) -> Self {
        self.tiles.push(Pending::Pixels(pixels));
        self
    }

    /// Append an empty slot
    #[must_use]
    pub fn empty(mut self) -> Self {
        self.tiles.push(Pending::Empty);
        self
    }

    /// Append already-encoded image data, stored verbatim.
    ///
    /// Encoded slots do not advance the delta base used for later pixel tiles.
    #[must_use]
    pub fn encoded(mut self, data: Vec<u8>) -> Self {
        self.tiles.push(Pending::Encoded(data));
        self
    }

    /// Number of slots added so far
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether no slots have been added
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Assemble the blob
    pub fn build(&self) -> TileResult<Vec<u8>> {
        let tile_count = u16::try_from(self.tiles.len()).map_err(|_| TileError::Structural {
            reason: format!("{} tiles exceed the 16-bit count", self.tiles.len()),
        })?;
        let size = usize::from(self.tile_width) * usize::from(self.tile_height);

        let mut slots = Vec::with_capacity(self.tiles.len());
        let mut image = Vec::new();
        let mut previous = vec![0u8; size];

        for (index, tile) in self.tiles.iter().enumerate() {
            let payload = match tile {
                Pending::Empty => {
                    slots.push(EMPTY_TILE);
                    continue;
                }
                Pending::Encoded(data) => data.clone(),
                Pending::Pixels(pixels) => {
                    if pixels.len() != size {
                        return Err(TileError::Structural {
                            reason: format!(
                                "tile {index} has {} pixels, expected {size}",
                                pixels.len()
                            ),
                        });
                    }
                    match self.encoding {
                        TileEncoding::Raw => pixels.clone(),
                        TileEncoding::Rle => codec::encode_rle(pixels),
                        TileEncoding::RleDelta => {
                            let delta: Vec<u8> =
                                pixels.iter().zip(&previous).map(|(p, b)| p ^ b).collect();
                            previous.clone_from(pixels);
                            codec::encode_rle(&delta)
                        }
                    }
                }
            };

            let offset = u32::try_from(image.len()).map_err(|_| TileError::Structural {
                reason: "image data exceeds 4 GiB".to_string(),
            })?;
            slots.push(offset);
            image.extend_from_slice(&payload);
        }

        let index_start = TileSetHeader::SIZE as u32;
        let index_end = index_start + u32::from(tile_count) * 4;
        let header = TileSetHeader {
            tile_width: self.tile_width,
            tile_height: self.tile_height,
            tile_count,
            encoding: self.encoding.as_u16(),
            image_data_start: index_end,
            index_start,
            index_end,
        };

        let mut cursor = Cursor::new(Vec::with_capacity(index_end as usize + image.len()));
        header.write(&mut cursor)?;
        let mut blob = cursor.into_inner();
        for slot in slots {
            blob.extend_from_slice(&slot.to_le_bytes());
        }
        blob.extend_from_slice(&image);
        Ok(blob)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::tile::{DecodedTile, TileSet};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_layout() {
        let blob = TileSetBuilder::new(2, 1, TileEncoding::Raw)
            .tile(vec![7, 8])
            .empty()
            .build()
            .unwrap();

        let mut expected = vec![2, 0, 1, 0, 2, 0, 0, 0];
        expected.extend_from_slice(&28u32.to_le_bytes());
        expected.extend_from_slice(&20u32.to_le_bytes());
        expected.extend_from_slice(&28u32.to_le_bytes());
        expected.extend_from_slice(&0u32.to_le_bytes());
        expected.extend_from_slice(&EMPTY_TILE.to_le_bytes());
        expected.extend_from_slice(&[7, 8]);
        assert_eq!(blob, expected);
    }

    #[test]
    fn test_wrong_pixel_count() {
        let result = TileSetBuilder::new(2, 2, TileEncoding::Rle)
            .tile(vec![0; 3])
            .build();
        assert!(matches!(result, Err(TileError::Structural { .. })));
    }

    #[test]
    fn test_delta_frames_decode_back() {
        let frames: Vec<Vec<u8>> = (0u8..4).map(|i| vec![i, i * 2, 0, 255 - i]).collect();
        let mut builder = TileSetBuilder::new(2, 2, TileEncoding::RleDelta);
        for frame in &frames {
            builder = builder.tile(frame.clone());
        }
        let set = TileSet::parse(builder.build().unwrap()).unwrap();

        let report = set.decode_all();
        let decoded: Vec<Vec<u8>> = report
            .results
            .into_iter()
            .map(|result| result.unwrap().into_pixels_or(0, 4))
            .collect();
        assert_eq!(decoded, frames);
        assert_eq!(set.decode_tile(3).unwrap(), DecodedTile::Pixels(frames[3].clone()));
    }
}
