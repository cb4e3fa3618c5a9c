//! Tile set parsing and on-demand decoding

use binrw::BinRead;
use bytes::Bytes;
use std::io::Cursor;
use tracing::debug;

use super::codec::{self, Apply};
use super::error::{DecodeFailure, TileError, TileResult};
use super::header::{EMPTY_TILE, TileEncoding, TileSetHeader};

/// Outcome of decoding one slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedTile {
    /// Decoded pixels, exactly `width * height` bytes
    Pixels(Vec<u8>),
    /// Slot holds the empty sentinel
    Empty,
}

impl DecodedTile {
    /// Whether the slot was empty
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Decoded pixels, if any
    pub fn pixels(&self) -> Option<&[u8]> {
        match self {
            Self::Pixels(pixels) => Some(pixels),
            Self::Empty => None,
        }
    }

    /// Pixels, or `len` bytes of `fill` for an empty slot
    pub fn into_pixels_or(self, fill: u8, len: usize) -> Vec<u8> {
        match self {
            Self::Pixels(pixels) => pixels,
            Self::Empty => vec![fill; len],
        }
    }
}

/// Per-tile results of decoding a whole set
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TileSetReport {
    /// One result per slot, in slot order
    pub results: Vec<Result<DecodedTile, DecodeFailure>>,
}

impl TileSetReport {
    /// Tiles that decoded to pixels
    pub fn decoded(&self) -> usize {
        self.results
            .iter()
            .filter(|result| matches!(result, Ok(DecodedTile::Pixels(_))))
            .count()
    }

    /// Empty slots
    pub fn empty(&self) -> usize {
        self.results
            .iter()
            .filter(|result| matches!(result, Ok(DecodedTile::Empty)))
            .count()
    }

    /// Tiles that failed
    pub fn failed(&self) -> usize {
        self.results.iter().filter(|result| result.is_err()).count()
    }

    /// Whether every slot decoded or was empty
    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }

    /// Failed tiles with their index
    pub fn failures(&self) -> impl Iterator<Item = (usize, &DecodeFailure)> {
        self.results
            .iter()
            .enumerate()
            .filter_map(|(index, result)| result.as_ref().err().map(|failure| (index, failure)))
    }
}

/// A parsed tile set
///
/// Only the header and slot table are parsed up front; tiles are decoded when
/// asked for. The set is immutable and can be shared across threads.
#[derive(Debug, Clone)]
pub struct TileSet {
    header: TileSetHeader,
    encoding: TileEncoding,
    slots: Vec<u32>,
    // non-empty slot offsets, sorted and deduplicated, for RLE extents
    starts: Vec<u32>,
    data: Bytes,
}

impl TileSet {
    /// Parse the header and slot table
    pub fn parse(data: impl Into<Bytes>) -> TileResult<Self> {
        let data = data.into();
        if data.len() < TileSetHeader::SIZE {
            return Err(TileError::Structural {
                reason: format!("{} bytes is too short for a tile set header", data.len()),
            });
        }

        let header = TileSetHeader::read(&mut Cursor::new(data.as_ref()))?;
        let encoding = TileEncoding::from_u16(header.encoding)?;

        if header.tile_size() == 0 {
            return Err(TileError::Structural {
                reason: format!(
                    "zero tile dimensions {}x{}",
                    header.tile_width, header.tile_height
                ),
            });
        }

        let count = usize::from(header.tile_count);
        let (start, end) = (header.index_start as usize, header.index_end as usize);
        if start < TileSetHeader::SIZE {
            return Err(TileError::Structural {
                reason: format!("slot table at {start} overlaps the header"),
            });
        }
        if end < start || end - start != count * 4 {
            return Err(TileError::Structural {
                reason: format!(
                    "slot table {start}..{end} does not hold {count} four-byte slots"
                ),
            });
        }
        if end > data.len() {
            return Err(TileError::Structural {
                reason: format!("slot table ends at {end} past the {}-byte blob", data.len()),
            });
        }
        if header.image_data_start as usize > data.len() {
            return Err(TileError::Structural {
                reason: format!(
                    "image data starts at {} past the {}-byte blob",
                    header.image_data_start,
                    data.len()
                ),
            });
        }

        let slots: Vec<u32> = data[start..end]
            .chunks_exact(4)
            .map(|slot| u32::from_le_bytes([slot[0], slot[1], slot[2], slot[3]]))
            .collect();

        let mut starts: Vec<u32> = slots.iter().copied().filter(|&s| s != EMPTY_TILE).collect();
        starts.sort_unstable();
        starts.dedup();

        debug!(
            "Tile set: {count} {}x{} tiles, {encoding:?}",
            header.tile_width, header.tile_height
        );

        Ok(Self {
            header,
            encoding,
            slots,
            starts,
            data,
        })
    }

    /// Parsed header
    pub fn header(&self) -> &TileSetHeader {
        &self.header
    }

    /// Tile width in pixels
    pub fn tile_width(&self) -> u16 {
        self.header.tile_width
    }

    /// Tile height in pixels
    pub fn tile_height(&self) -> u16 {
        self.header.tile_height
    }

    /// Bytes in one decoded tile
    pub fn tile_size(&self) -> usize {
        self.header.tile_size()
    }

    /// Number of slots
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the set has no slots
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Image data encoding
    pub fn encoding(&self) -> TileEncoding {
        self.encoding
    }

    /// Slot value for a tile
    pub fn slot(&self, index: usize) -> TileResult<u32> {
        self.slots
            .get(index)
            .copied()
            .ok_or(TileError::IndexOutOfRange {
                index,
                count: self.slots.len(),
            })
    }

    /// Whether a slot holds the empty sentinel
    pub fn is_empty_tile(&self, index: usize) -> TileResult<bool> {
        Ok(self.slot(index)? == EMPTY_TILE)
    }

    /// Decode one tile
    ///
    /// Delta frames are rebuilt from the start of the set, since each one
    /// depends on every earlier non-empty frame.
    pub fn decode_tile(&self, index: usize) -> TileResult<DecodedTile> {
        let slot = self.slot(index)?;
        if slot == EMPTY_TILE {
            return Ok(DecodedTile::Empty);
        }

        let decoded = match self.encoding {
            TileEncoding::Raw | TileEncoding::Rle => self.decode_frame(slot, None),
            TileEncoding::RleDelta => {
                let mut base = vec![0u8; self.tile_size()];
                for (frame, &prior) in self.slots[..index].iter().enumerate() {
                    if prior == EMPTY_TILE {
                        continue;
                    }
                    base = self
                        .decode_frame(prior, Some(base))
                        .map_err(|_| TileError::Decode {
                            index,
                            failure: DecodeFailure::BrokenDeltaChain { frame },
                        })?;
                }
                self.decode_frame(slot, Some(base))
            }
        };

        decoded
            .map(DecodedTile::Pixels)
            .map_err(|failure| TileError::Decode { index, failure })
    }

    /// Decode one delta frame over a caller-supplied base
    ///
    /// For non-delta encodings `previous` is ignored.
    pub fn decode_delta(&self, index: usize, previous: &[u8]) -> TileResult<DecodedTile> {
        let slot = self.slot(index)?;
        if slot == EMPTY_TILE {
            return Ok(DecodedTile::Empty);
        }
        if self.encoding != TileEncoding::RleDelta {
            return self.decode_tile(index);
        }
        if previous.len() != self.tile_size() {
            return Err(TileError::Decode {
                index,
                failure: DecodeFailure::SizeMismatch {
                    expected: self.tile_size(),
                    actual: previous.len(),
                },
            });
        }

        self.decode_frame(slot, Some(previous.to_vec()))
            .map(DecodedTile::Pixels)
            .map_err(|failure| TileError::Decode { index, failure })
    }

    /// Decode every slot without stopping at failures
    pub fn decode_all(&self) -> TileSetReport {
        let mut results = Vec::with_capacity(self.slots.len());
        let mut base = Ok(vec![0u8; self.tile_size()]);

        for &slot in &self.slots {
            if slot == EMPTY_TILE {
                results.push(Ok(DecodedTile::Empty));
                continue;
            }

            let result = match self.encoding {
                TileEncoding::Raw | TileEncoding::Rle => self.decode_frame(slot, None),
                TileEncoding::RleDelta => match &base {
                    Ok(previous) => {
                        let frame = self.decode_frame(slot, Some(previous.clone()));
                        base = match &frame {
                            Ok(pixels) => Ok(pixels.clone()),
                            Err(_) => Err(results.len()),
                        };
                        frame
                    }
                    Err(frame) => Err(DecodeFailure::BrokenDeltaChain { frame: *frame }),
                },
            };
            results.push(result.map(DecodedTile::Pixels));
        }

        let report = TileSetReport { results };
        debug!(
            "Decoded tile set: {} decoded, {} empty, {} failed",
            report.decoded(),
            report.empty(),
            report.failed()
        );
        report
    }

    /// Compressed bytes of a non-empty slot, up to the next tile's start
    fn extent(&self, slot: u32) -> Result<&[u8], DecodeFailure> {
        let start = u64::from(self.header.image_data_start) + u64::from(slot);
        if start > self.data.len() as u64 {
            return Err(DecodeFailure::OffsetOutOfRange {
                offset: start,
                len: self.data.len(),
            });
        }

        let next = self.starts.partition_point(|&s| s <= slot);
        let end = self.starts.get(next).map_or(self.data.len(), |&s| {
            (self.header.image_data_start as usize + s as usize).min(self.data.len())
        });
        Ok(&self.data[start as usize..end])
    }

    /// Decode the frame at `slot`, XORing over `base` when one is given
    fn decode_frame(&self, slot: u32, base: Option<Vec<u8>>) -> Result<Vec<u8>, DecodeFailure> {
        let src = self.extent(slot)?;
        let size = self.tile_size();
        match (self.encoding, base) {
            (TileEncoding::Raw, _) => codec::decode_raw(src, size),
            (_, Some(mut pixels)) => {
                codec::decode_rle(src, &mut pixels, Apply::Xor)?;
                Ok(pixels)
            }
            (_, None) => {
                let mut pixels = vec![0u8; size];
                codec::decode_rle(src, &mut pixels, Apply::Overwrite)?;
                Ok(pixels)
            }
        }
    }
}
