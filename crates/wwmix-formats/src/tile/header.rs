//! Tile set header

use binrw::{BinRead, BinWrite};

use super::error::{TileError, TileResult};

/// Slot value marking a tile with no image data
pub const EMPTY_TILE: u32 = 0xFFFF_FFFF;

/// How tile image data is stored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileEncoding {
    /// `width * height` bytes per tile
    Raw,
    /// Run-length encoded
    Rle,
    /// Run-length encoded, each frame XORed over the previous one
    RleDelta,
}

impl TileEncoding {
    /// Parse the header value
    pub fn from_u16(value: u16) -> TileResult<Self> {
        match value {
            0 => Ok(Self::Raw),
            1 => Ok(Self::Rle),
            2 => Ok(Self::RleDelta),
            other => Err(TileError::Structural {
                reason: format!("unknown tile encoding {other}"),
            }),
        }
    }

    /// Header value
    pub const fn as_u16(self) -> u16 {
        match self {
            Self::Raw => 0,
            Self::Rle => 1,
            Self::RleDelta => 2,
        }
    }
}

/// 20-byte tile set header
#[derive(BinRead, BinWrite, Debug, Clone, Copy, PartialEq, Eq)]
#[brw(little)]
pub struct TileSetHeader {
    /// Tile width in pixels
    pub tile_width: u16,
    /// Tile height in pixels
    pub tile_height: u16,
    /// Number of slots
    pub tile_count: u16,
    /// Raw encoding value, see [`TileEncoding`]
    pub encoding: u16,
    /// Start of image data; slots are relative to it
    pub image_data_start: u32,
    /// Start of the slot table
    pub index_start: u32,
    /// End of the slot table
    pub index_end: u32,
}

impl TileSetHeader {
    /// Encoded size in bytes
    pub const SIZE: usize = 20;

    /// Bytes in one decoded tile
    pub fn tile_size(&self) -> usize {
        usize::from(self.tile_width) * usize::from(self.tile_height)
    }
}
