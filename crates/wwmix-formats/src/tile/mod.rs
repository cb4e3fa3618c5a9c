//! Tile set decoding
//!
//! A tile set is a blob of fixed-size image tiles (map tiles or animation
//! frames) behind a small header and a slot table. Each slot holds the offset
//! of its tile relative to the image data, or [`EMPTY_TILE`] when the tile
//! has no image. Tiles are stored raw, run-length encoded, or run-length
//! encoded as XOR deltas against the previous frame.
//!
//! Empty slots and failed tiles are reported per tile; neither stops the
//! rest of the set from decoding.
//!
//! ```text
//! [header 20][slots u32 * count][image data]
//! ```
//!
//! # Example
//!
//! ```
//! use wwmix_formats::tile::{DecodedTile, TileEncoding, TileSet, TileSetBuilder};
//!
//! let blob = TileSetBuilder::new(2, 2, TileEncoding::Rle)
//!     .tile(vec![3, 3, 3, 3])
//!     .empty()
//!     .build()?;
//!
//! let set = TileSet::parse(blob)?;
//! assert_eq!(set.decode_tile(0)?, DecodedTile::Pixels(vec![3, 3, 3, 3]));
//! assert_eq!(set.decode_tile(1)?.into_pixels_or(0, set.tile_size()), vec![0; 4]);
//! # Ok::<(), wwmix_formats::tile::TileError>(())
//! ```

mod builder;
pub mod codec;
mod error;
mod header;
mod set;

pub use builder::TileSetBuilder;
pub use error::{DecodeFailure, TileError, TileResult};
pub use header::{EMPTY_TILE, TileEncoding, TileSetHeader};
pub use set::{DecodedTile, TileSet, TileSetReport};
