//! Error types for tile set decoding

use thiserror::Error;

/// Tile operation result type
pub type TileResult<T> = Result<T, TileError>;

/// Why a single tile could not be decoded
///
/// A failed tile does not invalidate the rest of the set.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeFailure {
    /// Tile bytes do not match the tile dimensions
    #[error("Tile needs exactly {expected} bytes, got {actual}")]
    SizeMismatch {
        /// Bytes required
        expected: usize,
        /// Bytes supplied
        actual: usize,
    },

    /// A run would write past the end of the tile
    #[error("Run of {run} bytes at input offset {offset} overflows the {remaining} bytes left")]
    Overflow {
        /// Input offset of the opcode
        offset: usize,
        /// Run length
        run: usize,
        /// Output bytes left
        remaining: usize,
    },

    /// Input ended before the tile was filled
    #[error("Input ended at offset {offset} after {written} of {expected} bytes")]
    Underflow {
        /// Input offset where data ran out
        offset: usize,
        /// Output bytes produced
        written: usize,
        /// Output bytes required
        expected: usize,
    },

    /// A long-form run declared zero length
    #[error("Zero-length run at input offset {offset}")]
    ZeroLengthRun {
        /// Input offset of the opcode
        offset: usize,
    },

    /// Slot points outside the blob
    #[error("Tile data offset {offset} is outside the {len}-byte blob")]
    OffsetOutOfRange {
        /// Absolute offset
        offset: u64,
        /// Blob length
        len: usize,
    },

    /// An earlier frame this delta frame depends on failed
    #[error("Delta base frame {frame} failed to decode")]
    BrokenDeltaChain {
        /// Index of the failed frame
        frame: usize,
    },
}

/// Errors raised by tile set operations
#[derive(Debug, Error)]
pub enum TileError {
    /// Header or slot table is inconsistent
    #[error("Structural error: {reason}")]
    Structural {
        /// What was inconsistent
        reason: String,
    },

    /// Tile index past the end of the set
    #[error("Tile {index} out of range for {count} tiles")]
    IndexOutOfRange {
        /// Requested index
        index: usize,
        /// Tiles in the set
        count: usize,
    },

    /// A tile failed to decode
    #[error("Tile {index} failed to decode: {failure}")]
    Decode {
        /// Tile index
        index: usize,
        /// Underlying failure
        failure: DecodeFailure,
    },

    /// Binary read error
    #[error("Binary format error: {0}")]
    BinRead(#[from] binrw::Error),
}

impl TileError {
    /// The decode failure, if this error wraps one
    pub fn decode_failure(&self) -> Option<&DecodeFailure> {
        match self {
            Self::Decode { failure, .. } => Some(failure),
            _ => None,
        }
    }
}
