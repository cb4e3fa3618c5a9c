//! Error types for MIX archive operations

use thiserror::Error;
use wwmix_crypto::CryptoError;

/// MIX operation result type
pub type MixResult<T> = Result<T, MixError>;

/// Errors raised while opening or reading a MIX archive
#[derive(Debug, Error)]
pub enum MixError {
    /// Header or index is inconsistent with the file
    #[error("Structural error at offset {offset}: {reason}")]
    Structural {
        /// Byte offset the problem was detected at
        offset: u64,
        /// What was inconsistent
        reason: String,
    },

    /// A decrypted header failed its plausibility checks
    #[error("Decrypted index is implausible, wrong key or modulus? {reason}")]
    CryptoFailure {
        /// What was implausible
        reason: String,
    },

    /// Requested range lies outside the data region
    #[error("Entry range {offset}+{size} exceeds the {data_size}-byte data region")]
    Bounds {
        /// Offset relative to the data region
        offset: u32,
        /// Size in bytes
        size: u32,
        /// Data region extent in bytes
        data_size: u64,
    },

    /// SHA-1 trailer does not match the data region
    #[error("Checksum mismatch: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Stored digest (hex)
        expected: String,
        /// Computed digest (hex)
        actual: String,
    },

    /// Key recovery or cipher setup failed
    #[error("Crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Binary read error
    #[error("Binary format error: {0}")]
    BinRead(#[from] binrw::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MixError {
    /// Whether this is a structural problem with the container itself
    pub fn is_structural(&self) -> bool {
        matches!(self, Self::Structural { .. } | Self::BinRead(_))
    }

    /// Whether decryption produced garbage, which points at the key
    pub fn is_crypto_failure(&self) -> bool {
        matches!(self, Self::CryptoFailure { .. })
    }

    /// Whether a resolved entry fell outside the data region
    pub fn is_bounds(&self) -> bool {
        matches!(self, Self::Bounds { .. })
    }
}
