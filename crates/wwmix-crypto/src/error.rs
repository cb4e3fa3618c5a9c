//! Error types for cryptographic operations

use thiserror::Error;

/// Errors that can occur during cryptographic operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Invalid key size
    #[error("Invalid key size: expected {min}..={max} bytes, got {actual}")]
    InvalidKeySize {
        /// Smallest accepted key size in bytes
        min: usize,
        /// Largest accepted key size in bytes
        max: usize,
        /// Actual key size in bytes
        actual: usize,
    },

    /// Modular arithmetic with a zero modulus
    #[error("Modulus must be non-zero")]
    ZeroModulus,

    /// Modulus too small to carry a single recovered byte per chunk
    #[error("Modulus of {bits} bits is too small for key recovery")]
    ModulusTooSmall {
        /// Bit length of the rejected modulus
        bits: usize,
    },

    /// Encrypted key blob has the wrong length
    #[error("Invalid key blob length: expected {expected}, got {actual}")]
    InvalidBlobLength {
        /// Expected blob length in bytes
        expected: usize,
        /// Actual blob length in bytes
        actual: usize,
    },

    /// Blob length is not a whole number of modulus-sized chunks
    #[error("Key blob of {blob_len} bytes does not split into {chunk_len}-byte chunks")]
    UnalignedBlob {
        /// Blob length in bytes
        blob_len: usize,
        /// Chunk length derived from the modulus
        chunk_len: usize,
    },

    /// Requested key is longer than the recovered material
    #[error("Requested {requested}-byte key but only {available} bytes are recoverable")]
    KeyTooLong {
        /// Requested key length
        requested: usize,
        /// Bytes produced by key recovery
        available: usize,
    },

    /// ECB input with a trailing partial block
    #[error("Input of {len} bytes is not a multiple of the {block_size}-byte block size")]
    PartialBlock {
        /// Input length in bytes
        len: usize,
        /// Cipher block size
        block_size: usize,
    },

    /// Invalid key format
    #[error("Invalid key format: {0}")]
    InvalidKeyFormat(String),

    /// No key registered for a title
    #[error("No public key registered for title '{0}'")]
    UnknownTitle(String),
}
