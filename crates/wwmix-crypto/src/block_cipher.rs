//! 64-bit block ciphers for MIX header decryption
//!
//! Only the header and index of a MIX file are encrypted, always in ECB mode:
//! every 8-byte block is transformed on its own with no chaining state and no
//! IV. The bulk data region stays in the clear.
//!
//! ## Usage
//!
//! ```rust
//! use wwmix_crypto::block_cipher::{HeaderCipher, WestwoodBlowfish};
//!
//! let cipher = WestwoodBlowfish::from_key(b"secret key").expect("valid key length");
//!
//! let mut data = *b"sixteen byte msg";
//! cipher.encrypt_ecb(&mut data).expect("whole blocks");
//! cipher.decrypt_ecb(&mut data).expect("whole blocks");
//! assert_eq!(&data, b"sixteen byte msg");
//! ```

use std::fmt;

use blowfish::Blowfish;
use cipher::generic_array::GenericArray;
use cipher::{BlockDecrypt, BlockEncrypt, KeyInit};

use crate::error::CryptoError;

/// Cipher block size in bytes
pub const BLOCK_SIZE: usize = 8;

/// A 64-bit block cipher keyed from recovered key material
pub trait HeaderCipher: Sized {
    /// Expand a key schedule from raw key bytes
    fn from_key(key: &[u8]) -> Result<Self, CryptoError>;

    /// Decrypt one block in place
    fn decrypt_block(&self, block: &mut [u8; BLOCK_SIZE]);

    /// Encrypt one block in place
    fn encrypt_block(&self, block: &mut [u8; BLOCK_SIZE]);

    /// Decrypt whole blocks in place.
    ///
    /// Input with a trailing partial block is rejected before any byte is
    /// touched.
    fn decrypt_ecb(&self, data: &mut [u8]) -> Result<(), CryptoError> {
        let (blocks, rest) = data.as_chunks_mut::<BLOCK_SIZE>();
        if !rest.is_empty() {
            return Err(partial_block(blocks.len() * BLOCK_SIZE + rest.len()));
        }
        for block in blocks {
            self.decrypt_block(block);
        }
        Ok(())
    }

    /// Encrypt whole blocks in place
    fn encrypt_ecb(&self, data: &mut [u8]) -> Result<(), CryptoError> {
        let (blocks, rest) = data.as_chunks_mut::<BLOCK_SIZE>();
        if !rest.is_empty() {
            return Err(partial_block(blocks.len() * BLOCK_SIZE + rest.len()));
        }
        for block in blocks {
            self.encrypt_block(block);
        }
        Ok(())
    }
}

fn partial_block(len: usize) -> CryptoError {
    CryptoError::PartialBlock {
        len,
        block_size: BLOCK_SIZE,
    }
}

/// Blowfish as used by Westwood: standard big-endian Blowfish, 4..=56 byte keys
#[derive(Clone)]
pub struct WestwoodBlowfish {
    inner: Blowfish,
}

impl WestwoodBlowfish {
    /// Smallest accepted key
    pub const MIN_KEY_SIZE: usize = 4;
    /// Largest accepted key
    pub const MAX_KEY_SIZE: usize = 56;
}

impl HeaderCipher for WestwoodBlowfish {
    fn from_key(key: &[u8]) -> Result<Self, CryptoError> {
        let inner = Blowfish::new_from_slice(key).map_err(|_| CryptoError::InvalidKeySize {
            min: Self::MIN_KEY_SIZE,
            max: Self::MAX_KEY_SIZE,
            actual: key.len(),
        })?;
        Ok(Self { inner })
    }

    fn decrypt_block(&self, block: &mut [u8; BLOCK_SIZE]) {
        self.inner
            .decrypt_block(GenericArray::from_mut_slice(block.as_mut_slice()));
    }

    fn encrypt_block(&self, block: &mut [u8; BLOCK_SIZE]) {
        self.inner
            .encrypt_block(GenericArray::from_mut_slice(block.as_mut_slice()));
    }
}

impl fmt::Debug for WestwoodBlowfish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WestwoodBlowfish").finish_non_exhaustive()
    }
}

/// Pass-through cipher.
///
/// Accepts any key and leaves blocks untouched, which lets the encrypted
/// header pipeline run against plaintext fixtures.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityCipher;

impl HeaderCipher for IdentityCipher {
    fn from_key(_key: &[u8]) -> Result<Self, CryptoError> {
        Ok(Self)
    }

    fn decrypt_block(&self, _block: &mut [u8; BLOCK_SIZE]) {}

    fn encrypt_block(&self, _block: &mut [u8; BLOCK_SIZE]) {}
}
