//! Recovery of the symmetric header key from an encrypted key blob
//!
//! Encrypted MIX headers carry a blob that was produced with the private half
//! of a fixed public key. Raising each blob chunk to the public exponent
//! modulo the public modulus yields the Blowfish key.
//!
//! ## Chunking
//!
//! For a modulus of `b` significant bits the blob is consumed in chunks of
//! `(b - 2) / 8 + 1` little-endian bytes. Each chunk is decrypted on its own
//! and contributes its low-order `chunk - 1` bytes; the rest of the recovered
//! integer is discarded. With the Westwood parameters (319-bit modulus,
//! 80-byte blob) that is two 40-byte chunks producing 78 bytes, of which the
//! first 56 form the Blowfish key.
//!
//! A wrong modulus or exponent does not fail here. It yields a garbage key and
//! is caught when the decrypted header fails its plausibility checks.

use crate::bigint::FixedUint;
use crate::error::CryptoError;

/// Big-endian modulus shared by every Westwood title that encrypts MIX headers
pub const WESTWOOD_MODULUS: [u8; 40] = [
    0x51, 0xBC, 0xDA, 0x08, 0x6D, 0x39, 0xFC, 0xE4, //
    0x56, 0x51, 0x60, 0xD6, 0x51, 0x71, 0x3F, 0xA2, //
    0xE8, 0xAA, 0x54, 0xFA, 0x66, 0x82, 0xB0, 0x4A, //
    0xAB, 0xDD, 0x0E, 0x6A, 0xF8, 0xB0, 0xC1, 0xE6, //
    0xD1, 0xFB, 0x4F, 0x3D, 0xAA, 0x43, 0x7F, 0x15, //
];

/// Public exponent paired with [`WESTWOOD_MODULUS`]
pub const WESTWOOD_EXPONENT: u32 = 0x10001;

/// Size of the encrypted key blob in a MIX header
pub const KEY_BLOB_SIZE: usize = 80;

/// Length of the recovered Blowfish key
pub const BLOWFISH_KEY_SIZE: usize = 56;

/// Public modulus and exponent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    modulus: FixedUint,
    exponent: FixedUint,
}

impl PublicKey {
    /// Build from a big-endian modulus and a small exponent.
    ///
    /// The integer width follows the modulus length, so 40 bytes give the
    /// 320-bit arithmetic used by the Westwood titles.
    pub fn from_be_bytes(modulus: &[u8], exponent: u32) -> Result<Self, CryptoError> {
        let modulus = FixedUint::from_be_bytes(modulus, modulus.len() * 8);
        if modulus.is_zero() {
            return Err(CryptoError::ZeroModulus);
        }
        Ok(Self {
            modulus,
            exponent: FixedUint::from_u32(exponent, 32),
        })
    }

    /// Build from a hex-encoded big-endian modulus
    pub fn from_hex(modulus: &str, exponent: u32) -> Result<Self, CryptoError> {
        let bytes = hex::decode(modulus.trim())
            .map_err(|e| CryptoError::InvalidKeyFormat(format!("invalid hex modulus: {e}")))?;
        Self::from_be_bytes(&bytes, exponent)
    }

    /// The key shipped with Red Alert, Tiberian Sun and Red Alert 2
    pub fn westwood() -> Self {
        Self {
            modulus: FixedUint::from_be_bytes(&WESTWOOD_MODULUS, WESTWOOD_MODULUS.len() * 8),
            exponent: FixedUint::from_u32(WESTWOOD_EXPONENT, 32),
        }
    }

    /// Public modulus
    pub fn modulus(&self) -> &FixedUint {
        &self.modulus
    }

    /// Public exponent
    pub fn exponent(&self) -> &FixedUint {
        &self.exponent
    }

    /// `value ^ exponent mod modulus`
    pub fn apply(&self, value: &FixedUint) -> Result<FixedUint, CryptoError> {
        FixedUint::pow_mod(value, &self.exponent, &self.modulus)
    }
}

/// Key recovery parameters for one container variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyRecovery {
    public_key: PublicKey,
    blob_len: usize,
    key_len: usize,
    chunk_len: usize,
}

impl KeyRecovery {
    /// Validate and build recovery parameters
    pub fn new(public_key: PublicKey, blob_len: usize, key_len: usize) -> Result<Self, CryptoError> {
        let bits = public_key.modulus().bit_len();
        if bits < 10 {
            return Err(CryptoError::ModulusTooSmall { bits });
        }
        let chunk_len = (bits - 2) / 8 + 1;

        if blob_len == 0 || blob_len % chunk_len != 0 {
            return Err(CryptoError::UnalignedBlob {
                blob_len,
                chunk_len,
            });
        }

        let available = blob_len / chunk_len * (chunk_len - 1);
        if key_len == 0 || key_len > available {
            return Err(CryptoError::KeyTooLong {
                requested: key_len,
                available,
            });
        }

        Ok(Self {
            public_key,
            blob_len,
            key_len,
            chunk_len,
        })
    }

    /// Westwood parameters: 80-byte blob, 56-byte Blowfish key
    pub fn westwood() -> Self {
        Self {
            public_key: PublicKey::westwood(),
            blob_len: KEY_BLOB_SIZE,
            key_len: BLOWFISH_KEY_SIZE,
            chunk_len: 40,
        }
    }

    /// Public key used for recovery
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Expected blob length in bytes
    pub fn blob_len(&self) -> usize {
        self.blob_len
    }

    /// Length of the recovered key in bytes
    pub fn key_len(&self) -> usize {
        self.key_len
    }

    /// Bytes consumed per decrypted chunk
    pub fn chunk_len(&self) -> usize {
        self.chunk_len
    }

    /// Recover the symmetric key from an encrypted blob
    pub fn recover(&self, blob: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if blob.len() != self.blob_len {
            return Err(CryptoError::InvalidBlobLength {
                expected: self.blob_len,
                actual: blob.len(),
            });
        }

        let width = self.public_key.modulus().width_bits();
        let out_len = self.chunk_len - 1;
        let mut material = Vec::with_capacity(blob.len() / self.chunk_len * out_len);

        for chunk in blob.chunks_exact(self.chunk_len) {
            let cipher = FixedUint::from_le_bytes(chunk, width);
            let plain = self.public_key.apply(&cipher)?;
            material.extend_from_slice(&plain.to_le_bytes(out_len));
        }

        material.truncate(self.key_len);
        Ok(material)
    }
}

impl Default for KeyRecovery {
    fn default() -> Self {
        Self::westwood()
    }
}
