//! Cryptographic primitives for Westwood MIX containers
//!
//! This crate provides the pieces needed to read an encrypted MIX header:
//! recovering the symmetric key from the embedded key blob, decrypting the
//! header and index blocks, and computing the filename ids used by the index.
//!
//! # Components
//!
//! - **Big integers**: [`FixedUint`], fixed-width modular arithmetic
//! - **Key recovery**: [`KeyRecovery`] and [`PublicKey`], blob to Blowfish key
//! - **Block ciphers**: [`HeaderCipher`] with [`WestwoodBlowfish`] and
//!   [`IdentityCipher`]
//! - **Hashing**: [`IdHash`] classic and CRC32 filename ids
//! - **Key management**: [`KeyTable`] of per-title parameters
//!
//! # Examples
//!
//! ## Recovering a header key
//!
//! ```
//! use wwmix_crypto::{HeaderCipher, KeyRecovery, WestwoodBlowfish};
//!
//! let blob = [0u8; 80]; // taken from the container header
//! let key = KeyRecovery::westwood().recover(&blob)?;
//! let cipher = WestwoodBlowfish::from_key(&key)?;
//!
//! let mut block = [0u8; 8];
//! cipher.decrypt_block(&mut block);
//! # Ok::<(), wwmix_crypto::CryptoError>(())
//! ```
//!
//! ## Filename ids
//!
//! ```
//! use wwmix_crypto::IdHash;
//!
//! assert_eq!(IdHash::Classic.id("local mix database.dat"), 0x54C2_D545);
//! assert_eq!(IdHash::Crc32.id("local mix database.dat"), 0x366E_051F);
//! ```

#![warn(missing_docs)]

pub mod bigint;
pub mod block_cipher;
pub mod error;
pub mod hash;
pub mod key_recovery;
pub mod keys;

pub use error::CryptoError;

// Re-export commonly used types
pub use bigint::FixedUint;
pub use block_cipher::{BLOCK_SIZE, HeaderCipher, IdentityCipher, WestwoodBlowfish};
pub use hash::IdHash;
pub use key_recovery::{BLOWFISH_KEY_SIZE, KEY_BLOB_SIZE, KeyRecovery, PublicKey};
pub use keys::KeyTable;
