//! Filename ids for MIX index lookups
//!
//! MIX archives do not store names. Each entry is keyed by a 32-bit id derived
//! from the uppercased filename, and two derivations exist:
//!
//! - **Classic** (Tiberian Dawn, Red Alert): the name is zero-padded to a
//!   multiple of four bytes and folded as little-endian words with
//!   `id = rotl(id, 1) + word`.
//! - **CRC32** (Tiberian Sun, Red Alert 2): the name is padded by appending the
//!   remainder `len % 4` as a byte, then repeating the first byte of the last
//!   partial word until aligned, and the result is hashed with standard
//!   CRC-32 (ISO-HDLC).
//!
//! Both were checked against the well-known id of `local mix database.dat`
//! (`0x54C2D545` classic, `0x366E051F` CRC32).

use std::fmt;
use std::str::FromStr;

use crc::{CRC_32_ISO_HDLC, Crc};

use crate::error::CryptoError;

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Filename id derivation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum IdHash {
    /// Rotate-and-add over zero-padded words
    #[default]
    Classic,
    /// CRC-32 over the remainder-padded name
    Crc32,
}

impl IdHash {
    /// Compute the id of `name`. Case-insensitive.
    pub fn id(self, name: &str) -> u32 {
        let upper = name.to_ascii_uppercase();
        match self {
            Self::Classic => classic_id(upper.as_bytes()),
            Self::Crc32 => crc32_id(upper.as_bytes()),
        }
    }
}

impl fmt::Display for IdHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Classic => f.write_str("classic"),
            Self::Crc32 => f.write_str("crc32"),
        }
    }
}

impl FromStr for IdHash {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "classic" | "td" | "ra" => Ok(Self::Classic),
            "crc32" | "ts" | "ra2" => Ok(Self::Crc32),
            other => Err(CryptoError::InvalidKeyFormat(format!(
                "unknown id hash '{other}'"
            ))),
        }
    }
}

fn classic_id(name: &[u8]) -> u32 {
    name.chunks(4).fold(0u32, |id, chunk| {
        let mut word = [0u8; 4];
        word[..chunk.len()].copy_from_slice(chunk);
        id.rotate_left(1).wrapping_add(u32::from_le_bytes(word))
    })
}

fn crc32_id(name: &[u8]) -> u32 {
    let rem = name.len() % 4;
    if rem == 0 {
        return CRC32.checksum(name);
    }

    let fill = name[name.len() - rem];
    let mut padded = Vec::with_capacity(name.len() + 4 - rem);
    padded.extend_from_slice(name);
    padded.push(rem as u8);
    padded.resize(name.len() + 4 - rem, fill);
    CRC32.checksum(&padded)
}
