//! MIX header variants
//!
//! A MIX file starts either with a plain header (legacy, Tiberian Dawn) or
//! with a zero word followed by a flags word (Red Alert and later). Nothing
//! else marks the format; a zero first word is the only discriminator.

use binrw::{BinRead, BinWrite};
use std::fmt;

/// Flags word of a flagged header
#[derive(BinRead, BinWrite, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[brw(little)]
pub struct MixFlags(pub u16);

impl MixFlags {
    /// SHA-1 trailer present (bit 0)
    pub const CHECKSUM: u16 = 0x0001;

    /// Header and index encrypted (bit 1)
    pub const ENCRYPTED: u16 = 0x0002;

    /// Create new flags
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Raw value
    pub const fn value(&self) -> u16 {
        self.0
    }

    /// Check if a flag is set
    pub const fn has(&self, flag: u16) -> bool {
        (self.0 & flag) != 0
    }

    /// SHA-1 trailer present
    pub const fn has_checksum(&self) -> bool {
        self.has(Self::CHECKSUM)
    }

    /// Header and index encrypted
    pub const fn is_encrypted(&self) -> bool {
        self.has(Self::ENCRYPTED)
    }
}

impl fmt::Display for MixFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04x}", self.0)
    }
}

/// Entry count and data size, the body of both header variants
#[derive(BinRead, BinWrite, Debug, Clone, Copy, PartialEq, Eq)]
#[brw(little)]
pub struct FileHeader {
    /// Number of index entries (stored signed, always read unsigned)
    pub entry_count: u16,
    /// Size of the data region in bytes
    pub data_size: i32,
}

impl FileHeader {
    /// Encoded size in bytes
    pub const SIZE: usize = 6;

    /// Size of the index table that follows the header
    pub fn index_size(&self) -> usize {
        usize::from(self.entry_count) * super::ENTRY_SIZE
    }
}

/// Header variant, resolved once when the archive is opened
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MixHeader {
    /// Plain header at offset 0
    Legacy(FileHeader),
    /// Zero sentinel, flags word, then the header (possibly encrypted)
    Flagged {
        /// Flags word at offset 2
        flags: MixFlags,
        /// Header proper, after decryption if it was encrypted
        header: FileHeader,
    },
}

impl MixHeader {
    /// The entry count / data size pair
    pub fn file_header(&self) -> &FileHeader {
        match self {
            Self::Legacy(header) | Self::Flagged { header, .. } => header,
        }
    }

    /// Flags word (empty for legacy headers)
    pub fn flags(&self) -> MixFlags {
        match self {
            Self::Legacy(_) => MixFlags::default(),
            Self::Flagged { flags, .. } => *flags,
        }
    }

    /// Number of index entries
    pub fn entry_count(&self) -> usize {
        usize::from(self.file_header().entry_count)
    }

    /// Declared data region size
    pub fn data_size(&self) -> i32 {
        self.file_header().data_size
    }

    /// Whether the header was encrypted on disk
    pub fn is_encrypted(&self) -> bool {
        self.flags().is_encrypted()
    }

    /// Whether a SHA-1 trailer follows the data region
    pub fn has_checksum(&self) -> bool {
        self.flags().has_checksum()
    }

    /// Whether this is the legacy layout
    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy(_))
    }
}

/// Flags word of a flagged header, or `None` for the legacy layout
pub fn detect_flags(prefix: [u8; 4]) -> Option<MixFlags> {
    if prefix[0] == 0 && prefix[1] == 0 {
        Some(MixFlags(u16::from_le_bytes([prefix[2], prefix[3]])))
    } else {
        None
    }
}
