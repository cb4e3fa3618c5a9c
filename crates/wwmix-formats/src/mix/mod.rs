//! Westwood MIX archive index
//!
//! MIX archives are flat containers keyed by 32-bit filename ids. This module
//! detects the header variant, decrypts the header and index when needed,
//! sorts the table by unsigned id and resolves names to byte ranges in the
//! data region.
//!
//! # Example
//!
//! ```
//! use wwmix_formats::mix::{MixArchive, OpenOptions};
//!
//! // legacy archive: two 12-byte entries with ids 1 and 2
//! let mut bytes = vec![2, 0, 24, 0, 0, 0];
//! for (id, offset) in [(1u32, 0u32), (2, 12)] {
//!     bytes.extend_from_slice(&id.to_le_bytes());
//!     bytes.extend_from_slice(&offset.to_le_bytes());
//!     bytes.extend_from_slice(&12u32.to_le_bytes());
//! }
//! bytes.extend_from_slice(&[0u8; 24]);
//!
//! let archive = MixArchive::open(bytes, &OpenOptions::default())?;
//! let location = archive.lookup_by_id(2).expect("entry present");
//! assert_eq!((location.offset, location.size), (12, 12));
//! assert_eq!(archive.read_entry(location.offset, location.size)?.len(), 12);
//! # Ok::<(), wwmix_formats::mix::MixError>(())
//! ```

mod archive;
mod entry;
mod error;
mod header;
mod index;
mod local_db;
mod options;
mod reader;

pub use archive::MixArchive;
pub use entry::{EntryLocation, IndexEntry};
pub use error::{MixError, MixResult};
pub use header::{FileHeader, MixFlags, MixHeader, detect_flags};
pub use index::MixIndex;
pub use local_db::{LOCAL_DATABASE_NAME, LocalDatabase, XCC_SIGNATURE};
pub use options::{DEFAULT_MAX_ENTRIES, OpenOptions};
pub use reader::MixReader;

/// Size of one index entry in bytes
pub const ENTRY_SIZE: usize = 12;

/// Size of the SHA-1 trailer in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Zero sentinel plus flags word
pub const FLAGGED_PREFIX_SIZE: usize = 4;
