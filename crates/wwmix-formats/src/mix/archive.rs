//! In-memory MIX archive

use bytes::Bytes;
use sha1::{Digest, Sha1};
use std::io::Cursor;
use std::path::Path;
use tracing::debug;
use wwmix_crypto::{HeaderCipher, WestwoodBlowfish};

use super::entry::{EntryLocation, IndexEntry};
use super::error::{MixError, MixResult};
use super::header::MixHeader;
use super::index::MixIndex;
use super::local_db::{LOCAL_DATABASE_NAME, LocalDatabase};
use super::options::OpenOptions;

/// MIX archive backed by an immutable buffer
///
/// Entry reads are zero-copy slices of the backing buffer. The archive is
/// never modified after opening and can be shared across threads.
#[derive(Debug, Clone)]
pub struct MixArchive {
    index: MixIndex,
    data: Bytes,
}

impl MixArchive {
    /// Open an archive, decrypting the header with Blowfish if needed
    pub fn open(data: impl Into<Bytes>, options: &OpenOptions) -> MixResult<Self> {
        Self::open_with::<WestwoodBlowfish>(data, options)
    }

    /// Open an archive with a specific header cipher
    pub fn open_with<C: HeaderCipher>(
        data: impl Into<Bytes>,
        options: &OpenOptions,
    ) -> MixResult<Self> {
        let data = data.into();
        let index = MixIndex::read_with::<_, C>(&mut Cursor::new(data.as_ref()), options)?;
        debug!(
            "Opened MIX archive: {} entries, data region {}+{}",
            index.len(),
            index.data_start(),
            index.data_size()
        );
        Ok(Self { index, data })
    }

    /// Read a file from disk and open it
    pub fn open_path(path: impl AsRef<Path>, options: &OpenOptions) -> MixResult<Self> {
        let data = std::fs::read(path)?;
        Self::open(data, options)
    }

    /// Parsed header and index
    pub fn index(&self) -> &MixIndex {
        &self.index
    }

    /// Header variant and values
    pub fn header(&self) -> &MixHeader {
        self.index.header()
    }

    /// Entries sorted by unsigned id
    pub fn entries(&self) -> &[IndexEntry] {
        self.index.entries()
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the archive has no entries
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Find an entry by filename (case-insensitive)
    pub fn lookup_by_name(&self, name: &str) -> Option<EntryLocation> {
        self.index.lookup_by_name(name)
    }

    /// Find an entry by precomputed id
    pub fn lookup_by_id(&self, id: u32) -> Option<EntryLocation> {
        self.index.lookup_by_id(id)
    }

    /// Bytes of a data-region span, bounds checked against the data extent
    pub fn read_entry(&self, offset: u32, size: u32) -> MixResult<Bytes> {
        let range = self.index.file_range(offset, size)?;
        Ok(self.data.slice(range.start as usize..range.end as usize))
    }

    /// Bytes of a resolved entry
    pub fn read_location(&self, location: EntryLocation) -> MixResult<Bytes> {
        self.read_entry(location.offset, location.size)
    }

    /// Look up and read a file by name
    pub fn read_file(&self, name: &str) -> MixResult<Option<Bytes>> {
        self.lookup_by_name(name)
            .map(|location| self.read_location(location))
            .transpose()
    }

    /// The whole data region
    pub fn data_region(&self) -> Bytes {
        let start = self.index.data_start() as usize;
        self.data
            .slice(start..start + self.index.data_size() as usize)
    }

    /// Verify the SHA-1 trailer against the bytes it covers.
    ///
    /// The digest covers everything between the start of the data region and
    /// the trailer. Returns `Ok(false)` when the archive carries no checksum.
    pub fn verify_checksum(&self) -> MixResult<bool> {
        let Some(trailer) = self.index.checksum_range() else {
            return Ok(false);
        };
        let covered = &self.data[self.index.data_start() as usize..trailer.start as usize];
        let stored = &self.data[trailer.start as usize..trailer.end as usize];

        let computed = Sha1::digest(covered);
        if computed.as_slice() != stored {
            return Err(MixError::ChecksumMismatch {
                expected: hex::encode(stored),
                actual: hex::encode(computed),
            });
        }
        Ok(true)
    }

    /// Parse the embedded local mix database, if the archive has one
    pub fn local_database(&self) -> MixResult<Option<LocalDatabase>> {
        self.read_file(LOCAL_DATABASE_NAME)?
            .map(|data| LocalDatabase::parse(&data))
            .transpose()
    }

    /// Names from the local mix database that resolve in this archive
    pub fn named_entries(&self) -> MixResult<Vec<(String, EntryLocation)>> {
        let Some(database) = self.local_database()? else {
            return Ok(Vec::new());
        };
        Ok(database
            .names()
            .iter()
            .filter_map(|name| {
                self.lookup_by_name(name)
                    .map(|location| (name.clone(), location))
            })
            .collect())
    }
}
