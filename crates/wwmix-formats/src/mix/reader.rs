//! MIX archive over a seekable reader

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use wwmix_crypto::{HeaderCipher, WestwoodBlowfish};

use super::entry::EntryLocation;
use super::error::MixResult;
use super::index::MixIndex;
use super::options::OpenOptions;

/// MIX archive that reads entries on demand
///
/// Only the header and index are held in memory. Reads seek the underlying
/// reader, so they take `&mut self`.
#[derive(Debug)]
pub struct MixReader<R> {
    inner: R,
    index: MixIndex,
}

impl MixReader<BufReader<File>> {
    /// Open an archive file on disk
    pub fn open_path(path: impl AsRef<Path>, options: &OpenOptions) -> MixResult<Self> {
        let file = File::open(path)?;
        Self::open(BufReader::new(file), options)
    }
}

impl<R: Read + Seek> MixReader<R> {
    /// Parse the index, decrypting with Blowfish if needed
    pub fn open(inner: R, options: &OpenOptions) -> MixResult<Self> {
        Self::open_with::<WestwoodBlowfish>(inner, options)
    }

    /// Parse the index with a specific header cipher
    pub fn open_with<C: HeaderCipher>(mut inner: R, options: &OpenOptions) -> MixResult<Self> {
        let index = MixIndex::read_with::<_, C>(&mut inner, options)?;
        Ok(Self { inner, index })
    }

    /// Parsed header and index
    pub fn index(&self) -> &MixIndex {
        &self.index
    }

    /// Find an entry by filename (case-insensitive)
    pub fn lookup_by_name(&self, name: &str) -> Option<EntryLocation> {
        self.index.lookup_by_name(name)
    }

    /// Find an entry by precomputed id
    pub fn lookup_by_id(&self, id: u32) -> Option<EntryLocation> {
        self.index.lookup_by_id(id)
    }

    /// Read a data-region span, bounds checked against the data extent
    pub fn read_entry(&mut self, offset: u32, size: u32) -> MixResult<Vec<u8>> {
        let range = self.index.file_range(offset, size)?;
        self.inner.seek(SeekFrom::Start(range.start))?;
        let mut buf = vec![0u8; size as usize];
        self.inner.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Look up and read a file by name
    pub fn read_file(&mut self, name: &str) -> MixResult<Option<Vec<u8>>> {
        match self.lookup_by_name(name) {
            Some(location) => self.read_entry(location.offset, location.size).map(Some),
            None => Ok(None),
        }
    }

    /// Give back the underlying reader
    pub fn into_inner(self) -> R {
        self.inner
    }
}
