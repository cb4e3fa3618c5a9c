//! MIX header and index parsing
//!
//! Layout by variant:
//!
//! ```text
//! legacy     [count u16][data_size i32][entries 12*count][data]
//! flagged    [0u16][flags u16][count u16][data_size i32][entries][data][sha1?]
//! encrypted  [0u16][flags u16][key blob 80][encrypted header+index][data][sha1?]
//! ```
//!
//! The encrypted region is read in two steps. The first 8-byte block holds the
//! entry count and data size, which fix the length of the rest of the region
//! (`6 + 12 * count` rounded up to the block size). The data region begins
//! directly after the padded region.

use binrw::BinRead;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::ops::Range;
use tracing::{debug, warn};
use wwmix_crypto::{BLOCK_SIZE, HeaderCipher, IdHash, KeyRecovery};

use super::entry::{self, EntryLocation, IndexEntry};
use super::error::{MixError, MixResult};
use super::header::{FileHeader, MixFlags, MixHeader, detect_flags};
use super::options::OpenOptions;
use super::{CHECKSUM_SIZE, ENTRY_SIZE, FLAGGED_PREFIX_SIZE};

/// Whether header values came straight off disk or out of the cipher
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Source {
    Plain,
    Decrypted,
}

impl Source {
    fn implausible(self, offset: u64, reason: impl Into<String>) -> MixError {
        let reason = reason.into();
        match self {
            Self::Plain => MixError::Structural { offset, reason },
            Self::Decrypted => MixError::CryptoFailure {
                reason: format!("{reason} (offset {offset})"),
            },
        }
    }
}

/// Parsed header and sorted index of a MIX archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixIndex {
    header: MixHeader,
    entries: Vec<IndexEntry>,
    data_start: u64,
    data_size: u64,
    file_len: u64,
    id_hash: IdHash,
}

impl MixIndex {
    /// Parse the header and index using Blowfish for encrypted headers
    pub fn read<R: Read + Seek>(reader: &mut R, options: &OpenOptions) -> MixResult<Self> {
        Self::read_with::<R, wwmix_crypto::WestwoodBlowfish>(reader, options)
    }

    /// Parse the header and index with a specific header cipher
    pub fn read_with<R: Read + Seek, C: HeaderCipher>(
        reader: &mut R,
        options: &OpenOptions,
    ) -> MixResult<Self> {
        let file_len = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(0))?;

        if file_len < FileHeader::SIZE as u64 {
            return Err(MixError::Structural {
                offset: 0,
                reason: format!("{file_len} bytes is too short for a MIX header"),
            });
        }

        let mut prefix = [0u8; FLAGGED_PREFIX_SIZE];
        reader.read_exact(&mut prefix)?;

        let Some(flags) = detect_flags(prefix) else {
            reader.seek(SeekFrom::Start(0))?;
            let header = FileHeader::read(reader)?;
            debug!(
                "Legacy MIX header: {} entries, {} data bytes",
                header.entry_count, header.data_size
            );
            let index_offset = FileHeader::SIZE as u64;
            let entries =
                read_plain_entries(reader, &header, 0, index_offset, file_len, options)?;
            return Self::validate(
                MixHeader::Legacy(header),
                entries,
                index_offset,
                index_offset + header.index_size() as u64,
                file_len,
                Source::Plain,
                options.id_hash,
            );
        };

        if flags.is_encrypted() {
            let recovery = options.key_recovery.as_ref().ok_or_else(|| MixError::CryptoFailure {
                reason: "encrypted header but no key recovery parameters configured".to_string(),
            })?;
            return Self::read_encrypted::<R, C>(reader, flags, recovery, file_len, options);
        }

        let header_offset = FLAGGED_PREFIX_SIZE as u64;
        if file_len < header_offset + FileHeader::SIZE as u64 {
            return Err(MixError::Structural {
                offset: header_offset,
                reason: "truncated flagged header".to_string(),
            });
        }
        let header = FileHeader::read(reader)?;
        debug!(
            "Flagged MIX header ({flags}): {} entries, {} data bytes",
            header.entry_count, header.data_size
        );
        let index_offset = header_offset + FileHeader::SIZE as u64;
        let entries =
            read_plain_entries(reader, &header, header_offset, index_offset, file_len, options)?;

        Self::validate(
            MixHeader::Flagged { flags, header },
            entries,
            index_offset,
            index_offset + header.index_size() as u64,
            file_len,
            Source::Plain,
            options.id_hash,
        )
    }

    fn read_encrypted<R: Read + Seek, C: HeaderCipher>(
        reader: &mut R,
        flags: MixFlags,
        recovery: &KeyRecovery,
        file_len: u64,
        options: &OpenOptions,
    ) -> MixResult<Self> {
        let blob_offset = FLAGGED_PREFIX_SIZE as u64;
        let region_offset = blob_offset + recovery.blob_len() as u64;
        if file_len < region_offset + BLOCK_SIZE as u64 {
            return Err(MixError::Structural {
                offset: blob_offset,
                reason: "truncated key blob or encrypted header".to_string(),
            });
        }

        let mut blob = vec![0u8; recovery.blob_len()];
        reader.read_exact(&mut blob)?;
        let key = recovery.recover(&blob)?;
        let cipher = C::from_key(&key)?;

        let mut first = [0u8; BLOCK_SIZE];
        reader.read_exact(&mut first)?;
        cipher.decrypt_block(&mut first);
        let header = FileHeader::read(&mut Cursor::new(&first[..FileHeader::SIZE]))?;
        debug!(
            "Decrypted MIX header ({flags}): {} entries, {} data bytes",
            header.entry_count, header.data_size
        );

        check_count(&header, options, Source::Decrypted, region_offset)?;

        let index_len = FileHeader::SIZE + header.index_size();
        let region_len = index_len.next_multiple_of(BLOCK_SIZE);
        if region_offset + region_len as u64 > file_len {
            return Err(Source::Decrypted.implausible(
                region_offset,
                format!(
                    "{} entries need a {region_len}-byte index but the file has {} bytes left",
                    header.entry_count,
                    file_len - region_offset
                ),
            ));
        }

        let mut region = vec![0u8; region_len];
        region[..BLOCK_SIZE].copy_from_slice(&first);
        reader.read_exact(&mut region[BLOCK_SIZE..])?;
        cipher.decrypt_ecb(&mut region[BLOCK_SIZE..])?;

        let entries = parse_entries(
            &region[FileHeader::SIZE..index_len],
            usize::from(header.entry_count),
        )?;

        Self::validate(
            MixHeader::Flagged { flags, header },
            entries,
            region_offset + FileHeader::SIZE as u64,
            region_offset + region_len as u64,
            file_len,
            Source::Decrypted,
            options.id_hash,
        )
    }

    fn validate(
        header: MixHeader,
        mut entries: Vec<IndexEntry>,
        index_offset: u64,
        data_start: u64,
        file_len: u64,
        source: Source,
        id_hash: IdHash,
    ) -> MixResult<Self> {
        let trailer = if header.has_checksum() {
            CHECKSUM_SIZE as u64
        } else {
            0
        };
        let Some(available) = file_len.checked_sub(data_start + trailer) else {
            return Err(source.implausible(
                data_start,
                format!("data region starts past the end of a {file_len}-byte file"),
            ));
        };

        let declared = header.data_size();
        let Ok(data_size) = u64::try_from(declared) else {
            return Err(source.implausible(
                data_start,
                format!("negative data size {declared}"),
            ));
        };
        if data_size > available {
            return Err(source.implausible(
                data_start,
                format!("data size {data_size} exceeds the {available} bytes available"),
            ));
        }

        for (i, entry) in entries.iter().enumerate() {
            if entry.end() > data_size {
                return Err(source.implausible(
                    index_offset + (i * ENTRY_SIZE) as u64,
                    format!(
                        "entry {:#010x} spans {}..{} beyond data size {data_size}",
                        entry.id,
                        entry.offset,
                        entry.end()
                    ),
                ));
            }
        }

        if !entry::is_sorted(&entries) {
            warn!("MIX index not in unsigned id order, re-sorting {} entries", entries.len());
            entries.sort_by_key(|entry| entry.id);
        }
        if let Some(pair) = entries.windows(2).find(|pair| pair[0].id == pair[1].id) {
            warn!("Duplicate id {:#010x} in MIX index", pair[0].id);
        }

        Ok(Self {
            header,
            entries,
            data_start,
            data_size,
            file_len,
            id_hash,
        })
    }

    /// Header variant and values
    pub fn header(&self) -> &MixHeader {
        &self.header
    }

    /// Entries sorted by unsigned id
    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the archive has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Absolute file offset of the data region
    pub fn data_start(&self) -> u64 {
        self.data_start
    }

    /// Size of the data region in bytes
    pub fn data_size(&self) -> u64 {
        self.data_size
    }

    /// Total file length seen when the index was read
    pub fn file_len(&self) -> u64 {
        self.file_len
    }

    /// Id derivation used by name lookups
    pub fn id_hash(&self) -> IdHash {
        self.id_hash
    }

    /// Find an entry by precomputed id
    pub fn lookup_by_id(&self, id: u32) -> Option<EntryLocation> {
        entry::find(&self.entries, id).map(IndexEntry::location)
    }

    /// Find an entry by filename (case-insensitive)
    pub fn lookup_by_name(&self, name: &str) -> Option<EntryLocation> {
        self.lookup_by_id(self.id_hash.id(name))
    }

    /// Whether a filename resolves
    pub fn contains(&self, name: &str) -> bool {
        self.lookup_by_name(name).is_some()
    }

    /// Absolute file range of a data-region span
    pub fn file_range(&self, offset: u32, size: u32) -> MixResult<Range<u64>> {
        let location = EntryLocation { offset, size };
        if location.end() > self.data_size {
            return Err(MixError::Bounds {
                offset,
                size,
                data_size: self.data_size,
            });
        }
        Ok(self.data_start + u64::from(offset)..self.data_start + location.end())
    }

    /// Absolute file range of the SHA-1 trailer, if the archive has one
    pub fn checksum_range(&self) -> Option<Range<u64>> {
        self.header
            .has_checksum()
            .then(|| self.file_len - CHECKSUM_SIZE as u64..self.file_len)
    }
}

fn check_count(
    header: &FileHeader,
    options: &OpenOptions,
    source: Source,
    offset: u64,
) -> MixResult<()> {
    if header.entry_count > options.max_entries {
        return Err(source.implausible(
            offset,
            format!(
                "entry count {} exceeds the maximum of {}",
                header.entry_count, options.max_entries
            ),
        ));
    }
    Ok(())
}

fn read_plain_entries<R: Read>(
    reader: &mut R,
    header: &FileHeader,
    header_offset: u64,
    index_offset: u64,
    file_len: u64,
    options: &OpenOptions,
) -> MixResult<Vec<IndexEntry>> {
    check_count(header, options, Source::Plain, header_offset)?;

    let index_size = header.index_size();
    if index_offset + index_size as u64 > file_len {
        return Err(MixError::Structural {
            offset: index_offset,
            reason: format!(
                "{} entries need {index_size} index bytes but the file has {} bytes left",
                header.entry_count,
                file_len - index_offset
            ),
        });
    }

    let mut table = vec![0u8; index_size];
    reader.read_exact(&mut table)?;
    parse_entries(&table, usize::from(header.entry_count))
}

fn parse_entries(table: &[u8], count: usize) -> MixResult<Vec<IndexEntry>> {
    let mut cursor = Cursor::new(table);
    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        entries.push(IndexEntry::read(&mut cursor)?);
    }
    Ok(entries)
}
