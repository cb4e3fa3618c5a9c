//! MIX index entries

use binrw::{BinRead, BinWrite};
use std::ops::Range;

/// One 12-byte index record
///
/// Ids are compared as unsigned 32-bit values. Some writers sorted the table
/// as signed integers, so the order on disk cannot be trusted; the index is
/// re-sorted when it is loaded.
#[derive(BinRead, BinWrite, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[brw(little)]
pub struct IndexEntry {
    /// Filename id
    pub id: u32,
    /// Offset relative to the start of the data region
    pub offset: u32,
    /// Size in bytes
    pub size: u32,
}

impl IndexEntry {
    /// Create a new entry
    pub const fn new(id: u32, offset: u32, size: u32) -> Self {
        Self { id, offset, size }
    }

    /// Location of the entry's bytes within the data region
    pub const fn location(&self) -> EntryLocation {
        EntryLocation {
            offset: self.offset,
            size: self.size,
        }
    }

    /// One past the last byte, relative to the data region
    pub fn end(&self) -> u64 {
        self.location().end()
    }
}

/// Where an entry lives inside the data region
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryLocation {
    /// Offset relative to the start of the data region
    pub offset: u32,
    /// Size in bytes
    pub size: u32,
}

impl EntryLocation {
    /// One past the last byte
    pub fn end(&self) -> u64 {
        u64::from(self.offset) + u64::from(self.size)
    }

    /// Relative byte range
    pub fn range(&self) -> Range<u64> {
        u64::from(self.offset)..self.end()
    }
}

/// Whether `entries` are in ascending unsigned id order
pub fn is_sorted(entries: &[IndexEntry]) -> bool {
    entries.windows(2).all(|pair| pair[0].id <= pair[1].id)
}

/// Binary search an unsigned-sorted table
pub fn find(entries: &[IndexEntry], id: u32) -> Option<&IndexEntry> {
    entries
        .binary_search_by(|entry| entry.id.cmp(&id))
        .ok()
        .map(|pos| &entries[pos])
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use binrw::BinWriterExt;
    use std::io::Cursor;

    fn signed_order() -> Vec<IndexEntry> {
        // what a writer comparing i32 ids produces
        vec![
            IndexEntry::new(0x8000_0000, 0, 1),
            IndexEntry::new(0xFFFF_FFFF, 1, 1),
            IndexEntry::new(0x0000_0001, 2, 1),
            IndexEntry::new(0x7FFF_FFFF, 3, 1),
        ]
    }

    #[test]
    fn test_entry_layout() {
        let mut cursor = Cursor::new(Vec::new());
        cursor
            .write_le(&IndexEntry::new(0xA65C_B2D2, 0x10, 0x20))
            .unwrap();
        assert_eq!(
            cursor.into_inner(),
            vec![0xD2, 0xB2, 0x5C, 0xA6, 0x10, 0, 0, 0, 0x20, 0, 0, 0]
        );
    }

    #[test]
    fn test_signed_order_is_not_sorted() {
        let mut entries = signed_order();
        assert!(!is_sorted(&entries));
        entries.sort_by_key(|e| e.id);
        assert!(is_sorted(&entries));
        for id in [0x1, 0x7FFF_FFFF, 0x8000_0000, 0xFFFF_FFFF] {
            assert_eq!(find(&entries, id).map(|e| e.id), Some(id));
        }
    }

    #[test]
    fn test_signed_comparison_misses_ids() {
        let mut entries = signed_order();
        entries.sort_by_key(|e| e.id);

        // searching the unsigned table with a signed comparator loses entries
        let missed = [0x1u32, 0x7FFF_FFFF, 0x8000_0000, 0xFFFF_FFFF]
            .into_iter()
            .filter(|&id| {
                entries
                    .binary_search_by(|e| (e.id as i32).cmp(&(id as i32)))
                    .is_err()
            })
            .count();
        assert!(missed > 0);
    }

    #[test]
    fn test_location_range() {
        let location = IndexEntry::new(1, 0xFFFF_FFFF, 2).location();
        assert_eq!(location.end(), 0x1_0000_0001);
        assert_eq!(location.range(), 0xFFFF_FFFF..0x1_0000_0001);
    }
}
