//! Local mix database
//!
//! Archives produced by community tools often carry an entry named
//! `local mix database.dat` listing the names of every file they contain.
//! Since the index only stores ids, this is the only way to enumerate names.
//!
//! ```text
//! [signature 32][size u32][type u32][version u32][game u32][count i32][name\0]*
//! ```

use tracing::debug;

use super::error::{MixError, MixResult};

/// Name of the database entry
pub const LOCAL_DATABASE_NAME: &str = "local mix database.dat";

/// Signature at the start of the database
pub const XCC_SIGNATURE: &[u8; 32] = b"XCC by Olaf van der Spek\x1a\x04\x17\x27\x10\x19\x80\x00";

const COUNT_OFFSET: usize = 48;
const NAMES_OFFSET: usize = COUNT_OFFSET + 4;

/// File names listed by a local mix database
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocalDatabase {
    names: Vec<String>,
}

impl LocalDatabase {
    /// Parse the body of a database entry
    pub fn parse(data: &[u8]) -> MixResult<Self> {
        if data.len() < NAMES_OFFSET {
            return Err(MixError::Structural {
                offset: 0,
                reason: format!("{} bytes is too short for a local mix database", data.len()),
            });
        }
        if &data[..XCC_SIGNATURE.len()] != XCC_SIGNATURE {
            debug!("Local mix database without XCC signature");
        }

        let mut count_bytes = [0u8; 4];
        count_bytes.copy_from_slice(&data[COUNT_OFFSET..NAMES_OFFSET]);
        let count = i32::from_le_bytes(count_bytes);
        let Ok(count) = usize::try_from(count) else {
            return Err(MixError::Structural {
                offset: COUNT_OFFSET as u64,
                reason: format!("negative name count {count}"),
            });
        };

        // every name takes at least its terminator
        let mut names = Vec::with_capacity(count.min(data.len() - NAMES_OFFSET));
        let mut pos = NAMES_OFFSET;
        for _ in 0..count {
            let Some(len) = data[pos..].iter().position(|&b| b == 0) else {
                return Err(MixError::Structural {
                    offset: pos as u64,
                    reason: "unterminated name in local mix database".to_string(),
                });
            };
            names.push(String::from_utf8_lossy(&data[pos..pos + len]).into_owned());
            pos += len + 1;
        }

        debug!("Local mix database lists {} names", names.len());
        Ok(Self { names })
    }

    /// Listed names in database order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of names
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no names are listed
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::local_database_bytes;

    #[test]
    fn test_parse_names() {
        let database = LocalDatabase::parse(&local_database_bytes(&["a.shp", "b.pal"])).unwrap();
        assert_eq!(database.names(), &["a.shp", "b.pal"]);
        assert_eq!(database.len(), 2);
    }

    #[test]
    fn test_empty_database() {
        let database = LocalDatabase::parse(&local_database_bytes(&[])).unwrap();
        assert!(database.is_empty());
    }

    #[test]
    fn test_unterminated_name() {
        let mut data = local_database_bytes(&["a.shp"]);
        data.pop();
        let err = LocalDatabase::parse(&data).unwrap_err();
        assert!(matches!(err, MixError::Structural { offset: 52, .. }));
    }

    #[test]
    fn test_negative_count() {
        let mut data = local_database_bytes(&[]);
        data[48..52].copy_from_slice(&(-1i32).to_le_bytes());
        assert!(LocalDatabase::parse(&data).unwrap_err().is_structural());
    }

    #[test]
    fn test_too_short() {
        assert!(LocalDatabase::parse(&[0u8; 51]).unwrap_err().is_structural());
    }
}
