//! Options for opening MIX archives

use wwmix_crypto::{IdHash, KeyRecovery};

/// Default upper bound on the entry count
///
/// Counts are stored as a signed 16-bit value by the games, so anything above
/// `i16::MAX` is treated as corrupt.
pub const DEFAULT_MAX_ENTRIES: u16 = 0x7FFF;

/// How to open an archive
///
/// The key parameters and id derivation depend on which title built the
/// archive and are never discovered from the file itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenOptions {
    /// Key recovery for encrypted headers, `None` to refuse them
    pub key_recovery: Option<KeyRecovery>,
    /// Id derivation used by name lookups
    pub id_hash: IdHash,
    /// Largest plausible entry count
    pub max_entries: u16,
}

impl OpenOptions {
    /// Westwood key, classic ids
    pub fn new() -> Self {
        Self::default()
    }

    /// Use specific key recovery parameters
    #[must_use]
    pub fn with_key_recovery(mut self, recovery: KeyRecovery) -> Self {
        self.key_recovery = Some(recovery);
        self
    }

    /// Refuse encrypted headers
    #[must_use]
    pub fn without_key_recovery(mut self) -> Self {
        self.key_recovery = None;
        self
    }

    /// Use a specific id derivation
    #[must_use]
    pub fn with_id_hash(mut self, id_hash: IdHash) -> Self {
        self.id_hash = id_hash;
        self
    }

    /// Set the largest plausible entry count
    #[must_use]
    pub fn with_max_entries(mut self, max_entries: u16) -> Self {
        self.max_entries = max_entries;
        self
    }
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self {
            key_recovery: Some(KeyRecovery::westwood()),
            id_hash: IdHash::Classic,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}
