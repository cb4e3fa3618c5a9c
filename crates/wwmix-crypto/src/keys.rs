//! Per-title public key table
//!
//! Key recovery needs the modulus and exponent a title was built with. They
//! are never discovered from the container, so callers hand a table of them
//! to whatever opens archives. Titles are identified by a free-form name.

use std::collections::BTreeMap;

use crate::error::CryptoError;
use crate::key_recovery::KeyRecovery;

/// Titles that ship with the Westwood key
pub const WESTWOOD_TITLES: [&str; 4] = ["red-alert", "tiberian-sun", "firestorm", "red-alert-2"];

/// Store of key recovery parameters by title
#[derive(Debug, Clone)]
pub struct KeyTable {
    keys: BTreeMap<String, KeyRecovery>,
}

impl KeyTable {
    /// Create a table with the built-in Westwood titles
    pub fn new() -> Self {
        let mut table = Self::empty();
        table.load_builtin_keys();
        table
    }

    /// Create an empty table
    pub fn empty() -> Self {
        Self {
            keys: BTreeMap::new(),
        }
    }

    fn load_builtin_keys(&mut self) {
        for title in WESTWOOD_TITLES {
            self.insert(title, KeyRecovery::westwood());
        }
    }

    /// Register or replace a title's parameters
    pub fn insert(&mut self, title: impl Into<String>, recovery: KeyRecovery) {
        self.keys.insert(title.into().to_ascii_lowercase(), recovery);
    }

    /// Look up a title (case-insensitive)
    pub fn get(&self, title: &str) -> Option<&KeyRecovery> {
        self.keys.get(&title.to_ascii_lowercase())
    }

    /// Look up a title, failing if it is unknown
    pub fn require(&self, title: &str) -> Result<&KeyRecovery, CryptoError> {
        self.get(title)
            .ok_or_else(|| CryptoError::UnknownTitle(title.to_string()))
    }

    /// Remove a title
    pub fn remove(&mut self, title: &str) -> Option<KeyRecovery> {
        self.keys.remove(&title.to_ascii_lowercase())
    }

    /// Registered titles in sorted order
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.keys.keys().map(String::as_str)
    }

    /// Number of registered titles
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl Default for KeyTable {
    fn default() -> Self {
        Self::new()
    }
}
