//! Per-title configuration
//!
//! Each game title builds archives with its own id derivation and, when
//! headers are encrypted, its own public key. Neither can be discovered from
//! the archive, so they are supplied as configuration:
//!
//! ```json
//! {
//!   "titles": [
//!     { "name": "red-alert", "id_hash": "classic" },
//!     { "name": "tiberian-sun", "id_hash": "crc32" },
//!     { "name": "mod", "id_hash": "crc32", "modulus": "03f1", "exponent": 3,
//!       "key_blob_len": 4, "key_len": 2 }
//!   ]
//! }
//! ```
//!
//! A title without a `modulus` uses the Westwood key.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use wwmix_crypto::key_recovery::WESTWOOD_EXPONENT;
use wwmix_crypto::{
    BLOWFISH_KEY_SIZE, CryptoError, IdHash, KEY_BLOB_SIZE, KeyRecovery, KeyTable, PublicKey,
};

use crate::mix::{DEFAULT_MAX_ENTRIES, OpenOptions};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// JSON could not be parsed
    #[error("Invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Key parameters or id hash name rejected
    #[error("Invalid key parameters for '{title}': {source}")]
    Key {
        /// Title being configured
        title: String,
        /// Underlying error
        source: CryptoError,
    },

    /// No title with this name
    #[error("Unknown title: {0}")]
    UnknownTitle(String),

    /// Configuration file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration result type
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Parameters for one title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleConfig {
    /// Title name, matched case-insensitively
    pub name: String,

    /// Id derivation (`classic` or `crc32`)
    #[serde(default = "default_id_hash")]
    pub id_hash: String,

    /// Hex big-endian modulus; the Westwood key when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modulus: Option<String>,

    /// Public exponent
    #[serde(default = "default_exponent")]
    pub exponent: u32,

    /// Encrypted key blob length
    #[serde(default = "default_key_blob_len")]
    pub key_blob_len: usize,

    /// Recovered key length
    #[serde(default = "default_key_len")]
    pub key_len: usize,

    /// Largest plausible entry count
    #[serde(default = "default_max_entries")]
    pub max_entries: u16,
}

fn default_id_hash() -> String {
    IdHash::Classic.to_string()
}

fn default_exponent() -> u32 {
    WESTWOOD_EXPONENT
}

fn default_key_blob_len() -> usize {
    KEY_BLOB_SIZE
}

fn default_key_len() -> usize {
    BLOWFISH_KEY_SIZE
}

fn default_max_entries() -> u16 {
    DEFAULT_MAX_ENTRIES
}

impl TitleConfig {
    /// Title using the Westwood key with the given id derivation
    pub fn westwood(name: impl Into<String>, id_hash: IdHash) -> Self {
        Self {
            name: name.into(),
            id_hash: id_hash.to_string(),
            modulus: None,
            exponent: WESTWOOD_EXPONENT,
            key_blob_len: KEY_BLOB_SIZE,
            key_len: BLOWFISH_KEY_SIZE,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }

    fn key_error(&self, source: CryptoError) -> ConfigError {
        ConfigError::Key {
            title: self.name.clone(),
            source,
        }
    }

    /// Parsed id derivation
    pub fn id_hash(&self) -> ConfigResult<IdHash> {
        self.id_hash.parse().map_err(|e| self.key_error(e))
    }

    /// Key recovery parameters
    pub fn key_recovery(&self) -> ConfigResult<KeyRecovery> {
        let Some(modulus) = &self.modulus else {
            if self.exponent == WESTWOOD_EXPONENT
                && self.key_blob_len == KEY_BLOB_SIZE
                && self.key_len == BLOWFISH_KEY_SIZE
            {
                return Ok(KeyRecovery::westwood());
            }
            let public_key = PublicKey::from_be_bytes(
                &wwmix_crypto::key_recovery::WESTWOOD_MODULUS,
                self.exponent,
            )
            .map_err(|e| self.key_error(e))?;
            return KeyRecovery::new(public_key, self.key_blob_len, self.key_len)
                .map_err(|e| self.key_error(e));
        };

        let public_key =
            PublicKey::from_hex(modulus, self.exponent).map_err(|e| self.key_error(e))?;
        KeyRecovery::new(public_key, self.key_blob_len, self.key_len).map_err(|e| self.key_error(e))
    }

    /// Options for opening this title's archives
    pub fn open_options(&self) -> ConfigResult<OpenOptions> {
        Ok(OpenOptions::new()
            .with_key_recovery(self.key_recovery()?)
            .with_id_hash(self.id_hash()?)
            .with_max_entries(self.max_entries))
    }
}

/// Configuration for every known title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct WwmixConfig {
    /// Configured titles
    #[serde(default)]
    pub titles: Vec<TitleConfig>,
}

impl WwmixConfig {
    /// The shipped Westwood titles
    pub fn builtin() -> Self {
        Self {
            titles: vec![
                TitleConfig::westwood("tiberian-dawn", IdHash::Classic),
                TitleConfig::westwood("red-alert", IdHash::Classic),
                TitleConfig::westwood("tiberian-sun", IdHash::Crc32),
                TitleConfig::westwood("firestorm", IdHash::Crc32),
                TitleConfig::westwood("red-alert-2", IdHash::Crc32),
            ],
        }
    }

    /// Parse from JSON
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Add or replace a title
    #[must_use]
    pub fn with_title(mut self, title: TitleConfig) -> Self {
        self.titles
            .retain(|existing| !existing.name.eq_ignore_ascii_case(&title.name));
        self.titles.push(title);
        self
    }

    /// Find a title (case-insensitive)
    pub fn title(&self, name: &str) -> Option<&TitleConfig> {
        self.titles
            .iter()
            .find(|title| title.name.eq_ignore_ascii_case(name))
    }

    /// Options for opening a title's archives
    pub fn open_options(&self, name: &str) -> ConfigResult<OpenOptions> {
        self.title(name)
            .ok_or_else(|| ConfigError::UnknownTitle(name.to_string()))?
            .open_options()
    }

    /// Key recovery parameters of every title
    pub fn key_table(&self) -> ConfigResult<KeyTable> {
        let mut table = KeyTable::empty();
        for title in &self.titles {
            table.insert(title.name.clone(), title.key_recovery()?);
        }
        Ok(table)
    }
}
