//! Container and image formats for Westwood game data
//!
#![allow(clippy::cast_possible_truncation)] // Intentional for binary format parsing
#![allow(clippy::cast_possible_wrap)] // Intentional for binary operations
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::doc_markdown)] // Format terms don't need backticks
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::similar_names)] // Domain-specific naming patterns
#![allow(clippy::redundant_closure_for_method_calls)] // Iterator chains
#![allow(clippy::return_self_not_must_use)] // Builder patterns
//! This crate reads the MIX archives used by Tiberian Dawn, Red Alert,
//! Tiberian Sun and Red Alert 2, and decodes the tile sets stored in them.
//!
//! # Supported Formats
//!
//! - **MIX**: legacy, flagged and encrypted archive headers with id lookups
//! - **Local mix database**: the name list some archives carry
//! - **Tile sets**: raw, run-length and XOR-delta encoded tiles
//!
//! Per-title key parameters and id derivations come from [`config`].
//!
//! # Design Principles
//!
//! - **Read-only**: archives are parsed, never written
//! - **Zero-Copy Reads**: entry data is sliced from the backing buffer
//! - **Per-tile failures**: one bad tile never hides the rest of a set

#![warn(missing_docs)]

pub mod config;

/// MIX archive parsing and lookups
///
/// Key features:
/// - **Variant detection**: legacy vs flagged headers from the zero sentinel
/// - **Header decryption**: key blob recovery and Blowfish ECB
/// - **Unsigned ordering**: tables re-sorted by unsigned id before searching
/// - **Bounds checking**: every read is checked against the data region
pub mod mix;

/// Tile set decoding
pub mod tile;

// Test utilities module
#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
pub(crate) mod test_utils;

pub use config::{ConfigError, TitleConfig, WwmixConfig};
pub use mix::{EntryLocation, MixArchive, MixError, MixReader, OpenOptions};
pub use tile::{DecodeFailure, DecodedTile, TileError, TileSet};
