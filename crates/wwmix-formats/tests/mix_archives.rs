#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Integration tests for MIX archives built byte by byte
//!
//! Covers the three header variants end to end, header decryption with a
//! real Blowfish key, unsigned id ordering and name lookups.

use pretty_assertions::assert_eq;
use std::io::{Cursor, Write};
use wwmix_crypto::key_recovery::WESTWOOD_MODULUS;
use wwmix_crypto::{
    BLOWFISH_KEY_SIZE, HeaderCipher, IdHash, IdentityCipher, KEY_BLOB_SIZE, KeyRecovery,
    PublicKey, WestwoodBlowfish,
};
use wwmix_formats::WwmixConfig;
use wwmix_formats::mix::{EntryLocation, MixArchive, MixError, MixFlags, MixReader, OpenOptions};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Header and index for `(id, offset, size)` entries
fn header_and_index(data_size: i32, entries: &[(u32, u32, u32)]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    bytes.extend_from_slice(&data_size.to_le_bytes());
    for (id, offset, size) in entries {
        bytes.extend_from_slice(&id.to_le_bytes());
        bytes.extend_from_slice(&offset.to_le_bytes());
        bytes.extend_from_slice(&size.to_le_bytes());
    }
    bytes
}

/// Two 12-byte entries with ids 1 and 2
fn two_entry_archive() -> Vec<u8> {
    let mut bytes = header_and_index(24, &[(1, 0, 12), (2, 12, 12)]);
    bytes.extend_from_slice(b"first entry!");
    bytes.extend_from_slice(b"second entry");
    bytes
}

fn encrypted_archive<C: HeaderCipher>(blob: &[u8], key: &[u8], entries: &[(u32, &[u8])]) -> Vec<u8> {
    let mut table = Vec::new();
    let mut data = Vec::new();
    for (id, payload) in entries {
        table.push((*id, data.len() as u32, payload.len() as u32));
        data.extend_from_slice(payload);
    }

    let mut region = header_and_index(data.len() as i32, &table);
    region.resize(region.len().next_multiple_of(8), 0);
    C::from_key(key).unwrap().encrypt_ecb(&mut region).unwrap();

    let mut bytes = vec![0, 0];
    bytes.extend_from_slice(&MixFlags::ENCRYPTED.to_le_bytes());
    bytes.extend_from_slice(blob);
    bytes.extend_from_slice(&region);
    bytes.extend_from_slice(&data);
    bytes
}

#[test]
fn legacy_archive_end_to_end() {
    init_tracing();
    let archive = MixArchive::open(two_entry_archive(), &OpenOptions::default()).unwrap();

    assert!(archive.header().is_legacy());
    assert_eq!(archive.len(), 2);

    // the classic id of "\x02" is 2
    let location = archive.lookup_by_name("\u{2}").unwrap();
    assert_eq!(location, EntryLocation { offset: 12, size: 12 });

    let data = archive.read_entry(location.offset, location.size).unwrap();
    assert_eq!(data.len(), 12);
    assert_eq!(data.as_ref(), b"second entry");
    assert!(archive.lookup_by_name("absent.shp").is_none());
}

#[test]
fn flagged_plaintext_matches_legacy() {
    let legacy = two_entry_archive();
    let mut flagged = vec![0, 0, 0, 0];
    flagged.extend_from_slice(&legacy);

    let legacy = MixArchive::open(legacy, &OpenOptions::default()).unwrap();
    let flagged = MixArchive::open(flagged, &OpenOptions::default()).unwrap();

    assert!(!flagged.header().is_legacy());
    assert_eq!(flagged.entries(), legacy.entries());
    assert_eq!(flagged.read_entry(0, 12).unwrap(), legacy.read_entry(0, 12).unwrap());
}

#[test]
fn identity_encrypted_archive_parses_like_plaintext() {
    init_tracing();
    let entries: [(u32, &[u8]); 2] = [(1, b"first entry!"), (2, b"second entry")];
    let bytes = encrypted_archive::<IdentityCipher>(
        &[0u8; KEY_BLOB_SIZE],
        &[0u8; BLOWFISH_KEY_SIZE],
        &entries,
    );

    let encrypted = MixArchive::open_with::<IdentityCipher>(bytes, &OpenOptions::default()).unwrap();
    let plain = MixArchive::open(two_entry_archive(), &OpenOptions::default()).unwrap();

    assert!(encrypted.header().is_encrypted());
    assert_eq!(encrypted.entries(), plain.entries());
    assert_eq!(encrypted.read_file("\u{2}").unwrap(), plain.read_file("\u{2}").unwrap());
}

#[test]
fn blowfish_encrypted_archive_with_recovered_key() {
    init_tracing();
    let key: Vec<u8> = (0..BLOWFISH_KEY_SIZE as u8).map(|i| i.wrapping_mul(37) ^ 0x5A).collect();

    // with exponent 1 each chunk recovers to its own low 39 bytes
    let mut blob = [0u8; KEY_BLOB_SIZE];
    blob[..39].copy_from_slice(&key[..39]);
    blob[40..57].copy_from_slice(&key[39..]);

    let rules = IdHash::Crc32.id("rules.ini");
    let art = IdHash::Crc32.id("art.ini");
    let entries: [(u32, &[u8]); 2] = [(rules, b"[General]"), (art, b"[Movies]")];
    let bytes = encrypted_archive::<WestwoodBlowfish>(&blob, &key, &entries);

    let recovery =
        KeyRecovery::new(PublicKey::from_be_bytes(&WESTWOOD_MODULUS, 1).unwrap(), 80, 56).unwrap();
    assert_eq!(recovery.recover(&blob).unwrap(), key);

    let options = OpenOptions::default()
        .with_key_recovery(recovery)
        .with_id_hash(IdHash::Crc32);
    let archive = MixArchive::open(bytes.clone(), &options).unwrap();
    assert_eq!(archive.read_file("RULES.INI").unwrap().unwrap().as_ref(), b"[General]");
    assert_eq!(archive.read_file("art.ini").unwrap().unwrap().as_ref(), b"[Movies]");

    // the shipped exponent decrypts this header to garbage
    let wrong = OpenOptions::default().with_id_hash(IdHash::Crc32);
    let err = MixArchive::open(bytes, &wrong).unwrap_err();
    assert!(err.is_crypto_failure(), "{err}");
}

#[test]
fn ids_with_high_bit_resolve_after_signed_ordering() {
    // on-disk order as a signed comparison would leave it
    let ids = [0x8000_0000u32, 0xFFFF_FFFF, 0x0000_0001, 0x7FFF_FFFF];
    let entries: Vec<(u32, u32, u32)> = ids
        .iter()
        .enumerate()
        .map(|(i, &id)| (id, i as u32, 1))
        .collect();
    let mut bytes = header_and_index(4, &entries);
    bytes.extend_from_slice(&[10, 11, 12, 13]);

    let archive = MixArchive::open(bytes, &OpenOptions::default()).unwrap();
    for (i, id) in ids.into_iter().enumerate() {
        let location = archive
            .lookup_by_id(id)
            .unwrap_or_else(|| panic!("id {id:#010x} not found"));
        assert_eq!(
            archive.read_location(location).unwrap().as_ref(),
            &[10 + i as u8]
        );
    }

    let sorted: Vec<u32> = archive.entries().iter().map(|e| e.id).collect();
    assert_eq!(sorted, vec![0x1, 0x7FFF_FFFF, 0x8000_0000, 0xFFFF_FFFF]);
}

#[test]
fn names_are_case_insensitive() {
    for hash in [IdHash::Classic, IdHash::Crc32] {
        let mut bytes = header_and_index(5, &[(hash.id("e1.shp"), 0, 5)]);
        bytes.extend_from_slice(b"shape");

        let archive = MixArchive::open(bytes, &OpenOptions::default().with_id_hash(hash)).unwrap();
        assert_eq!(archive.lookup_by_name("e1.shp"), archive.lookup_by_name("E1.SHP"));
        assert!(archive.lookup_by_name("E1.shp").is_some());
    }
}

#[test]
fn implausible_plaintext_headers_are_structural() {
    // entry runs past the data region
    let mut bytes = header_and_index(4, &[(1, 2, 4)]);
    bytes.extend_from_slice(&[0; 4]);
    let err = MixArchive::open(bytes, &OpenOptions::default()).unwrap_err();
    assert!(matches!(err, MixError::Structural { .. }), "{err}");

    // data size larger than the file
    let mut bytes = header_and_index(400, &[(1, 0, 4)]);
    bytes.extend_from_slice(&[0; 4]);
    assert!(MixArchive::open(bytes, &OpenOptions::default()).unwrap_err().is_structural());
}

#[test]
fn checksum_trailer_is_excluded_and_verified() {
    use sha1::{Digest, Sha1};

    let data = b"checked data";
    let mut bytes = vec![0, 0];
    bytes.extend_from_slice(&MixFlags::CHECKSUM.to_le_bytes());
    bytes.extend_from_slice(&header_and_index(12, &[(9, 0, 12)]));
    bytes.extend_from_slice(data);
    bytes.extend_from_slice(Sha1::digest(data).as_slice());

    let archive = MixArchive::open(bytes, &OpenOptions::default()).unwrap();
    assert_eq!(archive.index().data_size(), 12);
    assert!(archive.read_entry(0, 13).unwrap_err().is_bounds());
    assert!(archive.verify_checksum().unwrap());
}

#[test]
fn reader_and_config_from_files() {
    init_tracing();
    let mut config_file = tempfile::NamedTempFile::new().unwrap();
    config_file
        .write_all(br#"{"titles": [{"name": "tiberian-sun", "id_hash": "crc32"}]}"#)
        .unwrap();
    let config = WwmixConfig::from_path(config_file.path()).unwrap();
    let options = config.open_options("Tiberian-Sun").unwrap();

    let mut bytes = header_and_index(9, &[(IdHash::Crc32.id("rules.ini"), 0, 9)]);
    bytes.extend_from_slice(b"[General]");
    let mut archive_file = tempfile::NamedTempFile::new().unwrap();
    archive_file.write_all(&bytes).unwrap();
    archive_file.flush().unwrap();

    let mut reader = MixReader::open_path(archive_file.path(), &options).unwrap();
    assert_eq!(reader.read_file("rules.ini").unwrap().unwrap(), b"[General]");

    let mut cursor_reader = MixReader::open(Cursor::new(bytes), &options).unwrap();
    assert_eq!(cursor_reader.index(), reader.index());
    assert!(cursor_reader.read_entry(1, 9).unwrap_err().is_bounds());
}
