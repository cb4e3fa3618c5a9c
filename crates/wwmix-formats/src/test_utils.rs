//! Test utilities for building MIX fixtures
//!
//! Archives are never written by the library, so tests assemble them here.

use sha1::{Digest, Sha1};
use wwmix_crypto::{BLOWFISH_KEY_SIZE, HeaderCipher, KEY_BLOB_SIZE};

use crate::mix::{MixFlags, XCC_SIGNATURE};

/// Entries laid out back to back in insertion order
#[derive(Debug, Clone, Default)]
pub struct MixFixture {
    entries: Vec<(u32, Vec<u8>)>,
}

impl MixFixture {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entry(mut self, id: u32, payload: Vec<u8>) -> Self {
        self.entries.push((id, payload));
        self
    }

    /// Header plus index, and the data region
    fn header_index_data(&self) -> (Vec<u8>, Vec<u8>) {
        let mut index = Vec::new();
        let mut data = Vec::new();
        for (id, payload) in &self.entries {
            index.extend_from_slice(&id.to_le_bytes());
            index.extend_from_slice(&(data.len() as u32).to_le_bytes());
            index.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            data.extend_from_slice(payload);
        }

        let mut header = Vec::new();
        header.extend_from_slice(&(self.entries.len() as u16).to_le_bytes());
        header.extend_from_slice(&(data.len() as i32).to_le_bytes());
        header.extend_from_slice(&index);
        (header, data)
    }

    pub fn legacy(self) -> Vec<u8> {
        let (mut bytes, data) = self.header_index_data();
        bytes.extend_from_slice(&data);
        bytes
    }

    pub fn flagged(self, flags: u16) -> Vec<u8> {
        let (header, data) = self.header_index_data();
        let mut bytes = vec![0, 0];
        bytes.extend_from_slice(&flags.to_le_bytes());
        bytes.extend_from_slice(&header);
        bytes.extend_from_slice(&data);
        append_checksum(&mut bytes, flags, &data);
        bytes
    }

    /// Encrypted with an all-zero blob, which recovers an all-zero key
    pub fn encrypted<C: HeaderCipher>(self, flags: u16) -> Vec<u8> {
        self.encrypted_with::<C>(flags, &[0u8; KEY_BLOB_SIZE], &[0u8; BLOWFISH_KEY_SIZE])
    }

    /// Encrypted under `key`, which `blob` must recover to
    pub fn encrypted_with<C: HeaderCipher>(self, flags: u16, blob: &[u8], key: &[u8]) -> Vec<u8> {
        let flags = flags | MixFlags::ENCRYPTED;
        let (mut region, data) = self.header_index_data();
        region.resize(region.len().next_multiple_of(8), 0);
        C::from_key(key)
            .expect("fixture key")
            .encrypt_ecb(&mut region)
            .expect("padded region");

        let mut bytes = vec![0, 0];
        bytes.extend_from_slice(&flags.to_le_bytes());
        bytes.extend_from_slice(blob);
        bytes.extend_from_slice(&region);
        bytes.extend_from_slice(&data);
        append_checksum(&mut bytes, flags, &data);
        bytes
    }
}

fn append_checksum(bytes: &mut Vec<u8>, flags: u16, data: &[u8]) {
    if MixFlags::new(flags).has_checksum() {
        bytes.extend_from_slice(Sha1::digest(data).as_slice());
    }
}

/// Body of a `local mix database.dat` entry
pub fn local_database_bytes(names: &[&str]) -> Vec<u8> {
    let mut data = XCC_SIGNATURE.to_vec();
    data.extend_from_slice(&[0u8; 16]);
    data.extend_from_slice(&(names.len() as i32).to_le_bytes());
    for name in names {
        data.extend_from_slice(name.as_bytes());
        data.push(0);
    }
    data
}
