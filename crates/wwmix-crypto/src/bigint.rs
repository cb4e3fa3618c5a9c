//! Fixed-width unsigned integers for public-key operations
//!
//! Values are stored as little-endian 32-bit words. The width is chosen when a
//! value is constructed and rounded up to whole words; every operation keeps
//! the words above the width at zero simply by never growing the vector.
//!
//! Byte order is always supplied by the caller. Public-key material is
//! distributed big-endian while encrypted key chunks are stored little-endian,
//! so the two loaders are separate entry points rather than a flag.
//!
//! ```
//! use wwmix_crypto::bigint::FixedUint;
//!
//! let base = FixedUint::from_u32(4, 32);
//! let exponent = FixedUint::from_u32(13, 32);
//! let modulus = FixedUint::from_u32(497, 32);
//! let result = FixedUint::pow_mod(&base, &exponent, &modulus).expect("non-zero modulus");
//! assert_eq!(result, FixedUint::from_u32(445, 32));
//! ```

use std::cmp::Ordering;
use std::fmt;

use crate::error::CryptoError;

const WORD_BITS: usize = 32;
const WORD_BYTES: usize = 4;

/// Unsigned integer with a fixed number of 32-bit words
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct FixedUint {
    words: Vec<u32>,
}

fn words_for_bits(bits: usize) -> usize {
    bits.div_ceil(WORD_BITS).max(1)
}

impl FixedUint {
    /// Zero with room for at least `bits` bits
    pub fn zero(bits: usize) -> Self {
        Self {
            words: vec![0; words_for_bits(bits)],
        }
    }

    /// Small value with room for at least `bits` bits
    pub fn from_u32(value: u32, bits: usize) -> Self {
        let mut out = Self::zero(bits);
        out.words[0] = value;
        out
    }

    /// Load a big-endian byte string.
    ///
    /// Shorter input is zero-extended. Longer input keeps its low-order
    /// (trailing) bytes and drops the surplus most significant ones.
    pub fn from_be_bytes(bytes: &[u8], bits: usize) -> Self {
        let mut out = Self::zero(bits);
        let capacity = out.byte_capacity();
        let start = bytes.len().saturating_sub(capacity);
        for (i, &byte) in bytes[start..].iter().rev().enumerate() {
            out.words[i / WORD_BYTES] |= u32::from(byte) << ((i % WORD_BYTES) * 8);
        }
        out
    }

    /// Load a little-endian byte string.
    ///
    /// Shorter input is zero-extended. Longer input keeps its low-order
    /// (leading) bytes and drops the surplus most significant ones.
    pub fn from_le_bytes(bytes: &[u8], bits: usize) -> Self {
        let mut out = Self::zero(bits);
        let take = bytes.len().min(out.byte_capacity());
        for (i, &byte) in bytes[..take].iter().enumerate() {
            out.words[i / WORD_BYTES] |= u32::from(byte) << ((i % WORD_BYTES) * 8);
        }
        out
    }

    /// Export as exactly `len` little-endian bytes, zero-filling or truncating
    pub fn to_le_bytes(&self, len: usize) -> Vec<u8> {
        let mut out = vec![0u8; len];
        for (i, byte) in out.iter_mut().enumerate().take(self.byte_capacity()) {
            *byte = (self.words[i / WORD_BYTES] >> ((i % WORD_BYTES) * 8)) as u8;
        }
        out
    }

    /// Export as exactly `len` big-endian bytes, zero-filling or truncating
    pub fn to_be_bytes(&self, len: usize) -> Vec<u8> {
        let mut out = self.to_le_bytes(len);
        out.reverse();
        out
    }

    /// Little-endian word view
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    /// Width in bits (always a multiple of 32)
    pub fn width_bits(&self) -> usize {
        self.words.len() * WORD_BITS
    }

    fn byte_capacity(&self) -> usize {
        self.words.len() * WORD_BYTES
    }

    /// Number of significant bits
    pub fn bit_len(&self) -> usize {
        bit_len(&self.words)
    }

    /// Whether the value is zero
    pub fn is_zero(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Test bit `index` (bit 0 is the least significant)
    pub fn bit(&self, index: usize) -> bool {
        self.words
            .get(index / WORD_BITS)
            .is_some_and(|w| (w >> (index % WORD_BITS)) & 1 == 1)
    }

    /// `(self * other) mod modulus`, result in the modulus' width
    pub fn mul_mod(&self, other: &Self, modulus: &Self) -> Result<Self, CryptoError> {
        if modulus.is_zero() {
            return Err(CryptoError::ZeroModulus);
        }
        let wide = mul_wide(&self.words, &other.words);
        Ok(Self {
            words: reduce(&wide, &modulus.words),
        })
    }

    /// `base ^ exponent mod modulus`, result in the modulus' width.
    ///
    /// Square-and-multiply over every exponent bit from the top down. Each
    /// product is formed in a double-width buffer before reduction, so no
    /// intermediate wraps. Exponent 2 costs one squaring but takes the same
    /// path as any other exponent.
    pub fn pow_mod(base: &Self, exponent: &Self, modulus: &Self) -> Result<Self, CryptoError> {
        if modulus.is_zero() {
            return Err(CryptoError::ZeroModulus);
        }
        let m = &modulus.words;
        let base = reduce(&base.words, m);
        let mut acc = reduce(&[1], m);

        for i in (0..exponent.bit_len()).rev() {
            acc = reduce(&mul_wide(&acc, &acc), m);
            if exponent.bit(i) {
                acc = reduce(&mul_wide(&acc, &base), m);
            }
        }

        Ok(Self { words: acc })
    }
}

impl PartialOrd for FixedUint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FixedUint {
    /// Numeric order, independent of width
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_words(&self.words, &other.words)
    }
}

impl fmt::Debug for FixedUint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FixedUint<{}>(0x{self:x})", self.width_bits())
    }
}

impl fmt::LowerHex for FixedUint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.to_be_bytes(self.byte_capacity())))
    }
}

fn bit_len(words: &[u32]) -> usize {
    words
        .iter()
        .rposition(|&w| w != 0)
        .map_or(0, |top| top * WORD_BITS + (WORD_BITS - words[top].leading_zeros() as usize))
}

/// Compare two word slices numerically; missing high words count as zero
fn cmp_words(a: &[u32], b: &[u32]) -> Ordering {
    let len = a.len().max(b.len());
    for i in (0..len).rev() {
        let x = a.get(i).copied().unwrap_or(0);
        let y = b.get(i).copied().unwrap_or(0);
        match x.cmp(&y) {
            Ordering::Equal => {}
            other => return other,
        }
    }
    Ordering::Equal
}

/// Schoolbook product into `a.len() + b.len()` words
fn mul_wide(a: &[u32], b: &[u32]) -> Vec<u32> {
    let mut out = vec![0u32; a.len() + b.len()];
    for (i, &x) in a.iter().enumerate() {
        let mut carry = 0u64;
        for (j, &y) in b.iter().enumerate() {
            // (2^32-1)^2 + 2 * (2^32-1) == 2^64-1, so this never overflows
            let t = u64::from(x) * u64::from(y) + u64::from(out[i + j]) + carry;
            out[i + j] = t as u32;
            carry = t >> 32;
        }
        out[i + b.len()] = carry as u32;
    }
    out
}

/// `value mod modulus` by binary long division, result in `modulus.len()` words
fn reduce(value: &[u32], modulus: &[u32]) -> Vec<u32> {
    let n = modulus.len();
    // One spare word: the shifted remainder is below 2 * modulus
    let mut rem = vec![0u32; n + 1];

    for i in (0..bit_len(value)).rev() {
        shl1(&mut rem);
        rem[0] |= (value[i / WORD_BITS] >> (i % WORD_BITS)) & 1;
        if cmp_words(&rem, modulus) != Ordering::Less {
            sub_in_place(&mut rem, modulus);
        }
    }

    rem.truncate(n);
    rem
}

fn shl1(words: &mut [u32]) {
    let mut carry = 0u32;
    for w in words.iter_mut() {
        let next = *w >> 31;
        *w = (*w << 1) | carry;
        carry = next;
    }
}

/// `a -= b`, requires `a >= b`
fn sub_in_place(a: &mut [u32], b: &[u32]) {
    let mut borrow = 0u64;
    for (i, w) in a.iter_mut().enumerate() {
        let rhs = u64::from(b.get(i).copied().unwrap_or(0)) + borrow;
        let lhs = u64::from(*w);
        if lhs >= rhs {
            *w = (lhs - rhs) as u32;
            borrow = 0;
        } else {
            *w = ((lhs + (1 << 32)) - rhs) as u32;
            borrow = 1;
        }
    }
}
