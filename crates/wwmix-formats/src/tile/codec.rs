//! Run-length codec for tile image data
//!
//! Opcode byte `cmd`:
//!
//! | `cmd`         | Meaning                                              |
//! |---------------|------------------------------------------------------|
//! | `0x01..=0x7F` | copy the next `cmd` literal bytes                     |
//! | `0x00`        | copy `n` literal bytes, `n` from the next `u16` LE    |
//! | `0x81..=0xFF` | repeat the next byte `cmd & 0x7F` times              |
//! | `0x80`        | repeat `n` times, `n` from the next `u16` LE, then the byte |
//!
//! Decoding stops as soon as the destination is full; trailing input is
//! ignored because slot extents are only known up to the next tile.

use super::error::DecodeFailure;

const FILL_FLAG: u8 = 0x80;
const SHORT_MAX: usize = 0x7F;
const LONG_MAX: usize = 0xFFFF;

/// How decoded bytes land in the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Apply {
    /// Replace destination bytes
    Overwrite,
    /// XOR into destination bytes
    Xor,
}

impl Apply {
    fn copy(self, dest: &mut [u8], src: &[u8]) {
        match self {
            Self::Overwrite => dest.copy_from_slice(src),
            Self::Xor => dest.iter_mut().zip(src).for_each(|(d, s)| *d ^= s),
        }
    }

    fn fill(self, dest: &mut [u8], value: u8) {
        match self {
            Self::Overwrite => dest.fill(value),
            Self::Xor => dest.iter_mut().for_each(|d| *d ^= value),
        }
    }
}

/// Decode `src` until `dest` is full. Returns the input bytes consumed.
pub fn decode_rle(src: &[u8], dest: &mut [u8], apply: Apply) -> Result<usize, DecodeFailure> {
    let expected = dest.len();
    let mut pos = 0;
    let mut written = 0;

    let underflow = |offset: usize, written: usize| DecodeFailure::Underflow {
        offset,
        written,
        expected,
    };

    while written < expected {
        let op = pos;
        let cmd = *src.get(pos).ok_or_else(|| underflow(pos, written))?;
        pos += 1;

        let mut run = usize::from(cmd) & SHORT_MAX;
        if run == 0 {
            let long = src.get(pos..pos + 2).ok_or_else(|| underflow(src.len(), written))?;
            run = usize::from(u16::from_le_bytes([long[0], long[1]]));
            pos += 2;
            if run == 0 {
                return Err(DecodeFailure::ZeroLengthRun { offset: op });
            }
        }

        let remaining = expected - written;
        if run > remaining {
            return Err(DecodeFailure::Overflow {
                offset: op,
                run,
                remaining,
            });
        }

        let out = &mut dest[written..written + run];
        if cmd & FILL_FLAG == 0 {
            let literal = src
                .get(pos..pos + run)
                .ok_or_else(|| underflow(src.len(), written))?;
            apply.copy(out, literal);
            pos += run;
        } else {
            let value = *src.get(pos).ok_or_else(|| underflow(pos, written))?;
            apply.fill(out, value);
            pos += 1;
        }
        written += run;
    }

    Ok(pos)
}

/// Copy a raw tile, whose extent must hold exactly `len` bytes
pub fn decode_raw(src: &[u8], len: usize) -> Result<Vec<u8>, DecodeFailure> {
    if src.len() != len {
        return Err(DecodeFailure::SizeMismatch {
            expected: len,
            actual: src.len(),
        });
    }
    Ok(src.to_vec())
}

/// Encode pixels with runs of three or more equal bytes as fills
pub fn encode_rle(pixels: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut literal_start = 0;
    let mut i = 0;

    while i < pixels.len() {
        let value = pixels[i];
        let run = pixels[i..].iter().take_while(|&&b| b == value).count();
        if run >= 3 {
            push_literal(&mut out, &pixels[literal_start..i]);
            push_fill(&mut out, value, run);
            literal_start = i + run;
        }
        i += run;
    }
    push_literal(&mut out, &pixels[literal_start..]);
    out
}

fn push_count(out: &mut Vec<u8>, flag: u8, count: usize) {
    if count <= SHORT_MAX {
        out.push(flag | count as u8);
    } else {
        out.push(flag);
        out.extend_from_slice(&(count as u16).to_le_bytes());
    }
}

fn push_literal(out: &mut Vec<u8>, literal: &[u8]) {
    for chunk in literal.chunks(LONG_MAX) {
        push_count(out, 0, chunk.len());
        out.extend_from_slice(chunk);
    }
}

fn push_fill(out: &mut Vec<u8>, value: u8, mut run: usize) {
    while run > 0 {
        let count = run.min(LONG_MAX);
        push_count(out, FILL_FLAG, count);
        out.push(value);
        run -= count;
    }
}
