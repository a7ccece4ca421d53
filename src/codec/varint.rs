//! Varint codec
//!
//! Base-128 little-endian unsigned integers: 7 value bits per byte, high bit
//! set when more bytes follow.

use std::io::{self, Read};

use bytes::BufMut;

/// A `u64` never needs more than 10 septets
pub const MAX_VARINT_LEN: usize = 10;

/// Encode a value into a fresh buffer
pub fn encode(value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(encoded_len(value));
    encode_into(value, &mut out);
    out
}

/// Append the encoding of `value` to any `BufMut`
pub fn encode_into<B: BufMut>(mut value: u64, buf: &mut B) {
    while value >= 0x80 {
        buf.put_u8((value as u8 & 0x7F) | 0x80);
        value >>= 7;
    }
    buf.put_u8(value as u8);
}

/// Encode `value` using exactly `width` bytes.
///
/// Extra bytes are continuation bytes carrying zero septets, which every
/// decoder in this crate reads back as the same value. Returns `None` when the
/// value does not fit in `width` bytes.
pub fn encode_padded(mut value: u64, width: usize) -> Option<Vec<u8>> {
    if width == 0 || width > MAX_VARINT_LEN || encoded_len(value) > width {
        return None;
    }

    let mut out = Vec::with_capacity(width);
    for i in 0..width {
        let septet = value as u8 & 0x7F;
        value >>= 7;
        if i + 1 == width {
            out.push(septet);
        } else {
            out.push(septet | 0x80);
        }
    }
    Some(out)
}

/// Number of bytes the canonical encoding of `value` takes
pub fn encoded_len(value: u64) -> usize {
    let bits = 64 - value.leading_zeros() as usize;
    bits.max(1).div_ceil(7)
}

/// Decode a varint starting at `start`.
///
/// Returns `(value, bytes_consumed)`. Reading stops at the first byte with the
/// continuation bit clear, at the end of `buf`, or after `MAX_VARINT_LEN`
/// bytes, whichever comes first; whatever was accumulated is returned.
pub fn decode(buf: &[u8], start: usize) -> (u64, usize) {
    let mut value = 0u64;
    let mut consumed = 0usize;

    for (i, &byte) in buf.iter().skip(start).take(MAX_VARINT_LEN).enumerate() {
        value |= u64::from(byte & 0x7F) << (7 * i);
        consumed += 1;
        if byte & 0x80 == 0 {
            break;
        }
    }

    (value, consumed)
}

/// Strict variant of [`decode`]: `None` unless a terminating byte is found
/// within `MAX_VARINT_LEN` bytes of `start`.
pub fn try_decode(buf: &[u8], start: usize) -> Option<(u64, usize)> {
    let (value, consumed) = decode(buf, start);
    let last = *buf.get(start + consumed.checked_sub(1)?)?;
    if last & 0x80 == 0 {
        Some((value, consumed))
    } else {
        None
    }
}

/// Read one varint from a stream, consuming at most `MAX_VARINT_LEN` bytes.
///
/// Returns `Ok(None)` on a clean end of stream (no bytes available). A stream
/// that ends mid-varint yields the partial value, mirroring [`decode`].
pub fn read_from<R: Read>(reader: &mut R) -> io::Result<Option<(u64, usize)>> {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let mut filled = 0;

    while filled < MAX_VARINT_LEN {
        let mut byte = [0u8; 1];
        match reader.read(&mut byte) {
            Ok(0) => break,
            Ok(_) => {
                buf[filled] = byte[0];
                filled += 1;
                if byte[0] & 0x80 == 0 {
                    break;
                }
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    if filled == 0 {
        return Ok(None);
    }
    Ok(Some(decode(&buf[..filled], 0)))
}
