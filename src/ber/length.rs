//! BER length octet encoding/decoding (X.690 §8.1.3).

use crate::error::{DecodeErrorKind, Error};

/// Maximum length value accepted when decoding (32 MiB).
///
/// SNMP datagrams are bounded by UDP's practical size; anything claiming
/// to be larger than this is almost certainly corrupt or hostile input.
pub const MAX_DECODE_LENGTH: usize = 32 * 1024 * 1024;

/// Encode a BER length into up to 5 bytes, returned in **reverse** order
/// (ready to be pushed byte-by-byte onto [`super::encode::EncodeBuf`]'s
/// reverse buffer) along with the valid byte count.
pub fn encode_length(len: usize) -> ([u8; 5], usize) {
    if len < 0x80 {
        // Short form: single byte, high bit clear.
        return ([len as u8, 0, 0, 0, 0], 1);
    }

    let bytes = (len as u64).to_be_bytes();
    let mut start = 0;
    while start < 7 && bytes[start] == 0 {
        start += 1;
    }
    let content_len = 8 - start;
    let mut out = [0u8; 5];
    // Reverse order: content bytes first (most-significant-first reversed),
    // then the length-of-length byte last so it ends up first after the
    // caller's final buffer reversal.
    for (i, b) in bytes[start..].iter().rev().enumerate() {
        out[i] = *b;
    }
    out[content_len] = 0x80 | (content_len as u8);
    (out, content_len + 1)
}

/// Decode a BER length field starting at `data[0]`.
///
/// Returns `(length, bytes_consumed)`. Indefinite length (0x80) is rejected;
/// SNMP never uses it.
pub fn decode_length(data: &[u8]) -> Result<(usize, usize), Error> {
    let first = *data
        .first()
        .ok_or_else(|| Error::decode(0, DecodeErrorKind::TruncatedData))?;

    if first & 0x80 == 0 {
        return Ok((first as usize, 1));
    }

    let num_octets = (first & 0x7F) as usize;
    if num_octets == 0 {
        return Err(Error::decode(0, DecodeErrorKind::IndefiniteLength));
    }
    if num_octets > 4 {
        return Err(Error::decode(
            0,
            DecodeErrorKind::LengthTooLong { octets: num_octets },
        ));
    }
    if data.len() < 1 + num_octets {
        return Err(Error::decode(0, DecodeErrorKind::TruncatedData));
    }

    let mut length: usize = 0;
    for &b in &data[1..1 + num_octets] {
        length = (length << 8) | b as usize;
    }

    if length > MAX_DECODE_LENGTH {
        return Err(Error::decode(
            0,
            DecodeErrorKind::LengthExceedsMax {
                length,
                max: MAX_DECODE_LENGTH,
            },
        ));
    }

    Ok((length, 1 + num_octets))
}
