//! BER decoding.
//!
//! A [`Decoder`] walks a BER-encoded byte string TLV by TLV. Unlike
//! [`super::encode::EncodeBuf`], there's no reverse-buffer trick needed here:
//! decoding reads forward directly.

use bytes::Bytes;

use super::tag;
use super::length::decode_length;
use crate::error::{DecodeErrorKind, Error};
use crate::oid::Oid;

/// A cursor over a BER-encoded byte string.
#[derive(Debug, Clone)]
pub struct Decoder {
    data: Bytes,
}

impl Decoder {
    /// Wrap a byte string for decoding.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    /// True if no more bytes remain.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Remaining byte count.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Peek the next tag byte without consuming it.
    pub fn peek_tag(&self) -> Result<u8, Error> {
        self.data
            .first()
            .copied()
            .ok_or_else(|| Error::decode(0, DecodeErrorKind::EmptyResponse))
    }

    /// Read one TLV, returning its tag and content bytes. Advances past it.
    pub fn read_tlv(&mut self) -> Result<(u8, Bytes), Error> {
        if self.data.is_empty() {
            return Err(Error::decode(0, DecodeErrorKind::TruncatedData));
        }
        let tag = self.data[0];
        let (length, length_size) = decode_length(&self.data[1..])?;
        let header_len = 1 + length_size;
        if self.data.len() < header_len + length {
            return Err(Error::decode(
                0,
                DecodeErrorKind::InsufficientData {
                    needed: header_len + length,
                    available: self.data.len(),
                },
            ));
        }
        let content = self.data.slice(header_len..header_len + length);
        self.data = self.data.slice(header_len + length..);
        Ok((tag, content))
    }

    /// Read a TLV and require its tag to equal `expected`.
    pub fn read_tagged(&mut self, expected: u8) -> Result<Bytes, Error> {
        let (tag, content) = self.read_tlv()?;
        if tag != expected {
            return Err(Error::decode(
                0,
                DecodeErrorKind::UnexpectedTag {
                    expected,
                    actual: tag,
                },
            ));
        }
        Ok(content)
    }

    /// Read a SEQUENCE and return a sub-decoder over its content.
    pub fn read_sequence(&mut self) -> Result<Decoder, Error> {
        let content = self.read_tagged(tag::universal::SEQUENCE)?;
        Ok(Decoder::new(content))
    }

    /// Read any constructed TLV (used for PDU bodies, whose tag varies by
    /// operation) and return a sub-decoder over its content plus the tag seen.
    pub fn read_constructed_any(&mut self) -> Result<(u8, Decoder), Error> {
        let (tag, content) = self.read_tlv()?;
        if !tag::is_constructed(tag) {
            return Err(Error::decode(
                0,
                DecodeErrorKind::UnexpectedTag {
                    expected: tag::CONSTRUCTED,
                    actual: tag,
                },
            ));
        }
        Ok((tag, Decoder::new(content)))
    }

    /// Read an INTEGER.
    pub fn read_integer(&mut self) -> Result<i32, Error> {
        let content = self.read_tagged(tag::universal::INTEGER)?;
        decode_signed(&content)
    }

    /// Read an application-tagged unsigned 32-bit value (Counter32, Gauge32,
    /// TimeTicks) expecting a specific tag.
    pub fn read_unsigned32(&mut self, expected_tag: u8) -> Result<u32, Error> {
        let content = self.read_tagged(expected_tag)?;
        decode_unsigned32(&content)
    }

    /// Read a Counter64.
    pub fn read_integer64(&mut self) -> Result<u64, Error> {
        let content = self.read_tagged(tag::application::COUNTER64)?;
        decode_unsigned64(&content)
    }

    /// Read an OCTET STRING.
    pub fn read_octet_string(&mut self) -> Result<Bytes, Error> {
        if self.peek_tag()? == tag::universal::OCTET_STRING_CONSTRUCTED {
            return Err(Error::decode(0, DecodeErrorKind::ConstructedOctetString));
        }
        self.read_tagged(tag::universal::OCTET_STRING)
    }

    /// Read an Opaque value.
    pub fn read_opaque(&mut self) -> Result<Bytes, Error> {
        self.read_tagged(tag::application::OPAQUE)
    }

    /// Read a NULL.
    pub fn read_null(&mut self) -> Result<(), Error> {
        let content = self.read_tagged(tag::universal::NULL)?;
        if !content.is_empty() {
            return Err(Error::decode(0, DecodeErrorKind::InvalidNull));
        }
        Ok(())
    }

    /// Read an IP address.
    pub fn read_ip_address(&mut self) -> Result<[u8; 4], Error> {
        let content = self.read_tagged(tag::application::IP_ADDRESS)?;
        if content.len() != 4 {
            return Err(Error::decode(
                0,
                DecodeErrorKind::InvalidIpAddressLength {
                    length: content.len(),
                },
            ));
        }
        Ok([content[0], content[1], content[2], content[3]])
    }

    /// Read an OBJECT IDENTIFIER.
    pub fn read_oid(&mut self) -> Result<Oid, Error> {
        let content = self.read_tagged(tag::universal::OBJECT_IDENTIFIER)?;
        Oid::from_ber(&content)
    }
}

fn decode_signed(bytes: &[u8]) -> Result<i32, Error> {
    if bytes.is_empty() {
        return Err(Error::decode(0, DecodeErrorKind::ZeroLengthInteger));
    }
    if bytes.len() > 4 {
        return Err(Error::decode(0, DecodeErrorKind::IntegerOverflow));
    }
    let negative = bytes[0] & 0x80 != 0;
    let mut value: i64 = if negative { -1 } else { 0 };
    for &b in bytes {
        value = (value << 8) | b as i64;
    }
    if value < i32::MIN as i64 || value > i32::MAX as i64 {
        return Err(Error::decode(0, DecodeErrorKind::IntegerOverflow));
    }
    Ok(value as i32)
}

fn decode_unsigned32(bytes: &[u8]) -> Result<u32, Error> {
    if bytes.is_empty() {
        return Err(Error::decode(0, DecodeErrorKind::ZeroLengthInteger));
    }
    if bytes.len() > 5 {
        return Err(Error::decode(0, DecodeErrorKind::IntegerOverflow));
    }
    let mut value: u64 = 0;
    for &b in bytes {
        value = (value << 8) | b as u64;
    }
    if value > u32::MAX as u64 {
        return Err(Error::decode(0, DecodeErrorKind::IntegerOverflow));
    }
    Ok(value as u32)
}

fn decode_unsigned64(bytes: &[u8]) -> Result<u64, Error> {
    if bytes.is_empty() {
        return Err(Error::decode(0, DecodeErrorKind::ZeroLengthInteger));
    }
    if bytes.len() > 9 {
        return Err(Error::decode(
            0,
            DecodeErrorKind::Integer64TooLong { length: bytes.len() },
        ));
    }
    let mut value: u64 = 0;
    for &b in bytes {
        value = (value << 8) | b as u64;
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ber::encode::EncodeBuf;

    #[test]
    fn integer_roundtrip() {
        for v in [0, 1, -1, 127, 128, -128, -129, i32::MAX, i32::MIN] {
            let mut buf = EncodeBuf::new();
            buf.push_integer(v);
            let bytes = buf.finish();
            let mut dec = Decoder::new(bytes);
            assert_eq!(dec.read_integer().unwrap(), v);
        }
    }

    #[test]
    fn octet_string_roundtrip() {
        let mut buf = EncodeBuf::new();
        buf.push_octet_string(b"hello world");
        let bytes = buf.finish();
        let mut dec = Decoder::new(bytes);
        assert_eq!(&dec.read_octet_string().unwrap()[..], b"hello world");
    }

    #[test]
    fn null_roundtrip() {
        let mut buf = EncodeBuf::new();
        buf.push_null();
        let bytes = buf.finish();
        let mut dec = Decoder::new(bytes);
        dec.read_null().unwrap();
    }

    #[test]
    fn oid_roundtrip() {
        let id = Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1, 1, 0]);
        let mut buf = EncodeBuf::new();
        buf.push_oid(&id);
        let bytes = buf.finish();
        let mut dec = Decoder::new(bytes);
        assert_eq!(dec.read_oid().unwrap(), id);
    }

    #[test]
    fn ip_address_roundtrip() {
        let mut buf = EncodeBuf::new();
        buf.push_ip_address([192, 168, 1, 1]);
        let bytes = buf.finish();
        let mut dec = Decoder::new(bytes);
        assert_eq!(dec.read_ip_address().unwrap(), [192, 168, 1, 1]);
    }

    #[test]
    fn constructed_octet_string_rejected() {
        // Manually craft a constructed OCTET STRING TLV (tag 0x24, len 0).
        let bytes = Bytes::from_static(&[0x24, 0x00]);
        let mut dec = Decoder::new(bytes);
        assert!(dec.read_octet_string().is_err());
    }

    #[test]
    fn truncated_data_errors() {
        let bytes = Bytes::from_static(&[0x02, 0x05, 0x01]);
        let mut dec = Decoder::new(bytes);
        assert!(dec.read_integer().is_err());
    }
}
