//! SNMP message envelope.
//!
//! `SEQUENCE { version INTEGER, community OCTET STRING, pdu [n] {...} }` —
//! the v1/v2c community-based message format (RFC 1157 / RFC 1901). There
//! is no v3 variant: this crate speaks community-based SNMP only.

use bytes::Bytes;

use crate::ber::{Decoder, EncodeBuf};
use crate::error::{DecodeErrorKind, Error, Result};
use crate::pdu::Pdu;
use crate::version::Version;

/// A full SNMP message: version, community string, and PDU.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub version: Version,
    pub community: Bytes,
    pub pdu: Pdu,
}

impl Message {
    /// Build a new message.
    pub fn new(version: Version, community: impl Into<Bytes>, pdu: Pdu) -> Self {
        Self {
            version,
            community: community.into(),
            pdu,
        }
    }

    /// Encode to a BER byte string ready to send on the wire.
    pub fn encode(&self) -> Bytes {
        let mut buf = EncodeBuf::new();
        buf.push_sequence(|buf| {
            self.pdu.encode(buf);
            buf.push_octet_string(&self.community);
            buf.push_integer(self.version.as_i32());
        });
        buf.finish()
    }

    /// Decode a message from a received datagram.
    pub fn decode(data: impl Into<Bytes>) -> Result<Self> {
        let mut decoder = Decoder::new(data.into());
        let mut seq = decoder.read_sequence()?;
        let version_raw = seq.read_integer()?;
        let version = Version::from_i32(version_raw)
            .ok_or_else(|| Error::decode(0, DecodeErrorKind::UnknownVersion(version_raw)))?;
        let community = seq.read_octet_string()?;
        let (wire_tag, mut pdu_decoder) = seq.read_constructed_any()?;
        let pdu = Pdu::decode(wire_tag, &mut pdu_decoder)?;
        Ok(Self {
            version,
            community,
            pdu,
        })
    }
}
