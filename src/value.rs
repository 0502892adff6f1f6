//! SNMP value type.
//!
//! A tagged variant over every SNMP base type plus the three PDU exception
//! markers. Type information is carried on the wire by the BER tag and is
//! never inferred by anything above [`crate::ber`] — if a tag can't be
//! mapped to one of these arms, decoding fails rather than guessing.

use std::fmt;

use bytes::Bytes;

use crate::oid::Oid;

/// An SNMP value, tagged by its wire type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// INTEGER.
    Integer(i32),
    /// OCTET STRING.
    OctetString(Bytes),
    /// OBJECT IDENTIFIER.
    ObjectIdentifier(Oid),
    /// Application-tagged 32-bit counter (monotonically increasing, wraps).
    Counter32(u32),
    /// Application-tagged 32-bit gauge (non-negative, may decrease).
    Gauge32(u32),
    /// Application-tagged time ticks (hundredths of a second since some epoch).
    TimeTicks(u32),
    /// Application-tagged IPv4 address.
    IpAddress([u8; 4]),
    /// Application-tagged opaque blob (arbitrary nested ASN.1, uninterpreted).
    Opaque(Bytes),
    /// Application-tagged 64-bit counter (SNMPv2c+).
    Counter64(u64),
    /// NULL (used for the value half of a GET request varbind).
    Null,
    /// Exception: the named object type doesn't exist at this agent.
    NoSuchObject,
    /// Exception: the object type exists but this instance doesn't.
    NoSuchInstance,
    /// Exception: no further objects exist in the requested direction (GETBULK/GETNEXT).
    EndOfMibView,
}

impl Value {
    /// True for the three PDU exception markers.
    pub fn is_exception(&self) -> bool {
        matches!(
            self,
            Value::NoSuchObject | Value::NoSuchInstance | Value::EndOfMibView
        )
    }

    /// Encode to BER.
    pub(crate) fn encode(&self, buf: &mut crate::ber::EncodeBuf) {
        use crate::ber::tag;
        match self {
            Value::Integer(v) => buf.push_integer(*v),
            Value::OctetString(v) => buf.push_octet_string(v),
            Value::ObjectIdentifier(v) => buf.push_oid(v),
            Value::Counter32(v) => buf.push_unsigned32(tag::application::COUNTER32, *v),
            Value::Gauge32(v) => buf.push_unsigned32(tag::application::GAUGE32, *v),
            Value::TimeTicks(v) => buf.push_unsigned32(tag::application::TIMETICKS, *v),
            Value::IpAddress(v) => buf.push_ip_address(*v),
            Value::Opaque(v) => buf.push_opaque(v),
            Value::Counter64(v) => buf.push_integer64(*v),
            Value::Null => buf.push_null(),
            Value::NoSuchObject => buf.push_exception(tag::context::NO_SUCH_OBJECT),
            Value::NoSuchInstance => buf.push_exception(tag::context::NO_SUCH_INSTANCE),
            Value::EndOfMibView => buf.push_exception(tag::context::END_OF_MIB_VIEW),
        }
    }

    /// Decode from BER. The tag determines which variant is produced; an
    /// unrecognized tag is a [`crate::error::Error::Decode`] with
    /// [`crate::error::DecodeErrorKind::TypeInformationLost`] rather than a guess.
    pub(crate) fn decode(decoder: &mut crate::ber::Decoder) -> crate::error::Result<Self> {
        use crate::ber::tag;
        use crate::error::{DecodeErrorKind, Error};

        let wire_tag = decoder.peek_tag()?;
        match wire_tag {
            t if t == tag::universal::INTEGER => Ok(Value::Integer(decoder.read_integer()?)),
            t if t == tag::universal::OCTET_STRING => {
                Ok(Value::OctetString(decoder.read_octet_string()?))
            }
            t if t == tag::universal::OBJECT_IDENTIFIER => {
                Ok(Value::ObjectIdentifier(decoder.read_oid()?))
            }
            t if t == tag::universal::NULL => {
                decoder.read_null()?;
                Ok(Value::Null)
            }
            t if t == tag::application::COUNTER32 => {
                Ok(Value::Counter32(decoder.read_unsigned32(t)?))
            }
            t if t == tag::application::GAUGE32 => {
                Ok(Value::Gauge32(decoder.read_unsigned32(t)?))
            }
            t if t == tag::application::TIMETICKS => {
                Ok(Value::TimeTicks(decoder.read_unsigned32(t)?))
            }
            t if t == tag::application::IP_ADDRESS => {
                Ok(Value::IpAddress(decoder.read_ip_address()?))
            }
            t if t == tag::application::OPAQUE => Ok(Value::Opaque(decoder.read_opaque()?)),
            t if t == tag::application::COUNTER64 => {
                Ok(Value::Counter64(decoder.read_integer64()?))
            }
            t if t == tag::context::NO_SUCH_OBJECT => {
                decoder.read_tlv()?;
                Ok(Value::NoSuchObject)
            }
            t if t == tag::context::NO_SUCH_INSTANCE => {
                decoder.read_tlv()?;
                Ok(Value::NoSuchInstance)
            }
            t if t == tag::context::END_OF_MIB_VIEW => {
                decoder.read_tlv()?;
                Ok(Value::EndOfMibView)
            }
            _ => Err(Error::decode(0, DecodeErrorKind::TypeInformationLost)),
        }
    }

    /// A short machine-readable type tag, used by enrichment (`type` field)
    /// and CLI-adjacent formatting.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "integer",
            Value::OctetString(_) => "octet_string",
            Value::ObjectIdentifier(_) => "object_identifier",
            Value::Counter32(_) => "counter32",
            Value::Gauge32(_) => "gauge32",
            Value::TimeTicks(_) => "timeticks",
            Value::IpAddress(_) => "ip_address",
            Value::Opaque(_) => "opaque",
            Value::Counter64(_) => "counter64",
            Value::Null => "null",
            Value::NoSuchObject => "no_such_object",
            Value::NoSuchInstance => "no_such_instance",
            Value::EndOfMibView => "end_of_mib_view",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(v) => write!(f, "{}", v),
            Value::OctetString(v) => write!(f, "{:?}", v),
            Value::ObjectIdentifier(v) => write!(f, "{}", v),
            Value::Counter32(v) => write!(f, "{}", v),
            Value::Gauge32(v) => write!(f, "{}", v),
            Value::TimeTicks(v) => write!(f, "{}", v),
            Value::IpAddress(v) => write!(f, "{}.{}.{}.{}", v[0], v[1], v[2], v[3]),
            Value::Opaque(v) => write!(f, "Opaque({} bytes)", v.len()),
            Value::Counter64(v) => write!(f, "{}", v),
            Value::Null => write!(f, "NULL"),
            Value::NoSuchObject => write!(f, "noSuchObject"),
            Value::NoSuchInstance => write!(f, "noSuchInstance"),
            Value::EndOfMibView => write!(f, "endOfMibView"),
        }
    }
}
