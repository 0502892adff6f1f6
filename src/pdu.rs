//! SNMP PDU (protocol data unit) types.
//!
//! Every PDU shares the same wire shape — `SEQUENCE { request-id, field2,
//! field3, variable-bindings }` — with the context-specific tag on the
//! outer SEQUENCE distinguishing the operation, and `field2`/`field3`
//! reused for different purposes on `GetBulkRequest` (non-repeaters /
//! max-repetitions instead of error-status / error-index).

use crate::ber::{Decoder, EncodeBuf, tag};
use crate::error::{DecodeErrorKind, Error, ErrorStatus, Result};
use crate::varbind::{VarBind, decode_varbind_list, encode_varbind_list};

/// A decoded SNMP PDU.
#[derive(Debug, Clone, PartialEq)]
pub enum Pdu {
    /// `GetRequest` - read the named instances.
    GetRequest {
        request_id: i32,
        varbinds: Vec<VarBind>,
    },
    /// `GetNextRequest` - read the lexicographically-next instance after each named OID.
    GetNextRequest {
        request_id: i32,
        varbinds: Vec<VarBind>,
    },
    /// `GetBulkRequest` (SNMPv2c+) - batched `GetNextRequest`.
    GetBulkRequest {
        request_id: i32,
        non_repeaters: i32,
        max_repetitions: i32,
        varbinds: Vec<VarBind>,
    },
    /// `SetRequest` - write the given varbinds.
    SetRequest {
        request_id: i32,
        varbinds: Vec<VarBind>,
    },
    /// `Response` - reply to any of the above.
    Response {
        request_id: i32,
        error_status: ErrorStatus,
        error_index: u32,
        varbinds: Vec<VarBind>,
    },
}

impl Pdu {
    /// The request ID carried by every PDU variant.
    pub fn request_id(&self) -> i32 {
        match self {
            Pdu::GetRequest { request_id, .. }
            | Pdu::GetNextRequest { request_id, .. }
            | Pdu::GetBulkRequest { request_id, .. }
            | Pdu::SetRequest { request_id, .. }
            | Pdu::Response { request_id, .. } => *request_id,
        }
    }

    /// The varbind list carried by every PDU variant.
    pub fn varbinds(&self) -> &[VarBind] {
        match self {
            Pdu::GetRequest { varbinds, .. }
            | Pdu::GetNextRequest { varbinds, .. }
            | Pdu::GetBulkRequest { varbinds, .. }
            | Pdu::SetRequest { varbinds, .. }
            | Pdu::Response { varbinds, .. } => varbinds,
        }
    }

    /// Encode this PDU's outer tag and body.
    pub(crate) fn encode(&self, buf: &mut EncodeBuf) {
        match self {
            Pdu::GetRequest {
                request_id,
                varbinds,
            } => Self::encode_request(buf, tag::pdu::GET_REQUEST, *request_id, varbinds),
            Pdu::GetNextRequest {
                request_id,
                varbinds,
            } => Self::encode_request(buf, tag::pdu::GET_NEXT_REQUEST, *request_id, varbinds),
            Pdu::SetRequest {
                request_id,
                varbinds,
            } => Self::encode_request(buf, tag::pdu::SET_REQUEST, *request_id, varbinds),
            Pdu::GetBulkRequest {
                request_id,
                non_repeaters,
                max_repetitions,
                varbinds,
            } => {
                buf.push_constructed(tag::pdu::GET_BULK_REQUEST, |buf| {
                    encode_varbind_list(buf, varbinds);
                    buf.push_integer(*max_repetitions);
                    buf.push_integer(*non_repeaters);
                    buf.push_integer(*request_id);
                });
            }
            Pdu::Response {
                request_id,
                error_status,
                error_index,
                varbinds,
            } => {
                buf.push_constructed(tag::pdu::RESPONSE, |buf| {
                    encode_varbind_list(buf, varbinds);
                    buf.push_integer(*error_index as i32);
                    buf.push_integer(error_status.as_i32());
                    buf.push_integer(*request_id);
                });
            }
        }
    }

    fn encode_request(buf: &mut EncodeBuf, tag: u8, request_id: i32, varbinds: &[VarBind]) {
        buf.push_constructed(tag, |buf| {
            encode_varbind_list(buf, varbinds);
            buf.push_integer(0); // error-index (unused on requests)
            buf.push_integer(0); // error-status (unused on requests)
            buf.push_integer(request_id);
        });
    }

    /// Decode a PDU from a `(tag, sub-decoder)` pair produced by
    /// [`Decoder::read_constructed_any`].
    pub(crate) fn decode(wire_tag: u8, decoder: &mut Decoder) -> Result<Self> {
        let request_id = decoder.read_integer()?;
        let field2 = decoder.read_integer()?;
        let field3 = decoder.read_integer()?;
        let varbinds = decode_varbind_list(decoder)?;

        match wire_tag {
            t if t == tag::pdu::GET_REQUEST => Ok(Pdu::GetRequest {
                request_id,
                varbinds,
            }),
            t if t == tag::pdu::GET_NEXT_REQUEST => Ok(Pdu::GetNextRequest {
                request_id,
                varbinds,
            }),
            t if t == tag::pdu::SET_REQUEST => Ok(Pdu::SetRequest {
                request_id,
                varbinds,
            }),
            t if t == tag::pdu::GET_BULK_REQUEST => Ok(Pdu::GetBulkRequest {
                request_id,
                non_repeaters: field2,
                max_repetitions: field3,
                varbinds,
            }),
            t if t == tag::pdu::RESPONSE => {
                if field3 < 0 {
                    return Err(Error::decode(0, DecodeErrorKind::UnknownPduType(wire_tag)));
                }
                Ok(Pdu::Response {
                    request_id,
                    error_status: ErrorStatus::from_i32(field2),
                    error_index: field3 as u32,
                    varbinds,
                })
            }
            other => Err(Error::decode(0, DecodeErrorKind::UnknownPduType(other))),
        }
    }
}
