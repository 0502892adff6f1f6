//! SNMP client: configuration and the core request operations (C4 façade).
//!
//! [`Client`] pairs a [`Transport`] with a [`ClientConfig`] and drives each
//! call through [`crate::session::PduSession`]. It is cheap to clone (the
//! transport is `Arc`-backed and the config is small), which lets [`Walk`]/
//! [`BulkWalk`] own their own copy while iterating.

mod builder;
mod walk;

pub use builder::{V1ClientBuilder, V2cClientBuilder};
pub use walk::{BulkWalk, Walk, WalkTable};

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;

use crate::error::{Error, ErrorStatus, ExceptionKind, Result};
use crate::oid::Oid;
use crate::pdu::Pdu;
use crate::request_id::RequestIdAllocator;
use crate::session::{PduSession, SessionConfig};
use crate::transport::Transport;
use crate::value::Value;
use crate::varbind::VarBind;
use crate::version::Version;

/// Per-client configuration: protocol version, community, and the
/// timing/batching knobs [`crate::session::PduSession`] reads from.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ClientConfig {
    /// SNMP version to speak.
    pub version: Version,
    /// Community string sent with every message.
    pub community: Bytes,
    /// Per-attempt timeout waiting for a response.
    pub timeout: Duration,
    /// Retries on timeout, in addition to the first attempt.
    pub retries: u32,
    /// Maximum OIDs batched into a single GET/GETNEXT/GETBULK request by
    /// higher-level helpers (the orchestrator splits larger batches).
    pub max_oids_per_request: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            version: Version::default(),
            community: Bytes::from_static(b"public"),
            timeout: Duration::from_secs(5),
            retries: 3,
            max_oids_per_request: 10,
        }
    }
}

/// An SNMP client bound to one target over a given transport.
///
/// Construct via [`Client::v1()`]/[`Client::v2c()`] for an owned UDP socket,
/// or [`Client::new()`] to supply any [`Transport`] (e.g. a
/// [`SharedUdpHandle`](crate::transport::SharedUdpHandle)).
pub struct Client<T: Transport> {
    transport: T,
    config: ClientConfig,
    /// Shared across clones so concurrent operations spawned off the same
    /// client (e.g. a walk's per-step futures) never collide on request IDs.
    request_ids: Arc<RequestIdAllocator>,
}

impl<T: Transport> Clone for Client<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            config: self.config.clone(),
            request_ids: Arc::clone(&self.request_ids),
        }
    }
}

impl<T: Transport> Client<T> {
    /// Build a client from an already-constructed transport and config.
    pub fn new(transport: T, config: ClientConfig) -> Self {
        Self {
            transport,
            config,
            request_ids: Arc::new(RequestIdAllocator::new_with_entropy()),
        }
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The remote address this client sends requests to.
    pub fn target(&self) -> std::net::SocketAddr {
        self.transport.peer_addr()
    }

    fn session(&self) -> PduSession<'_, T> {
        PduSession::new(
            &self.transport,
            SessionConfig {
                version: self.config.version,
                community: self.config.community.clone(),
                timeout: self.config.timeout,
                retries: self.config.retries,
            },
            &self.request_ids,
        )
    }

    /// Check the response PDU's error-status and raise [`Error::Snmp`] if
    /// the agent reported one.
    fn check_error_status(&self, response: &Pdu) -> Result<()> {
        if let Pdu::Response {
            error_status,
            error_index,
            varbinds,
            ..
        } = response
        {
            if *error_status != ErrorStatus::NoError {
                let oid = varbinds
                    .get((*error_index as usize).saturating_sub(1))
                    .map(|vb| vb.oid.clone());
                return Err(Error::Snmp {
                    target: Some(self.transport.peer_addr()),
                    status: *error_status,
                    index: *error_index,
                    oid,
                });
            }
        }
        Ok(())
    }

    /// Reject a single-value op's varbind if it's an exception marker
    /// (§7: exceptions are varbind values for multi-value ops, but errors
    /// for single-value ops).
    fn reject_exception(vb: VarBind) -> Result<VarBind> {
        let kind = match vb.value {
            Value::NoSuchObject => ExceptionKind::NoSuchObject,
            Value::NoSuchInstance => ExceptionKind::NoSuchInstance,
            Value::EndOfMibView => ExceptionKind::EndOfMibView,
            _ => return Ok(vb),
        };
        Err(Error::VarbindException { oid: vb.oid, kind })
    }

    /// GET a single OID's value.
    pub async fn get(&self, oid: &Oid) -> Result<VarBind> {
        let results = self.get_many(std::slice::from_ref(oid)).await?;
        let vb = results.into_iter().next().ok_or(Error::InvalidInstance)?;
        Self::reject_exception(vb)
    }

    /// GET several OIDs' values in a single request.
    pub async fn get_many(&self, oids: &[Oid]) -> Result<Vec<VarBind>> {
        let normalized: Vec<Oid> = oids.iter().cloned().map(Oid::normalized).collect();
        let response = self
            .session()
            .execute(|request_id| Pdu::GetRequest {
                request_id,
                varbinds: normalized.iter().cloned().map(VarBind::null).collect(),
            })
            .await?;
        self.check_error_status(&response)?;
        Ok(response.varbinds().to_vec())
    }

    /// GETNEXT: retrieve the varbind whose OID lexicographically follows `oid`.
    ///
    /// For v2c this is emitted as GETBULK with `max_repetitions=1` and the
    /// first (only) returned varbind is extracted; for v1 a true GETNEXT
    /// PDU is sent. Both forms produce the same `(next_oid, value)` shape.
    ///
    /// Exception varbinds (`no_such_object`/`no_such_instance`/
    /// `end_of_mib_view`) are raised as [`Error::VarbindException`], since
    /// this is a single-value op (§7). [`Walk`]/[`BulkWalk`] use
    /// [`Client::get_next_raw`] instead, which leaves exceptions in the
    /// varbind for the walk's own termination logic to interpret.
    pub async fn get_next(&self, oid: &Oid) -> Result<VarBind> {
        let vb = self.get_next_raw(oid).await?;
        Self::reject_exception(vb)
    }

    /// Like [`Client::get_next`], but returns exception varbinds as values
    /// rather than errors. Used internally by the walk streams, which need
    /// to see `end_of_mib_view`/`no_such_object`/`no_such_instance` to
    /// decide how the walk terminates.
    pub(crate) async fn get_next_raw(&self, oid: &Oid) -> Result<VarBind> {
        let normalized = oid.clone().normalized();
        let response = match self.config.version {
            Version::V1 => {
                self.session()
                    .execute(|request_id| Pdu::GetNextRequest {
                        request_id,
                        varbinds: vec![VarBind::null(normalized.clone())],
                    })
                    .await?
            }
            Version::V2c => {
                self.session()
                    .execute(|request_id| Pdu::GetBulkRequest {
                        request_id,
                        non_repeaters: 0,
                        max_repetitions: 1,
                        varbinds: vec![VarBind::null(normalized.clone())],
                    })
                    .await?
            }
        };
        self.check_error_status(&response)?;
        response.varbinds().first().cloned().ok_or_else(|| {
            Error::decode(0, crate::error::DecodeErrorKind::EmptyResponse)
        })
    }

    /// GETBULK: retrieve up to `max_repetitions` successors per OID.
    ///
    /// Returns [`Error::GetBulkRequiresV2c`] without sending a packet when
    /// the client is configured for v1.
    pub async fn get_bulk(
        &self,
        oids: &[Oid],
        non_repeaters: i32,
        max_repetitions: i32,
    ) -> Result<Vec<VarBind>> {
        if self.config.version != Version::V2c {
            return Err(Error::GetBulkRequiresV2c);
        }
        let normalized: Vec<Oid> = oids.iter().cloned().map(Oid::normalized).collect();
        let response = self
            .session()
            .execute(|request_id| Pdu::GetBulkRequest {
                request_id,
                non_repeaters,
                max_repetitions,
                varbinds: normalized.iter().cloned().map(VarBind::null).collect(),
            })
            .await?;
        self.check_error_status(&response)?;
        Ok(response.varbinds().to_vec())
    }

    /// SET one or more varbinds.
    pub async fn set(&self, varbinds: Vec<VarBind>) -> Result<Vec<VarBind>> {
        let normalized: Vec<VarBind> = varbinds
            .into_iter()
            .map(|vb| VarBind::new(vb.oid.normalized(), vb.value))
            .collect();
        let response = self
            .session()
            .execute(|request_id| Pdu::SetRequest {
                request_id,
                varbinds: normalized.clone(),
            })
            .await?;
        self.check_error_status(&response)?;
        Ok(response.varbinds().to_vec())
    }

    /// Set a single OID to a value.
    pub async fn set_one(&self, oid: Oid, value: Value) -> Result<VarBind> {
        let results = self.set(vec![VarBind::new(oid, value)]).await?;
        let vb = results.into_iter().next().ok_or(Error::InvalidInstance)?;
        Self::reject_exception(vb)
    }
}

impl<T: Transport + 'static> Client<T> {
    /// Walk the subtree rooted at `oid` using GETNEXT.
    ///
    /// Returns a [`Walk`] stream; chain `.strict(true)` or `.limit(n)`
    /// before polling to change its defaults.
    pub fn walk(&self, oid: Oid) -> Walk<T> {
        Walk::new(self.clone(), oid)
    }

    /// Walk the subtree rooted at `oid` using GETBULK with the given
    /// `max_repetitions` per request.
    ///
    /// Returns a [`BulkWalk`] stream; chain `.strict(true)` or `.limit(n)`
    /// before polling to change its defaults.
    pub fn bulk_walk(&self, oid: Oid, max_repetitions: i32) -> BulkWalk<T> {
        BulkWalk::new(self.clone(), oid, max_repetitions)
    }

    /// Walk a conceptual MIB table rooted at `table_oid` using GETBULK.
    pub fn walk_table(&self, table_oid: Oid, max_repetitions: i32) -> WalkTable<T> {
        WalkTable::new(self.clone(), table_oid, max_repetitions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;
    use crate::transport::{MockTransport, ResponseBuilder};

    fn mock_client(mock: MockTransport, version: Version) -> Client<MockTransport> {
        Client::new(
            mock,
            ClientConfig {
                version,
                community: Bytes::from_static(b"public"),
                timeout: Duration::from_secs(1),
                retries: 0,
                max_oids_per_request: 10,
            },
        )
    }

    #[tokio::test]
    async fn get_returns_value_on_success() {
        let mut mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
        mock.queue_response(
            ResponseBuilder::new(1)
                .varbind(
                    oid!(1, 3, 6, 1, 2, 1, 1, 1, 0),
                    Value::OctetString(Bytes::from_static(b"Test Device")),
                )
                .build_v2c(b"public"),
        );
        let client = mock_client(mock, Version::V2c);
        let vb = client.get(&oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)).await.unwrap();
        assert_eq!(vb.value, Value::OctetString(Bytes::from_static(b"Test Device")));
    }

    #[tokio::test]
    async fn get_rejects_no_such_instance_as_error() {
        let mut mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
        mock.queue_response(
            ResponseBuilder::new(1)
                .varbind(oid!(1, 3, 6, 1, 2, 1, 1, 1, 1), Value::NoSuchInstance)
                .build_v2c(b"public"),
        );
        let client = mock_client(mock, Version::V2c);
        let err = client
            .get(&oid!(1, 3, 6, 1, 2, 1, 1, 1, 1))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::VarbindException {
                kind: ExceptionKind::NoSuchInstance,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn get_bulk_on_v1_fails_without_sending() {
        let mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
        let client = mock_client(mock.clone(), Version::V1);
        let err = client
            .get_bulk(&[oid!(1, 3, 6, 1, 2, 1, 2)], 0, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::GetBulkRequiresV2c));
        assert_eq!(mock.sent_count(), 0);
    }

    #[tokio::test]
    async fn get_next_raw_preserves_end_of_mib_view() {
        let mut mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
        mock.queue_response(
            ResponseBuilder::new(1)
                .varbind(oid!(1, 3, 6, 1, 2, 1, 1, 9), Value::EndOfMibView)
                .build_v2c(b"public"),
        );
        let client = mock_client(mock, Version::V2c);
        let vb = client
            .get_next_raw(&oid!(1, 3, 6, 1, 2, 1, 1, 8))
            .await
            .unwrap();
        assert_eq!(vb.value, Value::EndOfMibView);
    }
}
