//! PDU Session (C4): drive a single SNMP request end-to-end.
//!
//! Implements the procedure from the teacher's `Client` methods
//! (builder.rs's connect path plus the per-call futures `client/walk.rs`
//! spawns): resolve target, normalize OIDs, gate the operation by
//! version, allocate a request ID, build/register/send the PDU, await
//! the correlator, and retry on timeout with a fresh request ID each
//! attempt.

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::message::Message;
use crate::pdu::Pdu;
use crate::request_id::RequestIdAllocator;
use crate::transport::Transport;
use crate::version::Version;

/// Configuration a [`PduSession`] needs to build and send a message.
///
/// A small owned copy of the relevant fields of
/// [`crate::client::ClientConfig`], to keep this module independent of the
/// `client` module's public surface. `community` is cheap to copy: it's a
/// reference-counted [`Bytes`].
pub(crate) struct SessionConfig {
    pub version: Version,
    pub community: Bytes,
    pub timeout: std::time::Duration,
    pub retries: u32,
}

/// Drives one logical request (with its retries) over a given transport.
pub(crate) struct PduSession<'a, T: Transport> {
    transport: &'a T,
    config: SessionConfig,
    request_ids: &'a RequestIdAllocator,
}

impl<'a, T: Transport> PduSession<'a, T> {
    pub fn new(
        transport: &'a T,
        config: SessionConfig,
        request_ids: &'a RequestIdAllocator,
    ) -> Self {
        Self {
            transport,
            config,
            request_ids,
        }
    }

    fn alloc_request_id(&self) -> i32 {
        self.transport
            .alloc_request_id()
            .unwrap_or_else(|| self.request_ids.next_id_or_fallback())
    }

    /// Run the request to completion, retrying on timeout only.
    ///
    /// `build` constructs the outgoing PDU from a freshly allocated
    /// request ID; it is called again (with a new ID) on each retry.
    pub async fn execute(&self, build: impl Fn(i32) -> Pdu) -> Result<Pdu> {
        let max_attempts = self.config.retries + 1;
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let request_id = self.alloc_request_id();
            let pdu = build(request_id);
            let message = Message::new(self.config.version, self.config.community.clone(), pdu);
            let encoded = message.encode();

            tracing::trace!(
                snmp.request_id = request_id,
                snmp.target = %self.transport.peer_addr(),
                snmp.bytes = encoded.len(),
                "sending SNMP request"
            );

            self.transport.send(&encoded).await?;

            match self.transport.recv(request_id, self.config.timeout).await {
                Ok((bytes, _from)) => {
                    let response = Message::decode(bytes)?;
                    if response.version != self.config.version {
                        return Err(Error::VersionMismatch {
                            expected: self.config.version,
                            actual: response.version,
                        });
                    }
                    if response.pdu.request_id() != request_id {
                        return Err(Error::RequestIdMismatch {
                            expected: request_id,
                            actual: response.pdu.request_id(),
                        });
                    }
                    return Ok(response.pdu);
                }
                Err(e) if e.is_retryable_timeout() && attempt < max_attempts => {
                    tracing::debug!(
                        snmp.request_id = request_id,
                        snmp.target = %self.transport.peer_addr(),
                        snmp.attempt = attempt,
                        "SNMP request timed out, retrying"
                    );
                    continue;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
