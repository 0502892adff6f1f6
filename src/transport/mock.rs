//! In-memory transport test double.
//!
//! [`MockTransport`] lets session/walk/tuner/orchestrator tests drive the
//! client logic without a real socket: `send` records the outgoing bytes,
//! `recv` replays a queue of canned responses (or simulated timeouts) in
//! order. [`ResponseBuilder`] builds the canned response bytes using the
//! real [`crate::message::Message`]/[`crate::pdu::Pdu`] codec, so these
//! tests exercise the same decode path a production socket would.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;

use crate::error::{Error, ErrorStatus, Result};
use crate::message::Message;
use crate::oid::Oid;
use crate::pdu::Pdu;
use crate::value::Value;
use crate::varbind::VarBind;
use crate::version::Version;

use super::Transport;

enum Queued {
    Data(Bytes),
    Timeout,
}

struct MockState {
    queue: VecDeque<Queued>,
    sent: Vec<Bytes>,
}

/// A transport double backed by a queue of canned responses.
#[derive(Clone)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
    target: SocketAddr,
}

impl MockTransport {
    /// Create a mock transport "connected" to `target` (used only for
    /// [`Transport::peer_addr`]; no socket is opened).
    pub fn new(target: SocketAddr) -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                queue: VecDeque::new(),
                sent: Vec::new(),
            })),
            target,
        }
    }

    /// Queue a response datagram to be returned by the next `recv` call.
    pub fn queue_response(&mut self, data: Bytes) {
        self.state.lock().unwrap().queue.push_back(Queued::Data(data));
    }

    /// Queue arbitrary bytes (e.g. malformed data) for the next `recv` call.
    pub fn queue_raw(&mut self, data: Bytes) {
        self.queue_response(data);
    }

    /// Queue a simulated timeout for the next `recv` call.
    pub fn queue_timeout(&mut self) {
        self.state.lock().unwrap().queue.push_back(Queued::Timeout);
    }

    /// Number of `send` calls observed so far.
    pub fn sent_count(&self) -> usize {
        self.state.lock().unwrap().sent.len()
    }

    /// The raw bytes of every `send` call observed so far, in order.
    pub fn sent(&self) -> Vec<Bytes> {
        self.state.lock().unwrap().sent.clone()
    }
}

impl Transport for MockTransport {
    async fn send(&self, data: &[u8]) -> Result<()> {
        self.state
            .lock()
            .unwrap()
            .sent
            .push(Bytes::copy_from_slice(data));
        Ok(())
    }

    async fn recv(&self, request_id: i32, wait: Duration) -> Result<(Bytes, SocketAddr)> {
        let next = self.state.lock().unwrap().queue.pop_front();
        match next {
            Some(Queued::Data(data)) => Ok((data, self.target)),
            Some(Queued::Timeout) | None => Err(Error::Timeout {
                target: Some(self.target),
                elapsed: wait,
                request_id,
                retries: 0,
            }),
        }
    }

    fn peer_addr(&self) -> SocketAddr {
        self.target
    }

    fn local_addr(&self) -> SocketAddr {
        "127.0.0.1:0".parse().unwrap()
    }

    fn is_stream(&self) -> bool {
        false
    }
}

/// Builds encoded SNMP response datagrams for [`MockTransport::queue_response`].
pub struct ResponseBuilder {
    request_id: i32,
    varbinds: Vec<VarBind>,
    error_status: ErrorStatus,
    error_index: u32,
}

impl ResponseBuilder {
    /// Start a response for the given request ID, with no error and no varbinds.
    pub fn new(request_id: i32) -> Self {
        Self {
            request_id,
            varbinds: Vec::new(),
            error_status: ErrorStatus::NoError,
            error_index: 0,
        }
    }

    /// Append a varbind to the response.
    pub fn varbind(mut self, oid: Oid, value: Value) -> Self {
        self.varbinds.push(VarBind::new(oid, value));
        self
    }

    /// Set a protocol error status and index on the response.
    pub fn error(mut self, status: ErrorStatus, index: u32) -> Self {
        self.error_status = status;
        self.error_index = index;
        self
    }

    fn into_pdu(self) -> Pdu {
        Pdu::Response {
            request_id: self.request_id,
            error_status: self.error_status,
            error_index: self.error_index,
            varbinds: self.varbinds,
        }
    }

    /// Encode as a v2c response with the given community string.
    pub fn build_v2c(self, community: &[u8]) -> Bytes {
        Message::new(Version::V2c, community, self.into_pdu()).encode()
    }

    /// Encode as a v1 response with the given community string.
    pub fn build_v1(self, community: &[u8]) -> Bytes {
        Message::new(Version::V1, community, self.into_pdu()).encode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oid;

    #[tokio::test]
    async fn records_sent_bytes() {
        let mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
        mock.send(b"hello").await.unwrap();
        mock.send(b"world").await.unwrap();
        assert_eq!(mock.sent_count(), 2);
        assert_eq!(&mock.sent()[0][..], b"hello");
    }

    #[tokio::test]
    async fn replays_queued_responses_in_order() {
        let mut mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
        mock.queue_response(
            ResponseBuilder::new(1)
                .varbind(oid!(1, 3, 6, 1), Value::Integer(1))
                .build_v2c(b"public"),
        );
        mock.queue_timeout();

        let (bytes, _) = mock.recv(1, Duration::from_millis(10)).await.unwrap();
        let decoded = Message::decode(bytes).unwrap();
        assert_eq!(decoded.pdu.request_id(), 1);

        let err = mock.recv(2, Duration::from_millis(10)).await.unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
    }

    #[tokio::test]
    async fn empty_queue_times_out() {
        let mock = MockTransport::new("127.0.0.1:161".parse().unwrap());
        let err = mock.recv(1, Duration::from_millis(10)).await.unwrap_err();
        assert!(matches!(err, Error::Timeout { .. }));
    }
}
