//! Owned-socket UDP transport (C1).
//!
//! One socket per client, connected to a single target. Simpler than
//! [`super::shared::SharedUdpTransport`] and the right choice for a
//! single-target client that isn't sharing a socket with other clients.

use std::net::SocketAddr;
use std::time::Duration;

use bytes::{Bytes, BytesMut};
use tokio::net::UdpSocket;
use tokio::time::timeout;

use crate::error::{Error, Result};
use crate::util::bind_ephemeral_udp_socket;

use super::Transport;

/// An owned UDP socket bound to an ephemeral local port and connected
/// (in the UDP sense, i.e. filtered) to a single target address.
#[derive(Clone)]
pub struct UdpTransport {
    socket: std::sync::Arc<UdpSocket>,
    target: SocketAddr,
}

impl UdpTransport {
    /// Bind a fresh ephemeral socket and connect it to `target`.
    pub async fn connect(target: SocketAddr) -> Result<Self> {
        let socket = bind_ephemeral_udp_socket(target)
            .await
            .map_err(|source| Error::Io {
                target: Some(target),
                source,
            })?;
        socket.connect(target).await.map_err(|source| Error::Io {
            target: Some(target),
            source,
        })?;
        Ok(Self {
            socket: std::sync::Arc::new(socket),
            target,
        })
    }

    /// Send `data` and wait up to `timeout` for any datagram back from the
    /// connected peer, without request-ID correlation (the only writer on
    /// this socket is this transport's own owner, so the first datagram
    /// back is always the answer).
    pub async fn send_and_wait(&self, data: &[u8], wait: Duration) -> Result<Bytes> {
        self.send(data).await?;
        let (bytes, _from) = self.recv(0, wait).await?;
        Ok(bytes)
    }
}

impl Transport for UdpTransport {
    async fn send(&self, data: &[u8]) -> Result<()> {
        self.socket
            .send(data)
            .await
            .map_err(|source| Error::Io {
                target: Some(self.target),
                source,
            })?;
        Ok(())
    }

    async fn recv(&self, _request_id: i32, wait: Duration) -> Result<(Bytes, SocketAddr)> {
        let mut buf = BytesMut::zeroed(65536);
        let recv_result = timeout(wait, self.socket.recv(&mut buf)).await;
        let n = match recv_result {
            Ok(Ok(n)) => n,
            Ok(Err(source)) => {
                return Err(Error::Io {
                    target: Some(self.target),
                    source,
                });
            }
            Err(_) => {
                return Err(Error::Timeout {
                    target: Some(self.target),
                    elapsed: wait,
                    request_id: _request_id,
                    retries: 0,
                });
            }
        };
        buf.truncate(n);
        Ok((buf.freeze(), self.target))
    }

    fn peer_addr(&self) -> SocketAddr {
        self.target
    }

    fn local_addr(&self) -> SocketAddr {
        self.socket
            .local_addr()
            .unwrap_or_else(|_| "0.0.0.0:0".parse().unwrap())
    }

    fn is_stream(&self) -> bool {
        false
    }
}
