//! Internal utilities.

use std::fmt;
use std::io;
use std::net::SocketAddr;

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;

/// Encode bytes as lowercase hex string.
pub fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Decode hex string to bytes.
///
/// Available in tests and when the `testing` feature is enabled.
/// Returns an error for invalid hex characters or odd-length strings.
#[cfg(any(test, feature = "testing"))]
pub fn decode_hex(s: &str) -> Result<Vec<u8>, HexDecodeError> {
    if !s.len().is_multiple_of(2) {
        return Err(HexDecodeError::OddLength);
    }
    (0..s.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&s[i..i + 2], 16).map_err(|_| HexDecodeError::InvalidChar))
        .collect()
}

/// Error type for hex decoding.
#[cfg(any(test, feature = "testing"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HexDecodeError {
    /// Input has odd length (must be pairs of hex digits)
    OddLength,
    /// Invalid hexadecimal character
    InvalidChar,
}

/// Lazy hex formatter - only formats when actually displayed.
///
/// This avoids allocation when logging at disabled levels.
pub(crate) struct HexBytes<'a>(pub &'a [u8]);

impl fmt::Debug for HexBytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{:02x}", b)?;
        }
        Ok(())
    }
}

impl fmt::Display for HexBytes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Create and bind a UDP socket with proper IPv6 configuration.
///
/// For IPv6 sockets, sets `IPV6_V6ONLY = true` to ensure the socket only
/// accepts IPv6 connections and does not use IPv4-mapped addresses.
///
/// # Arguments
///
/// * `addr` - The socket address to bind to. The domain (IPv4/IPv6) is
///   inferred from the address type.
///
/// # Returns
///
/// A tokio `UdpSocket` bound to the specified address.
pub(crate) async fn bind_udp_socket(addr: SocketAddr) -> io::Result<UdpSocket> {
    let domain = if addr.is_ipv6() {
        Domain::IPV6
    } else {
        Domain::IPV4
    };

    let socket = Socket::new(domain, Type::DGRAM, Some(Protocol::UDP))?;

    // For IPv6 sockets, set IPV6_V6ONLY to true.
    // This ensures the socket only handles IPv6 traffic and doesn't accept
    // IPv4-mapped IPv6 addresses, providing cleaner and more predictable behavior.
    if addr.is_ipv6() {
        socket.set_only_v6(true)?;
    }

    // Allow address reuse for quick restarts
    socket.set_reuse_address(true)?;

    // Set non-blocking before converting to tokio socket
    socket.set_nonblocking(true)?;

    socket.bind(&addr.into())?;

    // Best-effort: a larger receive buffer gives the correlator's recv loop
    // more slack under bursty multi-target polling before the kernel starts
    // dropping datagrams. The OS may grant less than requested (or reject it
    // outright under a restrictive rmem_max); either way we proceed with
    // whatever the socket ends up with rather than failing startup.
    const RECV_BUFFER_SIZE: usize = 4 * 1024 * 1024;
    if let Err(err) = socket.set_recv_buffer_size(RECV_BUFFER_SIZE) {
        tracing::warn!(snmp.error = %err, "failed to set socket receive buffer size, using OS default");
    } else if let Ok(granted) = socket.recv_buffer_size() {
        if granted < RECV_BUFFER_SIZE {
            tracing::warn!(
                snmp.requested_bytes = RECV_BUFFER_SIZE,
                snmp.granted_bytes = granted,
                "kernel granted a smaller receive buffer than requested"
            );
        }
    }

    UdpSocket::from_std(socket.into())
}

/// Create an ephemeral UDP socket for connecting to a target.
///
/// Binds to `0.0.0.0:0` (IPv4) or `[::]:0` (IPv6) depending on the target
/// address family. For IPv6, sets `IPV6_V6ONLY = true`.
///
/// # Arguments
///
/// * `target` - The target address. Used to determine whether to create
///   an IPv4 or IPv6 socket.
///
/// # Returns
///
/// A tokio `UdpSocket` bound to an ephemeral port.
pub(crate) async fn bind_ephemeral_udp_socket(target: SocketAddr) -> io::Result<UdpSocket> {
    let bind_addr: SocketAddr = if target.is_ipv6() {
        "[::]:0".parse().unwrap()
    } else {
        "0.0.0.0:0".parse().unwrap()
    };

    bind_udp_socket(bind_addr).await
}
