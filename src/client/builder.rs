//! Typestate builders for SNMP clients.
//!
//! # Entry Points
//!
//! - [`Client::v1()`] - SNMPv1 with community string
//! - [`Client::v2c()`] - SNMPv2c with community string
//!
//! # Examples
//!
//! ```rust,no_run
//! # use async_snmp::Client;
//! # use std::time::Duration;
//! # async fn example() -> async_snmp::Result<()> {
//! let client = Client::v2c("192.168.1.1:161")
//!     .community(b"public")
//!     .timeout(Duration::from_secs(5))
//!     .connect()
//!     .await?;
//! # Ok(())
//! # }
//! ```

use std::net::{SocketAddr, ToSocketAddrs};
use std::time::Duration;

use bytes::Bytes;

use crate::error::{Error, Result};
use crate::transport::{Transport, UdpTransport};
use crate::version::Version;

use super::{Client, ClientConfig};

/// Common configuration shared by both builder types.
struct BaseConfig {
    target: String,
    timeout: Duration,
    retries: u32,
    max_oids_per_request: usize,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            target: String::new(),
            timeout: Duration::from_secs(5),
            retries: 3,
            max_oids_per_request: 10,
        }
    }
}

impl BaseConfig {
    fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Default::default()
        }
    }

    fn resolve_target(&self) -> Result<SocketAddr> {
        let with_port = Self::ensure_port(&self.target);
        with_port
            .to_socket_addrs()
            .map_err(|e| Error::Io {
                target: None,
                source: e,
            })?
            .next()
            .ok_or_else(|| Error::Io {
                target: None,
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "could not resolve address",
                ),
            })
    }

    /// Append the default SNMP port (161) if `target` has none.
    ///
    /// A bracketed IPv6 literal (`[::1]`) or plain host/IPv4 address with no
    /// trailing `:port` is treated as missing a port; `[::1]:161`,
    /// `192.0.2.1:161`, and `host:161` are left untouched.
    fn ensure_port(target: &str) -> String {
        if let Some(rest) = target.strip_prefix('[') {
            return match rest.find(']') {
                Some(end) if rest[end + 1..].starts_with(':') => target.to_string(),
                _ => format!("{target}:161"),
            };
        }
        if target.rsplit(':').count() > 1 {
            target.to_string()
        } else {
            format!("{target}:161")
        }
    }
}

// Macro to implement common builder methods
macro_rules! impl_common_methods {
    ($builder:ty) => {
        impl $builder {
            /// Set the request timeout.
            pub fn timeout(mut self, timeout: Duration) -> Self {
                self.base.timeout = timeout;
                self
            }

            /// Set the number of retries.
            pub fn retries(mut self, retries: u32) -> Self {
                self.base.retries = retries;
                self
            }

            /// Set the maximum OIDs per request.
            pub fn max_oids_per_request(mut self, max: usize) -> Self {
                self.base.max_oids_per_request = max;
                self
            }
        }
    };
}

// ============================================================================
// V1 Client Builder
// ============================================================================

/// Builder for SNMPv1 clients.
///
/// Created via [`Client::v1()`].
pub struct V1ClientBuilder {
    base: BaseConfig,
    community: Bytes,
}

impl V1ClientBuilder {
    pub(crate) fn new(target: impl Into<String>) -> Self {
        Self {
            base: BaseConfig::new(target),
            community: Bytes::from_static(b"public"),
        }
    }

    /// Set the community string.
    pub fn community(mut self, community: &[u8]) -> Self {
        self.community = Bytes::copy_from_slice(community);
        self
    }

    /// Connect and create the client with an owned UDP transport.
    pub async fn connect(self) -> Result<Client<UdpTransport>> {
        let addr = self.base.resolve_target()?;
        let transport = UdpTransport::connect(addr).await?;
        Ok(self.build(transport))
    }

    /// Build a client with a pre-supplied transport.
    pub fn build<T: Transport>(self, transport: T) -> Client<T> {
        let config = ClientConfig {
            version: Version::V1,
            community: self.community,
            timeout: self.base.timeout,
            retries: self.base.retries,
            max_oids_per_request: self.base.max_oids_per_request,
        };
        Client::new(transport, config)
    }
}

impl_common_methods!(V1ClientBuilder);

// ============================================================================
// V2c Client Builder
// ============================================================================

/// Builder for SNMPv2c clients.
///
/// Created via [`Client::v2c()`].
pub struct V2cClientBuilder {
    base: BaseConfig,
    community: Bytes,
}

impl V2cClientBuilder {
    pub(crate) fn new(target: impl Into<String>) -> Self {
        Self {
            base: BaseConfig::new(target),
            community: Bytes::from_static(b"public"),
        }
    }

    /// Set the community string.
    pub fn community(mut self, community: &[u8]) -> Self {
        self.community = Bytes::copy_from_slice(community);
        self
    }

    /// Connect and create the client with an owned UDP transport.
    pub async fn connect(self) -> Result<Client<UdpTransport>> {
        let addr = self.base.resolve_target()?;
        let transport = UdpTransport::connect(addr).await?;
        Ok(self.build(transport))
    }

    /// Build a client with a pre-supplied transport.
    pub fn build<T: Transport>(self, transport: T) -> Client<T> {
        let config = ClientConfig {
            version: Version::V2c,
            community: self.community,
            timeout: self.base.timeout,
            retries: self.base.retries,
            max_oids_per_request: self.base.max_oids_per_request,
        };
        Client::new(transport, config)
    }
}

impl_common_methods!(V2cClientBuilder);

// ============================================================================
// Entry points on Client
// ============================================================================

impl Client<UdpTransport> {
    /// Create an SNMPv1 client builder.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use async_snmp::Client;
    /// # async fn example() -> async_snmp::Result<()> {
    /// let client = Client::v1("192.168.1.1:161")
    ///     .community(b"public")
    ///     .connect()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn v1(target: impl Into<String>) -> V1ClientBuilder {
        V1ClientBuilder::new(target)
    }

    /// Create an SNMPv2c client builder.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// # use async_snmp::Client;
    /// # async fn example() -> async_snmp::Result<()> {
    /// let client = Client::v2c("192.168.1.1:161")
    ///     .community(b"public")
    ///     .connect()
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn v2c(target: impl Into<String>) -> V2cClientBuilder {
        V2cClientBuilder::new(target)
    }
}
