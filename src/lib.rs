//! Async-first SNMPv1/v2c manager core.
//!
//! `async-snmp` is the wire-level protocol engine for polling many SNMP
//! targets concurrently: a request/response correlator built on a single
//! shared UDP socket, iterative GETNEXT/GETBULK walk state machines,
//! adaptive `max-repetitions` tuning, and a bounded-concurrency multi-target
//! orchestrator.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use async_snmp::{Client, oid};
//!
//! # async fn example() -> async_snmp::Result<()> {
//! let client = Client::v2c("192.168.1.1:161")
//!     .community(b"public")
//!     .connect()
//!     .await?;
//!
//! let sys_descr = client.get(&oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)).await?;
//! println!("{}", sys_descr.value);
//! # Ok(())
//! # }
//! ```
//!
//! # Module map
//!
//! - [`client`] — [`Client`], its typestate builders, and the [`client::Walk`]/
//!   [`client::BulkWalk`]/[`client::WalkTable`] streams (C4, C5).
//! - [`transport`] — the [`Transport`](transport::Transport) trait, an owned
//!   per-target UDP socket, and the shared-socket correlator (C1, C3).
//! - [`tuner`] — adaptive GETBULK sizing (C6).
//! - [`orchestrator`] — bounded-concurrency multi-target fan-out (C7).
//! - [`mib`] — a small built-in MIB-II name registry and varbind enrichment.
//! - [`oid`], [`value`], [`varbind`], [`pdu`], [`message`] — the data model
//!   and wire codec.
//! - [`error`] — the library's [`Error`] and [`Result`] types.

mod ber;
pub mod client;
pub mod error;
pub mod message;
pub mod mib;
pub mod oid;
pub mod orchestrator;
pub mod pdu;
pub mod prelude;
pub mod request_id;
mod session;
pub mod transport;
pub mod tuner;
mod util;
pub mod value;
pub mod varbind;
pub mod version;

pub use client::{Client, ClientConfig};
pub use error::{Error, Result};
pub use oid::Oid;
pub use orchestrator::{Orchestrator, ReturnFormat};
pub use value::Value;
pub use varbind::VarBind;
pub use version::Version;

#[doc(no_inline)]
pub use crate::oid;
