//! Prelude module for convenient imports.
//!
//! This module provides a convenient set of commonly-used types and traits
//! for working with the async-snmp library.
//!
//! # Usage
//!
//! ```rust,no_run
//! use async_snmp::prelude::*;
//! ```
//!
//! This imports:
//! - Core types: [`Client`], [`ClientConfig`], [`Oid`], [`Value`], [`VarBind`]
//! - Error handling: [`Error`], [`Result`]
//! - Streaming walks: [`Walk`], [`BulkWalk`], [`WalkTable`]
//! - Fan-out: [`Orchestrator`], [`ReturnFormat`]
//! - The [`oid!`] macro for compile-time OID construction

pub use crate::client::{BulkWalk, Client, ClientConfig, Walk, WalkTable};
pub use crate::error::{Error, Result};
pub use crate::oid::Oid;
pub use crate::orchestrator::{Orchestrator, ReturnFormat};
pub use crate::value::Value;
pub use crate::varbind::VarBind;
pub use crate::version::Version;

#[doc(no_inline)]
pub use crate::oid;
