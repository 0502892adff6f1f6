//! Object Identifier (OID) type.
//!
//! An OID is an ordered sequence of non-negative integers ("arcs"). This
//! type stores arcs inline for the common case (most real-world OIDs have
//! well under 16 arcs) and falls back to the heap only for unusually deep
//! ones.

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

use crate::error::{Error, OidErrorKind};

/// An SNMP object identifier.
///
/// Comparison (`Ord`/`PartialOrd`) is element-wise over the arc sequence,
/// which is exactly lexicographic OID ordering: `1.3.6.1.2` < `1.3.6.1.2.1`
/// < `1.3.6.1.3`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Oid(SmallVec<[u32; 16]>);

impl Oid {
    /// Build an OID from a slice of arcs.
    pub fn from_slice(arcs: &[u32]) -> Self {
        Self(SmallVec::from_slice(arcs))
    }

    /// Build an OID from an owned `Vec`.
    pub fn from_vec(arcs: Vec<u32>) -> Self {
        Self(SmallVec::from_vec(arcs))
    }

    /// Arcs as a slice.
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }

    /// Number of arcs.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if this OID has no arcs.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `self` is `prefix` itself or a descendant of it.
    ///
    /// This is the walk scope test: an OID `X` is "in scope" of root `R`
    /// iff `X.starts_with(R)`. An empty root accepts every OID.
    pub fn starts_with(&self, prefix: &Oid) -> bool {
        if prefix.is_empty() {
            return true;
        }
        self.0.len() >= prefix.0.len() && self.0[..prefix.0.len()] == prefix.0[..]
    }

    /// Normalize per the core's empty-OID policy: an empty OID, or a
    /// single-element OID, is replaced with `[1, 3]` before transmission.
    pub fn normalized(mut self) -> Self {
        if self.0.is_empty() || self.0.len() == 1 {
            self.0 = SmallVec::from_slice(&[1, 3]);
        }
        self
    }

    /// Parse a dotted-decimal string such as `"1.3.6.1.2.1.1.1.0"`.
    ///
    /// A single leading dot is tolerated (`".1.3.6.1"`). Empty input is an
    /// error; use [`Oid::from_slice`]`(&[])` directly if an empty OID is
    /// intentional.
    pub fn parse(s: &str) -> Result<Self, Error> {
        let s = s.strip_prefix('.').unwrap_or(s);
        if s.is_empty() {
            return Err(Error::invalid_oid_with_input(OidErrorKind::Empty, s));
        }
        let mut arcs = SmallVec::new();
        for part in s.split('.') {
            let arc: u32 = part
                .parse()
                .map_err(|_| Error::invalid_oid_with_input(OidErrorKind::InvalidArc, s))?;
            arcs.push(arc);
        }
        Ok(Self(arcs))
    }

    /// Encode to the BER sub-identifier byte sequence (without tag/length).
    ///
    /// First two arcs are combined as `40*X + Y` per X.690; remaining arcs
    /// are base-128 encoded with the continuation bit set on all but the
    /// last byte of each sub-identifier.
    pub fn to_ber_smallvec(&self) -> SmallVec<[u8; 32]> {
        let mut out = SmallVec::new();
        let arcs = &self.0;
        if arcs.is_empty() {
            return out;
        }
        let first = arcs[0];
        let second = arcs.get(1).copied().unwrap_or(0);
        encode_subidentifier(first * 40 + second, &mut out);
        for &arc in &arcs[2.min(arcs.len())..] {
            encode_subidentifier(arc, &mut out);
        }
        out
    }

    /// Decode from BER sub-identifier bytes (without tag/length).
    pub fn from_ber(bytes: &[u8]) -> Result<Self, Error> {
        use crate::error::DecodeErrorKind;

        if bytes.is_empty() {
            return Ok(Self(SmallVec::new()));
        }

        let mut arcs: SmallVec<[u32; 16]> = SmallVec::new();
        let mut value: u64 = 0;
        let mut first = true;
        let mut started = false;

        for &b in bytes {
            started = true;
            value = (value << 7) | (b & 0x7F) as u64;
            if b & 0x80 == 0 {
                if value > u32::MAX as u64 {
                    return Err(Error::decode(0, DecodeErrorKind::InvalidOidEncoding));
                }
                if first {
                    first = false;
                    let (x, y) = if value < 40 {
                        (0, value as u32)
                    } else if value < 80 {
                        (1, value as u32 - 40)
                    } else {
                        (2, value as u32 - 80)
                    };
                    arcs.push(x);
                    arcs.push(y);
                } else {
                    arcs.push(value as u32);
                }
                value = 0;
                started = false;
            }
        }

        if started {
            return Err(Error::decode(0, DecodeErrorKind::InvalidOidEncoding));
        }

        Ok(Self(arcs))
    }
}

fn encode_subidentifier(value: u32, out: &mut SmallVec<[u8; 32]>) {
    if value == 0 {
        out.push(0);
        return;
    }
    let mut bytes = SmallVec::<[u8; 5]>::new();
    let mut v = value;
    while v > 0 {
        bytes.push((v & 0x7F) as u8);
        v >>= 7;
    }
    for (i, b) in bytes.iter().rev().enumerate() {
        let is_last = i == bytes.len() - 1;
        out.push(if is_last { *b } else { b | 0x80 });
    }
}

impl FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arc) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{}", arc)?;
        }
        Ok(())
    }
}

/// Construct an [`Oid`] from a literal arc list at the call site.
///
/// ```
/// use async_snmp::oid;
/// let id = oid!(1, 3, 6, 1, 2, 1, 1, 1, 0);
/// assert_eq!(id.to_string(), "1.3.6.1.2.1.1.1.0");
/// ```
#[macro_export]
macro_rules! oid {
    ($($arc:expr),+ $(,)?) => {
        $crate::oid::Oid::from_slice(&[$($arc as u32),+])
    };
}
