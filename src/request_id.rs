//! Request ID allocation (C2).
//!
//! SNMP request IDs correlate a request with its response. A single
//! [`RequestIdAllocator`] is shared by every client/handle drawing from
//! the same transport so concurrent requests never collide.

use std::sync::atomic::{AtomicI32, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Upper bound of the allocator's cycle. Kept well under `i32::MAX` so the
/// wire encoding never needs the extra leading `0x00` byte that values
/// above `i32::MAX / 2` would otherwise sometimes require, and so the
/// cycle length is easy to reason about.
const MAX_REQUEST_ID: i32 = 1_000_000;

/// A lock-free, monotonically-cycling allocator of SNMP request IDs.
///
/// IDs are drawn from `1..=1_000_000`; zero is never returned, since some
/// agents treat a request ID of 0 as unset. Allocation wraps back to 1
/// after the cycle is exhausted.
#[derive(Debug)]
pub struct RequestIdAllocator {
    next: AtomicI32,
}

impl RequestIdAllocator {
    /// Start a new allocator at 1.
    pub fn new() -> Self {
        Self {
            next: AtomicI32::new(1),
        }
    }

    /// Start a new allocator seeded with randomized, time-based entropy
    /// rather than 1, so that two processes binding the same ephemeral
    /// port in quick succession (e.g. under `SO_REUSEADDR` after a
    /// restart) don't hand out the same request IDs to a still-listening
    /// peer. Falls back to 1 if the allocator can't be seeded from the
    /// system clock (unsatisfiable in practice, but `SystemTime` is
    /// fallible).
    pub fn new_with_entropy() -> Self {
        Self {
            next: AtomicI32::new(Self::entropy_seed()),
        }
    }

    fn entropy_seed() -> i32 {
        Self::time_based_entropy().unwrap_or(1)
    }

    /// Derive a seed in `1..=MAX_REQUEST_ID` from the system clock.
    fn time_based_entropy() -> Option<i32> {
        let nanos = SystemTime::now().duration_since(UNIX_EPOCH).ok()?.as_nanos() as i32;
        let magnitude = nanos.wrapping_abs().max(1);
        Some(1 + magnitude % MAX_REQUEST_ID)
    }

    /// Allocate the next request ID, wrapping after `MAX_REQUEST_ID`.
    ///
    /// Lock-free: a single `fetch_add` plus a cheap modulo, safe to call
    /// from any number of concurrent tasks sharing this allocator.
    pub fn next_id(&self) -> i32 {
        let raw = self.next.fetch_add(1, Ordering::Relaxed);
        1 + raw.rem_euclid(MAX_REQUEST_ID)
    }

    /// Allocate the next ID, falling back to fresh time-based entropy if
    /// the counter has somehow wrapped to a value outside its expected
    /// range (defense in depth; the modulo in `next_id` makes this
    /// unreachable in normal operation).
    pub fn next_id_or_fallback(&self) -> i32 {
        let id = self.next_id();
        if (1..=MAX_REQUEST_ID).contains(&id) {
            id
        } else {
            Self::entropy_seed()
        }
    }
}

impl Default for RequestIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
