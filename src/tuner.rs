//! Adaptive GETBULK sizing (C6).
//!
//! No direct teacher analog — `lukeod-async-snmp` doesn't benchmark or tune
//! `max-repetitions` on its own. Grounded in the teacher's latency-sensitive
//! `tracing` conventions (`snmp.*` dotted fields) and [`crate::client::BulkWalk`]'s
//! GETBULK loop shape, which [`AdaptiveTuner::benchmark`] reuses directly
//! through [`crate::client::Client::get_bulk`].

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;

use crate::client::Client;
use crate::error::{Error, Result};
use crate::oid::Oid;
use crate::transport::Transport;

/// Coarse device-type hint used to pick a starting `max_repetitions` before
/// any benchmark has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum DeviceTypeHint {
    Switch,
    Router,
    Server,
    Other,
}

impl DeviceTypeHint {
    /// Heuristic default `max_repetitions` for this device type.
    pub fn default_bulksize(self) -> i32 {
        match self {
            DeviceTypeHint::Switch => 25,
            DeviceTypeHint::Router => 15,
            DeviceTypeHint::Server => 10,
            DeviceTypeHint::Other => 10,
        }
    }
}

/// Mean latency observed for one candidate GETBULK size during benchmarking.
#[derive(Debug, Clone, Copy)]
pub struct SizeLatency {
    pub size: i32,
    pub mean_latency: Duration,
}

/// Outcome of [`AdaptiveTuner::benchmark`] for one target.
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    /// Mean latency per candidate size that completed at least one trial.
    pub per_bulksize_latency: Vec<SizeLatency>,
    /// The size with the lowest mean latency.
    pub optimal_bulksize: i32,
    /// That size's mean latency.
    pub optimal_latency: Duration,
    /// Suggested per-request timeout: `max(3s, 3 * optimal_latency)`.
    pub recommended_timeout: Duration,
    /// Whether in-flight adaptive adjustment is worth enabling
    /// (`optimal_latency > 100ms`).
    pub adaptive_tuning: bool,
}

/// Candidate GETBULK sizes tried by [`AdaptiveTuner::benchmark`] when the
/// caller doesn't supply its own.
pub const DEFAULT_BENCHMARK_SIZES: &[i32] = &[1, 5, 10, 15, 20, 25, 30, 40, 50];

/// Picks and adjusts `max_repetitions` for GETBULK-driven walks.
///
/// Holds a [`BenchmarkCache`] so repeated walks against the same target
/// reuse a recent benchmark instead of re-measuring every time.
pub struct AdaptiveTuner {
    cache: BenchmarkCache,
}

impl AdaptiveTuner {
    /// Create a tuner whose cache entries are considered fresh for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: BenchmarkCache::new(ttl),
        }
    }

    /// Benchmark `probe_oid` against `client`'s target across `sizes`,
    /// running `iterations` GETBULK trials per size and recording mean
    /// latency. Sizes with no successful trial are dropped; if every size
    /// fails, returns [`Error::NoSuccessfulBenchmarks`].
    pub async fn benchmark<T: Transport + 'static>(
        &self,
        client: &Client<T>,
        probe_oid: &Oid,
        sizes: &[i32],
        iterations: u32,
    ) -> Result<BenchmarkResult> {
        let mut per_bulksize_latency = Vec::with_capacity(sizes.len());

        for &size in sizes {
            let mut total = Duration::ZERO;
            let mut successes = 0u32;
            for _ in 0..iterations {
                let started = Instant::now();
                if client.get_bulk(&[probe_oid.clone()], 0, size).await.is_ok() {
                    total += started.elapsed();
                    successes += 1;
                }
            }
            if successes > 0 {
                per_bulksize_latency.push(SizeLatency {
                    size,
                    mean_latency: total / successes,
                });
            } else {
                tracing::debug!(snmp.bulk_size = size, "benchmark size had no successful trials");
            }
        }

        let best = per_bulksize_latency
            .iter()
            .min_by_key(|p| p.mean_latency)
            .copied()
            .ok_or(Error::NoSuccessfulBenchmarks)?;

        let recommended_timeout = Duration::from_secs(3).max(best.mean_latency * 3);
        let result = BenchmarkResult {
            per_bulksize_latency,
            optimal_bulksize: best.size,
            optimal_latency: best.mean_latency,
            recommended_timeout,
            adaptive_tuning: best.mean_latency > Duration::from_millis(100),
        };

        tracing::debug!(
            snmp.target = %client.target(),
            "benchmark complete"
        );

        Ok(result)
    }

    /// Look up a cached benchmark for `target`, if one is still fresh.
    pub fn cached(&self, target: SocketAddr) -> Option<BenchmarkResult> {
        self.cache.get(target)
    }

    /// Cache a benchmark result for `target`.
    pub fn cache_result(&self, target: SocketAddr, result: BenchmarkResult) {
        self.cache.insert(target, result);
    }

    /// Build a controller for in-flight `max_repetitions` adjustment,
    /// seeded from a cached/fresh benchmark if available, falling back to
    /// `hint`'s heuristic default otherwise.
    pub fn controller_for(&self, target: SocketAddr, hint: DeviceTypeHint) -> BulkSizeController {
        match self.cached(target) {
            Some(benchmark) => BulkSizeController::new(benchmark.optimal_bulksize, benchmark.optimal_bulksize),
            None => {
                let default = hint.default_bulksize();
                BulkSizeController::new(default, default)
            }
        }
    }
}

/// Per-benchmark cache entry with a measurement timestamp.
struct CachedBenchmark {
    result: BenchmarkResult,
    measured_at: Instant,
}

/// Keyed benchmark cache with a fixed TTL.
///
/// Stale entries are refreshed opportunistically by the caller re-running
/// [`AdaptiveTuner::benchmark`] and calling [`AdaptiveTuner::cache_result`]
/// rather than being evicted eagerly on a timer.
pub struct BenchmarkCache {
    ttl: Duration,
    entries: Mutex<HashMap<SocketAddr, CachedBenchmark>>,
}

impl BenchmarkCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch a still-fresh benchmark for `target`, if any.
    pub fn get(&self, target: SocketAddr) -> Option<BenchmarkResult> {
        let entries = self.entries.lock().unwrap();
        let entry = entries.get(&target)?;
        if entry.measured_at.elapsed() > self.ttl {
            return None;
        }
        Some(entry.result.clone())
    }

    /// Insert or replace the cached benchmark for `target`.
    pub fn insert(&self, target: SocketAddr, result: BenchmarkResult) {
        self.entries.lock().unwrap().insert(
            target,
            CachedBenchmark {
                result,
                measured_at: Instant::now(),
            },
        );
    }
}

/// In-flight `max_repetitions` controller for a single walk.
///
/// Starts at `initial` and adjusts as batches complete: halves on two
/// consecutive slow batches or a >10% error rate (floor 1); grows by 25%
/// after five consecutive fast batches (ceiling `min(optimal*2, 50)`).
#[derive(Debug, Clone)]
pub struct BulkSizeController {
    current: i32,
    floor: i32,
    ceiling: i32,
    consecutive_slow: u32,
    consecutive_fast: u32,
    recent_latency: Option<Duration>,
    batches: u32,
    errors: u32,
}

const SLOW_THRESHOLD_MULTIPLIER: u32 = 2;
const ERROR_RATE_THRESHOLD: f64 = 0.10;
const GROWTH_FACTOR: f64 = 1.25;

impl BulkSizeController {
    /// `initial` is the starting `max_repetitions`; `optimal` (typically the
    /// same value, or a benchmarked optimum) bounds how high it may grow.
    pub fn new(initial: i32, optimal: i32) -> Self {
        Self {
            current: initial.max(1),
            floor: 1,
            ceiling: (optimal.saturating_mul(2)).min(50).max(1),
            consecutive_slow: 0,
            consecutive_fast: 0,
            recent_latency: None,
            batches: 0,
            errors: 0,
        }
    }

    /// Current `max_repetitions` to use for the next GETBULK request.
    pub fn current(&self) -> i32 {
        self.current
    }

    /// Record one completed batch's latency and whether it errored, and
    /// adjust `current` according to the tuning rules.
    pub fn record_batch(&mut self, latency: Duration, errored: bool) {
        self.batches += 1;
        if errored {
            self.errors += 1;
        }

        let error_rate = self.errors as f64 / self.batches as f64;
        if error_rate > ERROR_RATE_THRESHOLD {
            self.halve();
            self.consecutive_slow = 0;
            self.consecutive_fast = 0;
            self.recent_latency = Some(latency);
            return;
        }

        let is_slow = self
            .recent_latency
            .is_some_and(|recent| latency > recent * SLOW_THRESHOLD_MULTIPLIER);

        if is_slow {
            self.consecutive_slow += 1;
            self.consecutive_fast = 0;
            if self.consecutive_slow >= 2 {
                self.halve();
                self.consecutive_slow = 0;
            }
        } else {
            self.consecutive_fast += 1;
            self.consecutive_slow = 0;
            if self.consecutive_fast >= 5 {
                self.grow();
                self.consecutive_fast = 0;
            }
        }

        self.recent_latency = Some(latency);
    }

    fn halve(&mut self) {
        self.current = (self.current / 2).max(self.floor);
        tracing::debug!(snmp.max_repetitions = self.current, "halved bulk size");
    }

    fn grow(&mut self) {
        let grown = (self.current as f64 * GROWTH_FACTOR).round() as i32;
        self.current = grown.min(self.ceiling);
        tracing::debug!(snmp.max_repetitions = self.current, "grew bulk size");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_type_defaults() {
        assert_eq!(DeviceTypeHint::Switch.default_bulksize(), 25);
        assert_eq!(DeviceTypeHint::Router.default_bulksize(), 15);
        assert_eq!(DeviceTypeHint::Server.default_bulksize(), 10);
        assert_eq!(DeviceTypeHint::Other.default_bulksize(), 10);
    }

    #[test]
    fn controller_halves_on_two_consecutive_slow_batches() {
        let mut ctrl = BulkSizeController::new(20, 20);
        ctrl.record_batch(Duration::from_millis(10), false);
        ctrl.record_batch(Duration::from_millis(100), false); // slow (>2x)
        assert_eq!(ctrl.current(), 20);
        ctrl.record_batch(Duration::from_millis(300), false); // slow again
        assert_eq!(ctrl.current(), 10);
    }

    #[test]
    fn controller_halves_floor_is_one() {
        let mut ctrl = BulkSizeController::new(1, 20);
        ctrl.record_batch(Duration::from_millis(10), false);
        ctrl.record_batch(Duration::from_millis(100), false);
        ctrl.record_batch(Duration::from_millis(300), false);
        assert_eq!(ctrl.current(), 1);
    }

    #[test]
    fn controller_grows_after_five_fast_batches() {
        let mut ctrl = BulkSizeController::new(20, 20);
        for _ in 0..5 {
            ctrl.record_batch(Duration::from_millis(10), false);
        }
        assert_eq!(ctrl.current(), 25);
    }

    #[test]
    fn controller_growth_respects_ceiling() {
        let mut ctrl = BulkSizeController::new(40, 20); // ceiling = min(40, 50) = 40
        for _ in 0..5 {
            ctrl.record_batch(Duration::from_millis(10), false);
        }
        assert_eq!(ctrl.current(), 40);
    }

    #[test]
    fn controller_halves_on_high_error_rate() {
        let mut ctrl = BulkSizeController::new(20, 20);
        ctrl.record_batch(Duration::from_millis(10), false);
        ctrl.record_batch(Duration::from_millis(10), true);
        ctrl.record_batch(Duration::from_millis(10), true); // 2/3 > 10%
        assert_eq!(ctrl.current(), 10);
    }

    #[test]
    fn cache_returns_none_past_ttl() {
        let cache = BenchmarkCache::new(Duration::from_millis(0));
        let target: SocketAddr = "127.0.0.1:161".parse().unwrap();
        cache.insert(
            target,
            BenchmarkResult {
                per_bulksize_latency: vec![],
                optimal_bulksize: 10,
                optimal_latency: Duration::from_millis(5),
                recommended_timeout: Duration::from_secs(3),
                adaptive_tuning: false,
            },
        );
        std::thread::sleep(Duration::from_millis(1));
        assert!(cache.get(target).is_none());
    }

    #[test]
    fn cache_returns_entry_within_ttl() {
        let cache = BenchmarkCache::new(Duration::from_secs(60));
        let target: SocketAddr = "127.0.0.1:161".parse().unwrap();
        cache.insert(
            target,
            BenchmarkResult {
                per_bulksize_latency: vec![],
                optimal_bulksize: 15,
                optimal_latency: Duration::from_millis(5),
                recommended_timeout: Duration::from_secs(3),
                adaptive_tuning: false,
            },
        );
        assert_eq!(cache.get(target).unwrap().optimal_bulksize, 15);
    }
}
