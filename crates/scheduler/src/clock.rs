//! Clock abstraction
//!
//! The scheduler reads time only through [`Clock`], so tests can drive a run
//! with [`ManualClock`] and never sleep.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Monotonic + wall clock source
pub trait Clock: Send {
    /// Monotonic now
    fn now(&self) -> Instant;

    /// Wall-clock epoch nanoseconds
    fn wall_now_ns(&self) -> i64;

    /// Block until `deadline` (returns immediately if already past)
    fn sleep_until(&mut self, deadline: Instant);
}

/// Real time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall_now_ns(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| i64::try_from(d.as_nanos()).unwrap_or(i64::MAX))
            .unwrap_or(0)
    }

    fn sleep_until(&mut self, deadline: Instant) {
        let now = Instant::now();
        if deadline > now {
            std::thread::sleep(deadline - now);
        }
    }
}

/// Deterministic clock for tests
///
/// Time only moves through [`ManualClock::advance`] or `sleep_until`.
/// Clones share the same time, so a test can keep a handle while the
/// scheduler owns another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    base: Instant,
    wall_base_ns: i64,
    offset_ns: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(wall_base_ns: i64) -> Self {
        Self {
            base: Instant::now(),
            wall_base_ns,
            offset_ns: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Move time forward
    pub fn advance(&self, by: Duration) {
        let by_ns = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.offset_ns.fetch_add(by_ns, Ordering::SeqCst);
    }

    /// Time elapsed since creation
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.offset_ns.load(Ordering::SeqCst))
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(1_700_000_000_000_000_000)
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.base + self.elapsed()
    }

    fn wall_now_ns(&self) -> i64 {
        self.wall_base_ns + self.elapsed().as_nanos() as i64
    }

    fn sleep_until(&mut self, deadline: Instant) {
        let now = self.now();
        if deadline > now {
            self.advance(deadline - now);
        }
    }
}
