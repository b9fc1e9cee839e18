//! Time sources for latency measurement and timestamps

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};

/// Monotonic milliseconds plus wall-clock timestamps.
pub trait Clock {
    /// Milliseconds since an arbitrary fixed origin; never goes backwards.
    fn monotonic_ms(&self) -> u64;

    /// Current wall-clock time.
    fn utc_now(&self) -> DateTime<Utc>;
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn monotonic_ms(&self) -> u64 {
        (**self).monotonic_ms()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        (**self).utc_now()
    }
}

/// Real clock.
pub struct SystemClock {
    origin: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for SystemClock {
    fn monotonic_ms(&self) -> u64 {
        u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    fn utc_now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to.
pub struct ManualClock {
    start: DateTime<Utc>,
    elapsed_ms: Cell<u64>,
}

impl ManualClock {
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            start,
            elapsed_ms: Cell::new(0),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.elapsed_ms.set(self.elapsed_ms.get() + ms);
    }
}

impl Clock for ManualClock {
    fn monotonic_ms(&self) -> u64 {
        self.elapsed_ms.get()
    }

    fn utc_now(&self) -> DateTime<Utc> {
        let ms = i64::try_from(self.elapsed_ms.get()).unwrap_or(i64::MAX);
        self.start + Duration::milliseconds(ms)
    }
}
