//! Sourcing the time for cache expiry.
//!
//! Cached answer sets age against a clock owned by the cache. In
//! production that is the system's monotonic clock; tests substitute
//! [`FakeClock`], which only moves when told to, so expiry can be
//! exercised without sleeping.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::fmt::Debug;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

//------------ Clock ---------------------------------------------------------

/// The source of time for cache expiry.
///
/// A clock hands out instants and later measures how much time has passed
/// since one was taken. Cloning a clock yields another handle to the same
/// underlying time source, so a test can keep one handle while a cache
/// owns the other.
pub trait Clock: Clone {
    /// A point in time taken from this clock.
    type Instant: Clone + Debug + Send + Sync;

    /// Creates a clock starting at the present.
    fn new() -> Self;

    /// Returns the current point in time.
    fn now(&self) -> Self::Instant;

    /// Returns how much time has passed since the given instant.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

//------------ SystemClock ---------------------------------------------------

/// The system's monotonic clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Instant = Instant;

    fn new() -> Self {
        SystemClock
    }

    fn now(&self) -> Self::Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Self::Instant) -> Duration {
        since.elapsed()
    }
}

//------------ FakeClock -----------------------------------------------------

/// A clock that only advances when told to.
#[derive(Clone, Debug)]
pub struct FakeClock {
    /// Time passed since the clock was created.
    offset: Arc<Mutex<Duration>>,
}

impl FakeClock {
    /// Moves the clock forward by the given amount.
    pub fn adjust_time(&self, amount: Duration) {
        let mut offset = self.offset.lock().expect("poisoned lock");
        *offset = offset.checked_add(amount).expect("clock overflow");
    }
}

impl Clock for FakeClock {
    type Instant = Duration;

    fn new() -> Self {
        FakeClock {
            offset: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    fn now(&self) -> Self::Instant {
        *self.offset.lock().expect("poisoned lock")
    }

    fn elapsed(&self, since: &Self::Instant) -> Duration {
        self.now().saturating_sub(*since)
    }
}

//============ Testing =======================================================
