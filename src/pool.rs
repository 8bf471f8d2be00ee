//! The resolver handle pool.
//!
//! The pool manages a bounded set of reusable query-execution handles.
//! Acquiring never blocks and never fails: when no idle handle is
//! available a new one is created, even past the configured maximum. The
//! maximum is a soft cap enforced at release time instead, where excess
//! handles are discarded rather than returned to the idle list. A handle
//! whose query failed is always discarded; its internal state is unknown.

use crate::conf::ResolvConf;
use crate::request::HandleFactory;
use std::sync::Mutex;
use tracing::warn;

//------------ ResolverPool --------------------------------------------------

/// A bounded pool of reusable query-execution handles.
///
/// At any instant a handle is owned by exactly one of the idle list, a
/// caller's in-flight query, or nobody (dropped). The pool keeps
/// `idle + busy <= total` at all times; `total` may transiently exceed the
/// soft cap.
pub struct ResolverPool<F: HandleFactory> {
    /// The factory creating new handles.
    factory: F,

    /// The configuration handles are created from.
    conf: ResolvConf,

    /// Soft cap on the number of live handles.
    max_size: usize,

    /// The idle list and handle counts.
    state: Mutex<PoolState<F::Handle>>,
}

/// The mutable state of a pool.
struct PoolState<H> {
    /// Handles ready for reuse.
    idle: Vec<H>,

    /// Number of handles currently owned by in-flight queries.
    busy: usize,

    /// Number of live handles, idle and busy together.
    total: usize,

    /// Largest `total` seen so far; warned about when above the cap.
    high_water: usize,
}

impl<H> PoolState<H> {
    /// Accounts for a newly created handle.
    ///
    /// Returns the new high-water mark if this growth is the first to
    /// reach it while above the cap. A pool oscillating below and back up
    /// to a mark it has already reported stays quiet.
    fn note_growth(&mut self, max_size: usize) -> Option<usize> {
        self.total += 1;
        if self.total > max_size && self.total > self.high_water {
            self.high_water = self.total;
            Some(self.total)
        } else {
            None
        }
    }
}

impl<F: HandleFactory> ResolverPool<F> {
    /// Creates a new, empty pool.
    pub fn new(factory: F, conf: ResolvConf, max_size: usize) -> Self {
        ResolverPool {
            factory,
            conf,
            max_size,
            state: Mutex::new(PoolState {
                idle: Vec::new(),
                busy: 0,
                total: 0,
                high_water: 0,
            }),
        }
    }

    /// Returns the configuration handles are created from.
    pub fn conf(&self) -> &ResolvConf {
        &self.conf
    }

    /// Acquires a handle, creating one if no idle handle is available.
    ///
    /// Never blocks. Growing past the soft cap is not an error; each new
    /// high-water mark above the cap is logged once.
    pub fn acquire(&self) -> F::Handle {
        {
            let mut state = self.state.lock().expect("poisoned lock");
            if let Some(handle) = state.idle.pop() {
                state.busy += 1;
                return handle;
            }
            state.busy += 1;
            if let Some(high_water) = state.note_growth(self.max_size) {
                warn!(
                    total = high_water,
                    max = self.max_size,
                    "resolver pool grew past its configured maximum"
                );
            }
        }
        // Created outside the lock; the counts above already account for
        // this handle.
        self.factory.create(&self.conf)
    }

    /// Releases a handle after a query.
    ///
    /// The handle is returned to the idle list only if the query succeeded
    /// and the pool is within its cap; otherwise it is dropped.
    pub fn release(&self, handle: F::Handle, succeeded: bool) {
        let mut state = self.state.lock().expect("poisoned lock");
        state.busy = state.busy.saturating_sub(1);
        if succeeded && state.total <= self.max_size {
            state.idle.push(handle);
        } else {
            state.total = state.total.saturating_sub(1);
            drop(state);
            drop(handle);
        }
    }

    /// Returns the number of idle handles.
    pub fn idle_count(&self) -> usize {
        self.state.lock().expect("poisoned lock").idle.len()
    }

    /// Returns the number of handles owned by in-flight queries.
    pub fn busy_count(&self) -> usize {
        self.state.lock().expect("poisoned lock").busy
    }

    /// Returns the number of live handles.
    pub fn total_count(&self) -> usize {
        self.state.lock().expect("poisoned lock").total
    }
}

//============ Testing =======================================================
