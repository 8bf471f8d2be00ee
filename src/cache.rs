//! The answer cache.
//!
//! This module implements a TTL-aware store mapping a record type and a
//! lowercased name to an answer set. Expiry is lazy: an entry past its TTL
//! is removed by the lookup that finds it, and there is no background
//! sweep. Inserting a set whose derived TTL is zero deletes any existing
//! entry for the key instead of storing it, matching the DNS rule that
//! zero-TTL records must not be cached.
//!
//! The cache also keeps a separate mapping from bare names to the record
//! type that last resolved successfully for them. The two key spaces are
//! independent; a memo lookup can never be confused with an answer lookup.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use crate::clock::{Clock, SystemClock};
use crate::record::{AnswerRecord, AnswerSet, Rtype};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

//------------ AnswerCache ---------------------------------------------------

/// A TTL-aware cache of answer sets.
///
/// The cache is shared mutable state visited by concurrently suspended
/// resolution tasks; each operation is one serialized read-modify-write
/// sequence and no lock is held across a suspension point. Re-inserting a
/// set for a key is always safe and simply overwrites.
#[derive(Debug)]
pub struct AnswerCache<C: Clock = SystemClock> {
    /// The stored answer sets.
    entries: Mutex<HashMap<CacheKey, CachedSet<C>>>,

    /// The record type that last resolved successfully, per name.
    last_types: Mutex<HashMap<String, Rtype>>,

    /// The clock used for expiring entries.
    clock: C,
}

impl<C: Clock> AnswerCache<C> {
    /// Creates a new, empty cache.
    pub fn new() -> Self {
        Self::with_clock(C::new())
    }

    /// Creates a new, empty cache using the given clock.
    pub fn with_clock(clock: C) -> Self {
        AnswerCache {
            entries: Mutex::new(HashMap::new()),
            last_types: Mutex::new(HashMap::new()),
            clock,
        }
    }

    /// Looks up the answer set for a type and name.
    ///
    /// The name is compared case-insensitively. An entry past its TTL is
    /// removed and reported as a miss; an entry is never returned past its
    /// TTL.
    pub fn lookup(
        &self,
        rtype: Rtype,
        name: &str,
    ) -> Option<Vec<AnswerRecord>> {
        let key = CacheKey::new(rtype, name);
        let mut entries = self.entries.lock().expect("poisoned lock");
        match entries.get(&key) {
            Some(cached) if !cached.is_expired(&self.clock) => {
                Some(cached.records.clone())
            }
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }

    /// Inserts an answer set, overwriting any prior entry for its key.
    ///
    /// The set's TTL is the minimum over its member records. A zero TTL
    /// deletes the key instead of storing.
    pub fn insert(&self, set: AnswerSet) {
        let key = CacheKey::new(set.rtype(), set.name());
        let valid_for = Duration::from_secs(u64::from(set.min_ttl()));
        let mut entries = self.entries.lock().expect("poisoned lock");
        if valid_for.is_zero() {
            entries.remove(&key);
            return;
        }
        entries.insert(
            key,
            CachedSet {
                created_at: self.clock.now(),
                valid_for,
                records: set.into_records(),
            },
        );
    }

    /// Returns the record type that last resolved successfully for a name.
    pub fn last_type(&self, name: &str) -> Option<Rtype> {
        self.last_types
            .lock()
            .expect("poisoned lock")
            .get(&name.to_ascii_lowercase())
            .copied()
    }

    /// Records the record type that resolved successfully for a name.
    pub fn set_last_type(&self, name: &str, rtype: Rtype) {
        self.last_types
            .lock()
            .expect("poisoned lock")
            .insert(name.to_ascii_lowercase(), rtype);
    }

    /// Forgets the memoized record type for a name.
    pub fn clear_last_type(&self, name: &str) {
        self.last_types
            .lock()
            .expect("poisoned lock")
            .remove(&name.to_ascii_lowercase());
    }
}

impl<C: Clock> Default for AnswerCache<C> {
    fn default() -> Self {
        Self::new()
    }
}

//------------ CacheKey ------------------------------------------------------

/// The key for cache entries.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
struct CacheKey {
    /// The requested record type.
    rtype: Rtype,

    /// The requested name, lowercased.
    name: String,
}

impl CacheKey {
    /// Creates a new key, lowercasing the name.
    fn new(rtype: Rtype, name: &str) -> Self {
        CacheKey {
            rtype,
            name: name.to_ascii_lowercase(),
        }
    }
}

//------------ CachedSet -----------------------------------------------------

/// A stored answer set.
#[derive(Debug)]
struct CachedSet<C: Clock> {
    /// Creation time of the entry.
    created_at: C::Instant,

    /// The amount of time the entry is valid.
    valid_for: Duration,

    /// The member records.
    records: Vec<AnswerRecord>,
}

impl<C: Clock> CachedSet<C> {
    /// Returns whether the entry is past its TTL.
    ///
    /// An entry whose TTL has elapsed exactly is expired; a set cached
    /// with a TTL of five seconds serves lookups for strictly less than
    /// five seconds.
    fn is_expired(&self, clock: &C) -> bool {
        clock.elapsed(&self.created_at) >= self.valid_for
    }
}

//============ Testing =======================================================
