//! The resolution engine.
//!
//! [`CachingResolver`] orchestrates the pieces of this crate: it answers an
//! exact-type lookup from the cache or the network, demultiplexes
//! multi-record responses into cache entries, follows CNAME chains with a
//! recursion bound, and resolves names by trying record types in a fixed
//! order while remembering which type last succeeded for a name.
//!
//! The engine is designed for cooperative scheduling: issuing a network
//! query is the only suspension point, and concurrent resolution tasks
//! share the cache and the pool during such a suspension. Cache state after
//! a suspension is treated as possibly stale; re-inserting an answer set
//! for a key simply overwrites and is always safe.

use crate::cache::AnswerCache;
use crate::clock::{Clock, SystemClock};
use crate::conf::{ResolvConf, ResolverConfig};
use crate::error::Error;
use crate::hosts::Hosts;
use crate::pool::ResolverPool;
use crate::record::{AnswerRecord, AnswerSet, Rtype};
use crate::request::{HandleFactory, QueryExecutor};
use smallvec::SmallVec;
use std::collections::HashMap;
use tracing::{debug, warn};

//------------ Module Configuration ------------------------------------------

/// Record types tried, in order, by fallback resolution.
const FALLBACK_TYPES: [Rtype; 3] = [Rtype::A, Rtype::Aaaa, Rtype::Srv];

/// The maximum number of CNAME hops followed in one resolution.
const MAX_CHAIN_DEPTH: usize = 20;

//------------ CachingResolver -----------------------------------------------

/// A caching DNS resolution engine.
///
/// A resolver owns its answer cache and its pool of query handles, so
/// multiple independent resolvers can coexist and be torn down separately.
/// Network queries are performed by handles the supplied [`HandleFactory`]
/// creates; the engine itself never touches the wire.
///
/// Construction reads the hosts file and the resolver configuration file
/// named in the [`ResolverConfig`]. Both are optional: a missing file is
/// logged and replaced by an empty table or the default configuration.
pub struct CachingResolver<F: HandleFactory, C: Clock = SystemClock> {
    /// The answer cache.
    cache: AnswerCache<C>,

    /// The handle pool.
    pool: ResolverPool<F>,
}

impl<F: HandleFactory> CachingResolver<F, SystemClock> {
    /// Creates a new resolver using the system's default configuration.
    pub fn new(factory: F) -> Self {
        Self::from_conf(ResolverConfig::default(), factory)
    }

    /// Creates a new resolver using the given configuration.
    pub fn from_conf(config: ResolverConfig, factory: F) -> Self {
        Self::with_clock(config, factory, SystemClock::new())
    }
}

impl<F: HandleFactory, C: Clock> CachingResolver<F, C> {
    /// Creates a new resolver expiring cache entries by the given clock.
    pub fn with_clock(
        config: ResolverConfig,
        factory: F,
        clock: C,
    ) -> Self {
        let cache = AnswerCache::with_clock(clock);
        match Hosts::parse_file(&config.hosts_path) {
            Ok(hosts) => {
                for set in hosts.seed_sets() {
                    cache.insert(set);
                }
            }
            Err(err) => warn!(
                path = %config.hosts_path.display(),
                error = %err,
                "cannot read hosts file, starting with no static entries"
            ),
        }
        let conf = ResolvConf::load(&config);
        let pool = ResolverPool::new(factory, conf, config.max_pool_size);
        CachingResolver { cache, pool }
    }

    /// Returns the merged resolver configuration.
    pub fn conf(&self) -> &ResolvConf {
        self.pool.conf()
    }

    /// Returns the answer cache.
    pub fn cache(&self) -> &AnswerCache<C> {
        &self.cache
    }

    /// Returns the handle pool.
    pub fn pool(&self) -> &ResolverPool<F> {
        &self.pool
    }
}

/// # Resolution
///
impl<F: HandleFactory, C: Clock> CachingResolver<F, C> {
    /// Resolves a name by trying record types in order.
    ///
    /// The type that last resolved successfully for the name is tried
    /// first, followed by A, AAAA, and SRV. The first type producing a
    /// non-empty result wins and is remembered for the next call. If every
    /// candidate fails, the memo is cleared and the error of the last
    /// attempted candidate is returned; an empty result surfaces as
    /// [`Error::NoAnswer`].
    ///
    /// SRV target host names are returned as-is and not resolved further.
    pub async fn resolve(
        &self,
        name: &str,
    ) -> Result<Vec<AnswerRecord>, Error> {
        let name = name.to_ascii_lowercase();
        let memo = self.cache.last_type(&name);
        let mut candidates = SmallVec::<[Rtype; 4]>::new();
        candidates.extend(memo);
        candidates.extend(
            FALLBACK_TYPES.iter().copied().filter(|t| Some(*t) != memo),
        );

        let mut last = Error::NoAnswer;
        for rtype in candidates {
            match self.resolve_chased(&name, rtype, 0).await {
                Ok(records) if !records.is_empty() => {
                    self.cache.set_last_type(&name, rtype);
                    return Ok(records);
                }
                Ok(_) => last = Error::NoAnswer,
                Err(err) => last = err,
            }
            debug!(name = %name, rtype = %rtype, "no answer, trying next type");
        }
        self.cache.clear_last_type(&name);
        Err(last)
    }

    /// Resolves a name for a single record type, following CNAME aliases.
    pub async fn resolve_type(
        &self,
        name: &str,
        rtype: Rtype,
    ) -> Result<Vec<AnswerRecord>, Error> {
        self.resolve_chased(name, rtype, 0).await
    }

    /// Follows CNAME aliases until the requested type resolves.
    ///
    /// The depth counter is explicit and checked before every step; the
    /// chain, not the call stack, is what the bound protects against. When
    /// the exact lookup comes up empty (or fails) and a CNAME explains the
    /// name, resolution continues at the alias target. If there is no
    /// alias either, the original outcome stands, including its error.
    async fn resolve_chased(
        &self,
        name: &str,
        rtype: Rtype,
        mut depth: usize,
    ) -> Result<Vec<AnswerRecord>, Error> {
        let mut name = name.to_ascii_lowercase();
        loop {
            if depth > MAX_CHAIN_DEPTH {
                return Err(Error::RecursionLimit);
            }
            let primary = self.resolve_exact(&name, rtype).await;
            if rtype == Rtype::Cname {
                // Nothing further to follow.
                return primary;
            }
            if let Ok(records) = &primary {
                if !records.is_empty() {
                    return primary;
                }
            }
            let target = match self.resolve_exact(&name, Rtype::Cname).await
            {
                Ok(aliases) => aliases
                    .into_iter()
                    .find_map(AnswerRecord::into_cname_target),
                // The original failure is authoritative, not this one.
                Err(_) => None,
            };
            match target {
                Some(target) => {
                    debug!(
                        name = %name, target = %target, depth,
                        "following CNAME"
                    );
                    name = target.to_ascii_lowercase();
                    depth += 1;
                }
                None => return primary,
            }
        }
    }

    /// Resolves one name and type exactly, from the cache or the network.
    ///
    /// A network error is propagated unchanged; there is no retry at this
    /// layer. The handle is released on every exit path, with the success
    /// flag deciding whether it may be pooled again.
    async fn resolve_exact(
        &self,
        name: &str,
        rtype: Rtype,
    ) -> Result<Vec<AnswerRecord>, Error> {
        if let Some(records) = self.cache.lookup(rtype, name) {
            return Ok(records);
        }
        let mut handle = self.pool.acquire();
        let res = handle.query(name, rtype).await;
        self.pool.release(handle, res.is_ok());
        Ok(self.demux(name, rtype, res?))
    }

    /// Partitions a raw response and feeds the cache.
    ///
    /// Every record whose owner and type do not match the question becomes
    /// part of its own answer set; the matching records form the primary
    /// set, which is both cached and returned. This runs regardless of
    /// whether the primary set is empty, so accompanying records (such as
    /// the CNAMEs explaining an alias chain) are cached either way.
    fn demux(
        &self,
        name: &str,
        rtype: Rtype,
        answer: Vec<AnswerRecord>,
    ) -> Vec<AnswerRecord> {
        let name = name.to_ascii_lowercase();
        let mut primary = Vec::new();
        let mut extra: HashMap<(Rtype, String), Vec<AnswerRecord>> =
            HashMap::new();
        for record in answer {
            let owner = record.name().to_ascii_lowercase();
            if record.rtype() == rtype && owner == name {
                primary.push(record);
            } else {
                extra
                    .entry((record.rtype(), owner))
                    .or_default()
                    .push(record);
            }
        }
        for ((set_type, owner), records) in extra {
            debug!(
                name = %owner, rtype = %set_type,
                "caching accompanying answer set"
            );
            self.cache.insert(AnswerSet::new(&owner, set_type, records));
        }
        if !primary.is_empty() {
            self.cache
                .insert(AnswerSet::new(&name, rtype, primary.clone()));
        }
        primary
    }
}

//============ Testing =======================================================
