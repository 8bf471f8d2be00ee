//! A caching DNS resolution engine.
//!
//! This crate answers the question "what records does this name currently
//! have" while keeping network round-trips to a minimum. It caches answer
//! sets by record type and name with TTL-based lazy expiry, follows CNAME
//! alias chains with a recursion bound, and resolves bare names by trying
//! record types in a fixed order while remembering which type last
//! succeeded for each name.
//!
//! The crate deliberately does not implement the DNS wire protocol. A
//! network query is performed by a [`QueryExecutor`] handle supplied by
//! the surrounding application through a [`HandleFactory`]; the engine
//! manages a bounded pool of such handles and reuses them across queries.
//!
//! # Modules
//!
//! * [`record`] holds the record types shared by all components,
//! * [`cache`] is the TTL-aware answer cache,
//! * [`pool`] manages the reusable query-execution handles,
//! * [`conf`] and [`hosts`] read the system resolver configuration and the
//!   static host table,
//! * [`resolver`] contains [`CachingResolver`], the engine itself,
//! * [`clock`] and [`error`] provide the time capability and the error
//!   type.
//!
//! The usual entry point is [`CachingResolver::new`] or
//! [`CachingResolver::from_conf`], followed by [`CachingResolver::resolve`]
//! for ordered-fallback resolution or [`CachingResolver::resolve_type`]
//! for a single record type.

pub mod cache;
pub mod clock;
pub mod conf;
pub mod error;
pub mod hosts;
pub mod pool;
pub mod record;
pub mod request;
pub mod resolver;

pub use crate::cache::AnswerCache;
pub use crate::conf::{ResolvConf, ResolverConfig};
pub use crate::error::Error;
pub use crate::pool::ResolverPool;
pub use crate::record::{AnswerRecord, AnswerSet, Class, RecordData, Rtype};
pub use crate::request::{HandleFactory, QueryExecutor, QueryResult};
pub use crate::resolver::CachingResolver;
