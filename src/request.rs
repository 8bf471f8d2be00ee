//! Traits connecting the engine to its query transport.
//!
//! The engine does not speak the DNS wire protocol itself. A single network
//! query is performed by a [`QueryExecutor`] handle supplied by the
//! surrounding application, and handles are created on demand through a
//! [`HandleFactory`]. The pool owns idle handles and hands exclusive
//! ownership of one to a resolution task for the duration of a query.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use crate::conf::ResolvConf;
use crate::error::Error;
use crate::record::{AnswerRecord, Rtype};
use std::future::Future;
use std::pin::Pin;

//------------ QueryResult ---------------------------------------------------

/// The outcome of a single network query.
///
/// A successful query resolves to the raw answer records of the response,
/// which may include records for names and types other than the ones asked
/// for. Cancellation and timeouts are the executor's responsibility and
/// surface as [`Error`] values.
pub type QueryResult = Result<Vec<AnswerRecord>, Error>;

//------------ QueryExecutor -------------------------------------------------

/// A reusable query-execution handle.
///
/// A handle is exclusively owned by one resolution task between pool
/// acquire and release, so queries take `&mut self`. A handle whose query
/// failed is never returned to the pool; its internal state is considered
/// unknown.
pub trait QueryExecutor: Send {
    /// Sends a single query for a name and type.
    fn query<'a>(
        &'a mut self,
        name: &'a str,
        rtype: Rtype,
    ) -> Pin<Box<dyn Future<Output = QueryResult> + Send + 'a>>;
}

//------------ HandleFactory -------------------------------------------------

/// Creates query-execution handles on demand for the pool.
pub trait HandleFactory: Send + Sync {
    /// The type of handle this factory creates.
    type Handle: QueryExecutor;

    /// Creates a new handle from the merged resolver configuration.
    fn create(&self, conf: &ResolvConf) -> Self::Handle;
}
