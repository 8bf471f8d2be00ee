//! Error type for resolution.

#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::error;
use std::fmt::{Display, Formatter};
use std::io;
use std::sync::Arc;

//------------ Error ---------------------------------------------------------

/// Error type for resolution.
///
/// Network errors are produced by the query executor and propagated to the
/// caller unchanged; the engine never retries a failed query for a given
/// type. Configuration problems are absorbed at startup with a warning and
/// never appear here.
#[derive(Clone, Debug)]
pub enum Error {
    /// The underlying transport failed.
    Transport(Arc<io::Error>),

    /// The query timed out.
    Timeout,

    /// A CNAME chain exceeded the recursion bound.
    RecursionLimit,

    /// Resolution produced no matching records.
    NoAnswer,
}

impl Error {
    /// Wraps an I/O error as a transport failure.
    pub fn transport(err: io::Error) -> Self {
        Error::Transport(Arc::new(err))
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        match self {
            Error::Transport(err) => write!(f, "transport error: {}", err),
            Error::Timeout => write!(f, "query timed out"),
            Error::RecursionLimit => {
                write!(f, "CNAME chain exceeded the recursion limit")
            }
            Error::NoAnswer => write!(f, "no matching records"),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Transport(err) => Some(err.as_ref()),
            Error::Timeout => None,
            Error::RecursionLimit => None,
            Error::NoAnswer => None,
        }
    }
}
