use core::fmt;

/// Errors that can surface out of the core back to the embedding host.
///
/// Almost nothing here is an error in the traditional sense: gate
/// misses, duplicate alloc starts, and frees of unknown starts are
/// silent no-ops handled inline, never constructing an `Error`. Sink
/// failure is the only case the host can catch and react to.
///
/// Allocating a tree node for a new tracked block is not modeled as a
/// variant here: `BlockIndex` has no fallible insert path on stable
/// Rust, so real exhaustion goes through the global allocator's
/// `handle_alloc_error` and aborts the process directly, rather than
/// unwinding through a `Result` the host could inspect.
#[derive(Debug)]
pub enum Error {
    /// The sink rejected a write. The tool keeps running and buffering;
    /// this is surfaced once so the host can log a diagnostic.
    SinkWrite,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SinkWrite => write!(f, "sink write failed"),
        }
    }
}

impl core::error::Error for Error {}

pub type Result<T> = core::result::Result<T, Error>;
