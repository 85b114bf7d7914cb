use std::io;

use thiserror::Error;

/// Errors raised while framing or parsing the wire protocol.
#[derive(Debug, Error)]
pub enum WireError {
    /// The underlying transport failed; per §7 this always terminates the
    /// affected session.
    #[error("transport error: {0}")]
    Transport(
        #[from]
        #[source]
        io::Error,
    ),

    /// A command line did not parse: either an unknown verb or a
    /// malformed argument list. Per §4.2 these are recovered at the
    /// session boundary with an `ERROR` response; the session stays open.
    #[error("{0}")]
    Protocol(#[from] ProtocolError),

    /// Fewer bytes arrived than the announced payload size before EOF.
    /// The caller is responsible for deleting any partial file.
    #[error("expected {expected} bytes but the peer sent only {received} before closing")]
    ShortRead { expected: u64, received: u64 },
}

/// The two recoverable parse failures named in §4.2/§7.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error("Unknown command")]
    UnknownVerb,
    #[error("Invalid command format")]
    InvalidFormat,
}

/// Crate-local result alias.
pub type WireResult<T> = Result<T, WireError>;
