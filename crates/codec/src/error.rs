use std::io;

use thiserror::Error;

/// Errors produced by the handshake and file-at-rest codec.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Transport failure while exchanging public values.
    #[error("I/O error during key exchange: {0}")]
    Io(
        #[from]
        #[source]
        io::Error,
    ),

    /// The peer closed the connection mid-handshake.
    #[error("peer closed connection before the handshake completed")]
    HandshakeIncomplete,

    /// The stored IV prefix did not match the session IV: either the
    /// wrong key is in use or the file is corrupted. See §9(b): this check
    /// conflates authentication with nonce handling and is not an AEAD tag.
    #[error("corrupted payload or wrong session key")]
    CorruptedOrWrongKey,
}

/// Crate-local result alias.
pub type CodecResult<T> = Result<T, CodecError>;
