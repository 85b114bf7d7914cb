//! Key-exchange handshake and symmetric stream cipher.
//!
//! Both endpoints agree on a shared session key via a two-message
//! handshake: the client sends its public value first, the server replies
//! with its own, and each side deterministically derives the same
//! [`SessionKey`] from the shared secret. After the handshake the codec
//! exposes two stream operations over any bytes — [`SessionKey::seal`] and
//! [`SessionKey::open`] — which are length-preserving and mutually
//! inverse.
//!
//! The handshake in this module is a placeholder for true
//! Diffie-Hellman key agreement; see [`dh`] for the caveat. Any
//! replacement cipher must satisfy the length-preserving symmetric
//! contract this crate's tests pin down.

mod dh;
mod error;
mod key;

use std::io::{Read, Write};

pub use error::{CodecError, CodecResult};
pub use key::SessionKey;

use dh::DhKeyPair;

/// The two-message, client-first key exchange.
pub struct Handshake;

impl Handshake {
    /// Performs the client side of the handshake: send our public value
    /// first, then receive the server's.
    pub fn client_side<S: Read + Write>(stream: &mut S) -> CodecResult<SessionKey> {
        let pair = DhKeyPair::generate();
        dh::write_public_value(stream, pair.public_key)?;
        let other_public = dh::read_public_value(stream)?;
        Ok(SessionKey::derive(pair.shared_secret(other_public)))
    }

    /// Performs the server side of the handshake: receive the client's
    /// public value first, then reply with ours.
    pub fn server_side<S: Read + Write>(stream: &mut S) -> CodecResult<SessionKey> {
        let pair = DhKeyPair::generate();
        let other_public = dh::read_public_value(stream)?;
        dh::write_public_value(stream, pair.public_key)?;
        Ok(SessionKey::derive(pair.shared_secret(other_public)))
    }
}
