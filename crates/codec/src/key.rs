use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

use rand::{RngCore, SeedableRng};
use rand::rngs::StdRng;
use zeroize::Zeroize;

use crate::error::{CodecError, CodecResult};

const IV_LEN: usize = 16;
const KEY_LEN: usize = 32;

/// A symmetric key and IV pair established per-session at handshake time.
///
/// Owned by the session that negotiated it and dropped (zeroizing its
/// bytes) when that session ends — it is never shared across sessions.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct SessionKey {
    key: [u8; KEY_LEN],
    iv: [u8; IV_LEN],
}

impl SessionKey {
    /// Deterministically derives a key/IV pair from the shared secret
    /// established by the handshake. Both sides of a handshake call this
    /// with the same `shared_secret` and therefore agree on the same key.
    pub(crate) fn derive(shared_secret: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(shared_secret);
        let mut key = [0u8; KEY_LEN];
        let mut iv = [0u8; IV_LEN];
        rng.fill_bytes(&mut key);
        rng.fill_bytes(&mut iv);
        Self { key, iv }
    }

    /// Builds a session key directly from raw bytes. Exposed for tests and
    /// for callers that perform their own key exchange.
    #[must_use]
    pub fn from_parts(key: [u8; KEY_LEN], iv: [u8; IV_LEN]) -> Self {
        Self { key, iv }
    }

    /// The session's 16-byte IV. Exposed so transports can announce it
    /// or compare against a stored value without consuming the key.
    #[must_use]
    pub fn iv(&self) -> &[u8; IV_LEN] {
        &self.iv
    }

    /// Length-preserving, symmetric XOR keystream transform. `open(seal(x))
    /// == x` for any `x` and any session key — the fundamental contract
    /// every replacement cipher must satisfy (§4.1, §8).
    #[must_use]
    pub fn seal(&self, bytes: &[u8]) -> Vec<u8> {
        xor_with_key(bytes, &self.key)
    }

    /// Inverse of [`SessionKey::seal`]; identical operation since the
    /// transform is its own inverse.
    #[must_use]
    pub fn open(&self, bytes: &[u8]) -> Vec<u8> {
        xor_with_key(bytes, &self.key)
    }

    /// Writes `bytes` to `path` in the file-at-rest format: a 16-byte IV
    /// prefix followed by the sealed ciphertext.
    pub fn seal_to_file(&self, path: &Path, bytes: &[u8]) -> io::Result<()> {
        let mut file = File::create(path)?;
        file.write_all(&self.iv)?;
        file.write_all(&self.seal(bytes))?;
        Ok(())
    }

    /// Reads and decrypts a file written by [`SessionKey::seal_to_file`].
    /// Fails with [`CodecError::CorruptedOrWrongKey`] if the stored IV does
    /// not match this session's IV exactly.
    pub fn open_from_file(&self, path: &Path) -> CodecResult<Vec<u8>> {
        let mut file = File::open(path)?;
        let mut stored_iv = [0u8; IV_LEN];
        file.read_exact(&mut stored_iv)
            .map_err(|_| CodecError::CorruptedOrWrongKey)?;
        if stored_iv != self.iv {
            return Err(CodecError::CorruptedOrWrongKey);
        }
        let mut ciphertext = Vec::new();
        file.read_to_end(&mut ciphertext)?;
        Ok(self.open(&ciphertext))
    }
}

fn xor_with_key(bytes: &[u8], key: &[u8; KEY_LEN]) -> Vec<u8> {
    bytes
        .iter()
        .enumerate()
        .map(|(i, byte)| byte ^ key[i % key.len()])
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_key() -> SessionKey {
        SessionKey::derive(42)
    }

    #[test]
    fn open_of_seal_is_identity() {
        let session = sample_key();
        let plaintext = b"the quick brown fox jumps over the lazy dog";
        let ciphertext = session.seal(plaintext);
        assert_eq!(session.open(&ciphertext), plaintext);
    }

    #[test]
    fn seal_preserves_length() {
        let session = sample_key();
        for len in [0, 1, 31, 32, 33, 4096] {
            let plaintext = vec![7u8; len];
            assert_eq!(session.seal(&plaintext).len(), len);
        }
    }

    #[test]
    fn same_shared_secret_derives_identical_keys() {
        let a = SessionKey::derive(1234);
        let b = SessionKey::derive(1234);
        assert_eq!(a.key, b.key);
        assert_eq!(a.iv, b.iv);
    }

    #[test]
    fn different_shared_secrets_derive_different_keys() {
        let a = SessionKey::derive(1);
        let b = SessionKey::derive(2);
        assert_ne!(a.key, b.key);
    }

    #[test]
    fn file_round_trip_succeeds_with_matching_key() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("payload.enc");
        let session = sample_key();
        let plaintext = b"file contents";

        session.seal_to_file(&path, plaintext).expect("seal to file");
        let recovered = session.open_from_file(&path).expect("open from file");

        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn file_open_fails_on_iv_mismatch() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("payload.enc");
        let writer = SessionKey::derive(1);
        let reader = SessionKey::derive(2);

        writer
            .seal_to_file(&path, b"secret")
            .expect("seal to file");

        let err = reader.open_from_file(&path).unwrap_err();
        assert!(matches!(err, CodecError::CorruptedOrWrongKey));
    }
}
