use std::io::{self, Read, Write};

use rand::Rng;

use crate::error::CodecResult;

/// Toy Diffie-Hellman parameters, reproduced from the original key exchange
/// for contract compatibility. **Not cryptographically sound** — the prime
/// is far too small for real use. See §4.1's rationale and §9's "Stream
/// cipher placeholder" design note: a production deployment must replace
/// this with a real key-agreement primitive while keeping the two-message,
/// client-first handshake shape.
const DH_PRIME: u64 = 23;
const DH_GENERATOR: u64 = 5;

/// One side's ephemeral Diffie-Hellman key pair.
pub(crate) struct DhKeyPair {
    private_key: u64,
    pub(crate) public_key: u64,
}

impl DhKeyPair {
    pub(crate) fn generate() -> Self {
        let private_key = rand::thread_rng().gen_range(1..=20);
        let public_key = mod_pow(DH_GENERATOR, private_key, DH_PRIME);
        Self {
            private_key,
            public_key,
        }
    }

    pub(crate) fn shared_secret(&self, other_public_key: u64) -> u64 {
        mod_pow(other_public_key, self.private_key, DH_PRIME)
    }
}

fn mod_pow(mut base: u64, mut exponent: u64, modulus: u64) -> u64 {
    let mut result = 1;
    base %= modulus;
    while exponent > 0 {
        if exponent % 2 == 1 {
            result = (result * base) % modulus;
        }
        exponent /= 2;
        base = (base * base) % modulus;
    }
    result
}

pub(crate) fn write_public_value(stream: &mut impl Write, value: u64) -> io::Result<()> {
    stream.write_all(&value.to_be_bytes())?;
    stream.flush()
}

pub(crate) fn read_public_value(stream: &mut impl Read) -> CodecResult<u64> {
    let mut buf = [0u8; 8];
    stream.read_exact(&mut buf)?;
    Ok(u64::from_be_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_sides_derive_the_same_shared_secret() {
        let client = DhKeyPair::generate();
        let server = DhKeyPair::generate();

        let client_secret = client.shared_secret(server.public_key);
        let server_secret = server.shared_secret(client.public_key);

        assert_eq!(client_secret, server_secret);
    }

    #[test]
    fn mod_pow_matches_naive_exponentiation() {
        assert_eq!(mod_pow(5, 3, 23), 125 % 23);
        assert_eq!(mod_pow(2, 10, 1000), 1024 % 1000);
    }
}
