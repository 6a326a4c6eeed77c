//! Key derivation with Argon2id.
//!
//! One invocation produces 64 bytes: the first 32 become the cipher key,
//! the last 32 seed the permutation PRNG. The salt is fixed (see
//! [`crate::config::KDF_SALT`]) — the password is the only secret, and a
//! fixed salt is what makes the derivation (and therefore the carrier
//! permutation) reproducible for a given password.

use argon2::Algorithm::Argon2id;
use argon2::Version::V0x13;
use argon2::{Argon2, Params};

use crate::config::{KDF_MEMORY_COST_KIB, KDF_OUTPUT_LEN, KDF_PARALLELISM, KDF_SALT, KDF_TIME_COST};
use crate::error::StegError;

/// Cipher key and PRNG seed derived from a password.
pub struct DerivedMaterial {
    pub key: [u8; 32],
    pub seed: [u8; 32],
}

pub fn derive(password: &[u8]) -> Result<DerivedMaterial, StegError> {
    let params = Params::new(KDF_MEMORY_COST_KIB, KDF_TIME_COST, KDF_PARALLELISM, Some(KDF_OUTPUT_LEN))
        .map_err(|_| StegError::NoMemory)?;
    let argon2 = Argon2::new(Argon2id, V0x13, params);

    let mut output = [0u8; KDF_OUTPUT_LEN];
    argon2
        .hash_password_into(password, KDF_SALT, &mut output)
        .map_err(|_| StegError::NoMemory)?;

    let mut key = [0u8; 32];
    let mut seed = [0u8; 32];
    key.copy_from_slice(&output[..32]);
    seed.copy_from_slice(&output[32..]);

    Ok(DerivedMaterial { key, seed })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        let a = derive(b"hunter2").unwrap();
        let b = derive(b"hunter2").unwrap();
        assert_eq!(a.key, b.key);
        assert_eq!(a.seed, b.seed);
    }

    #[test]
    fn different_passwords_diverge() {
        let a = derive(b"hunter2").unwrap();
        let b = derive(b"hunter3").unwrap();
        assert_ne!(a.key, b.key);
        assert_ne!(a.seed, b.seed);
    }

    #[test]
    fn empty_password_is_allowed() {
        assert!(derive(b"").is_ok());
    }

    #[test]
    fn key_and_seed_are_not_equal() {
        let material = derive(b"correct horse battery staple").unwrap();
        assert_ne!(material.key, material.seed);
    }
}
