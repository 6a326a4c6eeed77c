//! Cryptographic core: key derivation, the permutation PRNG, and the
//! authenticated stream cipher that seals each hidden file's record.

pub mod cipher;
pub mod derive;
pub mod prng;

use crate::error::StegError;

pub use cipher::CipherContext;
pub use derive::DerivedMaterial;
pub use prng::Prng;

/// Everything a [`crate::carrier::CarrierImage`] needs once a password has
/// been turned into key material: a cipher bound to the key, and a PRNG
/// bound to the seed. One `CryptoContext` is created per opened image.
pub struct CryptoContext {
    pub cipher: CipherContext,
    pub prng: Prng,
}

impl CryptoContext {
    pub fn from_password(password: &[u8]) -> Result<Self, StegError> {
        let material = derive::derive(password)?;
        Ok(Self { cipher: CipherContext::new(&material.key), prng: Prng::from_seed(material.seed) })
    }
}
