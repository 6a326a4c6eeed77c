//! Authenticated stream cipher used to seal one hidden file's inner record
//! into a single on-image frame.
//!
//! Every hidden file is exactly one sealed message: the inner record is
//! composed and compressed in full before this module ever sees it, so
//! there is no chunking and therefore no "final tag" bookkeeping to get
//! wrong — the AEAD tag on the one ciphertext is the final tag.

use byteorder::{ByteOrder, LittleEndian};
use chacha20poly1305::aead::{Aead, KeyInit, OsRng};
use chacha20poly1305::{AeadCore, XChaCha20Poly1305, XNonce};

use crate::config::{CRYPTO_VERSION, FRAME_MAGIC, NONCE_SIZE, TAG_SIZE};
use crate::error::StegError;

/// Plaintext frame prefix: magic(4) + version(4) + ciphertext_len(4).
pub const FRAME_PREFIX_LEN: usize = 4 + 4 + 4;

pub struct CipherContext {
    cipher: XChaCha20Poly1305,
}

impl CipherContext {
    pub fn new(key: &[u8; 32]) -> Self {
        Self { cipher: XChaCha20Poly1305::new(key.into()) }
    }

    /// Seal `plaintext` into a full on-image frame: prefix, nonce, ciphertext+tag.
    pub fn seal(&self, plaintext: &[u8]) -> Result<Vec<u8>, StegError> {
        let nonce = XChaCha20Poly1305::generate_nonce(&mut OsRng);
        let ciphertext = self.cipher.encrypt(&nonce, plaintext).map_err(|_| StegError::CryptoFail)?;

        let ciphertext_len = (NONCE_SIZE + ciphertext.len()) as u32;
        let mut frame = Vec::with_capacity(FRAME_PREFIX_LEN + NONCE_SIZE + ciphertext.len());
        frame.extend_from_slice(&FRAME_MAGIC);
        let mut version_buf = [0u8; 4];
        LittleEndian::write_u32(&mut version_buf, CRYPTO_VERSION);
        frame.extend_from_slice(&version_buf);
        let mut len_buf = [0u8; 4];
        LittleEndian::write_u32(&mut len_buf, ciphertext_len);
        frame.extend_from_slice(&len_buf);
        frame.extend_from_slice(&nonce);
        frame.extend_from_slice(&ciphertext);

        Ok(frame)
    }

    /// Parse the plaintext prefix of a frame, returning the declared
    /// ciphertext length (nonce + ciphertext + tag) without touching the
    /// bytes that follow. Used both by `open` and by the append-mode
    /// seek-to-end scan, which never decrypts.
    pub fn parse_prefix(bytes: &[u8]) -> Result<u32, StegError> {
        if bytes.len() < FRAME_PREFIX_LEN {
            return Err(StegError::PayloadOob);
        }
        if bytes[0..4] != FRAME_MAGIC {
            return Err(StegError::InvalidMagic);
        }
        let version = LittleEndian::read_u32(&bytes[4..8]);
        if version > CRYPTO_VERSION {
            return Err(StegError::NewerVersion { found: version, supported: CRYPTO_VERSION });
        }
        Ok(LittleEndian::read_u32(&bytes[8..12]))
    }

    /// Open a frame body (nonce + ciphertext + tag, i.e. everything after
    /// the 12-byte prefix) back into plaintext.
    pub fn open(&self, body: &[u8]) -> Result<Vec<u8>, StegError> {
        if body.len() < NONCE_SIZE + TAG_SIZE {
            return Err(StegError::PayloadOob);
        }
        let nonce = XNonce::from_slice(&body[..NONCE_SIZE]);
        let ciphertext = &body[NONCE_SIZE..];
        self.cipher.decrypt(nonce, ciphertext).map_err(|_| StegError::CryptoFail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrips_plaintext() {
        let ctx = CipherContext::new(&[1u8; 32]);
        let frame = ctx.seal(b"hidden message").unwrap();
        let ciphertext_len = CipherContext::parse_prefix(&frame).unwrap() as usize;
        let body = &frame[FRAME_PREFIX_LEN..FRAME_PREFIX_LEN + ciphertext_len];
        let plaintext = ctx.open(body).unwrap();
        assert_eq!(plaintext, b"hidden message");
    }

    #[test]
    fn wrong_key_fails_to_open() {
        let sealed = CipherContext::new(&[1u8; 32]).seal(b"secret").unwrap();
        let ciphertext_len = CipherContext::parse_prefix(&sealed).unwrap() as usize;
        let body = &sealed[FRAME_PREFIX_LEN..FRAME_PREFIX_LEN + ciphertext_len];
        let err = CipherContext::new(&[2u8; 32]).open(body).unwrap_err();
        assert!(matches!(err, StegError::CryptoFail));
    }

    #[test]
    fn tampered_ciphertext_fails_auth() {
        let ctx = CipherContext::new(&[5u8; 32]);
        let mut sealed = ctx.seal(b"tamper me").unwrap();
        let last = sealed.len() - 1;
        sealed[last] ^= 0xFF;
        let ciphertext_len = CipherContext::parse_prefix(&sealed).unwrap() as usize;
        let body = &sealed[FRAME_PREFIX_LEN..FRAME_PREFIX_LEN + ciphertext_len];
        assert!(matches!(ctx.open(body), Err(StegError::CryptoFail)));
    }

    #[test]
    fn rejects_bad_magic() {
        let mut sealed = CipherContext::new(&[1u8; 32]).seal(b"x").unwrap();
        sealed[0] = b'X';
        assert!(matches!(CipherContext::parse_prefix(&sealed), Err(StegError::InvalidMagic)));
    }

    #[test]
    fn rejects_newer_version() {
        let mut sealed = CipherContext::new(&[1u8; 32]).seal(b"x").unwrap();
        LittleEndian::write_u32(&mut sealed[4..8], CRYPTO_VERSION + 1);
        assert!(matches!(
            CipherContext::parse_prefix(&sealed),
            Err(StegError::NewerVersion { .. })
        ));
    }

    #[test]
    fn truncated_prefix_is_oob() {
        assert!(matches!(CipherContext::parse_prefix(&[0u8; 4]), Err(StegError::PayloadOob)));
    }
}
