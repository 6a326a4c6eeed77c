//! Fixed-capacity password buffer with best-effort memory locking and
//! guaranteed zeroization on drop.

use crate::config::PASSWORD_BUFFER_CAPACITY;
use crate::error::StegError;
use zeroize::Zeroize;

/// Holds the plaintext password bytes between the CLI prompt and the key
/// derivation call. Locking the backing page is best-effort: on platforms
/// or under privilege levels where `mlock` fails, the buffer is still used,
/// it just isn't pinned out of swap. Zeroization on drop always happens.
pub struct PasswordBuffer {
    bytes: Vec<u8>,
    locked: bool,
}

impl PasswordBuffer {
    pub fn from_bytes(data: &[u8]) -> Result<Self, StegError> {
        if data.len() > PASSWORD_BUFFER_CAPACITY {
            return Err(StegError::NameTooLong);
        }
        let mut bytes = data.to_vec();
        let locked = lock(&mut bytes);
        Ok(Self { bytes, locked })
    }

    pub fn empty() -> Self {
        Self { bytes: Vec::new(), locked: false }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl Drop for PasswordBuffer {
    fn drop(&mut self) {
        if self.locked {
            unlock(&mut self.bytes);
        }
        self.bytes.zeroize();
    }
}

#[cfg(unix)]
fn lock(buf: &mut [u8]) -> bool {
    if buf.is_empty() {
        return false;
    }
    let rc = unsafe { libc::mlock(buf.as_ptr().cast(), buf.len()) };
    rc == 0
}

#[cfg(unix)]
fn unlock(buf: &mut [u8]) {
    if buf.is_empty() {
        return;
    }
    unsafe {
        libc::munlock(buf.as_ptr().cast(), buf.len());
    }
}

#[cfg(not(unix))]
fn lock(_buf: &mut [u8]) -> bool {
    false
}

#[cfg(not(unix))]
fn unlock(_buf: &mut [u8]) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_oversized_password() {
        let data = vec![0u8; PASSWORD_BUFFER_CAPACITY + 1];
        assert!(PasswordBuffer::from_bytes(&data).is_err());
    }

    #[test]
    fn empty_password_is_allowed() {
        let buf = PasswordBuffer::empty();
        assert!(buf.as_bytes().is_empty());
    }

    #[test]
    fn roundtrips_bytes() {
        let buf = PasswordBuffer::from_bytes(b"hunter2").unwrap();
        assert_eq!(buf.as_bytes(), b"hunter2");
    }
}
