//! The typed error taxonomy the engine branches on.
//!
//! The CLI layer wraps these in `anyhow::Context` for human-facing
//! messages, but the engine itself needs to distinguish `InvalidMagic`
//! and `PayloadOob` (expected terminators of the extract loop) from every
//! other variant (which are genuine failures), so a plain `anyhow::Error`
//! is not enough here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StegError {
    #[error("out of memory during key derivation")]
    NoMemory,

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("path is a directory: {0}")]
    PathIsDir(String),

    #[error("cover image format not recognized")]
    FileInvalid,

    #[error("image codec rejected the file: {0}")]
    CodecFail(String),

    #[error("file too big to fit in the remaining carrier capacity")]
    FileTooBig,

    #[error("source file exceeds the maximum size of {limit} bytes")]
    InputFileTooLarge { limit: u64 },

    #[error("file name too long to store")]
    NameTooLong,

    #[error("source file changed size while being read")]
    FileCorrupted,

    #[error("decryption failed: wrong password or corrupted frame")]
    CryptoFail,

    #[error("no cipher frame at this position")]
    InvalidMagic,

    #[error("read would exceed the carrier's capacity")]
    PayloadOob,

    #[error("frame version {found} is newer than the supported version {supported}")]
    NewerVersion { found: u32, supported: u32 },

    #[error("could not find a free output name after {0} attempts")]
    FileExists(u32),

    #[error("could not save output image: {0}")]
    SaveFail(String),

    #[error("cover image has no usable carrier capacity")]
    NoCapacity,

    #[error("--append found no existing payload; refusing to overwrite the cover with the wrong password")]
    AppendSafeguard,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StegError {
    /// `true` for the two conditions the extract loop expects to hit
    /// eventually and treats as "no more payloads here", not as failures.
    pub fn is_expected_terminator(&self) -> bool {
        matches!(self, StegError::InvalidMagic | StegError::PayloadOob)
    }
}

pub type Result<T> = std::result::Result<T, StegError>;
