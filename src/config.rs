//! Protocol constants shared by every layer of the crate.
//!
//! Anything that is part of the on-image wire format, or that tunes a
//! security parameter, lives here rather than being inlined at its call
//! site, so that a reader auditing the format only has one place to look.

/// Name shown in `--help` and log output.
pub const APP_NAME: &str = "imageconceal";

/// Fixed Argon2id salt. Sixteen ASCII bytes, matching `crypto_pwhash_SALTBYTES`
/// in the reference implementation this tool is compatible with. A fixed
/// salt means two runs with the same password derive the same key and the
/// same permutation, which is the whole point: the password alone is the
/// secret, not a per-image nonce.
pub const KDF_SALT: &[u8; 16] = b"imageconceal2023";

/// Argon2id time cost ("opslimit" in libsodium's naming).
pub const KDF_TIME_COST: u32 = 3;

/// Argon2id memory cost in KiB ("memlimit" in libsodium's naming, 4096000 bytes).
pub const KDF_MEMORY_COST_KIB: u32 = 4000;

/// Argon2id parallelism. Kept at 1 so the derivation is reproducible
/// regardless of how many cores the host has.
pub const KDF_PARALLELISM: u32 = 1;

/// Bytes of KDF output: 32 for the cipher key, 32 for the PRNG seed.
pub const KDF_OUTPUT_LEN: usize = 64;

/// Cipher key size in bytes (first half of the KDF output).
pub const KEY_SIZE: usize = 32;

/// PRNG seed size in bytes (second half of the KDF output).
pub const PRNG_SEED_SIZE: usize = 32;

/// Magic bytes that open every on-image cipher frame.
pub const FRAME_MAGIC: [u8; 4] = *b"imcl";

/// Current cipher frame version. Frames with a higher version are rejected
/// with `NewerVersion` rather than guessed at.
pub const CRYPTO_VERSION: u32 = 1;

/// XChaCha20-Poly1305 nonce size, serialized as the frame's stream header.
pub const NONCE_SIZE: usize = 24;

/// Poly1305 tag size appended to every sealed frame.
pub const TAG_SIZE: usize = 16;

/// FileInfo schema version when the tail is Deflate-compressed (default).
pub const FILEINFO_VERSION_COMPRESSED: u32 = 1;

/// FileInfo schema version when `--uncompressed` was requested: the tail
/// is stored verbatim and `compressed_size == uncompressed_size`.
pub const FILEINFO_VERSION_UNCOMPRESSED: u32 = 2;

/// Upper bound on a single hidden file's size, matching the reference
/// implementation's `IMC_MAX_INPUT_SIZE`.
pub const MAX_INPUT_SIZE: u64 = 500_000_000;

/// Upper bound on a stored file name, including the terminating NUL.
pub const MAX_FILENAME_LENGTH: usize = u16::MAX as usize;

/// How many " (N)" suffixes are tried before giving up on an output path.
pub const MAX_FILENAME_DUPLICATES: u32 = 99;

/// Fixed-capacity ceiling for the in-memory password buffer.
pub const PASSWORD_BUFFER_CAPACITY: usize = 4080;
