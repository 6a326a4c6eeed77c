//! imageconceal - hide arbitrary files inside JPEG, PNG and WebP cover
//! images using password-keyed steganography.
//!
//! - Argon2id derives a cipher key and PRNG seed from the password
//! - A keyed stream PRNG permutes the cover's carrier bytes (Fisher-Yates)
//! - XChaCha20-Poly1305 seals each hidden file into its own on-image frame
//! - Deflate compresses each file's record unless `--uncompressed` is set

pub mod carrier;
pub mod cipher;
pub mod cli;
pub mod config;
pub mod embedding;
pub mod engine;
pub mod error;
pub mod file;
pub mod framer;
pub mod image_io;
pub mod password;
pub mod types;
pub mod ui;
