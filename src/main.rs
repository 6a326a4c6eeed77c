// imageconceal - hide files inside JPEG, PNG and WebP cover images.
//
// Pipeline: Argon2id key derivation -> keyed-PRNG carrier permutation ->
// Deflate + XChaCha20-Poly1305 per hidden file -> bit-packed into the
// permuted carrier bytes of the decoded cover image.

mod carrier;
mod cipher;
mod cli;
mod config;
mod embedding;
mod engine;
mod error;
mod file;
mod framer;
mod image_io;
mod password;
mod types;
mod ui;

use std::process;

use cli::Cli;
use tracing_subscriber::EnvFilter;

/// Entry point. Parses command-line arguments, configures logging verbosity,
/// and dispatches to the hide/extract/check flow.
///
/// # Exit Codes
/// * 0 - Success
/// * 1 - Error (message printed to stderr)
fn main() {
    let cli = Cli::parse_args();
    init_tracing(cli.verbose);

    if let Err(e) = cli.execute() {
        eprintln!("Error: {e:?}");
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).without_time().init();
}
