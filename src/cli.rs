//! CLI commands and argument parsing.
//!
//! A thin shell around the library: it parses flags, acquires the
//! password, and dispatches to [`crate::engine`], rendering the result
//! through [`crate::ui`]. Exactly one of `--hide`, `--extract`, `--check`
//! must be given; `--algorithm` short-circuits everything else.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::Parser;

use crate::config::{APP_NAME, KDF_MEMORY_COST_KIB, KDF_PARALLELISM, KDF_TIME_COST};
use crate::engine;
use crate::password::PasswordBuffer;
use crate::types::OperationMode;
use crate::ui;
use crate::ui::prompt::Prompt;

/// Hide files inside JPEG, PNG and WebP cover images using password-keyed steganography.
#[derive(Parser)]
#[command(name = "imageconceal")]
#[command(version)]
pub struct Cli {
    /// Cover image when hiding.
    #[arg(short, long, value_name = "PATH")]
    pub input: Option<PathBuf>,

    /// Destination file (hide) or directory (extract).
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// File to hide; repeatable, multiple files may follow one `-h`.
    #[arg(short = 'h', long = "hide", value_name = "FILE", num_args = 1..)]
    pub hide: Vec<PathBuf>,

    /// Store each hidden file's record verbatim instead of Deflate-compressing it.
    #[arg(short = 'u', long = "uncompressed")]
    pub uncompressed: bool,

    /// Seek past payloads already present before inserting.
    #[arg(short = 'a', long = "append")]
    pub append: bool,

    /// Extract mode: cover image to read hidden files from.
    #[arg(short = 'e', long = "extract", value_name = "PATH")]
    pub extract: Option<PathBuf>,

    /// Check mode: list hidden files without writing them.
    #[arg(short = 'c', long = "check", value_name = "PATH")]
    pub check: Option<PathBuf>,

    /// Password supplied inline.
    #[arg(short = 'p', long = "password", value_name = "TEXT")]
    pub password: Option<String>,

    /// Use an empty password.
    #[arg(short = 'n', long = "no-password")]
    pub no_password: bool,

    /// Print progress output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress success messages.
    #[arg(short, long)]
    pub silent: bool,

    /// Print an algorithm summary and exit.
    #[arg(long = "algorithm")]
    pub algorithm: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    pub fn execute(self) -> Result<()> {
        if self.algorithm {
            print_algorithm_summary();
            return Ok(());
        }

        let modes_selected =
            usize::from(!self.hide.is_empty()) + usize::from(self.extract.is_some()) + usize::from(self.check.is_some());
        if modes_selected != 1 {
            bail!("exactly one of --hide, --extract, or --check must be specified");
        }

        if !self.hide.is_empty() {
            self.run_hide()
        } else if let Some(path) = self.extract.clone() {
            self.run_extract(&path, false)
        } else {
            let path = self.check.clone().expect("check mode requires --check path");
            self.run_extract(&path, true)
        }
    }

    fn run_hide(&self) -> Result<()> {
        let input = self.input.clone().context("--input is required when hiding files")?;
        let output = self.output.clone().unwrap_or_else(|| input.clone());
        let password = self.acquire_password(true)?;

        let outcome = engine::hide(
            &input,
            &output,
            &self.hide,
            password.as_bytes(),
            self.append,
            self.uncompressed,
            self.verbose,
        )
        .with_context(|| format!("failed to hide files into {}", input.display()))?;

        if !self.silent {
            ui::show_success(OperationMode::Hide, &outcome.output_path);
        }
        Ok(())
    }

    fn run_extract(&self, cover: &Path, check_only: bool) -> Result<()> {
        let output_dir = self.output.clone().unwrap_or_else(|| PathBuf::from("."));
        let password = self.acquire_password(false)?;
        let mode = if check_only { OperationMode::Check } else { OperationMode::Extract };

        let outcome = engine::extract(cover, &output_dir, password.as_bytes(), check_only, self.verbose)
            .with_context(|| format!("failed to extract from {}", cover.display()))?;

        if check_only {
            ui::show_check_summary(outcome.codec, &outcome.metadata);
        } else if !self.silent {
            for path in &outcome.written_paths {
                ui::show_success(mode, path);
            }
        }
        Ok(())
    }

    fn acquire_password(&self, hide_mode: bool) -> Result<PasswordBuffer> {
        if let Some(p) = &self.password {
            return Ok(PasswordBuffer::from_bytes(p.as_bytes())?);
        }
        if self.no_password {
            return Ok(PasswordBuffer::empty());
        }
        let prompt = Prompt::new();
        let raw = if hide_mode { prompt.prompt_hide_password()? } else { prompt.prompt_read_password()? };
        Ok(PasswordBuffer::from_bytes(raw.as_bytes())?)
    }
}

fn print_algorithm_summary() {
    println!("{APP_NAME} algorithm");
    println!(
        "  key derivation : Argon2id (time_cost={KDF_TIME_COST}, memory_cost={KDF_MEMORY_COST_KIB} KiB, parallelism={KDF_PARALLELISM}) -> 64 bytes"
    );
    println!("  permutation    : keyed stream PRNG seeded from the KDF, Fisher-Yates over carrier slots");
    println!("  cipher         : XChaCha20-Poly1305, one sealed message per hidden file");
    println!("  compression    : Deflate, max level, skippable per-file with --uncompressed");
    println!("  carriers       : JPEG AC DCT coefficients (|v| >= 2), PNG/WebP non-alpha channel LSBs");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_no_mode_selected() {
        let cli = Cli::parse_from([APP_NAME]);
        assert!(cli.execute().is_err());
    }

    #[test]
    fn rejects_multiple_modes_selected() {
        let cli = Cli::parse_from([APP_NAME, "--check", "a.png", "--extract", "b.png"]);
        assert!(cli.execute().is_err());
    }
}
