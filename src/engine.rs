//! High-level orchestration of the hide/extract/check flows.
//!
//! Ties together password-derived crypto material, an opened carrier image,
//! and the embedding engine into the handful of calls the CLI front end
//! drives: open the cover, optionally seek past existing payloads, insert
//! or extract, re-encode, and restore timestamps. This mirrors the
//! teacher's `Processor` as the single high-level entry point a thin CLI
//! shell calls into, generalized from "one file, one cipher layer" to
//! "N files, sequential frames over a permuted carrier".

use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{info, instrument};

use crate::carrier::CarrierImage;
use crate::cipher::CryptoContext;
use crate::embedding;
use crate::error::StegError;
use crate::file::FileEntry;
use crate::framer::{FileRecord, Timestamp};
use crate::image_io;
use crate::types::{Codec, ExtractedMetadata};
use crate::ui::progress::ProgressBar;

/// Result of a successful hide operation.
pub struct HideOutcome {
    pub output_path: PathBuf,
    pub files_hidden: usize,
}

/// Result of a successful extract or check operation.
pub struct ExtractOutcome {
    pub codec: Codec,
    pub metadata: Vec<ExtractedMetadata>,
    pub written_paths: Vec<PathBuf>,
}

/// Open `cover_path`, hide every file in `hide_paths` into it (seeking past
/// existing payloads first when `append` is set), and save the result to
/// `output_path` with the cover's own timestamps carried over.
#[instrument(skip(password))]
pub fn hide(
    cover_path: &Path,
    output_path: &Path,
    hide_paths: &[PathBuf],
    password: &[u8],
    append: bool,
    uncompressed: bool,
    verbose: bool,
) -> Result<HideOutcome, StegError> {
    let cover_bytes = image_io::read_cover(cover_path)?;
    let (crypto, mut image) = open_cover(&cover_bytes, password, verbose)?;

    if append {
        let skipped = embedding::seek_to_end(&mut image)?;
        if skipped == 0 {
            return Err(StegError::AppendSafeguard);
        }
        info!(skipped, "seeked past existing payloads for append");
    }

    for path in hide_paths {
        let entry = FileEntry::new(path);
        entry.validate_as_hide_input()?;
        let file_bytes = entry.read_bytes()?;
        let fs_metadata = std::fs::metadata(path).map_err(StegError::Io)?;

        let record = FileRecord {
            access_time: system_time_to_timestamp(fs_metadata.accessed().ok()),
            mod_time: system_time_to_timestamp(fs_metadata.modified().ok()),
            steg_time: now_timestamp(),
            file_name: file_name_of(path),
            file_bytes,
        };

        embedding::insert(&mut image, &crypto.cipher, &record, uncompressed)?;
    }

    let encoded = image.encode()?;
    let resolved = image_io::save_with_collision_resolution(output_path, &encoded)?;
    image_io::copy_timestamps(cover_path, &resolved)?;

    Ok(HideOutcome { output_path: resolved, files_hidden: hide_paths.len() })
}

/// Open `cover_path` and sequentially extract every payload present. When
/// `check_only` is set, nothing is written to disk — only metadata is
/// collected.
#[instrument(skip(password))]
pub fn extract(
    cover_path: &Path,
    output_dir: &Path,
    password: &[u8],
    check_only: bool,
    verbose: bool,
) -> Result<ExtractOutcome, StegError> {
    let cover_bytes = image_io::read_cover(cover_path)?;
    let (crypto, mut image) = open_cover(&cover_bytes, password, verbose)?;
    let codec = image.codec;

    let mut metadata = Vec::new();
    let mut written_paths = Vec::new();

    loop {
        match embedding::extract(&mut image, &crypto.cipher) {
            Ok(record) => {
                metadata.push(ExtractedMetadata {
                    file_name: String::from_utf8_lossy(&record.file_name).into_owned(),
                    file_size: record.file_bytes.len() as u64,
                    access_time: (record.access_time.secs, record.access_time.nanos),
                    mod_time: (record.mod_time.secs, record.mod_time.nanos),
                    steg_time: (record.steg_time.secs, record.steg_time.nanos),
                });
                if !check_only {
                    written_paths.push(write_extracted_file(output_dir, &record)?);
                }
            }
            Err(err) if err.is_expected_terminator() => break,
            Err(err) => return Err(err),
        }
    }

    Ok(ExtractOutcome { codec, metadata, written_paths })
}

/// Derive crypto material and open the cover image's carrier index, with an
/// indeterminate spinner over both steps when `verbose` is set — there is
/// no natural byte total for an Argon2id call or a carrier-slot scan.
fn open_cover(cover_bytes: &[u8], password: &[u8], verbose: bool) -> Result<(CryptoContext, CarrierImage), StegError> {
    let spinner = verbose.then(|| ProgressBar::spinner("deriving key").ok()).flatten();

    let mut crypto = CryptoContext::from_password(password)?;

    if let Some(bar) = &spinner {
        bar.finish_with("key derived");
    }
    let spinner = verbose.then(|| ProgressBar::spinner("scanning carrier slots").ok()).flatten();

    let image = CarrierImage::open(cover_bytes, &mut crypto.prng)?;

    if let Some(bar) = &spinner {
        bar.finish_with(&format!("{} carrier slots found", image.capacity()));
    }

    Ok((crypto, image))
}

fn write_extracted_file(output_dir: &Path, record: &FileRecord) -> Result<PathBuf, StegError> {
    let sanitized = sanitize_file_name(&record.file_name);
    let target = output_dir.join(bytes_to_os_string(&sanitized));
    let resolved = image_io::resolve_output_path(&target)?;
    FileEntry::new(&resolved).writer()?.write_all(&record.file_bytes).map_err(StegError::Io)?;
    image_io::restore_timestamps(
        &resolved,
        (record.access_time.secs, record.access_time.nanos),
        (record.mod_time.secs, record.mod_time.nanos),
    )?;
    Ok(resolved)
}

/// Replace bytes forbidden on Windows paths, plus control bytes, with `_`.
/// Applied to every extracted name regardless of host OS so the same cover
/// produces the same output name everywhere. Operates byte-wise (not on
/// decoded characters) so a non-UTF-8 name is preserved apart from the
/// forbidden bytes themselves.
fn sanitize_file_name(name: &[u8]) -> Vec<u8> {
    name.iter().map(|&b| if is_forbidden_path_byte(b) { b'_' } else { b }).collect()
}

fn is_forbidden_path_byte(b: u8) -> bool {
    matches!(b, b'<' | b'>' | b':' | b'"' | b'/' | b'\\' | b'|' | b'?' | b'*') || b < 0x20
}

#[cfg(unix)]
fn file_name_of(path: &Path) -> Vec<u8> {
    use std::os::unix::ffi::OsStrExt;
    path.file_name().map(|n| n.as_bytes().to_vec()).unwrap_or_else(|| path.display().to_string().into_bytes())
}

#[cfg(not(unix))]
fn file_name_of(path: &Path) -> Vec<u8> {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned().into_bytes())
        .unwrap_or_else(|| path.display().to_string().into_bytes())
}

#[cfg(unix)]
fn bytes_to_os_string(bytes: &[u8]) -> std::ffi::OsString {
    use std::os::unix::ffi::OsStringExt;
    std::ffi::OsString::from_vec(bytes.to_vec())
}

#[cfg(not(unix))]
fn bytes_to_os_string(bytes: &[u8]) -> std::ffi::OsString {
    std::ffi::OsString::from(String::from_utf8_lossy(bytes).into_owned())
}

fn system_time_to_timestamp(time: Option<SystemTime>) -> Timestamp {
    let duration = time.and_then(|t| t.duration_since(UNIX_EPOCH).ok()).unwrap_or_default();
    Timestamp { secs: duration.as_secs() as i64, nanos: i64::from(duration.subsec_nanos()) }
}

fn now_timestamp() -> Timestamp {
    system_time_to_timestamp(Some(SystemTime::now()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitizes_windows_forbidden_characters() {
        assert_eq!(sanitize_file_name(b"a:b/c\\d?e"), b"a_b_c_d_e");
    }

    #[test]
    fn sanitizes_control_characters() {
        assert_eq!(sanitize_file_name(b"a\x07b"), b"a_b");
    }

    #[test]
    fn leaves_ordinary_names_untouched() {
        assert_eq!(sanitize_file_name(b"notes_final (1).txt"), b"notes_final (1).txt");
    }

    #[test]
    fn preserves_non_utf8_bytes_apart_from_forbidden_ones() {
        let name = [0xE9, b':', 0xE9];
        assert_eq!(sanitize_file_name(&name), [0xE9, b'_', 0xE9]);
    }
}
