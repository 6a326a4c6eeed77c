//! Image I/O façade: load a cover image from disk, and save a modified one
//! back out with its timestamp carried over and its output name resolved
//! against collisions.

use std::path::{Path, PathBuf};

use filetime::FileTime;
use tracing::instrument;

use crate::config::MAX_FILENAME_DUPLICATES;
use crate::error::StegError;

#[instrument]
pub fn read_cover(path: &Path) -> Result<Vec<u8>, StegError> {
    if path.is_dir() {
        return Err(StegError::PathIsDir(path.display().to_string()));
    }
    std::fs::read(path).map_err(|_| StegError::FileNotFound(path.display().to_string()))
}

/// Write `bytes` to `path`, preferring `path` itself and falling back to
/// `name (N).ext` for `N` in `1..=MAX_FILENAME_DUPLICATES` when it already
/// exists. Returns the path actually written to.
#[instrument(skip(bytes))]
pub fn save_with_collision_resolution(path: &Path, bytes: &[u8]) -> Result<PathBuf, StegError> {
    let resolved = resolve_output_path(path)?;
    std::fs::write(&resolved, bytes).map_err(|e| StegError::SaveFail(e.to_string()))?;
    Ok(resolved)
}

pub(crate) fn resolve_output_path(path: &Path) -> Result<PathBuf, StegError> {
    if !path.exists() {
        return Ok(path.to_path_buf());
    }

    let stem = path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    let ext = path.extension().map(|s| s.to_string_lossy().into_owned());
    let parent = path.parent().unwrap_or_else(|| Path::new(""));

    for n in 1..=MAX_FILENAME_DUPLICATES {
        let candidate_name = match &ext {
            Some(ext) => format!("{stem} ({n}).{ext}"),
            None => format!("{stem} ({n})"),
        };
        let candidate = parent.join(candidate_name);
        if !candidate.exists() {
            return Ok(candidate);
        }
    }

    Err(StegError::FileExists(MAX_FILENAME_DUPLICATES))
}

/// Copy access/modification times from `source` onto `dest`.
pub fn copy_timestamps(source: &Path, dest: &Path) -> Result<(), StegError> {
    let metadata = std::fs::metadata(source).map_err(StegError::Io)?;
    let atime = FileTime::from_last_access_time(&metadata);
    let mtime = FileTime::from_last_modification_time(&metadata);
    filetime::set_file_times(dest, atime, mtime).map_err(StegError::Io)
}

/// Restore access/modification times recovered from an extracted record
/// (seconds + nanoseconds since the Unix epoch) onto a freshly written file.
pub fn restore_timestamps(dest: &Path, access: (i64, i64), modified: (i64, i64)) -> Result<(), StegError> {
    let atime = FileTime::from_unix_time(access.0, access.1 as u32);
    let mtime = FileTime::from_unix_time(modified.0, modified.1 as u32);
    filetime::set_file_times(dest, atime, mtime).map_err(StegError::Io)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn resolves_to_original_name_when_free() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cover.png");
        assert_eq!(resolve_output_path(&path).unwrap(), path);
    }

    #[test]
    fn resolves_to_numbered_suffix_on_collision() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cover.png");
        std::fs::write(&path, b"existing").unwrap();
        let resolved = resolve_output_path(&path).unwrap();
        assert_eq!(resolved, dir.path().join("cover (1).png"));
    }

    #[test]
    fn skips_taken_numbered_suffixes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cover.png");
        std::fs::write(&path, b"existing").unwrap();
        std::fs::write(dir.path().join("cover (1).png"), b"existing").unwrap();
        let resolved = resolve_output_path(&path).unwrap();
        assert_eq!(resolved, dir.path().join("cover (2).png"));
    }
}
