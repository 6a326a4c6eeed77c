//! A small file abstraction used for both the files being hidden or
//! restored and the cover image itself: lazy size/metadata queries,
//! existence checks, and buffered reader/writer construction.

use std::fs::{self, File as StdFile};
use std::io::{BufReader, BufWriter, Read};
use std::path::{Path, PathBuf};

use crate::config::MAX_INPUT_SIZE;
use crate::error::StegError;

pub struct FileEntry {
    path: PathBuf,
}

impl FileEntry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn is_dir(&self) -> bool {
        self.path.is_dir()
    }

    pub fn size(&self) -> Result<u64, StegError> {
        Ok(fs::metadata(&self.path)?.len())
    }

    /// Validates the entry as an input to be hidden: must exist, must not
    /// be a directory, and must not exceed the size ceiling.
    pub fn validate_as_hide_input(&self) -> Result<(), StegError> {
        if !self.exists() {
            return Err(StegError::FileNotFound(self.path.display().to_string()));
        }
        if self.is_dir() {
            return Err(StegError::PathIsDir(self.path.display().to_string()));
        }
        if self.size()? > MAX_INPUT_SIZE {
            return Err(StegError::InputFileTooLarge { limit: MAX_INPUT_SIZE });
        }
        Ok(())
    }

    pub fn read_bytes(&self) -> Result<Vec<u8>, StegError> {
        let expected = self.size()?;
        let mut bytes = Vec::with_capacity(expected as usize);
        self.reader()?.read_to_end(&mut bytes)?;
        if bytes.len() as u64 != expected {
            return Err(StegError::FileCorrupted);
        }
        Ok(bytes)
    }

    pub fn reader(&self) -> Result<BufReader<StdFile>, StegError> {
        Ok(BufReader::new(StdFile::open(&self.path)?))
    }

    pub fn writer(&self) -> Result<BufWriter<StdFile>, StegError> {
        Ok(BufWriter::new(StdFile::create(&self.path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_fails_validation() {
        let entry = FileEntry::new("/does/not/exist/anywhere");
        assert!(matches!(entry.validate_as_hide_input(), Err(StegError::FileNotFound(_))));
    }

    #[test]
    fn directory_fails_validation() {
        let dir = tempdir().unwrap();
        let entry = FileEntry::new(dir.path());
        assert!(matches!(entry.validate_as_hide_input(), Err(StegError::PathIsDir(_))));
    }

    #[test]
    fn regular_file_validates_and_reads() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("payload.bin");
        fs::write(&path, b"secret contents").unwrap();
        let entry = FileEntry::new(&path);
        entry.validate_as_hide_input().unwrap();
        assert_eq!(entry.read_bytes().unwrap(), b"secret contents");
    }

    #[test]
    fn writer_then_read_bytes_roundtrips() {
        use std::io::Write;

        let dir = tempdir().unwrap();
        let path = dir.path().join("restored.bin");
        let entry = FileEntry::new(&path);
        entry.writer().unwrap().write_all(b"restored payload").unwrap();
        assert_eq!(entry.read_bytes().unwrap(), b"restored payload");
    }
}
