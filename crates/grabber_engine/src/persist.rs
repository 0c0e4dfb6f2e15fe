use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("output directory missing or not writable: {0}")]
    OutputDir(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(PersistError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    }
    // Basic writability probe: try creating a temp file.
    NamedTempFile::new_in(dir).map_err(|e| PersistError::OutputDir(e.to_string()))?;
    Ok(())
}

/// Writes files into one directory through a temporary file that is renamed
/// onto the final name only once complete. A dropped or failed write leaves
/// nothing under the final name.
#[derive(Debug, Clone)]
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    /// Whether a regular file named `file_name` is already present.
    pub fn exists(&self, file_name: &str) -> bool {
        self.dir.join(file_name).is_file()
    }

    pub fn begin(&self) -> Result<PendingFile, PersistError> {
        let tmp = tempfile::Builder::new()
            .prefix(".grabber-")
            .suffix(".part")
            .tempfile_in(&self.dir)?;
        Ok(PendingFile {
            tmp,
            dir: self.dir.clone(),
            bytes_written: 0,
        })
    }
}

/// An in-progress write. Removed from disk when dropped without [`PendingFile::commit`].
#[derive(Debug)]
pub struct PendingFile {
    tmp: NamedTempFile,
    dir: PathBuf,
    bytes_written: u64,
}

impl PendingFile {
    pub fn write_chunk(&mut self, chunk: &[u8]) -> Result<(), PersistError> {
        self.tmp.write_all(chunk)?;
        self.bytes_written += chunk.len() as u64;
        Ok(())
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Flush and move the temporary file to `{dir}/{file_name}`, replacing any
    /// existing file.
    pub fn commit(mut self, file_name: &str) -> Result<PathBuf, PersistError> {
        self.tmp.flush()?;
        self.tmp.as_file_mut().sync_all()?;

        let target = self.dir.join(file_name);
        // Windows refuses to rename over an existing file.
        if target.exists() {
            fs::remove_file(&target)?;
        }
        self.tmp
            .persist(&target)
            .map_err(|e| PersistError::Io(e.error))?;
        Ok(target)
    }
}
