use std::fs::{File, OpenOptions};
use std::io::Write;
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

use crate::error::ExecError;
use crate::redirection::CREATE_MODE;

/// Separator appended after each executed line.
pub const LINE_SEPARATOR: &[u8] = b"\n\n";

/// The default sink for output that is not redirected.
///
/// Every writer opens its own append-mode descriptor; the OS serializes the appends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionLog {
    path: PathBuf,
}

impl SessionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Empties the log, creating it when missing. Called once per batch run.
    pub fn truncate(&self) -> Result<(), ExecError> {
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(CREATE_MODE)
            .open(&self.path)
            .map(drop)
            .map_err(|source| self.error(source))
    }

    pub fn open_append(&self) -> Result<File, ExecError> {
        OpenOptions::new()
            .append(true)
            .create(true)
            .mode(CREATE_MODE)
            .open(&self.path)
            .map_err(|source| self.error(source))
    }

    pub fn append(&self, content: &[u8]) -> Result<(), ExecError> {
        self.open_append()?
            .write_all(content)
            .map_err(|source| self.error(source))
    }

    fn error(&self, source: std::io::Error) -> ExecError {
        ExecError::SessionLog {
            path: self.path.clone(),
            source,
        }
    }
}
