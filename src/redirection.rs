use std::ffi::OsStr;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::OpenOptionsExt;
use std::path::PathBuf;

use crate::error::ExecError;

/// Permissions for files created by redirection: read and write for owner and group.
pub const CREATE_MODE: u32 = 0o660;

/// Output redirection operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectOp {
    /// `>`: create or truncate.
    Truncate,
    /// `>>`: create or append.
    Append,
}

impl RedirectOp {
    pub fn from_token(token: &OsStr) -> Option<Self> {
        match token.as_bytes() {
            b">" => Some(RedirectOp::Truncate),
            b">>" => Some(RedirectOp::Append),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RedirectOp::Truncate => ">",
            RedirectOp::Append => ">>",
        }
    }
}

impl fmt::Display for RedirectOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named redirection target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirection {
    pub file: PathBuf,
    pub op: RedirectOp,
}

impl Redirection {
    pub fn new(file: impl Into<PathBuf>, op: RedirectOp) -> Self {
        Self {
            file: file.into(),
            op,
        }
    }

    /// Opens the target for writing with the operator's semantics.
    pub fn open(&self) -> Result<File, ExecError> {
        let mut options = OpenOptions::new();
        options.create(true).mode(CREATE_MODE);
        match self.op {
            RedirectOp::Truncate => options.write(true).truncate(true),
            RedirectOp::Append => options.append(true),
        };
        options.open(&self.file).map_err(|source| ExecError::Redirect {
            path: self.file.clone(),
            source,
        })
    }
}

/// Where the last stage of a line writes, resolved once per line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum OutputTarget {
    #[default]
    SessionLog,
    File(Redirection),
}
