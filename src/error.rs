use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::redirection::RedirectOp;

/// A line whose operators cannot be resolved to an execution shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Malformed {
    #[error("nothing to execute")]
    Empty,
    #[error("`{op}` is not followed by a file name")]
    DanglingRedirect { op: RedirectOp },
    #[error("pipeline stage {index} is empty")]
    EmptyStage { index: usize },
    #[error("both `>` and `>>` given for one command")]
    ConflictingRedirects,
    #[error("redirection is only allowed on the last pipeline stage")]
    RedirectNotLast,
    #[error("unexpected `{token}` after redirection target")]
    TrailingAfterRedirect { token: String },
}

/// Errors raised while executing one line. None of these abort the batch.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("malformed line: {0}")]
    Malformed(#[from] Malformed),
    #[error("cannot open redirection target {}: {source}", path.display())]
    Redirect { path: PathBuf, source: io::Error },
    #[error("cannot create pipe: {0}")]
    Pipe(#[source] io::Error),
    #[error("cannot open session log {}: {source}", path.display())]
    SessionLog { path: PathBuf, source: io::Error },
    #[error("waiting for pid {pid} failed: {source}")]
    Wait { pid: i32, source: nix::Error },
}

impl ExecError {
    pub fn is_malformed(&self) -> bool {
        matches!(self, ExecError::Malformed(_))
    }
}
