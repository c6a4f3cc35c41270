//! Batch command executor.
//!
//! Reads `%BEGIN` / `%END` delimited scripts and runs each line as a plain command, a
//! redirected command, or a pipeline of child processes. Output that is not redirected is
//! appended to one session log.

pub mod batch;
pub mod classify;
pub mod config;
pub mod error;
pub mod execute;
pub mod launch;
pub mod pipeline;
pub mod reap;
pub mod redirection;
pub mod session;
pub mod split;
pub mod tokenize;

pub use batch::{BatchScript, BatchSummary, run, run_script};
pub use config::Settings;
pub use error::{ExecError, Malformed};
pub use execute::{ExecResult, LineReport, execute_line};
pub use session::SessionLog;
pub use tokenize::tokenize;
