use std::fmt;
use std::process::Child;

use log::{debug, error};
use nix::errno::Errno;
use nix::sys::signal::Signal;
use nix::sys::wait::{WaitStatus, waitpid};
use nix::unistd::Pid;

use crate::error::ExecError;

/// How a child reached its terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Exited(i32),
    Signaled(Signal),
}

impl Termination {
    pub fn success(self) -> bool {
        self == Termination::Exited(0)
    }

    /// Exit code in the shell convention: signals map to 128 + signal number.
    pub fn code(self) -> i32 {
        match self {
            Termination::Exited(code) => code,
            Termination::Signaled(signal) => 128 + signal as i32,
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Exited(code) => write!(f, "exited with status {code}"),
            Termination::Signaled(signal) => write!(f, "killed by {}", signal.as_str()),
        }
    }
}

/// A running child that has not been waited on yet.
///
/// Consumed by [`reap`], so a handle can be waited on at most once. A handle dropped
/// without being reaped is waited on in `drop`, so no exit path leaves a zombie.
#[derive(Debug)]
pub struct ChildHandle {
    child: Option<Child>,
    program: String,
}

impl ChildHandle {
    pub fn new(child: Child, program: impl Into<String>) -> Self {
        Self {
            child: Some(child),
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    #[cfg(test)]
    fn pid(&self) -> Option<u32> {
        self.child.as_ref().map(Child::id)
    }
}

impl Drop for ChildHandle {
    fn drop(&mut self) {
        if let Some(child) = self.child.take() {
            match wait_for(&child) {
                Ok(status) => debug!("{} (pid {}) {status}", self.program, child.id()),
                Err(e) => error!("waiting for {} (pid {}) failed: {e}", self.program, child.id()),
            }
        }
    }
}

/// Blocks until the child exits or is killed by a signal.
pub fn reap(mut handle: ChildHandle) -> Result<Termination, ExecError> {
    let Some(child) = handle.child.take() else {
        return Err(ExecError::Wait {
            pid: 0,
            source: Errno::ECHILD,
        });
    };
    let status = wait_for(&child).map_err(|source| ExecError::Wait {
        pid: child.id() as i32,
        source,
    })?;
    debug!("{} (pid {}) {status}", handle.program, child.id());
    Ok(status)
}

fn wait_for(child: &Child) -> nix::Result<Termination> {
    let pid = Pid::from_raw(child.id() as i32);
    loop {
        match waitpid(pid, None) {
            Ok(WaitStatus::Exited(_, code)) => return Ok(Termination::Exited(code)),
            Ok(WaitStatus::Signaled(_, signal, _)) => return Ok(Termination::Signaled(signal)),
            // stopped, continued: not terminal
            Ok(_) | Err(Errno::EINTR) => continue,
            Err(e) => return Err(e),
        }
    }
}
