use std::ffi::OsString;
use std::fmt;
use std::io;

use log::{debug, error, warn};

use crate::error::ExecError;
use crate::launch::{LAUNCH_FAILURE_STATUS, Sink, Source, launch};
use crate::reap::{ChildHandle, Termination, reap};
use crate::redirection::OutputTarget;
use crate::session::SessionLog;
use crate::split::Pipeline;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageStatus {
    Terminated(Termination),
    /// The program could not be started.
    NotLaunched,
}

impl StageStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            StageStatus::Terminated(termination) => termination.code(),
            StageStatus::NotLaunched => LAUNCH_FAILURE_STATUS,
        }
    }

    pub fn success(self) -> bool {
        match self {
            StageStatus::Terminated(termination) => termination.success(),
            StageStatus::NotLaunched => false,
        }
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageStatus::Terminated(termination) => write!(f, "{termination}"),
            StageStatus::NotLaunched => write!(f, "not launched (status {LAUNCH_FAILURE_STATUS})"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub program: String,
    pub status: StageStatus,
}

enum Launched {
    Running(ChildHandle),
    Failed(String),
}

fn open_target(target: &OutputTarget, session: &SessionLog) -> Result<Sink, ExecError> {
    let file = match target {
        OutputTarget::SessionLog => session.open_append()?,
        OutputTarget::File(redirection) => redirection.open()?,
    };
    Ok(Sink::File(file))
}

fn launch_stage(argv: &[OsString], input: Source, output: Sink) -> Launched {
    match launch(argv, input, output) {
        Ok(child) => Launched::Running(child),
        Err(e) => {
            warn!("{e}");
            Launched::Failed(e.program)
        }
    }
}

/// Runs every stage of `pipeline` and waits for all of them.
///
/// Stage *i* writes into a fresh pipe read by stage *i + 1*; the last stage writes to the
/// line's target. The orchestrator drops its copy of each descriptor as soon as the stage
/// holding it has been started, so readers see end of stream once their writers exit.
/// A stage that fails to launch leaves its neighbours running. Nothing is started when
/// the target cannot be opened.
pub fn run_pipeline(
    pipeline: &Pipeline<'_>,
    session: &SessionLog,
) -> Result<Vec<StageReport>, ExecError> {
    let Some((last, leading)) = pipeline.stages.split_last() else {
        return Ok(Vec::new());
    };
    let tail = open_target(&pipeline.target, session)?;

    let mut launched = Vec::with_capacity(pipeline.len());
    let mut failure = None;
    let mut input = Source::Inherit;
    for argv in leading {
        let (reader, writer) = match io::pipe() {
            Ok(ends) => ends,
            Err(e) => {
                failure = Some(ExecError::Pipe(e));
                break;
            }
        };
        let stage_input = std::mem::replace(&mut input, Source::Pipe(reader));
        launched.push(launch_stage(argv, stage_input, Sink::Pipe(writer)));
    }
    if failure.is_none() {
        launched.push(launch_stage(last, input, tail));
    } else {
        // release the dangling read end before waiting, or upstream writers never finish
        drop(input);
        drop(tail);
    }

    let mut reports = Vec::with_capacity(launched.len());
    for stage in launched {
        let (program, status) = match stage {
            Launched::Running(child) => {
                let program = child.program().to_string();
                match reap(child) {
                    Ok(termination) => (program, StageStatus::Terminated(termination)),
                    Err(e) => {
                        error!("{e}");
                        failure.get_or_insert(e);
                        continue;
                    }
                }
            }
            Launched::Failed(program) => (program, StageStatus::NotLaunched),
        };
        debug!("stage {} `{program}` {status}", reports.len());
        reports.push(StageReport { program, status });
    }

    match failure {
        Some(e) => Err(e),
        None => Ok(reports),
    }
}
