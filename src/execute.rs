use std::ffi::OsString;

use log::debug;

use crate::classify::classify;
use crate::error::ExecError;
use crate::pipeline::{StageReport, run_pipeline};
use crate::session::SessionLog;
use crate::split::split;

pub type ExecResult = Result<LineReport, ExecError>;

/// Outcome of one executed line, one entry per stage in pipeline order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LineReport {
    pub stages: Vec<StageReport>,
}

impl LineReport {
    pub fn success(&self) -> bool {
        self.stages.iter().all(|stage| stage.status.success())
    }

    pub fn failed_stages(&self) -> impl Iterator<Item = &StageReport> {
        self.stages.iter().filter(|stage| !stage.status.success())
    }
}

/// Executes one tokenized line to completion.
///
/// Plain commands and single redirections run as one-stage pipelines. Every child started
/// for the line has been reaped when this returns, whatever the result.
pub fn execute_line(tokens: &[OsString], session: &SessionLog) -> ExecResult {
    let shape = classify(tokens)?;
    let pipeline = split(tokens, shape)?;
    debug!(
        "{shape:?}: {} stage(s) -> {:?}",
        pipeline.len(),
        pipeline.target
    );
    let stages = run_pipeline(&pipeline, session)?;
    Ok(LineReport { stages })
}
