use std::ffi::OsString;

use crate::classify::{PIPE, Shape};
use crate::error::Malformed;
use crate::redirection::{OutputTarget, Redirection};

/// A line broken into its stages, each borrowing from the original tokens.
///
/// Every shape becomes one of these: a plain or redirected command is a one-stage pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline<'a> {
    pub stages: Vec<&'a [OsString]>,
    pub target: OutputTarget,
}

impl Pipeline<'_> {
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

/// Splits a classified token sequence into stages at each `|`, cutting the redirection
/// operator and its file name off the final stage.
pub fn split(tokens: &[OsString], shape: Shape) -> Result<Pipeline<'_>, Malformed> {
    let tail = match shape {
        Shape::Plain => None,
        Shape::Redirected { op, file_pos } => Some((op, file_pos)),
        Shape::Piped { tail, .. } => tail,
    };

    let (body, target) = match tail {
        Some((op, file_pos)) => (
            &tokens[..file_pos - 1],
            OutputTarget::File(Redirection::new(&tokens[file_pos], op)),
        ),
        None => (tokens, OutputTarget::SessionLog),
    };

    let stages: Vec<&[OsString]> = match shape {
        Shape::Piped { .. } => body.split(|token| token == PIPE).collect(),
        _ => vec![body],
    };
    if let Some(index) = stages.iter().position(|stage| stage.is_empty()) {
        return Err(Malformed::EmptyStage { index });
    }

    Ok(Pipeline { stages, target })
}
