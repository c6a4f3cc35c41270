use std::ffi::OsString;

use crate::error::Malformed;
use crate::redirection::RedirectOp;

pub const PIPE: &str = "|";

/// Last-seen positions of the operators in one token sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct OperatorPositions {
    pub truncate: Option<usize>,
    pub append: Option<usize>,
    pub pipe: Option<usize>,
    redirects: usize,
}

impl OperatorPositions {
    /// Scans left to right once; a later occurrence replaces an earlier one.
    pub fn scan(tokens: &[OsString]) -> Self {
        let mut positions = Self::default();
        for (i, token) in tokens.iter().enumerate() {
            match RedirectOp::from_token(token) {
                Some(RedirectOp::Truncate) => positions.truncate = Some(i),
                Some(RedirectOp::Append) => positions.append = Some(i),
                None => {
                    if token == PIPE {
                        positions.pipe = Some(i);
                    }
                    continue;
                }
            }
            positions.redirects += 1;
        }
        positions
    }

    fn redirect(&self) -> Option<(RedirectOp, usize)> {
        self.truncate
            .map(|pos| (RedirectOp::Truncate, pos))
            .or(self.append.map(|pos| (RedirectOp::Append, pos)))
    }
}

/// Execution shape of one line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Plain,
    Redirected {
        op: RedirectOp,
        file_pos: usize,
    },
    Piped {
        pipe_pos: usize,
        tail: Option<(RedirectOp, usize)>,
    },
}

/// Classifies a token sequence, rejecting operator usage that has no valid shape.
///
/// A redirection must be the last thing on the line: one operator followed by exactly
/// one file name. Operators at index 0 leave the first stage without a program.
pub fn classify(tokens: &[OsString]) -> Result<Shape, Malformed> {
    if tokens.is_empty() {
        return Err(Malformed::Empty);
    }
    let positions = OperatorPositions::scan(tokens);

    let redirect = match positions.redirect() {
        None => None,
        Some(_) if positions.redirects > 1 => return Err(Malformed::ConflictingRedirects),
        Some((_, 0)) => return Err(Malformed::EmptyStage { index: 0 }),
        Some((op, pos)) => {
            if positions.pipe.is_some_and(|pipe| pipe > pos) {
                return Err(Malformed::RedirectNotLast);
            }
            let file_pos = pos + 1;
            if file_pos >= tokens.len() {
                return Err(Malformed::DanglingRedirect { op });
            }
            if let Some(extra) = tokens.get(file_pos + 1) {
                return Err(Malformed::TrailingAfterRedirect {
                    token: extra.to_string_lossy().into_owned(),
                });
            }
            Some((op, file_pos))
        }
    };

    Ok(match (positions.pipe, redirect) {
        (Some(pipe_pos), tail) => Shape::Piped { pipe_pos, tail },
        (None, Some((op, file_pos))) => Shape::Redirected { op, file_pos },
        (None, None) => Shape::Plain,
    })
}
