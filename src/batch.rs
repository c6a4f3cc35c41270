use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use bytes::Bytes;
use log::{error, info, warn};

use crate::config::Settings;
use crate::execute::execute_line;
use crate::session::{LINE_SEPARATOR, SessionLog};
use crate::tokenize::tokenize;

/// A batch script held in memory.
#[derive(Debug, Clone)]
pub struct BatchScript {
    data: Bytes,
}

impl BatchScript {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .with_context(|| format!("cannot read batch file {}", path.display()))?;
        Ok(Self::from_bytes(data))
    }

    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }

    /// Lines including their terminating `\n`, sliced out of the buffer without copying.
    pub fn lines(&self) -> Lines {
        Lines {
            rest: self.data.clone(),
        }
    }
}

pub struct Lines {
    rest: Bytes,
}

impl Iterator for Lines {
    type Item = Bytes;

    fn next(&mut self) -> Option<Bytes> {
        if self.rest.is_empty() {
            return None;
        }
        let end = self
            .rest
            .iter()
            .position(|&b| b == b'\n')
            .map_or(self.rest.len(), |i| i + 1);
        Some(self.rest.split_to(end))
    }
}

/// What the driver does with one script line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Marker,
    Outside,
    Comment,
    Command,
}

/// Tracks `%BEGIN` / `%END` sections.
#[derive(Debug)]
pub struct Sections<'a> {
    begin: &'a str,
    end: &'a str,
    inside: bool,
}

impl<'a> Sections<'a> {
    pub fn new(begin: &'a str, end: &'a str) -> Self {
        Self {
            begin,
            end,
            inside: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.inside
    }

    /// Classifies one raw line. Markers must match the whole line, minus its `\n`.
    pub fn classify(&mut self, line: &[u8]) -> LineKind {
        let bare = line.strip_suffix(b"\n").unwrap_or(line);
        if !self.inside {
            if bare == self.begin.as_bytes() {
                self.inside = true;
                return LineKind::Marker;
            }
            return LineKind::Outside;
        }
        if bare == self.begin.as_bytes() {
            LineKind::Marker
        } else if bare == self.end.as_bytes() {
            self.inside = false;
            LineKind::Marker
        } else if bare.trim_ascii_start().starts_with(b"#") {
            LineKind::Comment
        } else {
            LineKind::Command
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchSummary {
    pub executed: usize,
    pub malformed: usize,
    pub errors: usize,
    pub failed_stages: usize,
    pub unterminated: bool,
}

/// Runs every in-section line of `script`, strictly one after another.
///
/// Only a session log that cannot be reset is fatal; per-line problems are reported and
/// the run moves on to the next line.
pub fn run_script(script: &BatchScript, settings: &Settings) -> Result<BatchSummary> {
    let session = SessionLog::new(&settings.session_log);
    session
        .truncate()
        .context("cannot prepare the session log")?;

    let mut sections = Sections::new(&settings.begin_marker, &settings.end_marker);
    let mut summary = BatchSummary::default();
    let mut stdout = io::stdout();

    for (index, raw) in script.lines().enumerate() {
        let number = index + 1;
        if sections.classify(&raw) != LineKind::Command {
            continue;
        }
        let tokens = tokenize(&raw);
        if tokens.is_empty() {
            continue;
        }

        match execute_line(&tokens, &session) {
            Ok(report) => {
                summary.executed += 1;
                for stage in report.failed_stages() {
                    summary.failed_stages += 1;
                    info!("line {number}: `{}` {}", stage.program, stage.status);
                }
            }
            Err(e) if e.is_malformed() => {
                summary.malformed += 1;
                warn!("line {number}: {e}");
                let note = format!("line {number}: {e}\n");
                if let Err(e) = session.append(note.as_bytes()) {
                    error!("{e}");
                }
            }
            Err(e) => {
                summary.errors += 1;
                error!("line {number}: {e}");
            }
        }

        let _ = stdout.write_all(LINE_SEPARATOR);
        let _ = stdout.flush();
        if let Err(e) = session.append(LINE_SEPARATOR) {
            error!("{e}");
        }
    }

    if sections.is_open() {
        summary.unterminated = true;
        warn!("batch file ended inside a section");
        println!("\n\nUnable to find matching {} statement!\n", settings.end_marker);
    }
    info!(
        "{} line(s) executed, {} malformed, {} failed, {} stage(s) unsuccessful",
        summary.executed, summary.malformed, summary.errors, summary.failed_stages
    );
    Ok(summary)
}

/// Loads and runs the batch file at `path`.
pub fn run(path: impl AsRef<Path>, settings: &Settings) -> Result<BatchSummary> {
    let script = BatchScript::load(path)?;
    run_script(&script, settings)
}
