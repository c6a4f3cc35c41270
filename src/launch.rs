use std::ffi::OsString;
use std::fs::File;
use std::io::{self, PipeReader, PipeWriter, Write};
use std::process::{Command, Stdio};

use thiserror::Error;

use crate::reap::ChildHandle;

/// Exit status reported for a stage whose program could not be started.
pub const LAUNCH_FAILURE_STATUS: i32 = 127;

/// Where a stage reads its standard input from.
#[derive(Debug)]
pub enum Source {
    /// The orchestrating process's own standard input.
    Inherit,
    Pipe(PipeReader),
}

impl From<Source> for Stdio {
    fn from(source: Source) -> Stdio {
        match source {
            Source::Inherit => Stdio::inherit(),
            Source::Pipe(reader) => reader.into(),
        }
    }
}

/// Where a stage writes both its standard output and standard error.
#[derive(Debug)]
pub enum Sink {
    File(File),
    Pipe(PipeWriter),
}

impl Sink {
    pub fn try_clone(&self) -> io::Result<Sink> {
        Ok(match self {
            Sink::File(file) => Sink::File(file.try_clone()?),
            Sink::Pipe(writer) => Sink::Pipe(writer.try_clone()?),
        })
    }
}

impl From<Sink> for Stdio {
    fn from(sink: Sink) -> Stdio {
        match sink {
            Sink::File(file) => file.into(),
            Sink::Pipe(writer) => writer.into(),
        }
    }
}

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Sink::File(file) => file.write(buf),
            Sink::Pipe(writer) => writer.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Sink::File(file) => file.flush(),
            Sink::Pipe(writer) => writer.flush(),
        }
    }
}

#[derive(Debug, Error)]
#[error("{program}: couldn't execute this command: {source}")]
pub struct LaunchError {
    pub program: String,
    #[source]
    pub source: io::Error,
}

/// Starts `argv[0]` (searched on `PATH`) with `input` as its standard input and `output`
/// bound to both standard output and standard error.
///
/// Returns once the child exists; waiting is left to the caller. All descriptors passed
/// in are released before returning, on success and on failure. When the program cannot
/// be started the failure text is written to `output` first, where the program's own
/// output would have gone.
pub fn launch(argv: &[OsString], input: Source, mut output: Sink) -> Result<ChildHandle, LaunchError> {
    let Some((program, args)) = argv.split_first() else {
        return Err(LaunchError {
            program: String::new(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "empty argument vector"),
        });
    };

    let spawned = output.try_clone().and_then(|stdout| {
        let stderr = output.try_clone()?;
        Command::new(program)
            .args(args)
            .stdin(input)
            .stdout(stdout)
            .stderr(stderr)
            .spawn()
    });

    let name = program.to_string_lossy();
    match spawned {
        Ok(child) => Ok(ChildHandle::new(child, name)),
        Err(source) => {
            let err = LaunchError {
                program: name.into_owned(),
                source,
            };
            let _ = writeln!(output, "{err}");
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reap::{Termination, reap};
    use std::io::Read;

    fn argv(parts: &[&str]) -> Vec<OsString> {
        parts.iter().map(OsString::from).collect()
    }

    #[test]
    fn test_stdout_and_stderr_share_sink() {
        let (mut reader, writer) = io::pipe().unwrap();
        let child = launch(
            &argv(&["sh", "-c", "echo out; echo err 1>&2"]),
            Source::Inherit,
            Sink::Pipe(writer),
        )
        .unwrap();
        let mut text = String::new();
        reader.read_to_string(&mut text).unwrap();
        assert_eq!(reap(child).unwrap(), Termination::Exited(0));
        assert_eq!(text, "out\nerr\n");
    }

    #[test]
    fn test_reads_from_pipe_source() {
        let (stdin_reader, mut stdin_writer) = io::pipe().unwrap();
        let (mut out_reader, out_writer) = io::pipe().unwrap();
        let child = launch(
            &argv(&["tr", "a-z", "A-Z"]),
            Source::Pipe(stdin_reader),
            Sink::Pipe(out_writer),
        )
        .unwrap();
        stdin_writer.write_all(b"shout").unwrap();
        drop(stdin_writer);
        let mut text = String::new();
        out_reader.read_to_string(&mut text).unwrap();
        assert!(reap(child).unwrap().success());
        assert_eq!(text, "SHOUT");
    }

    #[test]
    fn test_missing_program_reports_into_sink() {
        let (mut reader, writer) = io::pipe().unwrap();
        let err = launch(
            &argv(&["definitely-not-a-program-xyz"]),
            Source::Inherit,
            Sink::Pipe(writer),
        )
        .unwrap_err();
        assert_eq!(err.program, "definitely-not-a-program-xyz");
        assert_eq!(err.source.kind(), io::ErrorKind::NotFound);

        // the write end was released, so this read reaches end of stream
        let mut text = String::new();
        reader.read_to_string(&mut text).unwrap();
        assert!(text.starts_with("definitely-not-a-program-xyz: couldn't execute this command"));
    }

    #[test]
    fn test_non_utf8_argument_reaches_program() {
        use std::os::unix::ffi::OsStringExt;

        let (mut reader, writer) = io::pipe().unwrap();
        let args = vec![
            OsString::from("printf"),
            OsString::from_vec(b"caf\xe9".to_vec()),
        ];
        let child = launch(&args, Source::Inherit, Sink::Pipe(writer)).unwrap();
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).unwrap();
        assert!(reap(child).unwrap().success());
        assert_eq!(bytes, b"caf\xe9");
    }

    #[test]
    fn test_empty_argv() {
        let (_reader, writer) = io::pipe().unwrap();
        assert!(launch(&[], Source::Inherit, Sink::Pipe(writer)).is_err());
    }
}
