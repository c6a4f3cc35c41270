use std::ffi::OsStr;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;
use std::process::Command;

use batchexec::{BatchScript, Settings, run_script};

fn settings_for(dir: &Path) -> Settings {
    Settings {
        session_log: dir.join("OUTPUT.txt"),
        ..Settings::default()
    }
}

#[test]
fn only_section_lines_run() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_for(dir.path());
    std::fs::write(&settings.session_log, "from an earlier run\n").unwrap();
    let script = BatchScript::from_bytes(
        "echo outside\n\
         %BEGIN\n\
         # a comment line\n\
         echo first # trailing comment\n\
         \n\
         printf hello | tr a-z A-Z\n\
         %BEGIN\n\
         ls | | wc\n\
         %END\n\
         echo after-end\n"
            .to_string(),
    );

    let summary = run_script(&script, &settings).unwrap();
    assert_eq!(summary.executed, 2);
    assert_eq!(summary.malformed, 1);
    assert_eq!(summary.failed_stages, 0);
    assert!(!summary.unterminated);

    let log = std::fs::read_to_string(&settings.session_log).unwrap();
    assert!(!log.contains("earlier run"));
    assert!(!log.contains("outside"));
    assert!(!log.contains("after-end"));
    assert!(log.starts_with("first\n\n\nHELLO\n\n"));
    assert!(log.contains("line 8: malformed line: pipeline stage 1 is empty"));
}

#[test]
fn redirected_lines_and_failures_are_counted() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_for(dir.path());
    let out = dir.path().join("out.txt");
    let script = BatchScript::from_bytes(format!(
        "%BEGIN\n\
         printf a >> {out}\n\
         printf b >> {out}\n\
         no-such-command-here\n\
         false\n",
        out = out.display()
    ));

    let summary = run_script(&script, &settings).unwrap();
    assert_eq!(summary.executed, 4);
    assert_eq!(summary.failed_stages, 2);
    assert!(summary.unterminated);
    assert_eq!(std::fs::read_to_string(&out).unwrap(), "ab");
}

#[test]
fn non_utf8_arguments_reach_the_program_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_for(dir.path());
    let script = BatchScript::from_bytes(&b"%BEGIN\nprintf caf\xe9\n%END\n"[..]);

    let summary = run_script(&script, &settings).unwrap();
    assert_eq!(summary.executed, 1);
    assert_eq!(std::fs::read(&settings.session_log).unwrap(), b"caf\xe9\n\n");
}

#[test]
fn non_utf8_redirection_target_is_used_as_written() {
    let dir = tempfile::tempdir().unwrap();
    let settings = settings_for(dir.path());
    let mut script = b"%BEGIN\nprintf x > ".to_vec();
    script.extend_from_slice(dir.path().as_os_str().as_bytes());
    script.extend_from_slice(b"/caf\xe9.txt\n%END\n");

    run_script(&BatchScript::from_bytes(script), &settings).unwrap();
    let target = dir.path().join(OsStr::from_bytes(b"caf\xe9.txt"));
    assert_eq!(std::fs::read(target).unwrap(), b"x");
}

#[test]
fn cli_usage_is_an_error() {
    let status = Command::new(env!("CARGO_BIN_EXE_batchexec"))
        .status()
        .unwrap();
    assert_eq!(status.code(), Some(2));
}

#[test]
fn cli_unreadable_batch_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_batchexec"))
        .arg(dir.path().join("missing.batch"))
        .current_dir(dir.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("cannot read batch file"));
}

#[test]
fn cli_runs_script_into_default_session_log() {
    let dir = tempfile::tempdir().unwrap();
    let script = dir.path().join("jobs.batch");
    std::fs::write(&script, "%BEGIN\necho from-cli\n%END\n").unwrap();
    let output = Command::new(env!("CARGO_BIN_EXE_batchexec"))
        .arg(&script)
        .current_dir(dir.path())
        .env_remove("BATCHEXEC_SESSION_LOG")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("Batch file being executed:"));
    let log = std::fs::read_to_string(dir.path().join("OUTPUT.txt")).unwrap();
    assert_eq!(log, "from-cli\n\n\n");
}
