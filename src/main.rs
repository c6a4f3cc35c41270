use std::env;
use std::process::ExitCode;

use batchexec::Settings;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};

/// Exit status for a wrong command line.
const USAGE_STATUS: u8 = 2;

fn main() -> ExitCode {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        let program = args.first().map_or("batchexec", String::as_str);
        eprintln!("Usage: {program} <file-to-be-executed>");
        return ExitCode::from(USAGE_STATUS);
    }

    let settings = Settings::from_env();
    if let Err(e) = TermLogger::init(
        settings.log_level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("warning: logging disabled: {e}");
    }

    println!("Batch file being executed: {}\n", args[1]);
    match batchexec::run(&args[1], &settings) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
