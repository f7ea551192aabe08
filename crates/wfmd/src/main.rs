use std::io::{self, Write};
use std::process::ExitCode;

fn main() -> ExitCode {
    match wfmd::run_daemon() {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            let _ = writeln!(io::stderr(), "wfmd: {error}");
            ExitCode::FAILURE
        }
    }
}
