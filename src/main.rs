//! Binary entrypoint for the `cuerules` CLI.

use std::process::ExitCode;

fn main() -> ExitCode {
    // Recording is handled in commands::dispatch via CUERULES_RECORD=<dir>.
    match cuerules::run(std::env::args()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
