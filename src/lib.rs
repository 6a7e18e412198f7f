//! Core library entry for the `cuerules` CLI.
//!
//! Scans a source tree for CUE packages and synthesizes `cue_instance`
//! and `cue_module` build rules for each directory.

pub mod adapters;
pub mod cassette;
pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod fileinfo;
pub mod generate;
pub mod kinds;
pub mod logging;
pub mod package;
pub mod pathtools;
pub mod platform;
pub mod ports;
pub mod registry;
pub mod rule;
pub mod walk;

#[cfg(test)]
mod testutil;

use clap::Parser;

/// Run the CLI with the provided arguments.
///
/// # Errors
///
/// Returns an error string when argument parsing fails or command execution fails.
pub fn run<I, T>(args: I) -> Result<(), String>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = cli::Cli::try_parse_from(args).map_err(|err| err.to_string())?;
    logging::init(cli.verbose);
    commands::dispatch(&cli)
}
