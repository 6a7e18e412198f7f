//! Command dispatch and handlers.

pub mod generate;
pub mod inspect;
pub mod kinds;

use std::env;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cassette::session::RecordingSession;
use crate::cli::{Cli, Command, Format};
use crate::context::ServiceContext;

/// Records every filesystem interaction into a cassette under this directory.
pub const RECORD_ENV: &str = "CUERULES_RECORD";

/// Serves every filesystem interaction from this cassette file.
pub const REPLAY_ENV: &str = "CUERULES_REPLAY";

/// Dispatch a parsed command to its handler.
///
/// When `CUERULES_RECORD` is set to a directory path, all filesystem
/// interactions are recorded to a cassette in that directory. When
/// `CUERULES_REPLAY` names a cassette file, they are served from it.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch(cli: &Cli) -> Result<(), String> {
    if let Ok(path) = env::var(REPLAY_ENV) {
        let ctx = ServiceContext::replaying(Path::new(&path))?;
        return dispatch_with_context(&cli.command, &ctx);
    }

    let (ctx, session) = if let Ok(path) = env::var(RECORD_ENV) {
        let session = RecordingSession::new(&PathBuf::from(path), root(&cli.command))?;
        (ServiceContext::recording(&session), Some(session))
    } else {
        (ServiceContext::live(), None)
    };

    let result = dispatch_with_context(&cli.command, &ctx);

    // Finish recording after command completes (even on error)
    if let Some(session) = session {
        // Drop context first to release Arc references
        drop(ctx);
        finish_recording(session)?;
    }

    result
}

/// Dispatch a command with the given service context.
///
/// # Errors
///
/// Returns an error string if the selected command handler fails.
pub fn dispatch_with_context(command: &Command, ctx: &ServiceContext) -> Result<(), String> {
    match command {
        Command::Generate(opts) => generate::run(ctx, opts),
        Command::Inspect { file, format } => inspect::run(ctx, file, *format),
        Command::Kinds { format } => kinds::run(*format),
    }
}

fn root(command: &Command) -> &Path {
    match command {
        Command::Generate(opts) => &opts.root,
        Command::Inspect { file, .. } => file.parent().unwrap_or(Path::new(".")),
        Command::Kinds { .. } => Path::new("."),
    }
}

/// Finish a recording session and print the output directory.
fn finish_recording(session: RecordingSession) -> Result<(), String> {
    let output_dir = session.finish()?;
    eprintln!("Recording saved to: {}", output_dir.display());
    Ok(())
}

/// Serialises command output in the requested format.
pub(crate) fn render<T: Serialize>(value: &T, format: Format) -> Result<String, String> {
    match format {
        Format::Yaml => serde_yaml::to_string(value).map_err(|e| format!("Failed to render YAML: {e}")),
        Format::Json => serde_json::to_string_pretty(value)
            .map(|mut s| {
                s.push('\n');
                s
            })
            .map_err(|e| format!("Failed to render JSON: {e}")),
    }
}
