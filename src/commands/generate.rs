//! `cuerules generate` command.

use crate::cli::GenerateOpts;
use crate::config::settings::SETTINGS_FILE;
use crate::config::{CueConfig, Settings};
use crate::context::ServiceContext;
use crate::walk;

/// Execute the `generate` command.
///
/// Settings come from `--config`, or from `cuerules.yaml` at the root when
/// it exists; `--prefix` overrides the settings prefix.
///
/// # Errors
///
/// Returns an error string if the settings are invalid, the root cannot
/// be read, or the output cannot be written.
pub fn run(ctx: &ServiceContext, opts: &GenerateOpts) -> Result<(), String> {
    let config = root_config(ctx, opts)?;
    let out = walk::walk(ctx, &opts.root, &config)?;
    let text = super::render(&out, opts.format)?;
    match &opts.output {
        Some(path) => ctx
            .fs
            .write(path, &text)
            .map_err(|e| format!("Failed to write {}: {e}", path.display()))?,
        None => print!("{text}"),
    }
    Ok(())
}

fn root_config(ctx: &ServiceContext, opts: &GenerateOpts) -> Result<CueConfig, String> {
    let default_path = opts.root.join(SETTINGS_FILE);
    let settings_path = match &opts.config {
        Some(path) => Some(path.clone()),
        None => ctx.fs.exists(&default_path).then_some(default_path),
    };
    let settings = match settings_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading settings");
            Settings::load(ctx.fs.as_ref(), &path).map_err(|e| e.to_string())?
        }
        None => Settings::default(),
    };

    let mut config = CueConfig::from_settings(&settings).map_err(|e| e.to_string())?;
    if let Some(prefix) = &opts.prefix {
        config.set_prefix(prefix, "").map_err(|e| e.to_string())?;
    }
    Ok(config)
}
