//! CUE module roots: directories holding `cue.mod/module.cue`.

use std::path::Path;

use crate::ports::filesystem::FileSystem;

/// Name of the module metadata directory.
pub const MODULE_DIR: &str = "cue.mod";

/// Path of the module file relative to the module root.
pub const MODULE_FILE: &str = "cue.mod/module.cue";

/// Extracts the module path from `module.cue` contents.
///
/// Reads the top-level `module: "<path>"` field and drops a trailing
/// major-version qualifier (`@v0`).
#[must_use]
pub fn module_path(src: &str) -> Option<String> {
    src.lines().find_map(|line| {
        let rest = line.trim().strip_prefix("module")?.trim_start().strip_prefix(':')?;
        let rest = rest.trim_start().strip_prefix('"')?;
        let (path, _) = rest.split_once('"')?;
        let path = path.split_once('@').map_or(path, |(p, _)| p);
        (!path.is_empty()).then(|| path.to_string())
    })
}

/// Reads the module path declared under `dir`, if any.
///
/// A missing or unreadable module file is logged and yields `None`.
#[must_use]
pub fn read_module_path(fs: &dyn FileSystem, dir: &Path) -> Option<String> {
    let path = dir.join(MODULE_FILE);
    match fs.read_to_string(&path) {
        Ok(src) => {
            let module = module_path(&src);
            if module.is_none() {
                tracing::debug!(path = %path.display(), "module file declares no module path");
            }
            module
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "could not read module file");
            None
        }
    }
}
