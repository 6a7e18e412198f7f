//! Grouping a directory's CUE files into packages and choosing one.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::config::CueConfig;
use crate::fileinfo::{FileExt, SourceFile, CUE_EXT};
use crate::pathtools;
use crate::platform::PlatformStringsBuilder;

/// Sources and imports of one generated rule.
#[derive(Debug, Clone, Default)]
pub struct Target {
    /// File names, relative to the package directory.
    pub sources: PlatformStringsBuilder,
    /// Import paths of the sources.
    pub imports: PlatformStringsBuilder,
}

impl Target {
    /// Records a file and its imports.
    pub fn add_file(&mut self, info: &SourceFile) {
        self.sources.add_generic(info.name.as_str());
        for imp in &info.imports {
            self.imports.add_generic(imp.as_str());
        }
    }
}

/// Files in one directory that declare the same package.
#[derive(Debug, Clone, Default)]
pub struct CuePackage {
    /// Declared package name.
    pub name: String,
    /// Absolute directory.
    pub dir: PathBuf,
    /// Directory relative to the repository root.
    pub rel: String,
    /// The `cue_instance` target.
    pub instance: Target,
    /// Import path; set when the package is selected.
    pub import_path: String,
}

impl CuePackage {
    fn new(name: &str, dir: PathBuf, rel: &str) -> Self {
        Self { name: name.to_string(), dir, rel: rel.to_string(), ..Self::default() }
    }

    /// Adds a file to the instance target. Unbuildable files are skipped.
    pub fn add_file(&mut self, info: &SourceFile) {
        if info.ext == FileExt::Unknown {
            return;
        }
        self.instance.add_file(info);
    }

    /// Returns `true` if at least one `.cue` source was added.
    #[must_use]
    pub fn has_cue(&self) -> bool {
        self.instance.sources.contains_suffix(CUE_EXT)
    }
}

/// No package could be chosen for a directory.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectError {
    /// Several packages and none named after the directory.
    #[error("{dir}: found packages {} (expected {default})", names.join(", "))]
    Ambiguous {
        /// Directory that was scanned.
        dir: String,
        /// Competing package names, sorted.
        names: Vec<String>,
        /// Name that would have been chosen.
        default: String,
    },
}

/// Groups `files` by declared package.
///
/// Files whose package is unknown are returned separately so the caller
/// can attach them to whichever package is selected.
#[must_use]
pub fn build_packages(
    dir: &std::path::Path,
    rel: &str,
    files: &[SourceFile],
) -> (BTreeMap<String, CuePackage>, Vec<SourceFile>) {
    let mut packages: BTreeMap<String, CuePackage> = BTreeMap::new();
    let mut unknown = Vec::new();
    for f in files {
        if f.package_name.is_empty() {
            unknown.push(f.clone());
            continue;
        }
        packages
            .entry(f.package_name.clone())
            .or_insert_with(|| CuePackage::new(&f.package_name, dir.to_path_buf(), rel))
            .add_file(f);
    }
    (packages, unknown)
}

/// Chooses the package to generate a rule for.
///
/// A single package is always chosen. Among several, the one named after
/// the directory wins; otherwise selection fails. The chosen package gets
/// its import path.
///
/// # Errors
///
/// Returns [`SelectError::Ambiguous`] when several packages compete and
/// none matches [`default_package_name`].
pub fn select_package(
    config: &CueConfig,
    rel: &str,
    mut packages: BTreeMap<String, CuePackage>,
) -> Result<Option<CuePackage>, SelectError> {
    let default = default_package_name(config, rel);
    let selected = if packages.len() <= 1 {
        packages.into_values().next()
    } else if let Some(pkg) = packages.remove(&default) {
        Some(pkg)
    } else {
        return Err(SelectError::Ambiguous {
            dir: if rel.is_empty() { ".".to_string() } else { rel.to_string() },
            names: packages.into_keys().collect(),
            default,
        });
    };
    Ok(selected.map(|mut pkg| {
        pkg.import_path = config.import_path(rel);
        pkg
    }))
}

/// Package name expected for the directory `rel`.
#[must_use]
pub fn default_package_name(config: &CueConfig, rel: &str) -> String {
    pathtools::rel_base_name(rel, &config.prefix)
}
