//! Per-directory configuration.
//!
//! A [`CueConfig`] is built once for the repository root from [`Settings`]
//! and command-line flags, then refined for each directory as the walk
//! descends by [`CueConfig::configure`], which reads that directory's
//! build file and CUE module file. A child always starts from a clone of
//! its parent's configuration, so siblings never see each other's changes.

pub mod buildfile;
pub mod module;
pub mod settings;

use crate::generate::naming::NamingConvention;
use crate::pathtools;

use self::buildfile::BuildFile;
pub use self::settings::{Repository, Settings, SettingsError};

/// A prefix that cannot be used to build import paths.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrefixError {
    /// Absolute or local (relative) import prefix.
    #[error("invalid prefix: {0:?}")]
    Invalid(String),
}

/// Checks that `prefix` may be used as an import path prefix.
///
/// Prefixes beginning with `/` and local imports (`.`, `..`, `./x`,
/// `../x`) are rejected. The empty prefix is allowed.
///
/// # Errors
///
/// Returns [`PrefixError::Invalid`] for a rejected prefix.
pub fn check_prefix(prefix: &str) -> Result<(), PrefixError> {
    let local = prefix == "."
        || prefix == ".."
        || prefix.starts_with("./")
        || prefix.starts_with("../");
    if prefix.starts_with('/') || local {
        return Err(PrefixError::Invalid(prefix.to_string()));
    }
    Ok(())
}

/// Configuration in effect for one directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CueConfig {
    /// Import path prefix.
    pub prefix: String,
    /// Directory where `prefix` was set (`""` for the root).
    pub prefix_rel: String,
    /// Whether `prefix` was set explicitly.
    pub prefix_set: bool,
    /// Import map prefix; empty when unset.
    pub importmap_prefix: String,
    /// Directory where `importmap_prefix` was set.
    pub importmap_prefix_rel: String,
    /// Extra targets internal packages are visible to.
    pub extra_visibility: Vec<String>,
    /// How instance rules are named.
    pub naming_convention: NamingConvention,
    /// External repositories, for internal-module visibility.
    pub repos: Vec<Repository>,
}

impl CueConfig {
    /// Builds the root configuration from a settings file.
    ///
    /// # Errors
    ///
    /// Returns [`PrefixError`] if the settings declare an invalid prefix.
    pub fn from_settings(settings: &Settings) -> Result<Self, PrefixError> {
        let mut config = Self {
            extra_visibility: settings.visibility.iter().map(|v| v.trim().to_string()).collect(),
            repos: settings.repositories.clone(),
            ..Self::default()
        };
        if let Some(prefix) = &settings.prefix {
            config.set_prefix(prefix, "")?;
        }
        if let Some(prefix) = &settings.importmap_prefix {
            config.importmap_prefix.clone_from(prefix);
        }
        if let Some(token) = &settings.naming_convention {
            config.set_naming_convention(token);
        }
        Ok(config)
    }

    /// Sets the import path prefix declared in directory `rel`.
    ///
    /// # Errors
    ///
    /// Returns [`PrefixError`] and leaves the configuration unchanged if
    /// `prefix` is rejected by [`check_prefix`].
    pub fn set_prefix(&mut self, prefix: &str, rel: &str) -> Result<(), PrefixError> {
        check_prefix(prefix)?;
        self.prefix = prefix.to_string();
        self.prefix_rel = rel.to_string();
        self.prefix_set = true;
        Ok(())
    }

    /// Returns the configuration for directory `rel`, given its build file
    /// and the module path declared in its `cue.mod/module.cue`, if any.
    #[must_use]
    pub fn configure(&self, rel: &str, file: Option<&BuildFile>, module: Option<&str>) -> Self {
        let mut config = self.clone();
        if let Some(file) = file {
            for d in &file.directives {
                match d.key.as_str() {
                    "cue_visibility" => config.extra_visibility.push(d.value.trim().to_string()),
                    "importmap_prefix" => {
                        config.importmap_prefix.clone_from(&d.value);
                        config.importmap_prefix_rel = rel.to_string();
                    }
                    "prefix" => config.try_set_prefix(&d.value, rel),
                    "cue_naming_convention" => config.set_naming_convention(&d.value),
                    other => tracing::debug!(directive = other, rel, "ignoring directive"),
                }
            }

            if !config.prefix_set {
                for call in &file.calls {
                    match call.name.as_str() {
                        "cue_prefix" => {
                            if let [arg] = call.args.as_slice() {
                                if let (None, Some(prefix)) = (&arg.key, &arg.string) {
                                    config.try_set_prefix(prefix, rel);
                                }
                            }
                        }
                        "gazelle" => {
                            if let Some(prefix) = call.kwarg_string("prefix").filter(|p| !p.is_empty()) {
                                config.try_set_prefix(prefix, rel);
                            }
                        }
                        _ => {}
                    }
                }
            }
        }

        if let Some(module) = module.filter(|_| !config.prefix_set) {
            tracing::debug!(rel, module, "using module path as prefix");
            config.try_set_prefix(module, rel);
        }
        config
    }

    /// Import path of the package in directory `rel`.
    #[must_use]
    pub fn import_path(&self, rel: &str) -> String {
        pathtools::join(&self.prefix, pathtools::trim_prefix(rel, &self.prefix_rel))
    }

    /// Import map for the package in `rel`, when it differs from its
    /// import path.
    #[must_use]
    pub fn importmap(&self, rel: &str) -> Option<String> {
        if self.importmap_prefix.is_empty() {
            return None;
        }
        let importmap = pathtools::join(
            &self.importmap_prefix,
            pathtools::trim_prefix(rel, &self.importmap_prefix_rel),
        );
        (importmap != self.import_path(rel)).then_some(importmap)
    }

    fn try_set_prefix(&mut self, prefix: &str, rel: &str) {
        if let Err(err) = self.set_prefix(prefix, rel) {
            tracing::warn!(rel, %err, "ignoring prefix");
        }
    }

    fn set_naming_convention(&mut self, token: &str) {
        match token.parse() {
            Ok(convention) => self.naming_convention = convention,
            Err(err) => tracing::warn!(%err, "ignoring naming convention"),
        }
    }
}
