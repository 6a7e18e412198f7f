//! Repository-level settings file (`cuerules.yaml`).
//!
//! ```yaml
//! prefix: example.com/repo
//! importmap_prefix: example.com/vendored
//! visibility:
//!   - //tools:__subpackages__
//! naming_convention: import
//! repositories:
//!   - name: com_example_other
//!     importpath: example.com/other
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::ports::filesystem::FileSystem;

/// Default settings file name, looked up at the repository root.
pub const SETTINGS_FILE: &str = "cuerules.yaml";

/// An external repository known to the build.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Repository {
    /// Repository name, as used in `@name//...` labels.
    pub name: String,
    /// Import path prefix of the packages it provides.
    pub importpath: String,
}

/// Settings applied at the repository root before any build file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Import path prefix of the repository root.
    pub prefix: Option<String>,
    /// Import map prefix of the repository root.
    pub importmap_prefix: Option<String>,
    /// Extra visibility targets for restricted packages.
    pub visibility: Vec<String>,
    /// Naming convention token.
    pub naming_convention: Option<String>,
    /// Known external repositories.
    pub repositories: Vec<Repository>,
}

/// Failure to load the settings file.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// The file could not be read.
    #[error("failed to read settings {path}: {message}")]
    Read {
        /// Settings file path.
        path: String,
        /// Underlying I/O error.
        message: String,
    },
    /// The file is not valid settings YAML.
    #[error("failed to parse settings {path}: {source}")]
    Parse {
        /// Settings file path.
        path: String,
        /// YAML error.
        source: serde_yaml::Error,
    },
}

impl Settings {
    /// Loads settings from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if the file cannot be read or parsed.
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self, SettingsError> {
        let content = fs.read_to_string(path).map_err(|e| SettingsError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&content)
            .map_err(|source| SettingsError::Parse { path: path.display().to_string(), source })
    }

    /// Parses settings YAML. An empty document yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns the YAML error for malformed input or unknown keys.
    pub fn parse(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }
}
