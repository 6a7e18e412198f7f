//! File classification and header metadata.
//!
//! A file is first classified from its name alone ([`file_name_info`]).
//! Only CUE sources are then opened and their package clause and imports
//! read ([`cue_file_info`]). Read and parse failures are logged and yield
//! a record with an unknown package, so the file still ends up in `srcs`
//! and the CUE toolchain reports the real problem.

pub mod scanner;

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::ports::filesystem::FileSystem;

pub use scanner::{parse_header, Header, SyntaxError};

/// Extension of CUE source files.
pub const CUE_EXT: &str = ".cue";

/// Extensions of data files CUE can load alongside a package.
const DATA_EXTS: &[&str] = &[".json", ".yaml", ".yml"];

/// Type of a file, based on its name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileExt {
    /// Not buildable: hidden, underscore-prefixed, or an unknown extension.
    #[default]
    Unknown,
    /// A `.cue` source.
    Cue,
    /// A data file that may be listed in `srcs` but is not a source.
    Data,
}

/// Whether a file is a source this engine reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Never opened.
    Ignored,
    /// A CUE source; its header is parsed.
    Recognized,
}

/// Everything needed to decide how to build one file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SourceFile {
    /// Path the file was classified from.
    pub path: PathBuf,
    /// Base name of `path`.
    pub name: String,
    /// Type of the file, based on its name.
    pub ext: FileExt,
    /// Declared package; empty for non-CUE files and unknown packages.
    pub package_name: String,
    /// Import paths, verbatim and in declaration order.
    pub imports: Vec<String>,
}

impl SourceFile {
    /// Recognized iff the file is a CUE source.
    #[must_use]
    pub fn classification(&self) -> Classification {
        match self.ext {
            FileExt::Cue => Classification::Recognized,
            FileExt::Data | FileExt::Unknown => Classification::Ignored,
        }
    }
}

/// Failure to read metadata from a CUE file.
#[derive(Debug, thiserror::Error)]
pub enum FileInfoError {
    /// The file could not be read.
    #[error("{path}: read failed: {message}")]
    Read {
        /// File that failed.
        path: String,
        /// Underlying I/O error.
        message: String,
    },
    /// The header could not be parsed.
    #[error("{path}: {source}")]
    Syntax {
        /// File that failed.
        path: String,
        /// Parse error.
        source: SyntaxError,
    },
}

/// Classifies a file by name without reading it.
#[must_use]
pub fn file_name_info(path: &Path) -> SourceFile {
    let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
    let ext = if name.starts_with('.') || name.starts_with('_') {
        FileExt::Unknown
    } else if name.ends_with(CUE_EXT) {
        FileExt::Cue
    } else if DATA_EXTS.iter().any(|e| name.ends_with(e)) {
        FileExt::Data
    } else {
        FileExt::Unknown
    };
    SourceFile { path: path.to_path_buf(), name, ext, ..SourceFile::default() }
}

/// Reads the package clause and imports of a CUE file.
///
/// # Errors
///
/// Returns [`FileInfoError`] if the file cannot be read or its header is
/// malformed.
pub fn extract_metadata(fs: &dyn FileSystem, path: &Path) -> Result<Header, FileInfoError> {
    let src = fs.read_to_string(path).map_err(|e| FileInfoError::Read {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    parse_header(&src)
        .map_err(|source| FileInfoError::Syntax { path: path.display().to_string(), source })
}

/// Classifies a file and, for CUE sources, reads its header.
///
/// Never fails: errors are logged and leave `package_name` and `imports`
/// empty.
#[must_use]
pub fn cue_file_info(fs: &dyn FileSystem, path: &Path) -> SourceFile {
    let mut info = file_name_info(path);
    if info.classification() == Classification::Ignored {
        return info;
    }
    match extract_metadata(fs, path) {
        Ok(header) => {
            info.package_name = header.package;
            info.imports = header.imports;
        }
        Err(err) => tracing::warn!(%err, "could not read CUE file header"),
    }
    info
}
