//! Filesystem port for source-tree I/O.

use std::path::Path;

/// Provides access to the source tree being scanned.
///
/// Everything the engine reads (directory listings, CUE sources, build
/// files, settings) and the generated output it writes goes through this
/// trait, so whole runs can be recorded and replayed.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a UTF-8 string.
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or is not valid UTF-8.
    fn read_to_string(
        &self,
        path: &Path,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>>;

    /// Writes the given contents to a file, creating or overwriting it.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails (permissions, disk full, etc.).
    fn write(
        &self,
        path: &Path,
        contents: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Returns `true` if the path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Returns `true` if the path exists and is a directory.
    fn is_dir(&self, path: &Path) -> bool;

    /// Lists the entry names in a directory, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the path is not a directory or cannot be read.
    fn list_dir(
        &self,
        path: &Path,
    ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>>;
}
