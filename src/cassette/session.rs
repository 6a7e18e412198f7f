//! Recording session for a whole `cuerules` run.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use super::recorder::CassetteRecorder;

/// Owns the filesystem-port recorder for one run.
///
/// Cassettes are written to a timestamped directory under the base
/// directory given at construction.
pub struct RecordingSession {
    /// Recorder for filesystem interactions.
    pub fs: Arc<Mutex<CassetteRecorder>>,
    /// Output directory containing all cassette files.
    output_dir: PathBuf,
}

impl RecordingSession {
    /// Create a new recording session under `base_dir/<timestamp>/`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The cassette directory already exists
    /// - The directory cannot be created
    pub fn new(base_dir: &Path, root: &Path) -> Result<Self, String> {
        let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S%.3f").to_string();
        let output_dir = base_dir.join(&timestamp);

        if output_dir.exists() {
            return Err(format!("Cassette directory already exists: {}", output_dir.display()));
        }

        std::fs::create_dir_all(&output_dir)
            .map_err(|e| format!("Failed to create cassette directory: {e}"))?;

        let recorder = CassetteRecorder::new(
            output_dir.join("fs.cassette.yaml"),
            format!("{timestamp}-fs"),
            root.display().to_string(),
        );

        Ok(Self { fs: Arc::new(Mutex::new(recorder)), output_dir })
    }

    /// Finish the recorder and write its cassette file to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if an adapter still holds the recorder or the file
    /// cannot be written.
    pub fn finish(self) -> Result<PathBuf, String> {
        let recorder = Arc::try_unwrap(self.fs)
            .map_err(|_| "Recording adapter for fs still has references".to_string())?
            .into_inner()
            .map_err(|e| format!("Recorder lock for fs poisoned: {e}"))?;
        recorder.finish().map_err(|e| format!("Failed to write fs cassette: {e}"))?;

        Ok(self.output_dir)
    }
}
