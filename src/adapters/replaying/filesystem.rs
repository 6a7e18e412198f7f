//! Replaying adapter for the `FileSystem` port.

use std::path::Path;
use std::sync::Mutex;

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::filesystem::FileSystem;

/// Replays recorded filesystem operations from a cassette.
pub struct ReplayingFileSystem {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingFileSystem {
    /// Creates a new replaying filesystem from a cassette replayer.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }

    /// Replays a boolean query; a missing or malformed entry answers `false`.
    fn replay_bool(&self, method: &str, path: &Path) -> bool {
        match next_output(&self.replayer, "fs", method) {
            Ok(output) => output.as_bool().unwrap_or_else(|| {
                tracing::warn!(method, path = %path.display(), "expected boolean output in cassette");
                false
            }),
            Err(err) => {
                tracing::warn!(method, path = %path.display(), %err, "replay failed");
                false
            }
        }
    }
}

impl FileSystem for ReplayingFileSystem {
    fn read_to_string(
        &self,
        _path: &Path,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let output = next_output(&self.replayer, "fs", "read_to_string")?;
        replay_result(&output, "fs::read_to_string")
    }

    fn write(
        &self,
        _path: &Path,
        _contents: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let output = next_output(&self.replayer, "fs", "write")?;
        if let Some(err) = output.get("err") {
            let msg = err.as_str().unwrap_or("unknown error").to_string();
            return Err(msg.into());
        }
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        self.replay_bool("exists", path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.replay_bool("is_dir", path)
    }

    fn list_dir(
        &self,
        _path: &Path,
    ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>> {
        let output = next_output(&self.replayer, "fs", "list_dir")?;
        replay_result(&output, "fs::list_dir")
    }
}
