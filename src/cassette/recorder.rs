//! Records interactions into a cassette file.

use std::path::PathBuf;

use chrono::Utc;

use super::format::{Cassette, Interaction};

/// Records interactions and writes them as a YAML cassette file.
#[derive(Debug)]
pub struct CassetteRecorder {
    path: PathBuf,
    name: String,
    root: String,
    interactions: Vec<Interaction>,
}

impl CassetteRecorder {
    /// Create a new recorder that will write to the given path.
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>, root: impl Into<String>) -> Self {
        Self { path: path.into(), name: name.into(), root: root.into(), interactions: Vec::new() }
    }

    /// Record an interaction. The `seq` field is assigned automatically.
    pub fn record(
        &mut self,
        port: impl Into<String>,
        method: impl Into<String>,
        input: serde_json::Value,
        output: serde_json::Value,
    ) {
        let seq = self.interactions.len() as u64;
        self.interactions.push(Interaction {
            seq,
            port: port.into(),
            method: method.into(),
            input,
            output,
        });
    }

    /// Number of interactions recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    /// Finish recording and write the cassette YAML file to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn finish(self) -> Result<PathBuf, std::io::Error> {
        let cassette = Cassette {
            name: self.name,
            recorded_at: Utc::now(),
            root: self.root,
            interactions: self.interactions,
        };
        cassette.save(&self.path)?;
        Ok(self.path)
    }
}
