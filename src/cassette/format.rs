//! Cassette data structures for recording and replaying interactions.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single recorded interaction with an external port.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    /// Sequence number (assigned automatically by the recorder).
    pub seq: u64,
    /// Port name (e.g. "fs").
    pub port: String,
    /// Method name invoked on the port.
    pub method: String,
    /// Input data sent to the port.
    pub input: serde_json::Value,
    /// Output data returned from the port.
    pub output: serde_json::Value,
}

/// A cassette containing a sequence of recorded interactions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cassette {
    /// Human-readable name for this cassette.
    pub name: String,
    /// When this cassette was recorded.
    pub recorded_at: DateTime<Utc>,
    /// Source root the recorded run scanned.
    pub root: String,
    /// Ordered list of interactions.
    pub interactions: Vec<Interaction>,
}

impl Cassette {
    /// Reads and parses a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid cassette.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read cassette file {}: {e}", path.display()))?;
        serde_yaml::from_str(&content)
            .map_err(|e| format!("Failed to parse cassette file {}: {e}", path.display()))
    }

    /// Serializes the cassette as YAML and writes it to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, path: &Path) -> Result<(), std::io::Error> {
        let yaml = serde_yaml::to_string(self).map_err(std::io::Error::other)?;
        std::fs::write(path, yaml)
    }
}
