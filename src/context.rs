//! Service context bundling the port trait objects.

use std::path::Path;
use std::sync::Arc;

use crate::adapters::live::LiveFileSystem;
use crate::adapters::recording::RecordingFileSystem;
use crate::adapters::replaying::ReplayingFileSystem;
use crate::cassette::format::Cassette;
use crate::cassette::replayer::CassetteReplayer;
use crate::cassette::session::RecordingSession;
use crate::ports::filesystem::FileSystem;

/// Bundles all port trait objects into a single context.
///
/// Constructors wire up different adapter implementations (live,
/// recording, replaying).
pub struct ServiceContext {
    /// Filesystem for the source tree and generated output.
    pub fs: Box<dyn FileSystem>,
}

impl ServiceContext {
    /// Creates a live context backed by the real disk.
    #[must_use]
    pub fn live() -> Self {
        Self { fs: Box::new(LiveFileSystem) }
    }

    /// Creates a context that performs live I/O and records every
    /// interaction into `session`.
    #[must_use]
    pub fn recording(session: &RecordingSession) -> Self {
        Self { fs: Box::new(RecordingFileSystem::new(Box::new(LiveFileSystem), Arc::clone(&session.fs))) }
    }

    /// Creates a replaying context from a cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette file cannot be read or parsed.
    pub fn replaying(path: &Path) -> Result<Self, String> {
        let cassette = Cassette::load(path)?;
        Ok(Self::replaying_cassette(&cassette))
    }

    /// Creates a replaying context from an in-memory cassette.
    #[must_use]
    pub fn replaying_cassette(cassette: &Cassette) -> Self {
        Self { fs: Box::new(ReplayingFileSystem::new(CassetteReplayer::new(cassette))) }
    }

    /// Creates a context around an arbitrary filesystem implementation.
    #[must_use]
    pub fn with_fs(fs: Box<dyn FileSystem>) -> Self {
        Self { fs }
    }
}
