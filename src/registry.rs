//! Which directories yield a package, accumulated over one run.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::pathtools;

/// Package presence by directory, shared by every generation call of a run.
///
/// `true` means the directory has its own package (a build file or a
/// generated rule). `false` means it has none but a subdirectory appears
/// in the registry, so the directory may have to act as a package root.
#[derive(Debug, Default)]
pub struct PackageRegistry {
    rels: Mutex<HashMap<String, bool>>,
}

impl PackageRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the outcome for directory `rel` after its subdirectories
    /// have been processed.
    pub fn record(&self, rel: &str, has_package: bool, subdirs: &[String]) {
        let mut rels = self.lock();
        if has_package {
            rels.insert(rel.to_string(), true);
        } else if subdirs.iter().any(|sub| rels.contains_key(&pathtools::join(rel, sub))) {
            rels.insert(rel.to_string(), false);
        }
    }

    /// Outcome recorded for `rel`, if any.
    #[must_use]
    pub fn get(&self, rel: &str) -> Option<bool> {
        self.lock().get(rel).copied()
    }

    /// Directories without a package of their own that have a package
    /// below them, sorted.
    #[must_use]
    pub fn ancestor_roots(&self) -> Vec<String> {
        let mut roots: Vec<String> =
            self.lock().iter().filter(|(_, has)| !**has).map(|(rel, _)| rel.clone()).collect();
        roots.sort();
        roots
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, bool>> {
        self.rels.lock().expect("package registry lock poisoned")
    }
}
