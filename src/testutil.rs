//! In-memory filesystem double shared by unit tests.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::context::ServiceContext;
use crate::ports::filesystem::FileSystem;

/// Files keyed by absolute path; directories exist implicitly.
pub(crate) struct MemFs {
    files: Mutex<BTreeMap<PathBuf, String>>,
}

impl MemFs {
    pub(crate) fn new<'a>(files: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let files = files.into_iter().map(|(p, c)| (PathBuf::from(p), c.to_string())).collect();
        Self { files: Mutex::new(files) }
    }

    pub(crate) fn into_context(self) -> ServiceContext {
        ServiceContext::with_fs(Box::new(self))
    }
}

impl FileSystem for MemFs {
    fn read_to_string(
        &self,
        path: &Path,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let files = self.files.lock().unwrap();
        files.get(path).cloned().ok_or_else(|| format!("File not found: {}", path.display()).into())
    }

    fn write(
        &self,
        path: &Path,
        contents: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut files = self.files.lock().unwrap();
        files.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        files.contains_key(path) || files.keys().any(|k| k.starts_with(path) && k != path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        let files = self.files.lock().unwrap();
        files.keys().any(|k| k.starts_with(path) && k != path)
    }

    fn list_dir(
        &self,
        path: &Path,
    ) -> Result<Vec<String>, Box<dyn std::error::Error + Send + Sync>> {
        let files = self.files.lock().unwrap();
        let mut names: Vec<String> = files
            .keys()
            .filter_map(|k| k.strip_prefix(path).ok())
            .filter_map(|rest| rest.components().next())
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect();
        names.dedup();
        if names.is_empty() && !files.keys().any(|k| k.starts_with(path)) {
            return Err(format!("Not a directory: {}", path.display()).into());
        }
        Ok(names)
    }
}
