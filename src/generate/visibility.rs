//! Visibility of generated rules.

use crate::config::CueConfig;
use crate::pathtools;

/// Label visible to every package.
pub const PUBLIC: &str = "//visibility:public";

/// Computes the visibility of the package in `rel` with `import_path`.
///
/// An `internal` directory in `rel` restricts the package to the subtree
/// of that directory's parent. An `internal` segment only in the import
/// path means the whole tree is an internal module: it is visible to the
/// repository and to external repositories sharing the module's prefix.
/// Configured extras follow the computed labels. Public packages get
/// [`PUBLIC`] alone, since Bazel rejects it alongside other labels.
#[must_use]
pub fn common_visibility(config: &CueConfig, rel: &str, import_path: &str) -> Vec<String> {
    let mut visibility = if let Some(i) = pathtools::index(rel, "internal") {
        let parent = rel[..i].trim_end_matches('/');
        vec![format!("//{parent}:__subpackages__")]
    } else if let Some(i) = pathtools::index(import_path, "internal") {
        let module = import_path[..i].trim_end_matches('/');
        let mut v = vec!["//:__subpackages__".to_string()];
        v.extend(
            config
                .repos
                .iter()
                .filter(|r| pathtools::has_prefix(&r.importpath, module))
                .map(|r| format!("@{}//:__subpackages__", r.name)),
        );
        v
    } else {
        return vec![PUBLIC.to_string()];
    };
    visibility.extend(config.extra_visibility.iter().cloned());
    visibility
}
