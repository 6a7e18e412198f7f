//! Directory tree driver.
//!
//! Visits the tree depth-first: a directory's configuration is computed
//! before its children are visited, and its rules are generated after
//! every child has been processed.

use std::path::Path;

use serde::Serialize;

use crate::config::buildfile::BuildFile;
use crate::config::module::{self, MODULE_DIR};
use crate::config::CueConfig;
use crate::context::ServiceContext;
use crate::generate::{self, GenerateArgs, ImportSpec};
use crate::pathtools;
use crate::platform::PlatformStrings;
use crate::ports::filesystem::FileSystem;
use crate::registry::PackageRegistry;
use crate::rule::Rule;

/// Rules generated for one directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryResult {
    /// Directory relative to the root.
    pub rel: String,
    /// Rules to write.
    pub gen: Vec<Rule>,
    /// Rules to delete.
    pub empty: Vec<Rule>,
    /// Import metadata of each rule in `gen`.
    pub imports: Vec<PlatformStrings>,
    /// Import paths the rules in `gen` can be found under.
    pub resolves: Vec<ImportSpec>,
}

/// Everything a run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WalkOutput {
    /// Directories with rules, in visiting order.
    pub directories: Vec<DirectoryResult>,
    /// Directories with no package of their own but a package below them.
    pub ancestor_roots: Vec<String>,
}

/// Returns `true` for directories the walk never enters.
#[must_use]
pub fn is_skipped_dir(name: &str) -> bool {
    name.starts_with('.') || name.starts_with("bazel-") || name == MODULE_DIR
}

/// Walks the tree under `root`, starting from the root configuration.
///
/// # Errors
///
/// Returns an error if `root` cannot be listed. Failures below the root
/// are logged and the affected subtree is skipped.
pub fn walk(ctx: &ServiceContext, root: &Path, config: &CueConfig) -> Result<WalkOutput, String> {
    let registry = PackageRegistry::new();
    let mut out = WalkOutput::default();
    let walker = Walker { fs: ctx.fs.as_ref(), registry: &registry, root };
    walker.visit("", config, &mut out.directories)?;
    out.ancestor_roots = registry.ancestor_roots();
    tracing::info!(
        directories = out.directories.len(),
        ancestor_roots = out.ancestor_roots.len(),
        "walk finished"
    );
    Ok(out)
}

struct Walker<'a> {
    fs: &'a dyn FileSystem,
    registry: &'a PackageRegistry,
    root: &'a Path,
}

impl Walker<'_> {
    /// Only a failure to list the root itself is returned.
    fn visit(&self, rel: &str, parent: &CueConfig, out: &mut Vec<DirectoryResult>) -> Result<(), String> {
        let dir = if rel.is_empty() { self.root.to_path_buf() } else { self.root.join(rel) };
        let entries = match self.fs.list_dir(&dir) {
            Ok(entries) => entries,
            Err(err) if rel.is_empty() => return Err(format!("cannot read {}: {err}", dir.display())),
            Err(err) => {
                tracing::warn!(dir = %dir.display(), %err, "skipping unreadable directory");
                return Ok(());
            }
        };
        let (subdirs, files): (Vec<String>, Vec<String>) =
            entries.into_iter().partition(|name| self.fs.is_dir(&dir.join(name)));

        let file = BuildFile::load(self.fs, &dir, &files);
        let module = subdirs
            .iter()
            .any(|s| s == MODULE_DIR)
            .then(|| module::read_module_path(self.fs, &dir))
            .flatten();
        let config = parent.configure(rel, file.as_ref(), module.as_deref());

        for sub in subdirs.iter().filter(|s| !is_skipped_dir(s)) {
            self.visit(&pathtools::join(rel, sub), &config, out)?;
        }

        let gen_files = file.as_ref().map(BuildFile::gen_files).unwrap_or_default();
        let args = GenerateArgs {
            config: &config,
            dir: &dir,
            rel,
            file: file.as_ref(),
            subdirs: &subdirs,
            regular_files: &files,
            gen_files: &gen_files,
            other_gen: &[],
        };
        let res = generate::generate_rules(self.fs, self.registry, &args);
        if res.gen.is_empty() && res.empty.is_empty() {
            return Ok(());
        }
        tracing::debug!(rel, gen = res.gen.len(), empty = res.empty.len(), "generated rules");
        out.push(DirectoryResult {
            rel: rel.to_string(),
            resolves: res.gen.iter().flat_map(generate::imports).collect(),
            gen: res.gen,
            empty: res.empty,
            imports: res.imports,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::MemFs;

    fn prefixed() -> CueConfig {
        let mut c = CueConfig::default();
        c.set_prefix("example.com/repo", "").unwrap();
        c
    }

    #[test]
    fn children_are_generated_before_parents() {
        let ctx = MemFs::new([
            ("/repo/root.cue", "package repo\n"),
            ("/repo/a/a.cue", "package a\n"),
            ("/repo/a/b/b.cue", "package b\nimport \"example.com/repo/a\"\n"),
        ])
        .into_context();
        let out = walk(&ctx, Path::new("/repo"), &prefixed()).unwrap();
        let rels: Vec<&str> = out.directories.iter().map(|d| d.rel.as_str()).collect();
        assert_eq!(rels, vec!["a/b", "a", ""]);
        assert_eq!(out.directories[0].resolves[0].imp, "example.com/repo/a/b");
        assert_eq!(out.directories[0].imports[0].generic, vec!["example.com/repo/a"]);
        assert!(out.ancestor_roots.is_empty());
    }

    #[test]
    fn skips_hidden_output_and_module_dirs() {
        let ctx = MemFs::new([
            ("/repo/.git/x.cue", "package x\n"),
            ("/repo/bazel-out/y.cue", "package y\n"),
            ("/repo/cue.mod/module.cue", "module: \"example.com/mod\"\n"),
            ("/repo/cue.mod/pkg/z.cue", "package z\n"),
        ])
        .into_context();
        let out = walk(&ctx, Path::new("/repo"), &CueConfig::default()).unwrap();
        assert_eq!(out.directories.len(), 1);
        let root = &out.directories[0];
        assert_eq!(root.rel, "");
        assert_eq!(root.gen[0].kind(), "cue_module");
    }

    #[test]
    fn module_file_sets_prefix() {
        let ctx = MemFs::new([
            ("/repo/svc/cue.mod/module.cue", "module: \"example.com/svc@v0\"\n"),
            ("/repo/svc/api/api.cue", "package api\n"),
        ])
        .into_context();
        let out = walk(&ctx, Path::new("/repo"), &CueConfig::default()).unwrap();
        let api = out.directories.iter().find(|d| d.rel == "svc/api").unwrap();
        assert_eq!(api.gen[0].attr_string("importpath"), Some("example.com/svc/api"));
    }

    #[test]
    fn build_file_directives_apply_to_subtree() {
        let ctx = MemFs::new([
            ("/repo/BUILD.bazel", "# gazelle:prefix example.com/root\n"),
            ("/repo/lib/BUILD.bazel", "# gazelle:prefix example.com/lib\n"),
            ("/repo/lib/x/x.cue", "package x\n"),
            ("/repo/other/o.cue", "package other\n"),
        ])
        .into_context();
        let out = walk(&ctx, Path::new("/repo"), &CueConfig::default()).unwrap();
        let importpath = |rel: &str| {
            let d = out.directories.iter().find(|d| d.rel == rel).unwrap();
            d.gen[0].attr_string("importpath").map(str::to_string)
        };
        assert_eq!(importpath("lib/x").as_deref(), Some("example.com/lib/x"));
        assert_eq!(importpath("other").as_deref(), Some("example.com/root/other"));
    }

    #[test]
    fn package_free_ancestors_are_reported() {
        let ctx = MemFs::new([("/repo/a/b/c/c.cue", "package c\n"), ("/repo/d/notes.txt", "")])
            .into_context();
        let out = walk(&ctx, Path::new("/repo"), &prefixed()).unwrap();
        assert_eq!(out.ancestor_roots, vec!["", "a", "a/b"]);
    }

    #[test]
    fn unreadable_root_is_an_error() {
        let ctx = MemFs::new([("/repo/a.cue", "package a\n")]).into_context();
        assert!(walk(&ctx, Path::new("/missing"), &CueConfig::default()).is_err());
    }

    #[test]
    fn skip_rules() {
        assert!(is_skipped_dir(".git"));
        assert!(is_skipped_dir("bazel-bin"));
        assert!(is_skipped_dir("cue.mod"));
        assert!(!is_skipped_dir("bazel"));
        assert!(!is_skipped_dir("_private"));
    }
}
