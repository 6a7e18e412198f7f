//! Rule generation for one directory.
//!
//! [`generate_rules`] is called once per directory, children before their
//! parent. It classifies the directory's files, groups the CUE sources by
//! package, selects one package and turns it into a `cue_instance` rule.
//! Directories that are CUE module roots also get a `cue_module` rule.

pub mod naming;
pub mod visibility;

use std::collections::BTreeSet;
use std::path::Path;

use serde::Serialize;

use crate::config::buildfile::BuildFile;
use crate::config::module::{MODULE_DIR, MODULE_FILE};
use crate::config::CueConfig;
use crate::fileinfo::{self, FileExt, CUE_EXT};
use crate::kinds::{self, INSTANCE_KIND, MODULE_KIND};
use crate::package::{self, CuePackage};
use crate::platform::PlatformStrings;
use crate::ports::filesystem::FileSystem;
use crate::registry::PackageRegistry;
use crate::rule::Rule;

/// Language name used in import specs.
pub const LANG: &str = "cue";

/// Inputs for one directory.
#[derive(Debug, Clone, Copy)]
pub struct GenerateArgs<'a> {
    /// Configuration in effect for the directory.
    pub config: &'a CueConfig,
    /// Absolute directory path.
    pub dir: &'a Path,
    /// Directory relative to the repository root.
    pub rel: &'a str,
    /// Existing build file, if any.
    pub file: Option<&'a BuildFile>,
    /// Names of subdirectories.
    pub subdirs: &'a [String],
    /// Names of regular files.
    pub regular_files: &'a [String],
    /// Names of files produced by rules in the existing build file.
    pub gen_files: &'a [String],
    /// Rules other generators produced for this directory.
    pub other_gen: &'a [Rule],
}

/// Rules generated for one directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerateResult {
    /// Non-empty rules to merge into the build file.
    pub gen: Vec<Rule>,
    /// Empty rules; matching existing rules should be deleted.
    pub empty: Vec<Rule>,
    /// Import metadata of each rule in `gen`, in the same order.
    pub imports: Vec<PlatformStrings>,
}

/// An import path a rule can be found under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportSpec {
    /// Language of the import.
    pub lang: String,
    /// The import path.
    pub imp: String,
}

/// Generates rules for the directory described by `args` and records the
/// outcome in `registry`.
///
/// Per-file and per-directory failures are logged and never abort.
pub fn generate_rules(
    fs: &dyn FileSystem,
    registry: &PackageRegistry,
    args: &GenerateArgs<'_>,
) -> GenerateResult {
    let (cue_files, other_files): (Vec<&String>, Vec<&String>) =
        args.regular_files.iter().partition(|f| f.ends_with(CUE_EXT));

    let infos: Vec<_> =
        cue_files.iter().map(|name| fileinfo::cue_file_info(fs, &args.dir.join(name))).collect();
    let (packages, unknown) = package::build_packages(args.dir, args.rel, &infos);
    let had_packages = !packages.is_empty();

    let mut pkg = match package::select_package(args.config, args.rel, packages) {
        Ok(pkg) => pkg,
        Err(err) => {
            tracing::warn!(%err, "skipping directory with ambiguous packages");
            None
        }
    };
    if pkg.is_none() && !had_packages && unknown.iter().any(|f| f.ext == FileExt::Cue) {
        // Unreadable sources still need a rule so the build reports them.
        let name = package::default_package_name(args.config, args.rel);
        tracing::debug!(rel = args.rel, name = %name, "no readable package clause, using default name");
        pkg = Some(CuePackage {
            name,
            dir: args.dir.to_path_buf(),
            rel: args.rel.to_string(),
            import_path: args.config.import_path(args.rel),
            ..CuePackage::default()
        });
    }

    let mut rules = Vec::new();
    if let Some(mut pkg) = pkg {
        for info in &unknown {
            pkg.add_file(info);
        }
        for name in other_files {
            pkg.add_file(&fileinfo::file_name_info(&args.dir.join(name)));
        }

        // Generated files may shadow static files of the same name; the
        // static file's contents stand in for them.
        let regular: BTreeSet<&str> = args.regular_files.iter().map(String::as_str).collect();
        let consumed: BTreeSet<&str> = args
            .other_gen
            .iter()
            .flat_map(|r| r.attr_strings("srcs").into_iter().chain(r.attr_string("src")))
            .collect();
        for name in args.gen_files {
            if regular.contains(name.as_str()) || consumed.contains(name.as_str()) {
                continue;
            }
            pkg.add_file(&fileinfo::file_name_info(&args.dir.join(name)));
        }

        let should_set_visibility = args.file.map_or(true, |f| !f.has_default_visibility());
        rules.push(generate_instance(args.config, args.rel, &pkg, should_set_visibility));
    }

    if args.subdirs.iter().any(|s| s == MODULE_DIR) && fs.exists(&args.dir.join(MODULE_FILE)) {
        let mut module = Rule::new(MODULE_KIND, MODULE_KIND);
        module.set_attr("file", MODULE_FILE);
        rules.push(module);
    }

    if let Some(file) = args.file {
        let stale = stale_rules(file, &rules);
        rules.extend(stale);
    }

    let mut res = GenerateResult::default();
    for rule in rules {
        let empty = match kinds::kind_info(rule.kind()) {
            Some(info) => rule.is_empty(info),
            None => true,
        };
        if empty {
            res.empty.push(rule);
        } else {
            res.imports.push(rule.imports().cloned().unwrap_or_default());
            res.gen.push(rule);
        }
    }

    registry.record(args.rel, args.file.is_some() || !res.gen.is_empty(), args.subdirs);
    res
}

fn generate_instance(config: &CueConfig, rel: &str, pkg: &CuePackage, set_visibility: bool) -> Rule {
    let name = config.naming_convention.instance_name(&pkg.import_path, &pkg.name);
    let mut rule = Rule::new(INSTANCE_KIND, name);
    if !pkg.has_cue() {
        return rule;
    }

    let target = &pkg.instance;
    if !target.sources.is_empty() {
        rule.set_attr("srcs", target.sources.build_flat());
    }
    if set_visibility {
        rule.set_attr("visibility", visibility::common_visibility(config, rel, &pkg.import_path));
    }
    rule.set_attr("package_name", pkg.name.as_str());
    if pkg.import_path.is_empty() {
        tracing::warn!(rel, package = %pkg.name, "no import path; set a prefix");
    } else {
        rule.set_attr("importpath", pkg.import_path.as_str());
    }
    if let Some(importmap) = config.importmap(rel) {
        rule.set_attr("importmap", importmap);
    }
    rule.set_imports(target.imports.build());
    rule
}

/// Empty rules standing in for existing rules of a known kind that were not
/// generated again, so the merger deletes them.
fn stale_rules(file: &BuildFile, generated: &[Rule]) -> Vec<Rule> {
    kinds::kinds()
        .iter()
        .flat_map(|(kind, _)| file.calls_named(*kind).map(move |call| (*kind, call)))
        .filter_map(|(kind, call)| call.kwarg_string("name").map(|name| (kind, name)))
        .filter(|(kind, name)| !generated.iter().any(|r| r.kind() == *kind && r.name() == *name))
        .map(|(kind, name)| Rule::new(kind, name))
        .collect()
}

/// Import specs a rule can be resolved by.
#[must_use]
pub fn imports(rule: &Rule) -> Vec<ImportSpec> {
    rule.attr_string("importpath")
        .filter(|imp| !imp.is_empty())
        .map(|imp| ImportSpec { lang: LANG.to_string(), imp: imp.to_string() })
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::AttrValue;
    use crate::testutil::MemFs;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    fn prefixed() -> CueConfig {
        let mut c = CueConfig::default();
        c.set_prefix("example.com/repo", "").unwrap();
        c
    }

    struct Dir {
        rel: &'static str,
        files: Vec<String>,
        subdirs: Vec<String>,
    }

    impl Dir {
        fn new(rel: &'static str, files: &[&str]) -> Self {
            Self { rel, files: names(files), subdirs: Vec::new() }
        }

        fn generate(&self, fs: &MemFs, config: &CueConfig, file: Option<&BuildFile>) -> GenerateResult {
            let dir = Path::new("/repo").join(self.rel);
            let args = GenerateArgs {
                config,
                dir: &dir,
                rel: self.rel,
                file,
                subdirs: &self.subdirs,
                regular_files: &self.files,
                gen_files: &[],
                other_gen: &[],
            };
            generate_rules(fs, &PackageRegistry::new(), &args)
        }
    }

    #[test]
    fn single_file_package() {
        let fs = MemFs::new([("/repo/foo/foo.cue", "package foo\n\nimport \"x/y\"\n")]);
        let res = Dir::new("foo", &["foo.cue"]).generate(&fs, &prefixed(), None);

        assert_eq!(res.gen.len(), 1);
        assert!(res.empty.is_empty());
        let rule = &res.gen[0];
        assert_eq!(rule.kind(), INSTANCE_KIND);
        assert_eq!(rule.name(), "foo");
        assert_eq!(rule.attr_strings("srcs"), vec!["foo.cue"]);
        assert_eq!(rule.attr_string("importpath"), Some("example.com/repo/foo"));
        assert_eq!(rule.attr_string("package_name"), Some("foo"));
        assert_eq!(rule.attr_strings("visibility"), vec!["//visibility:public"]);
        assert_eq!(rule.attr("importmap"), None);
        assert_eq!(res.imports, vec![PlatformStrings { generic: names(&["x/y"]), ..PlatformStrings::default() }]);
    }

    #[test]
    fn stale_rules_become_empty_rules() {
        let fs = MemFs::new([("/repo/data/values.json", "{}")]);
        let file = BuildFile::parse(
            "/repo/data/BUILD.bazel",
            "cue_instance(\n    name = \"data\",\n    srcs = [\"old.cue\"],\n)\n\ncue_module(name = \"cue_module\", file = \"cue.mod/module.cue\")\n",
        );
        let res = Dir::new("data", &["values.json", "BUILD.bazel"]).generate(&fs, &prefixed(), Some(&file));

        assert!(res.gen.is_empty());
        assert_eq!(res.empty.len(), 2);
        assert_eq!((res.empty[0].kind(), res.empty[0].name()), (MODULE_KIND, "cue_module"));
        assert_eq!((res.empty[1].kind(), res.empty[1].name()), (INSTANCE_KIND, "data"));
        assert!(res.empty.iter().all(|r| r.attr_keys().next().is_none()));
    }

    #[test]
    fn regenerated_rules_are_not_reported_empty() {
        let fs = MemFs::new([("/repo/foo/foo.cue", "package foo\n")]);
        let file = BuildFile::parse(
            "/repo/foo/BUILD.bazel",
            "cue_instance(name = \"foo\", srcs = [\"foo.cue\"])\ncue_instance(name = \"old\", srcs = [\"old.cue\"])\ngenrule(name = \"data\")\n",
        );
        let res = Dir::new("foo", &["foo.cue", "BUILD.bazel"]).generate(&fs, &prefixed(), Some(&file));

        assert_eq!(res.gen.len(), 1);
        assert_eq!(res.gen[0].name(), "foo");
        assert_eq!(res.empty.len(), 1);
        assert_eq!(res.empty[0].name(), "old");
    }

    #[test]
    fn unparsable_file_keeps_a_home() {
        let fs = MemFs::new([("/repo/bad/broken.cue", "package\n")]);
        let res = Dir::new("bad", &["broken.cue"]).generate(&fs, &prefixed(), None);
        assert_eq!(res.gen.len(), 1);
        assert_eq!(res.gen[0].name(), "bad");
        assert_eq!(res.gen[0].attr_strings("srcs"), vec!["broken.cue"]);
        assert_eq!(res.gen[0].attr_string("package_name"), Some("bad"));
    }

    #[test]
    fn unknown_package_files_join_selected_package() {
        let fs = MemFs::new([
            ("/repo/foo/a.cue", "package foo\n"),
            ("/repo/foo/b.cue", "import \"x\"\n"),
            ("/repo/foo/values.yaml", "a: 1\n"),
            ("/repo/foo/README.md", "# foo\n"),
        ]);
        let res = Dir::new("foo", &["README.md", "a.cue", "b.cue", "values.yaml"]).generate(&fs, &prefixed(), None);
        assert_eq!(res.gen[0].attr_strings("srcs"), vec!["a.cue", "b.cue", "values.yaml"]);
    }

    #[test]
    fn ignored_sources_alone_yield_nothing() {
        let fs = MemFs::new([("/repo/x/_draft.cue", "package x\n")]);
        let res = Dir::new("x", &["_draft.cue"]).generate(&fs, &prefixed(), None);
        assert_eq!(res, GenerateResult::default());
    }

    #[test]
    fn data_only_directory_yields_nothing() {
        let fs = MemFs::new([("/repo/data/values.json", "{}")]);
        let res = Dir::new("data", &["values.json"]).generate(&fs, &prefixed(), None);
        assert!(res.gen.is_empty());
        assert!(res.empty.is_empty());
    }

    #[test]
    fn ambiguous_directory_yields_nothing() {
        let fs = MemFs::new([("/repo/foo/a.cue", "package a\n"), ("/repo/foo/b.cue", "package b\n")]);
        let res = Dir::new("foo", &["a.cue", "b.cue"]).generate(&fs, &prefixed(), None);
        assert_eq!(res, GenerateResult::default());
    }

    #[test]
    fn default_package_wins_without_leaking_sources() {
        let fs = MemFs::new([("/repo/foo/a.cue", "package other\n"), ("/repo/foo/b.cue", "package foo\n")]);
        let res = Dir::new("foo", &["a.cue", "b.cue"]).generate(&fs, &prefixed(), None);
        assert_eq!(res.gen[0].attr_strings("srcs"), vec!["b.cue"]);
    }

    #[test]
    fn default_visibility_suppresses_visibility() {
        let fs = MemFs::new([("/repo/foo/foo.cue", "package foo\n")]);
        let build = BuildFile::parse("/repo/foo/BUILD.bazel", "package(default_visibility = [\"//x:__pkg__\"])\n");
        let res = Dir::new("foo", &["BUILD.bazel", "foo.cue"]).generate(&fs, &prefixed(), Some(&build));
        assert_eq!(res.gen[0].attr("visibility"), None);
    }

    #[test]
    fn internal_and_importmap_attrs() {
        let fs = MemFs::new([("/repo/a/internal/b/b.cue", "package b\n")]);
        let mut config = prefixed();
        config.importmap_prefix = "vendored/repo".into();
        config.extra_visibility = names(&["//tools:__pkg__"]);
        let res = Dir::new("a/internal/b", &["b.cue"]).generate(&fs, &config, None);
        let rule = &res.gen[0];
        assert_eq!(rule.attr_strings("visibility"), vec!["//a:__subpackages__", "//tools:__pkg__"]);
        assert_eq!(rule.attr_string("importmap"), Some("vendored/repo/a/internal/b"));
    }

    #[test]
    fn missing_prefix_omits_importpath_at_root() {
        let fs = MemFs::new([("/repo/root.cue", "package root\n")]);
        let res = Dir::new("", &["root.cue"]).generate(&fs, &CueConfig::default(), None);
        assert_eq!(res.gen[0].name(), "root");
        assert_eq!(res.gen[0].attr("importpath"), None);
        assert!(imports(&res.gen[0]).is_empty());
    }

    #[test]
    fn generated_files_are_filtered() {
        let fs = MemFs::new([("/repo/foo/foo.cue", "package foo\n")]);
        let config = prefixed();
        let mut consumer = Rule::new("genrule", "consume");
        consumer.set_attr("srcs", names(&["consumed.cue"]));
        let mut single = Rule::new("copy_file", "copy");
        single.set_attr("src", "copied.cue");
        let regular = names(&["foo.cue"]);
        let generated = names(&["foo.cue", "consumed.cue", "copied.cue", "gen.cue", "notes.txt"]);
        let args = GenerateArgs {
            config: &config,
            dir: Path::new("/repo/foo"),
            rel: "foo",
            file: None,
            subdirs: &[],
            regular_files: &regular,
            gen_files: &generated,
            other_gen: &[consumer, single],
        };
        let res = generate_rules(&fs, &PackageRegistry::new(), &args);
        assert_eq!(res.gen[0].attr_strings("srcs"), vec!["foo.cue", "gen.cue"]);
    }

    #[test]
    fn module_root_gets_module_rule() {
        let fs = MemFs::new([
            ("/repo/mod/cue.mod/module.cue", "module: \"example.com/mod\"\n"),
            ("/repo/mod/mod.cue", "package mod\n"),
        ]);
        let mut dir = Dir::new("mod", &["mod.cue"]);
        dir.subdirs = names(&[MODULE_DIR]);
        let res = dir.generate(&fs, &prefixed(), None);
        let kinds: Vec<&str> = res.gen.iter().map(Rule::kind).collect();
        assert_eq!(kinds, vec![INSTANCE_KIND, MODULE_KIND]);
        assert_eq!(res.gen[1].attr("file"), Some(&AttrValue::String(MODULE_FILE.into())));
        assert_eq!(res.imports.len(), 2);
        assert!(res.imports[1].is_empty());
    }

    #[test]
    fn registry_tracks_packages_and_ancestors() {
        let fs = MemFs::new([("/repo/a/b/b.cue", "package b\n")]);
        let config = prefixed();
        let registry = PackageRegistry::new();
        let generate = |rel: &str, dir: &str, files: &[String], subdirs: &[String]| {
            let args = GenerateArgs {
                config: &config,
                dir: Path::new(dir),
                rel,
                file: None,
                subdirs,
                regular_files: files,
                gen_files: &[],
                other_gen: &[],
            };
            generate_rules(&fs, &registry, &args)
        };
        generate("a/b", "/repo/a/b", &names(&["b.cue"]), &[]);
        generate("a", "/repo/a", &[], &names(&["b"]));
        generate("", "/repo", &[], &names(&["a"]));
        assert_eq!(registry.get("a/b"), Some(true));
        assert_eq!(registry.ancestor_roots(), vec!["", "a"]);
    }

    #[test]
    fn import_specs_come_from_importpath() {
        let mut rule = Rule::new(INSTANCE_KIND, "foo");
        assert!(imports(&rule).is_empty());
        rule.set_attr("importpath", "example.com/repo/foo");
        assert_eq!(
            imports(&rule),
            vec![ImportSpec { lang: "cue".into(), imp: "example.com/repo/foo".into() }]
        );
    }
}
