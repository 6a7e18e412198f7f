//! Integration tests for top-level CLI behavior.

use std::fs;
use std::path::Path;
use std::process::Command;

fn run_cuerules(args: &[&str]) -> std::process::Output {
    let bin = env!("CARGO_BIN_EXE_cuerules");
    Command::new(bin)
        .args(args)
        .env_remove("CUERULES_RECORD")
        .env_remove("CUERULES_REPLAY")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run cuerules binary")
}

fn write(root: &Path, rel: &str, contents: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn sample_tree() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "BUILD.bazel", "# gazelle:prefix example.com/repo\n");
    write(dir.path(), "foo/foo.cue", "package foo\n\nimport \"example.com/repo/bar\"\n");
    write(dir.path(), "foo/values.yaml", "a: 1\n");
    write(dir.path(), "bar/v2/bar.cue", "package bar\n");
    write(dir.path(), "a/internal/b/b.cue", "package b\n");
    dir
}

#[test]
fn generate_prints_yaml_rules() {
    let tree = sample_tree();
    let output = run_cuerules(&["generate", tree.path().to_str().unwrap()]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("kind: cue_instance"), "{stdout}");
    assert!(stdout.contains("importpath: example.com/repo/foo"), "{stdout}");
    assert!(stdout.contains("- values.yaml"), "{stdout}");
    assert!(stdout.contains("- //a:__subpackages__"), "{stdout}");
}

#[test]
fn generate_json_names_versioned_packages_after_parent() {
    let tree = sample_tree();
    let output = run_cuerules(&["generate", tree.path().to_str().unwrap(), "--format", "json"]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let dirs = value["directories"].as_array().unwrap();
    let bar = dirs.iter().find(|d| d["rel"] == "bar/v2").unwrap();
    assert_eq!(bar["gen"][0]["name"], "bar");
    assert_eq!(bar["resolves"][0]["imp"], "example.com/repo/bar/v2");
    assert_eq!(value["ancestor_roots"], serde_json::json!(["a", "a/internal", "bar"]));
}

#[test]
fn generate_writes_output_file() {
    let tree = sample_tree();
    let out = tree.path().join("out/rules.yaml");
    let output = run_cuerules(&[
        "generate",
        tree.path().to_str().unwrap(),
        "--output",
        out.to_str().unwrap(),
    ]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    let text = fs::read_to_string(out).unwrap();
    assert!(text.contains("directories:"));
}

#[test]
fn generate_rejects_invalid_prefix() {
    let tree = sample_tree();
    let output = run_cuerules(&["generate", tree.path().to_str().unwrap(), "--prefix", "/abs"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("invalid prefix"), "{stderr}");
}

#[test]
fn generate_missing_root_fails() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope");
    let output = run_cuerules(&["generate", missing.to_str().unwrap()]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("cannot read"));
}

#[test]
fn ambiguous_directory_is_logged_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "x/a.cue", "package a\n");
    write(dir.path(), "x/b.cue", "package b\n");
    let output = run_cuerules(&["generate", dir.path().to_str().unwrap(), "--prefix", "example.com/r"]);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success());
    assert!(stderr.contains("found packages a, b"), "{stderr}");
}

#[test]
fn unparsable_source_is_logged_and_kept() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "broken/broken.cue", "package\n");
    let output = run_cuerules(&["generate", dir.path().to_str().unwrap(), "--prefix", "example.com/r"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "{stderr}");
    assert!(stderr.contains("could not read CUE file header"), "{stderr}");
    assert!(stdout.contains("- broken.cue"), "{stdout}");
    assert!(stdout.contains("name: broken"), "{stdout}");
}

#[test]
fn verbose_run_reports_foreign_directives() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "BUILD.bazel", "# gazelle:prefix example.com/r\n# gazelle:go_naming_convention import\n");
    write(dir.path(), "foo/foo.cue", "package foo\n");
    let quiet = run_cuerules(&["generate", dir.path().to_str().unwrap()]);
    assert!(!String::from_utf8_lossy(&quiet.stderr).contains("ignoring directive"));

    let verbose = run_cuerules(&["-v", "generate", dir.path().to_str().unwrap()]);
    let stderr = String::from_utf8_lossy(&verbose.stderr);
    assert!(verbose.status.success(), "{stderr}");
    assert!(stderr.contains("ignoring directive"), "{stderr}");
    assert!(stderr.contains("go_naming_convention"), "{stderr}");
}

#[test]
fn inspect_prints_file_header() {
    let tree = sample_tree();
    let file = tree.path().join("foo/foo.cue");
    let output = run_cuerules(&["inspect", file.to_str().unwrap()]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("package_name: foo"), "{stdout}");
    assert!(stdout.contains("- example.com/repo/bar"), "{stdout}");
    assert!(stdout.contains("classification: recognized"), "{stdout}");
}

#[test]
fn kinds_lists_registry() {
    let output = run_cuerules(&["kinds", "--format", "json"]);
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert!(value["kinds"]["cue_instance"].is_object());
    assert!(value["kinds"]["cue_module"].is_object());
}

#[test]
fn generate_help_shows_usage() {
    let output = run_cuerules(&["generate", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stdout.contains("--prefix") || stderr.contains("--prefix"));
}
