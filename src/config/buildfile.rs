//! Reads the annotations the engine cares about from an existing build file.
//!
//! Two things are extracted: `# gazelle:<key> <value>` directive comments
//! and the string arguments of top-level calls. The calls drive the
//! `cue_prefix(...)` and `gazelle(prefix = ...)` prefix fallbacks, the
//! `package(default_visibility = ...)` check, generated outputs, and the
//! names of existing rules. Everything else in the file is skipped.

use std::path::{Path, PathBuf};

use crate::ports::filesystem::FileSystem;

/// Build file names, in lookup order.
pub const BUILD_FILE_NAMES: &[&str] = &["BUILD.bazel", "BUILD"];

/// A `# gazelle:key value` comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Directive name.
    pub key: String,
    /// Everything after the name, trimmed.
    pub value: String,
}

/// One argument of a top-level call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallArg {
    /// Keyword, or `None` for positional arguments.
    pub key: Option<String>,
    /// Unquoted value if the argument is a plain string literal.
    pub string: Option<String>,
    /// Unquoted values if the argument is a list of string literals.
    pub list: Option<Vec<String>>,
}

/// A top-level call such as `cue_prefix("x")` or `package(...)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    /// Called function or rule kind.
    pub name: String,
    /// Arguments in order.
    pub args: Vec<CallArg>,
}

impl Call {
    /// String value of keyword argument `key`.
    #[must_use]
    pub fn kwarg_string(&self, key: &str) -> Option<&str> {
        self.args.iter().find(|a| a.key.as_deref() == Some(key)).and_then(|a| a.string.as_deref())
    }

    /// String list value of keyword argument `key`.
    #[must_use]
    pub fn kwarg_strings(&self, key: &str) -> Option<&[String]> {
        self.args.iter().find(|a| a.key.as_deref() == Some(key)).and_then(|a| a.list.as_deref())
    }

    /// Returns `true` if keyword argument `key` is present.
    #[must_use]
    pub fn has_kwarg(&self, key: &str) -> bool {
        self.args.iter().any(|a| a.key.as_deref() == Some(key))
    }
}

/// The parts of an existing build file the engine reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildFile {
    /// Path of the file.
    pub path: PathBuf,
    /// Directives in file order.
    pub directives: Vec<Directive>,
    /// Top-level calls in file order.
    pub calls: Vec<Call>,
}

impl BuildFile {
    /// Parses build file `content`.
    #[must_use]
    pub fn parse(path: impl Into<PathBuf>, content: &str) -> Self {
        Self { path: path.into(), directives: parse_directives(content), calls: parse_calls(content) }
    }

    /// Finds and parses the build file among `files` in `dir`.
    ///
    /// Read failures are logged and treated as no build file.
    #[must_use]
    pub fn load(fs: &dyn FileSystem, dir: &Path, files: &[String]) -> Option<Self> {
        let name = BUILD_FILE_NAMES.iter().find(|n| files.iter().any(|f| f == *n))?;
        let path = dir.join(name);
        match fs.read_to_string(&path) {
            Ok(content) => Some(Self::parse(path, &content)),
            Err(err) => {
                tracing::warn!(path = %path.display(), %err, "could not read build file");
                None
            }
        }
    }

    /// Returns `true` if the file declares `package(default_visibility = ...)`.
    #[must_use]
    pub fn has_default_visibility(&self) -> bool {
        self.calls.iter().any(|c| c.name == "package" && c.has_kwarg("default_visibility"))
    }

    /// Files declared as outputs (`out`, `outs`) of rules in this file,
    /// sorted.
    #[must_use]
    pub fn gen_files(&self) -> Vec<String> {
        let mut files: Vec<String> = self
            .calls
            .iter()
            .flat_map(|c| {
                let out = c.kwarg_string("out").map(str::to_string);
                let outs = c.kwarg_strings("outs").unwrap_or_default().iter().cloned();
                out.into_iter().chain(outs)
            })
            .collect();
        files.sort();
        files.dedup();
        files
    }

    /// Top-level calls of the given kind.
    pub fn calls_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Call> + 'a {
        self.calls.iter().filter(move |c| c.name == name)
    }
}

fn parse_directives(content: &str) -> Vec<Directive> {
    content
        .lines()
        .filter_map(|line| {
            let rest = line.trim().strip_prefix('#')?.trim_start().strip_prefix("gazelle:")?;
            let (key, value) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
            if key.is_empty() || !key.chars().all(|c| c.is_alphanumeric() || c == '_') {
                return None;
            }
            Some(Directive { key: key.to_string(), value: value.trim().to_string() })
        })
        .collect()
}

fn parse_calls(content: &str) -> Vec<Call> {
    let chars: Vec<char> = content.chars().collect();
    let mut calls = Vec::new();
    let mut i = 0;
    let mut line_start = true;
    let mut depth = 0usize;
    while i < chars.len() {
        let c = chars[i];
        if c == '#' {
            i = skip_comment(&chars, i);
        } else if c == '"' || c == '\'' {
            i = skip_string(&chars, i).0;
            line_start = false;
        } else if matches!(c, '(' | '[' | '{') {
            depth += 1;
            line_start = false;
            i += 1;
        } else if matches!(c, ')' | ']' | '}') {
            depth = depth.saturating_sub(1);
            line_start = false;
            i += 1;
        } else if depth == 0 && line_start && (c.is_alphabetic() || c == '_') {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '.') {
                i += 1;
            }
            let name: String = chars[start..i].iter().collect();
            while i < chars.len() && matches!(chars[i], ' ' | '\t') {
                i += 1;
            }
            if i < chars.len() && chars[i] == '(' {
                let (args, end) = parse_args(&chars, i + 1);
                calls.push(Call { name, args });
                i = end;
            }
            line_start = false;
        } else {
            line_start = c == '\n' || (line_start && c.is_whitespace());
            i += 1;
        }
    }
    calls
}

/// Parses call arguments starting just after `(`; returns them and the
/// index just past the matching `)`.
fn parse_args(chars: &[char], mut i: usize) -> (Vec<CallArg>, usize) {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut strings = Vec::new();
    let mut depth = 0usize;
    while i < chars.len() {
        let c = chars[i];
        match c {
            '#' => {
                i = skip_comment(chars, i);
                continue;
            }
            '"' | '\'' => {
                let (end, value) = skip_string(chars, i);
                strings.push(value);
                current.push('"');
                i = end;
                continue;
            }
            '(' | '[' | '{' => depth += 1,
            ')' | ']' | '}' if depth > 0 => depth -= 1,
            ')' => {
                push_arg(&mut args, &current, &mut strings);
                return (args, i + 1);
            }
            ',' if depth == 0 => {
                push_arg(&mut args, &current, &mut strings);
                current.clear();
                i += 1;
                continue;
            }
            _ => {}
        }
        current.push(c);
        i += 1;
    }
    push_arg(&mut args, &current, &mut strings);
    (args, i)
}

fn push_arg(args: &mut Vec<CallArg>, text: &str, strings: &mut Vec<String>) {
    let text = text.trim();
    if text.is_empty() {
        strings.clear();
        return;
    }
    let (key, value) = match text.split_once('=') {
        Some((k, v)) if k.trim().chars().all(|c| c.is_alphanumeric() || c == '_') => {
            (Some(k.trim().to_string()), v.trim())
        }
        _ => (None, text),
    };
    // Each string literal collapses to a single `"` placeholder.
    let string = if value == "\"" && strings.len() == 1 { strings.first().cloned() } else { None };
    let list = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .map(|inner| inner.split(',').map(str::trim).filter(|e| !e.is_empty()).collect::<Vec<_>>())
        .filter(|elems| elems.len() == strings.len() && elems.iter().all(|e| *e == "\""))
        .map(|_| std::mem::take(strings));
    strings.clear();
    args.push(CallArg { key, string, list });
}

fn skip_comment(chars: &[char], mut i: usize) -> usize {
    while i < chars.len() && chars[i] != '\n' {
        i += 1;
    }
    i
}

/// Skips a quoted string starting at `i`; returns the index past it and
/// its unescaped contents.
fn skip_string(chars: &[char], mut i: usize) -> (usize, String) {
    let quote = chars[i];
    let mut value = String::new();
    i += 1;
    while i < chars.len() {
        match chars[i] {
            '\\' if i + 1 < chars.len() => {
                value.push(chars[i + 1]);
                i += 2;
            }
            c if c == quote => return (i + 1, value),
            '\n' => return (i, value),
            c => {
                value.push(c);
                i += 1;
            }
        }
    }
    (i, value)
}
