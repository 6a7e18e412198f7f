//! Slash-separated path helpers for workspace-relative package paths.
//!
//! Package paths (`rel`) are always `/`-separated and relative to the
//! repository root, with `""` meaning the root itself. These helpers work on
//! path *components*, so `"foo"` is not a prefix of `"foobar"`.

/// Returns `true` if `prefix` is `""`, equal to `p`, or a leading run of
/// whole components of `p`.
#[must_use]
pub fn has_prefix(p: &str, prefix: &str) -> bool {
    prefix.is_empty() || p == prefix || p.strip_prefix(prefix).is_some_and(|r| r.starts_with('/'))
}

/// Removes the component prefix `prefix` from `p`.
///
/// Returns `p` unchanged when `prefix` is not a component prefix of it.
#[must_use]
pub fn trim_prefix<'a>(p: &'a str, prefix: &str) -> &'a str {
    if prefix.is_empty() {
        return p;
    }
    if p == prefix {
        return "";
    }
    match p.strip_prefix(prefix).and_then(|r| r.strip_prefix('/')) {
        Some(rest) => rest,
        None => p,
    }
}

/// Returns the byte offset of the first component of `p` equal to `sub`.
#[must_use]
pub fn index(p: &str, sub: &str) -> Option<usize> {
    let mut offset = 0;
    for component in p.split('/') {
        if component == sub {
            return Some(offset);
        }
        offset += component.len() + 1;
    }
    None
}

/// Joins two slash paths, skipping empty sides.
#[must_use]
pub fn join(a: &str, b: &str) -> String {
    match (a.is_empty(), b.is_empty()) {
        (true, _) => b.to_string(),
        (_, true) => a.to_string(),
        _ => format!("{}/{}", a.trim_end_matches('/'), b),
    }
}

/// Returns the last component of `p`, or `""` for the root.
#[must_use]
pub fn base(p: &str) -> &str {
    p.trim_end_matches('/').rsplit('/').next().unwrap_or("")
}

/// Returns a base name for the package at `rel`.
///
/// Falls back to the base of `prefix` for the repository root, then to
/// `"root"` when neither yields a name.
#[must_use]
pub fn rel_base_name(rel: &str, prefix: &str) -> String {
    [base(rel), base(prefix)]
        .into_iter()
        .find(|b| !b.is_empty() && *b != ".")
        .unwrap_or("root")
        .to_string()
}
