//! Rule naming conventions.

use std::fmt;
use std::str::FromStr;

/// Policy for naming generated `cue_instance` rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NamingConvention {
    /// No convention configured; behaves like [`NamingConvention::Import`].
    #[default]
    Unspecified,
    /// Name the rule after the last meaningful import path segment.
    Import,
}

/// An unrecognised naming convention token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown naming convention: {0:?}")]
pub struct UnknownNamingConvention(pub String);

impl FromStr for NamingConvention {
    type Err = UnknownNamingConvention;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "unspecified" => Ok(Self::Unspecified),
            "import" => Ok(Self::Import),
            other => Err(UnknownNamingConvention(other.to_string())),
        }
    }
}

impl fmt::Display for NamingConvention {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unspecified => f.write_str("unspecified"),
            Self::Import => f.write_str("import"),
        }
    }
}

impl NamingConvention {
    /// Computes the rule name for a package.
    #[must_use]
    pub fn instance_name(self, import_path: &str, pkg_name: &str) -> String {
        match self {
            Self::Unspecified | Self::Import => import_name(import_path, pkg_name),
        }
    }
}

fn import_name(import_path: &str, pkg_name: &str) -> String {
    let mut segments = import_path.split('/').filter(|s| !s.is_empty()).rev();
    let mut segment = segments.next().unwrap_or("");
    if is_major_version(segment) {
        if let Some(parent) = segments.next() {
            segment = parent;
        }
    }
    let name: String = segment
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if name.is_empty() {
        pkg_name.to_string()
    } else {
        name
    }
}

/// `v` followed only by digits, e.g. `v2`.
fn is_major_version(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}
