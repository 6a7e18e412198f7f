//! Static registry of the rule kinds this engine generates.
//!
//! Every rule produced now or in the past must be listed here and be
//! loadable from one of [`loads`], so that the rule merger can match
//! generated rules against existing ones.

use serde::Serialize;

/// Kind of the per-package rule.
pub const INSTANCE_KIND: &str = "cue_instance";

/// Kind of the rule for a `cue.mod/module.cue` module root.
pub const MODULE_KIND: &str = "cue_module";

/// How rules of one kind are matched and when they count as empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KindInfo {
    /// Attributes that identify an existing rule as the same rule.
    pub match_attrs: &'static [&'static str],
    /// A rule with none of these attributes set is empty.
    pub non_empty_attrs: &'static [&'static str],
}

/// A `.bzl` file and the symbols generated rules need from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadInfo {
    /// Label of the `.bzl` file.
    pub name: &'static str,
    /// Symbols loaded from it.
    pub symbols: &'static [&'static str],
}

static KINDS: [(&str, KindInfo); 2] = [
    (MODULE_KIND, KindInfo { match_attrs: &["file"], non_empty_attrs: &["file"] }),
    (
        INSTANCE_KIND,
        KindInfo { match_attrs: &["directory_of", "package_name"], non_empty_attrs: &["srcs"] },
    ),
];

static LOADS: [LoadInfo; 2] = [
    LoadInfo {
        name: "@com_github_yujunz_rules_cue//cue:deps.bzl",
        symbols: &["cue_rules_dependencies", "cue_register_tool"],
    },
    LoadInfo {
        name: "@com_github_yujunz_rules_cue//cue:cue.bzl",
        symbols: &[INSTANCE_KIND, MODULE_KIND],
    },
];

/// All registered kinds, sorted by name.
#[must_use]
pub fn kinds() -> &'static [(&'static str, KindInfo)] {
    &KINDS
}

/// Looks up a registered kind.
#[must_use]
pub fn kind_info(kind: &str) -> Option<&'static KindInfo> {
    KINDS.iter().find(|(name, _)| *name == kind).map(|(_, info)| info)
}

/// Files generated rules are loaded from.
#[must_use]
pub fn loads() -> &'static [LoadInfo] {
    &LOADS
}
