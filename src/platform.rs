//! Platform-partitioned string sets.
//!
//! Bazel puts two constraints on attribute lists that may vary by platform:
//! a value must not appear in more than one `select` branch, and it must not
//! be duplicated within a branch. [`PlatformStringsBuilder`] records each
//! value under exactly one [`Partition`] so that the built
//! [`PlatformStrings`] always satisfies both.
//!
//! When a value is added a second time, the first partition wins and the
//! later insertion is ignored.

use std::collections::BTreeMap;
use std::fmt;

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

/// An (OS, architecture) pair.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Platform {
    /// Operating system name, e.g. `linux`.
    pub os: String,
    /// Architecture name, e.g. `amd64`.
    pub arch: String,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.os, self.arch)
    }
}

/// The branch a value is recorded under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Partition {
    /// Applies on every platform.
    Generic,
    /// Applies only on the named OS.
    Os(String),
    /// Applies only on the named architecture.
    Arch(String),
    /// Applies only on one OS/architecture pair.
    Platform(Platform),
}

/// Accumulates strings into platform partitions.
#[derive(Debug, Clone, Default)]
pub struct PlatformStringsBuilder {
    strs: BTreeMap<String, Partition>,
}

impl PlatformStringsBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `value` as applying on every platform.
    ///
    /// Returns `false` if the value was already recorded (under any
    /// partition); the existing entry is kept.
    pub fn add_generic(&mut self, value: impl Into<String>) -> bool {
        self.add(value, Partition::Generic)
    }

    /// Records `value` under `partition` unless it is already present.
    pub fn add(&mut self, value: impl Into<String>, partition: Partition) -> bool {
        let value = value.into();
        if self.strs.contains_key(&value) {
            return false;
        }
        self.strs.insert(value, partition);
        true
    }

    /// Returns `true` if no values have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.strs.is_empty()
    }

    /// Returns `true` if any recorded value ends with `suffix`.
    #[must_use]
    pub fn contains_suffix(&self, suffix: &str) -> bool {
        self.strs.keys().any(|s| s.ends_with(suffix))
    }

    /// All values regardless of partition, sorted.
    #[must_use]
    pub fn build_flat(&self) -> Vec<String> {
        self.strs.keys().cloned().collect()
    }

    /// Builds the partitioned structure. Every list is sorted.
    #[must_use]
    pub fn build(&self) -> PlatformStrings {
        let mut ps = PlatformStrings::default();
        // BTreeMap iteration is ordered, so each list comes out sorted.
        for (s, partition) in &self.strs {
            match partition {
                Partition::Generic => ps.generic.push(s.clone()),
                Partition::Os(os) => ps.os.entry(os.clone()).or_default().push(s.clone()),
                Partition::Arch(arch) => ps.arch.entry(arch.clone()).or_default().push(s.clone()),
                Partition::Platform(p) => ps.platform.entry(p.clone()).or_default().push(s.clone()),
            }
        }
        ps
    }
}

/// Strings split by the platform they apply to.
///
/// All four partitions are always serialised, even when empty, so the
/// shape of the output does not depend on the input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlatformStrings {
    /// Values that apply everywhere.
    pub generic: Vec<String>,
    /// Values keyed by OS.
    pub os: BTreeMap<String, Vec<String>>,
    /// Values keyed by architecture.
    pub arch: BTreeMap<String, Vec<String>>,
    /// Values keyed by OS/architecture pair.
    #[serde(serialize_with = "serialize_platforms")]
    pub platform: BTreeMap<Platform, Vec<String>>,
}

impl PlatformStrings {
    /// Returns `true` if every partition is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.generic.is_empty()
            && self.os.is_empty()
            && self.arch.is_empty()
            && self.platform.is_empty()
    }

    /// Iterates every value in every partition.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.generic
            .iter()
            .chain(self.os.values().flatten())
            .chain(self.arch.values().flatten())
            .chain(self.platform.values().flatten())
            .map(String::as_str)
    }
}

fn serialize_platforms<S: Serializer>(
    platforms: &BTreeMap<Platform, Vec<String>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut map = serializer.serialize_map(Some(platforms.len()))?;
    for (platform, values) in platforms {
        map.serialize_entry(&platform.to_string(), values)?;
    }
    map.end()
}
