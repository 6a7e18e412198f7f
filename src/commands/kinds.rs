//! `cuerules kinds` command.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::cli::Format;
use crate::kinds::{self, KindInfo, LoadInfo};

#[derive(Serialize)]
struct Registry {
    kinds: BTreeMap<&'static str, KindInfo>,
    loads: &'static [LoadInfo],
}

/// Execute the `kinds` command.
///
/// # Errors
///
/// Returns an error string if the registry cannot be rendered.
pub fn run(format: Format) -> Result<(), String> {
    print!("{}", super::render(&registry(), format)?);
    Ok(())
}

fn registry() -> Registry {
    Registry { kinds: kinds::kinds().iter().copied().collect(), loads: kinds::loads() }
}
