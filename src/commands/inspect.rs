//! `cuerules inspect` command.

use std::path::Path;

use serde::Serialize;

use crate::cli::Format;
use crate::context::ServiceContext;
use crate::fileinfo::{self, Classification, SourceFile};

#[derive(Serialize)]
struct Report {
    #[serde(flatten)]
    file: SourceFile,
    classification: Classification,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Execute the `inspect` command.
///
/// # Errors
///
/// Returns an error string if the report cannot be rendered.
pub fn run(ctx: &ServiceContext, file: &Path, format: Format) -> Result<(), String> {
    print!("{}", super::render(&inspect(ctx, file), format)?);
    Ok(())
}

fn inspect(ctx: &ServiceContext, path: &Path) -> Report {
    let mut file = fileinfo::file_name_info(path);
    let classification = file.classification();
    let mut error = None;
    if classification == Classification::Recognized {
        match fileinfo::extract_metadata(ctx.fs.as_ref(), path) {
            Ok(header) => {
                file.package_name = header.package;
                file.imports = header.imports;
            }
            Err(err) => error = Some(err.to_string()),
        }
    }
    Report { file, classification, error }
}
