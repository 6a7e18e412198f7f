//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Top-level CLI parser for `cuerules`.
#[derive(Debug, Parser)]
#[command(name = "cuerules", version, about = "Generate Bazel rules for CUE sources")]
pub struct Cli {
    /// Show debug logs on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// The command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported top-level subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Walk a source tree and print the rules for every directory.
    Generate(GenerateOpts),
    /// Classify one file and print its package and imports.
    Inspect {
        /// File to inspect.
        file: PathBuf,
        /// Output format.
        #[arg(long, value_enum, default_value_t = Format::Yaml)]
        format: Format,
    },
    /// Print the rule kinds and the files they are loaded from.
    Kinds {
        /// Output format.
        #[arg(long, value_enum, default_value_t = Format::Yaml)]
        format: Format,
    },
}

/// Options of `cuerules generate`.
#[derive(Debug, Args)]
pub struct GenerateOpts {
    /// Repository root.
    #[arg(default_value = ".")]
    pub root: PathBuf,
    /// Import path prefix of the repository root.
    #[arg(long)]
    pub prefix: Option<String>,
    /// Settings file [default: ROOT/cuerules.yaml, if present].
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Yaml)]
    pub format: Format,
    /// Write the output to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Serialisation format of command output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// YAML.
    #[default]
    Yaml,
    /// Pretty-printed JSON.
    Json,
}
