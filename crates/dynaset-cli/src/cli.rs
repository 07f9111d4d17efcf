//! CLI argument definitions for the dynaset front end.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use dynaset_cli::session::{Assignment, Selection};

#[derive(Parser)]
#[command(
    name = "dynaset",
    version,
    about = "Browse and edit SQLite tables through a dynaset form",
    long_about = "Browse and edit SQLite tables through a dynaset form.\n\n\
                  The form (TOML) declares the dynasets, their queries and how child\n\
                  dynasets link to their parents. Root dynasets are loaded on start;\n\
                  children follow the selected parent row."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// SQLite database file.
    #[arg(long, value_name = "PATH")]
    pub db: PathBuf,

    /// Form definition (TOML).
    #[arg(long, value_name = "PATH")]
    pub form: PathBuf,

    /// Select a row before running the command; repeat for nested dynasets,
    /// parents first.
    #[arg(long = "select", value_name = "NAME=ROW")]
    pub select: Vec<Selection>,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print every dynaset, or a single one, with its rows.
    Show(ShowArgs),

    /// Change cells of an existing row and save.
    Edit(EditArgs),

    /// Add a row and save; prints the generated id.
    Insert(InsertArgs),

    /// Delete a row and save.
    Delete(DeleteArgs),
}

#[derive(Parser)]
pub struct ShowArgs {
    /// Dynaset to print (default: all).
    #[arg(value_name = "NAME")]
    pub name: Option<String>,
}

#[derive(Parser)]
pub struct EditArgs {
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Row index (zero-based) within the loaded rows.
    #[arg(long)]
    pub row: usize,

    /// Cell assignment, repeatable.
    #[arg(long = "set", value_name = "COLUMN=VALUE", required = true)]
    pub set: Vec<Assignment>,
}

#[derive(Parser)]
pub struct InsertArgs {
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Cell assignment, repeatable. Unset columns keep their defaults.
    #[arg(long = "set", value_name = "COLUMN=VALUE")]
    pub set: Vec<Assignment>,
}

#[derive(Parser)]
pub struct DeleteArgs {
    #[arg(value_name = "NAME")]
    pub name: String,

    /// Row index (zero-based) within the loaded rows.
    #[arg(long)]
    pub row: usize,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
