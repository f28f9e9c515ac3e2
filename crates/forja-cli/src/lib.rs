//! Forjador: command-line interface for Forja
//!
//! Runs the project-wide build steps described by a `forja.yaml`.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Error types are self-documenting

mod commands;
mod config;
mod error;
pub mod handlers;
mod logging;
mod output;

pub use commands::{
    ArchiveArgs, Cli, ColorArg, Commands, CoverageArgs, FlagsArgs, FormatArg, ModulesArgs,
    NoticeArgs, ReportFormatArg,
};
pub use config::{CliConfig, ColorChoice, Verbosity};
pub use error::{CliError, CliResult};
pub use logging::init_logging;
pub use output::{OutputFormat, ProgressReporter};
