//! Forjador: build orchestration for multi-module projects
//!
//! ## Usage
//!
//! ```bash
//! forjador modules                         # Effective configuration per module
//! forjador coverage --jacoco-cli cli.jar   # One report across all modules
//! forjador archive dist.yaml --gzip --sign # Reproducible archive + checksum
//! forjador notice                          # Copyright end year
//! forjador -P ci flags                     # Resolved feature flags
//! ```

use clap::Parser;
use forjador::{
    handlers::{execute_archive, execute_coverage, execute_flags, execute_modules, execute_notice},
    init_logging, Cli, CliConfig, CliResult, ColorChoice, Commands, Verbosity,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let config = build_config(&cli);
    init_logging(config.verbosity, config.color);

    match cli.command {
        Commands::Modules(ref args) => execute_modules(&config, args),
        Commands::Coverage(ref args) => execute_coverage(&config, args),
        Commands::Archive(ref args) => execute_archive(&config, args),
        Commands::Notice(ref args) => execute_notice(&config, args),
        Commands::Flags(ref args) => execute_flags(&config, args),
    }
}

fn build_config(cli: &Cli) -> CliConfig {
    let color: ColorChoice = cli.color.clone().into();
    CliConfig::new()
        .with_verbosity(Verbosity::from_flags(cli.quiet, cli.verbose))
        .with_color(color)
        .with_project(&cli.project)
        .with_properties(&cli.properties)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_build_config() {
        let cli = Cli::parse_from([
            "forjador", "-q", "--color", "never", "-P", "ci", "--project", "x.yaml", "flags",
        ]);
        let config = build_config(&cli);
        assert_eq!(config.verbosity, Verbosity::Quiet);
        assert_eq!(config.color, ColorChoice::Never);
        assert_eq!(config.project, PathBuf::from("x.yaml"));
        assert_eq!(config.properties, vec!["ci"]);
    }
}
