//! CLI command definitions using clap

use clap::{Parser, Subcommand, ValueEnum};
use forja::PROJECT_FILE;
use std::path::PathBuf;

/// Forjador: CLI for Forja - multi-module build orchestration
#[derive(Parser, Debug)]
#[command(name = "forjador")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorArg,

    /// Build property, `key` or `key=value` (repeatable)
    #[arg(short = 'P', long = "property", value_name = "KEY[=VALUE]", global = true)]
    pub properties: Vec<String>,

    /// Project file
    #[arg(long, default_value = PROJECT_FILE, global = true)]
    pub project: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List modules with their effective configuration
    Modules(ModulesArgs),

    /// Aggregate coverage of all modules into one report
    Coverage(CoverageArgs),

    /// Build a reproducible archive
    Archive(ArchiveArgs),

    /// Print the copyright end year of a notice file
    Notice(NoticeArgs),

    /// Show resolved feature flags
    Flags(FlagsArgs),
}

/// Arguments for the modules command
#[derive(Parser, Debug)]
pub struct ModulesArgs {
    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: FormatArg,
}

/// Arguments for the coverage command
#[derive(Parser, Debug)]
pub struct CoverageArgs {
    /// Report output directory
    #[arg(short, long, default_value = "build/reports/jacoco")]
    pub output: PathBuf,

    /// Path to jacococli.jar; without it only the plan is written
    #[arg(long, value_name = "JAR")]
    pub jacoco_cli: Option<PathBuf>,

    /// Java executable used to run the JaCoCo CLI
    #[arg(long, default_value = "java")]
    pub java: PathBuf,

    /// Write the plan JSON even when a JaCoCo CLI is given
    #[arg(long)]
    pub dry_run: bool,

    /// Report format (default: xml under CI, html otherwise)
    #[arg(long, value_enum)]
    pub format: Option<ReportFormatArg>,
}

/// Arguments for the archive command
#[derive(Parser, Debug)]
pub struct ArchiveArgs {
    /// Archive description (YAML)
    pub spec: PathBuf,

    /// Output file (default: spec name with .tar or .tar.gz)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Gzip the tar stream
    #[arg(long)]
    pub gzip: bool,

    /// Write a .sha256 sidecar next to the archive
    #[arg(long)]
    pub sign: bool,

    /// Producing module; with --sign, only publishing modules are signed
    #[arg(long)]
    pub module: Option<String>,
}

/// Arguments for the notice command
#[derive(Parser, Debug)]
pub struct NoticeArgs {
    /// Notice file (default: the project's `notice`)
    pub file: Option<PathBuf>,
}

/// Arguments for the flags command
#[derive(Parser, Debug)]
pub struct FlagsArgs {
    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: FormatArg,
}

/// Listing format argument
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FormatArg {
    /// Human-readable text
    #[default]
    Text,
    /// JSON
    Json,
    /// YAML
    Yaml,
}

impl From<FormatArg> for crate::output::OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => Self::Text,
            FormatArg::Json => Self::Json,
            FormatArg::Yaml => Self::Yaml,
        }
    }
}

/// Coverage report format argument
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReportFormatArg {
    /// HTML report
    Html,
    /// XML report
    Xml,
}

impl From<ReportFormatArg> for forja::ReportFormat {
    fn from(arg: ReportFormatArg) -> Self {
        match arg {
            ReportFormatArg::Html => Self::Html,
            ReportFormatArg::Xml => Self::Xml,
        }
    }
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;

    mod cli_tests {
        use super::*;

        #[test]
        fn test_parse_modules_command() {
            let cli = Cli::parse_from(["forjador", "modules"]);
            assert!(matches!(cli.command, Commands::Modules(_)));
            assert_eq!(cli.project, PathBuf::from("forja.yaml"));
        }

        #[test]
        fn test_global_flags_after_subcommand() {
            let cli = Cli::parse_from([
                "forjador", "flags", "-P", "ci", "--property", "enableSpotBugs=false", "-vv",
                "--project", "build/forja.yaml",
            ]);
            assert_eq!(cli.properties, vec!["ci", "enableSpotBugs=false"]);
            assert_eq!(cli.verbose, 2);
            assert_eq!(cli.project, PathBuf::from("build/forja.yaml"));
        }

        #[test]
        fn test_parse_coverage_defaults() {
            let cli = Cli::parse_from(["forjador", "coverage"]);
            if let Commands::Coverage(args) = cli.command {
                assert_eq!(args.output, PathBuf::from("build/reports/jacoco"));
                assert!(args.jacoco_cli.is_none());
                assert!(!args.dry_run);
                assert!(args.format.is_none());
            } else {
                panic!("expected Coverage command");
            }
        }

        #[test]
        fn test_parse_coverage_with_jacoco() {
            let cli = Cli::parse_from([
                "forjador",
                "coverage",
                "--jacoco-cli",
                "lib/jacococli.jar",
                "--format",
                "xml",
            ]);
            if let Commands::Coverage(args) = cli.command {
                assert_eq!(args.jacoco_cli, Some(PathBuf::from("lib/jacococli.jar")));
                assert_eq!(args.format, Some(ReportFormatArg::Xml));
            } else {
                panic!("expected Coverage command");
            }
        }

        #[test]
        fn test_parse_archive() {
            let cli = Cli::parse_from(["forjador", "archive", "dist.yaml", "--gzip", "--sign"]);
            if let Commands::Archive(args) = cli.command {
                assert_eq!(args.spec, PathBuf::from("dist.yaml"));
                assert!(args.gzip);
                assert!(args.sign);
                assert!(args.output.is_none());
                assert!(args.module.is_none());
            } else {
                panic!("expected Archive command");
            }
        }

        #[test]
        fn test_parse_notice_without_file() {
            let cli = Cli::parse_from(["forjador", "notice"]);
            assert!(matches!(cli.command, Commands::Notice(NoticeArgs { file: None })));
        }

        #[test]
        fn test_subcommand_required() {
            assert!(Cli::try_parse_from(["forjador"]).is_err());
        }
    }

    mod conversion_tests {
        use super::*;
        use crate::config::ColorChoice;
        use crate::output::OutputFormat;

        #[test]
        fn test_color_conversion() {
            assert_eq!(ColorChoice::from(ColorArg::Never), ColorChoice::Never);
            assert_eq!(ColorChoice::from(ColorArg::Always), ColorChoice::Always);
        }

        #[test]
        fn test_format_conversion() {
            assert_eq!(OutputFormat::from(FormatArg::Json), OutputFormat::Json);
            assert_eq!(
                forja::ReportFormat::from(ReportFormatArg::Xml),
                forja::ReportFormat::Xml
            );
        }
    }
}
