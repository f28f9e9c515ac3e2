//! Flags command handler

use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::OutputFormat;
use crate::FlagsArgs;
use forja::{FlagSource, ProjectConfig, Resolution};
use std::fmt::Write as _;
use tracing::debug;

/// Execute the flags command
pub fn execute_flags(config: &CliConfig, args: &FlagsArgs) -> CliResult<()> {
    // Built-in flags resolve without a project file
    let project = if config.project.exists() {
        config.load_project()?
    } else {
        debug!(path = %config.project.display(), "no project file, using built-in flags");
        ProjectConfig::default()
    };
    let resolutions = config.resolver(&project).resolve_all();
    print!("{}", render_flags(&resolutions, args.format.into())?);
    Ok(())
}

/// Render flag resolutions
pub fn render_flags(resolutions: &[Resolution], format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(resolutions)? + "\n"),
        OutputFormat::Yaml => Ok(serde_yaml_ng::to_string(resolutions)?),
        OutputFormat::Text => {
            let width = resolutions.iter().map(|r| r.name.len()).max().unwrap_or(0);
            let mut out = String::new();
            for resolution in resolutions {
                let _ = writeln!(
                    out,
                    "{:width$}  {:5}  {}",
                    resolution.name,
                    resolution.value,
                    describe(&resolution.source)
                );
            }
            Ok(out)
        }
    }
}

fn describe(source: &FlagSource) -> String {
    match source {
        FlagSource::Property(name) => format!("property {name}"),
        FlagSource::Environment(var) => format!("env {var}"),
        FlagSource::Default => "default".to_string(),
    }
}
