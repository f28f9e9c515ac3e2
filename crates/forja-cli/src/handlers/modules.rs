//! Modules command handler

use crate::config::CliConfig;
use crate::error::CliResult;
use crate::output::OutputFormat;
use crate::ModulesArgs;
use forja::{Module, Provenance};
use std::fmt::Write as _;

/// Execute the modules command
pub fn execute_modules(config: &CliConfig, args: &ModulesArgs) -> CliResult<()> {
    let project = config.load_project()?;
    let registry = project.configured_registry()?;
    print!("{}", render_modules(registry.all_modules(), args.format.into())?);
    Ok(())
}

/// Render modules with their plugins and effective configuration
pub fn render_modules(modules: &[Module], format: OutputFormat) -> CliResult<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(modules)? + "\n"),
        OutputFormat::Yaml => Ok(serde_yaml_ng::to_string(modules)?),
        OutputFormat::Text => Ok(render_text(modules)),
    }
}

fn render_text(modules: &[Module]) -> String {
    let mut out = String::new();
    for module in modules {
        let _ = writeln!(out, "{} ({})", module.name(), module.dir().display());
        let plugins: Vec<&str> = module.plugins().iter().collect();
        let _ = writeln!(out, "  plugins: {}", plugins.join(", "));
        for (key, value) in module.effective() {
            let source = match value.provenance {
                Provenance::Override => "override",
                Provenance::Propagated => "propagated",
            };
            let _ = writeln!(out, "  {key} = {} ({source})", value.value);
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use forja::{ConfigurationPropagator, PolicyBundle, ToolchainCatalog};

    fn configured() -> Vec<Module> {
        let propagator = ConfigurationPropagator::new(
            PolicyBundle::new().with_group("org.example"),
            &ToolchainCatalog::builtin(),
        )
        .unwrap();
        let mut core = Module::new("core", "src/core")
            .with_plugins(["java"])
            .with_override("encoding", "ISO-8859-1");
        let _ = propagator.propagate(&mut core);
        vec![core]
    }

    #[test]
    fn test_text_listing() {
        let text = render_modules(&configured(), OutputFormat::Text).unwrap();
        assert!(text.starts_with("core (src/core)\n"));
        assert!(text.contains("  plugins: checkstyle, java, signing, spotbugs\n"));
        assert!(text.contains("  encoding = ISO-8859-1 (override)\n"));
        assert!(text.contains("  group = org.example (propagated)\n"));
    }

    #[test]
    fn test_json_listing() {
        let json = render_modules(&configured(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value[0]["name"], "core");
        assert_eq!(value[0]["effective"]["encoding"]["provenance"], "override");
    }

    #[test]
    fn test_yaml_listing() {
        let yaml = render_modules(&configured(), OutputFormat::Yaml).unwrap();
        assert!(yaml.contains("name: core"));
    }
}
