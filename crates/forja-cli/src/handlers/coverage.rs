//! Coverage command handler

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use crate::CoverageArgs;
use forja::{
    CoverageAggregator, FeatureToggleResolver, ForjaError, JacocoCliGenerator,
    PlanReportGenerator, ProjectConfig, ReportFormat, ReportGenerator, ReportOutput,
    ReportRequest,
};

/// Execute the coverage command
pub fn execute_coverage(config: &CliConfig, args: &CoverageArgs) -> CliResult<()> {
    let project = config.load_project()?;
    let resolver = config.resolver(&project);
    let aggregator = build_aggregator(&project, args, &resolver)?;
    let request = aggregator.aggregate()?;

    let mut reporter = ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
    let output = generate(&request, args, &mut reporter)?;

    for skipped in &request.skipped {
        reporter.info(&format!("{skipped}: no coverage data or classes, skipped"));
    }
    reporter.success(&format!(
        "{} coverage for {} module(s) ({} classes): {}",
        output.format,
        request.modules.len(),
        request.classes.len(),
        output.location.display()
    ));
    Ok(())
}

/// Aggregator over the project's modules with the CLI output settings
pub fn build_aggregator(
    project: &ProjectConfig,
    args: &CoverageArgs,
    resolver: &FeatureToggleResolver,
) -> CliResult<CoverageAggregator> {
    let format = args
        .format
        .map_or_else(|| ReportFormat::select(resolver), Into::into);
    Ok(CoverageAggregator::new(project.coverage_inputs())
        .with_exclusions(project.exclusions()?)
        .with_format(format)
        .with_output_dir(&args.output))
}

/// Invoke exactly one generator for the request
fn generate(
    request: &ReportRequest,
    args: &CoverageArgs,
    reporter: &mut ProgressReporter,
) -> CliResult<ReportOutput> {
    let result = match args.jacoco_cli {
        Some(ref jar) if !args.dry_run => {
            let generator = JacocoCliGenerator::new(jar).with_java(&args.java);
            let total = u64::try_from(request.classes.len()).unwrap_or(u64::MAX);
            reporter.start_progress(total, "staging classes");
            let result = generator.generate_with(request, |_| reporter.step());
            let summary = staging_summary(reporter.position(), total);
            reporter.finish();
            if let Some(summary) = summary {
                reporter.info(&summary);
            }
            result
        }
        _ => PlanReportGenerator.generate(request),
    };
    result.map_err(|err| match err {
        ForjaError::ReportGeneration { message } => CliError::report_generation(message),
        other => other.into(),
    })
}

/// Staged-count line, when a progress bar was running
fn staging_summary(staged: Option<u64>, total: u64) -> Option<String> {
    staged.map(|staged| format!("staged {staged} of {total} class file(s)"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    fn args(output: &Path) -> CoverageArgs {
        CoverageArgs {
            output: output.to_path_buf(),
            jacoco_cli: None,
            java: PathBuf::from("java"),
            dry_run: false,
            format: None,
        }
    }

    fn project(root: &Path) -> PathBuf {
        let class = root.join("core/build/classes/java/main/org/core/A.class");
        std::fs::create_dir_all(class.parent().unwrap()).unwrap();
        std::fs::write(&class, b"class").unwrap();
        let exec = root.join("core/build/jacoco/test.exec");
        std::fs::create_dir_all(exec.parent().unwrap()).unwrap();
        std::fs::write(&exec, b"exec").unwrap();
        let path = root.join("forja.yaml");
        std::fs::write(
            &path,
            "modules:\n  - { name: core, dir: core }\n  - { name: docs, dir: docs }\n",
        )
        .unwrap();
        path
    }

    #[test]
    fn test_format_from_ci_property() {
        let project = ProjectConfig::default();
        let resolver = FeatureToggleResolver::with_builtin_flags().with_property("ci", "");
        let aggregator = build_aggregator(&project, &args(Path::new("out")), &resolver).unwrap();
        let request = aggregator.aggregate().unwrap();
        assert_eq!(request.format, ReportFormat::Xml);
    }

    #[test]
    fn test_explicit_format_wins() {
        let project = ProjectConfig::default();
        let resolver = FeatureToggleResolver::with_builtin_flags().with_property("ci", "true");
        let mut args = args(Path::new("out"));
        args.format = Some(crate::ReportFormatArg::Html);
        let request = build_aggregator(&project, &args, &resolver)
            .unwrap()
            .aggregate()
            .unwrap();
        assert_eq!(request.format, ReportFormat::Html);
    }

    #[test]
    fn test_plan_written_without_jacoco() {
        let dir = TempDir::new().unwrap();
        let config = CliConfig::new()
            .with_project(project(dir.path()))
            .with_properties(["ci=false"]);
        let out = dir.path().join("report");
        execute_coverage(&config, &args(&out)).unwrap();

        let plan: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out.join("coverage-plan.json")).unwrap())
                .unwrap();
        assert_eq!(plan["modules"][0], "core");
        assert_eq!(plan["skipped"][0], "docs");
        assert_eq!(plan["format"], "html");
    }

    #[test]
    fn test_dry_run_skips_jacoco() {
        let dir = TempDir::new().unwrap();
        let config = CliConfig::new().with_project(project(dir.path()));
        let out = dir.path().join("report");
        let mut args = args(&out);
        args.jacoco_cli = Some(PathBuf::from("missing.jar"));
        args.dry_run = true;
        execute_coverage(&config, &args).unwrap();
        assert!(out.join("coverage-plan.json").is_file());
    }

    #[test]
    fn test_jacoco_failure_is_report_error() {
        let dir = TempDir::new().unwrap();
        let config = CliConfig::new()
            .with_project(project(dir.path()))
            .with_verbosity(crate::Verbosity::Quiet);
        let mut args = args(&dir.path().join("report"));
        args.jacoco_cli = Some(PathBuf::from("jacococli.jar"));
        args.java = dir.path().join("no-such-java");
        let err = execute_coverage(&config, &args).unwrap_err();
        assert!(matches!(err, CliError::ReportGeneration { .. }));
    }

    #[test]
    fn test_staging_summary() {
        assert_eq!(
            staging_summary(Some(3), 3).as_deref(),
            Some("staged 3 of 3 class file(s)")
        );
        assert_eq!(staging_summary(None, 3), None);
    }

    #[test]
    fn test_classes_staged_before_jacoco_runs() {
        let dir = TempDir::new().unwrap();
        let loaded = ProjectConfig::load(&project(dir.path())).unwrap();
        let mut args = args(&dir.path().join("report"));
        args.jacoco_cli = Some(PathBuf::from("jacococli.jar"));
        args.java = dir.path().join("no-such-java");
        let request = build_aggregator(&loaded, &args, &FeatureToggleResolver::with_builtin_flags())
            .unwrap()
            .aggregate()
            .unwrap();

        let mut reporter = ProgressReporter::new(false, false);
        let err = generate(&request, &args, &mut reporter).unwrap_err();
        assert!(matches!(err, CliError::ReportGeneration { .. }));
        assert_eq!(reporter.position(), None);
    }
}
