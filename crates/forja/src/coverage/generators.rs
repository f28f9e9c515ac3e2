//! Built-in report generators.

use super::artifacts::ClassArtifact;
use super::report::{ReportFormat, ReportGenerator, ReportOutput, ReportRequest};
use crate::result::{ForjaError, ForjaResult};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::info;

/// File written by [`PlanReportGenerator`]
pub const PLAN_FILE_NAME: &str = "coverage-plan.json";

/// Writes the report request as JSON instead of rendering a report
///
/// Used for dry runs and for handing the merged inputs to another tool.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanReportGenerator;

impl ReportGenerator for PlanReportGenerator {
    fn generate(&self, request: &ReportRequest) -> ForjaResult<ReportOutput> {
        std::fs::create_dir_all(&request.output_dir)?;
        let location = request.output_dir.join(PLAN_FILE_NAME);
        let json = serde_json::to_string_pretty(request)?;
        std::fs::write(&location, json)?;
        info!(path = %location.display(), "wrote coverage plan");
        Ok(ReportOutput {
            format: request.format,
            location,
        })
    }
}

/// Runs the JaCoCo command-line interface
///
/// Merged classes are staged into `<output>/classes` first, since the CLI
/// takes class directories and cannot exclude single files.
#[derive(Debug, Clone)]
pub struct JacocoCliGenerator {
    java: PathBuf,
    cli_jar: PathBuf,
}

impl JacocoCliGenerator {
    /// Use `java` from `PATH` with the given `jacococli.jar`
    #[must_use]
    pub fn new(cli_jar: impl Into<PathBuf>) -> Self {
        Self {
            java: PathBuf::from("java"),
            cli_jar: cli_jar.into(),
        }
    }

    /// Use a specific java executable
    #[must_use]
    pub fn with_java(mut self, java: impl Into<PathBuf>) -> Self {
        self.java = java.into();
        self
    }

    /// Directory the merged classes are staged into
    #[must_use]
    pub fn staging_dir(request: &ReportRequest) -> PathBuf {
        request.output_dir.join("classes")
    }

    /// Report location for a request
    #[must_use]
    pub fn report_location(request: &ReportRequest) -> PathBuf {
        match request.format {
            ReportFormat::Html => request.output_dir.join("html"),
            ReportFormat::Xml => request.output_dir.join("jacoco.xml"),
        }
    }

    /// Arguments passed to `java`
    #[must_use]
    pub fn arguments(&self, request: &ReportRequest, staged: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-jar".into(),
            self.cli_jar.clone().into(),
            "report".into(),
        ];
        args.extend(request.execution_data.iter().map(|p| p.clone().into()));
        args.push("--classfiles".into());
        args.push(staged.into());
        for dir in &request.source_dirs {
            args.push("--sourcefiles".into());
            args.push(dir.clone().into());
        }
        args.push(format!("--{}", request.format).into());
        args.push(Self::report_location(request).into());
        args
    }

    /// Generate, calling `on_staged` after each class is staged
    pub fn generate_with<F>(&self, request: &ReportRequest, on_staged: F) -> ForjaResult<ReportOutput>
    where
        F: FnMut(&ClassArtifact),
    {
        let staged = Self::staging_dir(request);
        if staged.exists() {
            std::fs::remove_dir_all(&staged)?;
        }
        request.classes.stage_with(&staged, on_staged)?;

        let output = Command::new(&self.java)
            .args(self.arguments(request, &staged))
            .output()
            .map_err(|e| {
                ForjaError::report_generation(format!(
                    "failed to run {}: {e}",
                    self.java.display()
                ))
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let first = stderr
                .lines()
                .find(|line| !line.trim().is_empty())
                .unwrap_or("no output");
            return Err(ForjaError::report_generation(format!(
                "jacoco exited with {}: {first}",
                output.status
            )));
        }

        let location = Self::report_location(request);
        info!(format = %request.format, path = %location.display(), "generated coverage report");
        Ok(ReportOutput {
            format: request.format,
            location,
        })
    }
}

impl ReportGenerator for JacocoCliGenerator {
    fn generate(&self, request: &ReportRequest) -> ForjaResult<ReportOutput> {
        self.generate_with(request, |_| {})
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::coverage::{ClassArtifactSet, ExclusionRules};
    use tempfile::TempDir;

    fn request(output_dir: &Path, format: ReportFormat) -> ReportRequest {
        ReportRequest {
            execution_data: vec![PathBuf::from("core/build/jacoco/test.exec")],
            classes: ClassArtifactSet::default(),
            exclusions: ExclusionRules::default(),
            source_dirs: vec![PathBuf::from("core/src/main/java")],
            modules: vec!["core".to_string()],
            skipped: vec!["docs".to_string()],
            format,
            output_dir: output_dir.to_path_buf(),
        }
    }

    #[test]
    fn test_plan_generator_writes_json() {
        let dir = TempDir::new().unwrap();
        let output = PlanReportGenerator
            .generate(&request(dir.path(), ReportFormat::Xml))
            .unwrap();
        assert_eq!(output.location, dir.path().join(PLAN_FILE_NAME));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output.location).unwrap()).unwrap();
        assert_eq!(json["format"], "xml");
        assert_eq!(json["skipped"][0], "docs");
        assert_eq!(json["exclusions"][0], "module-info.class");
    }

    #[test]
    fn test_jacoco_arguments_html() {
        let generator = JacocoCliGenerator::new("lib/jacococli.jar");
        let req = request(Path::new("out"), ReportFormat::Html);
        let args: Vec<String> = generator
            .arguments(&req, Path::new("out/classes"))
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "-jar",
                "lib/jacococli.jar",
                "report",
                "core/build/jacoco/test.exec",
                "--classfiles",
                "out/classes",
                "--sourcefiles",
                "core/src/main/java",
                "--html",
                "out/html",
            ]
        );
    }

    #[test]
    fn test_jacoco_xml_location() {
        let req = request(Path::new("out"), ReportFormat::Xml);
        assert_eq!(
            JacocoCliGenerator::report_location(&req),
            PathBuf::from("out/jacoco.xml")
        );
    }

    #[test]
    fn test_jacoco_missing_java_is_report_error() {
        let dir = TempDir::new().unwrap();
        let generator = JacocoCliGenerator::new("jacococli.jar")
            .with_java(dir.path().join("no-such-java"));
        let err = generator
            .generate(&request(dir.path(), ReportFormat::Html))
            .unwrap_err();
        assert!(matches!(err, ForjaError::ReportGeneration { .. }));
    }
}
