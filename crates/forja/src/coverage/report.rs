//! Report request and the report-generator seam.

use super::artifacts::{ClassArtifactSet, ExclusionRules};
use crate::result::ForjaResult;
use crate::toggle::{FeatureToggleResolver, CI};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Report output format
///
/// Exactly one format is generated per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Browsable HTML for people
    #[default]
    Html,
    /// XML for CI tooling
    Xml,
}

impl ReportFormat {
    /// Machine-readable under CI, human-readable otherwise
    #[must_use]
    pub fn select(resolver: &FeatureToggleResolver) -> Self {
        if resolver.resolve(CI) {
            Self::Xml
        } else {
            Self::Html
        }
    }

    /// Lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Xml => "xml",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything the report generator is invoked with
#[derive(Debug, Clone, Serialize)]
pub struct ReportRequest {
    /// Execution-data files that existed at aggregation time
    pub execution_data: Vec<PathBuf>,
    /// Merged, collision-free classes
    pub classes: ClassArtifactSet,
    /// Exclusion rules that were applied to the classes
    pub exclusions: ExclusionRules,
    /// Source directories for line mapping
    pub source_dirs: Vec<PathBuf>,
    /// Modules that contributed data or classes, in registry order
    pub modules: Vec<String>,
    /// Modules skipped because they produced neither data nor classes
    pub skipped: Vec<String>,
    /// Selected output format
    pub format: ReportFormat,
    /// Output directory
    pub output_dir: PathBuf,
}

/// Where a generated report landed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportOutput {
    /// Format generated
    pub format: ReportFormat,
    /// Report file or directory
    pub location: PathBuf,
}

/// External coverage report generator
pub trait ReportGenerator {
    /// Generate a report for the request
    fn generate(&self, request: &ReportRequest) -> ForjaResult<ReportOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_human_readable_by_default() {
        let resolver = FeatureToggleResolver::with_builtin_flags();
        assert_eq!(ReportFormat::select(&resolver), ReportFormat::Html);
    }

    #[test]
    fn test_select_machine_readable_under_ci() {
        let resolver = FeatureToggleResolver::with_builtin_flags().with_env([("CI", "true")]);
        assert_eq!(ReportFormat::select(&resolver), ReportFormat::Xml);
    }

    #[test]
    fn test_property_overrides_ci_env() {
        let resolver = FeatureToggleResolver::with_builtin_flags()
            .with_env([("CI", "true")])
            .with_property(CI, "false");
        assert_eq!(ReportFormat::select(&resolver), ReportFormat::Html);
    }

    #[test]
    fn test_display() {
        assert_eq!(ReportFormat::Xml.to_string(), "xml");
    }
}
