//! Forja: build orchestration for multi-module projects
//!
//! Forja (Spanish: "forge") unifies what every module of a large project
//! must agree on, and produces the outputs that span modules:
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        FORJA Architecture                         │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  forja.yaml ──► ModuleRegistry ──► ConfigurationPropagator        │
//! │                      │               (policy, toolchains)         │
//! │                      ▼                                            │
//! │               CoverageAggregator ──► ReportGenerator (once)       │
//! │                      │                                            │
//! │  ArchiveSpec ──► ReproducibleArchiveBuilder ──► ArtifactSigner    │
//! │                                                                   │
//! │  FeatureToggleResolver      notice::read_year                     │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use forja::{ArchiveSpec, ReproducibleArchiveBuilder};
//!
//! let spec = ArchiveSpec::new()
//!     .with_text("b.txt", "b")
//!     .with_text("a.txt", "a");
//! let reversed = ArchiveSpec::new()
//!     .with_text("a.txt", "a")
//!     .with_text("b.txt", "b");
//!
//! let builder = ReproducibleArchiveBuilder::new();
//! assert_eq!(
//!     builder.build(&spec).unwrap().sha256,
//!     builder.build(&reversed).unwrap().sha256,
//! );
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

/// Reproducible archive assembly
pub mod archive;

/// Cross-module coverage aggregation
pub mod coverage;

/// Copyright notice parsing
pub mod notice;

/// Project description file
pub mod project;

/// Policy bundles and toolchain validation
pub mod propagate;

/// Detached artifact signatures
pub mod signing;

/// Feature flag resolution
pub mod toggle;

mod module;
mod registry;
mod result;

pub use archive::{
    Archive, ArchiveSpec, Compression, ContentSource, ReproducibleArchiveBuilder, TimestampPolicy,
};
pub use coverage::{
    CoverageAggregator, CoverageDataset, ExclusionRules, JacocoCliGenerator, ModuleCoverage,
    PlanReportGenerator, ReportFormat, ReportGenerator, ReportOutput, ReportRequest,
};
pub use module::{
    ConfigValue, EffectiveConfig, Module, OverrideMap, PluginSet, Provenance,
};
pub use notice::{extract_year, read_year, CopyrightSpan};
pub use project::{ProjectConfig, PROJECT_FILE};
pub use propagate::{
    ConfigurationPropagator, PolicyBundle, PropagationOutcome, Tool, ToolchainCatalog,
};
pub use registry::ModuleRegistry;
pub use result::{ForjaError, ForjaResult};
pub use signing::{sign_published, ArtifactSigner, PublishedArtifact, Sha256Signer, SignedArtifact};
pub use toggle::{FeatureToggleResolver, FlagSource, FlagSpec, Resolution};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// Policy, coverage and archive steps composed the way a build runs them
    #[test]
    fn test_project_pipeline() {
        let dir = tempfile::TempDir::new().unwrap();
        let root = dir.path();
        std::fs::write(
            root.join(PROJECT_FILE),
            "modules:\n  - { name: core, dir: core, plugins: [java, jacoco, publishing] }\n  - { name: docs, dir: docs }\nnotice: NOTICE\n",
        )
        .unwrap();
        std::fs::write(root.join("NOTICE"), "Copyright 1998-2024 Example\n").unwrap();
        let classes = root.join("core").join(coverage::DEFAULT_CLASS_DIR).join("org");
        std::fs::create_dir_all(&classes).unwrap();
        std::fs::write(classes.join("A.class"), b"class").unwrap();

        let project = ProjectConfig::load(&root.join(PROJECT_FILE)).unwrap();
        let registry = project.configured_registry().unwrap();
        assert_eq!(registry.len(), 2);

        let request = CoverageAggregator::new(project.coverage_inputs())
            .with_exclusions(project.exclusions().unwrap())
            .aggregate()
            .unwrap();
        assert_eq!(request.modules, vec!["core"]);
        assert_eq!(request.skipped, vec!["docs"]);

        let year = read_year(&project.notice_path().unwrap()).unwrap();
        let archive = ReproducibleArchiveBuilder::new()
            .build(&ArchiveSpec::new().with_text("VERSION", year.to_string()))
            .unwrap();
        let signed = sign_published(
            &registry,
            [PublishedArtifact::from_archive("core", "core.tar", &archive)],
            &Sha256Signer,
        )
        .unwrap();
        assert!(signed[0].signature.is_some());
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
