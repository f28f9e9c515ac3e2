//! Combined coverage across all modules.

use super::artifacts::{ClassArtifactSet, ClassTree, ExclusionRules};
use super::dataset::{CoverageDataset, ExecutionDataFile};
use super::report::{ReportFormat, ReportGenerator, ReportOutput, ReportRequest};
use crate::module::Module;
use crate::result::{ForjaError, ForjaResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

/// Conventional execution-data location, relative to the module root
pub const DEFAULT_EXECUTION_DATA: &str = "build/jacoco/test.exec";
/// Conventional class output, relative to the module root
pub const DEFAULT_CLASS_DIR: &str = "build/classes/java/main";
/// Conventional main sources, relative to the module root
pub const DEFAULT_SOURCE_DIR: &str = "src/main/java";

/// Coverage inputs declared for one module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleCoverage {
    /// Module name
    pub module: String,
    /// Where the test runner writes execution data, if the module is tested
    pub execution_data: Option<PathBuf>,
    /// Compiled class trees
    pub class_dirs: Vec<PathBuf>,
    /// Source directories
    pub source_dirs: Vec<PathBuf>,
}

impl ModuleCoverage {
    /// Inputs with nothing declared
    #[must_use]
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            execution_data: None,
            class_dirs: Vec::new(),
            source_dirs: Vec::new(),
        }
    }

    /// Conventional locations under the module directory
    #[must_use]
    pub fn conventional(module: &Module) -> Self {
        let dir = module.dir();
        Self {
            module: module.name().to_string(),
            execution_data: Some(dir.join(DEFAULT_EXECUTION_DATA)),
            class_dirs: vec![dir.join(DEFAULT_CLASS_DIR)],
            source_dirs: vec![dir.join(DEFAULT_SOURCE_DIR)],
        }
    }

    /// Set the execution-data location
    #[must_use]
    pub fn with_execution_data(mut self, path: impl Into<PathBuf>) -> Self {
        self.execution_data = Some(path.into());
        self
    }

    /// Add a class tree
    #[must_use]
    pub fn with_class_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.class_dirs.push(dir.into());
        self
    }

    /// Add a source directory
    #[must_use]
    pub fn with_source_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_dirs.push(dir.into());
        self
    }
}

/// Merges per-module coverage into one report
#[derive(Debug, Clone)]
pub struct CoverageAggregator {
    inputs: Vec<ModuleCoverage>,
    exclusions: ExclusionRules,
    format: ReportFormat,
    output_dir: PathBuf,
}

impl CoverageAggregator {
    /// Create an aggregator over module inputs
    #[must_use]
    pub fn new(inputs: impl IntoIterator<Item = ModuleCoverage>) -> Self {
        Self {
            inputs: inputs.into_iter().collect(),
            exclusions: ExclusionRules::default(),
            format: ReportFormat::default(),
            output_dir: PathBuf::from("build/reports/jacoco"),
        }
    }

    /// Replace the exclusion rules
    #[must_use]
    pub fn with_exclusions(mut self, exclusions: ExclusionRules) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Set the output format
    #[must_use]
    pub const fn with_format(mut self, format: ReportFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the output directory
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Declared inputs
    #[must_use]
    pub fn inputs(&self) -> &[ModuleCoverage] {
        &self.inputs
    }

    /// The dataset view over every declared execution-data file
    #[must_use]
    pub fn dataset(&self) -> CoverageDataset {
        CoverageDataset::new(self.inputs.iter().filter_map(|input| {
            input
                .execution_data
                .as_ref()
                .map(|path| ExecutionDataFile::new(&input.module, path))
        }))
    }

    /// Build the report request.
    ///
    /// Modules with neither execution data nor classes are skipped. A module
    /// with execution data must have every declared class tree on disk. A
    /// missing tree, or a class identity claimed by two modules, fails the
    /// whole aggregation.
    pub fn aggregate(&self) -> ForjaResult<ReportRequest> {
        let dataset = self.dataset();
        // One existence probe per file for the whole aggregation
        let present: Vec<&ExecutionDataFile> = dataset.files().collect();
        let mut trees = Vec::new();
        let mut source_dirs = Vec::new();
        let mut modules = Vec::new();
        let mut skipped = Vec::new();

        for input in &self.inputs {
            let has_data = present.iter().any(|file| file.module == input.module);
            let (class_dirs, missing): (Vec<&PathBuf>, Vec<&PathBuf>) =
                input.class_dirs.iter().partition(|dir| dir.is_dir());

            if has_data {
                if class_dirs.is_empty() {
                    return Err(ForjaError::MissingClassArtifacts {
                        module: input.module.clone(),
                    });
                }
                if let Some(dir) = missing.first() {
                    return Err(ForjaError::MissingClassTree {
                        module: input.module.clone(),
                        dir: (*dir).clone(),
                    });
                }
            }

            if class_dirs.is_empty() {
                debug!(module = %input.module, "no coverage data or classes, skipping");
                skipped.push(input.module.clone());
                continue;
            }

            trees.extend(class_dirs.into_iter().map(|dir| ClassTree::new(&input.module, dir)));
            source_dirs.extend(input.source_dirs.iter().filter(|dir| dir.is_dir()).cloned());
            modules.push(input.module.clone());
        }

        let classes = ClassArtifactSet::merge(&trees, &self.exclusions)?;
        let execution_data: Vec<PathBuf> = present.iter().map(|file| file.path.clone()).collect();
        info!(
            execution_data = execution_data.len(),
            classes = classes.len(),
            excluded = classes.excluded().len(),
            skipped = skipped.len(),
            format = %self.format,
            "aggregated coverage"
        );

        Ok(ReportRequest {
            execution_data,
            classes,
            exclusions: self.exclusions.clone(),
            source_dirs,
            modules,
            skipped,
            format: self.format,
            output_dir: self.output_dir.clone(),
        })
    }

    /// Aggregate and invoke the generator once
    pub fn run(&self, generator: &dyn ReportGenerator) -> ForjaResult<ReportOutput> {
        let request = self.aggregate()?;
        generator.generate(&request)
    }
}
