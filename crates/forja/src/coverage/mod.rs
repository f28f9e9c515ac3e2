//! Aggregate coverage across modules.
//!
//! Each module's test run leaves behind zero or one execution-data file and
//! the module's compiled class trees. The aggregator merges all of them into a
//! single report request:
//!
//! ```text
//! ┌──────────────┐   exists?   ┌────────────────┐
//! │ exec files   │────────────►│ CoverageDataset│──┐
//! └──────────────┘  (lazy)     └────────────────┘  │   ┌───────────────┐   ┌─────────────────┐
//! ┌──────────────┐  excluded?  ┌────────────────┐  ├──►│ ReportRequest │──►│ ReportGenerator │
//! │ class trees  │────────────►│ClassArtifactSet│──┤   └───────────────┘   └─────────────────┘
//! └──────────────┘ collisions  └────────────────┘  │
//! ┌──────────────┐                                 │
//! │ source dirs  │─────────────────────────────────┘
//! └──────────────┘
//! ```
//!
//! A module without execution data is not an error. Execution data without
//! class artifacts is, and so is a class identity claimed by two modules.

mod aggregator;
mod artifacts;
mod dataset;
mod generators;
mod report;

pub use aggregator::{
    CoverageAggregator, ModuleCoverage, DEFAULT_CLASS_DIR, DEFAULT_EXECUTION_DATA,
    DEFAULT_SOURCE_DIR,
};
pub use artifacts::{
    ClassArtifact, ClassArtifactSet, ClassTree, ExclusionRules, MODULE_DESCRIPTOR,
};
pub use dataset::{CoverageDataset, ExecutionDataFile, EXECUTION_DATA_EXTENSION};
pub use generators::{JacocoCliGenerator, PlanReportGenerator, PLAN_FILE_NAME};
pub use report::{ReportFormat, ReportGenerator, ReportOutput, ReportRequest};
