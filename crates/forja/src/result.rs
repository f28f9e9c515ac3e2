//! Result and error types for Forja.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for Forja operations
pub type ForjaResult<T> = Result<T, ForjaError>;

/// Errors that can occur in Forja
///
/// Every variant is fatal for the step that raised it. Nothing in this crate
/// retries: inputs are either present or absent for the whole invocation.
#[derive(Debug, Error)]
pub enum ForjaError {
    /// Project or policy configuration is invalid
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// A module name was registered twice
    #[error("Duplicate module '{name}' in project graph")]
    DuplicateModule {
        /// Module name
        name: String,
    },

    /// Module lookup failed
    #[error("Unknown module '{name}'")]
    UnknownModule {
        /// Module name
        name: String,
    },

    /// A policy bundle references a toolchain version that is not known
    #[error("Unknown {tool} toolchain version '{version}' (known: {known})")]
    UnknownToolchain {
        /// Tool name
        tool: String,
        /// Requested version
        version: String,
        /// Comma separated list of known versions
        known: String,
    },

    /// The NOTICE text has no line carrying the copyright marker
    #[error("Unable to identify copyright year: no line contains '{marker}'")]
    NoticeMarkerMissing {
        /// Marker token searched for
        marker: String,
    },

    /// The first copyright line does not carry a `YYYY-YYYY` span
    #[error("Unable to identify copyright year from line: {line}")]
    NoticePatternMismatch {
        /// Offending line
        line: String,
    },

    /// Two modules contribute a class artifact with the same identity
    #[error("Class '{identity}' is contributed by more than one module: {}", modules.join(", "))]
    MergeCollision {
        /// Report-internal identity (path relative to the class tree root)
        identity: String,
        /// Contributing modules
        modules: Vec<String>,
    },

    /// A module produced execution data but has no class artifacts to map it to
    #[error("Module '{module}' produced execution data but has no class artifacts")]
    MissingClassArtifacts {
        /// Module name
        module: String,
    },

    /// A module with execution data declares a class tree that does not exist
    #[error("Module '{module}' produced execution data but class tree {} is missing", dir.display())]
    MissingClassTree {
        /// Module name
        module: String,
        /// Declared class directory
        dir: PathBuf,
    },

    /// Coverage report generation failed
    #[error("Report generation failed: {message}")]
    ReportGeneration {
        /// Error message
        message: String,
    },

    /// Archive entry path is empty, absolute or escapes the archive root
    #[error("Invalid archive path '{path}': {reason}")]
    InvalidArchivePath {
        /// Path as supplied
        path: String,
        /// Why it was rejected
        reason: String,
    },

    /// Two archive entries resolve to the same logical path
    #[error("Duplicate archive path '{path}'")]
    DuplicateArchivePath {
        /// Normalized path
        path: String,
    },

    /// A path is used both as a file and as a directory
    #[error("Archive path '{path}' is used both as a file and as a directory")]
    ArchivePathConflict {
        /// Normalized path
        path: String,
    },

    /// Reading an archive content source failed
    #[error("Failed to read archive source {path}: {source}")]
    ArchiveSource {
        /// Source file
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Signing an artifact failed
    #[error("Signing failed: {message}")]
    Signing {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// Directory walk error
    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    /// Invalid glob pattern
    #[error("Invalid exclusion pattern: {0}")]
    Pattern(#[from] glob::PatternError),
}

impl ForjaError {
    /// Create a configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a report generation error
    #[must_use]
    pub fn report_generation(message: impl Into<String>) -> Self {
        Self::ReportGeneration {
            message: message.into(),
        }
    }

    /// Create an invalid archive path error
    #[must_use]
    pub fn invalid_archive_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArchivePath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error is a configuration error (broken project setup)
    #[must_use]
    pub const fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Config { .. }
                | Self::DuplicateModule { .. }
                | Self::UnknownToolchain { .. }
                | Self::NoticeMarkerMissing { .. }
                | Self::NoticePatternMismatch { .. }
                | Self::Yaml(_)
                | Self::Pattern(_)
        )
    }
}
