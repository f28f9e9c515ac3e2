//! Declarative description of one output archive.

use crate::result::ForjaResult;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::path::{Path, PathBuf};

/// Permission bits every archived file receives
pub const FILE_MODE: u32 = 0o664;
/// Permission bits every archived directory receives
pub const DIR_MODE: u32 = 0o775;

/// Entry timestamp policy requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampPolicy {
    /// Replace timestamps by a fixed value
    #[default]
    Strip,
    /// Keep filesystem timestamps (never honored by the builder)
    Preserve,
}

/// Permission bits requested by the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionPolicy {
    /// File mode
    #[serde(with = "octal")]
    pub file_mode: u32,
    /// Directory mode
    #[serde(with = "octal")]
    pub dir_mode: u32,
}

impl Default for PermissionPolicy {
    fn default() -> Self {
        Self {
            file_mode: FILE_MODE,
            dir_mode: DIR_MODE,
        }
    }
}

/// Where an entry's bytes come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentSource {
    /// Contents of a file; its timestamps and permissions are ignored
    File(PathBuf),
    /// Literal UTF-8 text
    Text(String),
    /// Literal bytes
    #[serde(skip)]
    Bytes(Vec<u8>),
}

impl ContentSource {
    /// Resolve relative file sources against `base`
    #[must_use]
    pub fn resolved_against(self, base: &Path) -> Self {
        match self {
            Self::File(path) if path.is_relative() => Self::File(base.join(path)),
            other => other,
        }
    }
}

/// One logical path and its content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveEntry {
    /// Path inside the archive
    pub path: String,
    /// Content
    #[serde(flatten)]
    pub source: ContentSource,
}

impl ArchiveEntry {
    /// Create an entry
    #[must_use]
    pub fn new(path: impl Into<String>, source: ContentSource) -> Self {
        Self {
            path: path.into(),
            source,
        }
    }
}

/// Description of one archive
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveSpec {
    /// Entries in caller order (the builder does not depend on it)
    #[serde(default)]
    pub entries: Vec<ArchiveEntry>,
    /// Requested timestamp policy
    #[serde(default)]
    pub timestamps: TimestampPolicy,
    /// Requested permissions
    #[serde(default)]
    pub permissions: PermissionPolicy,
}

impl ArchiveSpec {
    /// Create an empty spec
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry
    #[must_use]
    pub fn with_entry(mut self, entry: ArchiveEntry) -> Self {
        self.entries.push(entry);
        self
    }

    /// Add a file-backed entry
    #[must_use]
    pub fn with_file(self, path: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        self.with_entry(ArchiveEntry::new(path, ContentSource::File(file.into())))
    }

    /// Add a text entry
    #[must_use]
    pub fn with_text(self, path: impl Into<String>, text: impl Into<String>) -> Self {
        self.with_entry(ArchiveEntry::new(path, ContentSource::Text(text.into())))
    }

    /// Add a bytes entry
    #[must_use]
    pub fn with_bytes(self, path: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        self.with_entry(ArchiveEntry::new(path, ContentSource::Bytes(bytes.into())))
    }

    /// Set the requested timestamp policy
    #[must_use]
    pub const fn with_timestamps(mut self, policy: TimestampPolicy) -> Self {
        self.timestamps = policy;
        self
    }

    /// Set the requested permissions
    #[must_use]
    pub const fn with_permissions(mut self, policy: PermissionPolicy) -> Self {
        self.permissions = policy;
        self
    }

    /// Parse a YAML spec
    pub fn from_yaml(yaml: &str) -> ForjaResult<Self> {
        Ok(serde_yaml_ng::from_str(yaml)?)
    }

    /// Load a YAML spec; relative file sources resolve against its directory
    pub fn load(path: &Path) -> ForjaResult<Self> {
        let mut spec = Self::from_yaml(&std::fs::read_to_string(path)?)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        spec.entries = spec
            .entries
            .into_iter()
            .map(|entry| ArchiveEntry {
                path: entry.path,
                source: entry.source.resolved_against(base),
            })
            .collect();
        Ok(spec)
    }
}

/// Octal permission strings such as `"664"`, `"0664"` or `"0o664"`
mod octal {
    use super::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(mode: &u32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{mode:o}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let raw = String::deserialize(deserializer)?;
        let digits = raw.trim().trim_start_matches("0o");
        u32::from_str_radix(digits, 8)
            .ok()
            .filter(|mode| *mode <= 0o7777)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid octal mode '{raw}'")))
    }
}
