//! Canonical entry planning and archive assembly.

use super::spec::{ArchiveSpec, ContentSource, PermissionPolicy, TimestampPolicy, DIR_MODE, FILE_MODE};
use super::writer::{ArchiveWriter, Compression, TarWriter};
use crate::result::{ForjaError, ForjaResult};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{info, warn};

/// Normalize a logical archive path.
///
/// Backslashes become `/`, `.` segments and repeated separators vanish.
/// Empty, absolute and parent-escaping paths are rejected.
pub fn normalize_path(raw: &str) -> ForjaResult<String> {
    let unified = raw.replace('\\', "/");
    if unified.starts_with('/') {
        return Err(ForjaError::invalid_archive_path(raw, "absolute path"));
    }
    if unified.as_bytes().get(1) == Some(&b':') {
        return Err(ForjaError::invalid_archive_path(raw, "drive-qualified path"));
    }

    let mut segments = Vec::new();
    for segment in unified.split('/') {
        match segment {
            "" | "." => {}
            ".." => return Err(ForjaError::invalid_archive_path(raw, "contains '..'")),
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        return Err(ForjaError::invalid_archive_path(raw, "empty path"));
    }
    Ok(segments.join("/"))
}

/// What an entry holds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryKind {
    /// Directory
    Directory,
    /// Regular file contents
    File(Vec<u8>),
}

/// One entry with its final path and metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEntry {
    /// Normalized path; directories end with `/`
    pub path: String,
    /// Contents
    pub kind: EntryKind,
    /// Permission bits
    pub mode: u32,
}

impl PlannedEntry {
    /// Whether this is a directory entry
    #[must_use]
    pub const fn is_dir(&self) -> bool {
        matches!(self.kind, EntryKind::Directory)
    }
}

/// A finished archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    /// Encoded bytes
    pub bytes: Vec<u8>,
    /// Lowercase hex SHA-256 of `bytes`
    pub sha256: String,
    /// Entry paths in archive order
    pub entries: Vec<String>,
    /// Compression used
    pub compression: Compression,
}

impl Archive {
    /// Write the bytes to `path`, creating parent directories
    pub fn write_to(&self, path: &Path) -> ForjaResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }

    /// Archive size in bytes
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the archive has no bytes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Lowercase hex SHA-256 of `bytes`
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Builds byte-identical archives from the same logical contents
#[derive(Debug, Clone, Copy, Default)]
pub struct ReproducibleArchiveBuilder {
    compression: Compression,
}

impl ReproducibleArchiveBuilder {
    /// Plain tar output
    #[must_use]
    pub const fn new() -> Self {
        Self {
            compression: Compression::None,
        }
    }

    /// Set the compression
    #[must_use]
    pub const fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    /// Configured compression
    #[must_use]
    pub const fn compression(&self) -> Compression {
        self.compression
    }

    /// Resolve the spec into canonically ordered entries.
    ///
    /// Caller order never matters: entries are sorted byte-wise by their
    /// normalized path, and parent directories are synthesized.
    pub fn plan(&self, spec: &ArchiveSpec) -> ForjaResult<Vec<PlannedEntry>> {
        if spec.timestamps == TimestampPolicy::Preserve {
            warn!("timestamp preservation requested; entries use a fixed mtime");
        }
        if spec.permissions != PermissionPolicy::default() {
            warn!(
                file_mode = %format!("{:o}", spec.permissions.file_mode),
                dir_mode = %format!("{:o}", spec.permissions.dir_mode),
                "custom permissions requested; using {FILE_MODE:o}/{DIR_MODE:o}"
            );
        }

        let mut files: BTreeMap<String, &ContentSource> = BTreeMap::new();
        for entry in &spec.entries {
            let path = normalize_path(&entry.path)?;
            if files.insert(path.clone(), &entry.source).is_some() {
                return Err(ForjaError::DuplicateArchivePath { path });
            }
        }

        let mut dirs = BTreeSet::new();
        for path in files.keys() {
            let mut end = 0;
            while let Some(offset) = path[end..].find('/') {
                end += offset + 1;
                dirs.insert(path[..end].to_string());
            }
        }
        if let Some(path) = files.keys().find(|path| dirs.contains(&format!("{path}/"))) {
            return Err(ForjaError::ArchivePathConflict { path: path.clone() });
        }

        let mut planned: BTreeMap<String, PlannedEntry> = dirs
            .into_iter()
            .map(|path| {
                let entry = PlannedEntry {
                    path: path.clone(),
                    kind: EntryKind::Directory,
                    mode: DIR_MODE,
                };
                (path, entry)
            })
            .collect();
        for (path, source) in files {
            let entry = PlannedEntry {
                path: path.clone(),
                kind: EntryKind::File(read_source(source)?),
                mode: FILE_MODE,
            };
            planned.insert(path, entry);
        }
        Ok(planned.into_values().collect())
    }

    /// Build the archive with the default tar writer
    pub fn build(&self, spec: &ArchiveSpec) -> ForjaResult<Archive> {
        self.build_with(spec, &TarWriter::new(self.compression))
    }

    /// Build the archive with a specific writer
    pub fn build_with(&self, spec: &ArchiveSpec, writer: &dyn ArchiveWriter) -> ForjaResult<Archive> {
        let planned = self.plan(spec)?;
        let bytes = writer.write(&planned)?;
        let sha256 = sha256_hex(&bytes);
        info!(
            entries = planned.len(),
            bytes = bytes.len(),
            sha256 = %sha256,
            "built reproducible archive"
        );
        Ok(Archive {
            bytes,
            sha256,
            entries: planned.into_iter().map(|entry| entry.path).collect(),
            compression: self.compression,
        })
    }
}

fn read_source(source: &ContentSource) -> ForjaResult<Vec<u8>> {
    match source {
        ContentSource::File(path) => std::fs::read(path).map_err(|source| ForjaError::ArchiveSource {
            path: path.clone(),
            source,
        }),
        ContentSource::Text(text) => Ok(text.as_bytes().to_vec()),
        ContentSource::Bytes(bytes) => Ok(bytes.clone()),
    }
}
