//! Byte-level archive encoding.

use super::builder::{EntryKind, PlannedEntry};
use crate::result::ForjaResult;
use serde::{Deserialize, Serialize};
use std::io::Write;

/// Modification time written for every entry (seconds since the epoch)
pub const NORMALIZED_MTIME: u64 = 0;

/// Gzip OS header byte ("unknown"), independent of the host
const GZIP_OS_UNKNOWN: u8 = 255;

/// Outer compression of the tar stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    /// Plain tar
    #[default]
    None,
    /// Gzip with a fixed header
    Gzip,
}

impl Compression {
    /// Conventional file extension
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::None => "tar",
            Self::Gzip => "tar.gz",
        }
    }
}

/// Encodes planned entries into archive bytes
pub trait ArchiveWriter {
    /// Encode entries in the order given
    fn write(&self, entries: &[PlannedEntry]) -> ForjaResult<Vec<u8>>;
}

/// Tar encoder with normalized headers
#[derive(Debug, Clone, Copy, Default)]
pub struct TarWriter {
    compression: Compression,
}

impl TarWriter {
    /// Create a writer
    #[must_use]
    pub const fn new(compression: Compression) -> Self {
        Self { compression }
    }

    /// Configured compression
    #[must_use]
    pub const fn compression(&self) -> Compression {
        self.compression
    }

    fn header(entry: &PlannedEntry) -> ForjaResult<tar::Header> {
        let mut header = tar::Header::new_gnu();
        match &entry.kind {
            EntryKind::Directory => {
                header.set_entry_type(tar::EntryType::Directory);
                header.set_size(0);
            }
            EntryKind::File(bytes) => {
                header.set_entry_type(tar::EntryType::Regular);
                header.set_size(bytes.len() as u64);
            }
        }
        header.set_mode(entry.mode);
        header.set_mtime(NORMALIZED_MTIME);
        header.set_uid(0);
        header.set_gid(0);
        header.set_username("")?;
        header.set_groupname("")?;
        Ok(header)
    }

    fn tar(entries: &[PlannedEntry]) -> ForjaResult<Vec<u8>> {
        let mut builder = tar::Builder::new(Vec::new());
        for entry in entries {
            let mut header = Self::header(entry)?;
            let data: &[u8] = match &entry.kind {
                EntryKind::Directory => &[],
                EntryKind::File(bytes) => bytes,
            };
            builder.append_data(&mut header, &entry.path, data)?;
        }
        Ok(builder.into_inner()?)
    }

    fn gzip(tar: &[u8]) -> ForjaResult<Vec<u8>> {
        let mut encoder = flate2::GzBuilder::new()
            .mtime(0)
            .operating_system(GZIP_OS_UNKNOWN)
            .write(Vec::new(), flate2::Compression::default());
        encoder.write_all(tar)?;
        Ok(encoder.finish()?)
    }
}

impl ArchiveWriter for TarWriter {
    fn write(&self, entries: &[PlannedEntry]) -> ForjaResult<Vec<u8>> {
        let tar = Self::tar(entries)?;
        match self.compression {
            Compression::None => Ok(tar),
            Compression::Gzip => Self::gzip(&tar),
        }
    }
}
