//! Reproducible archives.
//!
//! The same logical contents always produce byte-identical output,
//! independent of caller order, host clock, file ownership or umask:
//!
//! ```text
//! ArchiveSpec ──normalize──► sorted entries + parent dirs ──TarWriter──► Archive
//!                                 (mtime 0, uid/gid 0,          (tar | tar.gz)
//!                                  0o664 files, 0o775 dirs)
//! ```

mod builder;
mod spec;
mod writer;

pub use builder::{
    normalize_path, sha256_hex, Archive, EntryKind, PlannedEntry, ReproducibleArchiveBuilder,
};
pub use spec::{
    ArchiveEntry, ArchiveSpec, ContentSource, PermissionPolicy, TimestampPolicy, DIR_MODE,
    FILE_MODE,
};
pub use writer::{ArchiveWriter, Compression, TarWriter, NORMALIZED_MTIME};
