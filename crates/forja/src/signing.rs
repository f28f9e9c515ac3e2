//! Detached signatures for published artifacts.

use crate::archive::{sha256_hex, Archive};
use crate::registry::ModuleRegistry;
use crate::result::{ForjaError, ForjaResult};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Plugin marking a module whose artifacts are published
pub const PUBLISHING_PLUGIN: &str = "publishing";

/// An artifact produced by a module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedArtifact {
    /// Producing module
    pub module: String,
    /// File name of the artifact
    pub name: String,
    /// Artifact bytes
    pub bytes: Vec<u8>,
}

impl PublishedArtifact {
    /// Create an artifact
    #[must_use]
    pub fn new(module: impl Into<String>, name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            module: module.into(),
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Wrap a built archive
    #[must_use]
    pub fn from_archive(module: impl Into<String>, name: impl Into<String>, archive: &Archive) -> Self {
        Self::new(module, name, archive.bytes.clone())
    }
}

/// A detached signature file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Signature {
    /// Sidecar file name
    pub file_name: String,
    /// Sidecar contents
    pub contents: String,
}

impl Signature {
    /// Write the sidecar into `dir`
    pub fn write_into(&self, dir: &Path) -> ForjaResult<PathBuf> {
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.contents)?;
        Ok(path)
    }
}

/// An artifact and its signature, if its module publishes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedArtifact {
    /// The artifact
    pub artifact: PublishedArtifact,
    /// Detached signature
    pub signature: Option<Signature>,
}

/// Produces detached signatures
pub trait ArtifactSigner {
    /// Sign the bytes of the artifact named `name`
    fn sign(&self, name: &str, bytes: &[u8]) -> ForjaResult<Signature>;
}

/// `sha256sum`-compatible checksum sidecar
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Signer;

impl ArtifactSigner for Sha256Signer {
    fn sign(&self, name: &str, bytes: &[u8]) -> ForjaResult<Signature> {
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(ForjaError::Signing {
                message: format!("artifact name '{name}' is not a plain file name"),
            });
        }
        Ok(Signature {
            file_name: format!("{name}.sha256"),
            contents: format!("{}  {name}\n", sha256_hex(bytes)),
        })
    }
}

/// Sign the artifacts of modules that carry the publishing plugin.
///
/// Artifacts of other modules are returned unsigned. An artifact whose
/// module is not registered is an error.
pub fn sign_published(
    registry: &ModuleRegistry,
    artifacts: impl IntoIterator<Item = PublishedArtifact>,
    signer: &dyn ArtifactSigner,
) -> ForjaResult<Vec<SignedArtifact>> {
    artifacts
        .into_iter()
        .map(|artifact| {
            let module = registry.require(&artifact.module)?;
            let signature = if module.has_plugin(PUBLISHING_PLUGIN) {
                Some(signer.sign(&artifact.name, &artifact.bytes)?)
            } else {
                debug!(module = %artifact.module, artifact = %artifact.name, "module does not publish, not signing");
                None
            };
            Ok(SignedArtifact {
                artifact,
                signature,
            })
        })
        .collect()
}
