//! Archive command handler

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use crate::ArchiveArgs;
use forja::archive::Compression;
use forja::signing::Signature;
use forja::{
    sign_published, Archive, ArchiveSpec, ArtifactSigner, PublishedArtifact,
    ReproducibleArchiveBuilder, Sha256Signer,
};
use std::path::{Path, PathBuf};

/// Execute the archive command
pub fn execute_archive(config: &CliConfig, args: &ArchiveArgs) -> CliResult<()> {
    let spec = ArchiveSpec::load(&args.spec)?;
    let compression = if args.gzip {
        Compression::Gzip
    } else {
        Compression::None
    };
    let archive = ReproducibleArchiveBuilder::new()
        .with_compression(compression)
        .build(&spec)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&args.spec, compression));
    // Signing errors must surface before anything is written
    let signature = if args.sign {
        sign(config, args, &archive, &output)?
    } else {
        None
    };
    archive.write_to(&output)?;

    let reporter = ProgressReporter::new(config.color.should_color(), config.verbosity.is_quiet());
    match signature {
        Some(signature) => {
            let dir = output.parent().unwrap_or_else(|| Path::new(""));
            let path = signature.write_into(dir)?;
            reporter.success(&format!("wrote {}", path.display()));
        }
        None if args.sign => reporter.warning("module does not publish; no signature written"),
        None => {}
    }

    println!("{}  {}", archive.sha256, output.display());
    Ok(())
}

/// Output path next to the spec, named after it
#[must_use]
pub fn default_output(spec: &Path, compression: Compression) -> PathBuf {
    spec.with_extension(compression.extension())
}

fn sign(
    config: &CliConfig,
    args: &ArchiveArgs,
    archive: &Archive,
    output: &Path,
) -> CliResult<Option<Signature>> {
    let name = output
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| CliError::invalid_argument(format!("{} has no file name", output.display())))?;

    let Some(ref module) = args.module else {
        return Ok(Some(Sha256Signer.sign(&name, &archive.bytes)?));
    };
    let registry = config.load_project()?.registry()?;
    let artifact = PublishedArtifact::from_archive(module, name, archive);
    let mut signed = sign_published(&registry, [artifact], &Sha256Signer)?;
    Ok(signed.pop().and_then(|signed| signed.signature))
}
