//! Notice command handler

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::NoticeArgs;
use std::path::PathBuf;

/// Execute the notice command
pub fn execute_notice(config: &CliConfig, args: &NoticeArgs) -> CliResult<()> {
    let path = notice_path(config, args)?;
    println!("{}", forja::read_year(&path)?);
    Ok(())
}

/// Explicit file, else the project's declared notice
pub fn notice_path(config: &CliConfig, args: &NoticeArgs) -> CliResult<PathBuf> {
    if let Some(ref file) = args.file {
        return Ok(file.clone());
    }
    config.load_project()?.notice_path().ok_or_else(|| {
        CliError::config(format!(
            "no notice file given and {} declares none",
            config.project.display()
        ))
    })
}
