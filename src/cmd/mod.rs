pub mod backup;
pub mod help;
pub mod list;
pub mod login;
pub mod upload;

use crate::auth::Auth;
use crate::config::AppConfig;
use crate::drive::Drive;
use anyhow::{anyhow, Result};
use std::path::PathBuf;

pub fn cli_client() -> Result<Drive> {
    let auth = Auth::new()?;
    Ok(Drive::new(auth)?)
}

/// Resolves the local source folder: an explicit argument wins, then
/// `local_folder` from config.toml.
pub fn source_folder(args: &[String]) -> Result<PathBuf> {
    if let Some(path) = args.first() {
        return Ok(PathBuf::from(path));
    }
    AppConfig::load().local_folder.ok_or_else(|| {
        anyhow!("no folder given and no local_folder set in config.toml")
    })
}
