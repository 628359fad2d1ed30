use serde::Deserialize;
use std::fs;
use std::path::PathBuf;

/// Settings read from `<config_dir>/drivekeep/config.toml`. A missing or
/// unreadable file yields defaults.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct AppConfig {
    /// Default local folder for `upload` and `backup` when no path is given
    /// on the command line.
    #[serde(default)]
    pub local_folder: Option<PathBuf>,
}

impl AppConfig {
    pub fn load() -> Self {
        let Some(path) = config_dir().map(|d| d.join("config.toml")) else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        let raw = match fs::read_to_string(&path) {
            Ok(r) => r,
            Err(_) => return Self::default(),
        };
        toml::from_str(&raw).unwrap_or_default()
    }
}

/// Directory holding config.toml, credentials.json and session.json.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("drivekeep"))
}
