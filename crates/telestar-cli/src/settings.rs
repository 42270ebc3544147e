use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use telestar_reconcile::{ReconcileOptions, RewritePolicy};
use thiserror::Error;

/// Settings file looked up in the working directory when `--config` is absent.
pub const DEFAULT_SETTINGS_FILE: &str = "telestar.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings file not found: {0}")]
    NotFound(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid settings: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Defaults for `reconcile` and `audit`; command-line flags win.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub run_dir: PathBuf,
    pub rewrite: RewritePolicy,
    pub padding: bool,
    pub derive_time_dimension: bool,
    pub strict: bool,
    pub max_examples: usize,
    pub max_passes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        let options = ReconcileOptions::default();
        Self {
            run_dir: PathBuf::from("runs"),
            rewrite: options.rewrite,
            padding: options.pad_primary_tables,
            derive_time_dimension: false,
            strict: false,
            max_examples: 20,
            max_passes: options.max_passes,
        }
    }
}

/// Load an explicit settings file, or `telestar.toml` if present, or defaults.
pub fn load_settings(explicit: Option<&Path>) -> Result<Settings, SettingsError> {
    let path = match explicit {
        Some(path) if !path.exists() => return Err(SettingsError::NotFound(path.to_path_buf())),
        Some(path) => path.to_path_buf(),
        None => {
            let fallback = PathBuf::from(DEFAULT_SETTINGS_FILE);
            if !fallback.exists() {
                return Ok(Settings::default());
            }
            fallback
        }
    };

    let content = std::fs::read_to_string(&path)?;
    let settings: Settings = toml::from_str(&content)?;
    Ok(settings)
}
