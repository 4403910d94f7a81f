use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use landmark3d_projection::SessionConfig;

/// Application configuration file.
///
/// Session keys (`mode`, `[projection]`, `[camera]`, `[markers]`, `[pose]`)
/// sit at the top level next to `log_level`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub log_level: Option<String>,
    #[serde(flatten)]
    pub session: SessionConfig,
}

impl AppConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(content)?;
        Ok(config)
    }
}
