use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use orienteer_core::GenerationConfig;
use serde::{Deserialize, Serialize};

/// Contents of `orienteer.toml`. Every section is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub generation: GenerationConfig,
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive, e.g. `info` or `orienteer_core=debug`
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub uri: String,
    pub database: String,
    pub collection: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "orienteer".to_string(),
            collection: "maps".to_string(),
        }
    }
}

/// Where the settings came from, reported once logging is up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    File,
    Defaults,
}

impl AppConfig {
    /// Load from `path`, falling back to defaults if the file is missing.
    /// A file that exists but does not parse or validate is an error.
    pub fn load_or_default(path: &Path) -> Result<(Self, Source)> {
        if !path.exists() {
            return Ok((Self::default(), Source::Defaults));
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        config
            .generation
            .validate()
            .with_context(|| format!("invalid [generation] in {}", path.display()))?;
        Ok((config, Source::File))
    }
}
