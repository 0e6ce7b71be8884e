use crate::extractor::ExtractorOptions;
use crate::validator::ValidationOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// File looked up in the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = ".soroban-interface.toml";

/// Configuration for extraction and validation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceConfig {
    pub extractor: ExtractorOptions,
    pub validation: ValidationOptions,
}

impl InterfaceConfig {
    /// Load config from file or use defaults
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        if let Some(path) = config_path {
            Self::from_file(path)
        } else if Path::new(DEFAULT_CONFIG_FILE).exists() {
            Self::from_file(DEFAULT_CONFIG_FILE)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save config to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}
