//! Configuration loading and parsing

use anyhow::{Context, Result};
use can_catalog::{CatalogConfig, DataSource, SourceCatalog};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub catalog: CatalogConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SourcesConfig {
    /// Source key used when `--source` is not given
    pub default: Option<String>,
    /// Directory relative dataset locations are resolved against
    pub data_dir: Option<PathBuf>,
    /// Extra sources; a key matching a built-in source replaces it
    #[serde(default)]
    pub custom: BTreeMap<String, CustomSourceConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CustomSourceConfig {
    pub label: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl AppConfig {
    /// Built-in sources extended by the `[sources]` section
    pub fn source_catalog(&self) -> Result<SourceCatalog> {
        let mut catalog = SourceCatalog::builtin();
        for (key, custom) in &self.sources.custom {
            catalog.insert(DataSource::new(key.as_str(), custom.label.as_str(), custom.path.clone()));
        }
        if let Some(dir) = &self.sources.data_dir {
            catalog = catalog.with_data_dir(dir);
        }
        if let Some(default) = &self.sources.default {
            catalog
                .set_default(default)
                .with_context(|| format!("Invalid [sources] default: {}", default))?;
        }
        Ok(catalog)
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    Ok(config)
}
