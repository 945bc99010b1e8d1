//! Data source selection
//!
//! Resolves a source identifier to a loadable dataset location. There is a
//! built-in catalog of extracted datasets with a default entry; a raw data
//! override, when given, wins over the catalog and disables switching.

use crate::types::{CatalogError, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Source used when none (or an unknown one) is requested
pub const DEFAULT_SOURCE_KEY: &str = "mcu2";

/// One named dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataSource {
    pub key: String,
    pub label: String,
    pub location: PathBuf,
}

impl DataSource {
    pub fn new(key: impl Into<String>, label: impl Into<String>, location: impl Into<PathBuf>) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            location: location.into(),
        }
    }
}

/// The dataset chosen for this session
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceSelection {
    pub source_key: String,
    pub source_label: String,
    pub location: PathBuf,
    /// True when `location` came from a raw override
    pub is_override: bool,
}

impl SourceSelection {
    /// Switching sources is disabled while an override is active
    pub fn can_switch(&self) -> bool {
        !self.is_override
    }
}

/// Ordered set of known data sources
#[derive(Debug, Clone)]
pub struct SourceCatalog {
    sources: Vec<DataSource>,
    default_key: String,
}

impl SourceCatalog {
    /// The extracted firmware datasets shipped alongside the explorer
    pub fn builtin() -> Self {
        let source = |key: &str, label: &str| {
            DataSource::new(
                key,
                label,
                format!("data/can_frames_decoded_all_values_{}.json", key),
            )
        };
        Self {
            sources: vec![
                source("mcu2", "Model 3 MCU2 (Intel)"),
                source("mcu3", "Model 3 MCU3 (AMD)"),
                source("modelsx_amd", "Model S/X MCU3 (AMD)"),
                source("modelsx_intel", "Model S/X MCU2 (Intel)"),
            ],
            default_key: DEFAULT_SOURCE_KEY.to_string(),
        }
    }

    /// Resolve relative locations against `dir`
    pub fn with_data_dir(mut self, dir: &Path) -> Self {
        for source in &mut self.sources {
            if source.location.is_relative() {
                source.location = dir.join(&source.location);
            }
        }
        self
    }

    /// Add a source, replacing any existing source with the same key
    pub fn insert(&mut self, source: DataSource) {
        match self.sources.iter_mut().find(|s| s.key == source.key) {
            Some(existing) => *existing = source,
            None => self.sources.push(source),
        }
    }

    /// Change the default; fails if `key` is not in the catalog
    pub fn set_default(&mut self, key: &str) -> Result<()> {
        if self.get(key).is_none() {
            return Err(CatalogError::UnknownSource(key.to_string()));
        }
        self.default_key = key.to_string();
        Ok(())
    }

    pub fn default_key(&self) -> &str {
        &self.default_key
    }

    pub fn get(&self, key: &str) -> Option<&DataSource> {
        self.sources.iter().find(|s| s.key == key)
    }

    pub fn sources(&self) -> &[DataSource] {
        &self.sources
    }

    /// Pick the dataset for a session
    ///
    /// An unknown or absent key falls back to the default. With a data
    /// override the resolved key and label are kept for display but the
    /// override location is loaded instead.
    pub fn resolve(&self, requested: Option<&str>, data_override: Option<&Path>) -> Result<SourceSelection> {
        let source = requested
            .and_then(|key| {
                let found = self.get(key);
                if found.is_none() {
                    log::warn!("Unknown data source '{}', using '{}'", key, self.default_key);
                }
                found
            })
            .or_else(|| self.get(&self.default_key))
            .ok_or_else(|| CatalogError::UnknownSource(self.default_key.clone()))?;

        let selection = match data_override {
            Some(location) => SourceSelection {
                source_key: source.key.clone(),
                source_label: source.label.clone(),
                location: location.to_path_buf(),
                is_override: true,
            },
            None => SourceSelection {
                source_key: source.key.clone(),
                source_label: source.label.clone(),
                location: source.location.clone(),
                is_override: false,
            },
        };
        log::info!(
            "Data source: {} ({}) -> {:?}{}",
            selection.source_label,
            selection.source_key,
            selection.location,
            if selection.is_override { " [override]" } else { "" }
        );
        Ok(selection)
    }

    /// Switch to another catalog source, dropping any override
    pub fn switch_to(&self, key: &str) -> Result<SourceSelection> {
        if self.get(key).is_none() {
            return Err(CatalogError::UnknownSource(key.to_string()));
        }
        self.resolve(Some(key), None)
    }
}

impl Default for SourceCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
