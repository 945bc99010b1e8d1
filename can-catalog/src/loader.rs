//! Dataset loading
//!
//! Reads a catalog JSON document into a raw [`Dataset`]. Any failure here is
//! a load failure: nothing is indexed and no session starts. Malformed
//! records *inside* a readable document are not failures; they are absorbed
//! by the tolerant field parsers.

use crate::source::SourceSelection;
use crate::types::{CatalogError, Dataset, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

impl Dataset {
    /// Parse a dataset from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| CatalogError::LoadFailure(format!("invalid dataset JSON: {}", e)))
    }

    /// Parse a dataset from any reader
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        serde_json::from_reader(reader)
            .map_err(|e| CatalogError::LoadFailure(format!("invalid dataset JSON: {}", e)))
    }
}

/// Load a dataset file from disk
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    log::info!("Loading dataset: {:?}", path);

    let file = File::open(path).map_err(|e| {
        CatalogError::LoadFailure(format!("Failed to open {:?}: {}", path, e))
    })?;
    let dataset = Dataset::from_reader(BufReader::new(file)).map_err(|e| match e {
        CatalogError::LoadFailure(reason) => {
            CatalogError::LoadFailure(format!("{:?}: {}", path, reason))
        }
        other => other,
    })?;

    log::info!("Loaded {} frames from {:?}", dataset.frames.len(), path);
    Ok(dataset)
}

/// Load whichever dataset a source selection points at
pub fn load_selection(selection: &SourceSelection) -> Result<Dataset> {
    load_dataset(&selection.location)
}
