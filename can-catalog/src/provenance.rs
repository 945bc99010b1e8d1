//! Dataset provenance labels
//!
//! Passthrough metadata describing where a catalog came from. None of it
//! influences queries; it only feeds the header shown above the stats.

use crate::types::Dataset;
use serde::Serialize;
use std::fmt;

/// Library every catalog is extracted from, listed first in the sources line
pub const BASE_LIBRARY: &str = "libQtCarCANData.so";

const DEFAULT_VEHICLE: &str = "Model 3";
const DEFAULT_FIRMWARE: &str = "2026.2";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Provenance {
    /// Vehicle label, if the dataset carries a source block
    pub vehicle: Option<String>,
    pub firmware: Option<String>,
    /// `"<mcu> <soc>"`, omitted when both are empty
    pub hardware: Option<String>,
    /// Source libraries, de-duplicated in first-seen order
    pub libraries: Vec<String>,
}

impl Provenance {
    pub fn of(dataset: &Dataset) -> Self {
        let (vehicle, firmware, hardware) = match &dataset.dataset_source {
            Some(source) => {
                let hardware = format!(
                    "{} {}",
                    source.mcu.as_deref().unwrap_or(""),
                    source.soc.as_deref().unwrap_or("")
                )
                .trim()
                .to_string();
                (
                    Some(source.vehicle.clone().unwrap_or_else(|| DEFAULT_VEHICLE.to_string())),
                    Some(source.firmware.clone().unwrap_or_else(|| DEFAULT_FIRMWARE.to_string())),
                    (!hardware.is_empty()).then_some(hardware),
                )
            }
            None => (None, None, None),
        };

        let mut libraries = vec![BASE_LIBRARY.to_string()];
        for processed in &dataset.sources_processed {
            if !processed.library.is_empty() && !libraries.contains(&processed.library) {
                libraries.push(processed.library.clone());
            }
        }

        Self {
            vehicle,
            firmware,
            hardware,
            libraries,
        }
    }
}

impl Dataset {
    pub fn provenance(&self) -> Provenance {
        Provenance::of(self)
    }
}

impl fmt::Display for Provenance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let (Some(vehicle), Some(firmware)) = (&self.vehicle, &self.firmware) {
            write!(f, "Dataset source: {} firmware {}", vehicle, firmware)?;
            if let Some(hardware) = &self.hardware {
                write!(f, " ({})", hardware)?;
            }
            writeln!(f)?;
        }
        write!(f, "Sources: {}", self.libraries.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DatasetSource, ProcessedSource};

    #[test]
    fn test_provenance_defaults_and_dedup() {
        let dataset = Dataset {
            dataset_source: Some(DatasetSource {
                mcu: Some("MCU2".to_string()),
                ..Default::default()
            }),
            sources_processed: vec![
                ProcessedSource { library: "libQtCarVAPI.so".to_string() },
                ProcessedSource { library: BASE_LIBRARY.to_string() },
                ProcessedSource { library: String::new() },
            ],
            ..Default::default()
        };

        let provenance = Provenance::of(&dataset);
        assert_eq!(provenance.vehicle.as_deref(), Some("Model 3"));
        assert_eq!(provenance.firmware.as_deref(), Some("2026.2"));
        assert_eq!(provenance.hardware.as_deref(), Some("MCU2"));
        assert_eq!(provenance.libraries, vec![BASE_LIBRARY, "libQtCarVAPI.so"]);
        assert_eq!(
            provenance.to_string(),
            "Dataset source: Model 3 firmware 2026.2 (MCU2)\nSources: libQtCarCANData.so, libQtCarVAPI.so"
        );
    }

    #[test]
    fn test_no_source_block() {
        let provenance = Dataset::default().provenance();
        assert!(provenance.vehicle.is_none());
        assert_eq!(provenance.to_string(), "Sources: libQtCarCANData.so");
    }
}
