//! Derived per-frame metadata
//!
//! Everything here is computed from a raw [`Frame`] exactly once, when the
//! index is built, and kept in a record parallel to the raw frame. The only
//! lazily filled piece is the per-signal search blob, which is memoized on
//! first use because most signals are never searched individually.

use crate::types::{Frame, FrameKey, Signal};
use std::sync::OnceLock;

/// Character separating the module prefix from the rest of a frame name
pub const MODULE_DELIMITER: char = '_';

/// Module name used when a frame has no name at all
pub const UNKNOWN_MODULE: &str = "UNKNOWN";

/// Coarse grouping of a frame inferred from its naming prefix
///
/// `"BMS_energyStatus"` → `"BMS"`, `"DOOR"` → `"DOOR"`, `""` → `"UNKNOWN"`.
pub fn module_name(frame_name: &str) -> &str {
    if frame_name.is_empty() {
        return UNKNOWN_MODULE;
    }
    match frame_name.find(MODULE_DELIMITER) {
        Some(idx) => &frame_name[..idx],
        None => frame_name,
    }
}

/// Derived, immutable metadata for one frame
#[derive(Debug)]
pub struct FrameMeta {
    /// Identity of the frame
    pub key: FrameKey,
    /// Module prefix of the frame name
    pub module: String,
    /// `"<bus_name> (<bus_id>)"`
    pub bus_label: String,
    /// Number of signals
    pub signal_count: usize,
    /// Signals carrying at least one possible value
    pub enumerated_signal_count: usize,
    /// Possible values summed over all signals
    pub value_count: usize,
    /// Signals with a non-empty VAPI alias
    pub vapi_alias_count: usize,
    search_blob: String,
    label_blob: String,
    signal_blobs: Vec<OnceLock<String>>,
}

impl FrameMeta {
    /// Walk a frame and its signals once, accumulating counters and text
    pub(crate) fn derive(frame: &Frame) -> Self {
        let module = module_name(&frame.frame_name).to_string();
        let address_dec = frame.address_dec.to_string();

        let mut enumerated_signal_count = 0;
        let mut value_count = 0;
        let mut vapi_alias_count = 0;
        let mut signal_parts: Vec<&str> = Vec::with_capacity(frame.signals.len() * 5);
        let mut label_parts: Vec<&str> = Vec::new();

        for signal in &frame.signals {
            signal_parts.extend([
                signal.signal_name.as_str(),
                signal.enum_map_symbol.as_deref().unwrap_or(""),
                signal.possible_values_note.as_deref().unwrap_or(""),
                signal.vapi_alias.as_deref().unwrap_or(""),
                signal.vapi_source.as_deref().unwrap_or(""),
            ]);

            if signal.has_vapi_alias() {
                vapi_alias_count += 1;
            }

            if signal.is_enumerated() {
                enumerated_signal_count += 1;
                value_count += signal.possible_values.len();
                label_parts.extend(
                    signal
                        .possible_values
                        .iter()
                        .filter_map(|value| value.label.as_deref()),
                );
            }
        }

        let base = [
            frame.bus_name.as_str(),
            frame.bus_id.as_str(),
            frame.address_hex.as_str(),
            address_dec.as_str(),
            frame.frame_name.as_str(),
            module.as_str(),
        ]
        .join(" ");
        let search_blob = format!("{} {}", base, signal_parts.join(" ")).to_lowercase();
        let label_blob = label_parts.join(" ").to_lowercase();

        Self {
            key: frame.key(),
            bus_label: frame.bus_label(),
            module,
            signal_count: frame.signals.len(),
            enumerated_signal_count,
            value_count,
            vapi_alias_count,
            search_blob,
            label_blob,
            signal_blobs: (0..frame.signals.len()).map(|_| OnceLock::new()).collect(),
        }
    }

    /// Lowercase text of the frame's own fields and its signals' fields
    pub fn search_blob(&self) -> &str {
        &self.search_blob
    }

    /// Lowercase labels of every possible value in the frame
    pub fn label_blob(&self) -> &str {
        &self.label_blob
    }

    /// Per-signal search text, built on first request and cached
    ///
    /// `position` is the signal's position in the frame's signal list, which
    /// is the same list this metadata was derived from.
    pub(crate) fn signal_blob<'a>(&'a self, position: usize, signal: &Signal) -> Option<&'a str> {
        self.signal_blobs
            .get(position)
            .map(|cell| cell.get_or_init(|| signal_search_blob(signal)).as_str())
    }

    /// Number of signal blobs built so far
    pub fn cached_signal_blobs(&self) -> usize {
        self.signal_blobs.iter().filter(|cell| cell.get().is_some()).count()
    }
}

/// Name, enum map, note, VAPI fields, then `dec hex label` for every value
fn signal_search_blob(signal: &Signal) -> String {
    let values = signal
        .possible_values
        .iter()
        .map(|v| {
            format!(
                "{} {} {}",
                v.value_dec,
                v.value_hex,
                v.label.as_deref().unwrap_or("")
            )
        })
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        "{} {} {} {} {} {}",
        signal.signal_name,
        signal.enum_map_symbol.as_deref().unwrap_or(""),
        signal.possible_values_note.as_deref().unwrap_or(""),
        signal.vapi_alias.as_deref().unwrap_or(""),
        signal.vapi_source.as_deref().unwrap_or(""),
        values
    )
    .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PossibleValue;

    fn gear_signal() -> Signal {
        Signal {
            signal_index: 0,
            signal_name: "DI_gear".to_string(),
            enum_map_symbol: Some("DI_gear_E".to_string()),
            vapi_alias: Some("GearState".to_string()),
            possible_values: vec![
                PossibleValue {
                    value_dec: "1".to_string(),
                    value_hex: "0x1".to_string(),
                    label: Some("PARK".to_string()),
                },
                PossibleValue {
                    value_dec: "4".to_string(),
                    value_hex: "0x4".to_string(),
                    label: Some("DRIVE".to_string()),
                },
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_module_name() {
        assert_eq!(module_name("BMS_energyStatus"), "BMS");
        assert_eq!(module_name("DOOR"), "DOOR");
        assert_eq!(module_name(""), "UNKNOWN");
        assert_eq!(module_name("DI_torque_2"), "DI");
    }

    #[test]
    fn test_derive_counters_and_blobs() {
        let frame = Frame {
            bus_name: "CH".to_string(),
            bus_id: "6".to_string(),
            address_dec: 280,
            address_hex: "0x118".to_string(),
            frame_name: "DI_systemStatus".to_string(),
            signals: vec![
                gear_signal(),
                Signal {
                    signal_index: 1,
                    signal_name: "DI_torqueEstimate".to_string(),
                    ..Default::default()
                },
            ],
        };

        let meta = FrameMeta::derive(&frame);
        assert_eq!(meta.module, "DI");
        assert_eq!(meta.bus_label, "CH (6)");
        assert_eq!(meta.signal_count, 2);
        assert_eq!(meta.enumerated_signal_count, 1);
        assert_eq!(meta.value_count, 2);
        assert_eq!(meta.vapi_alias_count, 1);
        assert!(meta.search_blob().contains("0x118"));
        assert!(meta.search_blob().contains("280"));
        assert!(meta.search_blob().contains("di_torqueestimate"));
        assert!(!meta.search_blob().contains("park"));
        assert_eq!(meta.label_blob(), "park drive");
    }

    #[test]
    fn test_signal_blob_is_memoized() {
        let frame = Frame {
            frame_name: "DI_systemStatus".to_string(),
            signals: vec![gear_signal()],
            ..Default::default()
        };
        let meta = FrameMeta::derive(&frame);
        assert_eq!(meta.cached_signal_blobs(), 0);

        let blob = meta.signal_blob(0, &frame.signals[0]).unwrap();
        assert!(blob.contains("di_gear_e"));
        assert!(blob.contains("4 0x4 drive"));
        assert_eq!(meta.cached_signal_blobs(), 1);

        assert!(meta.signal_blob(1, &frame.signals[0]).is_none());
    }
}
