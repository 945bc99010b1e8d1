//! Signal query engine
//!
//! Filters the signals of one frame by free text. Signals keep their original
//! relative order. Each signal's search text covers its own fields plus the
//! decimal code, hex code and label of every possible value; it is built on
//! first query and cached in the frame metadata for the rest of the session.

use crate::index::FrameRef;
use crate::query::tokenize;
use crate::types::{FrameKey, Signal, SignalKey};

/// A signal borrowed from the index, with its position inside its frame
#[derive(Debug, Clone, Copy)]
pub struct SignalRef<'a> {
    pub position: usize,
    pub signal: &'a Signal,
    pub frame_key: &'a FrameKey,
}

impl<'a> SignalRef<'a> {
    /// Identity used for expansion state
    pub fn key(&self) -> SignalKey {
        SignalKey::new(self.frame_key.clone(), self.signal.signal_index)
    }
}

/// Signals of `frame` matching every token of `query`, in frame order
///
/// An empty query returns every signal.
pub fn filter_signals<'a>(frame: FrameRef<'a>, query: &str) -> Vec<SignalRef<'a>> {
    let tokens = tokenize(query);
    let frame_key = frame.key();

    frame
        .frame
        .signals
        .iter()
        .enumerate()
        .filter(|(position, signal)| {
            if tokens.is_empty() {
                return true;
            }
            match frame.meta.signal_blob(*position, signal) {
                Some(blob) => tokens.iter().all(|token| blob.contains(token.as_str())),
                None => false,
            }
        })
        .map(|(position, signal)| SignalRef {
            position,
            signal,
            frame_key,
        })
        .collect()
}

impl<'a> FrameRef<'a> {
    /// Convenience wrapper around [`filter_signals`]
    pub fn search_signals(self, query: &str) -> Vec<SignalRef<'a>> {
        filter_signals(self, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Indexer;
    use crate::types::{Dataset, Frame, PossibleValue};

    fn value(dec: i64, label: &str) -> PossibleValue {
        PossibleValue {
            value_dec: dec.to_string(),
            value_hex: format!("0x{:X}", dec),
            label: Some(label.to_string()),
        }
    }

    fn dataset() -> Dataset {
        Dataset {
            frames: vec![Frame {
                bus_name: "CH".to_string(),
                bus_id: "6".to_string(),
                address_dec: 280,
                address_hex: "0x118".to_string(),
                frame_name: "DI_systemStatus".to_string(),
                signals: vec![
                    Signal {
                        signal_index: 0,
                        signal_name: "DI_gear".to_string(),
                        possible_values: vec![value(1, "PARK"), value(4, "DRIVE")],
                        ..Default::default()
                    },
                    Signal {
                        signal_index: 1,
                        signal_name: "DI_torqueEstimate".to_string(),
                        possible_values_note: Some("scaled Nm".to_string()),
                        ..Default::default()
                    },
                    Signal {
                        signal_index: 2,
                        signal_name: "DI_driveBlocked".to_string(),
                        vapi_source: Some("vapi.drive".to_string()),
                        possible_values: vec![value(10, "BLOCKED")],
                        ..Default::default()
                    },
                ],
            }],
            ..Default::default()
        }
    }

    fn names(signals: &[SignalRef<'_>]) -> Vec<String> {
        signals.iter().map(|s| s.signal.signal_name.clone()).collect()
    }

    #[test]
    fn test_empty_query_returns_all_in_order() {
        let index = Indexer::new().build(dataset());
        let frame = index.frame_at(0).unwrap();
        let signals = filter_signals(frame, "  ");
        assert_eq!(
            names(&signals),
            vec!["DI_gear", "DI_torqueEstimate", "DI_driveBlocked"]
        );
        assert_eq!(frame.meta.cached_signal_blobs(), 0);
    }

    #[test]
    fn test_matches_values_and_preserves_order() {
        let index = Indexer::new().build(dataset());
        let frame = index.frame_at(0).unwrap();

        assert_eq!(names(&filter_signals(frame, "drive")), vec!["DI_gear", "DI_driveBlocked"]);
        assert_eq!(names(&filter_signals(frame, "0xa")), vec!["DI_driveBlocked"]);
        assert_eq!(names(&filter_signals(frame, "nm DI_")), vec!["DI_torqueEstimate"]);
        assert!(filter_signals(frame, "reverse").is_empty());
        assert_eq!(frame.meta.cached_signal_blobs(), 3);
    }

    #[test]
    fn test_signal_key() {
        let index = Indexer::new().build(dataset());
        let frame = index.frame_at(0).unwrap();
        let signals = frame.search_signals("torque");
        assert_eq!(signals[0].position, 1);
        assert_eq!(signals[0].key().to_string(), "CH|6|280|DI_systemStatus:1");
    }
}
