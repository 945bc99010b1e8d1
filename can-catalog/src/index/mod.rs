//! Searchable catalog index
//!
//! The index owns the raw [`Dataset`] together with a parallel list of
//! derived [`FrameMeta`] records, a FrameKey lookup, dataset-wide counters and
//! the sorted filter option sets. It is built once per load by the
//! [`Indexer`] and is read-only afterwards.

pub mod derived;
pub mod indexer;

pub use derived::{module_name, FrameMeta, MODULE_DELIMITER, UNKNOWN_MODULE};
pub use indexer::{IndexProgress, Indexer};

use crate::provenance::Provenance;
use crate::types::{Dataset, Frame, FrameKey};
use serde::Serialize;
use std::collections::HashMap;

/// Dataset-wide counters accumulated during indexing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogTotals {
    /// Number of frames in the dataset
    pub frames: usize,
    /// Signals across all frames
    pub signals: usize,
    /// Possible values across all signals
    pub values: usize,
    /// Signals carrying a VAPI alias
    pub vapi_aliases: usize,
    /// Frames whose key was already taken by an earlier frame
    pub duplicate_keys: usize,
}

/// A frame together with its derived metadata, borrowed from the index
#[derive(Debug, Clone, Copy)]
pub struct FrameRef<'a> {
    /// Position of the frame in the dataset
    pub position: usize,
    pub frame: &'a Frame,
    pub meta: &'a FrameMeta,
}

impl<'a> FrameRef<'a> {
    pub fn key(&self) -> &'a FrameKey {
        &self.meta.key
    }

    pub fn module(&self) -> &'a str {
        &self.meta.module
    }

    pub fn bus_label(&self) -> &'a str {
        &self.meta.bus_label
    }
}

/// The read-only index built from one loaded dataset
#[derive(Debug)]
pub struct CatalogIndex {
    dataset: Dataset,
    meta: Vec<FrameMeta>,
    by_key: HashMap<FrameKey, usize>,
    totals: CatalogTotals,
    bus_labels: Vec<String>,
    modules: Vec<String>,
}

impl CatalogIndex {
    pub(crate) fn from_parts(
        dataset: Dataset,
        meta: Vec<FrameMeta>,
        by_key: HashMap<FrameKey, usize>,
        totals: CatalogTotals,
        bus_labels: Vec<String>,
        modules: Vec<String>,
    ) -> Self {
        Self {
            dataset,
            meta,
            by_key,
            totals,
            bus_labels,
            modules,
        }
    }

    /// The raw dataset this index was built from
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Number of frames
    pub fn len(&self) -> usize {
        self.meta.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meta.is_empty()
    }

    /// All frames in dataset order
    pub fn frames(&self) -> impl Iterator<Item = FrameRef<'_>> + '_ {
        self.dataset
            .frames
            .iter()
            .zip(self.meta.iter())
            .enumerate()
            .map(|(position, (frame, meta))| FrameRef {
                position,
                frame,
                meta,
            })
    }

    /// Frame at a dataset position
    pub fn frame_at(&self, position: usize) -> Option<FrameRef<'_>> {
        let frame = self.dataset.frames.get(position)?;
        let meta = self.meta.get(position)?;
        Some(FrameRef {
            position,
            frame,
            meta,
        })
    }

    /// Look up a frame by key. With duplicate keys the first frame wins.
    pub fn get(&self, key: &FrameKey) -> Option<FrameRef<'_>> {
        self.position_of(key).and_then(|position| self.frame_at(position))
    }

    pub fn position_of(&self, key: &FrameKey) -> Option<usize> {
        self.by_key.get(key).copied()
    }

    pub fn totals(&self) -> CatalogTotals {
        self.totals
    }

    /// Distinct `"<bus_name> (<bus_id>)"` labels, sorted
    pub fn bus_labels(&self) -> &[String] {
        &self.bus_labels
    }

    /// Distinct module names, sorted
    pub fn modules(&self) -> &[String] {
        &self.modules
    }

    /// VAPI alias total as reported to users: the dataset's own digest
    /// counter when present, otherwise the counted total.
    pub fn reported_vapi_aliases(&self) -> u64 {
        self.dataset
            .vapi_digest
            .as_ref()
            .and_then(|digest| digest.counts.db_signals_annotated_with_vapi_alias)
            .unwrap_or(self.totals.vapi_aliases as u64)
    }

    /// Passthrough provenance labels of the dataset
    pub fn provenance(&self) -> Provenance {
        self.dataset.provenance()
    }
}
