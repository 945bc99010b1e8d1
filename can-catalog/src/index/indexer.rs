//! Single-pass catalog indexer
//!
//! Walks the dataset once, deriving per-frame metadata and dataset-wide
//! counters. Frames are processed in fixed-size batches; after each batch the
//! caller's progress observer runs, which is where a host event loop gets
//! control back on large datasets. Batching only affects responsiveness, the
//! resulting index is identical for any batch size.

use crate::config::{CatalogConfig, DEFAULT_INDEX_BATCH_SIZE};
use crate::index::derived::FrameMeta;
use crate::index::{CatalogIndex, CatalogTotals};
use crate::types::Dataset;
use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};

/// Progress reported between indexing batches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexProgress {
    /// Frames indexed so far
    pub processed: usize,
    /// Frames in the dataset
    pub total: usize,
}

impl IndexProgress {
    pub fn is_complete(&self) -> bool {
        self.processed >= self.total
    }
}

/// Builds a [`CatalogIndex`] from a raw dataset
#[derive(Debug, Clone)]
pub struct Indexer {
    batch_size: usize,
}

impl Indexer {
    pub fn new() -> Self {
        Self {
            batch_size: DEFAULT_INDEX_BATCH_SIZE,
        }
    }

    pub fn from_config(config: &CatalogConfig) -> Self {
        Self::new().with_batch_size(config.index_batch_size)
    }

    /// Builder method: frames per batch (0 is treated as 1)
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Index a dataset without observing progress
    pub fn build(&self, dataset: Dataset) -> CatalogIndex {
        self.build_with_progress(dataset, |_| {})
    }

    /// Index a dataset, invoking `observer` after every batch of frames
    ///
    /// Duplicate FrameKeys are resolved keep-first: the lookup keeps the
    /// earliest frame, a warning is logged, and both frames stay in the list.
    pub fn build_with_progress<F>(&self, dataset: Dataset, mut observer: F) -> CatalogIndex
    where
        F: FnMut(IndexProgress),
    {
        let total = dataset.frames.len();
        log::info!(
            "Building search index over {} frames (batch size {})",
            total,
            self.batch_size
        );

        let mut meta = Vec::with_capacity(total);
        let mut by_key = HashMap::with_capacity(total);
        let mut bus_labels = BTreeSet::new();
        let mut modules = BTreeSet::new();
        let mut totals = CatalogTotals {
            frames: total,
            ..CatalogTotals::default()
        };

        for batch in dataset.frames.chunks(self.batch_size) {
            for frame in batch {
                let position = meta.len();
                let derived = FrameMeta::derive(frame);

                match by_key.entry(derived.key.clone()) {
                    Entry::Vacant(slot) => {
                        slot.insert(position);
                    }
                    Entry::Occupied(existing) => {
                        totals.duplicate_keys += 1;
                        log::warn!(
                            "Duplicate frame key {} at position {} (keeping position {})",
                            derived.key,
                            position,
                            existing.get()
                        );
                    }
                }

                bus_labels.insert(derived.bus_label.clone());
                modules.insert(derived.module.clone());
                totals.signals += derived.signal_count;
                totals.values += derived.value_count;
                totals.vapi_aliases += derived.vapi_alias_count;
                meta.push(derived);
            }

            let progress = IndexProgress {
                processed: meta.len(),
                total,
            };
            log::debug!("Indexed frames {}/{}", progress.processed, progress.total);
            observer(progress);
        }

        log::info!(
            "Index ready: {} frames, {} signals, {} values, {} VAPI aliases",
            totals.frames,
            totals.signals,
            totals.values,
            totals.vapi_aliases
        );

        CatalogIndex::from_parts(
            dataset,
            meta,
            by_key,
            totals,
            bus_labels.into_iter().collect(),
            modules.into_iter().collect(),
        )
    }
}

impl Default for Indexer {
    fn default() -> Self {
        Self::new()
    }
}
