//! Catalog configuration types
//!
//! Only the knobs the library itself needs: indexing granularity, the
//! default signal page size, and the sort order a fresh session starts with.
//! Source selection and presentation settings belong to the application layer.

use crate::query::SortMode;
use serde::{Deserialize, Serialize};

/// Frames processed between two cooperative yield points while indexing
pub const DEFAULT_INDEX_BATCH_SIZE: usize = 20;

/// Signal rows per page in the frame detail view
pub const DEFAULT_SIGNAL_PAGE_SIZE: usize = 200;

/// Configuration for the catalog library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Frames indexed per batch before the progress observer runs
    #[serde(default = "default_index_batch_size")]
    pub index_batch_size: usize,

    /// Signal rows per page
    #[serde(default = "default_signal_page_size")]
    pub signal_page_size: usize,

    /// Sort order applied when a session starts
    #[serde(default)]
    pub default_sort: SortMode,
}

fn default_index_batch_size() -> usize {
    DEFAULT_INDEX_BATCH_SIZE
}

fn default_signal_page_size() -> usize {
    DEFAULT_SIGNAL_PAGE_SIZE
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            index_batch_size: DEFAULT_INDEX_BATCH_SIZE,
            signal_page_size: DEFAULT_SIGNAL_PAGE_SIZE,
            default_sort: SortMode::default(),
        }
    }
}

impl CatalogConfig {
    /// Create a new configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the indexing batch size (0 is treated as 1)
    pub fn with_index_batch_size(mut self, batch_size: usize) -> Self {
        self.index_batch_size = batch_size.max(1);
        self
    }

    /// Builder method: set the signal page size (0 falls back to the default)
    pub fn with_signal_page_size(mut self, page_size: usize) -> Self {
        self.signal_page_size = normalize_page_size(page_size);
        self
    }

    /// Builder method: set the initial sort order
    pub fn with_default_sort(mut self, sort: SortMode) -> Self {
        self.default_sort = sort;
        self
    }
}

/// A page size of zero is not meaningful; substitute the default
pub(crate) fn normalize_page_size(page_size: usize) -> usize {
    if page_size == 0 {
        DEFAULT_SIGNAL_PAGE_SIZE
    } else {
        page_size
    }
}
