//! CAN Frame Catalog Library
//!
//! An in-memory index and query engine over a static, pre-decoded catalog of
//! CAN frame definitions, their signals and enumerated value tables.
//!
//! # Architecture
//!
//! - [`Indexer`] walks a raw [`Dataset`] once (in batches, with a progress
//!   hook between them) and builds a read-only [`CatalogIndex`]
//! - [`FrameQuery`] combines free text, bus/module/enumerated filters and a
//!   [`SortMode`] into an ordered list of frames
//! - [`filter_signals`] narrows one frame's signals by free text
//! - [`PageWindow`] computes clamped pages over the filtered signals
//! - [`SelectionState`] tracks the active frame and expanded signal rows and
//!   reconciles them whenever the frame filters change
//! - [`ExplorerSession`] ties all of the above into one context object
//!
//! The library does NOT render anything or fetch datasets over the network;
//! the application layer (can-catalog-cli) handles presentation.
//!
//! # Example Usage
//!
//! ```no_run
//! use can_catalog::{load_dataset, CatalogConfig, ExplorerSession, FrameQuery, Indexer};
//! use std::path::Path;
//!
//! let config = CatalogConfig::new();
//! let dataset = load_dataset(Path::new("data/can_frames_decoded_all_values_mcu2.json")).unwrap();
//! let index = Indexer::from_config(&config).build(dataset);
//!
//! let mut session = ExplorerSession::new(index, &config);
//! session.apply_filters(FrameQuery::new().with_text("park").enumerated_only(true));
//!
//! for frame in session.visible_frames() {
//!     println!("{} {}", frame.frame.address_hex, frame.frame.frame_name);
//! }
//! ```

// Public modules
pub mod config;
pub mod index;
pub mod loader;
pub mod pager;
pub mod provenance;
pub mod query;
pub mod selection;
pub mod session;
pub mod source;
pub mod types;

// Re-export main types for convenience
pub use config::CatalogConfig;
pub use index::{CatalogIndex, CatalogTotals, FrameMeta, FrameRef, IndexProgress, Indexer};
pub use loader::{load_dataset, load_selection};
pub use pager::{PageNav, PageWindow};
pub use provenance::Provenance;
pub use query::{filter_signals, tokenize, FrameQuery, SignalRef, SortMode};
pub use selection::{Reconciliation, SelectionState};
pub use session::{ExplorerSession, RequestId, SignalView};
pub use source::{DataSource, SourceCatalog, SourceSelection};
pub use types::{
    CatalogError, Dataset, Frame, FrameKey, PossibleValue, Result, Signal, SignalKey,
};

// Internal modules (not exposed in public API)
mod lenient;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: an empty dataset indexes and starts a session
        let config = CatalogConfig::new();
        let index = Indexer::from_config(&config).build(Dataset::default());
        assert_eq!(index.totals().frames, 0);

        let mut session = ExplorerSession::new(index, &config);
        assert!(session.selected_frame().is_none());
        assert!(session.signal_view().is_none());
    }
}
