//! Selection and expansion state
//!
//! Tracks the active frame, the signal rows expanded to show their value
//! tables, the signal text filter and the current signal page. After every
//! frame filter change the state is reconciled against the visible list so
//! the selection always names a visible frame. A selected frame that survives
//! the change keeps its page and expansion untouched.

use crate::types::{FrameKey, SignalKey};
use std::collections::BTreeSet;

/// Outcome of reconciling the selection with a new frame list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// The selected frame is still visible; nothing changed
    Kept,
    /// Selection moved to the first visible frame
    Moved(FrameKey),
    /// Nothing is visible; selection cleared
    Cleared,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionState {
    selected: Option<FrameKey>,
    signal_page: usize,
    signal_query: String,
    expanded: BTreeSet<SignalKey>,
}

impl Default for SelectionState {
    fn default() -> Self {
        Self {
            selected: None,
            signal_page: 1,
            signal_query: String::new(),
            expanded: BTreeSet::new(),
        }
    }
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&FrameKey> {
        self.selected.as_ref()
    }

    pub fn signal_page(&self) -> usize {
        self.signal_page
    }

    pub fn signal_query(&self) -> &str {
        &self.signal_query
    }

    /// Explicit user selection: page 1, no expanded rows, no signal filter
    pub fn select(&mut self, key: FrameKey) {
        log::debug!("Selecting frame {}", key);
        self.selected = Some(key);
        self.signal_query.clear();
        self.reset_view();
    }

    /// Reconcile with the keys of a freshly filtered frame list
    pub fn reconcile<'k, I>(&mut self, visible: I) -> Reconciliation
    where
        I: IntoIterator<Item = &'k FrameKey>,
    {
        let mut first = None;
        for key in visible {
            if self.selected.as_ref() == Some(key) {
                return Reconciliation::Kept;
            }
            first.get_or_insert(key);
        }

        match first {
            Some(key) => {
                let key = key.clone();
                log::debug!("Selection moved to first visible frame {}", key);
                self.selected = Some(key.clone());
                self.reset_view();
                Reconciliation::Moved(key)
            }
            None => {
                if self.selected.take().is_some() {
                    log::debug!("No frames visible; selection cleared");
                }
                self.reset_view();
                Reconciliation::Cleared
            }
        }
    }

    /// Flip a signal row between expanded and collapsed; returns the new state
    pub fn toggle_expanded(&mut self, key: SignalKey) -> bool {
        if self.expanded.remove(&key) {
            false
        } else {
            self.expanded.insert(key);
            true
        }
    }

    pub fn is_expanded(&self, key: &SignalKey) -> bool {
        self.expanded.contains(key)
    }

    pub fn expanded(&self) -> impl Iterator<Item = &SignalKey> {
        self.expanded.iter()
    }

    pub fn expanded_count(&self) -> usize {
        self.expanded.len()
    }

    /// New signal filter text: back to page 1 with every row collapsed
    pub fn set_signal_query(&mut self, query: impl Into<String>) {
        self.signal_query = query.into();
        self.reset_view();
    }

    /// Store a page number; callers pass an already clamped value
    pub fn set_signal_page(&mut self, page: usize) {
        self.signal_page = page.max(1);
    }

    fn reset_view(&mut self) {
        self.signal_page = 1;
        self.expanded.clear();
    }
}
