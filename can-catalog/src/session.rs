//! Explorer session
//!
//! The single context object for one loaded catalog: it owns the index, the
//! active frame query and its results, the selection/expansion state and the
//! signal page size. Every user interaction is a method call here; there is
//! no ambient global state.
//!
//! Free-text input is usually debounced by the host. Hosts that issue queries
//! asynchronously can tag them with a [`RequestId`]; results for a superseded
//! request are discarded so the latest request always wins.

use crate::config::{normalize_page_size, CatalogConfig};
use crate::index::{CatalogIndex, FrameRef};
use crate::pager::{PageNav, PageWindow};
use crate::query::{filter_signals, FrameQuery, SignalRef};
use crate::selection::{Reconciliation, SelectionState};
use crate::types::{CatalogError, FrameKey, Result, SignalKey};

/// Monotonic tag for frame filter requests
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

/// The selected frame's filtered signals and the current page over them
#[derive(Debug, Clone)]
pub struct SignalView<'a> {
    pub frame: FrameRef<'a>,
    /// All signals matching the signal filter, in frame order
    pub matched: Vec<SignalRef<'a>>,
    pub window: PageWindow,
}

impl<'a> SignalView<'a> {
    /// Signals on the current page
    pub fn page(&self) -> &[SignalRef<'a>] {
        self.window.slice(&self.matched)
    }

    pub fn is_empty(&self) -> bool {
        self.matched.is_empty()
    }
}

#[derive(Debug)]
pub struct ExplorerSession {
    index: CatalogIndex,
    query: FrameQuery,
    /// Dataset positions of the frames matching `query`, in sorted order
    visible: Vec<usize>,
    selection: SelectionState,
    page_size: usize,
    latest_request: u64,
}

impl ExplorerSession {
    /// Start a session; the initial (unfiltered) query runs immediately and
    /// the first visible frame is selected.
    pub fn new(index: CatalogIndex, config: &CatalogConfig) -> Self {
        let mut session = Self {
            index,
            query: FrameQuery::new(),
            visible: Vec::new(),
            selection: SelectionState::new(),
            page_size: normalize_page_size(config.signal_page_size),
            latest_request: 0,
        };
        session.apply_filters(FrameQuery::new().sorted_by(config.default_sort));
        session
    }

    pub fn index(&self) -> &CatalogIndex {
        &self.index
    }

    pub fn query(&self) -> &FrameQuery {
        &self.query
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Frames matching the active query, in sorted order
    pub fn visible_frames(&self) -> impl Iterator<Item = FrameRef<'_>> + '_ {
        self.visible
            .iter()
            .filter_map(move |&position| self.index.frame_at(position))
    }

    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    /// Re-run the frame query and reconcile the selection with its results
    pub fn apply_filters(&mut self, query: FrameQuery) -> Reconciliation {
        self.visible = query.run(&self.index).iter().map(|f| f.position).collect();
        self.query = query;

        let index = &self.index;
        let keys = self
            .visible
            .iter()
            .filter_map(|&position| index.frame_at(position))
            .map(|frame| frame.key());
        self.selection.reconcile(keys)
    }

    /// Issue a tag for an upcoming filter request; older tags become stale
    pub fn next_request(&mut self) -> RequestId {
        self.latest_request += 1;
        RequestId(self.latest_request)
    }

    /// Apply `query` only if `request` is still the latest; `None` if stale
    pub fn apply_filters_for(
        &mut self,
        request: RequestId,
        query: FrameQuery,
    ) -> Option<Reconciliation> {
        if request.0 != self.latest_request {
            log::debug!(
                "Discarding stale frame query #{} (latest #{})",
                request.0,
                self.latest_request
            );
            return None;
        }
        Some(self.apply_filters(query))
    }

    /// Select a visible frame by key
    pub fn select_frame(&mut self, key: &FrameKey) -> Result<()> {
        let visible = self
            .visible_frames()
            .any(|frame| frame.key() == key);
        if !visible {
            return Err(CatalogError::FrameNotFound(key.to_string()));
        }
        self.selection.select(key.clone());
        Ok(())
    }

    pub fn selected_frame(&self) -> Option<FrameRef<'_>> {
        resolve_selected(&self.index, &self.visible, self.selection.selected())
    }

    pub fn set_signal_query(&mut self, query: impl Into<String>) {
        self.selection.set_signal_query(query);
    }

    /// Change the page size (0 falls back to the default) and go to page 1
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = normalize_page_size(page_size);
        self.selection.set_signal_page(1);
    }

    /// Jump to a page number; it is clamped on the next view
    pub fn go_to_page(&mut self, page: usize) -> PageWindow {
        self.selection.set_signal_page(page);
        self.current_window()
    }

    /// Move through the signal pages of the selected frame
    pub fn navigate(&mut self, nav: PageNav) -> PageWindow {
        let window = self.current_window();
        let page = nav.apply(window.page, window.total_pages);
        self.go_to_page(page)
    }

    pub fn toggle_signal(&mut self, key: SignalKey) -> bool {
        self.selection.toggle_expanded(key)
    }

    pub fn is_signal_expanded(&self, key: &SignalKey) -> bool {
        self.selection.is_expanded(key)
    }

    /// Filtered signals of the selected frame with a clamped page window
    ///
    /// The clamped page is written back, so a filter that shrank the list
    /// leaves the session on a valid page.
    pub fn signal_view(&mut self) -> Option<SignalView<'_>> {
        let frame = resolve_selected(&self.index, &self.visible, self.selection.selected())?;
        let matched = filter_signals(frame, self.selection.signal_query());
        let window = PageWindow::compute(matched.len(), self.page_size, self.selection.signal_page());
        self.selection.set_signal_page(window.page);

        Some(SignalView {
            frame,
            matched,
            window,
        })
    }

    fn current_window(&mut self) -> PageWindow {
        match self.signal_view() {
            Some(view) => view.window,
            None => {
                let window = PageWindow::compute(0, self.page_size, self.selection.signal_page());
                self.selection.set_signal_page(window.page);
                window
            }
        }
    }
}

/// Frame a selected key refers to
///
/// A key shared by several frames resolves to the first one in the visible
/// list, so the selection never points at a frame the filters hid. The index
/// lookup (first occurrence in the dataset) is only the fallback.
fn resolve_selected<'a>(
    index: &'a CatalogIndex,
    visible: &[usize],
    key: Option<&FrameKey>,
) -> Option<FrameRef<'a>> {
    let key = key?;
    visible
        .iter()
        .filter_map(|&position| index.frame_at(position))
        .find(|frame| frame.key() == key)
        .or_else(|| index.get(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Indexer;
    use crate::query::SortMode;
    use crate::types::{Dataset, Frame, Signal};

    fn frame(address: i64, name: &str, signal_names: &[&str]) -> Frame {
        Frame {
            bus_name: "CH".to_string(),
            bus_id: "6".to_string(),
            address_dec: address,
            address_hex: format!("0x{:X}", address),
            frame_name: name.to_string(),
            signals: signal_names
                .iter()
                .enumerate()
                .map(|(i, n)| Signal {
                    signal_index: i as i64,
                    signal_name: n.to_string(),
                    ..Default::default()
                })
                .collect(),
        }
    }

    fn session(page_size: usize) -> ExplorerSession {
        let dataset = Dataset {
            frames: vec![
                frame(300, "BMS_status", &["BMS_state", "BMS_soc", "BMS_temp", "BMS_fault"]),
                frame(100, "DI_status", &["DI_gear", "DI_torque"]),
                frame(200, "UI_status", &[]),
            ],
            ..Default::default()
        };
        let config = CatalogConfig::new().with_signal_page_size(page_size);
        ExplorerSession::new(Indexer::from_config(&config).build(dataset), &config)
    }

    fn selected_name(session: &ExplorerSession) -> Option<String> {
        session.selected_frame().map(|f| f.frame.frame_name.clone())
    }

    #[test]
    fn test_new_session_selects_first_sorted_frame() {
        let session = session(200);
        assert_eq!(session.visible_count(), 3);
        assert_eq!(selected_name(&session).as_deref(), Some("DI_status"));
    }

    #[test]
    fn test_filter_change_keeps_or_moves_selection() {
        let mut session = session(200);
        let bms = session.index().frame_at(0).unwrap().key().clone();
        session.select_frame(&bms).unwrap();
        session.set_page_size(1);
        session.navigate(PageNav::Next);
        session.toggle_signal(SignalKey::new(bms.clone(), 1));

        let kept = session.apply_filters(FrameQuery::new().with_text("status"));
        assert_eq!(kept, Reconciliation::Kept);
        assert_eq!(session.selection().signal_page(), 2);
        assert_eq!(session.selection().expanded_count(), 1);

        let moved = session.apply_filters(FrameQuery::new().with_text("di_"));
        assert!(matches!(moved, Reconciliation::Moved(_)));
        assert_eq!(selected_name(&session).as_deref(), Some("DI_status"));
        assert_eq!(session.selection().signal_page(), 1);
        assert_eq!(session.selection().expanded_count(), 0);

        let cleared = session.apply_filters(FrameQuery::new().with_text("nothing-here"));
        assert_eq!(cleared, Reconciliation::Cleared);
        assert!(session.selected_frame().is_none());
        assert!(session.signal_view().is_none());
    }

    #[test]
    fn test_select_invisible_frame_fails() {
        let mut session = session(200);
        session.apply_filters(FrameQuery::new().with_module("DI"));
        let ui = session.index().frame_at(2).unwrap().key().clone();
        let err = session.select_frame(&ui).unwrap_err();
        assert!(matches!(err, CatalogError::FrameNotFound(_)));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_signal_view_paging_and_clamp() {
        let mut session = session(3);
        let bms = session.index().frame_at(0).unwrap().key().clone();
        session.select_frame(&bms).unwrap();

        let view = session.signal_view().unwrap();
        assert_eq!(view.window.total_pages, 2);
        assert_eq!(view.page().len(), 3);

        session.navigate(PageNav::Last);
        let view = session.signal_view().unwrap();
        assert_eq!(view.window.page, 2);
        assert_eq!(view.page()[0].signal.signal_name, "BMS_fault");

        // A narrower filter resets to page 1 and the window stays in range
        session.set_signal_query("bms_s");
        let view = session.signal_view().unwrap();
        assert_eq!(view.matched.len(), 2);
        assert_eq!(view.window.page, 1);

        session.go_to_page(9);
        let view = session.signal_view().unwrap();
        assert_eq!(view.window.page, 1);
        assert_eq!(session.selection().signal_page(), 1);
    }

    #[test]
    fn test_duplicate_key_resolves_to_visible_frame() {
        let dataset = Dataset {
            frames: vec![
                frame(10, "X_dup", &["first_only"]),
                frame(10, "X_dup", &["second_only"]),
            ],
            ..Default::default()
        };
        let config = CatalogConfig::new();
        let mut session = ExplorerSession::new(Indexer::new().build(dataset), &config);
        assert_eq!(session.selected_frame().unwrap().position, 0);

        session.apply_filters(FrameQuery::new().with_text("second_only"));
        let visible: Vec<usize> = session.visible_frames().map(|f| f.position).collect();
        assert_eq!(visible, vec![1]);
        assert_eq!(session.selected_frame().unwrap().position, 1);

        let view = session.signal_view().unwrap();
        assert_eq!(view.frame.position, 1);
        let names: Vec<&str> = view
            .matched
            .iter()
            .map(|s| s.signal.signal_name.as_str())
            .collect();
        assert_eq!(names, vec!["second_only"]);

        // Both visible again: the first visible occurrence wins
        session.apply_filters(FrameQuery::new());
        assert_eq!(session.selected_frame().unwrap().position, 0);
    }

    #[test]
    fn test_stale_requests_are_discarded() {
        let mut session = session(200);
        let first = session.next_request();
        let second = session.next_request();

        assert!(session
            .apply_filters_for(first, FrameQuery::new().with_text("ui"))
            .is_none());
        assert_eq!(session.visible_count(), 3);

        assert!(session
            .apply_filters_for(second, FrameQuery::new().sorted_by(SortMode::Name))
            .is_some());
        assert_eq!(session.query().sort, SortMode::Name);
    }
}
