//! Clamped page windows over a filtered list
//!
//! The window is a pure function of (total, page size, requested page), so it
//! is simply recomputed whenever any of the three changes. A narrower filter
//! that shrinks the total clamps a previously valid page back into range.

use crate::config::normalize_page_size;
use std::ops::Range;

pub use crate::config::DEFAULT_SIGNAL_PAGE_SIZE as DEFAULT_PAGE_SIZE;

/// One page of a list of `total` items
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// Clamped 1-based page number
    pub page: usize,
    pub total_pages: usize,
    /// First item on the page (inclusive)
    pub start: usize,
    /// One past the last item on the page
    pub end: usize,
    pub total: usize,
    pub page_size: usize,
}

impl PageWindow {
    /// Compute the window for `requested` (1-based, may be out of range)
    ///
    /// A page size of zero falls back to [`DEFAULT_PAGE_SIZE`].
    pub fn compute(total: usize, page_size: usize, requested: usize) -> Self {
        let page_size = normalize_page_size(page_size);
        let total_pages = total.div_ceil(page_size).max(1);
        let page = requested.clamp(1, total_pages);
        let start = (page - 1) * page_size;
        let end = total.min(start + page_size);

        Self {
            page,
            total_pages,
            start,
            end,
            total,
            page_size,
        }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Borrow this page out of the full list
    pub fn slice<'s, T>(&self, items: &'s [T]) -> &'s [T] {
        let end = self.end.min(items.len());
        let start = self.start.min(end);
        &items[start..end]
    }

    /// 1-based inclusive bounds for "Showing a-b of n"; `(0, 0)` when empty
    pub fn display_range(&self) -> (usize, usize) {
        if self.total == 0 {
            (0, 0)
        } else {
            (self.start + 1, self.end)
        }
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// Pager navigation buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageNav {
    First,
    Prev,
    Next,
    Last,
}

impl PageNav {
    /// Target page from `current`, saturating at `1..=total_pages`
    pub fn apply(self, current: usize, total_pages: usize) -> usize {
        let total_pages = total_pages.max(1);
        let current = current.clamp(1, total_pages);
        match self {
            PageNav::First => 1,
            PageNav::Prev => current.saturating_sub(1).max(1),
            PageNav::Next => (current + 1).min(total_pages),
            PageNav::Last => total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_items_page_size_one() {
        let first = PageWindow::compute(2, 1, 1);
        assert_eq!((first.page, first.start, first.end), (1, 0, 1));

        let second = PageWindow::compute(2, 1, 2);
        assert_eq!((second.page, second.start, second.end), (2, 1, 2));

        let clamped = PageWindow::compute(2, 1, 3);
        assert_eq!((clamped.page, clamped.start, clamped.end), (2, 1, 2));
    }

    #[test]
    fn test_empty_list() {
        let window = PageWindow::compute(0, 200, 7);
        assert_eq!(window.page, 1);
        assert_eq!(window.total_pages, 1);
        assert_eq!(window.range(), 0..0);
        assert_eq!(window.display_range(), (0, 0));
        assert!(window.is_empty());
    }

    #[test]
    fn test_window_bounds_hold() {
        for total in 0..40 {
            for page_size in 1..9 {
                for requested in 0..12 {
                    let w = PageWindow::compute(total, page_size, requested);
                    assert!(w.start <= w.end);
                    assert!(w.len() <= page_size);
                    assert!(w.end <= total);
                    assert!(w.page >= 1 && w.page <= w.total_pages);
                }
            }
        }
    }

    #[test]
    fn test_zero_page_size_and_zero_page() {
        let w = PageWindow::compute(450, 0, 0);
        assert_eq!(w.page_size, DEFAULT_PAGE_SIZE);
        assert_eq!(w.page, 1);
        assert_eq!(w.total_pages, 3);
        assert_eq!(PageWindow::compute(450, 0, 3).range(), 400..450);
    }

    #[test]
    fn test_slice_and_display() {
        let items: Vec<u32> = (0..5).collect();
        let w = PageWindow::compute(items.len(), 2, 3);
        assert_eq!(w.slice(&items), &[4u32][..]);
        assert_eq!(w.display_range(), (5, 5));
        assert!(w.has_prev());
        assert!(!w.has_next());
    }

    #[test]
    fn test_navigation() {
        assert_eq!(PageNav::First.apply(3, 5), 1);
        assert_eq!(PageNav::Prev.apply(1, 5), 1);
        assert_eq!(PageNav::Prev.apply(3, 5), 2);
        assert_eq!(PageNav::Next.apply(5, 5), 5);
        assert_eq!(PageNav::Next.apply(9, 5), 5);
        assert_eq!(PageNav::Last.apply(1, 5), 5);
        assert_eq!(PageNav::Next.apply(1, 0), 1);
    }
}
