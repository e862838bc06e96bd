//! Page-window state: current page, total pages, clamped navigation.

use serde::{Deserialize, Serialize};

/// Pagination state for one collection view. Pages are 1-indexed and
/// `current_page` never leaves `[1, total_pages()]`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pager {
    current_page: u32,
    page_size: u32,
    total_count: u64,
}

impl Pager {
    pub fn new(page_size: u32) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
            total_count: 0,
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn total_count(&self) -> u64 {
        self.total_count
    }

    pub fn total_pages(&self) -> u32 {
        let size = self.page_size as u64;
        let pages = self.total_count.div_ceil(size);
        pages.clamp(1, u32::MAX as u64) as u32
    }

    /// Advance one page, clamped. Returns whether the page changed.
    pub fn next(&mut self) -> bool {
        let target = (self.current_page + 1).min(self.total_pages());
        self.set_page(target)
    }

    /// Go back one page, clamped. Returns whether the page changed.
    pub fn prev(&mut self) -> bool {
        let target = self.current_page.saturating_sub(1).max(1);
        self.set_page(target)
    }

    /// Record a new total and pull `current_page` back in range if the
    /// total shrank underneath it.
    pub fn set_total_count(&mut self, total_count: u64) {
        self.total_count = total_count;
        let max = self.total_pages();
        if self.current_page > max {
            self.current_page = max;
        }
    }

    /// Jump straight to the page that contains the entry with the given
    /// 1-indexed position. A direct computation, not a search.
    pub fn jump_to_containing(&mut self, numeric_id: u32) -> bool {
        let id = numeric_id.max(1);
        let page = id.div_ceil(self.page_size).min(self.total_pages());
        self.set_page(page)
    }

    fn set_page(&mut self, page: u32) -> bool {
        let bounded = page.clamp(1, self.total_pages());
        if bounded == self.current_page {
            return false;
        }
        self.current_page = bounded;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up() {
        let mut pager = Pager::new(48);
        assert_eq!(pager.total_pages(), 1);
        pager.set_total_count(1);
        assert_eq!(pager.total_pages(), 1);
        pager.set_total_count(48);
        assert_eq!(pager.total_pages(), 1);
        pager.set_total_count(49);
        assert_eq!(pager.total_pages(), 2);
        pager.set_total_count(480);
        assert_eq!(pager.total_pages(), 10);
    }

    #[test]
    fn test_navigation_clamps_to_bounds() {
        let mut pager = Pager::new(48);
        pager.set_total_count(480);

        assert!(!pager.prev());
        assert_eq!(pager.current_page(), 1);

        assert!(pager.next());
        assert!(pager.next());
        assert!(pager.next());
        assert_eq!(pager.current_page(), 4);

        for _ in 0..10 {
            pager.next();
        }
        assert_eq!(pager.current_page(), 10);

        for _ in 0..20 {
            pager.prev();
        }
        assert_eq!(pager.current_page(), 1);
    }

    #[test]
    fn test_shrinking_total_pulls_page_back() {
        let mut pager = Pager::new(48);
        pager.set_total_count(480);
        for _ in 0..9 {
            pager.next();
        }
        assert_eq!(pager.current_page(), 10);

        pager.set_total_count(100);
        assert_eq!(pager.total_pages(), 3);
        assert_eq!(pager.current_page(), 3);

        pager.set_total_count(0);
        assert_eq!(pager.current_page(), 1);
    }

    #[test]
    fn test_jump_to_containing() {
        let mut pager = Pager::new(48);
        pager.set_total_count(1025);

        assert!(pager.jump_to_containing(152));
        assert_eq!(pager.current_page(), 4);

        assert!(!pager.jump_to_containing(152));

        pager.jump_to_containing(1);
        assert_eq!(pager.current_page(), 1);

        // Past the end clamps to the last page.
        pager.jump_to_containing(50_000);
        assert_eq!(pager.current_page(), pager.total_pages());
    }

    #[test]
    fn test_zero_page_size_is_bumped() {
        let pager = Pager::new(0);
        assert_eq!(pager.page_size(), 1);
        assert_eq!(pager.total_pages(), 1);
    }
}
