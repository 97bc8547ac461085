//! Client-side pagination of the home grid

/// Page arithmetic over a list of `total` items. Pages are 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Paginator {
    pub total: usize,
    pub page_size: usize,
}

impl Paginator {
    pub fn new(total: usize, page_size: usize) -> Self {
        Paginator {
            total,
            page_size: page_size.max(1),
        }
    }

    /// `ceil(total / page_size)`; zero items means zero pages
    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.page_size)
    }

    /// Clamps a requested page into `1..=total_pages` (1 when there are no pages).
    pub fn clamp(&self, page: usize) -> usize {
        page.clamp(1, self.total_pages().max(1))
    }

    /// Index range of the items on `page`
    pub fn range(&self, page: usize) -> std::ops::Range<usize> {
        let page = self.clamp(page);
        let start = ((page - 1) * self.page_size).min(self.total);
        let end = (start + self.page_size).min(self.total);
        start..end
    }

    pub fn slice<'a, T>(&self, items: &'a [T], page: usize) -> &'a [T] {
        let range = self.range(page);
        &items[range.start.min(items.len())..range.end.min(items.len())]
    }

    pub fn has_next(&self, page: usize) -> bool {
        page < self.total_pages()
    }

    pub fn has_prev(&self, page: usize) -> bool {
        page > 1
    }

    /// Up to `max_visible` page numbers centered on `page` where possible
    pub fn window(&self, page: usize, max_visible: usize) -> Vec<usize> {
        let total_pages = self.total_pages();
        if total_pages == 0 || max_visible == 0 {
            return Vec::new();
        }

        let mut start = page.saturating_sub(max_visible / 2).max(1);
        let end = (start + max_visible - 1).min(total_pages);
        if end + 1 - start < max_visible {
            start = (end + 1).saturating_sub(max_visible).max(1);
        }
        (start..=end).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_is_ceiling() {
        assert_eq!(Paginator::new(100, 24).total_pages(), 5);
        assert_eq!(Paginator::new(96, 24).total_pages(), 4);
        assert_eq!(Paginator::new(1, 24).total_pages(), 1);
        assert_eq!(Paginator::new(0, 24).total_pages(), 0);
    }

    #[test]
    fn test_last_page_holds_remainder() {
        let items: Vec<u32> = (0..100).collect();
        let pager = Paginator::new(items.len(), 24);
        assert_eq!(pager.slice(&items, 1).len(), 24);
        assert_eq!(pager.slice(&items, 5), &items[96..100]);
        // out of range pages clamp to the last one
        assert_eq!(pager.slice(&items, 9), &items[96..100]);
    }

    #[test]
    fn test_empty_list_slices_to_nothing() {
        let items: Vec<u32> = Vec::new();
        let pager = Paginator::new(0, 24);
        assert!(pager.slice(&items, 1).is_empty());
        assert!(!pager.has_next(1));
        assert!(!pager.has_prev(1));
        assert!(pager.window(1, 5).is_empty());
    }

    #[test]
    fn test_window() {
        let pager = Paginator::new(240, 24); // 10 pages
        assert_eq!(pager.window(1, 5), vec![1, 2, 3, 4, 5]);
        assert_eq!(pager.window(6, 5), vec![4, 5, 6, 7, 8]);
        assert_eq!(pager.window(10, 5), vec![6, 7, 8, 9, 10]);
        assert_eq!(Paginator::new(48, 24).window(2, 5), vec![1, 2]);
    }
}
