//! List pagination.

/// Number of records shown per list page.
pub const PAGE_SIZE: i64 = 5;

/// A resolved, one-based page of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    pub number: i64,
    pub total_pages: i64,
    pub total_items: i64,
}

impl Pager {
    /// Resolves the requested `page` query parameter against the total
    /// record count. Out-of-range requests clamp to the valid range; an
    /// empty listing still renders as page 1 of 1.
    pub fn new(requested: Option<i64>, total_items: i64) -> Self {
        let total_pages = ((total_items + PAGE_SIZE - 1) / PAGE_SIZE).max(1);
        let number = requested.unwrap_or(1).clamp(1, total_pages);

        Self {
            number,
            total_pages,
            total_items,
        }
    }

    pub fn limit(&self) -> i64 {
        PAGE_SIZE
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1) * PAGE_SIZE
    }

    pub fn has_previous(&self) -> bool {
        self.number > 1
    }

    pub fn has_next(&self) -> bool {
        self.number < self.total_pages
    }

    pub fn previous_number(&self) -> i64 {
        self.number - 1
    }

    pub fn next_number(&self) -> i64 {
        self.number + 1
    }

    pub fn is_paginated(&self) -> bool {
        self.total_pages > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eleven_items_make_three_pages() {
        let pager = Pager::new(Some(1), 11);
        assert_eq!(pager.total_pages, 3);
        assert_eq!(pager.offset(), 0);
        assert!(!pager.has_previous());
        assert!(pager.has_next());
    }

    #[test]
    fn test_second_page_offset() {
        let pager = Pager::new(Some(2), 11);
        assert_eq!(pager.offset(), 5);
        assert_eq!(pager.limit(), 5);
        assert!(pager.has_previous());
        assert!(pager.has_next());
    }

    #[test]
    fn test_last_page_has_no_next() {
        let pager = Pager::new(Some(3), 11);
        assert_eq!(pager.offset(), 10);
        assert!(!pager.has_next());
    }

    #[test]
    fn test_missing_page_defaults_to_first() {
        assert_eq!(Pager::new(None, 11).number, 1);
    }

    #[test]
    fn test_page_clamps_to_range() {
        assert_eq!(Pager::new(Some(0), 11).number, 1);
        assert_eq!(Pager::new(Some(-3), 11).number, 1);
        assert_eq!(Pager::new(Some(99), 11).number, 3);
    }

    #[test]
    fn test_empty_listing_is_single_page() {
        let pager = Pager::new(Some(1), 0);
        assert_eq!(pager.total_pages, 1);
        assert!(!pager.is_paginated());
    }

    #[test]
    fn test_exact_multiple_of_page_size() {
        assert_eq!(Pager::new(None, 10).total_pages, 2);
    }
}
