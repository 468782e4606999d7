//! Page slicing.

use serde::Serialize;

use quire_config::DEFAULT_PER_PAGE;

/// One page of results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based page number.
    pub page: usize,
    pub per_page: usize,
    /// Size of the whole collection, even when `items` is empty.
    pub total_items: usize,
    pub total_pages: usize,
}

impl<T> Page<T> {
    #[must_use]
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    #[must_use]
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Convert the items, keeping the page numbers.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            per_page: self.per_page,
            total_items: self.total_items,
            total_pages: self.total_pages,
        }
    }
}

/// Slice `records` into a page.
///
/// `page` is clamped to at least 1 and a `per_page` of 0 uses the default.
/// A page past the end has no items but still reports the totals.
#[must_use]
pub fn paginate<T>(records: Vec<T>, page: usize, per_page: usize) -> Page<T> {
    let page = page.max(1);
    let per_page = if per_page == 0 {
        DEFAULT_PER_PAGE
    } else {
        per_page
    };
    let total_items = records.len();
    let offset = (page - 1).saturating_mul(per_page);

    Page {
        items: records.into_iter().skip(offset).take(per_page).collect(),
        page,
        per_page,
        total_items,
        total_pages: total_items.div_ceil(per_page),
    }
}

/// Parse a page number from user input, degrading to 1.
#[must_use]
pub fn parse_page(value: &str) -> usize {
    value
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|page| *page > 0)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_pages_of_25() {
        let records: Vec<u32> = (1..=25).collect();
        let sizes: Vec<usize> = (1..=4)
            .map(|page| paginate(records.clone(), page, 10).items.len())
            .collect();
        assert_eq!(sizes, vec![10, 10, 5, 0]);

        let third = paginate(records.clone(), 3, 10);
        assert_eq!(third.items, (21..=25).collect::<Vec<_>>());
        assert_eq!(third.total_pages, 3);
        assert!(third.has_previous());
        assert!(!third.has_next());

        let past_end = paginate(records, 4, 10);
        assert_eq!(past_end.total_items, 25);
        assert!(past_end.items.is_empty());
    }

    #[test]
    fn test_clamps_page_and_defaults_per_page() {
        let records: Vec<u32> = (1..=30).collect();
        let page = paginate(records, 0, 0);
        assert_eq!(page.page, 1);
        assert_eq!(page.per_page, DEFAULT_PER_PAGE);
        assert_eq!(page.items.len(), DEFAULT_PER_PAGE);
        assert!(!page.has_previous());
        assert!(page.has_next());
    }

    #[test]
    fn test_empty_collection() {
        let page = paginate(Vec::<u32>::new(), 1, 10);
        assert_eq!(page.total_items, 0);
        assert_eq!(page.total_pages, 0);
        assert!(!page.has_next());
    }

    #[test]
    fn test_huge_page_does_not_overflow() {
        let page = paginate(vec![1, 2, 3], usize::MAX, 10);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_parse_page() {
        assert_eq!(parse_page("3"), 3);
        assert_eq!(parse_page(" 2 "), 2);
        assert_eq!(parse_page("0"), 1);
        assert_eq!(parse_page("-1"), 1);
        assert_eq!(parse_page("two"), 1);
        assert_eq!(parse_page(""), 1);
    }

    #[test]
    fn test_map_keeps_totals() {
        let page = paginate(vec![1, 2, 3], 1, 2).map(|n| n * 10);
        assert_eq!(page.items, vec![10, 20]);
        assert_eq!(page.total_items, 3);
    }
}
