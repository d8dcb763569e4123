use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Pagination query parameters (`?page_index=&page_size=`)
///
/// `page_index` is 1-based. Out-of-range values are normalized rather than
/// rejected.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PageQuery {
    pub page_index: Option<i64>,
    pub page_size: Option<i64>,
}

/// Normalized page request used by repositories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page_index: i64,
    pub page_size: i64,
}

impl PageRequest {
    pub fn new(page_index: i64, page_size: i64) -> Self {
        Self {
            page_index: page_index.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }

    /// Saturates for absurd page indexes; such pages are simply empty
    pub fn offset(&self) -> i64 {
        (self.page_index - 1).saturating_mul(self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

impl From<PageQuery> for PageRequest {
    fn from(query: PageQuery) -> Self {
        Self::new(
            query.page_index.unwrap_or(1),
            query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }
}

/// One page of results
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_count: i64,
    pub page_index: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total_count: i64, request: PageRequest) -> Self {
        let total_pages = if total_count <= 0 {
            0
        } else {
            (total_count + request.page_size - 1) / request.page_size
        };
        Self {
            items,
            total_count,
            page_index: request.page_index,
            page_size: request.page_size,
            total_pages,
        }
    }

    /// Converts the items while keeping the paging metadata
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total_count: self.total_count,
            page_index: self.page_index,
            page_size: self.page_size,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_missing() {
        let req = PageRequest::from(PageQuery::default());
        assert_eq!(req, PageRequest::new(1, DEFAULT_PAGE_SIZE));
        assert_eq!(req.offset(), 0);
    }

    #[test]
    fn page_index_below_one_is_normalized() {
        let req = PageRequest::new(0, 10);
        assert_eq!(req.page_index, 1);
        let req = PageRequest::new(-4, 10);
        assert_eq!(req.page_index, 1);
    }

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(PageRequest::new(1, 0).page_size, 1);
        assert_eq!(PageRequest::new(1, 1000).page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn offset_uses_previous_pages() {
        let req = PageRequest::new(3, 20);
        assert_eq!(req.offset(), 40);
        assert_eq!(req.limit(), 20);
    }

    #[test]
    fn huge_page_index_does_not_overflow() {
        let req = PageRequest::from(PageQuery {
            page_index: Some(i64::MAX),
            page_size: Some(100),
        });
        assert_eq!(req.offset(), i64::MAX);
    }

    #[test]
    fn total_pages_rounds_up() {
        let page: Page<u8> = Page::new(vec![], 21, PageRequest::new(1, 10));
        assert_eq!(page.total_pages, 3);
        let page: Page<u8> = Page::new(vec![], 20, PageRequest::new(1, 10));
        assert_eq!(page.total_pages, 2);
    }

    #[test]
    fn empty_result_has_zero_pages() {
        let page: Page<u8> = Page::new(vec![], 0, PageRequest::default());
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn map_keeps_metadata() {
        let page = Page::new(vec![1, 2], 12, PageRequest::new(2, 2));
        let mapped = page.map(|n| n * 10);
        assert_eq!(mapped.items, vec![10, 20]);
        assert_eq!(mapped.page_index, 2);
        assert_eq!(mapped.total_pages, 6);
    }
}
