use serde::{Deserialize, Serialize};

/// Page parameters for list queries. Pages are 1-indexed; the page size is
/// clamped to [1, MAX_PAGE_SIZE].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl PageParams {
    pub const DEFAULT_PAGE_SIZE: i64 = 10;
    pub const MAX_PAGE_SIZE: i64 = 100;

    pub fn page(&self) -> i64 {
        self.page.filter(|p| *p >= 1).unwrap_or(1)
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
            .unwrap_or(Self::DEFAULT_PAGE_SIZE)
            .clamp(1, Self::MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.page_size()
    }
}

/// Pagination metadata attached to list responses.
#[derive(Debug, Clone, Serialize)]
pub struct PageMeta {
    pub total_count: i64,
    pub page: i64,
    pub page_size: i64,
    pub total_pages: i64,
}

impl PageMeta {
    pub fn new(total_count: i64, page: i64, page_size: i64) -> Self {
        let total_pages = if page_size > 0 { (total_count + page_size - 1) / page_size } else { 0 };
        PageMeta {
            total_count,
            page,
            page_size,
            total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn defaults_apply_when_unset() {
        let params = PageParams::default();
        assert_eq!(params.page(), 1);
        assert_eq!(params.page_size(), PageParams::DEFAULT_PAGE_SIZE);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn page_size_is_clamped() {
        let params = PageParams {
            page: Some(2),
            page_size: Some(1000),
        };
        assert_eq!(params.page_size(), PageParams::MAX_PAGE_SIZE);
        assert_eq!(params.offset(), PageParams::MAX_PAGE_SIZE);

        let params = PageParams {
            page: Some(1),
            page_size: Some(0),
        };
        assert_eq!(params.page_size(), 1);
    }

    #[test]
    fn nonsense_page_falls_back_to_first() {
        let params = PageParams {
            page: Some(-3),
            page_size: None,
        };
        assert_eq!(params.page(), 1);
        assert_eq!(params.offset(), 0);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(PageMeta::new(0, 1, 10).total_pages, 0);
        assert_eq!(PageMeta::new(10, 1, 10).total_pages, 1);
        assert_eq!(PageMeta::new(11, 1, 10).total_pages, 2);
        assert_eq!(PageMeta::new(99, 1, 25).total_pages, 4);
    }

    proptest! {
        /// total_pages == ceil(total_count / page_size) for any valid inputs.
        #[test]
        fn total_pages_matches_ceiling(total_count in 0i64..100_000, page_size in 1i64..=100) {
            let meta = PageMeta::new(total_count, 1, page_size);
            let expected = (total_count as f64 / page_size as f64).ceil() as i64;
            prop_assert_eq!(meta.total_pages, expected);
        }

        /// Offsets tile the result set without gaps or overlap.
        #[test]
        fn offsets_are_contiguous(page in 1i64..1000, page_size in 1i64..=100) {
            let params = PageParams { page: Some(page), page_size: Some(page_size) };
            prop_assert_eq!(params.offset(), (page - 1) * params.page_size());
            let next = PageParams { page: Some(page + 1), page_size: Some(page_size) };
            prop_assert_eq!(next.offset() - params.offset(), params.page_size());
        }
    }
}
