//! Pagination policy shared by every list use case.

use serde::Serialize;

pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Effective window of a list request, after clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: i64,
    pub limit: i64,
}

impl Pagination {
    /// 1-based page. `page < 1` is treated as the first page.
    pub fn from_page(page: i64, limit: i64) -> Self {
        let limit = clamp_limit(limit);
        let page = page.max(1);
        Self::from_offset(page.saturating_sub(1).saturating_mul(limit), limit)
    }

    pub fn from_offset(offset: i64, limit: i64) -> Self {
        Self {
            offset: offset.max(0),
            limit: clamp_limit(limit),
        }
    }

    /// 1-based page this window starts on.
    pub fn page(&self) -> i64 {
        self.offset / self.limit + 1
    }
}

fn clamp_limit(limit: i64) -> i64 {
    if limit <= 0 {
        DEFAULT_LIMIT
    } else {
        limit.min(MAX_LIMIT)
    }
}

/// One page of results with the page and limit actually applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: i64,
    pub limit: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, pagination: Pagination) -> Self {
        Self {
            items,
            page: pagination.page(),
            limit: pagination.limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn limits_are_clamped() {
        assert_eq!(Pagination::from_page(1, 0).limit, DEFAULT_LIMIT);
        assert_eq!(Pagination::from_page(1, -3).limit, DEFAULT_LIMIT);
        assert_eq!(Pagination::from_page(1, 500).limit, MAX_LIMIT);
        assert_eq!(Pagination::from_page(1, 25).limit, 25);
    }

    #[test]
    fn page_zero_is_the_first_page() {
        let p = Pagination::from_page(0, 10);
        assert_eq!(p, Pagination { offset: 0, limit: 10 });
        assert_eq!(p.page(), 1);
    }

    #[test]
    fn negative_offset_starts_at_zero() {
        assert_eq!(Pagination::from_offset(-5, 10).offset, 0);
    }

    #[test]
    fn offset_follows_page() {
        let p = Pagination::from_page(3, 20);
        assert_eq!(p.offset, 40);
        assert_eq!(p.page(), 3);
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 500, ..ProptestConfig::default() })]

        #[test]
        fn clamped_window_is_always_valid(page in any::<i64>(), limit in any::<i64>()) {
            let p = Pagination::from_page(page, limit);
            prop_assert!(p.offset >= 0);
            prop_assert!((1..=MAX_LIMIT).contains(&p.limit));
        }
    }
}
