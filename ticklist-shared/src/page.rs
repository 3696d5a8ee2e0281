/// Pagination envelope shared by every list endpoint
///
/// All list responses use the same shape: a `pagination` block describing the
/// window that was served plus the `data` rows themselves.
///
/// # Example
///
/// ```
/// use ticklist_shared::page::{Page, Pagination};
///
/// let page = Page {
///     pagination: Pagination::new(2, 10, 25),
///     data: vec!["row"],
/// };
/// assert_eq!(page.pagination.pages, 3);
/// ```

use serde::{Deserialize, Serialize};

/// Metadata describing one served page of a larger result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Page number that was served (1-based)
    pub current: u32,

    /// Maximum rows per page
    pub limit: u32,

    /// Total records matching the query, across all pages
    pub records: u64,

    /// Total pages: `ceil(records / limit)`, 0 when there are no records
    pub pages: u64,
}

impl Pagination {
    /// Computes pagination metadata for a result window.
    ///
    /// `pages` is the ceiling of `records / limit`. An empty result set has
    /// zero pages.
    pub fn new(current: u32, limit: u32, records: u64) -> Self {
        let pages = records.div_ceil(u64::from(limit.max(1)));
        Self {
            current,
            limit,
            records,
            pages,
        }
    }
}

/// One page of records together with its pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    /// Window metadata
    pub pagination: Pagination,

    /// Records in this window
    pub data: Vec<T>,
}

impl<T> Page<T> {
    /// Wraps a window of rows with computed metadata.
    pub fn new(current: u32, limit: u32, records: u64, data: Vec<T>) -> Self {
        Self {
            pagination: Pagination::new(current, limit, records),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pages_is_ceiling_of_records_over_limit() {
        assert_eq!(Pagination::new(1, 10, 25).pages, 3);
        assert_eq!(Pagination::new(1, 10, 30).pages, 3);
        assert_eq!(Pagination::new(1, 10, 31).pages, 4);
        assert_eq!(Pagination::new(1, 20, 1).pages, 1);
    }

    #[test]
    fn test_empty_result_set_has_zero_pages() {
        let p = Pagination::new(1, 20, 0);
        assert_eq!(p.pages, 0);
        assert_eq!(p.records, 0);
    }

    #[test]
    fn test_current_reflects_requested_page() {
        let page = Page::new(4, 10, 25, Vec::<u32>::new());
        assert_eq!(page.pagination.current, 4);
        assert_eq!(page.pagination.limit, 10);
        assert_eq!(page.pagination.records, 25);
    }
}
