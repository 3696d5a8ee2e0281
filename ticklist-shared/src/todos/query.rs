/// Search parameters for listing a member's todos
///
/// Every filter is optional; the owner constraint is not part of this struct
/// at all because it is never client-controllable. The store implementations
/// receive the owner separately and apply it unconditionally.
///
/// Ordering is deterministic: the requested sort column first, then record id
/// ascending as a tie-break so that pagination is stable even when many rows
/// share a timestamp.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::TodoStatus;

/// Default page served when the request omits one
pub const DEFAULT_PAGE: u32 = 1;

/// Default window size when the request omits one
pub const DEFAULT_LIMIT: u32 = 20;

/// Sortable columns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    /// Sort by creation time (default)
    CreatedAt,

    /// Sort by last mutation time
    UpdatedAt,
}

impl SortField {
    /// Column name for SQL ordering; values are restricted to this enum so
    /// the interpolation cannot be influenced by the client.
    pub fn as_column(&self) -> &'static str {
        match self {
            SortField::CreatedAt => "created_at",
            SortField::UpdatedAt => "updated_at",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Oldest first
    Asc,

    /// Newest first (default)
    Desc,
}

impl SortOrder {
    /// SQL keyword for the direction
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Filter, sort, and pagination parameters for a todo search
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct TodoSearch {
    /// Restrict to one status
    pub status: Option<TodoStatus>,

    /// Case-sensitive substring match against the title
    pub search: Option<String>,

    /// Inclusive lower bound on creation time
    pub created_after: Option<DateTime<Utc>>,

    /// Inclusive upper bound on creation time
    pub created_before: Option<DateTime<Utc>>,

    /// Sort column, `created_at` when omitted
    pub sort: Option<SortField>,

    /// Sort direction, `desc` when omitted
    pub order: Option<SortOrder>,

    /// Page number, 1-based
    #[validate(range(min = 1, max = 1000, message = "page must be between 1 and 1000"))]
    pub page: Option<u32>,

    /// Records per page
    #[validate(range(min = 1, max = 200, message = "limit must be between 1 and 200"))]
    pub limit: Option<u32>,
}

impl TodoSearch {
    /// Effective page number
    pub fn page(&self) -> u32 {
        self.page.unwrap_or(DEFAULT_PAGE)
    }

    /// Effective window size
    pub fn limit(&self) -> u32 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }

    /// Rows to skip before the served window
    pub fn offset(&self) -> u64 {
        u64::from(self.page() - 1) * u64::from(self.limit())
    }

    /// Effective sort column
    pub fn sort(&self) -> SortField {
        self.sort.unwrap_or(SortField::CreatedAt)
    }

    /// Effective sort direction
    pub fn order(&self) -> SortOrder {
        self.order.unwrap_or(SortOrder::Desc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let query = TodoSearch::default();
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), 20);
        assert_eq!(query.offset(), 0);
        assert_eq!(query.sort(), SortField::CreatedAt);
        assert_eq!(query.order(), SortOrder::Desc);
    }

    #[test]
    fn test_offset_math() {
        let query = TodoSearch {
            page: Some(3),
            limit: Some(10),
            ..Default::default()
        };
        assert_eq!(query.offset(), 20);
    }

    #[test]
    fn test_page_and_limit_bounds() {
        let ok = TodoSearch {
            page: Some(1000),
            limit: Some(200),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let page_over = TodoSearch {
            page: Some(1001),
            ..Default::default()
        };
        assert!(page_over.validate().is_err());

        let page_zero = TodoSearch {
            page: Some(0),
            ..Default::default()
        };
        assert!(page_zero.validate().is_err());

        let limit_over = TodoSearch {
            limit: Some(201),
            ..Default::default()
        };
        assert!(limit_over.validate().is_err());

        let limit_zero = TodoSearch {
            limit: Some(0),
            ..Default::default()
        };
        assert!(limit_zero.validate().is_err());
    }

    #[test]
    fn test_deserializes_from_request_shape() {
        let query: TodoSearch = serde_json::from_value(serde_json::json!({
            "status": "active",
            "search": "groceries",
            "sort": "updated_at",
            "order": "asc",
            "page": 2,
            "limit": 50
        }))
        .unwrap();

        assert_eq!(query.status, Some(TodoStatus::Active));
        assert_eq!(query.search.as_deref(), Some("groceries"));
        assert_eq!(query.sort(), SortField::UpdatedAt);
        assert_eq!(query.order(), SortOrder::Asc);
        assert_eq!(query.page(), 2);
        assert_eq!(query.limit(), 50);
    }
}
