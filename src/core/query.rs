//! Pagination request and result types

use serde::Serialize;
use serde_json::{Map, Value};

/// Request parameter overriding the page size
pub const SIZE_PARAM: &str = "size";

/// Request parameter selecting the page
pub const PAGE_PARAM: &str = "page";

/// Page selection read from the request parameters
///
/// # Example
/// ```rust,ignore
/// // GET /orders?size=10&page=2
/// let request = PageRequest::from_params(&params, 15);
/// assert_eq!(request.size, 10);
/// assert_eq!(request.page, 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub size: usize,
}

impl PageRequest {
    /// Read `size` and `page` from the parameters
    ///
    /// Values that are not positive integers (numbers or numeric strings)
    /// fall back to `default_size` and page 1.
    pub fn from_params(params: &Map<String, Value>, default_size: usize) -> Self {
        Self {
            page: params.get(PAGE_PARAM).and_then(positive_integer).unwrap_or(1),
            size: params
                .get(SIZE_PARAM)
                .and_then(positive_integer)
                .unwrap_or(default_size.max(1)),
        }
    }
}

fn positive_integer(value: &Value) -> Option<usize> {
    let parsed = match value {
        Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<usize>().ok(),
        _ => None,
    };
    parsed.filter(|n| *n > 0)
}

/// One page of a paginated query
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// The items of this page
    pub items: Vec<T>,

    /// Pagination metadata
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    /// Current page number (starts at 1)
    pub page: usize,

    /// Number of items per page
    pub limit: usize,

    /// Total number of items (after filters)
    pub total: usize,

    /// Total number of pages
    pub total_pages: usize,

    /// Whether there is a next page
    pub has_next: bool,

    /// Whether there is a previous page
    pub has_prev: bool,
}

impl PaginationMeta {
    /// Create pagination metadata from calculation
    pub fn new(page: usize, limit: usize, total: usize) -> Self {
        // Ensure limit and page are at least 1 to avoid division by zero
        let limit = limit.max(1);
        let page = page.max(1);
        let total_pages = if total == 0 { 0 } else { total.div_ceil(limit) };
        let start = (page - 1).saturating_mul(limit);

        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: start.saturating_add(limit) < total,
            has_prev: page > 1,
        }
    }

    /// Offset of the first item of the page
    ///
    /// Saturates for pages far beyond the end, which then read as empty.
    pub fn offset(&self) -> usize {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}
