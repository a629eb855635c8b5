//! Shared response envelope types for API handlers.

use serde::Serialize;

/// Paginated list envelope: `{ "data": [...], "total", "limit", "offset" }`.
///
/// `total` counts every row matching the filters, not just this page.
#[derive(Debug, Serialize)]
pub struct PageResponse<T: Serialize> {
    pub data: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}
