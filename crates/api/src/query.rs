//! Query parameter types for API handlers.

use catalog_core::error::CoreError;
use catalog_core::listing::{clamp_limit, clamp_offset, parse_ordering, search_terms};
use catalog_core::types::DbId;
use catalog_db::models::product::ProductFilter;
use serde::Deserialize;

/// Reported on `created_by` when the value names no user.
pub const MSG_INVALID_CHOICE: &str =
    "Select a valid choice. That choice is not one of the available choices.";

/// `GET /products?sku=&created_by=&search=&ordering=&limit=&offset=`.
///
/// Empty values are treated as absent.
#[derive(Debug, Default, Deserialize)]
pub struct ProductListParams {
    pub sku: Option<String>,
    pub created_by: Option<String>,
    pub search: Option<String>,
    pub ordering: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ProductListParams {
    /// Parse and clamp into a repository filter.
    ///
    /// A non-numeric `created_by` is a field error here. Whether a numeric
    /// id names an existing user is checked by the handler.
    pub fn into_filter(self) -> Result<ProductFilter, CoreError> {
        let created_by = match non_empty(self.created_by) {
            None => None,
            Some(raw) => Some(
                raw.trim()
                    .parse::<DbId>()
                    .map_err(|_| CoreError::field("created_by", MSG_INVALID_CHOICE))?,
            ),
        };

        Ok(ProductFilter {
            sku: non_empty(self.sku),
            created_by,
            search: self.search.as_deref().map(search_terms).unwrap_or_default(),
            ordering: parse_ordering(self.ordering.as_deref()),
            limit: clamp_limit(self.limit),
            offset: clamp_offset(self.offset),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
