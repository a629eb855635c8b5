//! Product entity model, listing filter, and wire representation.

use catalog_core::listing::SortKey;
use catalog_core::product::owner_display_name;
use catalog_core::types::{DbId, Timestamp};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `products` table joined with its owner's name columns.
///
/// `owner_first_name` / `owner_last_name` are `None` when `created_by` is
/// `NULL`.
#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub sku: String,
    pub barcode: String,
    pub price: Decimal,
    pub stock_quantity: i32,
    pub image: Option<String>,
    pub created_by: Option<DbId>,
    pub owner_first_name: Option<String>,
    pub owner_last_name: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// JSON representation of a product.
///
/// `price` is rendered as a decimal string (`"19.99"`). `created_by_name` is
/// derived from the owner at serialization time and is `null` exactly when
/// `created_by` is.
#[derive(Debug, Clone, Serialize)]
pub struct ProductResponse {
    pub id: DbId,
    pub name: String,
    pub description: String,
    pub sku: String,
    pub barcode: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    pub stock_quantity: i32,
    pub image: Option<String>,
    pub created_by: Option<DbId>,
    pub created_by_name: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<ProductRow> for ProductResponse {
    fn from(row: ProductRow) -> Self {
        let created_by_name = row.created_by.map(|_| {
            owner_display_name(
                row.owner_first_name.as_deref().unwrap_or_default(),
                row.owner_last_name.as_deref().unwrap_or_default(),
            )
        });

        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            sku: row.sku,
            barcode: row.barcode,
            price: row.price,
            stock_quantity: row.stock_quantity,
            image: row.image,
            created_by: row.created_by,
            created_by_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Listing modifiers, already parsed and clamped.
///
/// Applied in order: exact-match filters, search terms, ordering, then the
/// page window.
#[derive(Debug, Clone)]
pub struct ProductFilter {
    pub sku: Option<String>,
    pub created_by: Option<DbId>,
    /// Every term must match `name`, `description`, `sku` or `barcode`.
    pub search: Vec<String>,
    /// Never empty.
    pub ordering: Vec<SortKey>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            sku: None,
            created_by: None,
            search: Vec::new(),
            ordering: catalog_core::listing::parse_ordering(None),
            limit: catalog_core::listing::DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn row(created_by: Option<DbId>, first: Option<&str>, last: Option<&str>) -> ProductRow {
        let now = chrono::Utc::now();
        ProductRow {
            id: 1,
            name: "Widget".to_string(),
            description: String::new(),
            sku: "W-1".to_string(),
            barcode: String::new(),
            price: Decimal::from_str("19.90").unwrap(),
            stock_quantity: 3,
            image: None,
            created_by,
            owner_first_name: first.map(str::to_string),
            owner_last_name: last.map(str::to_string),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn owner_name_is_resolved() {
        let response = ProductResponse::from(row(Some(7), Some("Ada"), Some("Lovelace")));
        assert_eq!(response.created_by_name.as_deref(), Some("Ada Lovelace"));
    }

    #[test]
    fn owner_name_is_null_without_owner() {
        let response = ProductResponse::from(row(None, None, None));
        assert_eq!(response.created_by, None);
        assert_eq!(response.created_by_name, None);
    }

    #[test]
    fn owner_without_names_still_has_a_name() {
        let response = ProductResponse::from(row(Some(7), Some(""), Some("")));
        assert_eq!(response.created_by_name.as_deref(), Some(""));
    }

    #[test]
    fn price_serializes_as_string() {
        let json = serde_json::to_value(ProductResponse::from(row(None, None, None))).unwrap();
        assert_eq!(json["price"], "19.90");
        assert!(json["created_by_name"].is_null());
        assert_eq!(json["stock_quantity"], 3);
    }
}
