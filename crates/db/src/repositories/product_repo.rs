//! Repository for the `products` table.
//!
//! Every read joins `users` so the owner's name travels with the row; writes
//! use a CTE around `INSERT` / `UPDATE` to return the same joined shape in a
//! single statement.

use catalog_core::listing::{like_pattern, SortKey, SEARCH_FIELDS};
use catalog_core::product::{ProductChanges, ProductDraft};
use catalog_core::types::DbId;
use sqlx::PgPool;

use crate::models::product::{ProductFilter, ProductRow};

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

/// Joined projection over `p` (products, or a CTE of products) and `u` (users).
const JOINED_COLUMNS: &str = "\
    p.id, p.name, p.description, p.sku, p.barcode, p.price, p.stock_quantity, \
    p.image, p.created_by, u.first_name AS owner_first_name, \
    u.last_name AS owner_last_name, p.created_at, p.updated_at";

const OWNER_JOIN: &str = "LEFT JOIN users u ON u.id = p.created_by";

// ---------------------------------------------------------------------------
// ProductRepo
// ---------------------------------------------------------------------------

/// Provides CRUD and listing operations for products.
pub struct ProductRepo;

impl ProductRepo {
    /// Insert a product owned by `created_by`, returning the joined row.
    pub async fn create(
        pool: &PgPool,
        draft: &ProductDraft,
        created_by: DbId,
    ) -> Result<ProductRow, sqlx::Error> {
        let query = format!(
            "WITH p AS (
                INSERT INTO products
                    (name, description, sku, barcode, price, stock_quantity, image, created_by)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING *
             )
             SELECT {JOINED_COLUMNS} FROM p {OWNER_JOIN}"
        );
        sqlx::query_as::<_, ProductRow>(&query)
            .bind(&draft.name)
            .bind(&draft.description)
            .bind(&draft.sku)
            .bind(&draft.barcode)
            .bind(draft.price)
            .bind(draft.stock_quantity)
            .bind(&draft.image)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    /// Find a product by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ProductRow>, sqlx::Error> {
        let query = format!("SELECT {JOINED_COLUMNS} FROM products p {OWNER_JOIN} WHERE p.id = $1");
        sqlx::query_as::<_, ProductRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List one page of products matching `filter`.
    pub async fn list(pool: &PgPool, filter: &ProductFilter) -> Result<Vec<ProductRow>, sqlx::Error> {
        let (where_clause, bind_values, bind_idx) = build_product_filter(filter);
        let order_clause = build_order_clause(&filter.ordering);

        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM products p {OWNER_JOIN} {where_clause} \
             ORDER BY {order_clause} \
             LIMIT ${bind_idx} OFFSET ${}",
            bind_idx + 1
        );
        tracing::debug!(%where_clause, %order_clause, "Listing products");

        let mut q = sqlx::query_as::<_, ProductRow>(&query);
        for val in &bind_values {
            q = match val {
                BindValue::BigInt(v) => q.bind(*v),
                BindValue::Text(v) => q.bind(v.as_str()),
            };
        }
        q.bind(filter.limit).bind(filter.offset).fetch_all(pool).await
    }

    /// Count products matching `filter`, ignoring the page window.
    pub async fn count(pool: &PgPool, filter: &ProductFilter) -> Result<i64, sqlx::Error> {
        let (where_clause, bind_values, _) = build_product_filter(filter);
        let query = format!("SELECT COUNT(*)::BIGINT FROM products p {where_clause}");

        let mut q = sqlx::query_scalar::<_, i64>(&query);
        for val in &bind_values {
            q = match val {
                BindValue::BigInt(v) => q.bind(*v),
                BindValue::Text(v) => q.bind(v.as_str()),
            };
        }
        q.fetch_one(pool).await
    }

    /// Whether another product already uses `sku`.
    pub async fn sku_taken(
        pool: &PgPool,
        sku: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(
                SELECT 1 FROM products WHERE sku = $1 AND ($2::BIGINT IS NULL OR id <> $2)
             )",
        )
        .bind(sku)
        .bind(exclude_id)
        .fetch_one(pool)
        .await
    }

    /// Apply `changes` to a product. `created_by` and `created_at` are never
    /// touched; `updated_at` is refreshed by trigger even for an empty change
    /// set.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        changes: &ProductChanges,
    ) -> Result<Option<ProductRow>, sqlx::Error> {
        let query = format!(
            "WITH p AS (
                UPDATE products SET
                    name = COALESCE($2, name),
                    description = COALESCE($3, description),
                    sku = COALESCE($4, sku),
                    barcode = COALESCE($5, barcode),
                    price = COALESCE($6, price),
                    stock_quantity = COALESCE($7, stock_quantity),
                    image = CASE WHEN $8 THEN $9 ELSE image END
                WHERE id = $1
                RETURNING *
             )
             SELECT {JOINED_COLUMNS} FROM p {OWNER_JOIN}"
        );
        sqlx::query_as::<_, ProductRow>(&query)
            .bind(id)
            .bind(&changes.name)
            .bind(&changes.description)
            .bind(&changes.sku)
            .bind(&changes.barcode)
            .bind(changes.price)
            .bind(changes.stock_quantity)
            .bind(changes.image.is_some())
            .bind(changes.image.clone().flatten())
            .fetch_optional(pool)
            .await
    }

    /// Delete a product by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

// ---------------------------------------------------------------------------
// Dynamic query helpers
// ---------------------------------------------------------------------------

/// Typed bind value for dynamically-built listing queries.
enum BindValue {
    BigInt(i64),
    Text(String),
}

/// Build the `WHERE` clause for `filter`.
///
/// Returns the clause, its bind values, and the next free placeholder index.
fn build_product_filter(filter: &ProductFilter) -> (String, Vec<BindValue>, u32) {
    let mut conditions: Vec<String> = Vec::new();
    let mut bind_idx = 1u32;
    let mut bind_values: Vec<BindValue> = Vec::new();

    if let Some(ref sku) = filter.sku {
        conditions.push(format!("p.sku = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(sku.clone()));
    }

    if let Some(created_by) = filter.created_by {
        conditions.push(format!("p.created_by = ${bind_idx}"));
        bind_idx += 1;
        bind_values.push(BindValue::BigInt(created_by));
    }

    for term in &filter.search {
        let any_field = SEARCH_FIELDS
            .iter()
            .map(|field| format!("p.{field} ILIKE ${bind_idx}"))
            .collect::<Vec<_>>()
            .join(" OR ");
        conditions.push(format!("({any_field})"));
        bind_idx += 1;
        bind_values.push(BindValue::Text(like_pattern(term)));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    (where_clause, bind_values, bind_idx)
}

/// Build the `ORDER BY` list. `p.id DESC` is appended as a tie-breaker so
/// pages never overlap.
fn build_order_clause(ordering: &[SortKey]) -> String {
    let mut parts: Vec<String> = ordering
        .iter()
        .map(|key| {
            let direction = if key.descending { "DESC" } else { "ASC" };
            format!("p.{} {direction}", key.field.column())
        })
        .collect();
    parts.push("p.id DESC".to_string());
    parts.join(", ")
}
