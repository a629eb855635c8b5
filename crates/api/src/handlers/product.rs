//! Handlers for the `/products` resource.
//!
//! Every handler takes [`AuthUser`] first, so unauthenticated requests are
//! rejected before the path, query or body is looked at. Any authenticated
//! user may read and modify any product.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use catalog_core::error::CoreError;
use catalog_core::product::{ProductInput, UpdateMode, MSG_SKU_TAKEN};
use catalog_core::types::DbId;
use catalog_db::models::product::ProductResponse;
use catalog_db::repositories::{ProductRepo, UserRepo};
use catalog_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppQuery};
use crate::middleware::auth::AuthUser;
use crate::query::{ProductListParams, MSG_INVALID_CHOICE};
use crate::response::PageResponse;
use crate::state::AppState;

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Product",
        id,
    })
}

/// Reject `sku` if another product already uses it.
///
/// The unique constraint still backs this up for concurrent writers.
async fn ensure_sku_available(pool: &DbPool, sku: &str, exclude_id: Option<DbId>) -> AppResult<()> {
    if ProductRepo::sku_taken(pool, sku, exclude_id).await? {
        return Err(CoreError::field("sku", MSG_SKU_TAKEN).into());
    }
    Ok(())
}

/// GET /api/v1/products
pub async fn list(
    _user: AuthUser,
    State(state): State<AppState>,
    AppQuery(params): AppQuery<ProductListParams>,
) -> AppResult<Json<PageResponse<ProductResponse>>> {
    let filter = params.into_filter()?;
    if let Some(owner_id) = filter.created_by {
        if UserRepo::find_by_id(&state.pool, owner_id).await?.is_none() {
            return Err(CoreError::field("created_by", MSG_INVALID_CHOICE).into());
        }
    }

    let rows = ProductRepo::list(&state.pool, &filter).await?;
    let total = ProductRepo::count(&state.pool, &filter).await?;

    Ok(Json(PageResponse {
        data: rows.into_iter().map(ProductResponse::from).collect(),
        total,
        limit: filter.limit,
        offset: filter.offset,
    }))
}

/// POST /api/v1/products
///
/// The owner is always the requester; any `created_by` in the body is ignored.
pub async fn create(
    user: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<ProductInput>,
) -> AppResult<(StatusCode, Json<ProductResponse>)> {
    let draft = input.validate_create().map_err(CoreError::InvalidFields)?;
    ensure_sku_available(&state.pool, &draft.sku, None).await?;

    let row = ProductRepo::create(&state.pool, &draft, user.user_id).await?;
    tracing::info!(product_id = row.id, user_id = user.user_id, sku = %row.sku, "Product created");

    Ok((StatusCode::CREATED, Json(row.into())))
}

/// GET /api/v1/products/{id}
pub async fn get_by_id(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<ProductResponse>> {
    let row = ProductRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(row.into()))
}

/// PUT /api/v1/products/{id}
pub async fn update(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<ProductInput>,
) -> AppResult<Json<ProductResponse>> {
    apply_update(&state, &user, id, input, UpdateMode::Full).await
}

/// PATCH /api/v1/products/{id}
pub async fn partial_update(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<ProductInput>,
) -> AppResult<Json<ProductResponse>> {
    apply_update(&state, &user, id, input, UpdateMode::Partial).await
}

/// Shared body of PUT and PATCH: existence, then validation, then the write.
async fn apply_update(
    state: &AppState,
    user: &AuthUser,
    id: DbId,
    input: ProductInput,
    mode: UpdateMode,
) -> AppResult<Json<ProductResponse>> {
    if ProductRepo::find_by_id(&state.pool, id).await?.is_none() {
        return Err(not_found(id));
    }

    let changes = input
        .validate_update(mode)
        .map_err(CoreError::InvalidFields)?;
    if let Some(ref sku) = changes.sku {
        ensure_sku_available(&state.pool, sku, Some(id)).await?;
    }

    // The row can disappear between the existence check and the write.
    let row = ProductRepo::update(&state.pool, id, &changes)
        .await?
        .ok_or_else(|| not_found(id))?;
    tracing::info!(product_id = id, user_id = user.user_id, ?mode, "Product updated");

    Ok(Json(row.into()))
}

/// DELETE /api/v1/products/{id}
pub async fn delete(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if ProductRepo::delete(&state.pool, id).await? {
        tracing::info!(product_id = id, user_id = user.user_id, "Product deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}
