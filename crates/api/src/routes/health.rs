use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// `GET /health` payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` when the catalog database answers, `degraded` otherwise.
    pub status: &'static str,
    pub version: &'static str,
    pub db_healthy: bool,
    /// Newest applied migration; `null` when the database is unreachable.
    pub schema_version: Option<i64>,
}

/// Unauthenticated health check for the catalog service.
///
/// A failing schema lookup is logged and reported as `null`; the status
/// still reflects only database reachability.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = catalog_db::health_check(&state.pool).await.is_ok();

    let schema_version = if db_healthy {
        catalog_db::schema_version(&state.pool)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Failed to read schema version");
                None
            })
    } else {
        None
    };

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
        schema_version,
    })
}

/// Routes mounted at the root, outside `/api/v1`.
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
