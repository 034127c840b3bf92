//! Health check handler.

use axum::Json;
use axum::extract::State;

use gatehouse_auth::StoreHealth;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
///
/// A degraded revocation store degrades the report but not the service.
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let (status, store) = match state.tokens.revocations().health().await {
        StoreHealth::Ok => ("ok", "ok"),
        StoreHealth::Degraded => ("degraded", "degraded"),
        StoreHealth::Disabled => ("ok", "disabled"),
    };
    Json(ApiResponse::ok(HealthResponse {
        status: status.to_string(),
        revocation_store: store.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}
