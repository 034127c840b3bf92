//! Administrator CRUD handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use validator::Validate;

use gatehouse_entity::user::UserSummary;

use crate::dto::request::{CreateAdminRequest, UpdatePasswordRequest};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::middleware::rbac::{require_any_admin, require_super_admin};
use crate::state::AppState;

/// POST /api/admins
pub async fn create_admin(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateAdminRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserSummary>>), ApiError> {
    require_super_admin(&state, &auth)?;
    req.validate()?;
    let created = state
        .authority
        .register_admin(Some(&auth.0), &req.username, &req.password, req.role)
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(created))))
}

/// GET /api/admins
pub async fn list_admins(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<UserSummary>>>, ApiError> {
    require_any_admin(&state, &auth)?;
    let admins = state.authority.list_admins().await?;
    Ok(Json(ApiResponse::ok(admins)))
}

/// DELETE /api/admins/{id}
pub async fn delete_admin(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    require_super_admin(&state, &auth)?;
    state.authority.delete_admin(Some(&auth.0), id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "Administrator deleted",
    ))))
}

/// PUT /api/admins/{id}/password
pub async fn update_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<i64>,
    Json(req): Json<UpdatePasswordRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    require_super_admin(&state, &auth)?;
    req.validate()?;
    state
        .authority
        .update_password(Some(&auth.0), id, &req.password)
        .await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Password updated"))))
}
